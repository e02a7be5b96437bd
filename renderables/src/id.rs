//! Name-based identifiers.
//!
//! Ids are cheap to clone (`Arc<str>`) and serialize as plain strings.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! name_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(name: impl AsRef<str>) -> Self {
                Self(Arc::from(name.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), &*self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(Arc::from(name))
            }
        }
    };
}

name_id!(
    /// Identity of a mesh or model primitive.
    PrimitiveId
);

impl PrimitiveId {
    /// Id of the child mesh `node` of the model `self`: `<model>/<node>`.
    pub fn child(&self, node: &str) -> PrimitiveId {
        PrimitiveId::from(format!("{}/{}", self, node))
    }
}

name_id!(
    /// Identity of an effect material owned by the effect subsystem.
    EffectMaterialId
);

name_id!(
    /// Identity of a texture owned by the texture subsystem.
    TextureId
);
