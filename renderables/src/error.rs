use thiserror::Error;

use crate::id::{EffectMaterialId, PrimitiveId, TextureId};

/// A descriptor is missing a required key or holds a value of the wrong shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    #[error("missing field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` should be {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("field `{field}`: {message}")]
    InvalidValue { field: String, message: String },

    /// Converting to or from a serde type failed.
    #[error("descriptor conversion failed: {0}")]
    Conversion(String),
}

impl DescriptorError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_owned(),
        }
    }

    pub(crate) fn mismatch(field: &str, expected: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.to_owned(),
            expected,
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    /// Prefixes the field path with `section`, e.g. `Geometry.VertexSize`.
    pub(crate) fn within(self, section: &str) -> Self {
        let nest = |field: String| format!("{section}.{field}");
        match self {
            Self::MissingField { field } => Self::MissingField { field: nest(field) },
            Self::TypeMismatch { field, expected } => Self::TypeMismatch {
                field: nest(field),
                expected,
            },
            Self::InvalidValue { field, message } => Self::InvalidValue {
                field: nest(field),
                message,
            },
            other => other,
        }
    }
}

/// Why a primitive could not be hydrated.
///
/// Travels inside the `...HydrationFailed` events, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HydrationError {
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(#[from] DescriptorError),

    #[error("render buffer `{name}` failed: {message}")]
    RenderBuffer { name: String, message: String },

    #[error("effect material `{id}` failed: {message}")]
    EffectMaterial {
        id: EffectMaterialId,
        message: String,
    },

    #[error("texture `{id}` failed: {message}")]
    Texture { id: TextureId, message: String },

    #[error("model animator `{name}` failed: {message}")]
    ModelAnimator { name: String, message: String },

    #[error("child mesh `{id}` failed")]
    ChildMesh {
        id: PrimitiveId,
        #[source]
        source: Box<HydrationError>,
    },

    #[error("no mesh kind `{kind}` is registered")]
    UnknownMeshKind { kind: String },

    /// The pipeline was shut down before the plan finished.
    #[error("hydration pipeline stopped")]
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn nested_field_paths() {
        let err = DescriptorError::missing("VertexSize").within("Geometry");
        assert_eq!(err.to_string(), "missing field `Geometry.VertexSize`");
    }

    #[test]
    fn child_error_keeps_its_source() {
        let inner = HydrationError::Texture {
            id: TextureId::from("rust"),
            message: "decode".into(),
        };
        let err = HydrationError::ChildMesh {
            id: PrimitiveId::from("ship/hull"),
            source: Box::new(inner.clone()),
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some(inner.to_string()));
    }
}
