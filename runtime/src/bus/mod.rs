//! Typed message buses.
//!
//! [`EventBus`] and [`CommandBus`] share one dispatch core but are kept as
//! distinct types: an [`Event`] can never be subscribed to or posted on the
//! command channel, and a [`Command`] never reaches event subscribers.

mod command;
mod dispatch;
mod event;

use std::fmt;

pub use command::{Command, CommandBus};
pub use dispatch::Subscription;
pub use event::{Event, EventBus};

/// Explicit dispatch key of a message type.
///
/// Subscribers are grouped by tag and a message reaches exactly the
/// handlers registered under its own tag. Tags are plain strings chosen
/// where the message type is declared, usually through [`impl_event!`]
/// or [`impl_command!`], which derive them from the module path and the
/// type name.
///
/// Two message types must never share a tag. A payload whose concrete
/// type does not match the subscriber's expectation is dropped for that
/// subscriber and logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageTag(&'static str);

impl MessageTag {
    /// Creates a tag from a static name.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the tag name.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Implements [`Event`] for one or more types.
///
/// Without an explicit tag the tag is `module_path::TypeName`.
///
/// ```ignore
/// struct TextureHydrated { id: TextureId }
/// impl_event!(TextureHydrated);
///
/// struct WindowResized { width: u32, height: u32 }
/// impl_event!(WindowResized => "window.resized");
/// ```
#[macro_export]
macro_rules! impl_event {
    ($ty:ident => $tag:literal) => {
        impl $crate::Event for $ty {
            const TAG: $crate::MessageTag = $crate::MessageTag::new($tag);
        }
    };
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::Event for $ty {
                const TAG: $crate::MessageTag =
                    $crate::MessageTag::new(concat!(module_path!(), "::", stringify!($ty)));
            }
        )+
    };
}

/// Implements [`Command`] for one or more types.
///
/// Same tagging rules as [`impl_event!`].
#[macro_export]
macro_rules! impl_command {
    ($ty:ident => $tag:literal) => {
        impl $crate::Command for $ty {
            const TAG: $crate::MessageTag = $crate::MessageTag::new($tag);
        }
    };
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $crate::Command for $ty {
                const TAG: $crate::MessageTag =
                    $crate::MessageTag::new(concat!(module_path!(), "::", stringify!($ty)));
            }
        )+
    };
}
