//! Schema-free descriptors handed over by the persistence layer.

mod document;
mod value;

pub use document::Descriptor;
pub use value::Value;
