//! Primitive targets populated in place by the hydration pipeline.

mod mesh;
mod model;

pub use mesh::{MeshPrimitive, RenderBufferSignature, RenderElement, TextureSlot};
pub(crate) use mesh::MeshContents;
pub use model::{MeshNode, ModelPrimitive};
pub(crate) use model::ModelContents;
