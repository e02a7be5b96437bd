//! Custom mesh kinds.
//!
//! A mesh kind is registered on the
//! [`HydrationPipeline`](crate::HydrationPipeline) under a name together
//! with a [`MeshConstitutor`]. The constitutor validates the kind-specific
//! part of a descriptor and returns the plain mesh descriptor to hydrate.
//! From then on a custom mesh goes through the mesh queue like any other:
//! same render buffer build, same join, same events.
//!
//! ```ignore
//! pipeline.register_mesh_kind("SkinMesh", |_: &PrimitiveId, d: &Descriptor| {
//!     d.require_map("Skin")?;
//!     Ok(d.clone())
//! });
//! let mesh = pipeline.constitute_mesh("SkinMesh", "knight/body", &descriptor)?;
//! ```

use crate::descriptor::Descriptor;
use crate::error::DescriptorError;
use crate::id::PrimitiveId;

pub trait MeshConstitutor: Send + Sync {
    /// Returns the mesh descriptor to hydrate for `id`, or why `descriptor`
    /// does not describe a mesh of this kind.
    fn constitute(
        &self,
        id: &PrimitiveId,
        descriptor: &Descriptor,
    ) -> Result<Descriptor, DescriptorError>;
}

impl<F> MeshConstitutor for F
where
    F: Fn(&PrimitiveId, &Descriptor) -> Result<Descriptor, DescriptorError> + Send + Sync,
{
    fn constitute(
        &self,
        id: &PrimitiveId,
        descriptor: &Descriptor,
    ) -> Result<Descriptor, DescriptorError> {
        self(id, descriptor)
    }
}
