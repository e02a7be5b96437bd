//! Commands and events exchanged with the collaborating subsystems.
//!
//! The render buffer, effect material, texture and animator subsystems
//! live outside this crate. They answer the commands below by posting the
//! matching completion or failure event on the event bus.

use std::sync::Arc;

use redlilium_runtime::{impl_command, impl_event};

use crate::descriptor::Descriptor;
use crate::error::HydrationError;
use crate::id::{EffectMaterialId, PrimitiveId, TextureId};
use crate::primitive::{MeshPrimitive, ModelPrimitive, RenderBufferSignature};

/// Opaque handle of a built render buffer, chosen by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderBufferHandle(pub u64);

/// Opaque handle of a built model animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimatorHandle(pub u64);

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Build the render buffer described by `signature`.
#[derive(Clone, Debug)]
pub struct BuildRenderBuffer {
    pub signature: RenderBufferSignature,
}

/// Build the animator `name` for `model`.
#[derive(Clone, Debug)]
pub struct BuildModelAnimator {
    pub name: String,
    pub model: PrimitiveId,
}

/// Command form of a mesh hydration request.
#[derive(Clone, Debug)]
pub struct HydrateMesh {
    pub id: PrimitiveId,
    pub target: Arc<MeshPrimitive>,
    pub descriptor: Descriptor,
}

/// Command form of a model hydration request.
#[derive(Clone, Debug)]
pub struct HydrateModel {
    pub id: PrimitiveId,
    pub target: Arc<ModelPrimitive>,
    pub descriptor: Descriptor,
}

/// Command form of [`constitute_mesh`](crate::HydrationPipeline::constitute_mesh).
///
/// The created mesh is delivered with [`MeshHydrated`].
#[derive(Clone, Debug)]
pub struct ConstituteMesh {
    pub kind: String,
    pub id: PrimitiveId,
    pub descriptor: Descriptor,
}

impl_command!(
    BuildRenderBuffer,
    BuildModelAnimator,
    HydrateMesh,
    HydrateModel,
    ConstituteMesh
);

// ---------------------------------------------------------------------------
// Collaborator events
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct RenderBufferBuilt {
    pub name: String,
    pub handle: RenderBufferHandle,
}

#[derive(Clone, Debug)]
pub struct BuildRenderBufferFailed {
    pub name: String,
    pub error: String,
}

#[derive(Clone, Debug)]
pub struct EffectMaterialHydrated {
    pub id: EffectMaterialId,
}

#[derive(Clone, Debug)]
pub struct HydrateEffectMaterialFailed {
    pub id: EffectMaterialId,
    pub error: String,
}

#[derive(Clone, Debug)]
pub struct TextureHydrated {
    pub id: TextureId,
}

#[derive(Clone, Debug)]
pub struct HydrateTextureFailed {
    pub id: TextureId,
    pub error: String,
}

#[derive(Clone, Debug)]
pub struct ModelAnimatorBuilt {
    pub name: String,
    pub handle: AnimatorHandle,
}

#[derive(Clone, Debug)]
pub struct BuildModelAnimatorFailed {
    pub name: String,
    pub error: String,
}

impl_event!(
    RenderBufferBuilt,
    BuildRenderBufferFailed,
    EffectMaterialHydrated,
    HydrateEffectMaterialFailed,
    TextureHydrated,
    HydrateTextureFailed,
    ModelAnimatorBuilt,
    BuildModelAnimatorFailed,
);

// ---------------------------------------------------------------------------
// Pipeline events
// ---------------------------------------------------------------------------

/// `mesh` is ready.
#[derive(Clone, Debug)]
pub struct MeshHydrated {
    pub id: PrimitiveId,
    pub mesh: Arc<MeshPrimitive>,
}

#[derive(Clone, Debug)]
pub struct MeshHydrationFailed {
    pub id: PrimitiveId,
    pub error: HydrationError,
}

/// `model` and all its child meshes are ready.
#[derive(Clone, Debug)]
pub struct ModelHydrated {
    pub id: PrimitiveId,
    pub model: Arc<ModelPrimitive>,
}

#[derive(Clone, Debug)]
pub struct ModelHydrationFailed {
    pub id: PrimitiveId,
    pub error: HydrationError,
}

impl_event!(
    MeshHydrated,
    MeshHydrationFailed,
    ModelHydrated,
    ModelHydrationFailed
);
