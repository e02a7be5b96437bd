//! # RedLilium Renderables
//!
//! Render-ready primitives and the pipeline that builds them from persisted
//! descriptors without blocking the frame loop.
//!
//! ## Primitives
//!
//! - [`MeshPrimitive`] — Render buffer plus effects, texture maps and render elements
//! - [`ModelPrimitive`] — Node hierarchy of meshes with an optional animator
//!
//! Both are allocated empty by the caller and populated in place by the
//! [`HydrationPipeline`]. Their [`Readiness`] only reaches `Ready` once every
//! declared sub-resource is available.
//!
//! ## Descriptors
//!
//! - [`Descriptor`] — Schema-free key/value document describing one primitive
//! - [`Value`] — Format-agnostic value stored in a descriptor
//!
//! ## Hydration
//!
//! [`HydrationPipeline`] is a [`SystemService`](redlilium_runtime::SystemService).
//! It issues [`BuildRenderBuffer`] and [`BuildModelAnimator`] commands, listens
//! for the completion events of the render buffer, effect material, texture
//! and animator subsystems, and publishes [`MeshHydrated`] / [`ModelHydrated`]
//! or their failure counterparts.
//!
//! Extra mesh kinds plug in through [`MeshConstitutor`] and share the mesh
//! queue.

mod catalog;
mod config;
mod constitutor;
mod descriptor;
mod error;
mod hydration;
mod id;
mod messages;
mod primitive;
mod readiness;

pub use catalog::{EffectMaterialQuery, TextureQuery};
pub use config::HydrationConfig;
pub use constitutor::MeshConstitutor;
pub use descriptor::{Descriptor, Value};
pub use error::{DescriptorError, HydrationError};
pub use hydration::{HydrationPipeline, HydrationTarget, ResourceClass};
pub use id::{EffectMaterialId, PrimitiveId, TextureId};
pub use messages::{
    AnimatorHandle, BuildModelAnimator, BuildModelAnimatorFailed, BuildRenderBuffer,
    BuildRenderBufferFailed, ConstituteMesh, EffectMaterialHydrated, HydrateEffectMaterialFailed,
    HydrateMesh, HydrateModel, HydrateTextureFailed, MeshHydrated, MeshHydrationFailed,
    ModelAnimatorBuilt, ModelHydrated, ModelHydrationFailed, RenderBufferBuilt,
    RenderBufferHandle, TextureHydrated,
};
pub use primitive::{
    MeshNode, MeshPrimitive, ModelPrimitive, RenderBufferSignature, RenderElement, TextureSlot,
};
pub use readiness::Readiness;
