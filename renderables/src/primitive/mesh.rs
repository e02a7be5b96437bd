use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::HydrationError;
use crate::id::{EffectMaterialId, PrimitiveId, TextureId};
use crate::messages::RenderBufferHandle;
use crate::readiness::Readiness;

/// Byte layout of the render buffer a mesh needs, sent with
/// [`BuildRenderBuffer`](crate::BuildRenderBuffer).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderBufferSignature {
    /// Buffer name; completion events are matched on it.
    pub name: String,
    pub vertex_buffer_name: String,
    pub index_buffer_name: String,
    pub vertex_format: String,
    /// Bytes per vertex.
    pub vertex_size: u32,
    pub vertex_capacity: u32,
    pub index_capacity: u32,
}

impl RenderBufferSignature {
    /// Size of an index in bytes.
    pub const INDEX_SIZE: usize = 4;

    pub fn new(
        name: impl Into<String>,
        vertex_format: impl Into<String>,
        vertex_size: u32,
        vertex_capacity: u32,
        index_capacity: u32,
    ) -> Self {
        let name = name.into();
        Self {
            vertex_buffer_name: format!("{name}.vtx"),
            index_buffer_name: format!("{name}.idx"),
            name,
            vertex_format: vertex_format.into(),
            vertex_size,
            vertex_capacity,
            index_capacity,
        }
    }

    pub fn vertex_byte_size(&self) -> usize {
        self.vertex_size as usize * self.vertex_capacity as usize
    }

    pub fn index_byte_size(&self) -> usize {
        self.index_capacity as usize * Self::INDEX_SIZE
    }
}

/// One texture bound to a mesh segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureSlot {
    /// Shader semantic the texture is bound to, e.g. `"DiffuseMap"`.
    pub semantic: String,
    pub texture: TextureId,
    /// Index into the semantic's texture array.
    pub array_index: u32,
}

/// A drawable segment: one effect over a range of the mesh's render buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderElement {
    pub segment: usize,
    pub effect: EffectMaterialId,
    pub textures: Vec<TextureSlot>,
    pub render_list_id: Option<i64>,
}

/// Everything a hydrated mesh holds. Swapped in at once on finalization.
#[derive(Clone, Debug)]
pub(crate) struct MeshContents {
    pub render_buffer: RenderBufferHandle,
    pub signature: RenderBufferSignature,
    pub effects: Vec<EffectMaterialId>,
    pub texture_maps: Vec<Vec<TextureSlot>>,
    pub render_elements: Vec<RenderElement>,
    pub render_list_id: Option<i64>,
    pub visual_technique: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default)]
struct MeshState {
    readiness: Readiness,
    /// Linked as soon as the buffer is built, before the mesh is ready.
    render_buffer: Option<RenderBufferHandle>,
    contents: Option<MeshContents>,
    failure: Option<HydrationError>,
}

/// A renderable mesh.
///
/// Allocated empty by the caller, then populated by the
/// [`HydrationPipeline`](crate::HydrationPipeline).
///
/// Effects, texture maps, render elements and the signature stay empty
/// until [`readiness`](Self::readiness) is `Ready`. The one exception is
/// [`render_buffer`](Self::render_buffer): it is linked as soon as the
/// device has built the buffer, while the mesh is still `Loading`, and
/// stays linked if the hydration fails afterwards.
#[derive(Debug)]
pub struct MeshPrimitive {
    id: PrimitiveId,
    kind: String,
    state: RwLock<MeshState>,
}

impl MeshPrimitive {
    /// Kind of a mesh created with [`new`](Self::new).
    pub const DEFAULT_KIND: &'static str = "Mesh";

    pub fn new(id: impl Into<PrimitiveId>) -> Self {
        Self::with_kind(id, Self::DEFAULT_KIND)
    }

    /// Creates an empty mesh of a registered custom kind.
    pub fn with_kind(id: impl Into<PrimitiveId>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            state: RwLock::new(MeshState::default()),
        }
    }

    pub fn id(&self) -> &PrimitiveId {
        &self.id
    }

    /// Name of the mesh kind that constituted this mesh.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn readiness(&self) -> Readiness {
        self.state.read().readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().is_ready()
    }

    /// The linked render buffer. Available before the mesh is ready.
    pub fn render_buffer(&self) -> Option<RenderBufferHandle> {
        self.state.read().render_buffer
    }

    pub fn signature(&self) -> Option<RenderBufferSignature> {
        self.read_contents(|c| c.signature.clone())
    }

    pub fn effects(&self) -> Vec<EffectMaterialId> {
        self.read_contents(|c| c.effects.clone()).unwrap_or_default()
    }

    pub fn texture_maps(&self) -> Vec<Vec<TextureSlot>> {
        self.read_contents(|c| c.texture_maps.clone())
            .unwrap_or_default()
    }

    pub fn render_elements(&self) -> Vec<RenderElement> {
        self.read_contents(|c| c.render_elements.clone())
            .unwrap_or_default()
    }

    pub fn render_list_id(&self) -> Option<i64> {
        self.read_contents(|c| c.render_list_id).flatten()
    }

    pub fn visual_technique(&self) -> BTreeMap<String, String> {
        self.read_contents(|c| c.visual_technique.clone())
            .unwrap_or_default()
    }

    /// The error of the last failed hydration attempt, if any.
    pub fn last_failure(&self) -> Option<HydrationError> {
        self.state.read().failure.clone()
    }

    fn read_contents<T>(&self, f: impl FnOnce(&MeshContents) -> T) -> Option<T> {
        self.state.read().contents.as_ref().map(f)
    }

    pub(crate) fn set_readiness(&self, readiness: Readiness) {
        self.state.write().readiness = readiness;
    }

    pub(crate) fn link_render_buffer(&self, handle: RenderBufferHandle) {
        self.state.write().render_buffer = Some(handle);
    }

    pub(crate) fn finalize(&self, contents: MeshContents) {
        let mut state = self.state.write();
        state.render_buffer = Some(contents.render_buffer);
        state.contents = Some(contents);
        state.failure = None;
        state.readiness = Readiness::Ready;
    }

    pub(crate) fn record_failure(&self, error: HydrationError) {
        self.state.write().failure = Some(error);
    }

    /// Copies the hydrated state of `other` into `self`.
    pub(crate) fn adopt(&self, other: &MeshPrimitive) {
        let snapshot = other.state.read().clone();
        *self.state.write() = snapshot;
    }
}
