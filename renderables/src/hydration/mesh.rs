use std::collections::{HashMap, HashSet};
use std::iter;
use std::sync::Arc;

use super::plan::MeshLayout;
use super::queue::QueuedPlan;
use crate::catalog::{EffectMaterialQuery, TextureQuery};
use crate::error::HydrationError;
use crate::id::{EffectMaterialId, PrimitiveId, TextureId};
use crate::messages::RenderBufferHandle;
use crate::primitive::{MeshContents, MeshPrimitive, RenderElement};

/// Tracks which sub-resources of the current mesh are still outstanding.
///
/// Starts with every declared effect and texture pending. Completion
/// events may arrive in any order, before or after the render buffer.
#[derive(Debug)]
pub(crate) struct MeshJoin {
    buffer: Option<RenderBufferHandle>,
    pending_effects: HashSet<EffectMaterialId>,
    pending_textures: HashSet<TextureId>,
}

impl MeshJoin {
    pub fn new(layout: &MeshLayout) -> Self {
        Self {
            buffer: None,
            pending_effects: layout.effects.iter().cloned().collect(),
            pending_textures: layout.textures().cloned().collect(),
        }
    }

    pub fn buffer(&self) -> Option<RenderBufferHandle> {
        self.buffer
    }

    pub fn link_buffer(&mut self, handle: RenderBufferHandle) {
        self.buffer = Some(handle);
    }

    pub fn waits_on_effect(&self, id: &EffectMaterialId) -> bool {
        self.pending_effects.contains(id)
    }

    pub fn waits_on_texture(&self, id: &TextureId) -> bool {
        self.pending_textures.contains(id)
    }

    /// Returns `true` if the effect was outstanding.
    pub fn effect_ready(&mut self, id: &EffectMaterialId) -> bool {
        self.pending_effects.remove(id)
    }

    /// Returns `true` if the texture was outstanding.
    pub fn texture_ready(&mut self, id: &TextureId) -> bool {
        self.pending_textures.remove(id)
    }

    /// Drops every outstanding sub-resource the subsystems report as loaded.
    pub fn resolve_loaded(&mut self, effects: &dyn EffectMaterialQuery, textures: &dyn TextureQuery) {
        self.pending_effects.retain(|id| !effects.is_ready(id));
        self.pending_textures.retain(|id| !textures.is_ready(id));
    }

    pub fn is_complete(&self) -> bool {
        self.buffer.is_some() && self.pending_effects.is_empty() && self.pending_textures.is_empty()
    }

    pub fn outstanding(&self) -> usize {
        usize::from(self.buffer.is_none()) + self.pending_effects.len() + self.pending_textures.len()
    }
}

/// Effects and textures whose subsystem reported a failure that no later
/// completion event has cleared.
///
/// Kept for every id, not only those of the current plan, so a plan that
/// declares an already failed sub-resource fails when it is promoted
/// instead of waiting for a completion that never comes.
#[derive(Debug, Default)]
pub(crate) struct FailedDependencies {
    effects: HashMap<EffectMaterialId, String>,
    textures: HashMap<TextureId, String>,
}

impl FailedDependencies {
    pub fn effect_failed(&mut self, id: &EffectMaterialId, message: &str) {
        self.effects.insert(id.clone(), message.to_owned());
    }

    pub fn texture_failed(&mut self, id: &TextureId, message: &str) {
        self.textures.insert(id.clone(), message.to_owned());
    }

    pub fn effect_recovered(&mut self, id: &EffectMaterialId) {
        self.effects.remove(id);
    }

    pub fn texture_recovered(&mut self, id: &TextureId) {
        self.textures.remove(id);
    }

    /// The failure of the first declared effect, then texture, of `layout`
    /// that is known to have failed.
    pub fn first_failure(&self, layout: &MeshLayout) -> Option<HydrationError> {
        let effect = layout.effects.iter().find_map(|id| {
            self.effects.get(id).map(|message| HydrationError::EffectMaterial {
                id: id.clone(),
                message: message.clone(),
            })
        });
        effect.or_else(|| {
            layout.textures().find_map(|id| {
                self.textures.get(id).map(|message| HydrationError::Texture {
                    id: id.clone(),
                    message: message.clone(),
                })
            })
        })
    }
}

/// A queued or in-progress mesh hydration.
pub(crate) struct MeshPlan {
    pub id: PrimitiveId,
    pub target: Arc<MeshPrimitive>,
    /// Targets of later requests for the same id, populated with the same result.
    pub waiters: Vec<Arc<MeshPrimitive>>,
    pub layout: MeshLayout,
    pub join: MeshJoin,
}

impl MeshPlan {
    pub fn new(id: PrimitiveId, target: Arc<MeshPrimitive>, layout: MeshLayout) -> Self {
        let join = MeshJoin::new(&layout);
        Self {
            id,
            target,
            waiters: Vec::new(),
            layout,
            join,
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &Arc<MeshPrimitive>> {
        iter::once(&self.target).chain(self.waiters.iter())
    }

    /// Adds the target of a coalesced request.
    pub fn add_waiter(&mut self, target: Arc<MeshPrimitive>) {
        if self.targets().all(|t| !Arc::ptr_eq(t, &target)) {
            self.waiters.push(target);
        }
    }

    /// What the target holds once hydrated. `None` until the buffer is linked.
    pub fn contents(&self) -> Option<MeshContents> {
        let render_buffer = self.join.buffer()?;
        let layout = &self.layout;
        let render_elements = layout
            .effects
            .iter()
            .enumerate()
            .map(|(segment, effect)| RenderElement {
                segment,
                effect: effect.clone(),
                textures: layout.texture_maps.get(segment).cloned().unwrap_or_default(),
                render_list_id: layout.render_list_id,
            })
            .collect();

        Some(MeshContents {
            render_buffer,
            signature: layout.signature.clone(),
            effects: layout.effects.clone(),
            texture_maps: layout.texture_maps.clone(),
            render_elements,
            render_list_id: layout.render_list_id,
            visual_technique: layout.visual_technique.clone(),
        })
    }
}

impl QueuedPlan for MeshPlan {
    fn id(&self) -> &PrimitiveId {
        &self.id
    }
}
