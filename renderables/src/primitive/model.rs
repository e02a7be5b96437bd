use std::sync::Arc;

use parking_lot::RwLock;

use super::MeshPrimitive;
use crate::error::HydrationError;
use crate::id::PrimitiveId;
use crate::messages::AnimatorHandle;
use crate::readiness::Readiness;

/// One node of a model's hierarchy.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub name: String,
    /// Index of the parent node; `None` for a root.
    pub parent: Option<usize>,
    /// `None` for a transform-only node.
    pub mesh: Option<Arc<MeshPrimitive>>,
}

#[derive(Clone, Debug)]
pub(crate) struct ModelContents {
    pub nodes: Vec<MeshNode>,
    pub animator: Option<AnimatorHandle>,
}

#[derive(Clone, Debug, Default)]
struct ModelState {
    readiness: Readiness,
    contents: Option<ModelContents>,
    failure: Option<HydrationError>,
}

/// A composite renderable: a node hierarchy whose nodes may carry meshes,
/// plus an optional animator.
///
/// Becomes `Ready` only after every child mesh is ready and the animator,
/// if declared, has been built.
#[derive(Debug)]
pub struct ModelPrimitive {
    id: PrimitiveId,
    state: RwLock<ModelState>,
}

impl ModelPrimitive {
    pub fn new(id: impl Into<PrimitiveId>) -> Self {
        Self {
            id: id.into(),
            state: RwLock::new(ModelState::default()),
        }
    }

    pub fn id(&self) -> &PrimitiveId {
        &self.id
    }

    pub fn readiness(&self) -> Readiness {
        self.state.read().readiness
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().is_ready()
    }

    pub fn nodes(&self) -> Vec<MeshNode> {
        self.state
            .read()
            .contents
            .as_ref()
            .map(|c| c.nodes.clone())
            .unwrap_or_default()
    }

    /// Child mesh of the node called `name`.
    pub fn mesh(&self, name: &str) -> Option<Arc<MeshPrimitive>> {
        let state = self.state.read();
        state
            .contents
            .as_ref()?
            .nodes
            .iter()
            .find(|n| n.name == name)?
            .mesh
            .clone()
    }

    pub fn animator(&self) -> Option<AnimatorHandle> {
        self.state.read().contents.as_ref()?.animator
    }

    pub fn last_failure(&self) -> Option<HydrationError> {
        self.state.read().failure.clone()
    }

    pub(crate) fn set_readiness(&self, readiness: Readiness) {
        self.state.write().readiness = readiness;
    }

    pub(crate) fn finalize(&self, contents: ModelContents) {
        let mut state = self.state.write();
        state.contents = Some(contents);
        state.failure = None;
        state.readiness = Readiness::Ready;
    }

    pub(crate) fn record_failure(&self, error: HydrationError) {
        self.state.write().failure = Some(error);
    }

    pub(crate) fn adopt(&self, other: &ModelPrimitive) {
        let snapshot = other.state.read().clone();
        *self.state.write() = snapshot;
    }
}
