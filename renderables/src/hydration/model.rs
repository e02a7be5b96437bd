use std::collections::HashSet;
use std::iter;
use std::sync::Arc;

use super::plan::{MeshLayout, ModelLayout};
use super::queue::QueuedPlan;
use crate::id::PrimitiveId;
use crate::messages::AnimatorHandle;
use crate::primitive::{MeshNode, MeshPrimitive, ModelContents, ModelPrimitive};

/// A child mesh hydration a model plan asks for when it starts.
pub(crate) struct ChildRequest {
    pub id: PrimitiveId,
    pub target: Arc<MeshPrimitive>,
    pub layout: MeshLayout,
}

/// A queued or in-progress model hydration.
///
/// Joins on every child mesh, then on the animator if one is declared.
pub(crate) struct ModelPlan {
    pub id: PrimitiveId,
    pub target: Arc<ModelPrimitive>,
    pub waiters: Vec<Arc<ModelPrimitive>>,
    layout: ModelLayout,
    /// Child mesh per node, allocated by [`start`](Self::start).
    children: Vec<Option<Arc<MeshPrimitive>>>,
    pending_children: HashSet<PrimitiveId>,
    animator_requested: bool,
    animator: Option<AnimatorHandle>,
}

impl ModelPlan {
    pub fn new(id: PrimitiveId, target: Arc<ModelPrimitive>, layout: ModelLayout) -> Self {
        Self {
            id,
            target,
            waiters: Vec::new(),
            children: vec![None; layout.nodes.len()],
            layout,
            pending_children: HashSet::new(),
            animator_requested: false,
            animator: None,
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &Arc<ModelPrimitive>> {
        iter::once(&self.target).chain(self.waiters.iter())
    }

    pub fn add_waiter(&mut self, target: Arc<ModelPrimitive>) {
        if self.targets().all(|t| !Arc::ptr_eq(t, &target)) {
            self.waiters.push(target);
        }
    }

    /// Allocates a target for every node that carries a mesh and returns
    /// the hydration requests for them.
    pub fn start(&mut self) -> Vec<ChildRequest> {
        let mut requests = Vec::new();
        for (slot, node) in self.children.iter_mut().zip(&self.layout.nodes) {
            let Some(layout) = &node.mesh else {
                continue;
            };
            let id = self.id.child(&node.name);
            let target = Arc::new(MeshPrimitive::new(id.clone()));
            *slot = Some(target.clone());
            self.pending_children.insert(id.clone());
            requests.push(ChildRequest {
                id,
                target,
                layout: layout.clone(),
            });
        }
        requests
    }

    pub fn waits_on_child(&self, id: &PrimitiveId) -> bool {
        self.pending_children.contains(id)
    }

    pub fn child_ready(&mut self, id: &PrimitiveId) -> bool {
        self.pending_children.remove(id)
    }

    pub fn children_ready(&self) -> bool {
        self.pending_children.is_empty()
    }

    /// The declared animator, if it still has to be requested.
    pub fn animator_to_request(&self) -> Option<&str> {
        if self.animator_requested || !self.children_ready() {
            return None;
        }
        self.layout.animator.as_deref()
    }

    pub fn mark_animator_requested(&mut self) {
        self.animator_requested = true;
    }

    /// Whether `name` is the animator this plan is waiting for.
    pub fn waits_on_animator(&self, name: &str) -> bool {
        self.animator_requested
            && self.animator.is_none()
            && self.layout.animator.as_deref() == Some(name)
    }

    pub fn link_animator(&mut self, handle: AnimatorHandle) {
        self.animator = Some(handle);
    }

    pub fn is_complete(&self) -> bool {
        self.children_ready() && (self.layout.animator.is_none() || self.animator.is_some())
    }

    pub fn contents(&self) -> ModelContents {
        let nodes = self
            .layout
            .nodes
            .iter()
            .zip(&self.children)
            .map(|(node, mesh)| MeshNode {
                name: node.name.clone(),
                parent: node.parent,
                mesh: mesh.clone(),
            })
            .collect();
        ModelContents {
            nodes,
            animator: self.animator,
        }
    }
}

impl QueuedPlan for ModelPlan {
    fn id(&self) -> &PrimitiveId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Descriptor, Value};
    use crate::hydration::plan::fixtures;

    fn plan(animator: bool) -> ModelPlan {
        let nodes = vec![
            Value::from(Descriptor::new().with("Name", "root")),
            Value::from(
                Descriptor::new()
                    .with("Name", "hull")
                    .with("Parent", 0)
                    .with("Mesh", fixtures::mesh("hull", vec!["metal"])),
            ),
            Value::from(
                Descriptor::new()
                    .with("Name", "mast")
                    .with("Parent", 1)
                    .with("Mesh", fixtures::mesh("mast", vec!["wood"])),
            ),
        ];
        let mut descriptor = Descriptor::new().with("MeshNodes", nodes);
        if animator {
            descriptor.insert("Animator", Descriptor::new().with("Name", "sway"));
        }
        let id = PrimitiveId::from("ship");
        let layout = ModelLayout::parse(&id, &descriptor).unwrap();
        ModelPlan::new(id.clone(), Arc::new(ModelPrimitive::new(id)), layout)
    }

    #[test]
    fn start_requests_one_hydration_per_mesh_node() {
        let mut plan = plan(false);
        let requests = plan.start();
        let ids: Vec<_> = requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["ship/hull", "ship/mast"]);
        assert!(plan.waits_on_child(&"ship/hull".into()));
        assert!(!plan.is_complete());
    }

    #[test]
    fn completes_after_all_children() {
        let mut plan = plan(false);
        plan.start();
        assert!(plan.child_ready(&"ship/hull".into()));
        assert!(!plan.child_ready(&"ship/hull".into()));
        assert!(!plan.is_complete());
        plan.child_ready(&"ship/mast".into());
        assert!(plan.is_complete());

        let contents = plan.contents();
        assert!(contents.nodes[0].mesh.is_none());
        assert_eq!(contents.nodes[2].parent, Some(1));
        assert_eq!(
            contents.nodes[1].mesh.as_ref().map(|m| m.id().as_str()),
            Some("ship/hull")
        );
    }

    #[test]
    fn animator_is_requested_after_children() {
        let mut plan = plan(true);
        plan.start();
        assert_eq!(plan.animator_to_request(), None);

        plan.child_ready(&"ship/hull".into());
        plan.child_ready(&"ship/mast".into());
        assert_eq!(plan.animator_to_request(), Some("sway"));
        assert!(!plan.waits_on_animator("sway"));

        plan.mark_animator_requested();
        assert_eq!(plan.animator_to_request(), None);
        assert!(plan.waits_on_animator("sway"));
        assert!(!plan.is_complete());

        plan.link_animator(AnimatorHandle(5));
        assert!(plan.is_complete());
        assert_eq!(plan.contents().animator, Some(AnimatorHandle(5)));
    }
}
