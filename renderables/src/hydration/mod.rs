//! Asynchronous, dependency-joining construction of primitives.

mod mesh;
mod model;
mod pipeline;
mod plan;
mod queue;

use std::fmt;
use std::sync::Arc;

pub use pipeline::HydrationPipeline;

use crate::primitive::{MeshPrimitive, ModelPrimitive};

/// Kind of primitive a build queue holds. Each class has its own queue and
/// at most one plan in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Mesh,
    Model,
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceClass::Mesh => f.write_str("mesh"),
            ResourceClass::Model => f.write_str("model"),
        }
    }
}

/// The primitive a hydration request populates.
#[derive(Clone, Debug)]
pub enum HydrationTarget {
    Mesh(Arc<MeshPrimitive>),
    Model(Arc<ModelPrimitive>),
}

impl HydrationTarget {
    pub fn class(&self) -> ResourceClass {
        match self {
            HydrationTarget::Mesh(_) => ResourceClass::Mesh,
            HydrationTarget::Model(_) => ResourceClass::Model,
        }
    }
}

impl From<Arc<MeshPrimitive>> for HydrationTarget {
    fn from(mesh: Arc<MeshPrimitive>) -> Self {
        HydrationTarget::Mesh(mesh)
    }
}

impl From<Arc<ModelPrimitive>> for HydrationTarget {
    fn from(model: Arc<ModelPrimitive>) -> Self {
        HydrationTarget::Model(model)
    }
}
