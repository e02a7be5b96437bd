//! System services and the cooperative scheduler that drives them.

mod scheduler;
mod state;
mod system_service;

pub use scheduler::{AllServicesInitialized, ServiceScheduler};
pub use state::ServiceState;
pub use system_service::{ServiceResult, SystemService};
