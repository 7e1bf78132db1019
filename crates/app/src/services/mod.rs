pub mod app_service;
pub mod reconciler;
pub mod scheduler;

pub use app_service::AppService;
pub use reconciler::Reconciler;
pub use scheduler::Scheduler;
