pub mod repo;
pub mod commit;
pub mod events;

// Re-exports for convenience
pub use repo::*;
pub use commit::*;
pub use events::*;
