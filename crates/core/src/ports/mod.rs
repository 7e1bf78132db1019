pub mod source;
pub mod notifier;
pub mod persistence;
pub mod time;

// Re-exports
pub use source::*;
pub use notifier::*;
pub use persistence::*;
pub use time::*;
