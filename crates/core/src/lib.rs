//! commitwatch core - pure commit-tracking logic with no I/O
//!
//! This crate holds the domain types, the ports (interfaces) for the
//! hosting platform, the chat notifier and durable storage, and the
//! tracking state machine that decides which commits are new. Network,
//! filesystem and runtime concerns live in adapters in the app crate.

pub mod domain;
pub mod ports;
pub mod tracking;
pub mod app;
pub mod error;

// Re-exports for ergonomics
pub use domain::*;
pub use error::*;
