//! commitwatch application library
//!
//! Adapters for GitHub, webhooks and the state file, the reconciliation and
//! scheduling services, and the HTTP surface. Exposed for tests and for
//! embedding the tracker in another front end.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod http;
pub mod logging;
pub mod services;
