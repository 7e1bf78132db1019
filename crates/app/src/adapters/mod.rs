pub mod github;
pub mod log;
pub mod persistence;
pub mod webhook;
