//! Shared building blocks for revmap: configuration, the error taxonomy,
//! logging macros, collaborator contracts and the persistent [`store::DedupSet`].

pub mod collaborators;
pub mod config;
pub mod error;
pub mod log;
pub mod models;
pub mod store;

pub use tracing;
