//! The discovery pipeline: query generation, search resolution and the
//! concurrent reverse lookup pass.

pub mod error;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod reverse;
pub mod search;

pub use error::PipelineError;
pub use pipeline::{Collaborators, Pipeline, PipelineEvents, RunOptions, Stores};
