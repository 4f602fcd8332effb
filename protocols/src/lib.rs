//! HTTP clients for the services revmap talks to.
//!
//! Each client implements one of the collaborator traits from
//! [`revmap_common::collaborators`] and translates transport, status and
//! decoding failures into [`CollaboratorError`].

pub mod gemini;
pub mod http;
pub mod reverse_ip;
pub mod search;

pub use gemini::GeminiClient;
pub use reverse_ip::ReverseIpClient;
pub use search::CustomSearchClient;

pub use revmap_common::error::CollaboratorError;
