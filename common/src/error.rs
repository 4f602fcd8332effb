use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems, raised before any stage runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// A failed call to one of the external services.
///
/// Stages absorb these: the unit of work yields no result and the error is
/// only reported through logs and the run summary.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{service}: request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service}: HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service}: malformed response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

/// Why a URL could not be turned into an address.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no host in {url:?}")]
    NoHost { url: String },

    #[error("lookup of {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{host} has no addresses")]
    NoAddress { host: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
