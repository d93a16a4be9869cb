//! # Error Handling
//!
//! This module defines the centralized error type for `glide-mirror`. It uses
//! the `thiserror` library to create an `Error` enum covering every failure
//! mode of a mirroring run.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries enough context (URL,
//!   command, captured output, path) to act on the failure without re-running
//!   with extra logging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every variant is fatal to a run. The only non-error skip in the pipeline
//! (a dependency with no local clone) is modelled as a value, not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for glide-mirror operations
#[derive(Error, Debug)]
pub enum Error {
    /// The namespace search on the mirror host returned nothing usable.
    #[error("Namespace not found on mirror host: {name}")]
    NamespaceNotFound { name: String },

    /// The namespace search matched more than one group.
    #[error("Namespace '{name}' is ambiguous, candidates: {}", candidates.join(", "))]
    NamespaceAmbiguous {
        name: String,
        candidates: Vec<String>,
    },

    /// The mirror host refused to create a project because the name is taken.
    #[error("Mirror project '{name}' already exists in namespace {namespace_id}")]
    ProjectConflict { name: String, namespace_id: u64 },

    /// The mirror host answered with a non-success status.
    #[error("Mirror host API error for {url}: HTTP {status} - {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("Network operation error: {url} - {message}")]
    Network { url: String, message: String },

    /// An external tool exited with a non-zero status.
    ///
    /// `output` holds the combined stdout and stderr of the failing call.
    #[error("Command `{command}` failed in {}:\n{output}", dir.display())]
    Subprocess {
        command: String,
        dir: PathBuf,
        output: String,
    },

    /// An external tool could not be started at all.
    #[error("Unable to run '{tool}': {message}")]
    ToolNotFound { tool: String, message: String },

    /// A manifest or lock document could not be read.
    #[error("Failed to parse {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// Two different import paths normalize to the same mirror project name.
    #[error("Mirror name collision on '{mirror_name}': '{first}' and '{second}'")]
    MirrorNameCollision {
        mirror_name: String,
        first: String,
        second: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
