//! Run configuration
//!
//! Everything a mirroring run needs to know, gathered once at startup (by the
//! CLI, or by an embedding program) and read-only afterwards.

use std::path::PathBuf;

use crate::defaults::{self, GLIDE_BINARY, MANIFEST_FILE, UPSTREAM_REMOTE};
use crate::gitlab::ApiVersion;

/// Settings for one mirroring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Base URL of the mirror host, e.g. `https://git.example.com`.
    pub host_url: String,
    /// Name of the group mirrors are created in.
    pub namespace: String,
    /// API token sent as a bearer credential.
    pub token: String,
    pub api_version: ApiVersion,
    /// Directory holding the project's `glide.yaml`.
    pub project_dir: PathBuf,
    /// glide's home directory; its source cache lives below it.
    pub glide_home: PathBuf,
    pub glide_binary: String,
    /// Remote configured in each cached clone as the push target.
    pub remote: String,
}

impl MirrorConfig {
    /// A configuration with every optional setting at its default.
    pub fn new(
        host_url: impl Into<String>,
        namespace: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            host_url: host_url.into(),
            namespace: namespace.into(),
            token: token.into(),
            api_version: ApiVersion::default(),
            project_dir: PathBuf::from("."),
            glide_home: defaults::default_glide_home(),
            glide_binary: GLIDE_BINARY.to_string(),
            remote: UPSTREAM_REMOTE.to_string(),
        }
    }

    /// Where cached clones are looked up.
    pub fn cache_root(&self) -> PathBuf {
        defaults::cache_root(&self.glide_home)
    }

    /// The manifest that gets rewritten.
    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join(MANIFEST_FILE)
    }
}
