//! Default values for glide-mirror.
//!
//! This module provides centralized default values used across the library
//! and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// The manifest glide reads and this tool rewrites.
pub const MANIFEST_FILE: &str = "glide.yaml";

/// Scratch manifest written by `glide init`.
pub const GENERATED_MANIFEST_FILE: &str = "glide.new";

/// Lock document written by `glide install`.
pub const LOCK_FILE: &str = "glide.lock";

/// Directory glide installs dependencies into.
pub const VENDOR_DIR: &str = "vendor";

/// Name of the remote used as push target in each cached clone.
pub const UPSTREAM_REMOTE: &str = "upstream";

/// Default resolver binary.
pub const GLIDE_BINARY: &str = "glide";

/// Default version-control binary.
pub const GIT_BINARY: &str = "git";

/// Prefix glide puts in front of cache directories fetched over HTTPS.
pub const CACHE_SCHEME: &str = "https";

/// Page size requested when listing a namespace.
pub const PROJECTS_PER_PAGE: u32 = 100;

pub const USER_AGENT: &str = concat!("glide-mirror/", env!("CARGO_PKG_VERSION"));

/// Returns glide's home directory (`~/.glide`).
///
/// Falls back to `.glide` in the current directory if the home directory
/// cannot be determined.
///
/// This can be overridden by the `--glide-home` CLI flag or the
/// `GLIDE_HOME` environment variable.
pub fn default_glide_home() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".glide"))
        .unwrap_or_else(|| PathBuf::from(".glide"))
}

/// Returns the directory holding glide's source clones for a given home.
pub fn cache_root(glide_home: &std::path::Path) -> PathBuf {
    glide_home.join("cache").join("src")
}
