//! Location of glide's on-disk source cache
//!
//! glide keeps one full clone per dependency under
//! `<glide home>/cache/src/<scheme>-<cache name>`. A dependency can only be
//! mirrored if that clone exists; this module answers that question and
//! nothing more. It never validates the clone itself.

use std::path::{Path, PathBuf};

use crate::defaults::CACHE_SCHEME;

/// Path of the cached clone for a normalized cache name.
pub fn clone_path(cache_root: &Path, cache_name: &str) -> PathBuf {
    cache_root.join(format!("{}-{}", CACHE_SCHEME, cache_name))
}

/// Whether a cached clone directory exists for `cache_name`.
pub fn has_local_clone(cache_root: &Path, cache_name: &str) -> bool {
    clone_path(cache_root, cache_name).is_dir()
}
