//! Import path normalization
//!
//! An import path such as `github.com/org/pkg` has to be mapped onto two other
//! namespaces: the directory name glide uses in its local cache, and the
//! project name on the mirror host. Both mappings are pure and deterministic,
//! since they are the only link between a dependency and its mirror.

use regex::Regex;

use crate::error::{Error, Result};

/// Runs of path separators in an import path.
const SEPARATOR_PATTERN: &str = r"/+";

/// Separators plus dots, which the mirror host does not accept in names.
const MIRROR_PATTERN: &str = r"[/.]+";

/// The names derived from one import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// Directory name of the local clone, e.g. `github.com-org-pkg`.
    pub cache_name: String,
    /// Project name on the mirror host, e.g. `github-com-org-pkg`.
    pub mirror_name: String,
}

/// Compiled hyphenation rules for import paths.
#[derive(Debug, Clone)]
pub struct Normalizer {
    separators: Regex,
    separators_and_dots: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            separators: Regex::new(SEPARATOR_PATTERN).map_err(Error::Regex)?,
            separators_and_dots: Regex::new(MIRROR_PATTERN).map_err(Error::Regex)?,
        })
    }

    /// Replace every run of path separators with a single hyphen.
    pub fn cache_name(&self, import_path: &str) -> String {
        self.separators.replace_all(import_path, "-").into_owned()
    }

    /// Replace every run of path separators and dots with a single hyphen.
    ///
    /// Paths that differ only in dot-vs-separator placement map to the same
    /// name; detecting that is left to the caller.
    pub fn mirror_name(&self, import_path: &str) -> String {
        self.separators_and_dots
            .replace_all(import_path, "-")
            .into_owned()
    }

    pub fn normalize(&self, import_path: &str) -> NormalizedName {
        NormalizedName {
            cache_name: self.cache_name(import_path),
            mirror_name: self.mirror_name(import_path),
        }
    }
}
