//! Driving the external dependency resolver
//!
//! glide computes the dependency graph; this crate only invokes it and reads
//! what it produces. The two invocations form a pipeline:
//!
//! 1. **Generate**: clear glide's cache, run `glide init` into a scratch file
//!    and parse it as a [`Manifest`].
//! 2. **Lock**: with the cleaned manifest in place, run `glide install` and
//!    parse the resulting [`Lockfile`].
//!
//! Scratch documents are deleted as soon as they are parsed, so only
//! `glide.yaml` survives a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::defaults::{GENERATED_MANIFEST_FILE, GLIDE_BINARY, LOCK_FILE, VENDOR_DIR};
use crate::error::Result;
use crate::manifest::{self, Lockfile, Manifest};
use crate::process;

/// The two resolver stages the orchestrator depends on.
pub trait DependencyResolver: Send + Sync {
    /// Derive a manifest from the project's source imports.
    fn generate_manifest(&self) -> Result<Manifest>;

    /// Resolve the manifest currently on disk into a pinned lock.
    fn lock(&self) -> Result<Lockfile>;
}

/// [`DependencyResolver`] backed by the `glide` command line tool.
#[derive(Debug, Clone)]
pub struct GlideResolver {
    binary: String,
    project_dir: PathBuf,
}

impl GlideResolver {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: GLIDE_BINARY.to_string(),
            project_dir: project_dir.into(),
        }
    }

    /// Use a different glide executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn glide(&self, args: &[&str]) -> Result<String> {
        let mut full_args = vec!["--no-color"];
        full_args.extend_from_slice(args);

        let output = process::run(&self.binary, &full_args, &self.project_dir)?;
        info!(
            "Executing '{}':\n{}",
            process::display_command(&self.binary, &full_args),
            output
        );
        Ok(output)
    }
}

impl DependencyResolver for GlideResolver {
    fn generate_manifest(&self) -> Result<Manifest> {
        let generated = self.project_dir.join(GENERATED_MANIFEST_FILE);

        self.glide(&["cache-clear"])?;

        info!("Removing '{}' file if exists...", GENERATED_MANIFEST_FILE);
        remove_file_if_exists(&generated)?;

        self.glide(&["--yaml", GENERATED_MANIFEST_FILE, "init", "--non-interactive"])?;

        info!("Reading '{}' file...", GENERATED_MANIFEST_FILE);
        let parsed = manifest::read_manifest(&generated);
        remove_file_if_exists(&generated)?;
        parsed
    }

    fn lock(&self) -> Result<Lockfile> {
        let lock_path = self.project_dir.join(LOCK_FILE);

        info!("Removing '{}' file if exists...", LOCK_FILE);
        remove_file_if_exists(&lock_path)?;

        info!("Purging '{}' directory...", VENDOR_DIR);
        remove_dir_if_exists(&self.project_dir.join(VENDOR_DIR))?;

        self.glide(&["install", "--strip-vendor"])?;

        info!("Reading '{}' file...", LOCK_FILE);
        let parsed = manifest::read_lockfile(&lock_path);
        remove_file_if_exists(&lock_path)?;
        parsed
    }
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
