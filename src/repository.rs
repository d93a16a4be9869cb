//! # Repository Synchronization
//!
//! This module provides the `RepositorySynchronizer`, which mirrors one
//! dependency at a time: it finds the dependency's cached clone, resolves or
//! creates the matching mirror project, points the clone's upstream remote at
//! it and pushes every branch and then every tag.
//!
//! ## Design
//!
//! The synchronizer is built around two traits that separate the mirroring
//! logic from the concrete git and filesystem work:
//!
//! - **`GitOperations`**: remote configuration and content transfer.
//! - **`CacheOperations`**: locating cached clones on disk.
//!
//! `DefaultGitOperations` and `DefaultCacheOperations` wrap the `git` command
//! and glide's cache layout. Tests swap in recording implementations.
//!
//! Per-run state lives in a [`MirrorSession`]: the namespace, the inventory
//! snapshot (extended with projects created during the run) and the mirror
//! names already claimed. Any error aborts the run; there is no per-dependency
//! retry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;

use crate::defaults::UPSTREAM_REMOTE;
use crate::error::{Error, Result};
use crate::gitlab::{MirrorHost, MirrorInventory, NamespaceContext};
use crate::manifest::SyncOutcome;
use crate::naming::Normalizer;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Point `remote` at `url`, replacing any previous definition.
    fn set_remote(&self, repo: &Path, remote: &str, url: &str) -> Result<()>;

    /// Push every branch to `remote`, returning the tool's output.
    fn push_all_branches(&self, repo: &Path, remote: &str) -> Result<String>;

    /// Push every tag to `remote`, returning the tool's output.
    fn push_tags(&self, repo: &Path, remote: &str) -> Result<String>;
}

/// A trait that defines the interface for cache lookups.
pub trait CacheOperations: Send + Sync {
    /// Path the clone for `cache_name` would live at.
    fn clone_path(&self, cache_name: &str) -> PathBuf;

    /// Check if glide has a cached clone for `cache_name`.
    fn has_local_clone(&self, cache_name: &str) -> bool;
}

/// The default implementation of `GitOperations`, which runs the system's
/// `git` command.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn set_remote(&self, repo: &Path, remote: &str, url: &str) -> Result<()> {
        crate::git::set_remote(repo, remote, url)
    }

    fn push_all_branches(&self, repo: &Path, remote: &str) -> Result<String> {
        crate::git::push_all_branches(repo, remote)
    }

    fn push_tags(&self, repo: &Path, remote: &str) -> Result<String> {
        crate::git::push_tags(repo, remote)
    }
}

/// The default implementation of `CacheOperations`, which looks in glide's
/// source cache.
pub struct DefaultCacheOperations {
    cache_root: PathBuf,
}

impl DefaultCacheOperations {
    pub fn new(cache_root: PathBuf) -> Self {
        Self { cache_root }
    }
}

impl CacheOperations for DefaultCacheOperations {
    fn clone_path(&self, cache_name: &str) -> PathBuf {
        crate::cache::clone_path(&self.cache_root, cache_name)
    }

    fn has_local_clone(&self, cache_name: &str) -> bool {
        crate::cache::has_local_clone(&self.cache_root, cache_name)
    }
}

/// State shared by every synchronization within one run.
#[derive(Debug, Clone)]
pub struct MirrorSession {
    pub namespace: NamespaceContext,
    inventory: MirrorInventory,
    /// Mirror name -> import path that first used it.
    claimed: HashMap<String, String>,
    /// Import path -> outcome, for dependencies listed more than once.
    completed: HashMap<String, SyncOutcome>,
    created: usize,
}

impl MirrorSession {
    pub fn new(namespace: NamespaceContext, inventory: MirrorInventory) -> Self {
        Self {
            namespace,
            inventory,
            claimed: HashMap::new(),
            completed: HashMap::new(),
            created: 0,
        }
    }

    pub fn inventory(&self) -> &MirrorInventory {
        &self.inventory
    }

    /// Number of mirror projects created so far in this run.
    pub fn created_count(&self) -> usize {
        self.created
    }
}

/// Mirrors dependencies from the local cache into the mirror host.
pub struct RepositorySynchronizer {
    git_ops: Box<dyn GitOperations>,
    cache_ops: Box<dyn CacheOperations>,
    normalizer: Normalizer,
    remote: String,
}

impl RepositorySynchronizer {
    /// Creates a synchronizer using real git and glide's cache under
    /// `cache_root`.
    pub fn new(cache_root: PathBuf) -> Result<Self> {
        Self::with_operations(
            Box::new(DefaultGitOperations),
            Box::new(DefaultCacheOperations::new(cache_root)),
        )
    }

    /// Creates a synchronizer with custom `GitOperations` and
    /// `CacheOperations` implementations.
    pub fn with_operations(
        git_ops: Box<dyn GitOperations>,
        cache_ops: Box<dyn CacheOperations>,
    ) -> Result<Self> {
        Ok(Self {
            git_ops,
            cache_ops,
            normalizer: Normalizer::new()?,
            remote: UPSTREAM_REMOTE.to_string(),
        })
    }

    /// Push to a remote other than `upstream`.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Mirror one dependency.
    ///
    /// Returns [`SyncOutcome::NoLocalClone`] without touching the mirror host
    /// when glide never fetched the dependency.
    pub fn synchronize(
        &self,
        host: &dyn MirrorHost,
        session: &mut MirrorSession,
        import_path: &str,
    ) -> Result<SyncOutcome> {
        info!("- processing '{}'", import_path);

        if let Some(outcome) = session.completed.get(import_path) {
            info!("- '{}' already handled in this run", import_path);
            return Ok(outcome.clone());
        }

        let names = self.normalizer.normalize(import_path);
        let clone = self.cache_ops.clone_path(&names.cache_name);

        if !self.cache_ops.has_local_clone(&names.cache_name) {
            info!("- no local cache repo at '{}', skipping", clone.display());
            session
                .completed
                .insert(import_path.to_string(), SyncOutcome::NoLocalClone);
            return Ok(SyncOutcome::NoLocalClone);
        }
        info!("- found local cache repo '{}'", clone.display());

        if let Some(first) = session.claimed.get(&names.mirror_name) {
            return Err(Error::MirrorNameCollision {
                mirror_name: names.mirror_name,
                first: first.clone(),
                second: import_path.to_string(),
            });
        }

        let url = match session.inventory.url_of(&names.mirror_name) {
            Some(url) => {
                info!("- remote repo '{}' already exists", url);
                url.to_string()
            }
            None => {
                let project = host.create_project(&names.mirror_name, session.namespace.id)?;
                info!("- remote repo '{}' created", project.url);
                let url = project.url.clone();
                session.inventory.insert(project);
                session.created += 1;
                url
            }
        };
        session
            .claimed
            .insert(names.mirror_name, import_path.to_string());

        self.git_ops.set_remote(&clone, &self.remote, &url)?;

        let output = self.git_ops.push_all_branches(&clone, &self.remote)?;
        info!("- push all branches:\n{}", output);

        let output = self.git_ops.push_tags(&clone, &self.remote)?;
        info!("- push all tags:\n{}", output);

        info!("- updated with {}: '{}'", self.remote, url);

        let outcome = SyncOutcome::Mirrored(url);
        session
            .completed
            .insert(import_path.to_string(), outcome.clone());
        Ok(outcome)
    }
}
