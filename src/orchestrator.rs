//! Orchestrator for a complete mirroring run
//!
//! This module sequences every stage of a run. Each stage is fatal on
//! failure:
//!
//! 1. Resolve the target namespace on the mirror host
//! 2. Snapshot the namespace's project inventory
//! 3. Generate a manifest from source imports
//! 4. Drop self-references and write the cleaned manifest
//! 5. Lock the cleaned manifest
//! 6. Synchronize every locked dependency (primary, then development)
//! 7. Rewrite the manifest with mirror URLs
//!
//! The final manifest is written only after every dependency synchronized
//! without error.

use std::path::PathBuf;

use log::info;

use crate::config::MirrorConfig;
use crate::error::Result;
use crate::gitlab::{GitLabClient, MirrorHost, NamespaceContext};
use crate::manifest::{self, SyncOutcome, SyncReport};
use crate::repository::{MirrorSession, RepositorySynchronizer};
use crate::resolver::{DependencyResolver, GlideResolver};

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub namespace: NamespaceContext,
    /// Dependencies now served from the mirror.
    pub mirrored: usize,
    /// Locked dependencies skipped for lack of a local clone.
    pub skipped: usize,
    /// Mirror projects created during this run.
    pub created: usize,
    /// Self-referencing imports moved to `ignore`.
    pub ignored: Vec<String>,
    pub manifest_path: PathBuf,
}

/// A configured mirroring run.
pub struct MirrorRun {
    host: Box<dyn MirrorHost>,
    resolver: Box<dyn DependencyResolver>,
    synchronizer: RepositorySynchronizer,
    host_url: String,
    namespace: String,
    manifest_path: PathBuf,
}

impl MirrorRun {
    /// Wire up GitLab, glide and git from a configuration.
    pub fn new(config: &MirrorConfig) -> Result<Self> {
        let host = GitLabClient::new(&config.host_url, &config.token, config.api_version)?;
        let resolver = GlideResolver::new(&config.project_dir).with_binary(&config.glide_binary);
        let synchronizer =
            RepositorySynchronizer::new(config.cache_root())?.with_remote(&config.remote);

        Ok(Self::with_components(
            Box::new(host),
            Box::new(resolver),
            synchronizer,
            &config.host_url,
            &config.namespace,
            config.manifest_path(),
        ))
    }

    /// Assemble a run from explicit collaborators.
    pub fn with_components(
        host: Box<dyn MirrorHost>,
        resolver: Box<dyn DependencyResolver>,
        synchronizer: RepositorySynchronizer,
        host_url: &str,
        namespace: &str,
        manifest_path: PathBuf,
    ) -> Self {
        Self {
            host,
            resolver,
            synchronizer,
            host_url: host_url.to_string(),
            namespace: namespace.to_string(),
            manifest_path,
        }
    }

    /// Execute the run against the configured namespace.
    pub fn execute(&self) -> Result<RunSummary> {
        let namespace_id = self.host.resolve_namespace(&self.namespace)?;
        info!("Using namespace '{}' (id {})", self.namespace, namespace_id);
        let namespace = NamespaceContext {
            host_url: self.host_url.clone(),
            name: self.namespace.clone(),
            id: namespace_id,
        };

        let inventory = self.host.list_projects(namespace_id)?;
        info!("Found {} existing mirror projects", inventory.len());

        let generated = self.resolver.generate_manifest()?;
        info!("Parsing newly created manifest for '{}'...", generated.name);

        let cleaned = manifest::filter_self_references(&generated);
        manifest::write_manifest(&self.manifest_path, &cleaned)?;
        info!("Recreated '{}' file...", self.manifest_path.display());

        let lockfile = self.resolver.lock()?;

        let mut session = MirrorSession::new(namespace, inventory);
        let mut report = SyncReport::default();
        for lock in &lockfile.imports {
            let outcome = self
                .synchronizer
                .synchronize(self.host.as_ref(), &mut session, &lock.name)?;
            report.imports.push((lock.clone(), outcome));
        }
        for lock in &lockfile.dev_imports {
            let outcome = self
                .synchronizer
                .synchronize(self.host.as_ref(), &mut session, &lock.name)?;
            report.dev_imports.push((lock.clone(), outcome));
        }

        let rewritten = manifest::apply_mirrors(&cleaned, &report);
        manifest::write_manifest(&self.manifest_path, &rewritten)?;

        let mirrored = report.mirrored_count();
        let skipped = report
            .imports
            .iter()
            .chain(&report.dev_imports)
            .filter(|(_, outcome)| *outcome == SyncOutcome::NoLocalClone)
            .count();
        info!(
            "Created {} with {} repos.",
            self.manifest_path.display(),
            mirrored
        );

        Ok(RunSummary {
            created: session.created_count(),
            namespace: session.namespace,
            mirrored,
            skipped,
            ignored: rewritten.ignore,
            manifest_path: self.manifest_path.clone(),
        })
    }
}
