//! CLI argument parsing and run dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use glide_mirror::config::MirrorConfig;
use glide_mirror::defaults::{self, GLIDE_BINARY, UPSTREAM_REMOTE};
use glide_mirror::gitlab::ApiVersion;
use glide_mirror::orchestrator::MirrorRun;

/// Mirror a glide project's dependencies into a GitLab group and point
/// glide.yaml at the mirrors
#[derive(Parser, Debug)]
#[command(name = "glide-mirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the GitLab instance hosting the mirrors
    #[arg(value_name = "MIRROR_URL")]
    mirror_url: String,

    /// Name of the GitLab group to mirror into
    #[arg(value_name = "NAMESPACE")]
    namespace: String,

    /// GitLab API token
    #[arg(value_name = "TOKEN", env = "GLIDE_MIRROR_TOKEN", hide_env_values = true)]
    token: String,

    /// Directory containing glide.yaml
    #[arg(long, value_name = "DIR", default_value = ".")]
    project_dir: PathBuf,

    /// glide home directory holding the source cache (defaults to ~/.glide)
    #[arg(long, value_name = "DIR", env = "GLIDE_HOME")]
    glide_home: Option<PathBuf>,

    /// glide executable to run
    #[arg(long, value_name = "PATH", default_value = GLIDE_BINARY)]
    glide_bin: String,

    /// Remote used as push target in each cached clone
    #[arg(long, value_name = "NAME", default_value = UPSTREAM_REMOTE)]
    remote: String,

    /// GitLab REST API version (v3, v4)
    #[arg(long, value_name = "VERSION", default_value = "v4")]
    api_version: ApiVersion,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Execute the mirroring run
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let config = self.into_config();
        let run = MirrorRun::new(&config)
            .with_context(|| format!("Failed to set up mirroring to {}", config.host_url))?;

        let summary = run.execute()?;

        info!(
            "Mirrored {} dependencies into '{}' ({} created, {} without local clone, {} ignored)",
            summary.mirrored,
            summary.namespace.name,
            summary.created,
            summary.skipped,
            summary.ignored.len()
        );
        Ok(())
    }

    fn into_config(self) -> MirrorConfig {
        MirrorConfig {
            host_url: self.mirror_url,
            namespace: self.namespace,
            token: self.token,
            api_version: self.api_version,
            project_dir: self.project_dir,
            glide_home: self
                .glide_home
                .unwrap_or_else(defaults::default_glide_home),
            glide_binary: self.glide_bin,
            remote: self.remote,
        }
    }
}

/// Initialize `env_logger` at `level`, letting `RUST_LOG` override it.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when embedded in tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_secs()
        .try_init();
}
