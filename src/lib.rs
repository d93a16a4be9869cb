//! # glide-mirror
//!
//! Mirrors a glide project's locked dependencies into a GitLab group and
//! rewrites `glide.yaml` so builds fetch from the mirrors instead of the
//! public origin repositories.
//!
//! ## Core Concepts
//!
//! - **Naming (`naming`)**: Derives the glide cache directory name and the
//!   mirror project name from an import path.
//! - **Mirror host (`gitlab`)**: Resolves the target group, lists its projects
//!   and creates new internal projects.
//! - **Local cache (`cache`)**: Locates glide's cached clone of a dependency.
//! - **Synchronization (`repository`, `git`)**: Creates mirrors as needed and
//!   pushes every branch and tag from the cached clone.
//! - **Manifests (`manifest`, `resolver`)**: Drives glide, filters
//!   self-references and rewrites imports to mirror URLs.
//!
//! ## Execution Flow
//!
//! The main entry point is [`orchestrator::MirrorRun`], which executes:
//!
//! 1.  **Namespace**: Resolve the GitLab group and snapshot its projects.
//! 2.  **Generate**: Let glide derive a manifest from source imports.
//! 3.  **Clean**: Move self-references to `ignore` and write `glide.yaml`.
//! 4.  **Lock**: Let glide resolve and fetch every dependency.
//! 5.  **Synchronize**: Mirror each locked dependency that has a local clone.
//! 6.  **Rewrite**: Point every mirrored import at its mirror and write
//!     `glide.yaml` again.

pub mod cache;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod gitlab;
pub mod manifest;
pub mod naming;
pub mod orchestrator;
pub mod process;
pub mod repository;
pub mod resolver;

#[cfg(test)]
mod naming_proptest;
