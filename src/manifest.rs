//! # Manifest and Lock Documents
//!
//! This module defines the on-disk formats glide uses (`glide.yaml` and
//! `glide.lock`) and the two rewrites applied to a manifest during a run:
//!
//! - **Pass A** ([`filter_self_references`]): before locking, drop every
//!   import that lives under the project's own package name, record it in the
//!   `ignore` list, and strip version and repository from the rest so the lock
//!   step re-derives them.
//! - **Pass B** ([`apply_mirrors`]): after synchronization, rebuild both
//!   import lists from the lock, pointing every mirrored dependency at its
//!   mirror URL. Dependencies without a local clone are dropped silently.
//!
//! Both passes preserve input order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An owner of a package, for contact about security issues and the like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(rename = "homepage", default, skip_serializing_if = "String::is_empty")]
    pub home: String,
}

/// One entry in the `import` or `testImport` list of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(rename = "package")]
    pub name: String,
    #[serde(rename = "version", default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
    #[serde(rename = "repo", default, skip_serializing_if = "String::is_empty")]
    pub repository: String,
    #[serde(rename = "vcs", default, skip_serializing_if = "String::is_empty")]
    pub vcs_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subpackages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<String>,
}

/// A `glide.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "package")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "homepage", default, skip_serializing_if = "String::is_empty")]
    pub home: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<Owner>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    #[serde(rename = "excludeDirs", default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(rename = "import", default, deserialize_with = "null_as_empty")]
    pub imports: Vec<Dependency>,
    #[serde(
        rename = "testImport",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub dev_imports: Vec<Dependency>,
}

/// One pinned dependency in a lock document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDependency {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "repo", default, skip_serializing_if = "String::is_empty")]
    pub repository: String,
    #[serde(rename = "vcs", default, skip_serializing_if = "String::is_empty")]
    pub vcs_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subpackages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<String>,
}

/// A `glide.lock` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(default)]
    pub hash: String,
    /// Timestamp of the lock, kept verbatim.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub updated: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub imports: Vec<LockedDependency>,
    #[serde(rename = "testImports", default, deserialize_with = "null_as_empty")]
    pub dev_imports: Vec<LockedDependency>,
}

/// Outcome of synchronizing one locked dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Content is on the mirror at this URL.
    Mirrored(String),
    /// No local clone existed, so there was nothing to mirror.
    NoLocalClone,
}

impl SyncOutcome {
    pub fn mirror_url(&self) -> Option<&str> {
        match self {
            SyncOutcome::Mirrored(url) => Some(url),
            SyncOutcome::NoLocalClone => None,
        }
    }
}

/// Synchronization results for both lists of a lock, in lock order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub imports: Vec<(LockedDependency, SyncOutcome)>,
    pub dev_imports: Vec<(LockedDependency, SyncOutcome)>,
}

impl SyncReport {
    /// Number of dependencies that ended up on the mirror.
    pub fn mirrored_count(&self) -> usize {
        self.imports
            .iter()
            .chain(&self.dev_imports)
            .filter(|(_, outcome)| outcome.mirror_url().is_some())
            .count()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a timestamp, found {:?}",
            other
        ))),
    }
}

/// Parse a manifest from YAML text.
pub fn parse_manifest(yaml_content: &str) -> Result<Manifest> {
    Ok(serde_yaml::from_str(yaml_content)?)
}

/// Parse a lock document from YAML text.
pub fn parse_lockfile(yaml_content: &str) -> Result<Lockfile> {
    Ok(serde_yaml::from_str(yaml_content)?)
}

/// Read and parse a manifest file.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| Error::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read and parse a lock file.
pub fn read_lockfile(path: &Path) -> Result<Lockfile> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| Error::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Serialize a manifest and overwrite `path` with it.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let content = serde_yaml::to_string(manifest)?;
    fs::write(path, content)?;
    Ok(())
}

/// Pass A: remove self-references and strip pins from a generated manifest.
///
/// Entries whose name starts with the manifest's own package name move to
/// `ignore` (replacing any previous list); every other entry keeps only its
/// name and subpackages.
pub fn filter_self_references(generated: &Manifest) -> Manifest {
    let mut ignored = Vec::new();
    let imports = strip_imports(&generated.name, &generated.imports, &mut ignored);
    let dev_imports = strip_imports(&generated.name, &generated.dev_imports, &mut ignored);

    Manifest {
        ignore: ignored,
        imports,
        dev_imports,
        ..generated.clone()
    }
}

fn strip_imports(own_name: &str, deps: &[Dependency], ignored: &mut Vec<String>) -> Vec<Dependency> {
    deps.iter()
        .filter_map(|dep| {
            if dep.name.starts_with(own_name) {
                ignored.push(dep.name.clone());
                None
            } else {
                Some(Dependency {
                    name: dep.name.clone(),
                    subpackages: dep.subpackages.clone(),
                    ..Dependency::default()
                })
            }
        })
        .collect()
}

/// Pass B: rebuild both import lists from synchronization results.
///
/// Every mirrored dependency becomes `{package, version, repo, subpackages}`;
/// the rest of the manifest, including `ignore`, is carried over unchanged.
pub fn apply_mirrors(cleaned: &Manifest, report: &SyncReport) -> Manifest {
    Manifest {
        imports: mirrored_entries(&report.imports),
        dev_imports: mirrored_entries(&report.dev_imports),
        ..cleaned.clone()
    }
}

fn mirrored_entries(results: &[(LockedDependency, SyncOutcome)]) -> Vec<Dependency> {
    results
        .iter()
        .filter_map(|(lock, outcome)| {
            outcome.mirror_url().map(|url| Dependency {
                name: lock.name.clone(),
                reference: lock.version.clone(),
                repository: url.to_string(),
                subpackages: lock.subpackages.clone(),
                ..Dependency::default()
            })
        })
        .collect()
}
