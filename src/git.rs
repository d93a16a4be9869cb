//! Remote management and content transfer on a cached clone
//!
//! This uses the system git command, which automatically handles:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::path::Path;

use log::debug;

use crate::defaults::GIT_BINARY;
use crate::error::Result;
use crate::process;

/// Remove `remote` from the clone at `repo`.
///
/// A missing remote is not an error, which makes this safe to run before
/// every [`add_remote`]. Presence is checked against `git remote` rather than
/// git's message text, which varies with the locale.
pub fn remove_remote(repo: &Path, remote: &str) -> Result<()> {
    if !remotes(repo)?.iter().any(|name| name == remote) {
        return Ok(());
    }
    process::run(GIT_BINARY, &["remote", "remove", remote], repo)?;
    debug!("removed remote '{}' from {}", remote, repo.display());
    Ok(())
}

/// Add `remote` pointing at `url` to the clone at `repo`.
pub fn add_remote(repo: &Path, remote: &str, url: &str) -> Result<()> {
    process::run(GIT_BINARY, &["remote", "add", remote, url], repo)?;
    Ok(())
}

/// Point `remote` at `url`, replacing whatever it pointed at before.
pub fn set_remote(repo: &Path, remote: &str, url: &str) -> Result<()> {
    remove_remote(repo, remote)?;
    add_remote(repo, remote, url)
}

/// Names of all remotes configured on the clone.
pub fn remotes(repo: &Path) -> Result<Vec<String>> {
    let output = process::run(GIT_BINARY, &["remote"], repo)?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Push every local branch to `remote`. Returns git's output.
pub fn push_all_branches(repo: &Path, remote: &str) -> Result<String> {
    process::run(GIT_BINARY, &["push", "--all", remote], repo)
}

/// Push every tag to `remote`. Returns git's output.
pub fn push_tags(repo: &Path, remote: &str) -> Result<String> {
    process::run(GIT_BINARY, &["push", "--tags", remote], repo)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Local repositories for exercising real git without a network.

    use std::path::{Path, PathBuf};

    use crate::process;

    pub fn git(dir: &Path, args: &[&str]) -> String {
        process::run("git", args, dir).unwrap()
    }

    /// A non-bare repository with one commit on `main`, a `feature` branch
    /// and a `v1.0.0` tag.
    pub fn source_repo(dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "--quiet"]);
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(
            dir,
            &[
                "-c",
                "user.name=Mirror Test",
                "-c",
                "user.email=mirror@example.com",
                "commit",
                "--quiet",
                "--allow-empty",
                "-m",
                "initial",
            ],
        );
        git(dir, &["branch", "feature"]);
        git(dir, &["tag", "v1.0.0"]);
        dir.to_path_buf()
    }

    /// An empty bare repository standing in for a mirror project.
    pub fn bare_repo(dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "--quiet", "--bare"]);
        dir.to_path_buf()
    }

    /// URL configured for `remote`, if the remote exists.
    pub fn remote_url(repo: &Path, remote: &str) -> Option<String> {
        let (status, output) =
            process::output("git", &["remote", "get-url", remote], repo).unwrap();
        status.success().then(|| output.trim().to_string())
    }

    /// Refs present in a repository, e.g. `refs/heads/main`.
    pub fn refs(repo: &Path) -> Vec<String> {
        git(repo, &["for-each-ref", "--format=%(refname)"])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_remove_missing_remote_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));

        remove_remote(&repo, "upstream").unwrap();
        assert!(remotes(&repo).unwrap().is_empty());
    }

    #[test]
    fn test_remove_remote_keeps_other_remotes() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));

        add_remote(&repo, "origin", "https://github.com/x/y").unwrap();
        add_remote(&repo, "upstream", "https://host/ns/github-com-x-y.git").unwrap();
        remove_remote(&repo, "upstream").unwrap();

        assert_eq!(remotes(&repo).unwrap(), vec!["origin".to_string()]);
    }

    #[test]
    fn test_set_remote_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));
        let url = "https://host/ns/github-com-x-y.git";

        set_remote(&repo, "upstream", url).unwrap();
        set_remote(&repo, "upstream", url).unwrap();

        assert_eq!(remotes(&repo).unwrap(), vec!["upstream".to_string()]);
        assert_eq!(remote_url(&repo, "upstream").as_deref(), Some(url));
    }

    #[test]
    fn test_set_remote_replaces_previous_url() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));

        set_remote(&repo, "upstream", "https://old/x.git").unwrap();
        set_remote(&repo, "upstream", "https://new/x.git").unwrap();

        assert_eq!(
            remote_url(&repo, "upstream").as_deref(),
            Some("https://new/x.git")
        );
    }

    #[test]
    fn test_remote_url_missing() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));
        assert_eq!(remote_url(&repo, "upstream"), None);
    }

    #[test]
    fn test_push_branches_then_tags() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));
        let mirror = bare_repo(&temp_dir.path().join("mirror.git"));

        set_remote(&repo, "upstream", mirror.to_str().unwrap()).unwrap();

        push_all_branches(&repo, "upstream").unwrap();
        let after_branches = refs(&mirror);
        assert!(after_branches.contains(&"refs/heads/main".to_string()));
        assert!(after_branches.contains(&"refs/heads/feature".to_string()));
        assert!(!after_branches.contains(&"refs/tags/v1.0.0".to_string()));

        push_tags(&repo, "upstream").unwrap();
        assert!(refs(&mirror).contains(&"refs/tags/v1.0.0".to_string()));
    }

    #[test]
    fn test_push_to_unreachable_remote_fails() {
        let temp_dir = TempDir::new().unwrap();
        let repo = source_repo(&temp_dir.path().join("src"));
        let missing = temp_dir.path().join("no-such-mirror.git");

        set_remote(&repo, "upstream", missing.to_str().unwrap()).unwrap();

        let err = push_all_branches(&repo, "upstream").unwrap_err();
        assert!(matches!(err, Error::Subprocess { command, .. } if command == "git push --all upstream"));
    }
}
