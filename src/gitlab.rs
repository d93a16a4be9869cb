//! # Mirror Inventory Client
//!
//! Talks to the GitLab REST API that hosts the mirrors. The client is pure
//! request/response: it resolves the target group, lists every project in it
//! and creates new projects. It keeps no state between calls.
//!
//! The rest of the crate only sees the [`MirrorHost`] trait, so the
//! synchronizer and orchestrator can be exercised against an in-memory host
//! in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::defaults::{PROJECTS_PER_PAGE, USER_AGENT};
use crate::error::{Error, Result};

/// Visibility used for every project this tool creates.
pub const MIRROR_VISIBILITY: &str = "internal";

/// `visibility_level` value meaning "internal" on the v3 API.
const V3_INTERNAL_LEVEL: u8 = 10;

/// A project on the mirror host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorProject {
    pub name: String,
    pub url: String,
}

/// Snapshot of the projects in a namespace, keyed by project name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorInventory {
    projects: BTreeMap<String, String>,
}

impl MirrorInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the project with this name, if the namespace has one.
    pub fn url_of(&self, name: &str) -> Option<&str> {
        self.projects.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Record a project; later lookups of the same name see it.
    pub fn insert(&mut self, project: MirrorProject) {
        self.projects.insert(project.name, project.url);
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl FromIterator<MirrorProject> for MirrorInventory {
    fn from_iter<I: IntoIterator<Item = MirrorProject>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for project in iter {
            inventory.insert(project);
        }
        inventory
    }
}

/// The target group, resolved once at startup.
///
/// The API credential is not kept here; it stays with the [`GitLabClient`]
/// that authenticates every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Base URL of the mirror host as given on the command line.
    pub host_url: String,
    pub name: String,
    pub id: u64,
}

/// Operations the synchronizer needs from the mirror host.
pub trait MirrorHost: Send + Sync {
    /// Look up a group by name and return its numeric id.
    fn resolve_namespace(&self, name: &str) -> Result<u64>;

    /// List every project in the group, following all pages.
    fn list_projects(&self, namespace_id: u64) -> Result<MirrorInventory>;

    /// Create an internal project in the group.
    fn create_project(&self, name: &str, namespace_id: u64) -> Result<MirrorProject>;
}

/// REST API flavour spoken by the mirror host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    V3,
    #[default]
    V4,
}

impl ApiVersion {
    fn prefix(self) -> &'static str {
        match self {
            ApiVersion::V3 => "api/v3/",
            ApiVersion::V4 => "api/v4/",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v3" | "3" => Ok(ApiVersion::V3),
            "v4" | "4" => Ok(ApiVersion::V4),
            other => Err(format!("unsupported API version '{}' (expected v3 or v4)", other)),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V3 => write!(f, "v3"),
            ApiVersion::V4 => write!(f, "v4"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Group {
    id: u64,
    name: String,
    path: String,
    #[serde(default)]
    full_path: String,
}

impl Group {
    fn matches(&self, name: &str) -> bool {
        self.name == name || self.path == name || self.full_path == name
    }

    fn label(&self) -> String {
        if self.full_path.is_empty() {
            format!("{} (id {})", self.path, self.id)
        } else {
            format!("{} (id {})", self.full_path, self.id)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Project {
    name: String,
    http_url_to_repo: String,
}

impl From<Project> for MirrorProject {
    fn from(project: Project) -> Self {
        MirrorProject {
            name: project.name,
            url: project.http_url_to_repo,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateProject<'a> {
    name: &'a str,
    path: &'a str,
    namespace_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility_level: Option<u8>,
}

/// GitLab implementation of [`MirrorHost`], authenticated by bearer token.
pub struct GitLabClient {
    http: Client,
    api_base: Url,
    token: String,
    api_version: ApiVersion,
}

impl GitLabClient {
    /// Build a client for `host_url` (e.g. `https://git.example.com`).
    pub fn new(host_url: &str, token: &str, api_version: ApiVersion) -> Result<Self> {
        let mut base = Url::parse(host_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let api_base = base.join(api_version.prefix())?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network {
                url: api_base.to_string(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            api_base,
            token: token.to_string(),
            api_version,
        })
    }

    /// The API root every request is resolved against.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.api_base.join(path)?)
    }

    fn get(&self, url: &Url) -> Result<Response> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| network_error(url, e))?;
        check_status(url, response)
    }

    fn fetch_groups(&self, name: &str) -> Result<Vec<Group>> {
        let mut url = self.endpoint("groups")?;
        url.query_pairs_mut().append_pair("search", name);
        self.get(&url)?.json().map_err(|e| network_error(&url, e))
    }
}

impl MirrorHost for GitLabClient {
    fn resolve_namespace(&self, name: &str) -> Result<u64> {
        let groups = self.fetch_groups(name)?;
        let exact: Vec<&Group> = groups.iter().filter(|g| g.matches(name)).collect();

        let chosen = match (exact.as_slice(), groups.as_slice()) {
            ([group], _) => *group,
            ([], [group]) => group,
            ([], []) => {
                return Err(Error::NamespaceNotFound {
                    name: name.to_string(),
                })
            }
            ([], candidates) => return Err(ambiguous(name, candidates.iter())),
            (candidates, _) => return Err(ambiguous(name, candidates.iter().copied())),
        };

        debug!("namespace '{}' resolved to id {}", name, chosen.id);
        Ok(chosen.id)
    }

    fn list_projects(&self, namespace_id: u64) -> Result<MirrorInventory> {
        let mut inventory = MirrorInventory::new();
        let mut page: u32 = 1;

        loop {
            let mut url = self.endpoint(&format!("groups/{}/projects", namespace_id))?;
            url.query_pairs_mut()
                .append_pair("per_page", &PROJECTS_PER_PAGE.to_string())
                .append_pair("page", &page.to_string());

            let response = self.get(&url)?;
            let next_page = response
                .headers()
                .get("x-next-page")
                .map(|value| value.to_str().unwrap_or_default().trim().to_string());
            let projects: Vec<Project> = response.json().map_err(|e| network_error(&url, e))?;
            let full_page = projects.len() >= PROJECTS_PER_PAGE as usize;

            for project in projects {
                inventory.insert(project.into());
            }

            page = match next_page {
                Some(next) if next.is_empty() => break,
                Some(next) => match next.parse::<u32>() {
                    Ok(n) if n > page => n,
                    _ => break,
                },
                // No pagination headers (stripped by a proxy): keep going while pages are full.
                None if full_page => page + 1,
                None => break,
            };
        }

        debug!(
            "namespace {} holds {} projects",
            namespace_id,
            inventory.len()
        );
        Ok(inventory)
    }

    fn create_project(&self, name: &str, namespace_id: u64) -> Result<MirrorProject> {
        let url = self.endpoint("projects")?;
        let body = match self.api_version {
            ApiVersion::V4 => CreateProject {
                name,
                path: name,
                namespace_id,
                visibility: Some(MIRROR_VISIBILITY),
                visibility_level: None,
            },
            ApiVersion::V3 => CreateProject {
                name,
                path: name,
                namespace_id,
                visibility: None,
                visibility_level: Some(V3_INTERNAL_LEVEL),
            },
        };

        debug!("POST {} ({})", url, name);
        let response = self
            .http
            .post(url.clone())
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| network_error(&url, e))?;

        let status = response.status();
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::CONFLICT) {
            let text = response.text().unwrap_or_default();
            if text.contains("has already been taken") {
                return Err(Error::ProjectConflict {
                    name: name.to_string(),
                    namespace_id,
                });
            }
            return Err(Error::Api {
                url: url.to_string(),
                status: status.as_u16(),
                message: api_message(&text),
            });
        }

        let project: Project = check_status(&url, response)?
            .json()
            .map_err(|e| network_error(&url, e))?;
        Ok(project.into())
    }
}

fn ambiguous<'a>(name: &str, candidates: impl Iterator<Item = &'a Group>) -> Error {
    Error::NamespaceAmbiguous {
        name: name.to_string(),
        candidates: candidates.map(Group::label).collect(),
    }
}

fn network_error(url: &Url, err: reqwest::Error) -> Error {
    Error::Network {
        url: url.to_string(),
        message: err.to_string(),
    }
}

fn check_status(url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().unwrap_or_default();
    Err(Error::Api {
        url: url.to_string(),
        status: status.as_u16(),
        message: api_message(&text),
    })
}

/// Pull the human-readable part out of a GitLab error body.
fn api_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("message").or_else(|| value.get("error")) {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        Err(_) => body.trim().to_string(),
    }
}
