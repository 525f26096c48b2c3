//! Maven-layout repository access over HTTP

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::{Repository, RepositoryError};
use crate::descriptor::{ArtifactKey, Coordinate};

/// Repository in Maven-2 directory layout, queried over HTTP.
///
/// Presence is a GET of the coordinate's `.pom` path; a platform's managed
/// versions come from the `<dependencyManagement>` block of its POM. Only
/// the fields resolution needs are read from the POM, there is no full POM
/// model.
pub struct HttpRepository {
    name: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpRepository {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn pom_path(coordinate: &Coordinate) -> Option<String> {
        let version = coordinate.version.as_deref()?;
        Some(format!(
            "{}/{}/{}/{}-{}.pom",
            coordinate.group.replace('.', "/"),
            coordinate.artifact,
            version,
            coordinate.artifact,
            version
        ))
    }

    /// GET a repository-relative path. `Ok(None)` on 404, an error on any
    /// other non-success status.
    fn fetch(&self, path: &str) -> Result<Option<String>, RepositoryError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(repository = %self.name, %url, "fetching");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| RepositoryError::Http {
                repository: self.name.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().map_err(|source| RepositoryError::Http {
                repository: self.name.clone(),
                source,
            })?;
            Ok(Some(body))
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            Err(RepositoryError::Status {
                repository: self.name.clone(),
                status,
                path: path.to_string(),
            })
        }
    }
}

impl Repository for HttpRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, coordinate: &Coordinate) -> Result<bool, RepositoryError> {
        let Some(path) = Self::pom_path(coordinate) else {
            return Ok(false);
        };
        Ok(self.fetch(&path)?.is_some())
    }

    fn platform_imports(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<BTreeMap<ArtifactKey, String>>, RepositoryError> {
        let Some(path) = Self::pom_path(coordinate) else {
            return Ok(None);
        };
        match self.fetch(&path)? {
            Some(pom) => Ok(Some(managed_versions(&pom))),
            None => Ok(None),
        }
    }
}

fn managed_entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?s)<dependency>\s*<groupId>([^<]+)</groupId>\s*<artifactId>([^<]+)</artifactId>\s*<version>([^<]+)</version>",
        )
        .unwrap()
    })
}

/// Extract the managed-version table from a POM's `<dependencyManagement>`
/// block. First entry wins on duplicate keys.
fn managed_versions(pom: &str) -> BTreeMap<ArtifactKey, String> {
    let Some(start) = pom.find("<dependencyManagement>") else {
        return BTreeMap::new();
    };
    let end = pom[start..]
        .find("</dependencyManagement>")
        .map(|offset| start + offset)
        .unwrap_or(pom.len());
    let block = &pom[start..end];

    let mut managed = BTreeMap::new();
    for captures in managed_entry_pattern().captures_iter(block) {
        let key = ArtifactKey {
            group: captures[1].trim().to_string(),
            artifact: captures[2].trim().to_string(),
        };
        let version = captures[3].trim().to_string();
        managed.entry(key).or_insert(version);
    }
    managed
}
