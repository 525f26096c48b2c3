//! Repository lookup for dependency coordinates

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::descriptor::{ArtifactKey, Coordinate};

pub mod http;

pub use http::HttpRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP error from repository '{repository}': {source}")]
    Http {
        repository: String,
        source: reqwest::Error,
    },

    #[error("Repository '{repository}' returned status {status} for {path}")]
    Status {
        repository: String,
        status: reqwest::StatusCode,
        path: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed repository index: {0}")]
    MalformedIndex(String),
}

/// An artifact store the resolver can query.
///
/// Lookups take fully-versioned coordinates; a coordinate without a version
/// is never considered present. Implementations must be safe to query from
/// multiple threads, lookups run in parallel.
pub trait Repository: Send + Sync {
    /// Label used in plans and error messages
    fn name(&self) -> &str;

    /// Presence check for a coordinate
    fn contains(&self, coordinate: &Coordinate) -> Result<bool, RepositoryError>;

    /// Managed-version table published by a platform (BOM) coordinate, or
    /// `None` when the coordinate is absent from this repository.
    fn platform_imports(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<BTreeMap<ArtifactKey, String>>, RepositoryError>;
}

/// In-memory repository backed by an explicit artifact index.
///
/// The primary offline registry and test double. Can be built up with the
/// `with_*` methods or loaded from a TOML index file.
#[derive(Debug, Clone, Default)]
pub struct IndexRepository {
    name: String,
    artifacts: HashSet<Coordinate>,
    platforms: HashMap<Coordinate, BTreeMap<ArtifactKey, String>>,
}

impl IndexRepository {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            artifacts: HashSet::new(),
            platforms: HashMap::new(),
        }
    }

    /// Add a plain artifact to the index
    pub fn with_artifact(mut self, coordinate: Coordinate) -> Self {
        self.artifacts.insert(coordinate);
        self
    }

    /// Add a platform and the versions it manages. The platform coordinate
    /// itself also becomes present in the index.
    pub fn with_platform(
        mut self,
        coordinate: Coordinate,
        imports: BTreeMap<ArtifactKey, String>,
    ) -> Self {
        self.artifacts.insert(coordinate.clone());
        self.platforms.insert(coordinate, imports);
        self
    }

    /// Parse an index from TOML
    pub fn from_str(name: &str, content: &str) -> Result<Self, RepositoryError> {
        let file: IndexFile = toml::from_str(content)
            .map_err(|e| RepositoryError::MalformedIndex(e.to_string()))?;

        let mut index = Self::new(name);
        for artifact in file.artifacts {
            index.artifacts.insert(artifact.coordinate);
        }
        for platform in file.platforms {
            let mut imports = BTreeMap::new();
            for (key, version) in platform.imports {
                let key: ArtifactKey = key
                    .parse()
                    .map_err(|e: crate::DescriptorError| RepositoryError::MalformedIndex(e.to_string()))?;
                imports.insert(key, version);
            }
            index.artifacts.insert(platform.coordinate.clone());
            index.platforms.insert(platform.coordinate, imports);
        }
        Ok(index)
    }

    /// Load an index from a TOML file
    pub fn from_file(name: &str, path: &Path) -> Result<Self, RepositoryError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(name, &content)
    }
}

impl Repository for IndexRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, coordinate: &Coordinate) -> Result<bool, RepositoryError> {
        Ok(coordinate.version.is_some() && self.artifacts.contains(coordinate))
    }

    fn platform_imports(
        &self,
        coordinate: &Coordinate,
    ) -> Result<Option<BTreeMap<ArtifactKey, String>>, RepositoryError> {
        Ok(self.platforms.get(coordinate).cloned())
    }
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    artifacts: Vec<IndexArtifact>,
    #[serde(default)]
    platforms: Vec<IndexPlatform>,
}

#[derive(Debug, Deserialize)]
struct IndexArtifact {
    coordinate: Coordinate,
}

#[derive(Debug, Deserialize)]
struct IndexPlatform {
    coordinate: Coordinate,
    #[serde(default)]
    imports: BTreeMap<String, String>,
}
