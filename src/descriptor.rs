//! Project descriptor parsing and types (classplan.toml)

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::DescriptorError;

/// Project descriptor (classplan.toml)
///
/// Repositories and dependencies are arrays of tables so that declaration
/// order is observable: repository lookup is first-match-wins and plan
/// entries keep declaration order within each scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDescriptor {
    pub project: ProjectMetadata,
    #[serde(default)]
    pub repositories: Vec<RepositoryDeclaration>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
}

impl ProjectDescriptor {
    /// Parse descriptor from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load descriptor from file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_str(&content)?)
    }

    /// Serialize to TOML string
    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    pub group: String,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Declared repository, looked up in declaration order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryDeclaration {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl RepositoryDeclaration {
    /// Label used in plans and error messages: the name when given, the URL
    /// otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.url)
    }
}

/// A single dependency declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DependencyDeclaration {
    pub coordinate: Coordinate,
    pub scope: Scope,
    /// Platform (BOM) flag: constrains versions of other declarations
    /// without contributing a binary itself.
    #[serde(default)]
    pub platform: bool,
}

/// Build phase a dependency is available in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Compile,
    TestCompile,
    TestRuntime,
}

impl Scope {
    /// All scopes, in resolution order. Platforms declared for an earlier
    /// scope also govern the scopes that build on it.
    pub const ALL: [Scope; 3] = [Scope::Compile, Scope::TestCompile, Scope::TestRuntime];
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Compile => "compile",
            Scope::TestCompile => "test-compile",
            Scope::TestRuntime => "test-runtime",
        };
        write!(f, "{}", name)
    }
}

/// Dependency coordinate: `group:artifact[:version]`
///
/// The version may be omitted in a declaration when a platform governs it;
/// resolved coordinates always carry one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

impl Coordinate {
    pub fn new(group: &str, artifact: &str, version: Option<&str>) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.map(str::to_string),
        }
    }

    /// Artifact identity used for dedup and conflict checks
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
        }
    }

    /// Copy of this coordinate pinned to a concrete version
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: Some(version.to_string()),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group, self.artifact, version),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}

impl FromStr for Coordinate {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DescriptorError::InvalidCoordinate {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = s.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty segment"));
        }
        match parts.as_slice() {
            [group, artifact] => Ok(Coordinate::new(group, artifact, None)),
            [group, artifact, version] => Ok(Coordinate::new(group, artifact, Some(*version))),
            _ => Err(invalid("expected group:artifact or group:artifact:version")),
        }
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// (group, artifact) pair identifying an artifact independent of version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactKey {
    pub group: String,
    pub artifact: String,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl FromStr for ArtifactKey {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact] if !group.is_empty() && !artifact.is_empty() => Ok(ArtifactKey {
                group: group.to_string(),
                artifact: artifact.to_string(),
            }),
            _ => Err(DescriptorError::InvalidCoordinate {
                input: s.to_string(),
                reason: "expected group:artifact".to_string(),
            }),
        }
    }
}
