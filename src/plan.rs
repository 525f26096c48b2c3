//! Resolved classpath plan (classplan.lock)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::descriptor::{Coordinate, Scope};

/// Per-scope resolution plan
///
/// Entries keep declaration order within each scope; platforms never appear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolutionPlan {
    /// Plan format version
    pub version: u32,
    /// Metadata
    #[serde(default)]
    pub metadata: PlanMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compile: Vec<ResolvedDependency>,
    #[serde(default, rename = "test-compile", skip_serializing_if = "Vec::is_empty")]
    pub test_compile: Vec<ResolvedDependency>,
    #[serde(default, rename = "test-runtime", skip_serializing_if = "Vec::is_empty")]
    pub test_runtime: Vec<ResolvedDependency>,
}

impl ResolutionPlan {
    /// Current plan format version
    pub const VERSION: u32 = 1;

    /// Create new empty plan
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            metadata: PlanMetadata::default(),
            compile: Vec::new(),
            test_compile: Vec::new(),
            test_runtime: Vec::new(),
        }
    }

    /// Parse plan from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load plan from file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_str(&content)?)
    }

    /// Serialize to TOML string
    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Write plan to file
    pub fn write_to_file(&self, path: &Path) -> crate::Result<()> {
        let content = self.to_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolved entries for a scope, in declaration order
    pub fn entries(&self, scope: Scope) -> &[ResolvedDependency] {
        match scope {
            Scope::Compile => &self.compile,
            Scope::TestCompile => &self.test_compile,
            Scope::TestRuntime => &self.test_runtime,
        }
    }

    /// Append an entry to a scope
    pub fn add_entry(&mut self, scope: Scope, entry: ResolvedDependency) {
        let entries = match scope {
            Scope::Compile => &mut self.compile,
            Scope::TestCompile => &mut self.test_compile,
            Scope::TestRuntime => &mut self.test_runtime,
        };
        entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        Scope::ALL.iter().all(|scope| self.entries(*scope).is_empty())
    }

    /// Repository-relative jar paths for a scope, consumable by an external
    /// compiler or test runner
    pub fn classpath(&self, scope: Scope) -> Vec<String> {
        self.entries(scope)
            .iter()
            .filter_map(ResolvedDependency::jar_path)
            .collect()
    }

    /// Full test classpath: compile, then test-compile, then test-runtime
    /// entries, first occurrence of each artifact kept
    pub fn test_classpath(&self) -> Vec<ResolvedDependency> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for scope in Scope::ALL {
            for entry in self.entries(scope) {
                if seen.insert(entry.coordinate.key()) {
                    entries.push(entry.clone());
                }
            }
        }
        entries
    }

    /// Verify plan integrity
    pub fn verify(&self) -> Result<(), String> {
        if self.version > Self::VERSION {
            return Err(format!(
                "Plan version {} is newer than supported version {}",
                self.version,
                Self::VERSION
            ));
        }

        for scope in Scope::ALL {
            let mut seen = HashSet::new();
            for entry in self.entries(scope) {
                if entry.coordinate.version.is_none() {
                    return Err(format!(
                        "Entry '{}' in scope {} has no resolved version",
                        entry.coordinate, scope
                    ));
                }
                if !seen.insert(entry.coordinate.key()) {
                    return Err(format!(
                        "Duplicate artifact '{}' in scope {}",
                        entry.coordinate.key(),
                        scope
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for ResolutionPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// A dependency pinned to a version and the repository that supplied it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedDependency {
    pub coordinate: Coordinate,
    pub repository: String,
}

impl ResolvedDependency {
    /// Repository-relative jar path in Maven-2 layout
    pub fn jar_path(&self) -> Option<String> {
        let version = self.coordinate.version.as_deref()?;
        Some(format!(
            "{}/{}/{}/{}-{}.jar",
            self.coordinate.group.replace('.', "/"),
            self.coordinate.artifact,
            version,
            self.coordinate.artifact,
            version
        ))
    }
}

/// Plan metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlanMetadata {
    /// When the plan was generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// classplan version that generated the plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classplan_version: Option<String>,
}
