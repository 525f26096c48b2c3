//! Scope-by-scope resolution of a descriptor into a classpath plan

use std::collections::BTreeMap;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, trace};

use crate::descriptor::{
    ArtifactKey, Coordinate, DependencyDeclaration, ProjectDescriptor, Scope,
};
use crate::plan::{PlanMetadata, ResolutionPlan, ResolvedDependency};
use crate::registry::{HttpRepository, Repository, RepositoryError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Coordinate '{coordinate}' was not found in any declared repository")]
    UnresolvedDependency { coordinate: Coordinate },

    #[error(
        "Version conflict for '{artifact}' in scope {scope}: {first} vs {second}, and no platform arbitrates"
    )]
    VersionConflict {
        artifact: ArtifactKey,
        scope: Scope,
        first: String,
        second: String,
    },

    #[error("'{coordinate}' in scope {scope} declares no version and no platform manages one")]
    MissingVersion { coordinate: Coordinate, scope: Scope },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolves project descriptors against an ordered repository set.
///
/// Repositories are explicit configuration, never global state. Their order
/// is the lookup order: first repository that knows a coordinate wins.
pub struct Resolver {
    repositories: Vec<Box<dyn Repository>>,
}

impl Resolver {
    pub fn new(repositories: Vec<Box<dyn Repository>>) -> Self {
        Self { repositories }
    }

    /// Build a resolver with one HTTP repository per declared repository,
    /// in declaration order.
    pub fn for_descriptor(descriptor: &ProjectDescriptor) -> Self {
        let repositories = descriptor
            .repositories
            .iter()
            .map(|declared| {
                Box::new(HttpRepository::new(declared.label(), &declared.url))
                    as Box<dyn Repository>
            })
            .collect();
        Self::new(repositories)
    }

    /// Resolve a descriptor into a per-scope classpath plan.
    ///
    /// Deterministic: identical descriptor and repository state yield an
    /// identical plan, entries in declaration order within each scope.
    pub fn resolve(&self, descriptor: &ProjectDescriptor) -> ResolveResult<ResolutionPlan> {
        let mut plan = ResolutionPlan::new();

        // Managed versions carry forward: a platform declared for compile
        // also governs the test scopes that build on it.
        let mut managed: BTreeMap<ArtifactKey, String> = BTreeMap::new();

        for scope in Scope::ALL {
            let declared: Vec<&DependencyDeclaration> = descriptor
                .dependencies
                .iter()
                .filter(|d| d.scope == scope)
                .collect();
            if declared.is_empty() {
                continue;
            }
            debug!(%scope, declared = declared.len(), "resolving scope");

            self.import_platforms(scope, &declared, &mut managed)?;
            let pinned = pin_versions(scope, &declared, &managed)?;
            for entry in self.locate(&pinned)? {
                plan.add_entry(scope, entry);
            }
        }

        plan.metadata = PlanMetadata {
            generated_at: Some(
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ),
            classplan_version: Some(env!("CARGO_PKG_VERSION").to_string()),
        };
        Ok(plan)
    }

    /// Merge every platform declaration's managed-version table into
    /// `managed`, first declaration winning on overlap.
    fn import_platforms(
        &self,
        scope: Scope,
        declared: &[&DependencyDeclaration],
        managed: &mut BTreeMap<ArtifactKey, String>,
    ) -> ResolveResult<()> {
        for declaration in declared.iter().filter(|d| d.platform) {
            let coordinate = &declaration.coordinate;
            if coordinate.version.is_none() {
                return Err(ResolveError::MissingVersion {
                    coordinate: coordinate.clone(),
                    scope,
                });
            }
            let imports = self.platform_imports(coordinate)?;
            for (key, version) in imports {
                managed.entry(key).or_insert(version);
            }
        }
        Ok(())
    }

    fn platform_imports(
        &self,
        coordinate: &Coordinate,
    ) -> ResolveResult<BTreeMap<ArtifactKey, String>> {
        for repository in &self.repositories {
            if let Some(imports) = repository.platform_imports(coordinate)? {
                trace!(
                    repository = repository.name(),
                    %coordinate,
                    entries = imports.len(),
                    "platform found"
                );
                return Ok(imports);
            }
        }
        Err(ResolveError::UnresolvedDependency {
            coordinate: coordinate.clone(),
        })
    }

    /// Look up every pinned coordinate, repositories in declaration order,
    /// first success winning. Lookups for independent coordinates run in
    /// parallel; results are joined in declaration order, so the earliest
    /// declared failure is the one reported.
    fn locate(&self, pinned: &[Coordinate]) -> ResolveResult<Vec<ResolvedDependency>> {
        let results: Vec<ResolveResult<ResolvedDependency>> = pinned
            .par_iter()
            .map(|coordinate| {
                for repository in &self.repositories {
                    if repository.contains(coordinate)? {
                        trace!(repository = repository.name(), %coordinate, "located");
                        return Ok(ResolvedDependency {
                            coordinate: coordinate.clone(),
                            repository: repository.name().to_string(),
                        });
                    }
                }
                Err(ResolveError::UnresolvedDependency {
                    coordinate: coordinate.clone(),
                })
            })
            .collect();

        results.into_iter().collect()
    }
}

/// Apply managed versions, drop duplicates, and enforce the per-scope
/// conflict invariant.
fn pin_versions(
    scope: Scope,
    declared: &[&DependencyDeclaration],
    managed: &BTreeMap<ArtifactKey, String>,
) -> ResolveResult<Vec<Coordinate>> {
    let mut pinned: Vec<Coordinate> = Vec::new();
    let mut seen: BTreeMap<ArtifactKey, String> = BTreeMap::new();

    for declaration in declared.iter().filter(|d| !d.platform) {
        let key = declaration.coordinate.key();

        // A managed version always overrides a declared one: an artifact
        // under a platform never resolves to any other version.
        let version = managed
            .get(&key)
            .cloned()
            .or_else(|| declaration.coordinate.version.clone())
            .ok_or_else(|| ResolveError::MissingVersion {
                coordinate: declaration.coordinate.clone(),
                scope,
            })?;

        match seen.get(&key) {
            // Duplicate declaration, first one kept.
            Some(existing) if *existing == version => {}
            Some(existing) => {
                return Err(ResolveError::VersionConflict {
                    artifact: key,
                    scope,
                    first: existing.clone(),
                    second: version,
                });
            }
            None => {
                seen.insert(key, version.clone());
                pinned.push(declaration.coordinate.with_version(&version));
            }
        }
    }

    Ok(pinned)
}
