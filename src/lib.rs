//! Classpath planning for declarative project descriptors
//!
//! Parses a project descriptor (group, version, ordered repositories,
//! scoped dependency declarations), validates it, and resolves it into an
//! ordered, deduplicated classpath plan per scope. Platform (BOM)
//! declarations pin the versions of the artifacts they manage without
//! contributing entries to the plan themselves.

pub mod descriptor;
pub mod plan;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use descriptor::{
    ArtifactKey, Coordinate, DependencyDeclaration, ProjectDescriptor, RepositoryDeclaration,
    Scope,
};
pub use plan::{PlanMetadata, ResolutionPlan, ResolvedDependency};
pub use registry::{HttpRepository, IndexRepository, Repository, RepositoryError};
pub use resolver::{ResolveError, Resolver};
pub use validator::{ValidationError, Validator};

/// Descriptor loading errors
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Failed to parse descriptor: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid coordinate '{input}': {reason}")]
    InvalidCoordinate { input: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DescriptorError>;
