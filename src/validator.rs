//! Project descriptor validation

use crate::descriptor::{DependencyDeclaration, ProjectDescriptor, RepositoryDeclaration, Scope};
use std::collections::HashSet;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid group identifier
    InvalidGroup(String),
    /// Invalid artifact identifier
    InvalidArtifact(String),
    /// Invalid version string
    InvalidVersion(String),
    /// Repository declaration problem
    InvalidRepository { label: String, reason: String },
    /// Platform declaration without a version
    MissingPlatformVersion(String),
    /// Same coordinate declared twice in one scope
    DuplicateDeclaration { coordinate: String, scope: Scope },
    /// Version-less declaration with no platform that could govern it
    UngovernedDependency { coordinate: String, scope: Scope },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidGroup(reason) => {
                write!(f, "Invalid group: {}", reason)
            }
            ValidationError::InvalidArtifact(reason) => {
                write!(f, "Invalid artifact: {}", reason)
            }
            ValidationError::InvalidVersion(reason) => {
                write!(f, "Invalid version: {}", reason)
            }
            ValidationError::InvalidRepository { label, reason } => {
                write!(f, "Invalid repository '{}': {}", label, reason)
            }
            ValidationError::MissingPlatformVersion(coordinate) => {
                write!(f, "Platform '{}' must declare a version", coordinate)
            }
            ValidationError::DuplicateDeclaration { coordinate, scope } => {
                write!(f, "Duplicate declaration of '{}' in scope {}", coordinate, scope)
            }
            ValidationError::UngovernedDependency { coordinate, scope } => {
                write!(
                    f,
                    "'{}' in scope {} has no version and no platform governs that scope",
                    coordinate, scope
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Project descriptor validator
pub struct Validator;

impl Validator {
    /// Validate a descriptor, accumulating every problem found
    pub fn validate(descriptor: &ProjectDescriptor) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_group(&descriptor.project.group) {
            errors.push(e);
        }
        if let Err(e) = Self::validate_version(&descriptor.project.version) {
            errors.push(e);
        }

        errors.extend(Self::validate_repositories(&descriptor.repositories));
        errors.extend(Self::validate_dependencies(&descriptor.dependencies));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a dot-separated group identifier
    pub fn validate_group(group: &str) -> Result<(), ValidationError> {
        if group.is_empty() {
            return Err(ValidationError::InvalidGroup(
                "group cannot be empty".to_string(),
            ));
        }
        for segment in group.split('.') {
            if let Err(reason) = Self::check_segment(segment) {
                return Err(ValidationError::InvalidGroup(format!(
                    "'{}': {}",
                    group, reason
                )));
            }
        }
        Ok(())
    }

    /// Validate an artifact identifier
    pub fn validate_artifact(artifact: &str) -> Result<(), ValidationError> {
        Self::check_segment(artifact)
            .map_err(|reason| ValidationError::InvalidArtifact(format!("'{}': {}", artifact, reason)))
    }

    /// Validate a version string
    pub fn validate_version(version: &str) -> Result<(), ValidationError> {
        if version.is_empty() {
            return Err(ValidationError::InvalidVersion(
                "version cannot be empty".to_string(),
            ));
        }
        if !version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' || c == '+')
        {
            return Err(ValidationError::InvalidVersion(format!(
                "'{}' contains invalid characters",
                version
            )));
        }
        Ok(())
    }

    fn check_segment(segment: &str) -> Result<(), String> {
        if segment.is_empty() {
            return Err("empty segment".to_string());
        }
        let first = segment.chars().next().unwrap();
        if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
            return Err(format!(
                "segment '{}' must start with a lowercase letter or digit",
                segment
            ));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(format!("segment '{}' contains invalid characters", segment));
        }
        Ok(())
    }

    fn validate_repositories(repositories: &[RepositoryDeclaration]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut labels = HashSet::new();

        for repository in repositories {
            match url::Url::parse(&repository.url) {
                Ok(parsed) => {
                    if parsed.scheme() != "http" && parsed.scheme() != "https" {
                        errors.push(ValidationError::InvalidRepository {
                            label: repository.label().to_string(),
                            reason: format!("unsupported scheme '{}'", parsed.scheme()),
                        });
                    }
                }
                Err(e) => {
                    errors.push(ValidationError::InvalidRepository {
                        label: repository.label().to_string(),
                        reason: e.to_string(),
                    });
                }
            }

            if !labels.insert(repository.label().to_string()) {
                errors.push(ValidationError::InvalidRepository {
                    label: repository.label().to_string(),
                    reason: "duplicate repository label".to_string(),
                });
            }
        }

        errors
    }

    fn validate_dependencies(dependencies: &[DependencyDeclaration]) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for declaration in dependencies {
            let coordinate = &declaration.coordinate;

            if let Err(e) = Self::validate_group(&coordinate.group) {
                errors.push(e);
            }
            if let Err(e) = Self::validate_artifact(&coordinate.artifact) {
                errors.push(e);
            }

            match &coordinate.version {
                Some(version) => {
                    if let Err(e) = Self::validate_version(version) {
                        errors.push(e);
                    }
                }
                None if declaration.platform => {
                    errors.push(ValidationError::MissingPlatformVersion(
                        coordinate.to_string(),
                    ));
                }
                None => {
                    // A platform in this scope or an earlier one could still
                    // supply the version; only flag declarations that are
                    // certain to fail resolution.
                    let governed = dependencies
                        .iter()
                        .any(|d| d.platform && d.scope <= declaration.scope);
                    if !governed {
                        errors.push(ValidationError::UngovernedDependency {
                            coordinate: coordinate.to_string(),
                            scope: declaration.scope,
                        });
                    }
                }
            }

            if !seen.insert((coordinate.to_string(), declaration.scope)) {
                errors.push(ValidationError::DuplicateDeclaration {
                    coordinate: coordinate.to_string(),
                    scope: declaration.scope,
                });
            }
        }

        errors
    }
}
