//! Maven coordinates, scopes and declared dependencies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Scope label carried by a dependency edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed to compile and run (default)
    #[default]
    Compile,
    /// Needed at runtime only
    Runtime,
    /// Supplied by the host at runtime
    Provided,
    /// Only needed to compile and run tests
    Test,
    /// Supplied by the system, resolved from an explicit path
    System,
    /// Dependency management import (never on a classpath)
    Import,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Compile,
        Scope::Runtime,
        Scope::Provided,
        Scope::Test,
        Scope::System,
        Scope::Import,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Runtime => "runtime",
            Self::Provided => "provided",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        }
    }

    /// Edges the primary collection walk descends into
    #[inline]
    pub fn is_compile_visible(&self) -> bool {
        matches!(self, Self::Compile | Self::Provided)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownScope(s.to_string()))
    }
}

/// Treat a blank classifier the same as an absent one
pub(crate) fn normalize_classifier(classifier: Option<&str>) -> Option<&str> {
    classifier.filter(|c| !c.trim().is_empty())
}

/// `group:artifact[:classifier]:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            classifier: None,
            version: version.into(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Classifier with blank values folded to `None`
    pub fn classifier(&self) -> Option<&str> {
        normalize_classifier(self.classifier.as_deref())
    }

    /// Coordinate of the matching `sources` artifact
    pub fn sources(&self) -> Self {
        let classifier = match self.classifier() {
            Some(c) => format!("{}-sources", c),
            None => "sources".to_string(),
        };
        Self {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: Some(classifier),
            version: self.version.clone(),
        }
    }

    /// Fail if group, artifact or version is blank
    pub fn validate(&self) -> Result<()> {
        require("groupId", &self.group_id)?;
        require("artifactId", &self.artifact_id)?;
        require("version", &self.version)?;
        Ok(())
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid_identity(field, value));
    }
    Ok(())
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if let Some(classifier) = self.classifier() {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for Coordinate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let coordinate = match parts.as_slice() {
            [group, artifact, version] => Coordinate::new(*group, *artifact, *version),
            [group, artifact, classifier, version] => {
                Coordinate::new(*group, *artifact, *version).with_classifier(*classifier)
            }
            _ => {
                return Err(CoreError::InvalidCoordinate {
                    coordinate: s.to_string(),
                    message: "expected group:artifact[:classifier]:version".to_string(),
                });
            }
        };
        coordinate.validate()?;
        Ok(coordinate)
    }
}

/// Excluded transitive artifact (`*` matches anything)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        (self.group_id == "*" || self.group_id == group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact_id)
    }
}

/// A top-level Maven reference as declared by the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredDependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub version: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Exclusion>,
}

impl DeclaredDependency {
    pub fn new(coordinate: Coordinate, scope: Scope) -> Self {
        Self {
            group_id: coordinate.group_id,
            artifact_id: coordinate.artifact_id,
            classifier: coordinate.classifier,
            version: coordinate.version,
            scope,
            optional: false,
            exclusions: Vec::new(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            classifier: normalize_classifier(self.classifier.as_deref()).map(String::from),
            version: self.version.clone(),
        }
    }

    /// Request equality used to decide whether a cached graph still applies.
    ///
    /// Exclusions are not compared.
    pub fn same_request(&self, other: &DeclaredDependency) -> bool {
        self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && normalize_classifier(self.classifier.as_deref())
                == normalize_classifier(other.classifier.as_deref())
            && self.version == other.version
            && self.scope == other.scope
            && self.optional == other.optional
    }

    pub fn validate(&self) -> Result<()> {
        require("groupId", &self.group_id)?;
        require("artifactId", &self.artifact_id)?;
        require("version", &self.version)?;
        Ok(())
    }

    pub fn is_excluded(&self, group_id: &str, artifact_id: &str) -> bool {
        self.exclusions.iter().any(|e| e.matches(group_id, artifact_id))
    }
}

/// Remote repository identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub url: String,
}

impl RepositoryDescriptor {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Maven Central
    pub fn central() -> Self {
        Self::new("central", "https://repo.maven.apache.org/maven2/")
    }
}
