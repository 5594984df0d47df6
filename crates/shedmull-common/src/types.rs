//! Domain primitive types used across the shedmull workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShedmullError;

/// One versioned ToolShed tool referenced by a workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolReference {
    /// Repository name.
    pub name: String,
    /// Repository owner.
    pub owner: String,
    /// Changeset revision of the repository.
    pub revision: String,
    /// ToolShed host name (no scheme).
    pub toolshed: String,
    /// Short tool id inside the repository, when known.
    pub tool_id: Option<String>,
}

impl fmt::Display for ToolReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}@{}", self.toolshed, self.owner, self.name, self.revision)?;
        if let Some(id) = &self.tool_id {
            write!(f, " ({id})")?;
        }
        Ok(())
    }
}

/// A package requirement declared by a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name as declared.
    pub name: String,
    /// Declared version, if any.
    #[serde(default)]
    pub version: Option<String>,
}

/// A resolved package: name, version and conda build string.
///
/// `package_name` is the name used for searching and naming; `package`
/// keeps the originally declared spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageTarget {
    /// Name used for index search and image naming.
    pub package_name: String,
    /// Package version.
    pub version: Option<String>,
    /// Conda build string.
    pub build: Option<String>,
    /// Originally declared package name.
    pub package: String,
}

impl PackageTarget {
    /// Creates an unrefined target with no build string.
    #[must_use]
    pub fn new(package_name: impl Into<String>, version: Option<String>) -> Self {
        let package_name = package_name.into();
        Self {
            package: package_name.clone(),
            package_name,
            version,
            build: None,
        }
    }

    /// Returns a refined copy carrying a build string and a lowercased
    /// search name, keeping the declared name in `package`.
    #[must_use]
    pub fn refined(&self, build: impl Into<String>) -> Self {
        Self {
            package_name: self.package_name.to_lowercase(),
            version: self.version.clone(),
            build: Some(build.into()),
            package: self.package.clone(),
        }
    }
}

impl From<&Requirement> for PackageTarget {
    fn from(req: &Requirement) -> Self {
        Self::new(req.name.clone(), req.version.clone())
    }
}

/// Mulled image naming scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MulledVersion {
    /// Legacy scheme: one hash over `name=version=build` lines.
    V1,
    /// Current scheme: a name hash and a separate version hash.
    #[default]
    V2,
}

impl fmt::Display for MulledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for MulledVersion {
    type Err = ShedmullError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(ShedmullError::Config {
                message: format!("unknown mulled version: {other} (expected v1 or v2)"),
            }),
        }
    }
}

/// Deterministic container image name, also used as the depot file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageIdentifier(String);

impl ImageIdentifier {
    /// Creates an identifier from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-fatal condition noticed while resolving a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionWarning {
    /// More than one installable tool matched; the first was used.
    AmbiguousTool {
        /// Tool that was looked up.
        tool: String,
        /// Number of matching `valid_tools` entries.
        candidates: usize,
    },
    /// No installable tool in the revision matched.
    NoMatchingTool {
        /// Tool that was looked up.
        tool: String,
    },
    /// A requirement carries no version and was left out of the spec string.
    UnversionedRequirement {
        /// Package name.
        package: String,
    },
    /// The package index had no build for the requested package.
    PackageNotIndexed {
        /// Search spec that returned nothing.
        spec: String,
    },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousTool { tool, candidates } => {
                write!(f, "{candidates} matching tools for {tool}, using the first")
            }
            Self::NoMatchingTool { tool } => write!(f, "no matching tool for {tool}"),
            Self::UnversionedRequirement { package } => {
                write!(f, "requirement {package} has no version, omitted from spec string")
            }
            Self::PackageNotIndexed { spec } => {
                write!(f, "no package index build found for {spec}")
            }
        }
    }
}

/// A best-effort result together with the warnings raised producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// Resolved value.
    pub value: T,
    /// Warnings raised along the way, in order.
    pub warnings: Vec<ResolutionWarning>,
}

impl<T> Resolved<T> {
    /// Wraps a value with no warnings.
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Records a warning.
    pub fn warn(&mut self, warning: ResolutionWarning) {
        self.warnings.push(warning);
    }
}
