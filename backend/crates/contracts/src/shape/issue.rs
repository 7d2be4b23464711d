//! Structured validation failures.

use serde::{Deserialize, Serialize};

/// One step in the path from the validated root to an offending value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object key.
    Key(String),
    /// Array index.
    Index(usize),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Category of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required field is missing.
    Required,
    /// The value has the wrong JSON type.
    InvalidType,
    /// Below a length, item-count, or numeric minimum.
    TooSmall,
    /// Above a length, item-count, or numeric maximum.
    TooBig,
    /// A string failed a format check (email, uuid, url).
    InvalidString,
    /// A string is not one of the allowed literals.
    InvalidEnumValue,
    /// A value could not be read as a date.
    InvalidDate,
    /// A number has a fractional part where an integer is required.
    NotInteger,
    /// A closed object received keys it does not declare.
    UnrecognizedKeys,
    /// The raw input was not parseable JSON.
    InvalidJson,
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Location of the offending value; empty for the root.
    pub path: Vec<PathSegment>,
    /// Violation category.
    pub code: IssueCode,
    /// Human-readable reason.
    pub message: String,
}

impl Issue {
    /// Build an issue at `path`.
    pub fn new(path: &[PathSegment], code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            code,
            message: message.into(),
        }
    }

    /// Dotted rendering of the path, e.g. `items.2.name`.
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Every violation found while validating one input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("input failed validation with {} issue(s)", issues.len())]
pub struct ValidationFailure {
    /// Violations in the order they were found.
    pub issues: Vec<Issue>,
}

impl ValidationFailure {
    /// Wrap a list of issues.
    #[must_use]
    pub const fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Failure carrying a single root-level issue.
    pub fn single(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(vec![Issue::new(&[], code, message)])
    }
}
