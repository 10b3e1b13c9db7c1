//! Error types for course loading.
//!
//! Every document decode failure is a [`ParseError`] naming the file it came
//! from. The course loader wraps those in a [`CourseLoadError`] that records
//! which stage of the load failed. Grading has no error type: answer anomalies
//! are grading outcomes, not failures.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A failure to decode the accessibility field of an access rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessibilityError {
    /// The field is neither a boolean nor a well-formed `start/deadline/soft` string.
    #[error("malformed accessibility field {raw:?}: {reason}")]
    Malformed { raw: String, reason: String },
}

impl AccessibilityError {
    pub(crate) fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        AccessibilityError::Malformed {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// The original text of the offending field.
    pub fn raw(&self) -> &str {
        match self {
            AccessibilityError::Malformed { raw, .. } => raw,
        }
    }
}

/// A failure to decode the `problems` mapping of a task.
#[derive(Debug, Error)]
pub enum ProblemError {
    /// The `type` discriminator is absent or not a string.
    #[error("problem {problem_id}: failed to read type: {message}")]
    MissingType { problem_id: String, message: String },

    /// The `type` discriminator names no known problem variant.
    #[error("problem {problem_id}: unknown type {kind:?}")]
    UnknownType { problem_id: String, kind: String },

    /// The record matched its variant but a field failed to decode.
    #[error("problem {problem_id} ({kind}): {source}")]
    Invalid {
        problem_id: String,
        kind: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The same id appears twice in one task.
    #[error("problem {problem_id}: duplicate problem id")]
    DuplicateId { problem_id: String },
}

/// The underlying reason a document failed to parse.
#[derive(Debug, Error)]
pub enum ParseCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Accessibility(#[from] AccessibilityError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

/// A single-document decode failure.
#[derive(Debug, Error)]
pub struct ParseError {
    /// The file being parsed.
    pub file: PathBuf,
    /// The field that failed, when known.
    pub field: Option<String>,
    /// Human-readable description.
    pub message: String,
    /// The underlying cause.
    #[source]
    pub cause: Option<ParseCause>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "{}: field `{}`: {}",
                self.file.display(),
                field,
                self.message
            ),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}

impl ParseError {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            field: None,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<ParseCause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The accessibility decode failure behind this error, if that is what it was.
    pub fn accessibility_error(&self) -> Option<&AccessibilityError> {
        match &self.cause {
            Some(ParseCause::Accessibility(e)) => Some(e),
            _ => None,
        }
    }

    /// The problem decode failure behind this error, if that is what it was.
    pub fn problem_error(&self) -> Option<&ProblemError> {
        match &self.cause {
            Some(ParseCause::Problem(e)) => Some(e),
            _ => None,
        }
    }
}

/// The stage of a course load that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Config,
    Access,
    Tasks,
    Syllabus,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStage::Config => write!(f, "failed to load config"),
            LoadStage::Access => write!(f, "failed to load access"),
            LoadStage::Tasks => write!(f, "failed to load tasks"),
            LoadStage::Syllabus => write!(f, "failed to load syllabus"),
        }
    }
}

/// A course failed to load; wraps the document error with course context.
#[derive(Debug, Error)]
#[error("course {course_id}: {stage}")]
pub struct CourseLoadError {
    pub course_id: String,
    pub stage: LoadStage,
    #[source]
    pub cause: ParseError,
}

/// A failure while loading every course under a root directory.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The courses root itself could not be enumerated.
    #[error(transparent)]
    Root(ParseError),

    /// One course failed; the batch is abandoned.
    #[error(transparent)]
    Course(#[from] CourseLoadError),

    /// A background load worker panicked or was cancelled.
    #[error("course load worker failed: {0}")]
    Worker(String),
}

/// A code-execution request could not be built for a problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunRequestError {
    #[error("problem {0} not found in task")]
    UnknownProblem(String),

    #[error("problem {problem_id} is a {kind} problem, not a code problem")]
    NotCodeProblem { problem_id: String, kind: String },

    #[error("invalid {field} limit {value:?}: expected a whole number")]
    InvalidLimit { field: &'static str, value: String },
}
