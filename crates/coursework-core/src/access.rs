//! Access rules: when each task is open, and how submissions are kept.
//!
//! The `accessibility` field of a rule is either a plain boolean or a string
//! of three timestamps, `start/deadline/soft_deadline`, in
//! `YYYY-MM-DD HH:MM:SS` form without a timezone.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{AccessibilityError, ParseError};

/// Timestamp layout used by date-range accessibility strings.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// chrono accepts short fields and stray spaces; the layout is fixed-width.
static DATE_TIME_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("timestamp pattern is valid")
});

/// A task's opening window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Accessibility {
    /// Always open (`true`) or always closed (`false`).
    Flag { value: bool },
    /// Open from `start` until `deadline`.
    Window(DateRange),
}

/// The three instants of a date-range accessibility field.
///
/// No ordering between the three is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub deadline: NaiveDateTime,
    pub soft_deadline: NaiveDateTime,
}

impl Accessibility {
    /// Decode a raw YAML node: a boolean first, then a date-range string.
    pub fn from_yaml(node: &Value) -> Result<Self, AccessibilityError> {
        match node {
            Value::Bool(value) => Ok(Accessibility::Flag { value: *value }),
            Value::String(raw) => raw.parse(),
            other => Err(AccessibilityError::malformed(
                describe_node(other),
                "accessibility must be a boolean or a date range string",
            )),
        }
    }

    /// Whether the task is open at `now`.
    ///
    /// A date range is open on the half-open interval `[start, deadline)`.
    pub fn is_accessible_at(&self, now: NaiveDateTime) -> bool {
        match self {
            Accessibility::Flag { value } => *value,
            Accessibility::Window(range) => range.start <= now && now < range.deadline,
        }
    }

    /// Whether the task is open right now (UTC wall-clock time).
    pub fn is_accessible_now(&self) -> bool {
        self.is_accessible_at(Utc::now().naive_utc())
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        match self {
            Accessibility::Window(range) => Some(range),
            Accessibility::Flag { .. } => None,
        }
    }
}

impl std::str::FromStr for Accessibility {
    type Err = AccessibilityError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 3 {
            return Err(AccessibilityError::malformed(
                raw,
                format!(
                    "date range must have 3 parts (start/deadline/soft_deadline), got {}",
                    parts.len()
                ),
            ));
        }

        let parse = |label: &str, part: &str| {
            if !DATE_TIME_SHAPE.is_match(part) {
                return Err(AccessibilityError::malformed(
                    raw,
                    format!("invalid {label} {part:?}: expected YYYY-MM-DD HH:MM:SS"),
                ));
            }
            NaiveDateTime::parse_from_str(part, DATE_TIME_FORMAT).map_err(|e| {
                AccessibilityError::malformed(raw, format!("invalid {label} {part:?}: {e}"))
            })
        };

        Ok(Accessibility::Window(DateRange {
            start: parse("start date", parts[0])?,
            deadline: parse("deadline", parts[1])?,
            soft_deadline: parse("soft deadline", parts[2])?,
        }))
    }
}

fn describe_node(node: &Value) -> String {
    match node {
        Value::Null => "null".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Sequence(_) => "a sequence".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("a value tagged {}", tagged.tag),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
    }
}

/// How a task picks the submission that counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationMode {
    Best,
    Last,
}

/// At most `amount` submissions per `period_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionLimit {
    pub amount: i64,
    pub period_minutes: i64,
}

/// Access rule for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskAccessConfig {
    /// `None` when the source omits the field; such a task is never open.
    pub accessibility: Option<Accessibility>,
    pub evaluation_mode: Option<EvaluationMode>,
    pub max_stored_submissions: i64,
    pub submission_limit: Option<SubmissionLimit>,
}

impl TaskAccessConfig {
    pub fn is_accessible_at(&self, now: NaiveDateTime) -> bool {
        self.accessibility
            .as_ref()
            .is_some_and(|a| a.is_accessible_at(now))
    }
}

/// The parsed `access.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessConfig {
    /// Rules keyed by task id, in document order.
    pub tasks: IndexMap<String, TaskAccessConfig>,
    pub imported: bool,
    pub converted: bool,
}

impl AccessConfig {
    pub fn get(&self, task_id: &str) -> Option<&TaskAccessConfig> {
        self.tasks.get(task_id)
    }

    /// Whether `task_id` is open at `now`. Tasks without a rule are closed.
    pub fn is_task_accessible_at(&self, task_id: &str, now: NaiveDateTime) -> bool {
        self.get(task_id)
            .is_some_and(|rule| rule.is_accessible_at(now))
    }
}

// ---------------------------------------------------------------------------
// YAML document shape
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct YamlAccessFile {
    #[serde(default)]
    dispenser_data: YamlDispenserData,
}

#[derive(Debug, Default, Deserialize)]
struct YamlDispenserData {
    #[serde(default)]
    config: Option<IndexMap<String, YamlTaskAccess>>,
    #[serde(default)]
    imported: bool,
    #[serde(default)]
    converted: bool,
}

#[derive(Debug, Deserialize)]
struct YamlTaskAccess {
    #[serde(default)]
    accessibility: Value,
    #[serde(default)]
    evaluation_mode: Option<EvaluationMode>,
    #[serde(default)]
    no_stored_submissions: i64,
    #[serde(default)]
    submission_limit: Option<YamlSubmissionLimit>,
}

#[derive(Debug, Deserialize)]
struct YamlSubmissionLimit {
    #[serde(default)]
    amount: i64,
    #[serde(default)]
    period: i64,
}

/// Parse an `access.yaml` file.
pub fn parse_access_config(path: &Path) -> Result<AccessConfig, ParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ParseError::new(path, "failed to read file").with_cause(e))?;

    parse_access_config_str(&content, path)
}

/// Parse `access.yaml` content (useful for testing).
pub fn parse_access_config_str(content: &str, source_path: &Path) -> Result<AccessConfig, ParseError> {
    let parsed: YamlAccessFile = if content.trim().is_empty() {
        YamlAccessFile::default()
    } else {
        serde_yaml::from_str(content)
            .map_err(|e| ParseError::new(source_path, "failed to parse YAML").with_cause(e))?
    };

    let data = parsed.dispenser_data;
    let mut tasks = IndexMap::new();

    for (task_id, rule) in data.config.unwrap_or_default() {
        let accessibility = match &rule.accessibility {
            Value::Null => None,
            node => Some(Accessibility::from_yaml(node).map_err(|e| {
                ParseError::new(source_path, format!("task {task_id}: invalid accessibility"))
                    .with_field("accessibility")
                    .with_cause(e)
            })?),
        };

        tasks.insert(
            task_id,
            TaskAccessConfig {
                accessibility,
                evaluation_mode: rule.evaluation_mode,
                max_stored_submissions: rule.no_stored_submissions,
                submission_limit: rule.submission_limit.map(|l| SubmissionLimit {
                    amount: l.amount,
                    period_minutes: l.period,
                }),
            },
        );
    }

    tracing::debug!("parsed {} access rules from {}", tasks.len(), source_path.display());

    Ok(AccessConfig {
        tasks,
        imported: data.imported,
        converted: data.converted,
    })
}
