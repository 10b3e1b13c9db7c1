//! Task definitions (`task.yaml`).

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::ParseError;
use crate::problem::{ProblemList, RawProblems};

/// Resource limits for a sandboxed task, kept as written by the author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentLimits {
    /// Time limit in seconds.
    #[serde(deserialize_with = "scalar_string")]
    pub time: String,
    /// Hard time limit in seconds; empty when unset.
    #[serde(deserialize_with = "scalar_string")]
    pub hard_time: String,
    /// Memory limit in megabytes.
    #[serde(deserialize_with = "scalar_string")]
    pub memory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentParameters {
    pub limits: Option<EnvironmentLimits>,
    pub run_cmd: Option<String>,
}

/// A parsed `task.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskConfig {
    pub name: String,
    pub author: String,
    pub contact_url: String,
    /// Free-text statement shown above the problems.
    pub context: String,
    pub environment_id: String,
    /// `docker`, `mcq`, or anything else the platform understands.
    pub environment_type: String,
    pub environment_parameters: EnvironmentParameters,
    pub file: String,
    pub network_grading: bool,
    pub problems: ProblemList,
    /// Number of randomised inputs (MCQ tasks only).
    pub input_random: i64,
    pub regenerate_input_random: Option<String>,
}

impl TaskConfig {
    pub fn is_docker(&self) -> bool {
        self.environment_type == "docker"
    }

    pub fn is_mcq(&self) -> bool {
        self.environment_type == "mcq"
    }
}

/// Intermediate YAML structure for task files.
#[derive(Debug, Deserialize)]
struct YamlTaskFile {
    #[serde(default, deserialize_with = "scalar_string")]
    name: String,
    #[serde(default, deserialize_with = "scalar_string")]
    author: String,
    #[serde(default, deserialize_with = "scalar_string")]
    contact_url: String,
    #[serde(default, deserialize_with = "scalar_string")]
    context: String,
    #[serde(default, deserialize_with = "scalar_string")]
    environment_id: String,
    #[serde(default, deserialize_with = "scalar_string")]
    environment_type: String,
    #[serde(default)]
    environment_parameters: Option<YamlEnvironmentParameters>,
    #[serde(default, deserialize_with = "scalar_string")]
    file: String,
    #[serde(default)]
    network_grading: bool,
    #[serde(default)]
    problems: RawProblems,
    #[serde(default)]
    input_random: i64,
    #[serde(default, deserialize_with = "scalar_string")]
    regenerate_input_random: String,
}

#[derive(Debug, Default, Deserialize)]
struct YamlEnvironmentParameters {
    #[serde(default)]
    limits: Option<EnvironmentLimits>,
    #[serde(default, deserialize_with = "scalar_string")]
    run_cmd: String,
}

/// Accept a string, number, or boolean and keep its text; null becomes empty.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(serde::de::Error::custom("expected a scalar value")),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse a `task.yaml` file.
pub fn parse_task_config(path: &Path) -> Result<TaskConfig, ParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ParseError::new(path, "failed to read file").with_cause(e))?;

    parse_task_config_str(&content, path)
}

/// Parse `task.yaml` content (useful for testing).
pub fn parse_task_config_str(content: &str, source_path: &Path) -> Result<TaskConfig, ParseError> {
    let parsed: YamlTaskFile = serde_yaml::from_str(content)
        .map_err(|e| ParseError::new(source_path, "failed to parse YAML").with_cause(e))?;

    let problems = ProblemList::decode(parsed.problems.into_pairs())
        .map_err(|e| {
            ParseError::new(source_path, "failed to decode problems")
                .with_field("problems")
                .with_cause(e)
        })?;

    let environment_parameters = parsed
        .environment_parameters
        .map(|p| EnvironmentParameters {
            limits: p.limits,
            run_cmd: non_empty(p.run_cmd),
        })
        .unwrap_or_default();

    tracing::debug!(
        "parsed task {} with {} problems from {}",
        parsed.name,
        problems.len(),
        source_path.display()
    );

    Ok(TaskConfig {
        name: parsed.name,
        author: parsed.author,
        contact_url: parsed.contact_url,
        context: parsed.context,
        environment_id: parsed.environment_id,
        environment_type: parsed.environment_type,
        environment_parameters,
        file: parsed.file,
        network_grading: parsed.network_grading,
        problems,
        input_random: parsed.input_random,
        regenerate_input_random: non_empty(parsed.regenerate_input_random),
    })
}
