//! Code-execution boundary.
//!
//! Code problems are executed by an external sandbox. This module defines the
//! async trait such a sandbox implements and builds its requests from a task's
//! problem and resource limits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RunRequestError;
use crate::problem::Problem;
use crate::task::TaskConfig;

pub const DEFAULT_TIME_LIMIT_SECS: u64 = 10;
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 128;

/// Exit code reported when a run is killed for exceeding its time limit.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Trait for sandboxed execution of submitted code.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    /// Execute one request and report what it printed and how it exited.
    async fn run(&self, request: &RunRequest) -> anyhow::Result<RunOutcome>;
}

/// Resource limits applied to one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub time_secs: u64,
    /// Wall-clock limit; `None` lets the sandbox pick.
    pub hard_time_secs: Option<u64>,
    pub memory_mb: u64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            time_secs: DEFAULT_TIME_LIMIT_SECS,
            hard_time_secs: None,
            memory_mb: DEFAULT_MEMORY_LIMIT_MB,
        }
    }
}

/// Request to execute submitted code for a code problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    pub problem_id: String,
    /// The submitted source code.
    pub code: String,
    pub language: String,
    /// Command the sandbox should run instead of its default, if any.
    #[serde(default)]
    pub run_cmd: Option<String>,
    /// Whether the run may reach the network.
    pub network: bool,
    pub limits: ResourceLimits,
}

impl RunRequest {
    /// Build a request for `problem_id` of `task`.
    pub fn for_problem(
        task: &TaskConfig,
        problem_id: &str,
        code: impl Into<String>,
    ) -> Result<Self, RunRequestError> {
        let problem = task
            .problems
            .get(problem_id)
            .ok_or_else(|| RunRequestError::UnknownProblem(problem_id.to_string()))?;

        let Problem::Code(code_problem) = problem else {
            return Err(RunRequestError::NotCodeProblem {
                problem_id: problem_id.to_string(),
                kind: problem.kind().to_string(),
            });
        };

        let params = &task.environment_parameters;
        let limits = match &params.limits {
            Some(l) => ResourceLimits {
                time_secs: parse_limit("time", &l.time)?.unwrap_or(DEFAULT_TIME_LIMIT_SECS),
                hard_time_secs: parse_limit("hard_time", &l.hard_time)?,
                memory_mb: parse_limit("memory", &l.memory)?.unwrap_or(DEFAULT_MEMORY_LIMIT_MB),
            },
            None => ResourceLimits::default(),
        };

        Ok(Self {
            problem_id: problem_id.to_string(),
            code: code.into(),
            language: code_problem.language.clone(),
            run_cmd: params.run_cmd.clone(),
            network: task.network_grading,
            limits,
        })
    }
}

/// Empty means unset.
fn parse_limit(field: &'static str, raw: &str) -> Result<Option<u64>, RunRequestError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| RunRequestError::InvalidLimit {
        field,
        value: raw.to_string(),
    })
}

/// What a sandboxed run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub exit_code: i32,
}

impl RunOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    pub fn timed_out(&self) -> bool {
        self.exit_code == TIMEOUT_EXIT_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::parse_task_config_str;
    use std::path::Path;
    use std::sync::Mutex;

    const TASK: &str = r#"
environment_type: docker
network_grading: true
environment_parameters:
  limits:
    time: 30
    hard_time: ''
    memory: '100'
  run_cmd: run.sh
problems:
  solve:
    type: code
    language: python
  pick:
    type: multiple_choice
"#;

    fn task(yaml: &str) -> TaskConfig {
        parse_task_config_str(yaml, Path::new("task.yaml")).unwrap()
    }

    /// Records every request and echoes the code back.
    #[derive(Default)]
    struct EchoRunner {
        seen: Mutex<Vec<RunRequest>>,
    }

    #[async_trait]
    impl CodeRunner for EchoRunner {
        async fn run(&self, request: &RunRequest) -> anyhow::Result<RunOutcome> {
            self.seen.lock().unwrap().push(request.clone());
            if request.limits.time_secs == 0 {
                return Ok(RunOutcome {
                    output: String::new(),
                    error: "timed out".into(),
                    exit_code: TIMEOUT_EXIT_CODE,
                });
            }
            Ok(RunOutcome {
                output: request.code.clone(),
                ..Default::default()
            })
        }
    }

    #[test]
    fn request_carries_problem_and_task_settings() {
        let request = RunRequest::for_problem(&task(TASK), "solve", "print(1)").unwrap();
        assert_eq!(request.language, "python");
        assert_eq!(request.run_cmd.as_deref(), Some("run.sh"));
        assert!(request.network);
        assert_eq!(
            request.limits,
            ResourceLimits {
                time_secs: 30,
                hard_time_secs: None,
                memory_mb: 100,
            }
        );
    }

    #[test]
    fn missing_limits_use_defaults() {
        let request = RunRequest::for_problem(
            &task("problems:\n  solve:\n    type: code\n"),
            "solve",
            "",
        )
        .unwrap();
        assert_eq!(request.limits, ResourceLimits::default());
        assert!(!request.network);

        let request = RunRequest::for_problem(
            &task("environment_parameters:\n  limits:\n    memory: 64\nproblems:\n  solve:\n    type: code\n"),
            "solve",
            "",
        )
        .unwrap();
        assert_eq!(request.limits.time_secs, DEFAULT_TIME_LIMIT_SECS);
        assert_eq!(request.limits.memory_mb, 64);
    }

    #[test]
    fn request_errors() {
        let t = task(TASK);
        assert_eq!(
            RunRequest::for_problem(&t, "nope", "").unwrap_err(),
            RunRequestError::UnknownProblem("nope".into())
        );
        assert_eq!(
            RunRequest::for_problem(&t, "pick", "").unwrap_err(),
            RunRequestError::NotCodeProblem {
                problem_id: "pick".into(),
                kind: "multiple_choice".into(),
            }
        );

        let bad = task("environment_parameters:\n  limits:\n    time: ten\nproblems:\n  solve:\n    type: code\n");
        assert_eq!(
            RunRequest::for_problem(&bad, "solve", "").unwrap_err(),
            RunRequestError::InvalidLimit {
                field: "time",
                value: "ten".into(),
            }
        );
    }

    #[tokio::test]
    async fn runner_receives_built_request() {
        let runner = EchoRunner::default();
        let request = RunRequest::for_problem(&task(TASK), "solve", "print(1)").unwrap();

        let outcome = runner.run(&request).await.unwrap();
        assert!(outcome.succeeded());
        assert!(!outcome.timed_out());
        assert_eq!(outcome.output, "print(1)");
        assert_eq!(runner.seen.lock().unwrap()[0].problem_id, "solve");
    }

    #[tokio::test]
    async fn runner_behind_trait_object() {
        let runner: Box<dyn CodeRunner> = Box::new(EchoRunner::default());
        let mut request = RunRequest::for_problem(&task(TASK), "solve", "loop").unwrap();
        request.limits.time_secs = 0;

        let outcome = runner.run(&request).await.unwrap();
        assert!(outcome.timed_out());
        assert!(!outcome.succeeded());
    }

    #[test]
    fn outcome_json_shape() {
        let outcome = RunOutcome {
            output: "hi\n".into(),
            error: String::new(),
            exit_code: 0,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"output": "hi\n", "exitCode": 0}));
    }
}
