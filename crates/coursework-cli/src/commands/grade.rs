//! The `coursework grade` command.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use coursework_core::grading::{grade, Submission};
use coursework_core::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn execute(
    settings: &Settings,
    course_id: &str,
    task_id: &str,
    submission_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let content = std::fs::read_to_string(submission_path)
        .with_context(|| format!("failed to read submission: {}", submission_path.display()))?;
    let submission: Submission = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse submission: {}", submission_path.display()))?;

    let course = super::load_course_by_id(settings, course_id)?;
    let task = course
        .task(task_id)
        .ok_or_else(|| anyhow::anyhow!("task {task_id} not found in course {course_id}"))?;

    let result = grade(task, &submission);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            println!(
                "Score: {:.2}% ({}/{} correct)",
                result.score, result.correct_count, result.total_gradable
            );
            for (problem_id, outcome) in &result.per_problem {
                let mark = if outcome.correct { "correct" } else { "incorrect" };
                println!("  {problem_id}: {mark}");
            }
        }
    }

    Ok(())
}
