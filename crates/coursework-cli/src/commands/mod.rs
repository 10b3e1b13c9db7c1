//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use coursework_core::loader::{is_course_dir, load_course, ParsedCourse};
use coursework_core::settings::{load_settings_from, Settings};

pub mod grade;
pub mod init;
pub mod list;
pub mod show;
pub mod validate;

/// Load settings, then apply the `--courses-dir` override.
pub fn resolve_settings(config: Option<&Path>, courses_dir: Option<PathBuf>) -> Result<Settings> {
    let mut settings = load_settings_from(config)?;
    if let Some(dir) = courses_dir {
        settings.courses_dir = dir;
    }
    Ok(settings)
}

/// Load the course with id `course_id` from the configured courses root.
pub fn load_course_by_id(settings: &Settings, course_id: &str) -> Result<ParsedCourse> {
    if course_id.is_empty() || course_id.contains(['/', '\\']) || matches!(course_id, "." | "..") {
        anyhow::bail!("invalid course id: {course_id:?}");
    }

    let dir = settings.courses_dir.join(course_id);
    if !is_course_dir(&dir) {
        anyhow::bail!("course not found: {course_id}");
    }

    load_course(&dir).with_context(|| format!("failed to load course {course_id}"))
}
