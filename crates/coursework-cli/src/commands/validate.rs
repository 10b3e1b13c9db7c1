//! The `coursework validate` command.

use std::path::PathBuf;

use anyhow::Result;

use coursework_core::loader::{is_course_dir, load_all_courses_parallel, load_course};
use coursework_core::settings::Settings;

pub async fn execute(settings: &Settings, path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| settings.courses_dir.clone());

    let courses = if is_course_dir(&path) {
        vec![load_course(&path)?]
    } else {
        load_all_courses_parallel(&path, settings.parallelism).await?
    };

    for course in &courses {
        println!(
            "Course: {} [{}] ({} tasks, {} problems)",
            course.config.name,
            course.course_id,
            course.tasks.len(),
            course.problem_count()
        );
    }

    if courses.is_empty() {
        println!("No courses found under {}.", path.display());
    } else {
        println!("All courses valid.");
    }

    Ok(())
}
