//! The `coursework show` command.

use anyhow::Result;
use chrono::Utc;

use coursework_core::settings::Settings;
use coursework_core::view::{CourseDetail, TaskDetail};

pub fn execute(settings: &Settings, course_id: &str, task_id: Option<&str>) -> Result<()> {
    let course = super::load_course_by_id(settings, course_id)?;

    let json = match task_id {
        Some(task_id) => {
            let detail = TaskDetail::build(&course, task_id, Utc::now().naive_utc())
                .ok_or_else(|| anyhow::anyhow!("task {task_id} not found in course {course_id}"))?;
            serde_json::to_string_pretty(&detail)?
        }
        None => serde_json::to_string_pretty(&CourseDetail::from_course(&course))?,
    };

    println!("{json}");
    Ok(())
}
