//! The `coursework list` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursework_core::loader::load_all_courses_parallel;
use coursework_core::settings::Settings;

pub async fn execute(settings: &Settings) -> Result<()> {
    let courses = load_all_courses_parallel(&settings.courses_dir, settings.parallelism).await?;

    if courses.is_empty() {
        println!(
            "No courses found under {}. Run `coursework init` to create a sample course.",
            settings.courses_dir.display()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Accessible", "Tasks", "Syllabus"]);

    for course in &courses {
        table.add_row(vec![
            Cell::new(&course.course_id),
            Cell::new(&course.config.name),
            Cell::new(if course.config.accessible { "yes" } else { "no" }),
            Cell::new(course.tasks.len()),
            Cell::new(
                course
                    .syllabus
                    .as_ref()
                    .map(|s| s.book.title.as_str())
                    .unwrap_or("-"),
            ),
        ]);
    }

    println!("{table}");
    Ok(())
}
