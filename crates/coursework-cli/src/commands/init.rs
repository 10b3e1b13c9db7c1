//! The `coursework init` command.

use std::path::Path;

use anyhow::{Context, Result};

use coursework_core::settings::{Settings, SETTINGS_FILE};

const SAMPLE_FILES: &[(&str, &str)] = &[
    ("courses/sample/config.yaml", SAMPLE_CONFIG),
    ("courses/sample/access.yaml", SAMPLE_ACCESS),
    ("courses/sample/tasks/quiz/task.yaml", SAMPLE_TASK),
];

pub fn execute() -> Result<()> {
    write_if_missing(Path::new(SETTINGS_FILE), &Settings::template())?;

    for (path, content) in SAMPLE_FILES {
        write_if_missing(Path::new(path), content)?;
    }

    println!("\nNext steps:");
    println!("  1. Edit courses/sample to describe your course");
    println!("  2. Run: coursework validate");
    println!("  3. Run: coursework show --course sample --task quiz");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"accessible: true
name: "[SAMPLE] Sample course"
admins:
  - admin
tutors: []
"#;

const SAMPLE_ACCESS: &str = r#"dispenser_data:
  config:
    quiz:
      accessibility: true
      evaluation_mode: best
  imported: false
  converted: false
"#;

const SAMPLE_TASK: &str = r#"name: "Warm-up quiz"
author: "Course team"
context: "A first quiz to check the setup."
environment_id: "mcq"
environment_type: "mcq"
network_grading: false
problems:
  colours:
    type: "multiple_choice"
    name: "Primary colours"
    header: "Select every additive primary colour."
    choices:
      - text: "Red"
        valid: true
      - text: "Yellow"
        valid: false
      - text: "Green"
        valid: true
      - text: "Blue"
        valid: true
  capital:
    type: "match"
    name: "Capital"
    header: "What is the capital of France?"
    answer: "Paris"
"#;
