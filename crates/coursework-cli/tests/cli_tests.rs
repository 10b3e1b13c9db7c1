//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const COURSES: &str = "../../courses";

fn coursework() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("coursework").unwrap();
    cmd.env_remove("COURSEWORK_COURSES_DIR");
    cmd
}

#[test]
fn validate_courses_root() {
    coursework()
        .arg("validate")
        .arg("--path")
        .arg(COURSES)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Course: [CS01] Introduction to Computer Science [CS01] (3 tasks, 8 problems)",
        ))
        .stdout(predicate::str::contains("All courses valid."))
        .stdout(predicate::str::contains("drafts").not());
}

#[test]
fn validate_single_course() {
    coursework()
        .arg("validate")
        .arg("--path")
        .arg("../../courses/CS01")
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 tasks, 8 problems)"));
}

#[test]
fn validate_uses_courses_dir_option() {
    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All courses valid."));
}

#[test]
fn validate_nonexistent_root() {
    coursework()
        .arg("validate")
        .arg("--path")
        .arg("no_such_dir")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("failed to read directory"));
}

#[test]
fn validate_reports_broken_task() {
    let dir = TempDir::new().unwrap();
    let course = dir.path().join("BROKEN");
    std::fs::create_dir_all(course.join("tasks/t1")).unwrap();
    std::fs::write(course.join("config.yaml"), "name: Broken\n").unwrap();
    std::fs::write(course.join("access.yaml"), "").unwrap();
    std::fs::write(
        course.join("tasks/t1/task.yaml"),
        "name: Bad\nproblems:\n  essay1:\n    type: essay\n",
    )
    .unwrap();

    coursework()
        .arg("validate")
        .arg("--path")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("course BROKEN: failed to load tasks"))
        .stderr(predicate::str::contains("unknown type \"essay\""));
}

#[test]
fn list_courses() {
    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("CS01"))
        .stdout(predicate::str::contains("Introduction à la programmation"));
}

#[test]
fn show_course() {
    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("show")
        .arg("--course")
        .arg("CS01")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"taskCount\": 3"))
        .stdout(predicate::str::contains("\"code\": \"CS01\""));
}

#[test]
fn show_task_hides_answers() {
    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("show")
        .arg("--course")
        .arg("CS01")
        .arg("--task")
        .arg("task05")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"courseId\": \"CS01\""))
        .stdout(predicate::str::contains("frozenset"))
        .stdout(predicate::str::contains("\"valid\"").not())
        .stdout(predicate::str::contains("O(1)").not());
}

#[test]
fn show_unknown_course_or_task() {
    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("show")
        .arg("--course")
        .arg("CS99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("course not found: CS99"));

    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("show")
        .arg("--course")
        .arg("../courses")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid course id"));

    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("show")
        .arg("--course")
        .arg("CS01")
        .arg("--task")
        .arg("task99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("task task99 not found"));
}

#[test]
fn grade_text_output() {
    let dir = TempDir::new().unwrap();
    let submission = dir.path().join("submission.json");
    std::fs::write(
        &submission,
        r#"{"answers": {"Q1": [0, 2, 4], "Q2": [1], "Q4": "  o(1) "}}"#,
    )
    .unwrap();

    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("grade")
        .arg("--course")
        .arg("CS01")
        .arg("--task")
        .arg("task05")
        .arg("--submission")
        .arg(&submission)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 66.67% (2/3 correct)"))
        .stdout(predicate::str::contains("Q1: correct"))
        .stdout(predicate::str::contains("Q2: incorrect"))
        .stdout(predicate::str::contains("Q10").not());
}

#[test]
fn grade_json_output() {
    let dir = TempDir::new().unwrap();
    let submission = dir.path().join("submission.json");
    std::fs::write(&submission, r#"{"answers": {"Q2": [3, 1], "Q4": 1}}"#).unwrap();

    let output = coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("grade")
        .arg("--course")
        .arg("CS01")
        .arg("--task")
        .arg("task05")
        .arg("--submission")
        .arg(&submission)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["total_gradable"], 3);
    assert_eq!(result["correct_count"], 1);
    assert_eq!(result["per_problem"]["Q2"]["correct"], true);
    assert_eq!(result["per_problem"]["Q4"]["correct"], false);
}

#[test]
fn grade_malformed_submission() {
    let dir = TempDir::new().unwrap();
    let submission = dir.path().join("submission.json");
    std::fs::write(&submission, "not json").unwrap();

    coursework()
        .arg("--courses-dir")
        .arg(COURSES)
        .arg("grade")
        .arg("--course")
        .arg("CS01")
        .arg("--task")
        .arg("task05")
        .arg("--submission")
        .arg(&submission)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse submission"));
}

#[test]
fn missing_config_file() {
    coursework()
        .arg("--config")
        .arg("no_such_settings.toml")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("settings file not found"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    coursework()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created coursework.toml"))
        .stdout(predicate::str::contains("Created courses/sample/config.yaml"));

    assert!(dir.path().join("coursework.toml").exists());
    assert!(dir.path().join("courses/sample/tasks/quiz/task.yaml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    coursework().current_dir(dir.path()).arg("init").assert().success();

    coursework()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    coursework()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Course content loader and quiz grader"));
}

#[test]
fn version_output() {
    coursework()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("coursework"));
}
