//! Course tree loader.
//!
//! Reads a course directory into a [`ParsedCourse`]:
//!
//! ```text
//! <course>/config.yaml
//! <course>/access.yaml
//! <course>/tasks/<task>/task.yaml
//! <course>/syllabus/book.toml      (optional directory)
//! <course>/syllabus/SUMMARY.md
//! ```
//!
//! Every load is a fresh read of the filesystem; nothing is cached.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::access::{parse_access_config, AccessConfig};
use crate::config::{parse_course_config, CourseConfig};
use crate::error::{CatalogError, CourseLoadError, LoadStage, ParseError};
use crate::syllabus::{parse_syllabus, Syllabus};
use crate::task::{parse_task_config, TaskConfig};

pub const CONFIG_FILE: &str = "config.yaml";
pub const ACCESS_FILE: &str = "access.yaml";
pub const TASKS_DIR: &str = "tasks";
pub const TASK_FILE: &str = "task.yaml";
pub const SYLLABUS_DIR: &str = "syllabus";

/// A fully loaded course.
///
/// Holds answer keys; serialize a [`crate::view`] projection instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCourse {
    /// The directory name of the course.
    pub course_id: String,
    pub dir_path: PathBuf,
    pub config: CourseConfig,
    pub access: AccessConfig,
    /// Tasks keyed by their directory name.
    pub tasks: BTreeMap<String, TaskConfig>,
    pub syllabus: Option<Syllabus>,
}

impl ParsedCourse {
    pub fn task(&self, task_id: &str) -> Option<&TaskConfig> {
        self.tasks.get(task_id)
    }

    /// Total number of problems across all tasks.
    pub fn problem_count(&self) -> usize {
        self.tasks.values().map(|t| t.problems.len()).sum()
    }
}

/// The id of the course stored at `dir`: its final path segment.
pub fn course_id_for(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Whether `dir` looks like a course directory (has a `config.yaml`).
pub fn is_course_dir(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file()
}

/// Load one course from its directory.
pub fn load_course(dir: &Path) -> Result<ParsedCourse, CourseLoadError> {
    let course_id = course_id_for(dir);
    let wrap = |stage: LoadStage| {
        let course_id = course_id.clone();
        move |cause: ParseError| CourseLoadError {
            course_id,
            stage,
            cause,
        }
    };

    let config = parse_course_config(&dir.join(CONFIG_FILE)).map_err(wrap(LoadStage::Config))?;
    let access = parse_access_config(&dir.join(ACCESS_FILE)).map_err(wrap(LoadStage::Access))?;
    let tasks = load_tasks(&dir.join(TASKS_DIR)).map_err(wrap(LoadStage::Tasks))?;

    let syllabus_dir = dir.join(SYLLABUS_DIR);
    let syllabus = if syllabus_dir.is_dir() {
        Some(parse_syllabus(&syllabus_dir).map_err(wrap(LoadStage::Syllabus))?)
    } else {
        None
    };

    tracing::info!(
        "loaded course {course_id}: {} tasks, syllabus {}",
        tasks.len(),
        if syllabus.is_some() { "present" } else { "absent" }
    );

    Ok(ParsedCourse {
        course_id,
        dir_path: dir.to_path_buf(),
        config,
        access,
        tasks,
        syllabus,
    })
}

/// Load every `<task>/task.yaml` under `tasks_dir`. Subdirectories without a
/// task file are skipped; a `task.yaml` that exists but cannot be read fails.
fn load_tasks(tasks_dir: &Path) -> Result<BTreeMap<String, TaskConfig>, ParseError> {
    let mut tasks = BTreeMap::new();

    for task_dir in subdirectories(tasks_dir)? {
        let task_path = task_dir.join(TASK_FILE);
        if matches!(task_path.try_exists(), Ok(false)) {
            tracing::debug!("skipping {}: no {TASK_FILE}", task_dir.display());
            continue;
        }

        let task = parse_task_config(&task_path)?;
        tasks.insert(course_id_for(&task_dir), task);
    }

    Ok(tasks)
}

/// Immediate subdirectories of `dir`, sorted by name.
fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let read_err = |e: std::io::Error| ParseError::new(dir, "failed to read directory").with_cause(e);

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Course directories under `root`, sorted by name. Subdirectories without a
/// `config.yaml` are not courses and are skipped.
pub fn discover_courses(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let dirs = subdirectories(root).map_err(CatalogError::Root)?;
    Ok(dirs
        .into_iter()
        .filter(|dir| {
            let keep = is_course_dir(dir);
            if !keep {
                tracing::debug!("skipping {}: no {CONFIG_FILE}", dir.display());
            }
            keep
        })
        .collect())
}

/// Load every course under `root`, in directory-name order.
///
/// Fail-fast: the first course that fails to load aborts the batch and no
/// partial list is returned.
pub fn load_all_courses(root: &Path) -> Result<Vec<ParsedCourse>, CatalogError> {
    let courses = discover_courses(root)?
        .iter()
        .map(|dir| load_course(dir))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("loaded {} courses from {}", courses.len(), root.display());
    Ok(courses)
}

/// Load every course under `root` on blocking worker threads, at most
/// `parallelism` at a time.
///
/// Same result order and fail-fast policy as [`load_all_courses`]: the first
/// failure to arrive is returned and outstanding results are discarded.
pub async fn load_all_courses_parallel(
    root: &Path,
    parallelism: usize,
) -> Result<Vec<ParsedCourse>, CatalogError> {
    let dirs = discover_courses(root)?;
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));

    let mut futures = FuturesUnordered::new();
    for (index, dir) in dirs.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        futures.push(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| CatalogError::Worker("semaphore closed".into()))?;
            let course = tokio::task::spawn_blocking(move || load_course(&dir))
                .await
                .map_err(|e| CatalogError::Worker(e.to_string()))??;
            Ok::<_, CatalogError>((index, course))
        });
    }

    let mut loaded = Vec::with_capacity(futures.len());
    while let Some(result) = futures.next().await {
        loaded.push(result?);
    }
    loaded.sort_by_key(|(index, _)| *index);

    tracing::info!("loaded {} courses from {}", loaded.len(), root.display());
    Ok(loaded.into_iter().map(|(_, course)| course).collect())
}
