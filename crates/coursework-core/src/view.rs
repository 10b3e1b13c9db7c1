//! Serializable projections of loaded courses for untrusted callers.
//!
//! Views never carry grading keys: multiple-choice choices drop their `valid`
//! flag and match problems drop their expected answer.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::loader::ParsedCourse;
use crate::problem::{Problem, ProblemKind};
use crate::syllabus::{SummaryEntry, Syllabus};
use crate::task::{EnvironmentLimits, TaskConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    /// Short course code; the course id.
    pub code: String,
    pub name: String,
    pub accessible: bool,
    pub admins: Vec<String>,
    pub tutors: Vec<String>,
    pub task_count: usize,
}

impl CourseSummary {
    pub fn from_course(course: &ParsedCourse) -> Self {
        Self {
            id: course.course_id.clone(),
            code: course.course_id.clone(),
            name: course.config.name.clone(),
            accessible: course.config.accessible,
            admins: course.config.admins.clone(),
            tutors: course.config.tutors.clone(),
            task_count: course.tasks.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub name: String,
    pub header: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    pub author: String,
    pub environment_type: String,
    pub problems: Vec<ProblemSummary>,
}

impl TaskSummary {
    pub fn from_task(task_id: &str, task: &TaskConfig) -> Self {
        let problems = task
            .problems
            .iter()
            .map(|(id, problem)| ProblemSummary {
                id: id.to_string(),
                kind: problem.kind(),
                name: problem.name().to_string(),
                header: problem.header().to_string(),
            })
            .collect();

        Self {
            id: task_id.to_string(),
            name: task.name.clone(),
            author: task.author.clone(),
            environment_type: task.environment_type.clone(),
            problems,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntryView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SummaryEntryView>,
}

impl From<&SummaryEntry> for SummaryEntryView {
    fn from(entry: &SummaryEntry) -> Self {
        Self {
            title: entry.title.clone(),
            path: entry.path.clone(),
            children: entry.children.iter().map(Self::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusView {
    pub title: String,
    pub author: String,
    pub summary: Vec<SummaryEntryView>,
}

impl From<&Syllabus> for SyllabusView {
    fn from(syllabus: &Syllabus) -> Self {
        Self {
            title: syllabus.book.title.clone(),
            author: syllabus.book.author.clone(),
            summary: syllabus.summary.iter().map(SummaryEntryView::from).collect(),
        }
    }
}

/// A course with its task list and reading material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub summary: CourseSummary,
    /// Tasks in id order.
    pub tasks: Vec<TaskSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllabus: Option<SyllabusView>,
}

impl CourseDetail {
    pub fn from_course(course: &ParsedCourse) -> Self {
        Self {
            summary: CourseSummary::from_course(course),
            tasks: course
                .tasks
                .iter()
                .map(|(id, task)| TaskSummary::from_task(id, task))
                .collect(),
            syllabus: course.syllabus.as_ref().map(SyllabusView::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsView {
    pub time: String,
    pub hard_time: String,
    pub memory: String,
}

impl From<&EnvironmentLimits> for LimitsView {
    fn from(limits: &EnvironmentLimits) -> Self {
        Self {
            time: limits.time.clone(),
            hard_time: limits.hard_time.clone(),
            memory: limits.memory.clone(),
        }
    }
}

/// A multiple-choice option as shown to students.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    pub text: String,
}

/// One problem as shown to students.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProblemView {
    Code {
        id: String,
        name: String,
        header: String,
        language: String,
        default: String,
    },
    MultipleChoice {
        id: String,
        name: String,
        header: String,
        choices: Vec<ChoiceView>,
        limit: i64,
    },
    Match {
        id: String,
        name: String,
        header: String,
    },
}

impl ProblemView {
    pub fn from_problem(problem_id: &str, problem: &Problem) -> Self {
        let id = problem_id.to_string();
        match problem {
            Problem::Code(p) => ProblemView::Code {
                id,
                name: p.name.clone(),
                header: p.header.clone(),
                language: p.language.clone(),
                default: p.default_source.clone(),
            },
            Problem::MultipleChoice(p) => ProblemView::MultipleChoice {
                id,
                name: p.name.clone(),
                header: p.header.clone(),
                choices: p
                    .choices
                    .iter()
                    .map(|c| ChoiceView {
                        text: c.text.clone(),
                    })
                    .collect(),
                limit: p.selection_limit,
            },
            Problem::Match(p) => ProblemView::Match {
                id,
                name: p.name.clone(),
                header: p.header.clone(),
            },
        }
    }
}

/// Full task content for students, with grading keys removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub author: String,
    pub contact_url: String,
    pub context: String,
    pub environment_id: String,
    pub environment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsView>,
    pub network_grading: bool,
    /// Whether the task is open at the instant the view was built.
    pub accessible: bool,
    pub problems: Vec<ProblemView>,
}

impl TaskDetail {
    /// Build the view of `task_id`, evaluating its access rule at `now`.
    /// Returns `None` when the course has no such task.
    pub fn build(course: &ParsedCourse, task_id: &str, now: NaiveDateTime) -> Option<Self> {
        let task = course.task(task_id)?;

        Some(Self {
            id: task_id.to_string(),
            course_id: course.course_id.clone(),
            name: task.name.clone(),
            author: task.author.clone(),
            contact_url: task.contact_url.clone(),
            context: task.context.clone(),
            environment_id: task.environment_id.clone(),
            environment_type: task.environment_type.clone(),
            limits: task
                .environment_parameters
                .limits
                .as_ref()
                .map(LimitsView::from),
            network_grading: task.network_grading,
            accessible: course.access.is_task_accessible_at(task_id, now),
            problems: task
                .problems
                .iter()
                .map(|(id, p)| ProblemView::from_problem(id, p))
                .collect(),
        })
    }
}
