//! Quiz grading.
//!
//! Grades a submission against a task's multiple-choice and match problems.
//! Code problems are run by an external sandbox and are not graded here.
//! Grading never fails: missing, malformed, or out-of-range answers are simply
//! incorrect.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::problem::{MatchProblem, MultipleChoiceProblem, Problem};
use crate::task::TaskConfig;

/// A student's answers, keyed by problem id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub answers: HashMap<String, Answer>,
}

/// One answer. On the wire a JSON array is a selection and a string is free
/// text; anything else is kept so it can be graded as incorrect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Indices of the selected choices.
    Selection(Vec<i64>),
    Text(String),
    Other(serde_json::Value),
}

impl Submission {
    pub fn with_answer(mut self, problem_id: impl Into<String>, answer: Answer) -> Self {
        self.answers.insert(problem_id.into(), answer);
        self
    }
}

/// Outcome for one graded problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemOutcome {
    pub correct: bool,
}

/// The result of grading a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Percentage of gradable problems answered correctly, 0 to 100.
    pub score: f64,
    pub correct_count: usize,
    pub total_gradable: usize,
    /// Outcomes for gradable problems, in task order.
    pub per_problem: IndexMap<String, ProblemOutcome>,
}

impl GradingResult {
    pub fn is_correct(&self, problem_id: &str) -> Option<bool> {
        self.per_problem.get(problem_id).map(|o| o.correct)
    }
}

/// Grade `submission` against the problems of `task`.
pub fn grade(task: &TaskConfig, submission: &Submission) -> GradingResult {
    let mut per_problem = IndexMap::new();
    let mut correct_count = 0;

    for (problem_id, problem) in task.problems.iter() {
        let answer = submission.answers.get(problem_id);
        let correct = match problem {
            Problem::Code(_) => continue,
            Problem::MultipleChoice(p) => answer.is_some_and(|a| grade_multiple_choice(p, a)),
            Problem::Match(p) => answer.is_some_and(|a| grade_match(p, a)),
        };

        if correct {
            correct_count += 1;
        }
        per_problem.insert(problem_id.to_string(), ProblemOutcome { correct });
    }

    for problem_id in submission.answers.keys() {
        if task.problems.get(problem_id).is_none() {
            tracing::warn!("ignoring answer for unknown problem {problem_id}");
        }
    }

    let total_gradable = per_problem.len();
    let score = if total_gradable > 0 {
        correct_count as f64 / total_gradable as f64 * 100.0
    } else {
        0.0
    };

    GradingResult {
        score,
        correct_count,
        total_gradable,
        per_problem,
    }
}

/// Correct iff the selected indices, as a set, equal the valid indices.
fn grade_multiple_choice(problem: &MultipleChoiceProblem, answer: &Answer) -> bool {
    let Answer::Selection(selected) = answer else {
        return false;
    };
    if problem.choices.is_empty() {
        return false;
    }

    let choice_count = problem.choices.len() as i64;
    if selected.iter().any(|&i| i < 0 || i >= choice_count) {
        return false;
    }

    let selected: BTreeSet<usize> = selected.iter().map(|&i| i as usize).collect();
    let valid: BTreeSet<usize> = problem.valid_indices().collect();
    selected == valid
}

/// Case-insensitive comparison after trimming surrounding whitespace.
fn grade_match(problem: &MatchProblem, answer: &Answer) -> bool {
    let Answer::Text(text) = answer else {
        return false;
    };
    normalize(text) == normalize(&problem.expected_answer)
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
