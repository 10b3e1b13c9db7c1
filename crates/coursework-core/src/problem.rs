//! Problem variants and the order-preserving problem list.
//!
//! A task's `problems` mapping holds heterogeneous records keyed by problem id.
//! Each record carries a `type` discriminator that selects one of a closed set
//! of variants. Author order is significant and is kept exactly as written.

use std::fmt;
use std::str::FromStr;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::ProblemError;

/// The discriminator values accepted in a problem's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    Code,
    MultipleChoice,
    Match,
}

impl ProblemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::Code => "code",
            ProblemKind::MultipleChoice => "multiple_choice",
            ProblemKind::Match => "match",
        }
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(ProblemKind::Code),
            "multiple_choice" => Ok(ProblemKind::MultipleChoice),
            "match" => Ok(ProblemKind::Match),
            other => Err(format!("unknown problem type: {other}")),
        }
    }
}

/// A coding exercise, run by an external sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeProblem {
    pub name: String,
    pub header: String,
    pub language: String,
    /// Starter code shown to the student.
    #[serde(rename = "default")]
    pub default_source: String,
}

/// One option of a multiple-choice problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Choice {
    pub text: String,
    #[serde(rename = "valid")]
    pub is_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MultipleChoiceProblem {
    pub name: String,
    pub header: String,
    pub choices: Vec<Choice>,
    /// Maximum number of selections the UI allows; `0` means unbounded.
    #[serde(rename = "limit")]
    pub selection_limit: i64,
}

impl MultipleChoiceProblem {
    /// Indices of the choices flagged valid, ascending.
    pub fn valid_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_valid)
            .map(|(i, _)| i)
    }
}

/// A free-text answer compared against an expected string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchProblem {
    pub name: String,
    pub header: String,
    #[serde(rename = "answer")]
    pub expected_answer: String,
}

/// One problem of a task.
///
/// Carries the grading key, so it is not serializable; student-facing output
/// goes through [`crate::view::ProblemView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Code(CodeProblem),
    MultipleChoice(MultipleChoiceProblem),
    Match(MatchProblem),
}

impl Problem {
    pub fn kind(&self) -> ProblemKind {
        match self {
            Problem::Code(_) => ProblemKind::Code,
            Problem::MultipleChoice(_) => ProblemKind::MultipleChoice,
            Problem::Match(_) => ProblemKind::Match,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Problem::Code(p) => &p.name,
            Problem::MultipleChoice(p) => &p.name,
            Problem::Match(p) => &p.name,
        }
    }

    pub fn header(&self) -> &str {
        match self {
            Problem::Code(p) => &p.header,
            Problem::MultipleChoice(p) => &p.header,
            Problem::Match(p) => &p.header,
        }
    }

    /// Decode one raw record, dispatching on its `type` field.
    pub fn decode(problem_id: &str, record: Value) -> Result<Self, ProblemError> {
        let kind = read_kind(problem_id, &record)?;

        let invalid = |source| ProblemError::Invalid {
            problem_id: problem_id.to_string(),
            kind: kind.to_string(),
            source,
        };

        let problem = match kind {
            ProblemKind::Code => Problem::Code(serde_yaml::from_value(record).map_err(invalid)?),
            ProblemKind::MultipleChoice => {
                Problem::MultipleChoice(serde_yaml::from_value(record).map_err(invalid)?)
            }
            ProblemKind::Match => Problem::Match(serde_yaml::from_value(record).map_err(invalid)?),
        };

        Ok(problem)
    }
}

/// Read the `type` discriminator without decoding the rest of the record.
fn read_kind(problem_id: &str, record: &Value) -> Result<ProblemKind, ProblemError> {
    let missing = |message: &str| ProblemError::MissingType {
        problem_id: problem_id.to_string(),
        message: message.to_string(),
    };

    let Value::Mapping(fields) = record else {
        return Err(missing("problem record is not a mapping"));
    };

    match fields.get("type") {
        None | Some(Value::Null) => Err(missing("missing `type` field")),
        Some(Value::String(kind)) => kind.parse().map_err(|_| ProblemError::UnknownType {
            problem_id: problem_id.to_string(),
            kind: kind.clone(),
        }),
        Some(_) => Err(missing("`type` must be a string")),
    }
}

/// The problems of a task, in author order, with lookup by id.
///
/// Each problem is stored once; iteration and [`ProblemList::get`] return
/// references to the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemList {
    entries: IndexMap<String, Problem>,
}

impl ProblemList {
    /// Decode `(id, record)` pairs in the order given.
    ///
    /// Fails as a whole on the first bad record or repeated id.
    pub fn decode<I>(raw: I) -> Result<Self, ProblemError>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut entries = IndexMap::new();

        for (problem_id, record) in raw {
            let problem = Problem::decode(&problem_id, record)?;
            match entries.entry(problem_id) {
                Entry::Occupied(e) => {
                    return Err(ProblemError::DuplicateId {
                        problem_id: e.key().clone(),
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(problem);
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, problem_id: &str) -> Option<&Problem> {
        self.entries.get(problem_id)
    }

    /// Position of `problem_id` in author order.
    pub fn position(&self, problem_id: &str) -> Option<usize> {
        self.entries.get_index_of(problem_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Problem)> {
        self.entries.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The raw `problems` node of a task document: every `(id, record)` pair in
/// source order, duplicates included.
///
/// Decoding into a map type would either drop key order or reject duplicate
/// keys with an untyped error, so pairs are collected as-is and checked by
/// [`ProblemList::decode`]. Ids keep the key's source text (`01`, `1.50`);
/// non-scalar keys fail to decode.
#[derive(Debug, Default)]
pub struct RawProblems(pub Vec<(String, Value)>);

impl RawProblems {
    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.0
    }
}

impl<'de> Deserialize<'de> for RawProblems {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = RawProblems;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of problem id to problem")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(RawProblems::default())
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    pairs.push((key, value));
                }
                Ok(RawProblems(pairs))
            }
        }

        deserializer.deserialize_any(PairsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(yaml: &str) -> Vec<(String, Value)> {
        let raw: RawProblems = serde_yaml::from_str(yaml).unwrap();
        raw.into_pairs()
    }

    const MIXED: &str = r#"
zeta:
  type: match
  name: Complexity
  header: Lookup cost in a hash map?
  answer: O(1)
alpha:
  type: multiple_choice
  name: Types
  header: Pick the valid ones
  limit: 2
  choices:
    - text: A
      valid: false
    - text: B
      valid: true
mid:
  type: code
  name: Hello
  header: Print hello
  language: python
  default: |
    print("hello")
"#;

    #[test]
    fn decodes_each_variant_in_source_order() {
        let list = ProblemList::decode(raw(MIXED)).unwrap();
        let ids: Vec<&str> = list.ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);

        match list.get("zeta").unwrap() {
            Problem::Match(p) => assert_eq!(p.expected_answer, "O(1)"),
            other => panic!("expected match problem, got {other:?}"),
        }
        match list.get("alpha").unwrap() {
            Problem::MultipleChoice(p) => {
                assert_eq!(p.choices.len(), 2);
                assert_eq!(p.selection_limit, 2);
                assert_eq!(p.valid_indices().collect::<Vec<_>>(), vec![1]);
            }
            other => panic!("expected multiple choice problem, got {other:?}"),
        }
        match list.get("mid").unwrap() {
            Problem::Code(p) => {
                assert_eq!(p.language, "python");
                assert_eq!(p.default_source, "print(\"hello\")\n");
            }
            other => panic!("expected code problem, got {other:?}"),
        }
    }

    #[test]
    fn lookup_and_iteration_share_the_same_value() {
        let list = ProblemList::decode(raw(MIXED)).unwrap();
        for (id, problem) in list.iter() {
            assert!(std::ptr::eq(problem, list.get(id).unwrap()));
        }
        assert_eq!(list.position("mid"), Some(2));
    }

    #[test]
    fn shared_fields_are_exposed_on_every_variant() {
        let list = ProblemList::decode(raw(MIXED)).unwrap();
        let alpha = list.get("alpha").unwrap();
        assert_eq!(alpha.kind(), ProblemKind::MultipleChoice);
        assert_eq!(alpha.name(), "Types");
        assert_eq!(alpha.header(), "Pick the valid ones");
    }

    #[test]
    fn unknown_type_names_id_and_value() {
        let yaml = r#"
q1:
  type: match
  answer: x
q2:
  type: essay
  name: Free writing
"#;
        let err = ProblemList::decode(raw(yaml)).unwrap_err();
        match err {
            ProblemError::UnknownType { problem_id, kind } => {
                assert_eq!(problem_id, "q2");
                assert_eq!(kind, "essay");
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_non_string_type_fails() {
        let err = ProblemList::decode(raw("q1:\n  name: untyped\n")).unwrap_err();
        assert!(matches!(err, ProblemError::MissingType { ref problem_id, .. } if problem_id == "q1"));

        let err = ProblemList::decode(raw("q1:\n  type: [code]\n")).unwrap_err();
        assert!(matches!(err, ProblemError::MissingType { .. }));

        let err = ProblemList::decode(raw("q1: just a string\n")).unwrap_err();
        assert!(matches!(err, ProblemError::MissingType { .. }));
    }

    #[test]
    fn bad_variant_field_fails_whole_list() {
        let yaml = r#"
q1:
  type: match
  answer: fine
q2:
  type: multiple_choice
  choices: "not a list"
"#;
        let err = ProblemList::decode(raw(yaml)).unwrap_err();
        match err {
            ProblemError::Invalid { problem_id, kind, .. } => {
                assert_eq!(problem_id, "q2");
                assert_eq!(kind, "multiple_choice");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let pairs: Vec<(String, Value)> = vec![
            ("q1".to_string(), serde_yaml::from_str("{type: match, answer: a}").unwrap()),
            ("q2".to_string(), serde_yaml::from_str("{type: match, answer: b}").unwrap()),
            ("q1".to_string(), serde_yaml::from_str("{type: match, answer: c}").unwrap()),
        ];
        let err = ProblemList::decode(pairs).unwrap_err();
        assert!(matches!(err, ProblemError::DuplicateId { ref problem_id } if problem_id == "q1"));
    }

    #[test]
    fn raw_problems_keep_duplicate_yaml_keys() {
        let yaml = "q1:\n  type: match\nq1:\n  type: code\n";
        let raw: RawProblems = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(raw.0.len(), 2);
        let err = ProblemList::decode(raw.into_pairs()).unwrap_err();
        assert!(matches!(err, ProblemError::DuplicateId { .. }));
    }

    #[test]
    fn ids_keep_their_source_text() {
        let yaml = "01:\n  type: match\n1.50:\n  type: match\n0x10:\n  type: code\n1e3:\n  type: match\n";
        let list = ProblemList::decode(raw(yaml)).unwrap();
        assert_eq!(list.ids().collect::<Vec<_>>(), vec!["01", "1.50", "0x10", "1e3"]);
    }

    #[test]
    fn equal_numbers_with_different_text_are_distinct_ids() {
        let list = ProblemList::decode(raw("1.0:\n  type: match\n1.00:\n  type: match\n")).unwrap();
        assert_eq!(list.ids().collect::<Vec<_>>(), vec!["1.0", "1.00"]);
    }

    #[test]
    fn non_scalar_key_fails_to_decode() {
        let yaml = "? [a, b]\n: {type: match}\n";
        assert!(serde_yaml::from_str::<RawProblems>(yaml).is_err());
    }

    #[test]
    fn missing_variant_fields_default() {
        let list = ProblemList::decode(raw("q:\n  type: multiple_choice\n")).unwrap();
        match list.get("q").unwrap() {
            Problem::MultipleChoice(p) => {
                assert!(p.choices.is_empty());
                assert_eq!(p.selection_limit, 0);
                assert_eq!(p.name, "");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn kind_display_and_parse() {
        assert_eq!(ProblemKind::MultipleChoice.to_string(), "multiple_choice");
        assert_eq!("match".parse::<ProblemKind>().unwrap(), ProblemKind::Match);
        assert!("essay".parse::<ProblemKind>().is_err());
        assert!("Code".parse::<ProblemKind>().is_err());
    }
}
