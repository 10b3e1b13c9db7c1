//! Course-level configuration (`config.yaml`).

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::ParseError;

/// Self-registration settings for a course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSettings {
    pub enabled: bool,
    pub password: Option<String>,
    /// Access-control mode applied to registrations.
    pub access_control: Option<String>,
    pub ac_accept: bool,
    pub ac_list: Vec<String>,
}

/// A parsed `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseConfig {
    pub name: String,
    pub accessible: bool,
    pub admins: Vec<String>,
    pub tutors: Vec<String>,
    pub groups_student_choice: bool,
    pub allow_unregister: bool,
    pub allow_preview: bool,
    pub registration: RegistrationSettings,
    /// Free-form tags, in document order.
    pub tags: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlCourseConfig {
    accessible: bool,
    name: String,
    admins: Option<Vec<String>>,
    tutors: Option<Vec<String>>,
    groups_student_choice: bool,
    allow_unregister: bool,
    allow_preview: bool,
    registration: bool,
    registration_password: Option<String>,
    registration_ac: Option<String>,
    registration_ac_accept: bool,
    registration_ac_list: Option<Vec<String>>,
    tags: Option<IndexMap<String, Value>>,
}

/// Parse a `config.yaml` file.
pub fn parse_course_config(path: &Path) -> Result<CourseConfig, ParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ParseError::new(path, "failed to read file").with_cause(e))?;

    parse_course_config_str(&content, path)
}

/// Parse `config.yaml` content (useful for testing).
pub fn parse_course_config_str(content: &str, source_path: &Path) -> Result<CourseConfig, ParseError> {
    let parsed: YamlCourseConfig = if content.trim().is_empty() {
        YamlCourseConfig::default()
    } else {
        serde_yaml::from_str(content)
            .map_err(|e| ParseError::new(source_path, "failed to parse YAML").with_cause(e))?
    };

    Ok(CourseConfig {
        name: parsed.name,
        accessible: parsed.accessible,
        admins: parsed.admins.unwrap_or_default(),
        tutors: parsed.tutors.unwrap_or_default(),
        groups_student_choice: parsed.groups_student_choice,
        allow_unregister: parsed.allow_unregister,
        allow_preview: parsed.allow_preview,
        registration: RegistrationSettings {
            enabled: parsed.registration,
            password: parsed.registration_password,
            access_control: parsed.registration_ac,
            ac_accept: parsed.registration_ac_accept,
            ac_list: parsed.registration_ac_list.unwrap_or_default(),
        },
        tags: parsed.tags.unwrap_or_default(),
    })
}
