//! Runtime settings (`coursework.toml`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "coursework.toml";

/// Environment variable overriding [`Settings::courses_dir`].
pub const COURSES_DIR_ENV: &str = "COURSEWORK_COURSES_DIR";

/// Top-level coursework settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root directory holding one subdirectory per course.
    #[serde(default = "default_courses_dir")]
    pub courses_dir: PathBuf,
    /// Max courses loaded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_courses_dir() -> PathBuf {
    PathBuf::from("courses")
}
fn default_parallelism() -> usize {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            courses_dir: default_courses_dir(),
            parallelism: default_parallelism(),
        }
    }
}

impl Settings {
    /// Starter file contents written by `coursework init`.
    pub fn template() -> String {
        format!(
            "# Root directory holding one subdirectory per course.\ncourses_dir = \"{}\"\n\n# Max courses loaded concurrently.\nparallelism = {}\n",
            default_courses_dir().display(),
            default_parallelism()
        )
    }
}

/// Load settings from `./coursework.toml`, or defaults when it is absent.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(None)
}

/// Load settings from an explicit path, or search the default location.
///
/// `COURSEWORK_COURSES_DIR` overrides the courses directory either way.
pub fn load_settings_from(path: Option<&Path>) -> Result<Settings> {
    let settings_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("settings file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(SETTINGS_FILE);
        local.exists().then_some(local)
    };

    let mut settings = match settings_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            parse_settings_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

/// Parse settings TOML (useful for testing).
pub fn parse_settings_str(content: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(content)?;
    if settings.parallelism == 0 {
        anyhow::bail!("parallelism must be at least 1");
    }
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup(COURSES_DIR_ENV).filter(|d| !d.is_empty()) {
        tracing::debug!("courses_dir overridden by {COURSES_DIR_ENV}: {dir}");
        settings.courses_dir = PathBuf::from(dir);
    }
}
