//! Course reading material: book metadata and the outline table of contents.
//!
//! A syllabus directory holds an mdBook-style `book.toml` and a `SUMMARY.md`
//! outline. The outline is read line by line into a two-level tree: `# Title`
//! lines open a chapter, and `[Title](path.md)` links become entries under the
//! open chapter (or top-level entries before the first chapter).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub const BOOK_FILE: &str = "book.toml";
pub const SUMMARY_FILE: &str = "SUMMARY.md";

static CHAPTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+(.+)$").expect("chapter pattern is valid"));

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern is valid"));

const TOC_HEADING: &str = "# Table of Contents";

/// Title and author of the course book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
}

/// One entry of the outline.
///
/// Chapters have no path and level 0; links have a path and a level of at
/// least 1 derived from their indentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub title: String,
    pub path: Option<String>,
    pub level: usize,
    pub children: Vec<SummaryEntry>,
}

impl SummaryEntry {
    pub fn is_chapter(&self) -> bool {
        self.path.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Syllabus {
    pub book: BookInfo,
    pub summary: Vec<SummaryEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlBookFile {
    #[serde(default)]
    book: TomlBook,
}

#[derive(Debug, Default, Deserialize)]
struct TomlBook {
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
}

/// Parse a `book.toml` file.
pub fn parse_book(path: &Path) -> Result<BookInfo, ParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ParseError::new(path, "failed to read file").with_cause(e))?;

    parse_book_str(&content, path)
}

/// Parse `book.toml` content (useful for testing).
pub fn parse_book_str(content: &str, source_path: &Path) -> Result<BookInfo, ParseError> {
    let parsed: TomlBookFile = toml::from_str(content)
        .map_err(|e| ParseError::new(source_path, "failed to parse TOML").with_cause(e))?;

    let book = parsed.book;
    let author = book.author.unwrap_or_else(|| book.authors.join(", "));

    Ok(BookInfo {
        title: book.title,
        author,
    })
}

/// Parse a `SUMMARY.md` file.
pub fn parse_summary(path: &Path) -> Result<Vec<SummaryEntry>, ParseError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ParseError::new(path, "failed to read file").with_cause(e))?;

    Ok(parse_summary_str(&content))
}

/// Parse outline text into entries. Lines matching neither a chapter heading
/// nor a link are ignored.
pub fn parse_summary_str(content: &str) -> Vec<SummaryEntry> {
    let mut entries = Vec::new();
    let mut current_chapter: Option<SummaryEntry> = None;

    for line in content.lines() {
        if line.trim().is_empty() || line.starts_with(TOC_HEADING) {
            continue;
        }

        if let Some(caps) = CHAPTER_PATTERN.captures(line) {
            if let Some(chapter) = current_chapter.take() {
                entries.push(chapter);
            }
            current_chapter = Some(SummaryEntry {
                title: caps[1].to_string(),
                path: None,
                level: 0,
                children: Vec::new(),
            });
            continue;
        }

        if let Some(caps) = LINK_PATTERN.captures(line) {
            let entry = SummaryEntry {
                title: caps[1].to_string(),
                path: Some(caps[2].to_string()),
                level: leading_indent(line) / 2 + 1,
                children: Vec::new(),
            };

            match current_chapter.as_mut() {
                Some(chapter) => chapter.children.push(entry),
                None => entries.push(entry),
            }
        }
    }

    if let Some(chapter) = current_chapter {
        entries.push(chapter);
    }

    entries
}

/// Count leading indentation: a space is 1, a tab is 2. Counting stops at the
/// first other character, including a list marker.
fn leading_indent(line: &str) -> usize {
    let mut count = 0;
    for ch in line.chars() {
        match ch {
            ' ' => count += 1,
            '\t' => count += 2,
            _ => break,
        }
    }
    count
}

/// Parse both `book.toml` and `SUMMARY.md` from a syllabus directory.
pub fn parse_syllabus(dir: &Path) -> Result<Syllabus, ParseError> {
    let book = parse_book(&dir.join(BOOK_FILE))?;
    let summary = parse_summary(&dir.join(SUMMARY_FILE))?;

    tracing::debug!(
        "parsed syllabus \"{}\" with {} top-level entries from {}",
        book.title,
        summary.len(),
        dir.display()
    );

    Ok(Syllabus { book, summary })
}
