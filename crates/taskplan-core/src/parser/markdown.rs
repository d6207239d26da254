//! Markdown task plan parser
//!
//! Uses pulldown-cmark to locate headings (so headings inside code fences
//! are ignored), then hands each task body to [`fields`](super::fields).

use super::fields::parse_task_body;
use crate::error::ParseError;
use crate::types::{TaskId, TaskPlan};
use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser as MdParser, Tag, TagEnd};
use regex::Regex;
use std::collections::BTreeMap;

/// Heading level that opens a task
const TASK_HEADING_LEVEL: u8 = 3;

static TASK_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^task\s+(\d+)\s*:\s*(.*)$").expect("task heading pattern is valid")
});

static TASK_LIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^task\s+\d+\b").expect("task-like pattern is valid"));

/// Heading found in the document
#[derive(Debug, Clone)]
struct Heading {
    /// Heading level (1-6)
    level: u8,
    /// Plain text content
    text: String,
    /// Byte offset of the heading start
    start: usize,
}

/// Markdown task plan parser
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownPlanParser;

impl MarkdownPlanParser {
    /// Create new markdown plan parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a task plan document
    pub fn parse(&self, content: &str) -> Result<TaskPlan, ParseError> {
        let headings = Self::collect_headings(content);

        let title = headings
            .iter()
            .find(|h| h.level == 1)
            .map(|h| Self::plan_title(&h.text));

        let mut tasks = Vec::new();
        let mut first_seen: BTreeMap<TaskId, usize> = BTreeMap::new();

        for (index, heading) in headings.iter().enumerate() {
            if heading.level != TASK_HEADING_LEVEL {
                continue;
            }
            let text = heading.text.trim();
            let line = line_of(content, heading.start);

            let Some(caps) = TASK_HEADING_RE.captures(text) else {
                if TASK_LIKE_RE.is_match(text) {
                    return Err(ParseError::MalformedHeading {
                        line,
                        heading: text.to_string(),
                    });
                }
                continue;
            };

            let id = caps[1]
                .parse::<u32>()
                .map(TaskId)
                .map_err(|_| ParseError::InvalidTaskId {
                    line,
                    value: caps[1].to_string(),
                })?;

            if let Some(&first_line) = first_seen.get(&id) {
                return Err(ParseError::DuplicateTask {
                    id,
                    line,
                    first_line,
                });
            }
            first_seen.insert(id, line);

            let body_start = line_end(content, heading.start);
            let body_end = headings[index + 1..]
                .iter()
                .find(|h| h.level <= TASK_HEADING_LEVEL)
                .map_or(content.len(), |h| h.start);
            let body = content.get(body_start..body_end).unwrap_or_default();

            tracing::debug!("Parsed {} at line {}", id, line);
            tasks.push(parse_task_body(id, &caps[2], line, body));
        }

        if tasks.is_empty() {
            return Err(ParseError::NoTasks);
        }

        tracing::debug!("Parsed {} tasks", tasks.len());
        Ok(TaskPlan { title, tasks })
    }

    /// Collect all headings with their offsets
    fn collect_headings(content: &str) -> Vec<Heading> {
        let mut headings = Vec::new();
        let mut current: Option<Heading> = None;

        for (event, range) in MdParser::new(content).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current = Some(Heading {
                        level: level as u8,
                        text: String::new(),
                        start: range.start,
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(heading) = current.take() {
                        headings.push(heading);
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(ref mut heading) = current {
                        heading.text.push_str(&text);
                    }
                }
                _ => {}
            }
        }

        headings
    }

    /// Strip the conventional `Task Plan:` prefix from the H1
    fn plan_title(text: &str) -> String {
        let text = text.trim();
        text.strip_prefix("Task Plan:")
            .map_or(text, str::trim)
            .to_string()
    }
}

/// 1-based line number of a byte offset
fn line_of(content: &str, offset: usize) -> usize {
    content.as_bytes()[..offset.min(content.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Offset just past the end of the line containing `offset`
fn line_end(content: &str, offset: usize) -> usize {
    content[offset..]
        .find('\n')
        .map_or(content.len(), |i| offset + i + 1)
}
