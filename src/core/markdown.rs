//! Markdown codec for schema-bound records.
//!
//! Records are stored as "H3 key-value" documents: each field is a level-3
//! heading naming the field key, followed by its value block. This is the
//! same layout GitHub issue forms produce, so an issue body can be decoded
//! directly.
//!
//! ```markdown
//! ### name
//!
//! Gemini 2.5 Flash Image
//!
//! ### main modality
//!
//! - image
//! ```
//!
//! Multi-line list items continue on indented lines. A text line that would
//! read back as a heading or as `_No response_` is written with a leading
//! backslash.

use crate::core::schema::{
    FieldIssue, FieldKind, Problem, RawValue, Record, Schema, SchemaViolation,
};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Emitted by issue forms for inputs left blank.
pub const NO_RESPONSE: &str = "_No response_";

const FIELD_HEADING: &str = "### ";

/// Split a document into `heading -> value lines`. Headings are matched
/// case-insensitively; a repeated heading replaces the earlier block.
fn split_sections(text: &str) -> HashMap<String, Vec<&str>> {
    let mut sections: HashMap<String, Vec<&str>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(heading) = line.strip_prefix(FIELD_HEADING) {
            let key = heading.trim().to_lowercase();
            sections.insert(key.clone(), Vec::new());
            current = Some(key);
            continue;
        }
        if let Some(key) = &current
            && let Some(lines) = sections.get_mut(key)
        {
            lines.push(line);
        }
    }

    sections
}

fn block_text(lines: &[&str]) -> String {
    let joined = lines
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = joined.trim();
    if trimmed == NO_RESPONSE {
        return String::new();
    }
    trimmed
        .lines()
        .map(unescape_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text lines that would read back as a heading or as the blank-input
/// placeholder. They are written with one extra leading backslash.
fn needs_escape(line: &str) -> bool {
    let bare = line.trim_start_matches('\\');
    bare.starts_with(FIELD_HEADING) || bare.trim_end() == NO_RESPONSE
}

fn escape_line(line: &str) -> String {
    if needs_escape(line) {
        format!("\\{}", line)
    } else {
        line.to_string()
    }
}

fn unescape_line(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if needs_escape(rest) => rest,
        _ => line,
    }
}

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or(match line {
            "-" | "*" => Some(""),
            _ => None,
        })
}

/// Checkbox items from issue forms: `[x]` is selected, `[ ]` is not.
fn checkbox(item: &str) -> Option<Option<&str>> {
    if let Some(rest) = item
        .strip_prefix("[x]")
        .or_else(|| item.strip_prefix("[X]"))
    {
        return Some(Some(rest.trim()));
    }
    item.strip_prefix("[ ]").map(|_| None)
}

/// Body of a line continuing the previous item, minus one level of indent.
fn continuation(line: &str) -> &str {
    line.strip_prefix("  ")
        .or_else(|| line.strip_prefix('\t'))
        .unwrap_or(line)
        .trim_end()
}

/// Split a list block into items. `checkboxes` enables issue-form
/// checkbox handling, which only applies to enum lists.
fn list_items(lines: &[&str], checkboxes: bool) -> Vec<String> {
    if block_text(lines).is_empty() {
        return Vec::new();
    }
    if !lines.iter().any(|l| bullet(l).is_some()) {
        return lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut items: Vec<Option<String>> = Vec::new();
    let mut blank_lines = 0;

    for line in lines {
        if line.trim().is_empty() {
            blank_lines += 1;
            continue;
        }
        if let Some(item) = bullet(line) {
            let item = item.trim();
            let entry = match checkbox(item).filter(|_| checkboxes) {
                Some(selected) => selected.map(str::to_string),
                None => Some(item.to_string()),
            };
            items.push(entry);
        } else {
            // indented or lazy continuation of the previous item
            let text = continuation(line);
            match items.last_mut() {
                Some(Some(last)) => {
                    for _ in 0..=blank_lines {
                        last.push('\n');
                    }
                    last.push_str(text);
                }
                Some(None) => {}
                None => items.push(Some(text.trim().to_string())),
            }
        }
        blank_lines = 0;
    }

    items
        .into_iter()
        .flatten()
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse a markdown document and validate it against `R::SCHEMA`.
///
/// All field problems are collected before failing, so one error names
/// every offending field. Headings the schema does not declare are ignored.
pub fn decode<R: Record>(text: &str) -> Result<R, SchemaViolation> {
    let schema = R::SCHEMA;
    let sections = split_sections(text);
    let mut object = Map::new();
    let mut issues = Vec::new();

    for field in schema.fields {
        let raw = sections.get(field.key).map(|lines| {
            if field.kind.is_list() {
                let checkboxes = matches!(field.kind, FieldKind::EnumList(_));
                RawValue::List(list_items(lines, checkboxes))
            } else {
                RawValue::Text(block_text(lines))
            }
        });

        match field.check(raw) {
            Ok(Some(value)) => {
                object.insert(field.key.to_string(), value);
            }
            Ok(None) => {}
            Err(problem) => issues.push(FieldIssue {
                field: field.key.to_string(),
                problem,
            }),
        }
    }

    if !issues.is_empty() {
        return Err(SchemaViolation {
            schema: schema.name,
            issues,
        });
    }

    serde_json::from_value(JsonValue::Object(object)).map_err(|e| {
        SchemaViolation::single(schema.name, schema.name, Problem::Shape(e.to_string()))
    })
}

fn item_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => {
            let text = s.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn render_item(item: &str) -> String {
    let mut lines = item.lines();
    let mut rendered = format!("- {}", lines.next().unwrap_or_default());
    for line in lines {
        rendered.push('\n');
        if !line.trim().is_empty() {
            rendered.push_str("  ");
            rendered.push_str(line);
        }
    }
    rendered
}

fn render_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Array(items) => {
            let rendered = items
                .iter()
                .filter_map(item_text)
                .map(|item| render_item(&item))
                .collect::<Vec<_>>();
            (!rendered.is_empty()).then(|| rendered.join("\n"))
        }
        scalar => item_text(scalar).map(|text| {
            text.lines()
                .map(escape_line)
                .collect::<Vec<_>>()
                .join("\n")
        }),
    }
}

/// Render a record as canonical markdown in schema declaration order.
/// Absent and empty optional fields are omitted.
pub fn encode<R: Record>(record: &R) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(record)?;
    Ok(render_object(R::SCHEMA, value.as_object()))
}

fn render_object(schema: &Schema, object: Option<&Map<String, JsonValue>>) -> String {
    let blocks = schema
        .keys()
        .filter_map(|key| {
            let body = object.and_then(|o| o.get(key)).and_then(render_value)?;
            Some(format!("{}{}\n\n{}", FIELD_HEADING, key, body))
        })
        .collect::<Vec<_>>();

    if blocks.is_empty() {
        String::new()
    } else {
        format!("{}\n", blocks.join("\n\n"))
    }
}
