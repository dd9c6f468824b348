//! Declarative field contracts for markdown records.
//!
//! A [`Schema`] lists the fields of one record type in declaration order.
//! The markdown codec walks this list to validate decoded values and to
//! lay out encoded documents, so declaration order is also the canonical
//! field order on disk.

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value domain of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Calendar date written as `YYYY-MM-DD`.
    Date,
    Enum(&'static [&'static str]),
    List,
    /// Ordered set of enum values.
    EnumList(&'static [&'static str]),
}

impl FieldKind {
    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::List | FieldKind::EnumList(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub kind: FieldKind,
    /// Required lists must also be non-empty.
    pub required: bool,
}

impl Field {
    pub const fn required(key: &'static str, kind: FieldKind) -> Self {
        Field {
            key,
            kind,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, kind: FieldKind) -> Self {
        Field {
            key,
            kind,
            required: false,
        }
    }

    /// Validate one raw value and normalize it into its JSON form.
    ///
    /// `Ok(None)` means the field is absent, which is only allowed for
    /// optional fields.
    pub fn check(&self, raw: Option<RawValue>) -> Result<Option<JsonValue>, Problem> {
        let raw = match raw {
            Some(RawValue::Text(text)) if text.is_empty() => None,
            Some(RawValue::List(items)) if items.is_empty() => None,
            other => other,
        };

        let Some(raw) = raw else {
            return if !self.required {
                Ok(None)
            } else if self.kind.is_list() {
                Err(Problem::EmptyList)
            } else {
                Err(Problem::Missing)
            };
        };

        match (self.kind, raw) {
            (FieldKind::Text, RawValue::Text(text)) => Ok(Some(JsonValue::String(text))),
            (FieldKind::Date, RawValue::Text(text)) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
                .map(|date| Some(JsonValue::String(date.format(DATE_FORMAT).to_string())))
                .map_err(|_| Problem::InvalidDate(text)),
            (FieldKind::Enum(allowed), RawValue::Text(text)) => {
                canonical_variant(allowed, &text).map(|v| Some(JsonValue::String(v.to_string())))
            }
            (FieldKind::List, RawValue::List(items)) => Ok(Some(JsonValue::Array(
                items.into_iter().map(JsonValue::String).collect(),
            ))),
            (FieldKind::EnumList(allowed), RawValue::List(items)) => {
                let mut variants: Vec<&'static str> = Vec::new();
                for item in items.iter().flat_map(|item| item.split(',')) {
                    let item = item.trim();
                    if item.is_empty() {
                        continue;
                    }
                    let variant = canonical_variant(allowed, item)?;
                    if !variants.contains(&variant) {
                        variants.push(variant);
                    }
                }
                if variants.is_empty() {
                    return if self.required {
                        Err(Problem::EmptyList)
                    } else {
                        Ok(None)
                    };
                }
                Ok(Some(JsonValue::Array(
                    variants
                        .into_iter()
                        .map(|v| JsonValue::String(v.to_string()))
                        .collect(),
                )))
            }
            (_, RawValue::Text(_)) => Err(Problem::Shape("expected a list".to_string())),
            (_, RawValue::List(_)) => Err(Problem::Shape("expected a single value".to_string())),
        }
    }
}

fn canonical_variant(allowed: &'static [&'static str], value: &str) -> Result<&'static str, Problem> {
    allowed
        .iter()
        .copied()
        .find(|variant| variant.eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| Problem::UnknownVariant {
            value: value.trim().to_string(),
            allowed,
        })
}

/// Field value as read from a document, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.key)
    }

    pub fn to_json(&self) -> JsonValue {
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let (kind, values) = match f.kind {
                    FieldKind::Text => ("text", None),
                    FieldKind::Date => ("date", None),
                    FieldKind::Enum(values) => ("enum", Some(values)),
                    FieldKind::List => ("list", None),
                    FieldKind::EnumList(values) => ("enum list", Some(values)),
                };
                let mut field = serde_json::json!({
                    "key": f.key,
                    "kind": kind,
                    "required": f.required,
                });
                if let Some(values) = values {
                    field["values"] = serde_json::json!(values);
                }
                field
            })
            .collect::<Vec<_>>();
        serde_json::json!({ "name": self.name, "fields": fields })
    }
}

/// A record type bound to its schema.
///
/// Serde field names must equal the schema keys; the codec moves values
/// between the two through `serde_json::Value`.
pub trait Record: Serialize + DeserializeOwned {
    const SCHEMA: &'static Schema;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    Missing,
    EmptyList,
    InvalidDate(String),
    UnknownVariant {
        value: String,
        allowed: &'static [&'static str],
    },
    Shape(String),
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => write!(f, "required field is missing"),
            Problem::EmptyList => write!(f, "required list is empty"),
            Problem::InvalidDate(value) => {
                write!(f, "'{}' is not a date (expected YYYY-MM-DD)", value)
            }
            Problem::UnknownVariant { value, allowed } => write!(
                f,
                "'{}' is not one of: {}",
                value,
                allowed.join(", ")
            ),
            Problem::Shape(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.field, self.problem)
    }
}

/// Every field issue found while decoding one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub schema: &'static str,
    pub issues: Vec<FieldIssue>,
}

impl SchemaViolation {
    pub fn single(schema: &'static str, field: &str, problem: Problem) -> Self {
        SchemaViolation {
            schema,
            issues: vec![FieldIssue {
                field: field.to_string(),
                problem,
            }],
        }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{} record rejected: {}", self.schema, rendered)
    }
}

impl std::error::Error for SchemaViolation {}
