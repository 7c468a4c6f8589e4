//! Validated decoding of content API responses.
//!
//! A collection body is accepted in two shapes: a bare JSON array of item
//! objects, or an envelope object carrying that array under the collection
//! name (`posts`, `authors`, ...) or under `data`, `items` or `results`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mapsmith_core::{ContentItem, ContentKind};
use serde::{Deserialize, de::IgnoredAny};
use serde_json::{Map, Value};
use thiserror::Error;

/// Envelope keys tried after the collection's own name.
const ENVELOPE_KEYS: [&str; 3] = ["data", "items", "results"];

/// Decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Body is not JSON, or an item object failed to decode.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Body is JSON but carries no item array.
    #[error("expected an array or an object with a `{expected}` array, got {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    /// An element of the item array is not an object.
    #[error("item {index} is not an object")]
    Item { index: usize },
}

/// Result type for decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Accepted response bodies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Body {
    List(Vec<Entry>),
    Envelope(HashMap<String, EnvelopeField>),
    Other(Value),
}

/// A value inside an envelope object; only arrays can hold items.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnvelopeField {
    Items(Vec<Entry>),
    Other(IgnoredAny),
}

/// One element of an item array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Object(Map<String, Value>),
    Other(IgnoredAny),
}

/// The fields of an item the sitemap cares about. Anything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct RawItem {
    #[serde(default)]
    slug: Option<Scalar>,
    #[serde(default)]
    id: Option<Scalar>,
    #[serde(default, rename = "updatedAt")]
    updated_at_camel: Option<Scalar>,
    #[serde(default)]
    updated_at: Option<Scalar>,
}

/// Field value; identifiers may be strings or numbers, anything else is
/// treated as absent.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Other(IgnoredAny),
}

impl Scalar {
    fn as_identifier(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Other(_) => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl RawItem {
    fn into_item(self, kind: ContentKind) -> ContentItem {
        let identifier = match kind {
            ContentKind::Authors => self.id,
            ContentKind::Posts | ContentKind::Categories | ContentKind::Events => self.slug,
        }
        .as_ref()
        .and_then(Scalar::as_identifier);

        let last_modified = [&self.updated_at_camel, &self.updated_at]
            .into_iter()
            .find_map(|field| field.as_ref().and_then(Scalar::as_text))
            .and_then(|raw| {
                let parsed = parse_timestamp(raw);
                if parsed.is_none() {
                    tracing::debug!(collection = %kind, raw, "ignoring unparsable timestamp");
                }
                parsed
            });

        ContentItem {
            identifier,
            last_modified,
        }
    }
}

/// Decode a collection response body.
pub fn decode_collection(kind: ContentKind, body: &str) -> Result<Vec<ContentItem>> {
    let body: Body = serde_json::from_str(body)?;
    let entries = extract_entries(kind, body)?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Entry::Object(fields) => {
                let raw = RawItem::deserialize(Value::Object(fields))?;
                Ok(raw.into_item(kind))
            }
            Entry::Other(_) => Err(DecodeError::Item { index }),
        })
        .collect()
}

fn extract_entries(kind: ContentKind, body: Body) -> Result<Vec<Entry>> {
    match body {
        Body::List(entries) => Ok(entries),
        Body::Envelope(mut envelope) => std::iter::once(kind.name())
            .chain(ENVELOPE_KEYS)
            .find_map(|key| match envelope.remove(key) {
                Some(EnvelopeField::Items(entries)) => Some(entries),
                _ => None,
            })
            .ok_or(DecodeError::Shape {
                expected: kind.name(),
                found: "object",
            }),
        Body::Other(other) => Err(DecodeError::Shape {
            expected: kind.name(),
            found: json_type(&other),
        }),
    }
}

/// Parse an API timestamp into its UTC calendar date.
///
/// Accepts RFC 3339 date-times, zone-less date-times (taken as UTC) and
/// plain `yyyy-MM-dd` dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
