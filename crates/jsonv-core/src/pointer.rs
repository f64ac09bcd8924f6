//! # JSON Pointer Paths
//!
//! Instance and keyword locations are tracked as segment lists while the
//! engine descends, and rendered as RFC 6901 JSON pointers (`/a/0/b`, with
//! `~0`/`~1` escaping) only when an error detail is produced. The root
//! location is the empty string.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PointerError;

/// One step in an instance or keyword path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object property name or keyword name.
    Key(String),
    /// An array position.
    Index(usize),
}

impl PathSegment {
    /// Segment text as it appears in a pointer, before escaping.
    pub fn as_text(&self) -> String {
        match self {
            Self::Key(k) => k.clone(),
            Self::Index(i) => i.to_string(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// Render a segment list as a JSON pointer. The empty list renders as `""`.
pub fn to_json_pointer(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        out.push('/');
        out.push_str(&escape(&segment.as_text()));
    }
    out
}

/// Parse a JSON pointer (optionally prefixed with `#`) into segments.
///
/// Segments consisting only of ASCII digits become [`PathSegment::Index`];
/// everything else becomes [`PathSegment::Key`]. Lookups via [`get_path`]
/// accept either form against either container type.
pub fn from_json_pointer(pointer: &str) -> Result<Vec<PathSegment>, PointerError> {
    let pointer = pointer.strip_prefix('#').unwrap_or(pointer);
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let rest = pointer
        .strip_prefix('/')
        .ok_or_else(|| PointerError::MissingLeadingSlash(pointer.to_string()))?;

    rest.split('/')
        .map(|raw| {
            let text = unescape(raw)?;
            let is_index = !text.is_empty()
                && text.bytes().all(|b| b.is_ascii_digit())
                && (text == "0" || !text.starts_with('0'));
            Ok(match text.parse::<usize>() {
                Ok(i) if is_index => PathSegment::Index(i),
                _ => PathSegment::Key(text),
            })
        })
        .collect()
}

/// Resolve a segment list against a JSON value.
pub fn get_path<'a>(value: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match (current, segment) {
        (Value::Object(map), seg) => map.get(&seg.as_text()),
        (Value::Array(items), PathSegment::Index(i)) => items.get(*i),
        (Value::Array(items), PathSegment::Key(k)) => {
            k.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    })
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return Err(PointerError::InvalidEscape(segment.to_string())),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}
