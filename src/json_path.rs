//! Optional-path lookups over untyped RCSB documents.
//!
//! Absent keys, out-of-range indices and type mismatches all resolve to `None`;
//! a lookup never fails.

use std::fmt::Write as _;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seg {
    Key(&'static str),
    Index(usize),
}

pub type JsonPath = &'static [Seg];

pub fn lookup<'a>(value: &'a Value, path: &[Seg]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, seg| match seg {
        Seg::Key(key) => current.as_object()?.get(*key),
        Seg::Index(index) => current.as_array()?.get(*index),
    })
}

pub fn lookup_str<'a>(value: &'a Value, path: &[Seg]) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

pub fn lookup_f64(value: &Value, path: &[Seg]) -> Option<f64> {
    lookup(value, path).and_then(Value::as_f64)
}

pub fn lookup_array<'a>(value: &'a Value, path: &[Seg]) -> Option<&'a Vec<Value>> {
    lookup(value, path).and_then(Value::as_array)
}

/// Groups in the GraphQL payload are either a single object or a list of them;
/// only the head of a list is considered.
pub fn first_or_self(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

/// Non-empty string after trimming, or `None`.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

pub fn describe(path: &[Seg]) -> String {
    let mut out = String::new();
    for seg in path {
        match seg {
            Seg::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            Seg::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    out
}
