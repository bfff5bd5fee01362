//! Form value tree

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of a control's value.
///
/// Leaves are text or booleans; groups map control names to values and
/// arrays hold positional values. Serializes untagged, so a group becomes a
/// plain JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    List(Vec<FieldValue>),
    Group(BTreeMap<String, FieldValue>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl FieldValue {
    /// Text content, if this is a text leaf
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean leaf
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Empty string, `false`, or an empty container
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Bool(b) => !b,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Group(children) => children.is_empty(),
        }
    }

    /// Length for values that have one: chars for text, items for lists
    pub fn length(&self) -> Option<usize> {
        match self {
            FieldValue::Text(s) => Some(s.chars().count()),
            FieldValue::List(items) => Some(items.len()),
            FieldValue::Bool(_) | FieldValue::Group(_) => None,
        }
    }

    /// Look up a nested value by dotted path (`passwords.password`, `source.1`)
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        path.split('.').try_fold(self, |node, segment| match node {
            FieldValue::Group(children) => children.get(segment),
            FieldValue::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}
