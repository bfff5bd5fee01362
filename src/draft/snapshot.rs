//! Draft snapshots and their storage encoding

use super::storage::DraftStorage;
use crate::error::{DraftError, Result};
use crate::state::FormGroup;
use crate::validation::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::mem;

/// Which storage key a form drafts into and which fields it keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSpec {
    pub key: String,
    /// Dotted field paths to persist
    pub fields: Vec<String>,
}

impl DraftSpec {
    pub fn new(key: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            key: key.into(),
            fields,
        }
    }
}

/// Persisted subset of a form's value, keyed by field path.
///
/// Encodes as a flat JSON object, e.g. `{"email":"a@b.io"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftSnapshot {
    fields: BTreeMap<String, FieldValue>,
}

impl DraftSnapshot {
    /// Take the configured fields out of a form value; missing paths are skipped.
    ///
    /// A group or array path is stored as one entry per leaf beneath it.
    pub fn capture(value: &FieldValue, fields: &[String]) -> Self {
        let mut leaves = BTreeMap::new();
        for path in fields {
            if let Some(v) = value.get(path) {
                flatten_into(path, v, &mut leaves);
            }
        }
        Self { fields: leaves }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored draft; `null` entries are treated as absent
    pub fn from_json(key: &str, text: &str) -> Result<Self> {
        let raw: BTreeMap<String, Option<FieldValue>> =
            serde_json::from_str(text).map_err(|source| DraftError::MalformedDraft {
                key: key.to_string(),
                source,
            })?;
        let mut leaves = BTreeMap::new();
        for (path, value) in raw {
            if let Some(value) = value {
                flatten_into(&path, &value, &mut leaves);
            }
        }
        Ok(Self { fields: leaves })
    }

    /// Keep only leaves at or beneath the given paths
    fn restrict(mut self, fields: &[String]) -> Self {
        self.fields
            .retain(|path, _| fields.iter().any(|field| covers(field, path)));
        self
    }

    /// Seed the snapshot's values into a form as its initial values, without
    /// marking fields dirty.
    ///
    /// Values whose shape does not match the target field are ignored.
    pub fn seed(&self, form: &mut FormGroup) {
        for (path, value) in &self.fields {
            let matches = form
                .get_field(path)
                .is_some_and(|f| mem::discriminant(f.value()) == mem::discriminant(value));
            if matches {
                form.seed_value(path, value.clone());
            } else {
                tracing::debug!(path = %path, "Ignoring draft value that does not fit the form");
            }
        }
    }
}

/// Whether configured path `field` is `path` itself or one of its ancestors
fn covers(field: &str, path: &str) -> bool {
    path.strip_prefix(field)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

fn flatten_into(path: &str, value: &FieldValue, out: &mut BTreeMap<String, FieldValue>) {
    match value {
        FieldValue::Group(children) => {
            for (name, child) in children {
                flatten_into(&format!("{path}.{name}"), child, out);
            }
        }
        FieldValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(&format!("{path}.{i}"), item, out);
            }
        }
        leaf => {
            out.insert(path.to_string(), leaf.clone());
        }
    }
}

/// Read the draft for `spec`.
///
/// Absent, unreadable and malformed drafts all yield `None`; failures are
/// logged and never reach the caller.
pub fn load(storage: &dyn DraftStorage, spec: &DraftSpec) -> Option<DraftSnapshot> {
    let text = match storage.get(&spec.key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!("Could not read draft '{}': {err}", spec.key);
            return None;
        }
    };

    match DraftSnapshot::from_json(&spec.key, &text) {
        Ok(snapshot) => Some(snapshot.restrict(&spec.fields)),
        Err(err) => {
            tracing::warn!("{err}; starting without a draft");
            None
        }
    }
}

/// Capture the configured fields of `value` and overwrite the stored draft
pub fn save(storage: &dyn DraftStorage, spec: &DraftSpec, value: &FieldValue) -> Result<()> {
    let snapshot = DraftSnapshot::capture(value, &spec.fields);
    storage.set(&spec.key, &snapshot.to_json()?)
}
