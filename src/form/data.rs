use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::path::FieldPath;

/// Externally visible field error: plain text or a message id with
/// interpolation values for the embedding application to translate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    Message {
        id: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        values: BTreeMap<String, String>,
    },
}

impl ErrorMessage {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Message {
            id: id.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            Self::Message { id, mut values } => {
                values.insert(key.into(), value.to_string());
                Self::Message { id, values }
            }
            text => text,
        }
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Message { id, .. } => f.write_str(id),
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One immutable snapshot of a form.
///
/// The maps are private so that `has_errors` and `is_dirty` can only be
/// produced by the reducer, which recomputes them after every change.
#[derive(Clone, Debug, PartialEq)]
pub struct FormData<V> {
    pub(crate) values: V,
    pub(crate) errors: BTreeMap<FieldPath, ErrorMessage>,
    pub(crate) dirty: BTreeMap<FieldPath, bool>,
    pub(crate) has_errors: bool,
    pub(crate) is_dirty: bool,
    pub(crate) is_submitting: bool,
}

impl<V> FormData<V> {
    pub fn new(values: V) -> Self {
        Self {
            values,
            errors: BTreeMap::new(),
            dirty: BTreeMap::new(),
            has_errors: false,
            is_dirty: false,
            is_submitting: false,
        }
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn into_values(self) -> V {
        self.values
    }

    pub fn errors(&self) -> &BTreeMap<FieldPath, ErrorMessage> {
        &self.errors
    }

    pub fn error(&self, path: &str) -> Option<&ErrorMessage> {
        self.errors.get(path)
    }

    pub fn dirty(&self) -> &BTreeMap<FieldPath, bool> {
        &self.dirty
    }

    pub fn is_field_dirty(&self, path: &str) -> bool {
        self.dirty.get(path).copied().unwrap_or(false)
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Canonical "disable the submit button" predicate.
    pub fn not_submittable(&self, skip_dirty: bool) -> bool {
        self.has_errors || self.is_submitting || !(self.is_dirty || skip_dirty)
    }
}

pub fn initial_data<V>(values: V) -> FormData<V> {
    FormData::new(values)
}

pub fn not_submittable<V>(data: &FormData<V>, skip_dirty: bool) -> bool {
    data.not_submittable(skip_dirty)
}
