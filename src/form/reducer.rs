//! Pure snapshot transitions. Every function returns a fresh [`FormData`]
//! and leaves its input untouched.

use super::data::{ErrorMessage, FormData};
use super::path::{FieldLens, HasFieldPath};

/// Recomputes the derived `has_errors` / `is_dirty` flags from their maps.
pub fn finalize<V>(mut data: FormData<V>) -> FormData<V> {
    data.has_errors = !data.errors.is_empty();
    data.is_dirty = data.dirty.values().any(|dirty| *dirty);
    data
}

pub fn update_field<V, L>(
    old: &FormData<V>,
    lens: &L,
    value: L::Value,
    dirty: bool,
    error: Option<ErrorMessage>,
) -> FormData<V>
where
    V: Clone,
    L: FieldLens<V>,
{
    let path = lens.path();
    let mut next = old.clone();
    lens.set(&mut next.values, value);
    next.dirty.insert(path.clone(), dirty);
    match error {
        Some(error) => {
            next.errors.insert(path, error);
        }
        None => {
            next.errors.remove(&path);
        }
    }
    finalize(next)
}

pub fn set_submitting<V: Clone>(old: &FormData<V>, submitting: bool) -> FormData<V> {
    FormData {
        is_submitting: submitting,
        ..old.clone()
    }
}

/// Ends a successful submit: nothing is dirty against the submitted values.
pub fn finish_submit<V: Clone>(old: &FormData<V>) -> FormData<V> {
    let mut next = old.clone();
    next.is_submitting = false;
    next.dirty.clear();
    finalize(next)
}

/// Drops every error at `field` or below it; the root clears everything.
pub fn clear_errors<V, F>(old: &FormData<V>, field: &F) -> FormData<V>
where
    V: Clone,
    F: HasFieldPath + ?Sized,
{
    let prefix = field.path();
    let mut next = old.clone();
    next.errors.retain(|path, _| !prefix.contains(path.as_str()));
    finalize(next)
}

/// Forgets errors and dirtiness, used when the dirtiness baseline is rebased.
pub fn reset_tracking<V: Clone>(old: &FormData<V>) -> FormData<V> {
    let mut next = old.clone();
    next.errors.clear();
    next.dirty.clear();
    finalize(next)
}
