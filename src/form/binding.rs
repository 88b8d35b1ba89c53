use super::controller::{Form, FormResult, FormTask, read_lock};
use super::data::ErrorMessage;
use super::path::{FieldLens, FieldPath};

/// Per-field view of a [`Form`], handed to the widget that edits the field.
///
/// Reads always go to the live snapshot, so a binding can be kept around
/// across changes.
#[derive(Clone)]
pub struct FieldBinding<V, L>
where
    V: Clone + Send + Sync + 'static,
{
    form: Form<V>,
    lens: L,
}

impl<V, L> FieldBinding<V, L>
where
    V: Clone + Send + Sync + 'static,
    L: FieldLens<V>,
{
    pub(super) fn new(form: Form<V>, lens: L) -> Self {
        Self { form, lens }
    }

    pub fn lens(&self) -> &L {
        &self.lens
    }

    pub fn name(&self) -> FieldPath {
        self.lens.path()
    }

    pub fn value(&self) -> FormResult<L::Value> {
        let state = read_lock(&self.form.state, "reading bound field value")?;
        Ok(self.lens.get(&state.data.values).clone())
    }

    pub fn error(&self) -> FormResult<Option<ErrorMessage>> {
        let state = read_lock(&self.form.state, "reading bound field error")?;
        Ok(state.data.error(self.lens.path().as_str()).cloned())
    }

    pub fn dirty(&self) -> FormResult<bool> {
        let state = read_lock(&self.form.state, "reading bound field dirtiness")?;
        Ok(state.data.is_field_dirty(self.lens.path().as_str()))
    }

    pub fn required(&self) -> FormResult<bool>
    where
        L::Value: Default,
    {
        self.form.is_required(&self.lens)
    }

    pub fn change(&self, value: L::Value) -> FormResult<FormTask> {
        self.form.change(self.lens.clone(), value)
    }

    pub fn blur(&self) -> FormResult<FormTask> {
        self.form.blur(self.lens.clone())
    }
}
