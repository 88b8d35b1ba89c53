//! Test helpers for code built on morfi forms.
//!
//! [`FormHarness`] mounts a [`Form`] with recording callbacks and drives every
//! operation to completion, so tests can assert on the resulting snapshot
//! without an executor of their own.
//!
//! ```ignore
//! let harness = FormHarness::mount(values, validation)?;
//! harness.register(&fields.name());
//! harness.change(fields.name(), String::new())?;
//! harness.blur(fields.name())?;
//! assert!(harness.has_errors()?);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::executor::block_on;

use crate::form::{
    ErrorMessage, FieldBinding, FieldLens, FieldPath, Form, FormData, FormOptions, FormResult,
    FormValidation, SubmitError, initial_data,
};

struct Recorded<V> {
    changes: usize,
    failures: Vec<(SubmitError, FormData<V>)>,
    finished: Vec<FormData<V>>,
}

pub struct FormHarness<V>
where
    V: Clone + Send + Sync + 'static,
{
    form: Form<V>,
    fields: Mutex<BTreeSet<FieldPath>>,
    recorded: Arc<Mutex<Recorded<V>>>,
}

impl<V> FormHarness<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn mount(values: V, validation: FormValidation<V>) -> FormResult<Self> {
        Self::mount_with(initial_data(values), validation, FormOptions::default())
    }

    pub fn mount_with(
        data: FormData<V>,
        validation: FormValidation<V>,
        options: FormOptions,
    ) -> FormResult<Self> {
        let form = Form::new(data, options);
        form.set_validation(validation)?;

        let recorded = Arc::new(Mutex::new(Recorded {
            changes: 0,
            failures: Vec::new(),
            finished: Vec::new(),
        }));
        {
            let recorded = recorded.clone();
            form.on_change(move |_| lock(&recorded).changes += 1)?;
        }
        {
            let recorded = recorded.clone();
            form.on_submit_failed(move |error, data| lock(&recorded).failures.push((error, data)))?;
        }
        {
            let recorded = recorded.clone();
            form.on_submit_finished(move |data| lock(&recorded).finished.push(data))?;
        }

        Ok(Self {
            form,
            fields: Mutex::new(BTreeSet::new()),
            recorded,
        })
    }

    pub fn form(&self) -> &Form<V> {
        &self.form
    }

    /// Makes the field visible to [`FormHarness::errors`], like mounting its widget.
    pub fn register<L>(&self, lens: &L) -> FieldBinding<V, L>
    where
        L: FieldLens<V>,
    {
        lock(&self.fields).insert(lens.path());
        self.form.field(lens.clone())
    }

    pub fn unregister<L>(&self, lens: &L)
    where
        L: FieldLens<V>,
    {
        lock(&self.fields).remove(&lens.path());
    }

    pub fn change<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<V>,
    {
        block_on(self.form.change(lens, value)?)
    }

    pub fn blur<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<V>,
    {
        block_on(self.form.blur(lens)?)
    }

    pub fn submit(&self) -> FormResult<()> {
        block_on(self.form.submit()?)
    }

    pub fn data(&self) -> FormResult<FormData<V>> {
        self.form.data()
    }

    /// Errors of the registered fields, keyed by field name.
    pub fn errors(&self) -> FormResult<BTreeMap<String, ErrorMessage>> {
        let data = self.form.data()?;
        let fields = lock(&self.fields);
        Ok(fields
            .iter()
            .filter_map(|path| {
                data.error(path.as_str())
                    .map(|error| (path.to_string(), error.clone()))
            })
            .collect())
    }

    pub fn has_errors(&self) -> FormResult<bool> {
        Ok(!self.errors()?.is_empty())
    }

    pub fn change_count(&self) -> usize {
        lock(&self.recorded).changes
    }

    pub fn take_failures(&self) -> Vec<(SubmitError, FormData<V>)> {
        std::mem::take(&mut lock(&self.recorded).failures)
    }

    pub fn take_finished(&self) -> Vec<FormData<V>> {
        std::mem::take(&mut lock(&self.recorded).finished)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
