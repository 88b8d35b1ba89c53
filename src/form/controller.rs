use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, trace};

use super::binding::FieldBinding;
use super::data::{ErrorMessage, FormData};
use super::evaluate::{evaluate, evaluate_trigger, validate_all};
use super::path::{FieldLens, HasFieldPath};
use super::reducer;
use super::validation::{FieldValidators, FormValidation, Outcome, Trigger};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Equality override for dirtiness, update suppression and staleness checks.
/// Returning `None` falls back to `PartialEq`.
pub type Comparator = Arc<dyn Fn(&dyn Any, &dyn Any) -> Option<bool> + Send + Sync>;

#[derive(Clone, Default)]
pub struct FormOptions {
    pub comparator: Option<Comparator>,
}

impl FormOptions {
    pub fn with_comparator(
        mut self,
        comparator: impl Fn(&dyn Any, &dyn Any) -> Option<bool> + Send + Sync + 'static,
    ) -> Self {
        self.comparator = Some(Arc::new(comparator));
        self
    }
}

impl Debug for FormOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormOptions")
            .field("custom_comparator", &self.comparator.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    AlreadySubmitting,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

/// Why a submit did not finish.
#[derive(Debug)]
pub enum SubmitError {
    /// Validate-all left errors in the snapshot; the submit callback never ran.
    ValidationFailed,
    /// The submit callback failed; the error is passed through untouched.
    Rejected(BoxError),
}

impl SubmitError {
    pub fn is_validation_error(&self) -> bool {
        matches!(self, SubmitError::ValidationFailed)
    }

    pub fn rejection(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            SubmitError::ValidationFailed => None,
            SubmitError::Rejected(error) => Some(error.as_ref()),
        }
    }

    pub fn into_rejection(self) -> Option<BoxError> {
        match self {
            SubmitError::ValidationFailed => None,
            SubmitError::Rejected(error) => Some(error),
        }
    }
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::ValidationFailed => f.write_str("validation failed"),
            SubmitError::Rejected(error) => Display::fmt(error, f),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::ValidationFailed => None,
            SubmitError::Rejected(error) => Some(error.as_ref()),
        }
    }
}

pub fn is_validation_error(error: &SubmitError) -> bool {
    error.is_validation_error()
}

/// Deferred part of a form operation. Synchronous work has already been
/// applied when the task is handed out; awaiting it applies the rest.
#[must_use = "async validation and submit results are only applied when the task is awaited"]
pub struct FormTask(Option<BoxFuture<'static, FormResult<()>>>);

impl FormTask {
    pub fn ready() -> Self {
        Self(None)
    }

    pub(super) fn new(future: impl Future<Output = FormResult<()>> + Send + 'static) -> Self {
        Self(Some(future.boxed()))
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }
}

impl Future for FormTask {
    type Output = FormResult<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.0.as_mut() {
            Some(future) => future.as_mut().poll(cx),
            None => Poll::Ready(Ok(())),
        }
    }
}

impl Debug for FormTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FormTask").field(&self.is_pending()).finish()
    }
}

type ChangeCallback<V> = Arc<dyn Fn(FormData<V>) + Send + Sync>;
type SubmitCallback<V> = Arc<dyn Fn(V) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;
type SubmitFailedCallback<V> = Arc<dyn Fn(SubmitError, FormData<V>) + Send + Sync>;
type SubmitFinishedCallback<V> = Arc<dyn Fn(FormData<V>) + Send + Sync>;

pub(super) struct FormCallbacks<V> {
    on_change: Option<ChangeCallback<V>>,
    on_submit: Option<SubmitCallback<V>>,
    on_submit_failed: Option<SubmitFailedCallback<V>>,
    on_submit_finished: Option<SubmitFinishedCallback<V>>,
}

impl<V> Default for FormCallbacks<V> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_submit: None,
            on_submit_failed: None,
            on_submit_finished: None,
        }
    }
}

pub(super) struct FormState<V> {
    pub(super) data: FormData<V>,
    /// Values dirtiness is judged against.
    pub(super) baseline: V,
    pub(super) version: u64,
}

/// Live form session shared by the form owner and its field bindings.
///
/// All clones drive the same state. Each accepted change replaces the stored
/// snapshot and is reported through `on_change`.
#[derive(Clone)]
pub struct Form<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState<V>>>,
    pub(super) validators: Arc<RwLock<FieldValidators<V>>>,
    pub(super) callbacks: Arc<RwLock<FormCallbacks<V>>>,
    pub(super) mounted: Arc<AtomicBool>,
}

impl<V> Form<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(data: FormData<V>, options: FormOptions) -> Self {
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                baseline: data.values.clone(),
                data,
                version: 0,
            })),
            validators: Arc::new(RwLock::new(FieldValidators::default())),
            callbacks: Arc::new(RwLock::new(FormCallbacks::default())),
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    pub fn data(&self) -> FormResult<FormData<V>> {
        Ok(read_lock(&self.state, "reading form snapshot")?.data.clone())
    }

    /// Replaces the live snapshot with one supplied by the form owner.
    pub fn set_data(&self, data: FormData<V>) -> FormResult<()> {
        write_lock(&self.state, "replacing form snapshot")?.data = data;
        Ok(())
    }

    pub fn set_validation(&self, validation: FormValidation<V>) -> FormResult<()> {
        let flattened = validation.flatten();
        trace!(fields = flattened.len(), "validation registry updated");
        *write_lock(&self.validators, "registering form validation")? = flattened;
        Ok(())
    }

    pub fn on_change(
        &self,
        callback: impl Fn(FormData<V>) + Send + Sync + 'static,
    ) -> FormResult<()> {
        write_lock(&self.callbacks, "registering change callback")?.on_change =
            Some(Arc::new(callback));
        Ok(())
    }

    pub fn on_submit<F, Fut, E>(&self, callback: F) -> FormResult<()>
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let wrapped: SubmitCallback<V> =
            Arc::new(move |values: V| -> BoxFuture<'static, Result<(), BoxError>> {
                callback(values)
                    .map(|result| result.map_err(Into::<BoxError>::into))
                    .boxed()
            });
        write_lock(&self.callbacks, "registering submit callback")?.on_submit = Some(wrapped);
        Ok(())
    }

    pub fn on_submit_failed(
        &self,
        callback: impl Fn(SubmitError, FormData<V>) + Send + Sync + 'static,
    ) -> FormResult<()> {
        write_lock(&self.callbacks, "registering submit failure callback")?.on_submit_failed =
            Some(Arc::new(callback));
        Ok(())
    }

    pub fn on_submit_finished(
        &self,
        callback: impl Fn(FormData<V>) + Send + Sync + 'static,
    ) -> FormResult<()> {
        write_lock(&self.callbacks, "registering submit finished callback")?.on_submit_finished =
            Some(Arc::new(callback));
        Ok(())
    }

    pub fn field<L>(&self, lens: L) -> FieldBinding<V, L>
    where
        L: FieldLens<V>,
    {
        FieldBinding::new(self.clone(), lens)
    }

    pub fn change<L>(&self, lens: L, value: L::Value) -> FormResult<FormTask>
    where
        L: FieldLens<V>,
    {
        self.update(lens, Trigger::OnChange, Some(value))
    }

    pub fn blur<L>(&self, lens: L) -> FormResult<FormTask>
    where
        L: FieldLens<V>,
    {
        self.update(lens, Trigger::OnBlur, None)
    }

    /// Runs the `trigger` validator of one field against `value`, or against
    /// the field's current value when `value` is `None`.
    ///
    /// A synchronous result is applied before this returns. For an async
    /// validator a changed value is applied right away with its error cleared,
    /// and the returned task applies the eventual error only if the field
    /// still holds the value that was validated.
    pub fn update<L>(
        &self,
        lens: L,
        trigger: Trigger,
        value: Option<L::Value>,
    ) -> FormResult<FormTask>
    where
        L: FieldLens<V>,
    {
        let path = lens.path();
        let (current, mut candidate) = {
            let state = read_lock(&self.state, "reading field value for update")?;
            (
                lens.get(&state.data.values).clone(),
                state.data.values.clone(),
            )
        };
        let value = value.unwrap_or_else(|| current.clone());
        let changed = !self.same(&current, &value);
        lens.set(&mut candidate, value.clone());
        let validation = read_lock(&self.validators, "reading field validators")?
            .get(path.as_str())
            .cloned();

        trace!(field = %path, ?trigger, "validating field");
        let outcome = match validation {
            Some(validation) => evaluate_trigger(&validation, trigger, &candidate),
            None => Outcome::Ready(None),
        };

        match outcome {
            Outcome::Ready(error) => {
                self.apply_field_result(&lens, value, error)?;
                Ok(FormTask::ready())
            }
            Outcome::Pending(pending) => {
                if changed {
                    self.apply_field_result(&lens, value.clone(), None)?;
                }
                let form = self.clone();
                Ok(FormTask::new(async move {
                    let error = pending.await;
                    let current = {
                        let state =
                            read_lock(&form.state, "reading field value after async validation")?;
                        lens.get(&state.data.values).clone()
                    };
                    if !form.same(&current, &value) {
                        debug!(field = %lens.path(), "discarding stale async validation result");
                        return Ok(());
                    }
                    form.apply_field_result(&lens, value, error)
                }))
            }
        }
    }

    /// Starts a submit: flags the snapshot as submitting right away, then the
    /// returned task validates every field, calls the submit callback and
    /// reports success or failure.
    ///
    /// Synchronous validation errors fail the submit before this returns.
    /// Dropping the task before it completes clears the submitting flag.
    pub fn submit(&self) -> FormResult<FormTask> {
        let mut already_submitting = false;
        let started = self.transition("starting submit", |state| {
            if state.data.is_submitting {
                already_submitting = true;
                return None;
            }
            Some(reducer::set_submitting(&state.data, true))
        })?;
        if already_submitting {
            return Err(FormError::AlreadySubmitting);
        }
        let Some(started) = started else {
            return Ok(FormTask::ready());
        };
        debug!("submit started");

        let validators = read_lock(&self.validators, "reading validators for submit")?.clone();
        let validated = match validate_all(&started, &validators) {
            Outcome::Ready(validated) if validated.has_errors() => {
                self.fail_submit_validation(validated)?;
                return Ok(FormTask::ready());
            }
            validated => validated,
        };

        let mut guard = SubmitGuard::new(self.clone());
        let form = self.clone();
        Ok(FormTask::new(async move {
            let validated = validated.resolve().await;
            let result = form.finish_submit_after_validation(validated).await;
            if result.is_ok() {
                guard.disarm();
            }
            result
        }))
    }

    async fn finish_submit_after_validation(&self, validated: FormData<V>) -> FormResult<()> {
        if validated.has_errors() {
            return self.fail_submit_validation(validated);
        }

        let callback = read_lock(&self.callbacks, "reading submit callback")?
            .on_submit
            .clone();
        let result = match callback {
            Some(callback) => callback(validated.values.clone()).await,
            None => Ok(()),
        };

        match result {
            Ok(()) => {
                let finished = self.transition("finishing submit", |state| {
                    let next = reducer::finish_submit(&state.data);
                    state.baseline = next.values.clone();
                    Some(next)
                })?;
                if let Some(finished) = finished {
                    debug!("submit finished");
                    self.notify_submit_finished(finished)?;
                }
            }
            Err(error) => {
                debug!(%error, "submit callback failed");
                let failed = self.transition("failing submit", |state| {
                    Some(reducer::set_submitting(&state.data, false))
                })?;
                if let Some(failed) = failed {
                    self.notify_submit_failed(SubmitError::Rejected(error), failed)?;
                }
            }
        }
        Ok(())
    }

    fn fail_submit_validation(&self, validated: FormData<V>) -> FormResult<()> {
        debug!(errors = validated.errors.len(), "submit blocked by validation errors");
        let next = reducer::set_submitting(&validated, false);
        if let Some(next) = self.transition("failing submit validation", |_| Some(next))? {
            self.notify_submit_failed(SubmitError::ValidationFailed, next)?;
        }
        Ok(())
    }

    pub fn version(&self) -> FormResult<u64> {
        Ok(read_lock(&self.state, "reading form version")?.version)
    }

    /// A new version rebases dirtiness on the current values and forgets all
    /// errors and dirty flags. Setting the current version again is a no-op.
    pub fn set_version(&self, version: u64) -> FormResult<()> {
        self.transition("changing form version", |state| {
            if state.version == version {
                return None;
            }
            debug!(from = state.version, to = version, "form version changed, rebasing");
            state.version = version;
            state.baseline = state.data.values.clone();
            Some(reducer::reset_tracking(&state.data))
        })?;
        Ok(())
    }

    /// Rewrites the values dirtiness is judged against. Existing dirty flags
    /// are left as they are until their fields change again.
    pub fn update_initial_data(&self, mapper: impl FnOnce(&V) -> V) -> FormResult<()> {
        let mut state = write_lock(&self.state, "updating initial data")?;
        state.baseline = mapper(&state.baseline);
        Ok(())
    }

    pub fn clear_errors<F>(&self, field: &F) -> FormResult<()>
    where
        F: HasFieldPath + ?Sized,
    {
        self.transition("clearing errors", |state| {
            Some(reducer::clear_errors(&state.data, field))
        })?;
        Ok(())
    }

    /// A field is required when its validators reject the value type's default.
    pub fn is_required<L>(&self, lens: &L) -> FormResult<bool>
    where
        L: FieldLens<V>,
        L::Value: Default,
    {
        let Some(validation) = read_lock(&self.validators, "reading validators for required check")?
            .get(lens.path().as_str())
            .cloned()
        else {
            return Ok(false);
        };
        let mut probe = read_lock(&self.state, "reading values for required check")?
            .data
            .values
            .clone();
        lens.set(&mut probe, L::Value::default());
        Ok(!matches!(evaluate(&validation, &probe), Outcome::Ready(None)))
    }

    /// Detaches the session: from now on nothing is stored or reported.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn same<T>(&self, left: &T, right: &T) -> bool
    where
        T: PartialEq + 'static,
    {
        self.options
            .comparator
            .as_ref()
            .and_then(|comparator| comparator(left as &dyn Any, right as &dyn Any))
            .unwrap_or_else(|| left == right)
    }

    fn apply_field_result<L>(
        &self,
        lens: &L,
        value: L::Value,
        error: Option<ErrorMessage>,
    ) -> FormResult<()>
    where
        L: FieldLens<V>,
    {
        let path = lens.path();
        let (current, baseline, had_error) = {
            let state = read_lock(&self.state, "reading field before update")?;
            (
                lens.get(&state.data.values).clone(),
                lens.get(&state.baseline).clone(),
                state.data.errors.contains_key(path.as_str()),
            )
        };
        // No lock is held while the comparator runs.
        let unchanged = self.same(&current, &value);
        let newly_failing = error.is_some() && !had_error;
        if unchanged && !newly_failing {
            trace!(field = %path, "field update suppressed");
            return Ok(());
        }
        let dirty = !self.same(&value, &baseline);
        self.transition("applying field update", |state| {
            Some(reducer::update_field(&state.data, lens, value, dirty, error))
        })?;
        Ok(())
    }

    /// Computes and stores the next snapshot under the state lock, then
    /// reports it. Returns the stored snapshot, if any.
    fn transition(
        &self,
        context: &'static str,
        f: impl FnOnce(&mut FormState<V>) -> Option<FormData<V>>,
    ) -> FormResult<Option<FormData<V>>> {
        if !self.is_mounted() {
            trace!(context, "form unmounted, dropping update");
            return Ok(None);
        }
        let next = {
            let mut state = write_lock(&self.state, context)?;
            let Some(next) = f(&mut state) else {
                return Ok(None);
            };
            state.data = next.clone();
            next
        };
        self.notify_change(next.clone())?;
        Ok(Some(next))
    }

    fn notify_change(&self, data: FormData<V>) -> FormResult<()> {
        let callback = read_lock(&self.callbacks, "reading change callback")?
            .on_change
            .clone();
        if let Some(callback) = callback {
            callback(data);
        }
        Ok(())
    }

    fn notify_submit_failed(&self, error: SubmitError, data: FormData<V>) -> FormResult<()> {
        if !self.is_mounted() {
            return Ok(());
        }
        let callback = read_lock(&self.callbacks, "reading submit failure callback")?
            .on_submit_failed
            .clone();
        if let Some(callback) = callback {
            callback(error, data);
        }
        Ok(())
    }

    fn notify_submit_finished(&self, data: FormData<V>) -> FormResult<()> {
        if !self.is_mounted() {
            return Ok(());
        }
        let callback = read_lock(&self.callbacks, "reading submit finished callback")?
            .on_submit_finished
            .clone();
        if let Some(callback) = callback {
            callback(data);
        }
        Ok(())
    }
}

/// Clears the submitting flag if a submit task is dropped before it completes.
struct SubmitGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    form: Option<Form<V>>,
}

impl<V> SubmitGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn new(form: Form<V>) -> Self {
        Self { form: Some(form) }
    }

    fn disarm(&mut self) {
        self.form = None;
    }
}

impl<V> Drop for SubmitGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        debug!("submit task dropped before completion");
        let reset = form.transition("abandoning submit", |state| {
            state
                .data
                .is_submitting
                .then(|| reducer::set_submitting(&state.data, false))
        });
        if let Err(error) = reset {
            debug!(%error, "could not clear submitting flag");
        }
    }
}

/// Pure form of [`Form::clear_errors`].
pub fn clear_errors<V, F>(data: &FormData<V>, field: &F) -> FormData<V>
where
    V: Clone,
    F: HasFieldPath + ?Sized,
{
    reducer::clear_errors(data, field)
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
