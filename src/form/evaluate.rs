use futures::future::{FutureExt, join_all};
use tracing::trace;

use super::data::FormData;
use super::reducer;
use super::validation::{FieldValidation, FieldValidators, Outcome, Trigger, Validation};

/// Runs every validator of a field in [`Trigger::ALL`] order.
///
/// The first synchronous error wins outright and any futures collected so far
/// are dropped unpolled. Otherwise pending results are awaited together and the
/// first error in trigger order is reported.
pub fn evaluate<T: 'static>(validators: &FieldValidation<T>, value: &T) -> Validation {
    let mut pending = Vec::new();
    for trigger in Trigger::ALL {
        let Some(validator) = validators.get(trigger) else {
            continue;
        };
        match validator(value) {
            Outcome::Ready(Some(error)) => {
                if !pending.is_empty() {
                    trace!(
                        ?trigger,
                        abandoned = pending.len(),
                        "sync error wins over pending validators"
                    );
                }
                return Outcome::Ready(Some(error));
            }
            Outcome::Ready(None) => {}
            Outcome::Pending(future) => pending.push(future),
        }
    }

    if pending.is_empty() {
        return Outcome::Ready(None);
    }
    Outcome::Pending(
        join_all(pending)
            .map(|results| results.into_iter().flatten().next())
            .boxed(),
    )
}

/// Runs only the validator registered for `trigger`.
pub fn evaluate_trigger<T: 'static>(
    validators: &FieldValidation<T>,
    trigger: Trigger,
    value: &T,
) -> Validation {
    match validators.get(trigger) {
        Some(validator) => validator(value),
        None => Outcome::Ready(None),
    }
}

/// Validates every registered field of `data`.
///
/// Errors are only ever added here: a field that turns out valid keeps
/// whatever error it already had.
pub fn validate_all<V>(data: &FormData<V>, validators: &FieldValidators<V>) -> Outcome<FormData<V>>
where
    V: Clone + Send + Sync + 'static,
{
    let mut next = data.clone();
    let mut pending = Vec::new();

    for (path, validation) in validators.iter() {
        match evaluate(validation, &data.values) {
            Outcome::Ready(Some(error)) => {
                next.errors.insert(path.clone(), error);
            }
            Outcome::Ready(None) => {}
            Outcome::Pending(future) => {
                let path = path.clone();
                pending.push(future.map(move |error| (path, error)));
            }
        }
    }

    if pending.is_empty() {
        return Outcome::Ready(reducer::finalize(next));
    }

    trace!(pending = pending.len(), "awaiting async field validations");
    Outcome::pending(async move {
        for (path, error) in join_all(pending).await {
            if let Some(error) = error {
                next.errors.insert(path, error);
            }
        }
        reducer::finalize(next)
    })
}
