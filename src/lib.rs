//! Headless form state.
//!
//! A [`form::Form`] session owns the current [`form::FormData`] snapshot,
//! runs field validators (synchronous or asynchronous) on change, blur and
//! submit, and reports every new snapshot to its owner. Fields are addressed by
//! typed lenses generated with `#[derive(FormModel)]`.

pub mod form;
pub mod prelude;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use form::{
    ErrorMessage, FieldBinding, FieldLens, FieldPath, FieldValidation, Form, FormData, FormError,
    FormModel, FormOptions, FormResult, FormTask, FormValidation, SubmitError, Trigger,
    clear_errors, initial_data, is_validation_error, not_submittable,
};
