mod binding;
mod controller;
mod data;
mod evaluate;
mod path;
pub mod reducer;
mod validation;

#[cfg(test)]
mod tests;

pub use binding::FieldBinding;
pub use controller::{
    BoxError, Comparator, Form, FormError, FormOptions, FormResult, FormTask, SubmitError,
    clear_errors, is_validation_error,
};
pub use data::{ErrorMessage, FormData, initial_data, not_submittable};
pub use evaluate::{evaluate, evaluate_trigger, validate_all};
pub use morfi_derive::FormModel;
pub use path::{FieldLens, FieldPath, FormModel, HasFieldPath, Root, Then};
pub use validation::{
    FieldValidation, FieldValidators, FormValidation, Outcome, Trigger, Validation, Validator,
};
