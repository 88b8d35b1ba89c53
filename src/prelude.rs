pub use crate::form::{
    ErrorMessage, FieldBinding, FieldLens, FieldPath, FieldValidation, Form, FormData, FormError,
    FormModel, FormOptions, FormResult, FormTask, FormValidation, HasFieldPath, SubmitError,
    Trigger, Validation, initial_data, is_validation_error, not_submittable,
};
