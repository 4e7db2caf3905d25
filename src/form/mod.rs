//! Create/edit dialogs: field models, validation and submission.

pub mod controller;
pub mod errors;
pub mod model;
pub mod rules;

pub use controller::{
    FormMode, FormSnapshot, FormState, Rejection, SessionId, SubmitAttempt, SubmitResult,
    SubmitTicket, ValidatedFormController,
};
pub use errors::{ErrorDistributor, FieldErrors, GLOBAL_KEY, distribute};
pub use model::{FieldValue, FormModel, unknown_field};
