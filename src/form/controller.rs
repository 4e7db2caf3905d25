//! One create/edit dialog: values, touched fields, errors and submission.
//!
//! Errors shown to the user are written in three places only:
//! - when a debounced re-validation fires (touched fields only)
//! - when a field is blurred (that field only)
//! - when a submit is attempted or finishes
//!
//! Each `open` starts a new session. Submit outcomes carry the session they
//! were issued for and are ignored once that session has ended.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use super::errors::{ErrorDistributor, FieldErrors};
use super::model::{FieldValue, FormModel, unknown_field};
use crate::api::{ApiFailure, EntityEndpoint, FailureKind};
use crate::context::ConsoleContext;
use crate::debounce::Debouncer;
use crate::error::{Result, VitrineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Clean,
    Validating,
    Submitting,
    SubmitFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Values at open time and now. `initial` is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSnapshot<M> {
    initial: M,
    current: M,
}

impl<M: PartialEq + Clone> FormSnapshot<M> {
    pub fn new(initial: M) -> Self {
        Self {
            current: initial.clone(),
            initial,
        }
    }

    pub fn initial(&self) -> &M {
        &self.initial
    }

    pub fn current(&self) -> &M {
        &self.current
    }

    pub fn is_dirty(&self) -> bool {
        self.initial != self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session {}", self.0)
    }
}

/// A submit the host must send: create or update with `payload`, then hand
/// the outcome to `finish_submit` with `session`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket<P> {
    pub session: SessionId,
    pub mode: FormMode,
    pub payload: P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Client validation failed; every field now shows its errors.
    Invalid,
    /// Nothing changed since the dialog opened.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAttempt<P> {
    Dispatched(SubmitTicket<P>),
    Rejected(Rejection),
    /// A submit is already in flight.
    InFlight,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult<T> {
    /// Saved. The caller closes the dialog and refreshes its list.
    Saved(T),
    /// The dialog stays open showing the redistributed errors.
    Failed(FailureKind),
    Rejected(Rejection),
    /// The outcome arrived for a session that has ended, or no submit ran.
    Ignored,
}

#[derive(Debug)]
struct Dialog<M> {
    session: SessionId,
    mode: FormMode,
    snapshot: FormSnapshot<M>,
    touched: BTreeSet<String>,
    errors: FieldErrors,
    state: FormState,
}

pub struct ValidatedFormController<M: FormModel> {
    validation_delay: Duration,
    last_session: u64,
    dialog: Option<Dialog<M>>,
    revalidate: Debouncer<()>,
    distributor: ErrorDistributor,
}

impl<M: FormModel> ValidatedFormController<M> {
    pub fn new(ctx: &ConsoleContext) -> Self {
        Self {
            validation_delay: ctx.validation_delay(),
            last_session: 0,
            dialog: None,
            revalidate: Debouncer::new(),
            distributor: ErrorDistributor::new(M::FIELDS).with_composite(M::COMPOSITE_FIELD),
        }
    }

    /// Start a new session on `initial`. Anything left from a previous
    /// session (errors, touched fields, a pending validation) is dropped.
    pub fn open(&mut self, mode: FormMode, initial: M) -> SessionId {
        self.revalidate.cancel();
        self.last_session += 1;
        let session = SessionId(self.last_session);
        debug!(%session, ?mode, "form opened");

        self.dialog = Some(Dialog {
            session,
            mode,
            snapshot: FormSnapshot::new(initial),
            touched: BTreeSet::new(),
            errors: FieldErrors::new(),
            state: FormState::Clean,
        });
        session
    }

    pub fn close(&mut self) {
        self.revalidate.cancel();
        if let Some(dialog) = self.dialog.take() {
            debug!(session = %dialog.session, "form closed");
        }
    }

    /// Change one field and schedule a re-validation.
    pub fn set_field_value(
        &mut self,
        field: &str,
        value: impl Into<FieldValue>,
        now: Instant,
    ) -> Result<()> {
        let dialog = self.dialog.as_mut().ok_or(VitrineError::FormClosed)?;
        if !is_model_field::<M>(field) {
            return Err(unknown_field(field));
        }

        dialog.snapshot.current.set_field(field, value.into())?;
        if dialog.state != FormState::Submitting {
            dialog.state = FormState::Validating;
        }
        self.revalidate.schedule((), self.validation_delay, now);
        Ok(())
    }

    /// Run a due re-validation. Errors are rewritten for touched fields only.
    /// Returns whether one ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.revalidate.poll(now).is_none() {
            return false;
        }
        let Some(dialog) = self.dialog.as_mut() else {
            return false;
        };

        let all = dialog.snapshot.current.validate();
        for field in &dialog.touched {
            dialog.errors.set(field, messages_for(&all, field));
        }
        if dialog.state == FormState::Validating {
            dialog.state = FormState::Clean;
        }
        true
    }

    /// Mark `field` touched and show its current errors right away.
    pub fn blur_field(&mut self, field: &str) -> Result<()> {
        let dialog = self.dialog.as_mut().ok_or(VitrineError::FormClosed)?;
        if !is_model_field::<M>(field) {
            return Err(unknown_field(field));
        }

        dialog.touched.insert(field.to_string());
        let all = dialog.snapshot.current.validate();
        dialog.errors.set(field, messages_for(&all, field));
        Ok(())
    }

    /// Client validation of the current values. Does not change what is
    /// displayed.
    pub fn validate(&self) -> FieldErrors {
        self.dialog
            .as_ref()
            .map(|dialog| dialog.snapshot.current.validate())
            .unwrap_or_default()
    }

    pub fn can_submit(&self) -> bool {
        self.dialog.as_ref().is_some_and(|dialog| {
            dialog.state != FormState::Submitting
                && dialog.snapshot.is_dirty()
                && dialog.snapshot.current.validate().is_empty()
        })
    }

    /// Try to submit. When the form cannot be submitted every field is
    /// touched and shows its errors, and nothing is dispatched.
    pub fn submit(&mut self) -> SubmitAttempt<M::Payload> {
        let can_submit = self.can_submit();
        let Some(dialog) = self.dialog.as_mut() else {
            return SubmitAttempt::Closed;
        };
        if dialog.state == FormState::Submitting {
            return SubmitAttempt::InFlight;
        }

        if !can_submit {
            let all = dialog.snapshot.current.validate();
            for field in M::FIELDS {
                dialog.touched.insert((*field).to_string());
                dialog.errors.set(field, messages_for(&all, field));
            }
            let rejection = if all.is_empty() {
                Rejection::Unchanged
            } else {
                Rejection::Invalid
            };
            debug!(session = %dialog.session, ?rejection, "submit rejected");
            return SubmitAttempt::Rejected(rejection);
        }

        self.revalidate.cancel();
        dialog.state = FormState::Submitting;
        dialog.errors = FieldErrors::new();
        debug!(session = %dialog.session, mode = ?dialog.mode, "submit dispatched");

        SubmitAttempt::Dispatched(SubmitTicket {
            session: dialog.session,
            mode: dialog.mode,
            payload: dialog.snapshot.current.to_payload(),
        })
    }

    /// Apply the outcome of a dispatched submit. Outcomes for a session that
    /// was closed or replaced are ignored.
    pub fn finish_submit<T>(
        &mut self,
        session: SessionId,
        outcome: std::result::Result<T, ApiFailure>,
    ) -> SubmitResult<T> {
        let Some(dialog) = self
            .dialog
            .as_mut()
            .filter(|dialog| dialog.session == session && dialog.state == FormState::Submitting)
        else {
            debug!(%session, "ignoring submit outcome for an ended session");
            return SubmitResult::Ignored;
        };

        match outcome {
            Ok(entity) => {
                dialog.state = FormState::Clean;
                debug!(%session, "submit succeeded");
                SubmitResult::Saved(entity)
            }
            Err(failure) => {
                warn!(%session, error = %failure, "submit failed");
                dialog.errors = match &failure {
                    ApiFailure::Validation { payload, .. } => self.distributor.distribute(payload),
                    other => FieldErrors::global_message(other.user_message()),
                };
                dialog.state = FormState::SubmitFailed;
                SubmitResult::Failed(failure.kind())
            }
        }
    }

    /// Submit against `endpoint` and apply the outcome.
    pub async fn submit_to<E>(&mut self, endpoint: &E) -> SubmitResult<E::Entity>
    where
        E: EntityEndpoint<M::Payload>,
    {
        let ticket = match self.submit() {
            SubmitAttempt::Dispatched(ticket) => ticket,
            SubmitAttempt::Rejected(rejection) => return SubmitResult::Rejected(rejection),
            SubmitAttempt::InFlight | SubmitAttempt::Closed => return SubmitResult::Ignored,
        };

        let outcome = match ticket.mode {
            FormMode::Create => endpoint.create(&ticket.payload).await,
            FormMode::Edit(id) => endpoint.update(id, &ticket.payload).await,
        };
        self.finish_submit(ticket.session, outcome)
    }

    pub fn is_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.dialog.as_ref().map(|dialog| dialog.session)
    }

    pub fn state(&self) -> Option<FormState> {
        self.dialog.as_ref().map(|dialog| dialog.state)
    }

    pub fn mode(&self) -> Option<FormMode> {
        self.dialog.as_ref().map(|dialog| dialog.mode)
    }

    pub fn values(&self) -> Option<&M> {
        self.dialog.as_ref().map(|dialog| dialog.snapshot.current())
    }

    pub fn initial_values(&self) -> Option<&M> {
        self.dialog.as_ref().map(|dialog| dialog.snapshot.initial())
    }

    pub fn is_dirty(&self) -> bool {
        self.dialog
            .as_ref()
            .is_some_and(|dialog| dialog.snapshot.is_dirty())
    }

    /// Errors currently displayed.
    pub fn errors(&self) -> Option<&FieldErrors> {
        self.dialog.as_ref().map(|dialog| &dialog.errors)
    }

    pub fn field_errors(&self, field: &str) -> Option<&[String]> {
        self.errors().and_then(|errors| errors.get(field))
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.dialog
            .as_ref()
            .is_some_and(|dialog| dialog.touched.contains(field))
    }

    pub fn validation_deadline(&self) -> Option<Instant> {
        self.revalidate.deadline()
    }
}

fn is_model_field<M: FormModel>(field: &str) -> bool {
    M::FIELDS.contains(&field) || M::COMPOSITE_FIELD == Some(field)
}

fn messages_for(errors: &FieldErrors, field: &str) -> Vec<String> {
    errors.get(field).map(<[String]>::to_vec).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::GLOBAL_KEY;
    use crate::form::rules;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Coupon {
        code: String,
        percent: String,
    }

    impl FormModel for Coupon {
        type Payload = serde_json::Value;
        const FIELDS: &'static [&'static str] = &["code", "percent"];

        fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
            match field {
                "code" => self.code = value.into_text(field)?,
                "percent" => self.percent = value.into_text(field)?,
                _ => return Err(unknown_field(field)),
            }
            Ok(())
        }

        fn validate(&self) -> FieldErrors {
            let mut errors = FieldErrors::new();
            if rules::is_blank(&self.code) {
                errors.push("code", "Code is required.");
            }
            match rules::number(&self.percent) {
                rules::Number::Missing => errors.push("percent", "Percent is required."),
                rules::Number::Invalid => errors.push("percent", "Percent must be a number."),
                rules::Number::Value(_) => {}
            }
            errors
        }

        fn to_payload(&self) -> serde_json::Value {
            json!({"code": self.code.trim(), "percent": self.percent})
        }
    }

    fn valid() -> Coupon {
        Coupon {
            code: "SPRING".into(),
            percent: "10".into(),
        }
    }

    fn controller() -> ValidatedFormController<Coupon> {
        ValidatedFormController::new(&ConsoleContext::new())
    }

    #[test]
    fn test_open_starts_clean() {
        let mut form = controller();
        form.open(FormMode::Edit(4), valid());
        assert_eq!(form.state(), Some(FormState::Clean));
        assert!(!form.is_dirty());
        assert!(!form.can_submit());
        assert_eq!(form.errors(), Some(&FieldErrors::new()));
    }

    #[test]
    fn test_edits_validate_only_touched_fields() {
        let mut form = controller();
        let start = Instant::now();
        form.open(FormMode::Edit(4), valid());

        form.set_field_value("code", "", start).unwrap();
        form.set_field_value("percent", "ten", start).unwrap();
        assert_eq!(form.state(), Some(FormState::Validating));
        assert!(!form.tick(start + Duration::from_millis(299)));
        assert!(form.tick(start + Duration::from_millis(300)));
        assert_eq!(form.state(), Some(FormState::Clean));
        assert!(form.errors().unwrap().is_empty());

        form.blur_field("percent").unwrap();
        assert_eq!(form.field_errors("percent").unwrap(), ["Percent must be a number."]);
        assert!(form.field_errors("code").is_none());

        form.set_field_value("percent", "15", start).unwrap();
        form.tick(start + Duration::from_secs(1));
        assert!(form.field_errors("percent").is_none());
    }

    #[test]
    fn test_unknown_field_and_closed_form() {
        let mut form = controller();
        assert!(matches!(
            form.set_field_value("code", "x", Instant::now()),
            Err(VitrineError::FormClosed)
        ));
        form.open(FormMode::Create, Coupon::default());
        assert!(matches!(
            form.blur_field("colour"),
            Err(VitrineError::UnknownField(_))
        ));
    }

    #[test]
    fn test_invalid_submit_touches_everything() {
        let mut form = controller();
        form.open(FormMode::Create, Coupon::default());
        form.set_field_value("code", "X", Instant::now()).unwrap();

        assert_eq!(form.submit(), SubmitAttempt::Rejected(Rejection::Invalid));
        assert!(form.is_touched("code"));
        assert!(form.is_touched("percent"));
        assert_eq!(form.field_errors("percent").unwrap(), ["Percent is required."]);
        assert!(form.field_errors("code").is_none());
    }

    #[test]
    fn test_unchanged_submit_is_rejected() {
        let mut form = controller();
        form.open(FormMode::Edit(1), valid());
        assert_eq!(form.submit(), SubmitAttempt::Rejected(Rejection::Unchanged));
    }

    #[test]
    fn test_submit_dispatches_ticket_and_blocks_second_submit() {
        let mut form = controller();
        let session = form.open(FormMode::Edit(9), valid());
        form.set_field_value("percent", "20", Instant::now()).unwrap();

        let SubmitAttempt::Dispatched(ticket) = form.submit() else {
            panic!("expected a dispatched submit");
        };
        assert_eq!(ticket.session, session);
        assert_eq!(ticket.mode, FormMode::Edit(9));
        assert_eq!(ticket.payload, json!({"code": "SPRING", "percent": "20"}));
        assert_eq!(form.state(), Some(FormState::Submitting));
        assert!(form.validation_deadline().is_none());
        assert!(!form.can_submit());
        assert_eq!(form.submit(), SubmitAttempt::InFlight);

        let result = form.finish_submit(session, Ok("saved"));
        assert_eq!(result, SubmitResult::Saved("saved"));
        assert_eq!(form.state(), Some(FormState::Clean));
    }

    #[test]
    fn test_validation_failure_is_distributed() {
        let mut form = controller();
        let session = form.open(FormMode::Create, Coupon::default());
        form.set_field_value("code", "DUP", Instant::now()).unwrap();
        form.set_field_value("percent", "5", Instant::now()).unwrap();
        form.submit();

        let failure = ApiFailure::Validation {
            status: 422,
            payload: json!({"message": "Invalid data", "errors": {"code": ["Code already exists."]}}),
        };
        let result: SubmitResult<()> = form.finish_submit(session, Err(failure));
        assert_eq!(result, SubmitResult::Failed(FailureKind::ValidationFailure));
        assert_eq!(form.state(), Some(FormState::SubmitFailed));
        assert_eq!(form.field_errors("code").unwrap(), ["Code already exists."]);
        assert_eq!(form.field_errors(GLOBAL_KEY).unwrap(), ["Invalid data"]);
        assert_eq!(form.values().unwrap().code, "DUP");
    }

    #[test]
    fn test_server_failure_becomes_one_global_message() {
        let mut form = controller();
        let session = form.open(FormMode::Create, Coupon::default());
        form.set_field_value("code", "NEW", Instant::now()).unwrap();
        form.set_field_value("percent", "5", Instant::now()).unwrap();
        form.submit();

        let failure = ApiFailure::Server {
            status: 500,
            message: crate::api::GENERIC_FAILURE_MESSAGE.to_string(),
        };
        let result: SubmitResult<()> = form.finish_submit(session, Err(failure));
        assert_eq!(result, SubmitResult::Failed(FailureKind::ServerFailure));
        let errors = form.errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first(GLOBAL_KEY),
            Some("Unexpected error. Please try again later.")
        );
    }

    #[test]
    fn test_outcome_after_close_or_reopen_is_ignored() {
        let mut form = controller();
        let session = form.open(FormMode::Create, Coupon::default());
        form.set_field_value("code", "A1", Instant::now()).unwrap();
        form.set_field_value("percent", "5", Instant::now()).unwrap();
        form.submit();

        form.close();
        assert_eq!(form.finish_submit(session, Ok(1)), SubmitResult::Ignored);

        let reopened = form.open(FormMode::Create, Coupon::default());
        assert_ne!(reopened, session);
        let failure = ApiFailure::Network("late".into());
        let result: SubmitResult<()> = form.finish_submit(session, Err(failure));
        assert_eq!(result, SubmitResult::Ignored);
        assert!(form.errors().unwrap().is_empty());
        assert_eq!(form.state(), Some(FormState::Clean));
    }

    #[test]
    fn test_close_cancels_pending_validation() {
        let mut form = controller();
        let start = Instant::now();
        form.open(FormMode::Create, Coupon::default());
        form.set_field_value("code", "Z", start).unwrap();
        form.close();
        assert!(form.validation_deadline().is_none());
        assert!(!form.tick(start + Duration::from_secs(1)));
    }
}
