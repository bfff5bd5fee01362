//! Form state management and form structs

use super::field::{ControlStatus, FieldKind, FormField};
use super::group::{FormArray, FormGroup, SubmitOutcome};
use crate::draft::{DraftSnapshot, DraftSpec};
use crate::validation::{EmailIsUnique, FieldValue, Rule};
use std::sync::Arc;
use tokio::sync::watch;

/// Minimum password length for both forms
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Roles offered by the signup form
pub const ROLES: &[&str] = &["student", "teacher", "employee", "founder", "other"];

/// Which form is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormKind {
    #[default]
    Login,
    Signup,
}

impl FormKind {
    pub fn draft_key(&self) -> &'static str {
        match self {
            Self::Login => "saved-login-form",
            Self::Signup => "saved-signup-form",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Signup",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::Login => Self::Signup,
            Self::Signup => Self::Login,
        }
    }

    /// Draft spec persisting only the email field
    pub fn default_draft_spec(&self) -> DraftSpec {
        DraftSpec::new(self.draft_key(), vec!["email".to_string()])
    }
}

/// Trait for common form operations
pub trait Form {
    fn controls(&self) -> &FormGroup;
    fn controls_mut(&mut self) -> &mut FormGroup;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    /// Sender side of the form's value stream
    fn changes(&self) -> &watch::Sender<FieldValue>;

    fn field_count(&self) -> usize {
        self.controls().field_paths().len()
    }

    fn active_path(&self) -> Option<String> {
        self.controls()
            .field_paths()
            .into_iter()
            .nth(self.active_field())
    }

    fn get_active_field(&self) -> Option<&FormField> {
        let path = self.active_path()?;
        self.controls().get_field(&path)
    }

    /// Leaving a field marks it touched
    fn blur_active(&mut self) {
        if let Some(path) = self.active_path() {
            self.controls_mut().mark_touched(&path);
        }
    }

    fn next_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        self.blur_active();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }

    fn prev_field(&mut self) {
        let count = self.field_count();
        if count == 0 {
            return;
        }
        self.blur_active();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }

    /// Publish the current value to observers
    fn notify(&self) {
        self.changes().send_replace(self.controls().value());
    }

    /// Subscribe to value changes; the current value counts as already seen
    fn value_changes(&self) -> watch::Receiver<FieldValue> {
        self.changes().subscribe()
    }

    /// Apply a user edit to the focused field, publishing the new value if it changed
    fn edit_active(&mut self, edit: impl FnOnce(&mut FormField) -> bool) -> bool
    where
        Self: Sized,
    {
        let Some(path) = self.active_path() else {
            return false;
        };
        let changed = self.controls_mut().edit_field(&path, edit);
        if changed {
            self.notify();
        }
        changed
    }

    fn reset(&mut self) {
        self.controls_mut().reset();
        self.set_active_field(0);
        self.notify();
    }

    fn value(&self) -> FieldValue {
        self.controls().value()
    }

    fn status(&self) -> ControlStatus {
        self.controls().status()
    }
}

fn seeded(mut controls: FormGroup, seed: Option<&DraftSnapshot>) -> FormGroup {
    if let Some(snapshot) = seed {
        snapshot.seed(&mut controls);
    }
    controls
}

fn password_field(name: &str, label: &str) -> FormField {
    FormField::secret(name, label)
        .with_rules(vec![Rule::Required, Rule::MinLength(MIN_PASSWORD_LENGTH)])
}

// Login Form
#[derive(Debug)]
pub struct LoginForm {
    pub controls: FormGroup,
    pub active_field_index: usize,
    changes: watch::Sender<FieldValue>,
}

impl LoginForm {
    pub fn new(seed: Option<&DraftSnapshot>) -> Self {
        let controls = FormGroup::new()
            .field(FormField::text("email", "Email").with_rules(vec![
                Rule::Email,
                Rule::Required,
                Rule::Async(Arc::new(EmailIsUnique::default())),
            ]))
            .field(FormField::secret("password", "Password").with_rules(vec![
                Rule::Required,
                Rule::MinLength(MIN_PASSWORD_LENGTH),
                Rule::must_contain_question_mark(),
            ]));
        let controls = seeded(controls, seed);
        let (changes, _) = watch::channel(controls.value());
        Self {
            controls,
            active_field_index: 0,
            changes,
        }
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Form for LoginForm {
    fn controls(&self) -> &FormGroup {
        &self.controls
    }
    fn controls_mut(&mut self) -> &mut FormGroup {
        &mut self.controls
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.field_count().saturating_sub(1));
    }
    fn changes(&self) -> &watch::Sender<FieldValue> {
        &self.changes
    }
}

// Signup Form
#[derive(Debug)]
pub struct SignupForm {
    pub controls: FormGroup,
    pub active_field_index: usize,
    changes: watch::Sender<FieldValue>,
}

impl SignupForm {
    pub fn new(seed: Option<&DraftSnapshot>) -> Self {
        let passwords = FormGroup::new()
            .field(password_field("password", "Password"))
            .field(password_field("confirmPassword", "Confirm Password"))
            .with_rules(vec![Rule::equal_values("password", "confirmPassword")]);

        let address = FormGroup::new()
            .field(FormField::text("addressStreet", "Street").with_rules(vec![Rule::Required]))
            .field(FormField::text("addressNumber", "Number").with_rules(vec![Rule::Required]))
            .field(
                FormField::text("addressPostalCode", "Postal Code")
                    .with_rules(vec![Rule::Required]),
            )
            .field(FormField::text("addressCity", "City").with_rules(vec![Rule::Required]));

        let source = FormArray::new(vec![
            FormField::checkbox("0", "Found us via Google"),
            FormField::checkbox("1", "Referred by a friend"),
            FormField::checkbox("2", "Other"),
        ]);

        let controls = FormGroup::new()
            .field(
                FormField::text("email", "Email").with_rules(vec![Rule::Email, Rule::Required]),
            )
            .group("passwords", passwords)
            .field(FormField::text("firstName", "First Name").with_rules(vec![Rule::Required]))
            .field(FormField::text("lastName", "Last Name").with_rules(vec![Rule::Required]))
            .group("address", address)
            .field(FormField::select("role", "Role", ROLES).with_rules(vec![Rule::Required]))
            .array("source", source)
            .field(
                FormField::checkbox("agree", "I agree to the terms and conditions")
                    .with_rules(vec![Rule::Required]),
            );
        let controls = seeded(controls, seed);
        let (changes, _) = watch::channel(controls.value());
        Self {
            controls,
            active_field_index: 0,
            changes,
        }
    }
}

impl Default for SignupForm {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Form for SignupForm {
    fn controls(&self) -> &FormGroup {
        &self.controls
    }
    fn controls_mut(&mut self) -> &mut FormGroup {
        &mut self.controls
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.field_count().saturating_sub(1));
    }
    fn changes(&self) -> &watch::Sender<FieldValue> {
        &self.changes
    }
}

/// Enum representing the form currently shown
#[derive(Debug)]
pub enum FormState {
    Login(LoginForm),
    Signup(SignupForm),
}

impl Default for FormState {
    fn default() -> Self {
        FormState::Login(LoginForm::default())
    }
}

macro_rules! dispatch {
    ($state:expr, $form:ident => $body:expr) => {
        match $state {
            FormState::Login($form) => $body,
            FormState::Signup($form) => $body,
        }
    };
}

impl FormState {
    pub fn new(kind: FormKind, seed: Option<&DraftSnapshot>) -> Self {
        match kind {
            FormKind::Login => FormState::Login(LoginForm::new(seed)),
            FormKind::Signup => FormState::Signup(SignupForm::new(seed)),
        }
    }

    pub fn kind(&self) -> FormKind {
        match self {
            FormState::Login(_) => FormKind::Login,
            FormState::Signup(_) => FormKind::Signup,
        }
    }

    pub fn controls(&self) -> &FormGroup {
        dispatch!(self, f => f.controls())
    }

    pub fn active_field(&self) -> usize {
        dispatch!(self, f => f.active_field())
    }

    pub fn active_path(&self) -> Option<String> {
        dispatch!(self, f => f.active_path())
    }

    pub fn next_field(&mut self) {
        dispatch!(self, f => f.next_field())
    }

    pub fn prev_field(&mut self) {
        dispatch!(self, f => f.prev_field())
    }

    pub fn edit_active(&mut self, edit: impl FnOnce(&mut FormField) -> bool) -> bool {
        dispatch!(self, f => f.edit_active(edit))
    }

    pub fn value_changes(&self) -> watch::Receiver<FieldValue> {
        dispatch!(self, f => f.value_changes())
    }

    pub fn reset(&mut self) {
        dispatch!(self, f => f.reset())
    }

    pub fn status(&self) -> ControlStatus {
        dispatch!(self, f => f.status())
    }

    /// Resolve pending async rules of every field
    pub async fn settle(&mut self) {
        dispatch!(self, f => f.controls_mut().settle().await)
    }

    /// Settle async rules, then accept or reject the whole form
    pub async fn submit(&mut self) -> SubmitOutcome {
        let kind = self.kind();
        let outcome = dispatch!(self, f => f.controls_mut().submit().await);
        match &outcome {
            SubmitOutcome::Accepted(_) => {
                let controls = self.controls();
                let values: Vec<String> = controls
                    .field_paths()
                    .into_iter()
                    .filter_map(|path| {
                        let field = controls.get_field(&path)?;
                        (field.kind != FieldKind::Secret)
                            .then(|| format!("{path}={}", field.display_value()))
                    })
                    .collect();
                tracing::info!(form = kind.title(), ?values, "Form submitted");
            }
            SubmitOutcome::Rejected { invalid } => {
                tracing::info!(form = kind.title(), ?invalid, "Invalid form");
            }
        }
        outcome
    }
}
