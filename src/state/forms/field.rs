//! Form field controls

use crate::validation::{run_async, run_sync, FieldValue, Rule, ValidationResult};

/// Input widget a field is edited with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Text that is masked when displayed
    Secret,
    Checkbox,
    /// One of a fixed set of options, cycled with left/right
    Select { options: Vec<String> },
}

/// Interaction flags and current validation outcome of a control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    /// The field has lost focus at least once
    pub touched: bool,
    /// The user has changed the value
    pub dirty: bool,
    pub result: ValidationResult,
    /// Async rules have not reported for the current value yet
    pub pending: bool,
}

/// Aggregate validity of a control or form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    Valid,
    Invalid,
    Pending,
}

impl FieldState {
    pub fn status(&self) -> ControlStatus {
        if self.result.is_invalid() {
            ControlStatus::Invalid
        } else if self.pending {
            ControlStatus::Pending
        } else {
            ControlStatus::Valid
        }
    }
}

/// Represents a single form field with its rules, value and state
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    value: FieldValue,
    initial: FieldValue,
    rules: Vec<Rule>,
    state: FieldState,
}

impl FormField {
    fn new(name: &str, label: &str, kind: FieldKind, value: FieldValue) -> Self {
        let mut field = Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            initial: value.clone(),
            value,
            rules: Vec::new(),
            state: FieldState::default(),
        };
        field.revalidate();
        field
    }

    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text, FieldValue::default())
    }

    /// Create a new masked text field
    pub fn secret(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Secret, FieldValue::default())
    }

    /// Create a new checkbox, unchecked
    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Checkbox, FieldValue::Bool(false))
    }

    /// Create a new select field defaulting to the first option
    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        let first = options.first().copied().unwrap_or_default();
        Self::new(
            name,
            label,
            FieldKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            FieldValue::from(first),
        )
    }

    /// Replace the initial value (what `reset` returns to)
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self.initial = self.value.clone();
        self.revalidate();
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self.revalidate();
        self
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn status(&self) -> ControlStatus {
        self.state.status()
    }

    pub fn is_invalid(&self) -> bool {
        self.state.result.is_invalid()
    }

    /// Get the text value (returns empty string for checkboxes)
    pub fn as_text(&self) -> &str {
        self.value.as_text().unwrap_or_default()
    }

    fn is_textual(&self) -> bool {
        matches!(self.kind, FieldKind::Text | FieldKind::Secret)
    }

    /// Sync rules run now; async rules are left pending until `settle`
    fn revalidate(&mut self) {
        self.state.result = run_sync(&self.rules, &self.value);
        self.state.pending = self.rules.iter().any(Rule::is_async);
    }

    fn edit(&mut self, value: FieldValue) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        self.state.dirty = true;
        self.revalidate();
        true
    }

    /// Set the value without marking the field dirty
    pub fn set_value(&mut self, value: FieldValue) {
        self.value = value;
        self.revalidate();
    }

    /// Replace the value and the initial value, without marking the field dirty
    pub fn seed(&mut self, value: FieldValue) {
        self.initial = value.clone();
        self.set_value(value);
    }

    /// Push a character to a text value. Returns true if the value changed.
    pub fn push_char(&mut self, c: char) -> bool {
        if !self.is_textual() {
            return false;
        }
        let mut text = self.as_text().to_string();
        text.push(c);
        self.edit(FieldValue::Text(text))
    }

    /// Remove the last character from a text value
    pub fn pop_char(&mut self) -> bool {
        if !self.is_textual() {
            return false;
        }
        let mut text = self.as_text().to_string();
        if text.pop().is_none() {
            return false;
        }
        self.edit(FieldValue::Text(text))
    }

    /// Clear a text value
    pub fn clear(&mut self) -> bool {
        if !self.is_textual() {
            return false;
        }
        self.edit(FieldValue::default())
    }

    /// Flip a checkbox
    pub fn toggle(&mut self) -> bool {
        match (&self.kind, self.value.as_bool()) {
            (FieldKind::Checkbox, Some(checked)) => self.edit(FieldValue::Bool(!checked)),
            _ => false,
        }
    }

    /// Move a select field to the next or previous option (wraps around)
    pub fn cycle_option(&mut self, forward: bool) -> bool {
        let FieldKind::Select { options } = &self.kind else {
            return false;
        };
        if options.is_empty() {
            return false;
        }
        let current = options
            .iter()
            .position(|o| o == self.as_text())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else if current == 0 {
            options.len() - 1
        } else {
            current - 1
        };
        let value = FieldValue::from(options[next].as_str());
        self.edit(value)
    }

    /// Record that the field lost focus
    pub fn mark_touched(&mut self) {
        self.state.touched = true;
    }

    /// Return to the initial value with fresh interaction flags
    pub fn reset(&mut self) {
        self.value = self.initial.clone();
        self.state = FieldState::default();
        self.revalidate();
    }

    /// Run async rules for the current value and merge their reasons
    pub async fn settle(&mut self) {
        if !self.state.pending {
            return;
        }
        let deferred = run_async(&self.rules, &self.value).await;
        if deferred.is_invalid() {
            tracing::debug!(field = %self.name, result = ?deferred, "async validation failed");
        }
        self.state.result = std::mem::take(&mut self.state.result).merge(deferred);
        self.state.pending = false;
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match (&self.kind, &self.value) {
            (FieldKind::Secret, FieldValue::Text(s)) => "•".repeat(s.chars().count()),
            (FieldKind::Checkbox, FieldValue::Bool(true)) => "[x]".to_string(),
            (FieldKind::Checkbox, _) => "[ ]".to_string(),
            (FieldKind::Select { .. }, FieldValue::Text(s)) => format!("◀ {s} ▶"),
            (_, FieldValue::Text(s)) => s.clone(),
            (_, other) => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::asynchronous::MockAsyncValidator;
    use crate::validation::{EmailIsUnique, ValidationError, TAKEN_EMAIL};
    use std::sync::Arc;

    fn password() -> FormField {
        FormField::secret("password", "Password").with_rules(vec![
            Rule::Required,
            Rule::MinLength(6),
            Rule::must_contain_question_mark(),
        ])
    }

    fn type_text(field: &mut FormField, text: &str) {
        for c in text.chars() {
            field.push_char(c);
        }
    }

    mod construction {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_text_starts_empty_and_clean() {
            let field = FormField::text("email", "Email");
            assert_eq!(field.as_text(), "");
            assert!(!field.state().touched);
            assert!(!field.state().dirty);
            assert_eq!(field.status(), ControlStatus::Valid);
        }

        #[test]
        fn test_rules_are_evaluated_on_construction() {
            let field = password();
            assert!(field.state().result.has("required"));
            assert_eq!(field.status(), ControlStatus::Invalid);
        }

        #[test]
        fn test_select_defaults_to_first_option() {
            let field = FormField::select("role", "Role", &["student", "teacher"]);
            assert_eq!(field.as_text(), "student");
        }

        #[test]
        fn test_with_value_sets_initial() {
            let mut field = FormField::text("email", "Email").with_value("a@b.io");
            field.clear();
            field.reset();
            assert_eq!(field.as_text(), "a@b.io");
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_push_char_marks_dirty_and_revalidates() {
            let mut field = password();
            type_text(&mut field, "abc");
            assert!(field.state().dirty);
            let keys: Vec<_> = field.state().result.errors().map(|e| e.key()).collect();
            assert_eq!(keys, vec!["minLength", "doesNotContainQuestionMark"]);

            type_text(&mut field, "def?");
            assert!(field.state().result.is_valid());
        }

        #[test]
        fn test_pop_char_on_empty_is_noop() {
            let mut field = FormField::text("email", "Email");
            assert!(!field.pop_char());
            assert!(!field.state().dirty);
        }

        #[test]
        fn test_set_value_does_not_mark_dirty() {
            let mut field = FormField::text("email", "Email").with_rules(vec![Rule::Email]);
            field.set_value("a@b.io".into());
            assert!(!field.state().dirty);
            assert!(field.state().result.is_valid());
        }

        #[test]
        fn test_toggle_checkbox() {
            let mut field = FormField::checkbox("agree", "Agree").with_rules(vec![Rule::Required]);
            assert!(field.is_invalid());
            assert!(field.toggle());
            assert_eq!(field.value(), &FieldValue::Bool(true));
            assert!(!field.is_invalid());
        }

        #[test]
        fn test_toggle_ignored_for_text() {
            let mut field = FormField::text("email", "Email");
            assert!(!field.toggle());
        }

        #[test]
        fn test_push_char_ignored_for_checkbox() {
            let mut field = FormField::checkbox("agree", "Agree");
            assert!(!field.push_char('x'));
            assert_eq!(field.value(), &FieldValue::Bool(false));
        }

        #[test]
        fn test_cycle_option_wraps() {
            let mut field = FormField::select("role", "Role", &["a", "b", "c"]);
            field.cycle_option(false);
            assert_eq!(field.as_text(), "c");
            field.cycle_option(true);
            assert_eq!(field.as_text(), "a");
            field.cycle_option(true);
            assert_eq!(field.as_text(), "b");
        }

        #[test]
        fn test_reset_clears_flags() {
            let mut field = password();
            type_text(&mut field, "x");
            field.mark_touched();
            field.reset();
            assert_eq!(field.as_text(), "");
            assert!(!field.state().touched);
            assert!(!field.state().dirty);
            assert!(field.state().result.has("required"));
        }
    }

    mod async_rules {
        use super::*;
        use pretty_assertions::assert_eq;

        fn email() -> FormField {
            FormField::text("email", "Email").with_rules(vec![
                Rule::Email,
                Rule::Required,
                Rule::Async(Arc::new(EmailIsUnique::default())),
            ])
        }

        #[tokio::test]
        async fn test_pending_until_settled() {
            let mut field = email();
            type_text(&mut field, TAKEN_EMAIL);
            assert_eq!(field.status(), ControlStatus::Pending);
            assert!(!field.state().result.has("notUnique"));

            field.settle().await;
            assert_eq!(field.status(), ControlStatus::Invalid);
            assert!(field.state().result.has("notUnique"));
            assert!(!field.state().pending);
        }

        #[tokio::test]
        async fn test_async_merges_with_sync_failures() {
            let mut field = email();
            field.settle().await;
            let result = &field.state().result;
            assert!(result.has("required"));
            assert!(!result.has("email"));
            assert!(!result.has("notUnique"));
        }

        #[tokio::test]
        async fn test_edit_after_settle_is_pending_again() {
            let mut field = email();
            type_text(&mut field, TAKEN_EMAIL);
            field.settle().await;
            field.pop_char();
            assert_eq!(field.status(), ControlStatus::Pending);
            field.settle().await;
            assert_eq!(field.status(), ControlStatus::Valid);
        }

        #[tokio::test]
        async fn test_async_validator_sees_current_value_once() {
            let mut validator = MockAsyncValidator::new();
            validator.expect_name().return_const("mock");
            validator
                .expect_validate()
                .withf(|value| value.as_text() == Some("ab"))
                .times(1)
                .returning(|_| ValidationResult::fail(ValidationError::Custom("mock")));

            let mut field = FormField::text("nick", "Nick")
                .with_rules(vec![Rule::MinLength(3), Rule::Async(Arc::new(validator))]);
            type_text(&mut field, "ab");
            assert!(field.state().result.has("minLength"));
            assert!(!field.state().result.has("mock"));

            field.settle().await;
            field.settle().await;
            assert!(field.state().result.has("minLength"));
            assert!(field.state().result.has("mock"));
        }
    }

    mod display {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_secret_is_masked() {
            let mut field = FormField::secret("password", "Password");
            type_text(&mut field, "abc");
            assert_eq!(field.display_value(), "•••");
        }

        #[test]
        fn test_checkbox_display() {
            let mut field = FormField::checkbox("agree", "Agree");
            assert_eq!(field.display_value(), "[ ]");
            field.toggle();
            assert_eq!(field.display_value(), "[x]");
        }

        #[test]
        fn test_select_display() {
            let field = FormField::select("role", "Role", &["student"]);
            assert_eq!(field.display_value(), "◀ student ▶");
        }
    }
}
