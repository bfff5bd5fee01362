//! Control tree: groups, arrays and form-level submit

use super::field::{ControlStatus, FormField};
use crate::validation::{run_sync, FieldValue, Rule, ValidationResult};
use std::collections::BTreeMap;

/// A node in the form tree
#[derive(Debug, Clone)]
pub enum Control {
    Field(FormField),
    Group(FormGroup),
    Array(FormArray),
}

/// Positional list of fields, addressed by index (`source.0`)
#[derive(Debug, Clone, Default)]
pub struct FormArray {
    pub items: Vec<FormField>,
}

impl FormArray {
    pub fn new(items: Vec<FormField>) -> Self {
        Self { items }
    }

    fn value(&self) -> FieldValue {
        FieldValue::List(self.items.iter().map(|f| f.value().clone()).collect())
    }
}

/// Named controls plus group-level (cross-field) rules
#[derive(Debug, Clone, Default)]
pub struct FormGroup {
    controls: Vec<(String, Control)>,
    rules: Vec<Rule>,
    result: ValidationResult,
}

/// Answer to a submit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every control is valid; carries the submitted value
    Accepted(FieldValue),
    /// Paths of the controls that failed
    Rejected { invalid: Vec<String> },
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

impl FormGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FormField) -> Self {
        self.controls
            .push((field.name.clone(), Control::Field(field)));
        self.revalidate();
        self
    }

    pub fn group(mut self, name: &str, group: FormGroup) -> Self {
        self.controls.push((name.to_string(), Control::Group(group)));
        self.revalidate();
        self
    }

    pub fn array(mut self, name: &str, array: FormArray) -> Self {
        self.controls.push((name.to_string(), Control::Array(array)));
        self.revalidate();
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self.revalidate();
        self
    }

    /// Result of this group's own rules
    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.controls.iter().map(|(name, c)| (name.as_str(), c))
    }

    fn control(&self, name: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find_map(|(n, c)| (n == name).then_some(c))
    }

    fn control_mut(&mut self, name: &str) -> Option<&mut Control> {
        self.controls
            .iter_mut()
            .find_map(|(n, c)| (n == name).then_some(c))
    }

    /// Current value of the whole group
    pub fn value(&self) -> FieldValue {
        let children: BTreeMap<String, FieldValue> = self
            .controls
            .iter()
            .map(|(name, control)| {
                let value = match control {
                    Control::Field(f) => f.value().clone(),
                    Control::Group(g) => g.value(),
                    Control::Array(a) => a.value(),
                };
                (name.clone(), value)
            })
            .collect();
        FieldValue::Group(children)
    }

    /// Find a leaf field by dotted path
    pub fn get_field(&self, path: &str) -> Option<&FormField> {
        let (head, rest) = split_path(path);
        match (self.control(head)?, rest) {
            (Control::Field(f), None) => Some(f),
            (Control::Group(g), Some(rest)) => g.get_field(rest),
            (Control::Array(a), Some(rest)) => a.items.get(rest.parse::<usize>().ok()?),
            _ => None,
        }
    }

    fn get_field_mut(&mut self, path: &str) -> Option<&mut FormField> {
        let (head, rest) = split_path(path);
        match (self.control_mut(head)?, rest) {
            (Control::Field(f), None) => Some(f),
            (Control::Group(g), Some(rest)) => g.get_field_mut(rest),
            (Control::Array(a), Some(rest)) => a.items.get_mut(rest.parse::<usize>().ok()?),
            _ => None,
        }
    }

    /// Find a nested group by dotted path
    pub fn get_group(&self, path: &str) -> Option<&FormGroup> {
        let (head, rest) = split_path(path);
        match (self.control(head)?, rest) {
            (Control::Group(g), None) => Some(g),
            (Control::Group(g), Some(rest)) => g.get_group(rest),
            _ => None,
        }
    }

    /// Paths of every leaf field, depth-first in declaration order
    pub fn field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_field_paths("", &mut paths);
        paths
    }

    fn collect_field_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, control) in &self.controls {
            let path = join_path(prefix, name);
            match control {
                Control::Field(_) => out.push(path),
                Control::Group(g) => g.collect_field_paths(&path, out),
                Control::Array(a) => {
                    out.extend((0..a.items.len()).map(|i| format!("{path}.{i}")));
                }
            }
        }
    }

    /// Nested groups that carry their own rules, with their paths
    pub fn rule_groups(&self) -> Vec<(String, &FormGroup)> {
        let mut groups = Vec::new();
        self.collect_rule_groups("", &mut groups);
        groups
    }

    fn collect_rule_groups<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a FormGroup)>) {
        if !self.rules.is_empty() {
            out.push((prefix.to_string(), self));
        }
        for (name, control) in &self.controls {
            if let Control::Group(g) = control {
                g.collect_rule_groups(&join_path(prefix, name), out);
            }
        }
    }

    /// Re-run group rules bottom-up against the current child values
    fn revalidate(&mut self) {
        for (_, control) in &mut self.controls {
            if let Control::Group(g) = control {
                g.revalidate();
            }
        }
        self.result = run_sync(&self.rules, &self.value());
    }

    /// Apply a user edit to the field at `path`.
    ///
    /// Returns true if the value changed.
    pub fn edit_field(&mut self, path: &str, edit: impl FnOnce(&mut FormField) -> bool) -> bool {
        let changed = self.get_field_mut(path).is_some_and(edit);
        if changed {
            self.revalidate();
        }
        changed
    }

    /// Set a value programmatically, without marking the field dirty
    pub fn patch_value(&mut self, path: &str, value: FieldValue) -> bool {
        let Some(field) = self.get_field_mut(path) else {
            return false;
        };
        field.set_value(value);
        self.revalidate();
        true
    }

    /// Set a value and make it the one `reset` returns to, without marking
    /// the field dirty
    pub fn seed_value(&mut self, path: &str, value: FieldValue) -> bool {
        let Some(field) = self.get_field_mut(path) else {
            return false;
        };
        field.seed(value);
        self.revalidate();
        true
    }

    pub fn mark_touched(&mut self, path: &str) {
        if let Some(field) = self.get_field_mut(path) {
            field.mark_touched();
        }
    }

    /// Restore every control to its initial value and clear interaction flags
    pub fn reset(&mut self) {
        for (_, control) in &mut self.controls {
            match control {
                Control::Field(f) => f.reset(),
                Control::Group(g) => g.reset(),
                Control::Array(a) => a.items.iter_mut().for_each(FormField::reset),
            }
        }
        self.revalidate();
    }

    /// Paths of invalid controls; a failing group rule reports the group path
    pub fn invalid_paths(&self) -> Vec<String> {
        let mut invalid: Vec<String> = self
            .field_paths()
            .into_iter()
            .filter(|path| self.get_field(path).is_some_and(FormField::is_invalid))
            .collect();
        invalid.extend(
            self.rule_groups()
                .into_iter()
                .filter(|(_, g)| g.result.is_invalid())
                .map(|(path, _)| path),
        );
        invalid
    }

    pub fn has_pending(&self) -> bool {
        self.field_paths()
            .iter()
            .filter_map(|path| self.get_field(path))
            .any(|f| f.state().pending)
    }

    pub fn status(&self) -> ControlStatus {
        if !self.invalid_paths().is_empty() {
            ControlStatus::Invalid
        } else if self.has_pending() {
            ControlStatus::Pending
        } else {
            ControlStatus::Valid
        }
    }

    /// Resolve every pending async rule
    pub async fn settle(&mut self) {
        for path in self.field_paths() {
            if let Some(field) = self.get_field_mut(&path) {
                field.settle().await;
            }
        }
    }

    /// Decide on the fully settled state.
    ///
    /// Pending async rules are awaited first, so the answer never reflects
    /// stale validity.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.settle().await;
        let invalid = self.invalid_paths();
        if invalid.is_empty() {
            SubmitOutcome::Accepted(self.value())
        } else {
            SubmitOutcome::Rejected { invalid }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{EmailIsUnique, TAKEN_EMAIL};
    use std::sync::Arc;

    fn passwords() -> FormGroup {
        FormGroup::new()
            .field(FormField::secret("password", "Password").with_rules(vec![Rule::Required]))
            .field(
                FormField::secret("confirmPassword", "Confirm").with_rules(vec![Rule::Required]),
            )
            .with_rules(vec![Rule::equal_values("password", "confirmPassword")])
    }

    fn form() -> FormGroup {
        FormGroup::new()
            .field(FormField::text("email", "Email").with_rules(vec![
                Rule::Required,
                Rule::Email,
                Rule::Async(Arc::new(EmailIsUnique::default())),
            ]))
            .group("passwords", passwords())
            .array(
                "source",
                FormArray::new(vec![
                    FormField::checkbox("0", "Google"),
                    FormField::checkbox("1", "Friend"),
                ]),
            )
    }

    fn type_into(group: &mut FormGroup, path: &str, text: &str) {
        for c in text.chars() {
            group.edit_field(path, |f| f.push_char(c));
        }
    }

    mod structure {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_field_paths_depth_first() {
            assert_eq!(
                form().field_paths(),
                vec![
                    "email",
                    "passwords.password",
                    "passwords.confirmPassword",
                    "source.0",
                    "source.1",
                ]
            );
        }

        #[test]
        fn test_get_field_by_path() {
            let form = form();
            assert_eq!(form.get_field("passwords.password").unwrap().name, "password");
            assert_eq!(form.get_field("source.1").unwrap().label, "Friend");
            assert!(form.get_field("passwords").is_none());
            assert!(form.get_field("source.9").is_none());
            assert!(form.get_field("nope").is_none());
        }

        #[test]
        fn test_get_group_by_path() {
            assert!(form().get_group("passwords").is_some());
            assert!(form().get_group("email").is_none());
        }

        #[test]
        fn test_value_mirrors_tree() {
            let value = form().value();
            assert_eq!(value.get("email"), Some(&FieldValue::from("")));
            assert_eq!(value.get("passwords.password"), Some(&FieldValue::from("")));
            assert_eq!(value.get("source.1"), Some(&FieldValue::Bool(false)));
        }

        #[test]
        fn test_rule_groups() {
            let form = form();
            let paths: Vec<_> = form.rule_groups().into_iter().map(|(p, _)| p).collect();
            assert_eq!(paths, vec!["passwords"]);
        }
    }

    mod group_rules {
        use super::*;

        #[test]
        fn test_equal_empty_passwords_are_equal() {
            let form = form();
            assert!(form.get_group("passwords").unwrap().result().is_valid());
        }

        #[test]
        fn test_mismatch_is_reported_on_group_not_leaves() {
            let mut form = form();
            type_into(&mut form, "passwords.password", "abc");
            let group = form.get_group("passwords").unwrap();
            assert!(group.result().has("valuesNotEqual"));
            assert!(!form
                .get_field("passwords.password")
                .unwrap()
                .state()
                .result
                .has("valuesNotEqual"));
            assert!(form.invalid_paths().contains(&"passwords".to_string()));
        }

        #[test]
        fn test_match_clears_group_error() {
            let mut form = form();
            type_into(&mut form, "passwords.password", "abc");
            type_into(&mut form, "passwords.confirmPassword", "abc");
            assert!(form.get_group("passwords").unwrap().result().is_valid());
        }
    }

    mod editing {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_edit_field_reports_change() {
            let mut form = form();
            assert!(form.edit_field("source.0", FormField::toggle));
            assert!(!form.edit_field("email", FormField::toggle));
            assert!(!form.edit_field("missing", |f| f.push_char('x')));
        }

        #[test]
        fn test_patch_value_does_not_dirty() {
            let mut form = form();
            assert!(form.patch_value("email", "a@b.io".into()));
            let email = form.get_field("email").unwrap();
            assert_eq!(email.as_text(), "a@b.io");
            assert!(!email.state().dirty);
            assert!(!form.patch_value("missing", "x".into()));
        }

        #[test]
        fn test_seed_value_becomes_reset_target() {
            let mut form = form();
            assert!(form.seed_value("email", "seeded@x.io".into()));
            assert!(!form.get_field("email").unwrap().state().dirty);

            type_into(&mut form, "email", "zzz");
            form.reset();
            assert_eq!(form.get_field("email").unwrap().as_text(), "seeded@x.io");
            assert!(!form.seed_value("missing", "x".into()));
        }

        #[test]
        fn test_patch_value_keeps_reset_target() {
            let mut form = form();
            form.patch_value("email", "patched@x.io".into());
            form.reset();
            assert_eq!(form.get_field("email").unwrap().as_text(), "");
        }

        #[test]
        fn test_reset_restores_everything() {
            let mut form = form();
            type_into(&mut form, "email", "a@b.io");
            type_into(&mut form, "passwords.password", "abc");
            form.edit_field("source.1", FormField::toggle);
            form.mark_touched("email");

            form.reset();
            assert_eq!(form.value(), self::form().value());
            let email = form.get_field("email").unwrap();
            assert!(!email.state().touched);
            assert!(!email.state().dirty);
            assert!(form.get_group("passwords").unwrap().result().is_valid());
        }
    }

    mod submit {
        use super::*;
        use pretty_assertions::assert_eq;

        fn fill_valid(form: &mut FormGroup, email: &str) {
            type_into(form, "email", email);
            type_into(form, "passwords.password", "secret?");
            type_into(form, "passwords.confirmPassword", "secret?");
        }

        #[tokio::test]
        async fn test_rejects_invalid_form() {
            let mut form = form();
            let outcome = form.submit().await;
            assert_eq!(
                outcome,
                SubmitOutcome::Rejected {
                    invalid: vec![
                        "email".to_string(),
                        "passwords.password".to_string(),
                        "passwords.confirmPassword".to_string(),
                    ]
                }
            );
        }

        #[tokio::test]
        async fn test_accepts_valid_form() {
            let mut form = form();
            fill_valid(&mut form, "a@b.io");
            assert_eq!(form.status(), ControlStatus::Pending);

            match form.submit().await {
                SubmitOutcome::Accepted(value) => {
                    assert_eq!(value.get("email"), Some(&FieldValue::from("a@b.io")));
                }
                other => panic!("expected acceptance, got {other:?}"),
            }
            assert_eq!(form.status(), ControlStatus::Valid);
        }

        #[tokio::test]
        async fn test_waits_for_async_rules_before_deciding() {
            let mut form = form();
            fill_valid(&mut form, TAKEN_EMAIL);
            assert!(form.invalid_paths().is_empty());
            assert!(form.has_pending());

            let outcome = form.submit().await;
            assert_eq!(
                outcome,
                SubmitOutcome::Rejected {
                    invalid: vec!["email".to_string()]
                }
            );
            assert!(!form.has_pending());
        }

        #[tokio::test]
        async fn test_rejects_mismatched_passwords() {
            let mut form = form();
            type_into(&mut form, "email", "a@b.io");
            type_into(&mut form, "passwords.password", "one");
            type_into(&mut form, "passwords.confirmPassword", "two");
            assert_eq!(
                form.submit().await,
                SubmitOutcome::Rejected {
                    invalid: vec!["passwords".to_string()]
                }
            );
        }
    }
}
