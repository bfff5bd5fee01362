//! Deferred validators
//!
//! Async rules run after a control's sync rules and merge their reasons in
//! as a separate update. `EmailIsUnique` resolves immediately today but is
//! awaited like a real lookup would be.

use super::{FieldValue, ValidationError, ValidationResult};
use async_trait::async_trait;

/// Address reported as already registered
pub const TAKEN_EMAIL: &str = "test@example.com";

/// A validator whose result is delivered later
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsyncValidator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn validate(&self, value: &FieldValue) -> ValidationResult;
}

/// Reports `notUnique` for addresses that are already taken
#[derive(Debug, Clone)]
pub struct EmailIsUnique {
    taken: Vec<String>,
}

impl EmailIsUnique {
    pub fn new(taken: Vec<String>) -> Self {
        Self { taken }
    }
}

impl Default for EmailIsUnique {
    fn default() -> Self {
        Self::new(vec![TAKEN_EMAIL.to_string()])
    }
}

#[async_trait]
impl AsyncValidator for EmailIsUnique {
    fn name(&self) -> &'static str {
        "emailIsUnique"
    }

    async fn validate(&self, value: &FieldValue) -> ValidationResult {
        match value.as_text() {
            Some(email) if self.taken.iter().any(|t| t == email) => {
                ValidationResult::fail(ValidationError::NotUnique)
            }
            _ => ValidationResult::Valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_taken_email_is_not_unique() {
        let result = EmailIsUnique::default()
            .validate(&FieldValue::from(TAKEN_EMAIL))
            .await;
        assert!(result.has("notUnique"));
    }

    #[tokio::test]
    async fn test_other_values_are_unique() {
        let validator = EmailIsUnique::default();
        for value in ["", "other@example.com", "TEST@example.com", "test@example.com "] {
            assert!(
                validator.validate(&FieldValue::from(value)).await.is_valid(),
                "{value:?} should be unique"
            );
        }
    }

    #[test]
    fn test_non_text_is_unique() {
        let result = tokio_test::block_on(EmailIsUnique::default().validate(&FieldValue::Bool(true)));
        assert!(result.is_valid());
    }

    #[test]
    fn test_custom_taken_list() {
        let validator = EmailIsUnique::new(vec!["a@b.c".to_string()]);
        assert!(tokio_test::block_on(validator.validate(&"a@b.c".into())).is_invalid());
        assert!(tokio_test::block_on(validator.validate(&TAKEN_EMAIL.into())).is_valid());
    }
}
