//! Validation rules and the sync dispatcher

use super::{email, AsyncValidator, FieldValue, ValidationError, ValidationResult};
use std::fmt;
use std::sync::Arc;

/// A rule attached to a field or group
#[derive(Clone)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    /// Fails with `reason` unless `test` accepts the text value
    Predicate {
        reason: ValidationError,
        test: fn(&str) -> bool,
    },
    /// Group rule: the two named children must hold identical values
    EqualValues(String, String),
    /// Group rule over the named children, in order
    CrossField {
        fields: Vec<String>,
        reason: ValidationError,
        check: fn(&[Option<&FieldValue>]) -> bool,
    },
    Async(Arc<dyn AsyncValidator>),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::Email => write!(f, "Email"),
            Rule::MinLength(n) => write!(f, "MinLength({n})"),
            Rule::Predicate { reason, .. } => write!(f, "Predicate({})", reason.key()),
            Rule::EqualValues(a, b) => write!(f, "EqualValues({a}, {b})"),
            Rule::CrossField { fields, reason, .. } => {
                write!(f, "CrossField({}, {fields:?})", reason.key())
            }
            Rule::Async(v) => write!(f, "Async({})", v.name()),
        }
    }
}

fn contains_question_mark(value: &str) -> bool {
    value.contains('?')
}

impl Rule {
    pub fn must_contain_question_mark() -> Self {
        Rule::Predicate {
            reason: ValidationError::DoesNotContainQuestionMark,
            test: contains_question_mark,
        }
    }

    pub fn equal_values(a: impl Into<String>, b: impl Into<String>) -> Self {
        Rule::EqualValues(a.into(), b.into())
    }

    pub fn is_async(&self) -> bool {
        matches!(self, Rule::Async(_))
    }

    /// Evaluate a sync rule against `value`.
    ///
    /// Group rules look their operands up as children of `value`. Async rules
    /// are skipped here and report valid.
    pub fn evaluate(&self, value: &FieldValue) -> ValidationResult {
        let passed = match self {
            Rule::Required => !value.is_empty(),
            // Emptiness is left to `Required`
            Rule::Email => value
                .as_text()
                .is_some_and(|text| text.is_empty() || email::is_email(text)),
            Rule::MinLength(min) => {
                if let Some(actual) = value.length().filter(|len| len < min) {
                    return ValidationResult::fail(ValidationError::MinLength {
                        required: *min,
                        actual,
                    });
                }
                true
            }
            Rule::Predicate { test, .. } => value.as_text().is_some_and(test),
            Rule::EqualValues(a, b) => value.get(a) == value.get(b),
            Rule::CrossField { fields, check, .. } => {
                let operands: Vec<_> = fields.iter().map(|name| value.get(name)).collect();
                check(&operands)
            }
            Rule::Async(_) => true,
        };

        if passed {
            ValidationResult::Valid
        } else {
            ValidationResult::fail(self.reason())
        }
    }

    fn reason(&self) -> ValidationError {
        match self {
            Rule::Required => ValidationError::Required,
            Rule::Email => ValidationError::Email,
            Rule::MinLength(min) => ValidationError::MinLength {
                required: *min,
                actual: 0,
            },
            Rule::Predicate { reason, .. } | Rule::CrossField { reason, .. } => reason.clone(),
            Rule::EqualValues(..) => ValidationError::ValuesNotEqual,
            Rule::Async(_) => ValidationError::Custom("async"),
        }
    }
}

/// Run every sync rule and merge their failures
pub fn run_sync(rules: &[Rule], value: &FieldValue) -> ValidationResult {
    rules
        .iter()
        .filter(|rule| !rule.is_async())
        .fold(ValidationResult::Valid, |acc, rule| {
            acc.merge(rule.evaluate(value))
        })
}

/// Run every async rule and merge their failures
pub async fn run_async(rules: &[Rule], value: &FieldValue) -> ValidationResult {
    let mut result = ValidationResult::Valid;
    for rule in rules {
        if let Rule::Async(validator) = rule {
            result = result.merge(validator.validate(value).await);
        }
    }
    result
}
