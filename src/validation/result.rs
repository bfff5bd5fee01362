//! Validation outcomes

use std::collections::BTreeSet;
use std::fmt;

/// A named reason a value failed validation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationError {
    Required,
    Email,
    MinLength { required: usize, actual: usize },
    DoesNotContainQuestionMark,
    ValuesNotEqual,
    NotUnique,
    /// Reason reported by a caller-supplied predicate or cross-field rule
    Custom(&'static str),
}

impl ValidationError {
    /// Stable key for the reason, as exposed to the UI layer
    pub fn key(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::MinLength { .. } => "minLength",
            Self::DoesNotContainQuestionMark => "doesNotContainQuestionMark",
            Self::ValuesNotEqual => "valuesNotEqual",
            Self::NotUnique => "notUnique",
            Self::Custom(key) => key,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "This field is required"),
            Self::Email => write!(f, "Please enter a valid email address"),
            Self::MinLength { required, actual } => {
                write!(f, "Must be at least {required} characters (currently {actual})")
            }
            Self::DoesNotContainQuestionMark => write!(f, "Must contain a question mark"),
            Self::ValuesNotEqual => write!(f, "Values do not match"),
            Self::NotUnique => write!(f, "This email is already taken"),
            Self::Custom(key) => write!(f, "Invalid value ({key})"),
        }
    }
}

/// Either valid, or a non-empty set of failure reasons
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(BTreeSet<ValidationError>),
}

impl ValidationResult {
    /// Build a result from any number of reasons; none means valid
    pub fn from_errors(errors: impl IntoIterator<Item = ValidationError>) -> Self {
        let errors: BTreeSet<_> = errors.into_iter().collect();
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    pub fn fail(error: ValidationError) -> Self {
        Self::from_errors([error])
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Union of both results' reasons
    pub fn merge(self, other: ValidationResult) -> ValidationResult {
        match (self, other) {
            (Self::Valid, other) => other,
            (this, Self::Valid) => this,
            (Self::Invalid(mut a), Self::Invalid(b)) => {
                a.extend(b);
                Self::Invalid(a)
            }
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.errors().any(|e| e.key() == key)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(errors) => Some(errors.iter()),
        }
        .into_iter()
        .flatten()
    }
}
