//! Validation engine
//!
//! Maps a control's value (and, for group rules, its children) to a
//! `ValidationResult`. Sync rules are evaluated by a single dispatcher;
//! async rules are awaited separately and merged in afterwards.

pub mod asynchronous;
mod email;
mod result;
mod rule;
mod value;

pub use asynchronous::{AsyncValidator, EmailIsUnique, TAKEN_EMAIL};
pub use result::{ValidationError, ValidationResult};
pub use rule::{run_async, run_sync, Rule};
pub use value::FieldValue;
