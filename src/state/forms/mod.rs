//! Form domain layer
//!
//! Field controls, the group/array tree they live in, and the concrete
//! login and signup forms.

mod field;
mod form_state;
mod group;

pub use field::{ControlStatus, FieldKind, FieldState, FormField};
pub use form_state::{
    Form, FormKind, FormState, LoginForm, SignupForm, MIN_PASSWORD_LENGTH, ROLES,
};
pub use group::{Control, FormArray, FormGroup, SubmitOutcome};
