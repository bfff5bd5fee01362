//! Login and signup forms with field validation and debounced draft
//! persistence.

pub mod app;
pub mod config;
pub mod draft;
pub mod error;
pub mod state;
pub mod ui;
pub mod validation;
