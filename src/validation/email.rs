//! Email shape check

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_LOCAL_PART_LENGTH: usize = 64;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"#,
    )
    .expect("email pattern is valid")
});

/// Returns true if `value` has the shape of an email address
pub fn is_email(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    match value.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LENGTH => EMAIL_PATTERN.is_match(value),
        _ => false,
    }
}
