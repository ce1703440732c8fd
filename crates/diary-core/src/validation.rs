//! Field checks shared by the request models.

use std::borrow::Cow;

use validator::ValidationError;

/// True when the value is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `Some(value)` only when the value is present and not blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_blank(v))
}

/// validator hook rejecting blank strings.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if is_blank(value) {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}
