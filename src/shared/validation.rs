use std::borrow::Cow;

use validator::ValidationError;

/// Rejects empty and whitespace-only strings.
///
/// `length(min = 1)` lets `"   "` through, so required text fields use this instead:
/// ```ignore
/// #[validate(custom(function = "crate::shared::validation::validate_not_blank"))]
/// pub name: String,
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("must not be blank"));
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank_accepts_text() {
        assert!(validate_not_blank("Electronics").is_ok());
        assert!(validate_not_blank("  padded  ").is_ok());
        assert!(validate_not_blank("a").is_ok());
    }

    #[test]
    fn test_not_blank_rejects_empty_and_whitespace() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
    }
}
