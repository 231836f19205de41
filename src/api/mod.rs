//! REST API module for the mock backend.
//!
//! Contains all route handlers following the canonical front-end contract.

mod group;
mod media;
mod user;

pub use group::*;
pub use media::*;
pub use user::*;

use crate::errors::AppError;

/// Unwrap a required request field, mapping absence to a 400.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

/// Unwrap a required, non-empty string field.
pub(crate) fn required_str(value: Option<String>, field: &str) -> Result<String, AppError> {
    let value = required(value, field)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str_rejects_missing_and_empty() {
        assert!(required_str(None, "password").is_err());
        assert!(required_str(Some("  ".to_string()), "password").is_err());
        assert_eq!(
            required_str(Some("x".to_string()), "password").unwrap(),
            "x"
        );
    }
}
