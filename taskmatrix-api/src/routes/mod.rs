//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Signup, login, token validation and logout
//! - `lookups`: Status and priority lists
//! - `projects`: Projects and their members
//! - `tasks`: Tasks within a project

pub mod auth;
pub mod health;
pub mod lookups;
pub mod projects;
pub mod tasks;

use std::borrow::Cow;
use validator::ValidationError;

use crate::error::{ApiError, ApiResult};

/// Unwraps a field already checked by `#[validate(required)]`
pub(crate) fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::invalid_field(field, "is required"))
}

/// `validator` rule: the value has at least one non-whitespace character
pub(crate) fn non_blank(value: &str) -> Result<(), ValidationError> {
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
    fn test_non_blank() {
        assert!(non_blank("Website").is_ok());
        assert!(non_blank("").is_err());
        assert!(non_blank(" \t\n").is_err());
    }
}
