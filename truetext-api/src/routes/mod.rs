/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, logout, me)
/// - `text`: Text feature endpoints (humanize, paraphrase, detect, assignment)
/// - `trial`: Trial start/cancel
/// - `usage`: Caller's usage log
/// - `admin`: User, settings, and usage administration

pub mod admin;
pub mod auth;
pub mod health;
pub mod text;
pub mod trial;
pub mod usage;

use crate::error::{ApiError, ValidationErrorDetail};

/// Maps `validator` derive failures onto the 400 validation response
pub(crate) fn map_validation_errors(errors: validator::ValidationErrors) -> ApiError {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    ApiError::ValidationError(details)
}
