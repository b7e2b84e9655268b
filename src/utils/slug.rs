//! Slug generation and validation utilities.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of random bytes before base64 encoding.
const SLUG_LENGTH_BYTES: usize = 6;

pub const MIN_SLUG_LEN: usize = 3;
pub const MAX_SLUG_LEN: usize = 64;

/// Slugs that would shadow service routes.
const RESERVED_SLUGS: &[&str] = &["api", "r", "health", "splits", "stats"];

/// Generates a random URL-safe slug.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding, producing an 8-character slug. The caller still runs
/// [`validate_slug`] since a draw can, in principle, be all digits.
///
/// # Errors
///
/// Returns [`AppError::Persistence`] if the system random source fails.
pub fn generate_slug() -> Result<String, AppError> {
    let mut buffer = [0u8; SLUG_LENGTH_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::persistence(
            "Failed to generate random slug",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Validates a slug supplied by a caller.
///
/// # Rules
///
/// - Length: 3-64 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
/// - Not purely numeric (numeric path segments address splits by id)
/// - Not a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.len() < MIN_SLUG_LEN || slug.len() > MAX_SLUG_LEN {
        return Err(AppError::bad_request(
            format!(
                "Slug must be {}-{} characters",
                MIN_SLUG_LEN, MAX_SLUG_LEN
            ),
            json!({ "provided_length": slug.len() }),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::bad_request(
            "Slug can only contain letters, digits, '_' and '-'",
            json!({ "slug": slug }),
        ));
    }

    if slug.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::bad_request(
            "Slug cannot be purely numeric",
            json!({ "slug": slug }),
        ));
    }

    if RESERVED_SLUGS.contains(&slug.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This slug is reserved",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}
