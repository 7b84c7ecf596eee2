//! Input validation helpers
//!
//! Slug and email normalization rules shared by the API handlers and the
//! request DTO validators.

pub const MAX_SLUG_LENGTH: usize = 63;
pub const MIN_SLUG_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 255;

/// Validate an organization slug: lowercase alphanumerics and hyphens,
/// no leading/trailing hyphen, 2..=63 chars.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.len() < MIN_SLUG_LENGTH {
        return Err(format!(
            "Slug must be at least {} characters",
            MIN_SLUG_LENGTH
        ));
    }
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(format!("Slug must be at most {} characters", MAX_SLUG_LENGTH));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("Slug cannot start or end with a hyphen".to_string());
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(
            "Slug may only contain lowercase letters, digits, and hyphens".to_string(),
        );
    }
    Ok(())
}

/// Canonical form of an email address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        for slug in ["acme", "acme-corp", "a1", "team-42-infra"] {
            assert!(validate_slug(slug).is_ok(), "expected {} to be valid", slug);
        }
    }

    #[test]
    fn test_invalid_slugs() {
        for slug in ["a", "-acme", "acme-", "Acme", "acme corp", "acme_corp", ""] {
            assert!(
                validate_slug(slug).is_err(),
                "expected {} to be rejected",
                slug
            );
        }
    }

    #[test]
    fn test_slug_length_bounds() {
        let long = "a".repeat(MAX_SLUG_LENGTH);
        assert!(validate_slug(&long).is_ok());
        let too_long = "a".repeat(MAX_SLUG_LENGTH + 1);
        assert!(validate_slug(&too_long).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
    }
}
