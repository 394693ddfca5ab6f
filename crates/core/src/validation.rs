//! Shared field validators for create/update DTOs.

use crate::error::CoreError;

/// Maximum length for short single-line fields (names, titles).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for long-form text (note bodies, captions, missions).
pub const MAX_TEXT_LENGTH: usize = 100_000;

/// Maximum number of tags on any entity.
pub const MAX_TAGS: usize = 30;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 50;

/// Validate a required single-line name (non-blank, bounded).
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate optional long-form text.
pub fn validate_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a tag list (each non-empty and bounded, bounded count).
pub fn validate_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A maximum of {MAX_TAGS} tags is allowed"
        )));
    }
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation("Tags must not be empty".into()));
        }
        if tag.len() > MAX_TAG_LENGTH {
            return Err(CoreError::Validation(format!(
                "Each tag must be at most {MAX_TAG_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate a 1..=`max` rating.
pub fn validate_rating(field: &str, value: u8, max: u8) -> Result<(), CoreError> {
    if value == 0 || value > max {
        return Err(CoreError::Validation(format!(
            "{field} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Validate a `#rrggbb` hex color.
pub fn validate_hex_color(value: &str) -> Result<(), CoreError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(CoreError::Validation(format!(
            "Invalid color '{value}'. Expected #rrggbb"
        )));
    }
    Ok(())
}

/// Validate a non-negative, finite monetary or metric amount.
pub fn validate_amount(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Normalize a tag list: trim, lowercase, drop duplicates (first wins).
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let t = tag.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(validate_name("Name", "Acme").is_ok());
        assert!(validate_name("Name", "   ").is_err());
        assert!(validate_name("Name", &"a".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating("Impact", 1, 10).is_ok());
        assert!(validate_rating("Impact", 10, 10).is_ok());
        assert!(validate_rating("Impact", 0, 10).is_err());
        assert!(validate_rating("Impact", 11, 10).is_err());
    }

    #[test]
    fn hex_colors() {
        assert!(validate_hex_color("#a1B2c3").is_ok());
        assert!(validate_hex_color("a1b2c3").is_err());
        assert!(validate_hex_color("#a1b2c").is_err());
        assert!(validate_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn amounts() {
        assert!(validate_amount("Cost", 0.0).is_ok());
        assert!(validate_amount("Cost", -1.0).is_err());
        assert!(validate_amount("Cost", f64::NAN).is_err());
    }

    #[test]
    fn tags_are_normalized() {
        let tags = vec![" Launch ".to_string(), "launch".into(), "".into(), "Q3".into()];
        assert_eq!(normalize_tags(&tags), vec!["launch", "q3"]);
    }

    #[test]
    fn too_many_tags_rejected() {
        let tags: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        assert!(validate_tags(&tags).is_err());
    }
}
