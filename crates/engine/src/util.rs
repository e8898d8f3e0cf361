//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 100;
const MAX_COLOR_LEN: usize = 20;

/// Trim and collapse inner whitespace of a user-facing name.
pub(crate) fn normalize_display_name(value: &str, label: &str) -> ResultEngine<String> {
    let display = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if display.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if display.chars().count() > MAX_NAME_LEN {
        return Err(EngineError::InvalidName(format!(
            "{label} name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(display)
}

/// Comparison key for category names: case, accents and punctuation are
/// ignored so "Café" and "cafe" collide.
pub(crate) fn normalize_category_key(display: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in display.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }

    let normalized = out.trim_end();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must contain letters or digits".to_string(),
        ));
    }
    Ok(normalized.to_string())
}

pub(crate) fn normalize_color(value: Option<&str>) -> ResultEngine<Option<String>> {
    let Some(color) = value.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if color.len() > MAX_COLOR_LEN {
        return Err(EngineError::InvalidInput(format!(
            "color must be at most {MAX_COLOR_LEN} characters"
        )));
    }
    Ok(Some(color.to_string()))
}

pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::InvalidInput(format!("invalid email: {value}"))),
    }
}

pub(crate) fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_collapses_whitespace() {
        assert_eq!(
            normalize_display_name("  Eating   out ", "category").unwrap(),
            "Eating out"
        );
        assert!(normalize_display_name("   ", "category").is_err());
    }

    #[test]
    fn category_key_ignores_case_and_accents() {
        assert_eq!(normalize_category_key("Café").unwrap(), "cafe");
        assert_eq!(normalize_category_key("CAFE").unwrap(), "cafe");
        assert_eq!(normalize_category_key("Food & Drinks").unwrap(), "food drinks");
        assert!(normalize_category_key("!!!").is_err());
    }

    #[test]
    fn email_is_lowercased_and_checked() {
        assert_eq!(
            normalize_email(" Demo@Example.com ").unwrap(),
            "demo@example.com"
        );
        assert!(normalize_email("demo").is_err());
        assert!(normalize_email("@example.com").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
