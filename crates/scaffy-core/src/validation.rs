//! Field validators.
//!
//! The `validate_*` functions that return `Result` fail with
//! [`SiteError::Validation`]. The message uses the label as written and the
//! field is the label's form key (`"Section name"` is `section_name`). The
//! email and phone checks are plain predicates so callers can pick their own
//! wording. None of them have side effects.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SiteError;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid hardcoded regex"));

#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s\-+()]{10,}$").expect("valid hardcoded regex"));

/// Form key for a field label: lowercased, whitespace runs become `_`.
#[must_use]
pub fn field_key(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Fails when `value` is empty after trimming.
///
/// # Errors
///
/// Returns [`SiteError::Validation`] with `"{label} is required"`.
pub fn validate_required(value: &str, label: &str) -> Result<(), SiteError> {
    if value.trim().is_empty() {
        return Err(SiteError::validation(
            format!("{label} is required"),
            field_key(label),
        ));
    }
    Ok(())
}

/// Fails when the trimmed character count falls outside `[min, max]`.
///
/// Either bound may be omitted. The minimum is checked first.
///
/// # Errors
///
/// Returns [`SiteError::Validation`] naming the violated bound.
pub fn validate_length(
    value: &str,
    label: &str,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), SiteError> {
    let length = value.trim().chars().count();

    if let Some(min) = min {
        if length < min {
            return Err(SiteError::validation(
                format!("{label} must be at least {min} characters"),
                field_key(label),
            ));
        }
    }

    if let Some(max) = max {
        if length > max {
            return Err(SiteError::validation(
                format!("{label} must be no more than {max} characters"),
                field_key(label),
            ));
        }
    }

    Ok(())
}

/// Fails unless the trimmed value parses as a finite number greater than zero.
///
/// # Errors
///
/// Returns [`SiteError::Validation`] with `"{label} must be a positive number"`.
pub fn validate_positive_number(value: &str, label: &str) -> Result<f64, SiteError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err(SiteError::validation(
            format!("{label} must be a positive number"),
            field_key(label),
        )),
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@` before the dotted domain.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least ten characters drawn from digits, whitespace, `-`, `+`, `(` and `)`.
pub fn validate_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    use super::*;

    // --- validate_required ---

    #[test]
    fn required_empty_names_the_label() {
        let err = validate_required("", "Name").unwrap_err();
        assert_eq!(err.message(), "Name is required");
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn errors_name_the_form_key() {
        let err = validate_required(" ", "Section name").unwrap_err();
        assert_eq!(err.message(), "Section name is required");
        assert_eq!(err.field(), Some("section_name"));

        let err = validate_positive_number("-1", "Height").unwrap_err();
        assert_eq!(err.field(), Some("height"));

        let err = validate_length("abc", "Password", Some(6), None).unwrap_err();
        assert_eq!(err.field(), Some("password"));
    }

    #[test]
    fn required_whitespace_fails() {
        assert!(validate_required("  \t\n", "Description").is_err());
    }

    #[test]
    fn required_padded_value_passes() {
        assert!(validate_required("  scaffold  ", "Description").is_ok());
    }

    #[quickcheck]
    fn required_rejects_whitespace_only(n: u8) -> TestResult {
        if n == 0 {
            return TestResult::discard();
        }
        let blanks: String = [' ', '\t', '\n', '\r', '\u{a0}']
            .iter()
            .cycle()
            .take(usize::from(n))
            .collect();
        TestResult::from_bool(validate_required(&blanks, "Field").is_err())
    }

    #[quickcheck]
    fn required_accepts_anything_with_content(s: String) -> TestResult {
        if s.chars().all(char::is_whitespace) {
            return TestResult::discard();
        }
        TestResult::from_bool(validate_required(&s, "Field").is_ok())
    }

    // --- validate_length ---

    #[test]
    fn length_below_min() {
        let err = validate_length("abc", "Password", Some(6), None).unwrap_err();
        assert_eq!(err.message(), "Password must be at least 6 characters");
    }

    #[test]
    fn length_above_max() {
        let err = validate_length("abcdef", "Code", None, Some(4)).unwrap_err();
        assert_eq!(err.message(), "Code must be no more than 4 characters");
    }

    #[test]
    fn length_counts_trimmed_chars() {
        assert!(validate_length("  ab  ", "Code", Some(2), Some(2)).is_ok());
        assert!(validate_length("ééé", "Code", None, Some(3)).is_ok());
    }

    #[test]
    fn length_without_bounds_always_passes() {
        assert!(validate_length("", "Anything", None, None).is_ok());
    }

    // --- validate_positive_number ---

    #[test]
    fn positive_number_parses() {
        assert_eq!(validate_positive_number(" 6.5 ", "Height"), Ok(6.5));
    }

    #[test]
    fn positive_number_rejects_zero_negative_and_text() {
        for bad in ["0", "-2", "tall", "", "NaN", "inf"] {
            let err = validate_positive_number(bad, "Height").unwrap_err();
            assert_eq!(err.message(), "Height must be a positive number", "{bad}");
        }
    }

    // --- validate_email ---

    #[test]
    fn email_minimal_valid() {
        assert!(validate_email("a@b.co"));
    }

    #[test]
    fn email_rejects_missing_at() {
        assert!(!validate_email("not-an-email"));
    }

    #[test]
    fn email_rejects_undotted_domain_and_spaces() {
        assert!(!validate_email("joe@localhost"));
        assert!(!validate_email("joe bloggs@example.com"));
        assert!(!validate_email("joe@@example.com"));
    }

    // --- validate_phone ---

    #[test]
    fn phone_uk_mobile() {
        assert!(validate_phone("07700 900000"));
    }

    #[test]
    fn phone_international_format() {
        assert!(validate_phone("+44 (0)20-7946-0958"));
    }

    #[test]
    fn phone_too_short() {
        assert!(!validate_phone("123"));
    }

    #[test]
    fn phone_rejects_letters() {
        assert!(!validate_phone("0770O 900000"));
    }

    #[quickcheck]
    fn phone_digit_strings_of_ten_or_more_pass(digits: Vec<u8>) -> TestResult {
        if digits.len() < 10 {
            return TestResult::discard();
        }
        let phone: String = digits.iter().map(|d| char::from(b'0' + d % 10)).collect();
        TestResult::from_bool(validate_phone(&phone))
    }
}
