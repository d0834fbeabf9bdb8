// File: docguard-core/src/validators.rs
//! Programmatic validation functions for specific sensitive data types.
//!
//! This module provides additional validation logic beyond regular expression
//! matching. Pattern matches are structurally plausible but often numerically
//! invalid; these checks reduce false positives by applying format rules and
//! checksum algorithms (Verhoeff for Aadhaar numbers, Luhn for card numbers).
//!
//! Validators receive the candidate text *after* the recognizer's replacement
//! pairs have been applied (see [`sanitize_value`]). A failing validator is a
//! value, not a panic: the engine drops the candidate and continues.
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use thiserror::Error;

/// Error raised by a validator. Consumed by the analysis engine, which treats
/// it as "candidate rejected" so one misbehaving validator cannot poison a
/// whole analysis call.
#[derive(Debug, Error)]
#[error("validator '{validator}' failed: {reason}")]
pub struct ValidatorError {
    pub validator: String,
    pub reason: String,
}

/// Applies a recognizer's replacement pairs to a raw pattern match, producing
/// the normalized value that validators operate on. Typical pairs strip
/// separators: `[("-", ""), (" ", ""), (":", "")]`.
pub fn sanitize_value(text: &str, replacement_pairs: &[(String, String)]) -> String {
    let mut value = text.to_string();
    for (from, to) in replacement_pairs {
        value = value.replace(from.as_str(), to.as_str());
    }
    value
}

// --- Verhoeff checksum -------------------------------------------------------

// Multiplication table of the dihedral group D5.
const VERHOEFF_D: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

// Position-dependent permutation table, period 8.
const VERHOEFF_P: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 5, 8, 2],
];

const VERHOEFF_INV: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

/// Validates a digit string with the Verhoeff algorithm.
///
/// The fold runs over the digits right-to-left through the permutation and
/// multiplication tables; the number is valid iff the final group element is
/// the identity (0). Any non-digit input is invalid.
pub fn is_verhoeff_number(num_str: &str) -> bool {
    let mut c: u8 = 0;
    for (i, ch) in num_str.chars().rev().enumerate() {
        let Some(digit) = ch.to_digit(10) else { return false; };
        c = VERHOEFF_D[c as usize][VERHOEFF_P[i % 8][digit as usize] as usize];
    }
    c == 0
}

/// Computes the Verhoeff check digit for a base digit string, such that
/// `base + check` passes [`is_verhoeff_number`]. Returns `None` when the
/// input contains a non-digit.
pub fn verhoeff_check_digit(base: &str) -> Option<char> {
    let mut c: u8 = 0;
    for (i, ch) in base.chars().rev().enumerate() {
        let digit = ch.to_digit(10)?;
        c = VERHOEFF_D[c as usize][VERHOEFF_P[(i + 1) % 8][digit as usize] as usize];
    }
    char::from_digit(VERHOEFF_INV[c as usize] as u32, 10)
}

// --- Luhn checksum -----------------------------------------------------------

/// Validates a number using the Luhn algorithm.
///
/// The Luhn algorithm, also known as the Mod 10 algorithm, is a simple
/// checksum formula used to validate a variety of identification numbers,
/// such as credit card numbers.
pub fn is_valid_luhn(num_str: &str) -> bool {
    let mut sum = 0;
    let mut alternate = false;

    for c in num_str.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else { return false; };

        if alternate {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        alternate = !alternate;
    }

    sum % 10 == 0
}

/// Validates a credit card number: strips all non-digit characters and applies
/// the Luhn algorithm to the resulting digit string.
pub fn is_valid_credit_card(cc_number: &str) -> bool {
    let digits: String = cc_number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return false;
    }
    is_valid_luhn(&digits)
}

// --- Aadhaar (IN_AADHAAR) ----------------------------------------------------

/// True when the value contains four identical consecutive digits, a strong
/// signal of a synthetic or placeholder number.
fn has_quadruple_run(value: &str) -> bool {
    value
        .as_bytes()
        .windows(4)
        .any(|w| w[0].is_ascii_digit() && w.iter().all(|&b| b == w[0]))
}

/// Validates an Indian UIDAI Aadhaar number after separator stripping.
///
/// Rules: exactly 12 digits, first digit 2-9, no quadruple digit run, and a
/// passing Verhoeff checksum.
pub fn is_valid_aadhaar(sanitized_value: &str) -> bool {
    if sanitized_value.len() != 12 || !sanitized_value.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if !matches!(sanitized_value.as_bytes()[0], b'2'..=b'9') {
        return false;
    }
    if has_quadruple_run(sanitized_value) {
        return false;
    }
    is_verhoeff_number(sanitized_value)
}

// --- US SSN ------------------------------------------------------------------

/// Validates an SSN based on US Social Security Administration rules.
///
/// Expects the delimited format "XXX-XX-XXXX" and checks the structural
/// components against known invalid patterns (area 000/666/900+, zero group,
/// zero serial).
pub fn is_valid_us_ssn(ssn: &str) -> bool {
    let mut parts = ssn.split('-');

    let (Some(area), Some(group), Some(serial), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if area.len() != 3 || group.len() != 2 || serial.len() != 4 {
        return false;
    }

    let Ok(area_num) = area.parse::<u16>() else { return false; };
    let Ok(group_num) = group.parse::<u8>() else { return false; };
    let Ok(serial_num) = serial.parse::<u16>() else { return false; };

    let invalid_area = (area_num == 0) || (area_num == 666) || (area_num >= 900);
    let invalid_group = group_num == 0;
    let invalid_serial = serial_num == 0;

    !(invalid_area || invalid_group || invalid_serial)
}

// --- Indian driving license --------------------------------------------------

/// Validates an Indian driving license number after separator stripping:
/// 10-16 characters, two uppercase state-code letters, digits thereafter.
pub fn is_valid_in_driving_license(sanitized_value: &str) -> bool {
    if !(10..=16).contains(&sanitized_value.len()) {
        return false;
    }
    let bytes = sanitized_value.as_bytes();
    bytes[..2].iter().all(|b| b.is_ascii_uppercase())
        && bytes[2..].iter().all(|b| b.is_ascii_digit())
}

// --- Indian GST references ---------------------------------------------------

/// GST state codes and their short names, used to validate the leading two
/// digits of a GSTIN.
static GST_STATE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("01", "Jammu"),
        ("02", "HP"),
        ("03", "Punjab"),
        ("04", "Chandigarh"),
        ("05", "Uttarakhand"),
        ("06", "Haryana"),
        ("07", "Delhi"),
        ("08", "Rajasthan"),
        ("09", "UP"),
        ("10", "Bihar"),
        ("11", "Sikkim"),
        ("12", "Arunachal"),
        ("13", "Nagaland"),
        ("14", "Manipur"),
        ("15", "Mizoram"),
        ("16", "Tripura"),
        ("17", "Meghalaya"),
        ("18", "Assam"),
        ("19", "WB"),
        ("20", "Jharkhand"),
        ("21", "Odisha"),
        ("22", "Chhattisgarh"),
        ("23", "MP"),
        ("24", "Gujarat"),
        ("27", "Maharashtra"),
        ("29", "Karnataka"),
        ("32", "Kerala"),
        ("33", "TN"),
        ("36", "Telangana"),
        ("37", "AP"),
    ])
});

/// Validates Indian GST certificate references after separator stripping.
///
/// Checks, by length class:
/// - 15 chars: GSTIN (two-digit state code from the registry, alphanumeric
///   PAN block, entity code and check digit).
/// - 16 chars with an alphabetic prefix: ARN (two letters + 14 digits).
/// - Otherwise: alphanumeric with at least one digit and one letter
///   (TRN/UIN/provisional formats).
pub fn is_valid_in_gst_reference(sanitized_value: &str) -> bool {
    if !sanitized_value.is_ascii() {
        return false;
    }
    if sanitized_value.len() < 8 || sanitized_value.len() > 20 {
        return false;
    }

    if sanitized_value.len() == 15 {
        let state_code = &sanitized_value[..2];
        let pan = &sanitized_value[2..12];
        let entity = &sanitized_value[12..13];
        let check_digit = &sanitized_value[14..15];

        return GST_STATE_CODES.contains_key(state_code)
            && pan.chars().all(|c| c.is_ascii_alphanumeric())
            && entity.chars().all(|c| c.is_ascii_alphanumeric())
            && check_digit.chars().all(|c| c.is_ascii_alphanumeric());
    }

    if sanitized_value.len() == 16
        && sanitized_value[..2].chars().all(|c| c.is_ascii_alphabetic())
    {
        return sanitized_value[2..].chars().all(|c| c.is_ascii_digit());
    }

    sanitized_value.chars().all(|c| c.is_ascii_alphanumeric())
        && sanitized_value.chars().any(|c| c.is_ascii_digit())
        && sanitized_value.chars().any(|c| c.is_ascii_alphabetic())
}

// --- Passwords ---------------------------------------------------------------

static PASSWORD_STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["password", "credentials"]));

/// Validates that a password-shaped match is plausibly a real credential:
/// rejects email addresses and bare dictionary words, and requires at least
/// one digit and one special character.
pub fn is_valid_password(pattern_text: &str) -> bool {
    if pattern_text.contains('@')
        || PASSWORD_STOPWORDS.contains(pattern_text.to_lowercase().as_str())
    {
        return false;
    }

    let has_digit = pattern_text.chars().any(|c| c.is_ascii_digit());
    let has_special = pattern_text.chars().any(|c| "$!%*?&#".contains(c));

    has_digit && has_special
}

// --- Dispatch ----------------------------------------------------------------

/// The closed set of validators a recognizer definition may name. An unknown
/// name in the registry config is a configuration error at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorKind {
    Aadhaar,
    DrivingLicense,
    GstReference,
    CreditCard,
    UsSsn,
    Password,
}

impl ValidatorKind {
    /// Resolves a validator name from the registry configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "in_aadhaar" => Some(Self::Aadhaar),
            "in_driving_license" => Some(Self::DrivingLicense),
            "in_gst_reference" => Some(Self::GstReference),
            "credit_card" => Some(Self::CreditCard),
            "us_ssn" => Some(Self::UsSsn),
            "password" => Some(Self::Password),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Aadhaar => "in_aadhaar",
            Self::DrivingLicense => "in_driving_license",
            Self::GstReference => "in_gst_reference",
            Self::CreditCard => "credit_card",
            Self::UsSsn => "us_ssn",
            Self::Password => "password",
        }
    }

    /// Runs the validator against a sanitized candidate value.
    ///
    /// All current validators are total functions, but the signature allows a
    /// validator to fail as a value so the engine can isolate it.
    pub fn validate(&self, sanitized_value: &str) -> Result<bool, ValidatorError> {
        Ok(match self {
            Self::Aadhaar => is_valid_aadhaar(sanitized_value),
            Self::DrivingLicense => is_valid_in_driving_license(sanitized_value),
            Self::GstReference => is_valid_in_gst_reference(sanitized_value),
            Self::CreditCard => is_valid_credit_card(sanitized_value),
            Self::UsSsn => is_valid_us_ssn(sanitized_value),
            Self::Password => is_valid_password(sanitized_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_sanitize_value_strips_separators() {
        let p = pairs(&[("-", ""), (" ", ""), (":", "")]);
        assert_eq!(sanitize_value("2345 6789-0123", &p), "234567890123");
    }

    #[test]
    fn test_verhoeff_known_valid() {
        // Canonical example: 236 with check digit 3.
        assert!(is_verhoeff_number("2363"));
        assert!(!is_verhoeff_number("2364"));
        assert!(!is_verhoeff_number("23a3"));
    }

    #[test]
    fn test_verhoeff_check_digit_round_trip() {
        for base in ["236", "123456789", "23456789012"] {
            let check = verhoeff_check_digit(base).unwrap();
            let full = format!("{base}{check}");
            assert!(is_verhoeff_number(&full), "generated {full} must validate");
        }
        assert!(verhoeff_check_digit("12x").is_none());
    }

    #[test]
    fn test_aadhaar_valid_and_single_digit_break() {
        let base = "23456789012";
        let check = verhoeff_check_digit(base).unwrap();
        let id = format!("{base}{check}");
        assert!(is_valid_aadhaar(&id));

        // Flip the check digit; Verhoeff detects every single-digit error.
        let flipped = ((check.to_digit(10).unwrap() + 1) % 10).to_string();
        let broken = format!("{base}{flipped}");
        assert!(!is_valid_aadhaar(&broken));
    }

    #[test]
    fn test_aadhaar_structural_rejections() {
        assert!(!is_valid_aadhaar("12345678901")); // 11 digits
        assert!(!is_valid_aadhaar("123456789012")); // leading 1
        let base = "23333456789";
        let check = verhoeff_check_digit(base).unwrap();
        assert!(!is_valid_aadhaar(&format!("{base}{check}"))); // quad run 3333
    }

    #[test]
    fn test_luhn() {
        assert!(is_valid_luhn("4539148803436467"));
        assert!(!is_valid_luhn("4539148803436468"));
        assert!(is_valid_credit_card("4539-1488-0343-6467"));
        assert!(!is_valid_credit_card("no digits"));
    }

    #[test]
    fn test_us_ssn() {
        assert!(is_valid_us_ssn("123-45-6789"));
        assert!(!is_valid_us_ssn("000-45-6789"));
        assert!(!is_valid_us_ssn("666-45-6789"));
        assert!(!is_valid_us_ssn("900-45-6789"));
        assert!(!is_valid_us_ssn("123-00-6789"));
        assert!(!is_valid_us_ssn("123-45-0000"));
        assert!(!is_valid_us_ssn("123456789"));
    }

    #[test]
    fn test_driving_license() {
        assert!(is_valid_in_driving_license("MH1220110012345"));
        assert!(!is_valid_in_driving_license("mh1220110012345")); // lowercase state code
        assert!(!is_valid_in_driving_license("MH12AB110012345")); // letters after prefix
        assert!(!is_valid_in_driving_license("MH123")); // too short
    }

    #[test]
    fn test_gst_reference() {
        assert!(is_valid_in_gst_reference("27AAPFU0939F1Z5")); // GSTIN, Maharashtra
        assert!(!is_valid_in_gst_reference("99AAPFU0939F1Z5")); // unknown state code
        assert!(is_valid_in_gst_reference("AA12345678901234")); // ARN
        assert!(!is_valid_in_gst_reference("AA1234567890123X")); // ARN with letter tail
        assert!(is_valid_in_gst_reference("MH23TR123456")); // TRN-style
        assert!(!is_valid_in_gst_reference("ABCDEFGH")); // no digits
    }

    #[test]
    fn test_password() {
        assert!(is_valid_password("S3cret!pass"));
        assert!(!is_valid_password("Password"));
        assert!(!is_valid_password("user@example.com"));
        assert!(!is_valid_password("lettersonly!")); // no digit
    }

    #[test]
    fn test_validator_kind_dispatch() {
        assert_eq!(
            ValidatorKind::from_name("in_aadhaar"),
            Some(ValidatorKind::Aadhaar)
        );
        assert_eq!(ValidatorKind::from_name("nope"), None);
        assert_eq!(
            ValidatorKind::CreditCard
                .validate("4539148803436467")
                .unwrap(),
            true
        );
    }
}
