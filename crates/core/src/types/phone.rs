//! Contact phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits, spaces, `+`, `-`, `(`, `)`.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// Too few or too many digits.
    #[error("phone number must have between {min} and {max} digits (got {got})")]
    DigitCount {
        /// Minimum allowed digits.
        min: usize,
        /// Maximum allowed digits.
        max: usize,
        /// Digits found in the input.
        got: usize,
    },
}

/// A contact phone number, as typed at checkout.
///
/// Formatting characters are accepted on input; [`Phone::digits`] gives the
/// canonical form. The value is persisted as a plain string so it can prefill
/// the next checkout.
///
/// ## Examples
///
/// ```
/// use shopfront_core::Phone;
///
/// assert!(Phone::parse("+1 (555) 010-2030").is_ok());
/// assert!(Phone::parse("").is_err());
/// assert!(Phone::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits (short local numbers).
    pub const MIN_DIGITS: usize = 6;
    /// Maximum number of digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters that are
    /// not part of a phone number, or has an implausible digit count.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')')))
        {
            return Err(PhoneError::InvalidCharacter(bad));
        }

        let digits = trimmed.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneError::DigitCount {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
                got: digits,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the phone number as entered (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns only the digits, with a leading `+` preserved.
    #[must_use]
    pub fn digits(&self) -> String {
        let prefix = if self.0.starts_with('+') { "+" } else { "" };
        let digits: String = self.0.chars().filter(char::is_ascii_digit).collect();
        format!("{prefix}{digits}")
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_numbers() {
        assert!(Phone::parse("5550102030").is_ok());
        assert!(Phone::parse("+44 20 7946 0958").is_ok());
        assert!(Phone::parse("(555) 010-2030").is_ok());
    }

    #[test]
    fn test_parse_trims() {
        let phone = Phone::parse("  555 0102  ").unwrap();
        assert_eq!(phone.as_str(), "555 0102");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            Phone::parse("555-CALL-NOW"),
            Err(PhoneError::InvalidCharacter('C'))
        );
    }

    #[test]
    fn test_parse_digit_count() {
        assert!(matches!(
            Phone::parse("123"),
            Err(PhoneError::DigitCount { got: 3, .. })
        ));
        assert!(matches!(
            Phone::parse("1234567890123456"),
            Err(PhoneError::DigitCount { got: 16, .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let phone: Phone = serde_json::from_str("\" 555 0102 \"").unwrap();
        assert_eq!(phone.as_str(), "555 0102");
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"555 0102\"");

        assert!(serde_json::from_str::<Phone>("\"call me\"").is_err());
        assert!(serde_json::from_str::<Phone>("\"\"").is_err());
    }

    #[test]
    fn test_digits() {
        let phone = Phone::parse("+1 (555) 010-2030").unwrap();
        assert_eq!(phone.digits(), "+15550102030");
    }
}
