//! Contact details for customers entered at the counter.
//!
//! Walk-in customers are usually identified by a mobile number, so [`Phone`]
//! normalizes the many ways staff type one in.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum email length (RFC 5321).
const MAX_EMAIL_LENGTH: usize = 254;

/// Errors that can occur when parsing contact details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("email cannot be empty")]
    EmptyEmail,
    #[error("email must be at most 254 characters")]
    EmailTooLong,
    #[error("email must look like name@domain")]
    MalformedEmail,
    #[error("phone number must have 10 digits starting with 6-9")]
    InvalidPhone,
}

/// A syntactically plausible email address.
///
/// ```
/// use ayucan_core::Email;
///
/// assert!(Email::parse("ops@ayucan.in").is_ok());
/// assert!(Email::parse("ops@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and lowercase an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError`] if the value is empty, too long, or lacks a
    /// local part and a dotted domain around a single `@`.
    pub fn parse(input: &str) -> Result<Self, ContactError> {
        let value = input.trim();
        if value.is_empty() {
            return Err(ContactError::EmptyEmail);
        }
        if value.len() > MAX_EMAIL_LENGTH {
            return Err(ContactError::EmailTooLong);
        }
        let (local, domain) = value.split_once('@').ok_or(ContactError::MalformedEmail)?;
        if local.is_empty()
            || domain.contains('@')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(ContactError::MalformedEmail);
        }
        Ok(Self(value.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 10-digit Indian mobile number.
///
/// Accepts `+91`, `91` and `0` prefixes and ignores spaces, dashes and
/// brackets, so `+91 98765-43210` and `098765 43210` are the same number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse and normalize a mobile number.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::InvalidPhone`] unless exactly ten digits
    /// starting with 6-9 remain after stripping the prefix.
    pub fn parse(input: &str) -> Result<Self, ContactError> {
        let trimmed = input.trim();
        if trimmed
            .chars()
            .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')')))
        {
            return Err(ContactError::InvalidPhone);
        }

        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        let national = match digits.len() {
            10 => digits.as_str(),
            11 => digits.strip_prefix('0').ok_or(ContactError::InvalidPhone)?,
            12 => digits.strip_prefix("91").ok_or(ContactError::InvalidPhone)?,
            _ => return Err(ContactError::InvalidPhone),
        };

        if !national.starts_with(['6', '7', '8', '9']) {
            return Err(ContactError::InvalidPhone);
        }
        Ok(Self(national.to_string()))
    }

    /// The bare ten digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form used on printed invoices (`+91 98765 43210`).
    #[must_use]
    pub fn display(&self) -> String {
        let (first, second) = self.0.split_at(5);
        format!("+91 {first} {second}")
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_parse() {
        assert_eq!(
            Email::parse("  Ops@Ayucan.in ").unwrap().as_str(),
            "ops@ayucan.in"
        );
        assert_eq!(Email::parse(""), Err(ContactError::EmptyEmail));
        assert_eq!(Email::parse("no-at"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("@ayucan.in"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("a@b@c.in"), Err(ContactError::MalformedEmail));
        assert_eq!(Email::parse("a@localhost"), Err(ContactError::MalformedEmail));
    }

    #[test]
    fn test_phone_normalizes_prefixes() {
        for input in ["9876543210", "+91 98765-43210", "098765 43210", "(91) 98765 43210"] {
            assert_eq!(Phone::parse(input).unwrap().as_str(), "9876543210", "{input}");
        }
    }

    #[test]
    fn test_phone_rejects_invalid() {
        assert!(Phone::parse("12345").is_err());
        assert!(Phone::parse("5876543210").is_err());
        assert!(Phone::parse("98765x3210").is_err());
        assert!(Phone::parse("449876543210").is_err());
    }

    #[test]
    fn test_phone_display() {
        assert_eq!(
            Phone::parse("9876543210").unwrap().display(),
            "+91 98765 43210"
        );
    }
}
