//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    /// The local part (before @) is empty or too long.
    #[error("email local part must be 1-{max} characters")]
    LocalPartLength {
        /// Maximum allowed length.
        max: usize,
    },
    /// The local part contains a character outside the allowed set.
    #[error("email local part contains invalid character {0:?}")]
    InvalidLocalChar(char),
    /// The local part has a leading, trailing, or doubled dot.
    #[error("email local part has a misplaced dot")]
    MisplacedDot,
    /// The domain has fewer than two labels.
    #[error("email domain must contain at least one dot")]
    DomainNotQualified,
    /// A domain label is empty, too long, or malformed.
    #[error("email domain label {0:?} is invalid")]
    InvalidDomainLabel(String),
}

/// An email address.
///
/// Validation follows the common subset of RFC 5322 accepted by mainstream
/// web stacks: dot-atom local parts and fully qualified host names. Quoted
/// local parts and IP-literal domains are rejected.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol
/// - Local part: 1-64 characters of atext, dots allowed between atoms
/// - Domain: at least two labels of 1-63 alphanumerics or hyphens, no label
///   starting or ending with a hyphen
///
/// ## Examples
///
/// ```
/// use userbase_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());             // empty
/// assert!(Email::parse("no-at-symbol").is_err()); // missing @
/// assert!(Email::parse("@domain.com").is_err());  // empty local part
/// assert!(Email::parse("user@localhost").is_err()); // unqualified domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Maximum length of the local part (RFC 5321).
    pub const MAX_LOCAL_LENGTH: usize = 64;

    /// Maximum length of a single domain label (RFC 1035).
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns the first [`EmailError`] the input violates.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::AtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::AtSymbol);
        }

        validate_local_part(local)?;
        validate_domain(domain)?;

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

const fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

fn validate_local_part(local: &str) -> Result<(), EmailError> {
    if local.is_empty() || local.len() > Email::MAX_LOCAL_LENGTH {
        return Err(EmailError::LocalPartLength {
            max: Email::MAX_LOCAL_LENGTH,
        });
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(EmailError::MisplacedDot);
    }

    if let Some(bad) = local.chars().find(|&c| c != '.' && !is_atext(c)) {
        return Err(EmailError::InvalidLocalChar(bad));
    }

    Ok(())
}

fn validate_domain(domain: &str) -> Result<(), EmailError> {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(EmailError::DomainNotQualified);
    }

    for label in labels {
        let well_formed = !label.is_empty()
            && label.len() <= Email::MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !well_formed {
            return Err(EmailError::InvalidDomainLabel(label.to_owned()));
        }
    }

    Ok(())
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name@example.com").is_ok());
        assert!(Email::parse("user+tag@example.com").is_ok());
        assert!(Email::parse("user@subdomain.example.com").is_ok());
        assert!(Email::parse("user@example.co.uk").is_ok());
        assert!(Email::parse("o'brien@example.ie").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
        assert!(Email::parse("x@my-host.example").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_at_symbol() {
        assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::AtSymbol));
        assert_eq!(Email::parse("a@b@example.com"), Err(EmailError::AtSymbol));
    }

    #[test]
    fn test_parse_local_part_length() {
        assert!(matches!(
            Email::parse("@domain.com"),
            Err(EmailError::LocalPartLength { .. })
        ));
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(matches!(
            Email::parse(&long_local),
            Err(EmailError::LocalPartLength { .. })
        ));
    }

    #[test]
    fn test_parse_misplaced_dots() {
        assert_eq!(
            Email::parse(".user@example.com"),
            Err(EmailError::MisplacedDot)
        );
        assert_eq!(
            Email::parse("user.@example.com"),
            Err(EmailError::MisplacedDot)
        );
        assert_eq!(
            Email::parse("us..er@example.com"),
            Err(EmailError::MisplacedDot)
        );
    }

    #[test]
    fn test_parse_invalid_local_char() {
        assert_eq!(
            Email::parse("us er@example.com"),
            Err(EmailError::InvalidLocalChar(' '))
        );
        assert_eq!(
            Email::parse("us\"er@example.com"),
            Err(EmailError::InvalidLocalChar('"'))
        );
    }

    #[test]
    fn test_parse_unqualified_domain() {
        assert_eq!(
            Email::parse("user@localhost"),
            Err(EmailError::DomainNotQualified)
        );
        assert_eq!(Email::parse("user@"), Err(EmailError::DomainNotQualified));
    }

    #[test]
    fn test_parse_invalid_domain_labels() {
        assert!(matches!(
            Email::parse("user@example..com"),
            Err(EmailError::InvalidDomainLabel(_))
        ));
        assert!(matches!(
            Email::parse("user@-example.com"),
            Err(EmailError::InvalidDomainLabel(_))
        ));
        assert!(matches!(
            Email::parse("user@exa_mple.com"),
            Err(EmailError::InvalidDomainLabel(_))
        ));
        assert!(matches!(
            Email::parse("user@example.com."),
            Err(EmailError::InvalidDomainLabel(_))
        ));
    }

    #[test]
    fn test_local_part_and_domain() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.local_part(), "user");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Email = serde_json::from_str("\"user@example.com\"").unwrap();
        assert_eq!(parsed.as_str(), "user@example.com");
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"user@example.com\""
        );
    }
}
