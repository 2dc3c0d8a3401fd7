//! Application user accounts and credential policy.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("Email is not valid.")]
    InvalidEmail,
    #[error("{field} must be at least {min} characters long.")]
    NameTooShort { field: &'static str, min: usize },
    #[error("{field} can't be more than {max} characters long.")]
    NameTooLong { field: &'static str, max: usize },
    #[error("Password must be at least 6 characters long.")]
    PasswordTooShort,
    #[error("Password must contain at least one uppercase letter.")]
    PasswordMissingUppercase,
    #[error("Password must contain at least one number.")]
    PasswordMissingDigit,
    #[error("Password must contain at least one non-alphanumeric character.")]
    PasswordMissingSymbol,
    #[error("Role is not valid.")]
    InvalidRole,
}

/// Authorization role attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    Guest,
}

impl Role {
    /// Parse the wire representation used in requests and the session cookie.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Guest" => Ok(Self::Guest),
            _ => Err(UserValidationError::InvalidRole),
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Guest => "Guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated email address.
///
/// The check is deliberately shallow: one `@` with non-empty local and domain
/// parts and a dot in the domain. Deliverability is the mail port's problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise (lowercase) an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into().trim().to_lowercase();
        let Some((local, domain)) = value.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(UserValidationError::InvalidEmail);
        }
        if value.contains(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum length for first and last names.
pub const NAME_MIN: usize = 3;
/// Maximum length for first and last names.
pub const NAME_MAX: usize = 10;

/// Validated first or last name (3 to 10 characters).
///
/// Deliberately not `Deserialize`: requests carry plain strings that are
/// validated with the owning field's name for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name against the length bounds, naming the field in errors.
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let value = value.into();
        let length = value.chars().count();
        if length < NAME_MIN {
            return Err(UserValidationError::NameTooShort {
                field,
                min: NAME_MIN,
            });
        }
        if length > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Enforce the password policy on a clear-text candidate.
///
/// At least six characters with one uppercase letter, one digit, and one
/// non-alphanumeric character.
pub fn validate_password(candidate: &str) -> Result<(), UserValidationError> {
    if candidate.chars().count() < 6 {
        return Err(UserValidationError::PasswordTooShort);
    }
    if !candidate.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(UserValidationError::PasswordMissingUppercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserValidationError::PasswordMissingDigit);
    }
    if !candidate.chars().any(|c| !c.is_alphanumeric()) {
        return Err(UserValidationError::PasswordMissingSymbol);
    }
    Ok(())
}

/// Opaque password hash. Never serialized into API responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string produced by the auth adapter.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash for storage or verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Application user.
///
/// The password hash lives alongside the profile fields but is excluded from
/// the serde surface; responses can therefore serialize `User` directly.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    #[schema(value_type = String, example = "ada@example.com")]
    pub email: Email,
    #[schema(value_type = String, example = "Ada")]
    pub first_name: PersonName,
    #[schema(value_type = String, example = "Lovelace")]
    pub last_name: PersonName,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip)]
    pub password_hash: PasswordHash,
}

impl User {
    /// Whether this account may mutate protected resources.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
