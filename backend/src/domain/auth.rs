//! Authentication primitives: login credentials and registration requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{Email, UserValidationError, Username};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Identifier was missing or blank once trimmed.
    EmptyIdentifier,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentifier => write!(f, "identifier must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `identifier` is trimmed and must not be empty after trimming. It is
///   matched against both the email and the username.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "pw").unwrap();
/// assert_eq!(creds.identifier(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw identifier/password inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = identifier.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            identifier: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email or username supplied by the caller.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Reasons a registration payload is rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// The username failed validation.
    Username(UserValidationError),
    /// The email failed validation.
    Email(UserValidationError),
    /// The password was empty.
    EmptyPassword,
}

impl RegistrationValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Username(_) => "username",
            Self::Email(_) => "email",
            Self::EmptyPassword => "password",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Username(UserValidationError::EmptyUsername)
            | Self::Email(UserValidationError::EmptyEmail) => "empty",
            Self::Username(UserValidationError::UsernameTooLong { .. })
            | Self::Email(UserValidationError::EmailTooLong { .. }) => "too_long",
            Self::EmptyPassword => "empty",
            Self::Username(_) | Self::Email(_) => "invalid_format",
        }
    }
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(err) | Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

/// Shape-validated registration request.
///
/// Uniqueness and the confirmation match are checked by the registration
/// service, in that order, because the duplicate checks must win.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
    confirm_password: Zeroizing<String>,
}

impl Registration {
    /// Validate field shapes.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Registration;
    ///
    /// let reg = Registration::try_from_parts("ada", "ada@example.com", "pw", "pw").unwrap();
    /// assert!(reg.passwords_match());
    /// ```
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username).map_err(RegistrationValidationError::Username)?;
        let email = Email::new(email).map_err(RegistrationValidationError::Email)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
            confirm_password: Zeroizing::new(confirm_password.to_owned()),
        })
    }

    /// Requested handle.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Requested contact address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the confirmation equals the password exactly.
    pub fn passwords_match(&self) -> bool {
        self.password.as_str() == self.confirm_password.as_str()
    }
}
