//! Authentication primitives: login credentials and registration requests.
//!
//! Handlers build these from raw request strings before talking to a port,
//! so services only ever see validated input.

use std::fmt;

use zeroize::Zeroizing;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Username length bounds accepted at registration.
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=255;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and lower-cased, and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use backoffice::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Admin ", "password").expect("valid");
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Reasons a registration request is rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Username length falls outside [`USERNAME_LEN`].
    #[error("username must be between 3 and 255 characters")]
    UsernameLength,
    /// Username contains characters outside `[a-z0-9_.@-]`.
    #[error("username may only contain letters, digits, '_', '.', '@' and '-'")]
    UsernameCharacters,
    /// Password is shorter than [`MIN_PASSWORD_LEN`].
    #[error("password must be at least 8 characters")]
    PasswordTooShort,
}

/// Validated request to create a staff account.
///
/// Usernames are case-insensitive: they are stored lower-cased so the unique
/// constraint on `users.username` covers every spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a raw registration payload.
    ///
    /// # Examples
    /// ```
    /// use backoffice::domain::{Registration, RegistrationValidationError};
    ///
    /// let ok = Registration::try_from_parts("Till.Operator", "hunter2hunter2").expect("valid");
    /// assert_eq!(ok.username(), "till.operator");
    ///
    /// let err = Registration::try_from_parts("ab", "hunter2hunter2").expect_err("too short");
    /// assert_eq!(err, RegistrationValidationError::UsernameLength);
    /// ```
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let normalized = username.trim().to_lowercase();
        if !USERNAME_LEN.contains(&normalized.chars().count()) {
            return Err(RegistrationValidationError::UsernameLength);
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'))
        {
            return Err(RegistrationValidationError::UsernameCharacters);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegistrationValidationError::PasswordTooShort);
        }

        Ok(Self {
            username: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plain-text password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("alice", " spaced ").expect("valid");
        assert_eq!(creds.password(), " spaced ");
    }

    #[rstest]
    #[case("ab", "longenough", RegistrationValidationError::UsernameLength)]
    #[case("   abc   ", "short", RegistrationValidationError::PasswordTooShort)]
    #[case("bad name", "longenough", RegistrationValidationError::UsernameCharacters)]
    #[case("émile", "longenough", RegistrationValidationError::UsernameCharacters)]
    fn invalid_registrations(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_parts(username, password).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_normalises_username() {
        let registration =
            Registration::try_from_parts("  Shop.Floor@North-1 ", "correct horse").expect("valid");
        assert_eq!(registration.username(), "shop.floor@north-1");
    }

    #[rstest]
    fn overlong_usernames_are_rejected() {
        let username = "a".repeat(256);
        let err = Registration::try_from_parts(&username, "longenough").expect_err("too long");
        assert_eq!(err, RegistrationValidationError::UsernameLength);
    }
}
