//! Accounts: identifiers, usernames, password policy, roles and users.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::coins::Deposit;

/// Validation errors returned by the account constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    UsernameTooShort { min: usize },
    UsernameInvalidCharacters,
    PasswordTooShort { min: usize },
    PasswordMissingLowercase,
    PasswordMissingUppercase,
    PasswordMissingDigit,
    PasswordMissingSymbol,
    UnknownRole { value: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits, '@', '.', '_' or '-'"
            ),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMissingLowercase => {
                write!(f, "password must contain a lowercase letter")
            }
            Self::PasswordMissingUppercase => {
                write!(f, "password must contain an uppercase letter")
            }
            Self::PasswordMissingDigit => write!(f, "password must contain a digit"),
            Self::PasswordMissingSymbol => write!(f, "password must contain a symbol"),
            Self::UnknownRole { value } => write!(
                f,
                "role '{value}' is not one of ADMIN, BUYER or SELLER"
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl UserValidationError {
    /// Machine-readable name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::UsernameTooShort { .. } | Self::UsernameInvalidCharacters => "username",
            Self::PasswordTooShort { .. }
            | Self::PasswordMissingLowercase
            | Self::PasswordMissingUppercase
            | Self::PasswordMissingDigit
            | Self::PasswordMissingSymbol => "password",
            Self::UnknownRole { .. } => "role",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Minimum length of a username.
pub const USERNAME_MIN: usize = 8;
/// Minimum length of a password once trimmed.
pub const PASSWORD_MIN: usize = 8;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        Regex::new("^[A-Za-z0-9@._-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Unique login name.
///
/// ## Invariants
/// - At least [`USERNAME_MIN`] characters.
/// - Only `[A-Za-z0-9@._-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Username;
    ///
    /// assert!(Username::new("12345678").is_ok());
    /// assert!(Username::new("skjdfs").is_err());
    /// ```
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.chars().count() < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if !username_regex().is_match(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plaintext password that satisfies the strength policy.
///
/// The policy is evaluated on the trimmed value: at least
/// [`PASSWORD_MIN`] characters with a lowercase letter, an uppercase letter,
/// a digit and at least one other character. The secret itself is kept as
/// supplied and zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate a candidate password.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Password;
    ///
    /// assert!(Password::new("mhG2P*&UksdfLK").is_ok());
    /// assert!(Password::new("AAAHAHAHAHAA").is_err());
    /// ```
    pub fn new(secret: impl Into<String>) -> Result<Self, UserValidationError> {
        let secret = Zeroizing::new(secret.into());
        let trimmed = secret.trim();

        if trimmed.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if !trimmed.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(UserValidationError::PasswordMissingLowercase);
        }
        if !trimmed.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(UserValidationError::PasswordMissingUppercase);
        }
        if !trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::PasswordMissingDigit);
        }
        if trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UserValidationError::PasswordMissingSymbol);
        }

        Ok(Self(secret))
    }

    /// Expose the secret to a credential hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Account role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Buyer,
    Seller,
}

impl Role {
    /// Canonical stored and serialised name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Buyer => "BUYER",
            Self::Seller => "SELLER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "BUYER" => Ok(Self::Buyer),
            "SELLER" => Ok(Self::Seller),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Application user as seen by the domain.
///
/// The credential hash never appears here; it only travels through the
/// credential lookup port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "buyer@example")]
    username: Username,
    #[schema(value_type = u64, example = 30)]
    deposit: Deposit,
    role: Role,
}

impl User {
    /// Build a user from validated components.
    pub fn new(id: UserId, username: Username, deposit: Deposit, role: Role) -> Self {
        Self {
            id,
            username,
            deposit,
            role,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Current coin balance.
    pub fn deposit(&self) -> Deposit {
        self.deposit
    }

    /// Role assigned at registration.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Copy of this user carrying a different balance.
    pub fn with_deposit(&self, deposit: Deposit) -> Self {
        Self {
            deposit,
            ..self.clone()
        }
    }
}
