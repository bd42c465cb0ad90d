//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameValidationError {
    Empty,
    TooLong { max: usize },
    InvalidCharacters,
}

impl fmt::Display for UsernameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username can not be empty."),
            Self::TooLong { max } => {
                write!(f, "Username must be at most {max} characters.")
            }
            Self::InvalidCharacters => write!(
                f,
                "Username may only contain letters, numbers, hyphens, or underscores.",
            ),
        }
    }
}

impl std::error::Error for UsernameValidationError {}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9_-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Unique account name, doubling as the stem of the user's on-disk files.
///
/// The character set deliberately excludes path separators and dots so the
/// name can never escape the data directory when embedded in a file path.
///
/// # Examples
/// ```
/// use backend::domain::Username;
///
/// let name = Username::new("alice").expect("valid username");
/// assert_eq!(name.as_ref(), "alice");
/// assert!(Username::new("../alice").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`] from owned input.
    pub fn new(username: impl Into<String>) -> Result<Self, UsernameValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UsernameValidationError> {
        if username.is_empty() {
            return Err(UsernameValidationError::Empty);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UsernameValidationError::TooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&username) {
            return Err(UsernameValidationError::InvalidCharacters);
        }

        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
