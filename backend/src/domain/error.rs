//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters decide how each kind
//! surfaces over HTTP: validation failures re-render the offending form,
//! missing records redirect with a flash message, and storage faults become a
//! generic failure page.

/// Stable category describing why a domain operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The supplied username/password pair does not match a stored account.
    InvalidCredentials,
    /// Registration attempted with a username that already exists.
    UsernameTaken,
    /// A recipe with the same normalized title already exists for this user.
    DuplicateTitle,
    /// A required text field was empty after trimming.
    EmptyField,
    /// An image link was selected but no address was provided.
    MissingLink,
    /// An image upload was selected but no file was attached.
    MissingUpload,
    /// Image data was supplied although "no image" was selected.
    UnexpectedImage,
    /// The requested recipe does not exist for this user.
    NotFound,
    /// Persisting or removing an uploaded image failed.
    UploadIo,
    /// The backing store could not be read or written.
    StorageUnavailable,
    /// An unexpected fault inside the domain or its supporting tasks.
    Internal,
}

impl ErrorKind {
    /// Whether the failure was caused by user input and should re-render the
    /// submitted form rather than fail the request outright.
    pub fn is_user_input(self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::UsernameTaken
                | Self::DuplicateTitle
                | Self::EmptyField
                | Self::MissingLink
                | Self::MissingUpload
                | Self::UnexpectedImage
        )
    }
}

/// Domain error carrying its category and the message shown to the user.
///
/// Validation kinds have a canonical message baked into their constructor so
/// every surface reports the same wording; infrastructure kinds accept a
/// free-form message destined for the logs, never the page.
///
/// # Examples
/// ```
/// use backend::domain::{DomainError, ErrorKind};
///
/// let err = DomainError::duplicate_title();
/// assert_eq!(err.kind(), ErrorKind::DuplicateTitle);
/// assert_eq!(err.message(), "A recipe with that name exists.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
}

impl DomainError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Sign-in rejected; deliberately silent about which half was wrong.
    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorKind::InvalidCredentials,
            "Invalid username or password.",
        )
    }

    /// Registration rejected because the username is already claimed.
    pub fn username_taken() -> Self {
        Self::new(ErrorKind::UsernameTaken, "That username is already taken.")
    }

    /// The user already has a recipe with this title.
    pub fn duplicate_title() -> Self {
        Self::new(ErrorKind::DuplicateTitle, "A recipe with that name exists.")
    }

    /// A required field was blank after trimming.
    pub fn empty_field() -> Self {
        Self::new(ErrorKind::EmptyField, "Field can not be empty.")
    }

    /// "Link" was chosen as the image source without an address.
    pub fn missing_link() -> Self {
        Self::new(ErrorKind::MissingLink, "Image link can not be empty.")
    }

    /// "Upload" was chosen as the image source without a file.
    pub fn missing_upload() -> Self {
        Self::new(ErrorKind::MissingUpload, "No image file was attached.")
    }

    /// Image data arrived although "no image" was selected.
    pub fn unexpected_image() -> Self {
        Self::new(
            ErrorKind::UnexpectedImage,
            "An image was supplied without selecting an image source.",
        )
    }

    /// The recipe id does not exist in this user's collection.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, "That recipe could not be found.")
    }

    /// Writing or removing an uploaded image failed at the filesystem.
    pub fn upload_io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UploadIo, message)
    }

    /// The credential or recipe store could not be read or written.
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageUnavailable, message)
    }

    /// Unexpected fault, such as a failed background hashing task.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Failure category for branching at the boundary.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message shown to the user (validation) or logged (infrastructure).
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {}
