//! Domain types and services for the recipe box.
//!
//! Purpose: define the strongly typed model (usernames, recipes, image
//! descriptors), the validators every form field passes through, and the
//! services driving the credential, recipe, and image stores through their
//! ports. Inbound adapters stay free of storage detail; outbound adapters
//! stay free of HTTP detail.
//!
//! Public surface:
//! - [`Username`] — account name and on-disk file stem.
//! - [`Recipe`], [`RecipeId`], [`RecipeCollection`] — the recipe model.
//! - [`AccountService`], [`RecipeService`] — operations over the ports.
//! - [`DomainError`], [`ErrorKind`] — transport-agnostic failures.

pub mod accounts;
pub mod collection;
pub mod error;
pub mod fields;
pub mod ports;
pub mod recipe;
pub mod service;
pub mod user;


pub use self::accounts::AccountService;
pub use self::collection::RecipeCollection;
pub use self::error::{DomainError, ErrorKind};
pub use self::ports::{
    CredentialMap, CredentialRepository, ImageRepository, RecipeRepository, RemoveOutcome,
    StorageError,
};
pub use self::recipe::{
    ImageChoice, ImageDescriptor, ImageSelection, PendingUpload, Recipe, RecipeField, RecipeId,
    RecipeUpdate, upload_filename,
};
pub use self::service::{NewRecipeInput, RecipeService};
pub use self::user::{USERNAME_MAX, Username, UsernameValidationError};
