//! Server configuration from command-line flags and environment variables.

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use clap::Parser;
use thiserror::Error;
use tracing::warn;

/// Command-line and environment configuration for the recipe box server.
///
/// Every flag can also be set through its `RECIPE_BOX_*` environment
/// variable; flags win when both are given.
#[derive(Debug, Parser)]
#[command(name = "recipe-box", about = "Multi-user recipe box server", version)]
pub struct AppConfig {
    /// Socket address to listen on.
    #[arg(long, env = "RECIPE_BOX_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory holding the credentials file, recipe files, and images.
    #[arg(long, env = "RECIPE_BOX_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// File holding at least 64 bytes of session key material.
    #[arg(long, env = "RECIPE_BOX_SESSION_KEY_FILE")]
    session_key_file: Option<PathBuf>,

    /// Generate a throwaway session key when no key file is configured.
    ///
    /// Every restart then signs every visitor out, so this is for local
    /// development only.
    #[arg(long, env = "RECIPE_BOX_ALLOW_EPHEMERAL_KEY")]
    allow_ephemeral_key: bool,

    /// Mark the session cookie `Secure`; requires serving over HTTPS.
    #[arg(long, env = "RECIPE_BOX_COOKIE_SECURE")]
    cookie_secure: bool,
}

/// Why no session signing key could be produced.
#[derive(Debug, Error)]
pub enum SessionKeyError {
    #[error("failed to read session key file {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
    #[error("session key file {} holds {len} bytes; at least 64 are required", .path.display())]
    TooShort { path: PathBuf, len: usize },
    #[error("no session key file configured; pass --session-key-file or --allow-ephemeral-key")]
    Missing,
}

impl AppConfig {
    /// Address the server binds to.
    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    /// Directory all persistent state lives under.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Resolve the key that signs and encrypts session cookies.
    ///
    /// Reads the configured key file when there is one; otherwise a fresh
    /// random key is generated, but only when `--allow-ephemeral-key` opted
    /// in to losing all sessions on restart.
    ///
    /// # Errors
    /// [`SessionKeyError`] when the file cannot be read, holds fewer than
    /// the 64 bytes [`Key::derive_from`] requires, or no key source was
    /// configured at all.
    pub fn session_key(&self) -> Result<Key, SessionKeyError> {
        if let Some(path) = &self.session_key_file {
            let bytes = std::fs::read(path).map_err(|source| SessionKeyError::Unreadable {
                path: path.clone(),
                source,
            })?;
            if bytes.len() < 64 {
                return Err(SessionKeyError::TooShort {
                    path: path.clone(),
                    len: bytes.len(),
                });
            }
            return Ok(Key::derive_from(&bytes));
        }
        if self.allow_ephemeral_key {
            warn!("using an ephemeral session key; sessions reset on restart");
            return Ok(Key::generate());
        }
        Err(SessionKeyError::Missing)
    }
}
