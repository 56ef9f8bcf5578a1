//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `SEGUNDA_MANA_API_URL` - Base URL of the REST backend (required)
//! - `SM_ADMIN_TOKEN` - Bearer token printed by `sm-cli login` (every
//!   command except `login`)

pub mod auth;
pub mod export;
pub mod orders;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use segunda_mana_admin::client::{AdminClient, BackendError};
use segunda_mana_core::csv::ExportError;
use segunda_mana_core::session::AuthToken;
use segunda_mana_core::{CollectionError, StatusError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Environment variable is present but unusable.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for the backend named by `SEGUNDA_MANA_API_URL`.
///
/// # Errors
///
/// Returns an error if the variable is missing or not a URL.
pub fn backend() -> Result<AdminClient, CliError> {
    dotenvy::dotenv().ok();

    let raw = std::env::var("SEGUNDA_MANA_API_URL")
        .map_err(|_| CliError::MissingEnvVar("SEGUNDA_MANA_API_URL"))?;
    let base = Url::parse(raw.trim())
        .map_err(|e| CliError::InvalidEnvVar("SEGUNDA_MANA_API_URL", e.to_string()))?;
    Ok(AdminClient::new(base)?)
}

/// The token from `SM_ADMIN_TOKEN`.
///
/// # Errors
///
/// Returns an error if the variable is missing or blank.
pub fn token() -> Result<AuthToken, CliError> {
    dotenvy::dotenv().ok();

    let secret = std::env::var("SM_ADMIN_TOKEN")
        .ok()
        .map(SecretString::from)
        .ok_or(CliError::MissingEnvVar("SM_ADMIN_TOKEN"))?;
    let token = AuthToken::new(secret.expose_secret().trim());
    if token.is_empty() {
        return Err(CliError::MissingEnvVar("SM_ADMIN_TOKEN"));
    }
    Ok(token)
}
