//! Pre-flight checks before commands that need external services.
//!
//! Fails fast with a readable hint instead of degrading every answer to an
//! apology because a key was never set.

use crate::config::{ApiSettings, Settings};
use crate::error::{Result, VettError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering needs the chat backend and embeddings.
    Ask,
    /// Summarizing files needs the chat backend.
    Summarize,
    /// Listing opens the knowledge store, which needs embeddings.
    List,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask => {
            check_api_key(&settings.backend)?;
            check_api_key(&settings.embedding.api)?;
        }
        Operation::Summarize => {
            check_api_key(&settings.backend)?;
        }
        Operation::List => {
            check_api_key(&settings.embedding.api)?;
        }
    }
    Ok(())
}

/// Check that the key variable named by `api` is set and non-empty.
pub fn check_api_key(api: &ApiSettings) -> Result<()> {
    let name = &api.api_key_env;
    match std::env::var(name) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(VettError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            name, name
        ))),
        Err(_) => Err(VettError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            name, name
        ))),
    }
}
