//! Preferences error types.

use thiserror::Error;

/// Errors that can occur when reading or persisting preferences.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// Failed to read or write the preferences file.
    #[error("failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse or serialize preferences JSON.
    #[error("failed to parse preferences JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for preferences operations.
pub type Result<T> = std::result::Result<T, PreferencesError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
