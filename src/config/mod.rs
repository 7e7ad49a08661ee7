//! # Store Configuration
//!
//! Configuration loaded from environment variables with defaults from
//! `crate::constants`. The CLI also reads a `.env` file before loading.

mod store;

pub use store::StoreConfig;

/// Load configuration from environment variables with defaults
///
/// # Errors
///
/// Returns `StoreError::Config` for values that are present but invalid.
pub fn load_config() -> Result<StoreConfig, crate::error::StoreError> {
    StoreConfig::from_env()
}
