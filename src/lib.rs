//! # Vanishing Secrets
//!
//! Lifecycle of ephemeral, one-time-readable secret records in a key-value
//! store with native TTL expiry.
//!
//! A caller encrypts a payload elsewhere and stores it with
//! [`SecretStore::create`]; a recipient redeems it once with
//! [`SecretStore::fetch_and_consume`], after which the record is marked
//! consumed and left for the backend to reap. [`SecretStore::delete`] removes
//! a record outright.
//!
//! ## Usage
//!
//! ```no_run
//! use chrono::TimeDelta;
//! use vanishing_secrets::{config::StoreConfig, FetchOutcome, SecretStore};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = StoreConfig::from_env()?;
//! let store = SecretStore::open(&config).await;
//!
//! store.create("abc", b"ciphertext".to_vec(), TimeDelta::minutes(5)).await?;
//! if let FetchOutcome::Consumed(record) = store.fetch_and_consume("abc").await? {
//!     println!("{} bytes delivered", record.encrypted_secret.len());
//! }
//! store.close();
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod observability;
pub mod store;

pub use backend::{DynamoDbBackend, InMemoryBackend, KeyValueBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BackendError, BackendFailureReason, StoreError};
pub use model::{
    CreateOutcome, DeleteOutcome, EncryptedSecret, FetchOutcome, SecretRecord, SecretStatus,
    TtlDeadline,
};
pub use store::{ConsumeGuarantee, SecretStore, StoreOptions};
