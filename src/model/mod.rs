//! # Secret Records
//!
//! Persisted record schema and the result variants returned by the store.
//!
//! - `record` - `SecretRecord` and its derived `SecretStatus`
//! - `ttl` - the dual-purpose `TtlDeadline`
//! - `payload` - the opaque `EncryptedSecret` ciphertext
//! - `timestamp` - ISO-8601 formatting used on the wire
//! - `outcome` - `CreateOutcome`, `FetchOutcome`, `DeleteOutcome`

pub mod outcome;
pub mod payload;
pub mod record;
pub mod timestamp;
pub mod ttl;

pub use outcome::{CreateOutcome, DeleteOutcome, FetchOutcome};
pub use payload::EncryptedSecret;
pub use record::{SecretRecord, SecretStatus};
pub use ttl::TtlDeadline;
