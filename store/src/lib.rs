//! Abstract persistence traits for verification records.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod record;

pub use error::StoreError;
pub use record::{RecordStore, VersionedRecord};
