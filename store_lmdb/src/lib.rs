//! LMDB storage backend for verification records.
//!
//! Implements the `credo-store` traits using the `heed` LMDB bindings.
//! Each logical store maps to one LMDB database within a single environment.

pub mod environment;
pub mod error;
pub mod record;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use record::LmdbRecordStore;
