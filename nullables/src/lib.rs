//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the workflow (clock, code generation, code
//! delivery, storage) sits behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod codes;
pub mod notifier;
pub mod store;

pub use clock::NullClock;
pub use codes::NullCodeSource;
pub use notifier::{NullNotifier, SentCode};
pub use store::NullRecordStore;
