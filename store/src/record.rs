//! Verification record storage trait.

use crate::StoreError;
use credo_types::CandidateId;
use serde::{Deserialize, Serialize};

/// An encoded record together with the version it was stored at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedRecord {
    pub version: u64,
    pub data: Vec<u8>,
}

/// Trait for storing one verification record per candidate.
///
/// Writes are optimistic: the caller states which version it read, and the
/// store refuses the write if someone else saved in between. This is the only
/// mutual exclusion the workflow relies on.
pub trait RecordStore {
    /// Get the record for a candidate, if one exists.
    fn get_record(&self, candidate: &CandidateId) -> Result<Option<VersionedRecord>, StoreError>;

    /// Store a record.
    ///
    /// - `expected_version = None` inserts; fails with [`StoreError::Duplicate`]
    ///   if the candidate already has a record.
    /// - `expected_version = Some(v)` updates; fails with [`StoreError::NotFound`]
    ///   if there is no record and [`StoreError::Conflict`] if the stored
    ///   version is not `v`.
    ///
    /// Returns the version the record was stored at.
    fn put_record(
        &self,
        candidate: &CandidateId,
        expected_version: Option<u64>,
        data: &[u8],
    ) -> Result<u64, StoreError>;

    /// All candidates with a stored record, in key order.
    fn list_candidates(&self) -> Result<Vec<CandidateId>, StoreError>;
}

/// Apply the optimistic-concurrency rule shared by every backend.
///
/// `current` is the version currently stored (if any). Returns the version the
/// new write should be stored at.
pub fn next_version(
    candidate: &CandidateId,
    current: Option<u64>,
    expected: Option<u64>,
) -> Result<u64, StoreError> {
    match (current, expected) {
        (None, None) => Ok(1),
        (Some(_), None) => Err(StoreError::Duplicate(candidate.to_string())),
        (None, Some(_)) => Err(StoreError::NotFound(candidate.to_string())),
        (Some(found), Some(expected)) if found == expected => Ok(found + 1),
        (Some(found), Some(expected)) => Err(StoreError::Conflict {
            key: candidate.to_string(),
            expected,
            found,
        }),
    }
}
