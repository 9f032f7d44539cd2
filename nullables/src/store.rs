//! Nullable store: thread-safe in-memory storage for testing.

use credo_store::record::{next_version, RecordStore, VersionedRecord};
use credo_store::StoreError;
use credo_types::CandidateId;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// An in-memory record store with the same version rules as the LMDB one.
#[derive(Default)]
pub struct NullRecordStore {
    records: Mutex<BTreeMap<CandidateId, VersionedRecord>>,
}

impl NullRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump a stored record's version as if another writer had saved it.
    pub fn touch(&self, candidate: &CandidateId) {
        if let Some(record) = self.records.lock().unwrap().get_mut(candidate) {
            record.version += 1;
        }
    }
}

impl RecordStore for NullRecordStore {
    fn get_record(&self, candidate: &CandidateId) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(candidate).cloned())
    }

    fn put_record(
        &self,
        candidate: &CandidateId,
        expected_version: Option<u64>,
        data: &[u8],
    ) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let current = records.get(candidate).map(|r| r.version);
        let version = next_version(candidate, current, expected_version)?;
        records.insert(
            candidate.clone(),
            VersionedRecord {
                version,
                data: data.to_vec(),
            },
        );
        Ok(version)
    }

    fn list_candidates(&self) -> Result<Vec<CandidateId>, StoreError> {
        Ok(self.records.lock().unwrap().keys().cloned().collect())
    }
}
