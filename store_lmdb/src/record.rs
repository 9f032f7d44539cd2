//! LMDB implementation of RecordStore.
//!
//! Keys are the candidate id bytes; values are bincode-encoded
//! [`VersionedRecord`]s. The version check and the write happen inside one
//! write transaction, which LMDB serializes across writers.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use credo_store::record::next_version;
use credo_store::{RecordStore, StoreError, VersionedRecord};
use credo_types::CandidateId;

use crate::LmdbError;

pub struct LmdbRecordStore {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
}

fn decode(bytes: &[u8]) -> Result<VersionedRecord, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

impl RecordStore for LmdbRecordStore {
    fn get_record(&self, candidate: &CandidateId) -> Result<Option<VersionedRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let stored = self
            .records_db
            .get(&rtxn, candidate.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        match stored {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn put_record(
        &self,
        candidate: &CandidateId,
        expected_version: Option<u64>,
        data: &[u8],
    ) -> Result<u64, StoreError> {
        let key = candidate.as_str().as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        let current = match self.records_db.get(&wtxn, key).map_err(LmdbError::from)? {
            Some(bytes) => Some(decode(bytes)?.version),
            None => None,
        };
        let version = next_version(candidate, current, expected_version)?;

        let value = bincode::serialize(&VersionedRecord {
            version,
            data: data.to_vec(),
        })
        .map_err(LmdbError::from)?;
        self.records_db
            .put(&mut wtxn, key, &value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(%candidate, version, bytes = data.len(), "stored verification record");
        Ok(version)
    }

    fn list_candidates(&self) -> Result<Vec<CandidateId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self.records_db.iter(&rtxn).map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in iter {
            let (key, _) = entry.map_err(LmdbError::from)?;
            let raw = std::str::from_utf8(key)
                .map_err(|e| StoreError::Corruption(format!("non-utf8 record key: {e}")))?;
            let id = CandidateId::new(raw)
                .map_err(|e| StoreError::Corruption(format!("bad record key {raw:?}: {e}")))?;
            out.push(id);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
        let dir = tempfile::tempdir().expect("temp dir");
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env");
        (dir, env)
    }

    fn cand(s: &str) -> CandidateId {
        CandidateId::new(s).unwrap()
    }

    #[test]
    fn insert_then_read_back() {
        let (_dir, env) = temp_env();
        let store = env.record_store();
        let version = store.put_record(&cand("alice"), None, b"v1").unwrap();
        assert_eq!(version, 1);

        let stored = store.get_record(&cand("alice")).unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.data, b"v1");
        assert!(store.get_record(&cand("bob")).unwrap().is_none());
    }

    #[test]
    fn second_insert_for_same_candidate_is_rejected() {
        let (_dir, env) = temp_env();
        let store = env.record_store();
        store.put_record(&cand("alice"), None, b"v1").unwrap();
        let err = store.put_record(&cand("alice"), None, b"again").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.get_record(&cand("alice")).unwrap().unwrap().data, b"v1");
    }

    #[test]
    fn stale_writer_loses() {
        let (_dir, env) = temp_env();
        let store = env.record_store();
        store.put_record(&cand("alice"), None, b"v1").unwrap();
        assert_eq!(store.put_record(&cand("alice"), Some(1), b"v2").unwrap(), 2);

        let err = store.put_record(&cand("alice"), Some(1), b"stale").unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert_eq!(store.get_record(&cand("alice")).unwrap().unwrap().data, b"v2");
    }

    #[test]
    fn lists_candidates_in_key_order() {
        let (_dir, env) = temp_env();
        let store = env.record_store();
        for name in ["carol", "alice", "bob"] {
            store.put_record(&cand(name), None, name.as_bytes()).unwrap();
        }
        let listed = store.list_candidates().unwrap();
        assert_eq!(listed, vec![cand("alice"), cand("bob"), cand("carol")]);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
            env.record_store()
                .put_record(&cand("alice"), None, b"persisted")
                .unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
        let stored = env.record_store().get_record(&cand("alice")).unwrap().unwrap();
        assert_eq!(stored.data, b"persisted");
    }
}
