//! In-memory [`CustomerStore`] with JSON snapshots.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StitchError};
use crate::schema::SourceKind;

use super::store::{
    ConflictStatus, Customer, CustomerSource, CustomerStore, ImportRecord, ImportSummary, NewConflict,
    SourceLink, SourceRecord, StitchingConflict, StoreError, StoreResult,
};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreData {
    customers: Vec<Customer>,
    sources: Vec<CustomerSource>,
    conflicts: Vec<StitchingConflict>,
    imports: Vec<ImportRecord>,
    /// Record tables keyed by table name.
    records: IndexMap<String, Vec<SourceRecord>>,
}

/// Thread-safe store kept in memory.
///
/// Every operation takes the lock once, so check-and-write steps such as
/// the source link upsert are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a pretty JSON snapshot, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| StitchError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let data = self.read()?;
        let file = File::create(path).map_err(io_err)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &*data)?;
        tracing::debug!(path = %path.display(), customers = data.customers.len(), "saved store snapshot");
        Ok(())
    }

    /// Read a snapshot written by [`InMemoryStore::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StitchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: StoreData = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    /// Load a snapshot, or start empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Records written to `table`.
    pub fn records(&self, table: &str) -> StoreResult<Vec<SourceRecord>> {
        Ok(self.read()?.records.get(table).cloned().unwrap_or_default())
    }

    /// Every source link of a customer.
    pub fn sources_for(&self, customer_id: Uuid) -> StoreResult<Vec<CustomerSource>> {
        Ok(self
            .read()?
            .sources
            .iter()
            .filter(|s| s.customer_id == customer_id)
            .cloned()
            .collect())
    }

    pub fn imports(&self) -> StoreResult<Vec<ImportRecord>> {
        Ok(self.read()?.imports.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

impl CustomerStore for InMemoryStore {
    fn find_customer_source(
        &self,
        org_id: &str,
        source: SourceKind,
        external_id: &str,
    ) -> StoreResult<Option<CustomerSource>> {
        Ok(self
            .read()?
            .sources
            .iter()
            .find(|s| s.org_id == org_id && s.source == source && s.external_id == external_id)
            .cloned())
    }

    fn find_customer_by_email(&self, org_id: &str, email: &str) -> StoreResult<Option<Customer>> {
        Ok(self
            .read()?
            .customers
            .iter()
            .find(|c| c.org_id == org_id && c.email.as_deref() == Some(email))
            .cloned())
    }

    fn find_customer_source_by_email(&self, org_id: &str, email: &str) -> StoreResult<Option<CustomerSource>> {
        Ok(self
            .read()?
            .sources
            .iter()
            .find(|s| s.org_id == org_id && s.external_email.as_deref() == Some(email))
            .cloned())
    }

    fn find_customers_by_name(&self, org_id: &str, name: &str, limit: usize) -> StoreResult<Vec<Customer>> {
        let name = name.to_lowercase();
        Ok(self
            .read()?
            .customers
            .iter()
            .filter(|c| c.org_id == org_id)
            .filter(|c| c.name.as_ref().is_some_and(|n| n.to_lowercase() == name))
            .take(limit)
            .cloned()
            .collect())
    }

    fn create_customer(&self, org_id: &str, email: Option<&str>, name: Option<&str>) -> StoreResult<Customer> {
        let customer = Customer {
            id: Uuid::new_v4(),
            org_id: org_id.to_string(),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            created_at: Utc::now(),
        };
        self.write()?.customers.push(customer.clone());
        Ok(customer)
    }

    fn upsert_customer_source(&self, link: SourceLink<'_>) -> StoreResult<()> {
        let mut data = self.write()?;
        let updated = CustomerSource {
            org_id: link.org_id.to_string(),
            customer_id: link.customer_id,
            source: link.source,
            external_id: link.external_id.to_string(),
            external_email: link.external_email.map(str::to_string),
            external_name: link.external_name.map(str::to_string),
            updated_at: Utc::now(),
        };

        match data
            .sources
            .iter_mut()
            .find(|s| s.org_id == link.org_id && s.source == link.source && s.external_id == link.external_id)
        {
            Some(existing) => *existing = updated,
            None => data.sources.push(updated),
        }
        Ok(())
    }

    fn insert_conflict(&self, conflict: NewConflict) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        self.write()?.conflicts.push(StitchingConflict {
            id,
            org_id: conflict.org_id,
            customer_a: conflict.customer_a,
            customer_b: conflict.customer_b,
            match_field: conflict.match_field,
            match_value: conflict.match_value,
            confidence: conflict.confidence,
            status: ConflictStatus::Pending,
            import_id: conflict.import_id,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn conflict_exists(&self, a: Uuid, b: Uuid) -> StoreResult<bool> {
        Ok(self.read()?.conflicts.iter().any(|c| c.involves_pair(a, b)))
    }

    fn insert_source_record(&self, table: &str, record: SourceRecord) -> StoreResult<()> {
        let mut data = self.write()?;
        let rows = data.records.entry(table.to_string()).or_default();
        if rows.iter().any(|r| r.org_id == record.org_id && r.key == record.key) {
            return Err(StoreError::Duplicate {
                table: table.to_string(),
                key: record.key,
            });
        }
        rows.push(record);
        Ok(())
    }

    fn list_customers(&self, org_id: &str) -> StoreResult<Vec<Customer>> {
        Ok(self
            .read()?
            .customers
            .iter()
            .filter(|c| c.org_id == org_id)
            .cloned()
            .collect())
    }

    fn customers_for_import(&self, import_id: Uuid) -> StoreResult<Vec<Customer>> {
        let data = self.read()?;
        let mut ids: Vec<Uuid> = data
            .records
            .values()
            .flatten()
            .filter(|r| r.import_id == import_id)
            .map(|r| r.customer_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        Ok(data
            .customers
            .iter()
            .filter(|c| ids.binary_search(&c.id).is_ok())
            .cloned()
            .collect())
    }

    fn create_import(&self, org_id: &str, file_name: &str, source: Option<SourceKind>) -> StoreResult<ImportRecord> {
        let record = ImportRecord {
            id: Uuid::new_v4(),
            org_id: org_id.to_string(),
            file_name: file_name.to_string(),
            source,
            started_at: Utc::now(),
            finished_at: None,
            summary: None,
        };
        self.write()?.imports.push(record.clone());
        Ok(record)
    }

    fn finish_import(&self, import_id: Uuid, source: SourceKind, summary: ImportSummary) -> StoreResult<()> {
        let mut data = self.write()?;
        let record = data
            .imports
            .iter_mut()
            .find(|i| i.id == import_id)
            .ok_or_else(|| StoreError::NotFound(format!("import {import_id}")))?;
        record.source = Some(source);
        record.summary = Some(summary);
        record.finished_at = Some(Utc::now());
        Ok(())
    }

    fn list_conflicts(&self, org_id: Option<&str>, status: Option<ConflictStatus>) -> StoreResult<Vec<StitchingConflict>> {
        Ok(self
            .read()?
            .conflicts
            .iter()
            .filter(|c| org_id.is_none_or(|org| c.org_id == org))
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn link<'a>(customer_id: Uuid, external_id: &'a str, email: Option<&'a str>) -> SourceLink<'a> {
        SourceLink {
            org_id: "org",
            customer_id,
            source: SourceKind::Payments,
            external_id,
            external_email: email,
            external_name: None,
        }
    }

    #[test]
    fn test_upsert_is_keyed_on_source_and_external_id() {
        let store = InMemoryStore::new();
        let a = store.create_customer("org", None, Some("A")).unwrap();
        let b = store.create_customer("org", None, Some("B")).unwrap();

        store.upsert_customer_source(link(a.id, "ch_1", None)).unwrap();
        store.upsert_customer_source(link(b.id, "ch_1", Some("b@x.com"))).unwrap();

        let found = store.find_customer_source("org", SourceKind::Payments, "ch_1").unwrap().unwrap();
        assert_eq!(found.customer_id, b.id);
        assert_eq!(store.sources_for(a.id).unwrap().len(), 0);
        assert!(store.find_customer_source("org", SourceKind::Ticketing, "ch_1").unwrap().is_none());
    }

    #[test]
    fn test_same_external_id_in_two_orgs() {
        let store = InMemoryStore::new();
        let a = store.create_customer("org", None, Some("A")).unwrap();
        let b = store.create_customer("org-b", None, Some("A")).unwrap();

        store.upsert_customer_source(link(a.id, "ch_1", None)).unwrap();
        store
            .upsert_customer_source(SourceLink {
                org_id: "org-b",
                ..link(b.id, "ch_1", None)
            })
            .unwrap();

        let in_a = store.find_customer_source("org", SourceKind::Payments, "ch_1").unwrap().unwrap();
        let in_b = store.find_customer_source("org-b", SourceKind::Payments, "ch_1").unwrap().unwrap();
        assert_eq!(in_a.customer_id, a.id);
        assert_eq!(in_b.customer_id, b.id);
        assert!(store.find_customer_source("org-c", SourceKind::Payments, "ch_1").unwrap().is_none());
    }

    #[test]
    fn test_lookups_are_org_scoped() {
        let store = InMemoryStore::new();
        let c = store.create_customer("org-a", Some("jane@a.com"), Some("Jane Doe")).unwrap();
        store.upsert_customer_source(link(c.id, "ch_1", Some("alt@a.com"))).unwrap();

        assert!(store.find_customer_by_email("org-a", "jane@a.com").unwrap().is_some());
        assert!(store.find_customer_by_email("org-b", "jane@a.com").unwrap().is_none());
        assert!(store.find_customer_source_by_email("org-a", "alt@a.com").unwrap().is_some());
        assert!(store.find_customer_source_by_email("org-b", "alt@a.com").unwrap().is_none());
        assert_eq!(store.find_customers_by_name("org-a", "JANE DOE", 5).unwrap().len(), 1);
    }

    #[test]
    fn test_name_lookup_respects_limit() {
        let store = InMemoryStore::new();
        for _ in 0..8 {
            store.create_customer("org", None, Some("Sam")).unwrap();
        }
        assert_eq!(store.find_customers_by_name("org", "sam", 5).unwrap().len(), 5);
    }

    #[test]
    fn test_duplicate_source_record() {
        let store = InMemoryStore::new();
        let record = SourceRecord {
            org_id: "org".into(),
            key: "ch_1".into(),
            customer_id: Uuid::new_v4(),
            import_id: Uuid::new_v4(),
            fields: Default::default(),
        };
        store.insert_source_record("payments", record.clone()).unwrap();
        let err = store.insert_source_record("payments", record.clone()).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        // Same key in another table or another org is fine.
        store.insert_source_record("tickets", record.clone()).unwrap();
        store
            .insert_source_record(
                "payments",
                SourceRecord {
                    org_id: "org-b".into(),
                    ..record
                },
            )
            .unwrap();
    }

    #[test]
    fn test_customers_for_import() {
        let store = InMemoryStore::new();
        let import = store.create_import("org", "x.csv", None).unwrap();
        let c = store.create_customer("org", None, None).unwrap();
        store.create_customer("org", None, None).unwrap();

        for key in ["a", "b"] {
            let record = SourceRecord {
                org_id: "org".into(),
                key: key.into(),
                customer_id: c.id,
                import_id: import.id,
                fields: Default::default(),
            };
            store.insert_source_record("payments", record).unwrap();
        }

        let touched = store.customers_for_import(import.id).unwrap();
        assert_eq!(touched, vec![c]);
    }

    #[test]
    fn test_finish_unknown_import() {
        let store = InMemoryStore::new();
        let err = store
            .finish_import(Uuid::new_v4(), SourceKind::Payments, ImportSummary::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = InMemoryStore::new();
        let a = store.create_customer("org", Some("a@x.com"), Some("A")).unwrap();
        let b = store.create_customer("org", Some("b@x.com"), Some("A")).unwrap();
        store
            .insert_conflict(NewConflict {
                org_id: "org".into(),
                customer_a: a.id,
                customer_b: b.id,
                match_field: "name".into(),
                match_value: "A".into(),
                confidence: 0.6,
                import_id: None,
            })
            .unwrap();
        store.save(&path).unwrap();

        let loaded = InMemoryStore::load(&path).unwrap();
        assert_eq!(loaded.list_customers("org").unwrap().len(), 2);
        assert!(loaded.conflict_exists(b.id, a.id).unwrap());
        let pending = loaded.list_conflicts(Some("org"), Some(ConflictStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(loaded.list_conflicts(None, Some(ConflictStatus::Merged)).unwrap().is_empty());
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = InMemoryStore::open(dir.path().join("none.json")).unwrap();
        assert!(store.list_customers("org").unwrap().is_empty());
    }
}
