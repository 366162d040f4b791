//! Store wrapper with switchable write failures, for testing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::schema::SourceKind;

use super::memory::InMemoryStore;
use super::store::{
    ConflictStatus, Customer, CustomerSource, CustomerStore, ImportRecord, ImportSummary, NewConflict,
    SourceLink, SourceRecord, StitchingConflict, StoreError, StoreResult,
};

/// Delegates to an [`InMemoryStore`] but fails the writes it is told to.
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub inner: InMemoryStore,
    fail_links: AtomicBool,
    fail_conflicts: AtomicBool,
    fail_create_for: Mutex<Option<String>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_links(self) -> Self {
        self.fail_links.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_conflicts(self) -> Self {
        self.fail_conflicts.store(true, Ordering::SeqCst);
        self
    }

    /// Fail customer creation for rows carrying this name.
    pub fn failing_creation_for(self, name: &str) -> Self {
        if let Ok(mut target) = self.fail_create_for.lock() {
            *target = Some(name.to_string());
        }
        self
    }

    fn backend(op: &str) -> StoreError {
        StoreError::Backend(format!("{op} rejected"))
    }
}

impl CustomerStore for FailingStore {
    fn find_customer_source(
        &self,
        org_id: &str,
        source: SourceKind,
        external_id: &str,
    ) -> StoreResult<Option<CustomerSource>> {
        self.inner.find_customer_source(org_id, source, external_id)
    }

    fn find_customer_by_email(&self, org_id: &str, email: &str) -> StoreResult<Option<Customer>> {
        self.inner.find_customer_by_email(org_id, email)
    }

    fn find_customer_source_by_email(&self, org_id: &str, email: &str) -> StoreResult<Option<CustomerSource>> {
        self.inner.find_customer_source_by_email(org_id, email)
    }

    fn find_customers_by_name(&self, org_id: &str, name: &str, limit: usize) -> StoreResult<Vec<Customer>> {
        self.inner.find_customers_by_name(org_id, name, limit)
    }

    fn create_customer(&self, org_id: &str, email: Option<&str>, name: Option<&str>) -> StoreResult<Customer> {
        let target = self
            .fail_create_for
            .lock()
            .map_err(|_| Self::backend("lock"))?
            .clone();
        if target.is_some() && target.as_deref() == name {
            return Err(Self::backend("create_customer"));
        }
        self.inner.create_customer(org_id, email, name)
    }

    fn upsert_customer_source(&self, link: SourceLink<'_>) -> StoreResult<()> {
        if self.fail_links.load(Ordering::SeqCst) {
            return Err(Self::backend("upsert_customer_source"));
        }
        self.inner.upsert_customer_source(link)
    }

    fn insert_conflict(&self, conflict: NewConflict) -> StoreResult<Uuid> {
        if self.fail_conflicts.load(Ordering::SeqCst) {
            return Err(Self::backend("insert_conflict"));
        }
        self.inner.insert_conflict(conflict)
    }

    fn conflict_exists(&self, a: Uuid, b: Uuid) -> StoreResult<bool> {
        self.inner.conflict_exists(a, b)
    }

    fn insert_source_record(&self, table: &str, record: SourceRecord) -> StoreResult<()> {
        self.inner.insert_source_record(table, record)
    }

    fn list_customers(&self, org_id: &str) -> StoreResult<Vec<Customer>> {
        self.inner.list_customers(org_id)
    }

    fn customers_for_import(&self, import_id: Uuid) -> StoreResult<Vec<Customer>> {
        self.inner.customers_for_import(import_id)
    }

    fn create_import(&self, org_id: &str, file_name: &str, source: Option<SourceKind>) -> StoreResult<ImportRecord> {
        self.inner.create_import(org_id, file_name, source)
    }

    fn finish_import(&self, import_id: Uuid, source: SourceKind, summary: ImportSummary) -> StoreResult<()> {
        self.inner.finish_import(import_id, source, summary)
    }

    fn list_conflicts(&self, org_id: Option<&str>, status: Option<ConflictStatus>) -> StoreResult<Vec<StitchingConflict>> {
        self.inner.list_conflicts(org_id, status)
    }
}
