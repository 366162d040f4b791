//! Customer store collaborator: records and the operations stitching needs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::SourceKind;
use crate::validation::TypedRow;

/// Failure reported by a [`CustomerStore`].
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate record in '{table}': {key}")]
    Duplicate { table: String, key: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// The backend did not answer in time.
    #[error("store timed out after {0:?}")]
    Timeout(Duration),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A unified customer identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Link from one external record to the customer it belongs to.
///
/// Unique on `(org_id, source, external_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSource {
    pub org_id: String,
    pub customer_id: Uuid,
    pub source: SourceKind,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a source link to create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLink<'a> {
    pub org_id: &'a str,
    pub customer_id: Uuid,
    pub source: SourceKind,
    pub external_id: &'a str,
    pub external_email: Option<&'a str>,
    pub external_name: Option<&'a str>,
}

/// Review state of a flagged pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStatus {
    Pending,
    Merged,
    Dismissed,
    Split,
}

impl ConflictStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConflictStatus::Pending => "pending",
            ConflictStatus::Merged => "merged",
            ConflictStatus::Dismissed => "dismissed",
            ConflictStatus::Split => "split",
        }
    }
}

impl std::str::FromStr for ConflictStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ConflictStatus::Pending),
            "merged" => Ok(ConflictStatus::Merged),
            "dismissed" => Ok(ConflictStatus::Dismissed),
            "split" => Ok(ConflictStatus::Split),
            other => Err(format!("unknown conflict status '{other}'")),
        }
    }
}

/// Two customers that may be the same person, awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchingConflict {
    pub id: Uuid,
    pub org_id: String,
    /// The existing customer.
    pub customer_a: Uuid,
    /// The customer the collision was found with.
    pub customer_b: Uuid,
    pub match_field: String,
    pub match_value: String,
    pub confidence: f64,
    pub status: ConflictStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl StitchingConflict {
    /// Whether this conflict is about the unordered pair `(a, b)`.
    pub fn involves_pair(&self, a: Uuid, b: Uuid) -> bool {
        (self.customer_a == a && self.customer_b == b) || (self.customer_a == b && self.customer_b == a)
    }
}

/// A conflict to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConflict {
    pub org_id: String,
    pub customer_a: Uuid,
    pub customer_b: Uuid,
    pub match_field: String,
    pub match_value: String,
    pub confidence: f64,
    pub import_id: Option<Uuid>,
}

/// One validated row written to a source's record table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub org_id: String,
    /// The source's external identifier, unique within its table and org.
    pub key: String,
    pub customer_id: Uuid,
    pub import_id: Uuid,
    pub fields: TypedRow,
}

/// Counters stored on a finished import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub rows_total: usize,
    pub rows_imported: usize,
    pub rows_failed: usize,
    pub duplicates: usize,
    pub customers_created: usize,
    pub conflicts_flagged: usize,
}

/// One run of the importer over one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: Uuid,
    pub org_id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportSummary>,
}

/// Persistence operations used by stitching and importing.
///
/// Implementations own timeouts and retries: a call that cannot complete
/// returns [`StoreError::Timeout`] rather than blocking.
pub trait CustomerStore: Send + Sync {
    /// Link in `org_id` for `(source, external_id)`, if any.
    fn find_customer_source(
        &self,
        org_id: &str,
        source: SourceKind,
        external_id: &str,
    ) -> StoreResult<Option<CustomerSource>>;

    /// Customer in `org_id` whose email equals `email`.
    fn find_customer_by_email(&self, org_id: &str, email: &str) -> StoreResult<Option<Customer>>;

    /// Any link in `org_id` whose recorded external email equals `email`.
    fn find_customer_source_by_email(&self, org_id: &str, email: &str) -> StoreResult<Option<CustomerSource>>;

    /// Up to `limit` customers in `org_id` whose name matches, ignoring case.
    fn find_customers_by_name(&self, org_id: &str, name: &str, limit: usize) -> StoreResult<Vec<Customer>>;

    fn create_customer(&self, org_id: &str, email: Option<&str>, name: Option<&str>) -> StoreResult<Customer>;

    /// Insert the link, or update it in place if `(org_id, source, external_id)` exists.
    fn upsert_customer_source(&self, link: SourceLink<'_>) -> StoreResult<()>;

    fn insert_conflict(&self, conflict: NewConflict) -> StoreResult<Uuid>;

    /// Whether any conflict already covers this pair, in either order.
    fn conflict_exists(&self, a: Uuid, b: Uuid) -> StoreResult<bool>;

    /// Write a record to `table`. A key repeated within the same org yields
    /// [`StoreError::Duplicate`].
    fn insert_source_record(&self, table: &str, record: SourceRecord) -> StoreResult<()>;

    fn list_customers(&self, org_id: &str) -> StoreResult<Vec<Customer>>;

    /// Customers referenced by any source record written by `import_id`.
    fn customers_for_import(&self, import_id: Uuid) -> StoreResult<Vec<Customer>>;

    fn create_import(&self, org_id: &str, file_name: &str, source: Option<SourceKind>) -> StoreResult<ImportRecord>;

    fn finish_import(&self, import_id: Uuid, source: SourceKind, summary: ImportSummary) -> StoreResult<()>;

    fn list_conflicts(&self, org_id: Option<&str>, status: Option<ConflictStatus>) -> StoreResult<Vec<StitchingConflict>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_status_round_trip() {
        for status in [
            ConflictStatus::Pending,
            ConflictStatus::Merged,
            ConflictStatus::Dismissed,
            ConflictStatus::Split,
        ] {
            assert_eq!(status.label().parse::<ConflictStatus>(), Ok(status));
        }
        assert!("open".parse::<ConflictStatus>().is_err());
    }

    #[test]
    fn test_involves_pair_is_unordered() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let conflict = StitchingConflict {
            id: Uuid::new_v4(),
            org_id: "org".into(),
            customer_a: a,
            customer_b: b,
            match_field: "name".into(),
            match_value: "Jane".into(),
            confidence: 0.6,
            status: ConflictStatus::Pending,
            import_id: None,
            created_at: Utc::now(),
        };
        assert!(conflict.involves_pair(a, b));
        assert!(conflict.involves_pair(b, a));
        assert!(!conflict.involves_pair(a, c));
    }
}
