//! Identity stitching: resolve an imported row to a customer.
//!
//! Rows are matched by a strict cascade:
//!
//! 1. an existing link for the same `(source, external_id)`,
//! 2. a customer or link with the same email,
//! 3. otherwise a new customer. Same-name customers with a different
//!    email are flagged as a [`StitchingConflict`](super::StitchingConflict)
//!    for review, never merged.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StitchingConfig;
use crate::error::Result;
use crate::schema::SourceKind;

use super::store::{Customer, CustomerStore, NewConflict, SourceLink, StoreError};

/// Which cascade step resolved a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    /// An existing link for the same external record.
    ExternalId,
    /// A customer with the same email.
    Email,
    /// A link from another source recorded with the same email.
    ExternalEmail,
    /// No safe match; a customer was created.
    New,
}

impl MatchedBy {
    pub fn label(&self) -> &'static str {
        match self {
            MatchedBy::ExternalId => "external_id",
            MatchedBy::Email => "email",
            MatchedBy::ExternalEmail => "external_email",
            MatchedBy::New => "new",
        }
    }
}

/// Outcome of stitching one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchResult {
    pub customer_id: Uuid,
    pub is_new: bool,
    pub matched_by: MatchedBy,
    /// Conflicts recorded while resolving this row.
    pub conflicts_flagged: usize,
}

/// Resolves rows of one organization against a [`CustomerStore`].
pub struct IdentityStitcher<'s> {
    store: &'s dyn CustomerStore,
    org_id: String,
    import_id: Option<Uuid>,
    config: StitchingConfig,
    /// Held across match-or-create so concurrent callers cannot both
    /// create a customer for the same identity.
    resolve_lock: Mutex<()>,
}

impl<'s> IdentityStitcher<'s> {
    pub fn new(store: &'s dyn CustomerStore, org_id: impl Into<String>) -> Self {
        Self {
            store,
            org_id: org_id.into(),
            import_id: None,
            config: StitchingConfig::default(),
            resolve_lock: Mutex::new(()),
        }
    }

    /// Tag conflicts with the import that produced them.
    pub fn with_import(mut self, import_id: Uuid) -> Self {
        self.import_id = Some(import_id);
        self
    }

    pub fn with_config(mut self, config: StitchingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// Resolve one row to a customer id, creating a customer if needed.
    ///
    /// Emails are compared trimmed and lower-cased. Only a failed lookup or
    /// customer creation is returned as an error. Once the customer exists,
    /// failed link and conflict writes are logged and the row still resolves;
    /// `conflicts_flagged` counts only the conflicts actually recorded.
    pub fn stitch_identity(
        &self,
        source: SourceKind,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<StitchResult> {
        let _guard = self
            .resolve_lock
            .lock()
            .map_err(|_| StoreError::Backend("stitcher lock poisoned".to_string()))?;

        let email = clean(email).map(|e| e.to_lowercase());
        let email = email.as_deref();
        let name = clean(name);

        if let Some(link) = self.store.find_customer_source(&self.org_id, source, external_id)? {
            tracing::debug!(%source, external_id, customer = %link.customer_id, "matched by external id");
            return Ok(self.matched(link.customer_id, MatchedBy::ExternalId));
        }

        if let Some(email) = email {
            let by_email = match self.store.find_customer_by_email(&self.org_id, email)? {
                Some(customer) => Some((customer.id, MatchedBy::Email)),
                None => self
                    .store
                    .find_customer_source_by_email(&self.org_id, email)?
                    .map(|link| (link.customer_id, MatchedBy::ExternalEmail)),
            };

            if let Some((customer_id, matched_by)) = by_email {
                self.link(customer_id, source, external_id, Some(email), name);
                tracing::debug!(%source, external_id, customer = %customer_id, ?matched_by, "matched by email");
                return Ok(self.matched(customer_id, matched_by));
            }
        }

        let conflicting = match (name, email) {
            (Some(name), Some(email)) => self.conflicting_name_matches(name, email)?,
            _ => Vec::new(),
        };

        let customer = self.store.create_customer(&self.org_id, email, name)?;
        self.link(customer.id, source, external_id, email, name);

        let mut flagged = 0;
        for existing in &conflicting {
            let conflict = NewConflict {
                org_id: self.org_id.clone(),
                customer_a: existing.id,
                customer_b: customer.id,
                match_field: "name".to_string(),
                match_value: name.unwrap_or_default().to_string(),
                confidence: self.config.inline_conflict_confidence,
                import_id: self.import_id,
            };
            match self.store.insert_conflict(conflict) {
                Ok(_) => {
                    flagged += 1;
                    tracing::info!(
                        existing = %existing.id,
                        created = %customer.id,
                        "same name with a different email, flagged for review"
                    );
                }
                Err(e) => tracing::warn!(
                    existing = %existing.id,
                    created = %customer.id,
                    error = %e,
                    "failed to record name conflict"
                ),
            }
        }

        Ok(StitchResult {
            customer_id: customer.id,
            is_new: true,
            matched_by: MatchedBy::New,
            conflicts_flagged: flagged,
        })
    }

    /// Same-name customers whose recorded email differs from `email`.
    fn conflicting_name_matches(&self, name: &str, email: &str) -> Result<Vec<Customer>> {
        let matches = self
            .store
            .find_customers_by_name(&self.org_id, name, self.config.name_match_limit)?;

        if !self.config.flag_all_name_matches && matches.len() != 1 {
            return Ok(Vec::new());
        }

        Ok(matches
            .into_iter()
            .filter(|c| c.email.as_deref().is_some_and(|e| !e.eq_ignore_ascii_case(email)))
            .collect())
    }

    fn matched(&self, customer_id: Uuid, matched_by: MatchedBy) -> StitchResult {
        StitchResult {
            customer_id,
            is_new: false,
            matched_by,
            conflicts_flagged: 0,
        }
    }

    fn link(&self, customer_id: Uuid, source: SourceKind, external_id: &str, email: Option<&str>, name: Option<&str>) {
        let link = SourceLink {
            org_id: &self.org_id,
            customer_id,
            source,
            external_id,
            external_email: email,
            external_name: name,
        };
        if let Err(e) = self.store.upsert_customer_source(link) {
            tracing::warn!(%source, external_id, customer = %customer_id, error = %e, "failed to link source record");
        }
    }

    /// Flag name collisions between customers touched by an import and
    /// every customer of the organization.
    ///
    /// Pairs that already have a conflict are skipped. Best effort: lookup
    /// and write failures are logged and the scan continues. Returns the
    /// number of new conflicts.
    pub fn detect_post_import_conflicts(&self, import_id: Uuid) -> usize {
        let touched = match self.store.customers_for_import(import_id) {
            Ok(customers) => customers,
            Err(e) => {
                tracing::warn!(%import_id, error = %e, "conflict scan could not list imported customers");
                return 0;
            }
        };
        let everyone = match self.store.list_customers(&self.org_id) {
            Ok(customers) => customers,
            Err(e) => {
                tracing::warn!(%import_id, error = %e, "conflict scan could not list customers");
                return 0;
            }
        };

        let mut by_name: HashMap<String, Vec<&Customer>> = HashMap::new();
        for customer in &everyone {
            if let Some(name) = &customer.name {
                by_name.entry(name.to_lowercase()).or_default().push(customer);
            }
        }

        let mut found = 0;
        for customer in &touched {
            let (Some(name), Some(email)) = (&customer.name, &customer.email) else {
                continue;
            };
            let Some(candidates) = by_name.get(&name.to_lowercase()) else {
                continue;
            };

            for other in candidates {
                let differs = other
                    .email
                    .as_deref()
                    .is_some_and(|e| !e.eq_ignore_ascii_case(email));
                if other.id == customer.id || !differs {
                    continue;
                }

                match self.store.conflict_exists(other.id, customer.id) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "conflict scan lookup failed");
                        continue;
                    }
                }

                let conflict = NewConflict {
                    org_id: self.org_id.clone(),
                    customer_a: other.id,
                    customer_b: customer.id,
                    match_field: "name".to_string(),
                    match_value: name.clone(),
                    confidence: self.config.scan_conflict_confidence,
                    import_id: Some(import_id),
                };
                match self.store.insert_conflict(conflict) {
                    Ok(_) => found += 1,
                    Err(e) => tracing::warn!(error = %e, "conflict scan could not record conflict"),
                }
            }
        }

        tracing::info!(%import_id, touched = touched.len(), conflicts = found, "post-import conflict scan finished");
        found
    }
}

fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
