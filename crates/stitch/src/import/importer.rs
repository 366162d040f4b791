//! Import runner: one CSV file into the customer store.

use std::path::Path;

use crate::config::StitchConfig;
use crate::detection::{DetectionResult, SourceDetector};
use crate::error::{Result, StitchError};
use crate::identity::{CustomerStore, IdentityStitcher, SourceRecord, StoreError};
use crate::input::{DataTable, Parser, RawRow};
use crate::mapping::{
    apply_overrides, suggestions_to_mapping, unmapped_required_fields, MappingEngine, MappingOverrides,
};
use crate::schema::{schema_for, SourceKind, SourceSchema};
use crate::validation::{apply_mapping, coerce_row, normalize_row_status, validate_mapped_row};

use super::report::{ImportReport, RowError, RowStage};

/// Imports CSV exports for one organization.
///
/// # Example
///
/// ```no_run
/// use stitch::{Importer, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// let report = Importer::new(&store, "acme").import_file("charges.csv").unwrap();
/// println!("{} of {} rows imported", report.rows_imported, report.rows_total);
/// ```
pub struct Importer<'s> {
    store: &'s dyn CustomerStore,
    org_id: String,
    config: StitchConfig,
    source: Option<SourceKind>,
    overrides: MappingOverrides,
}

impl<'s> Importer<'s> {
    pub fn new(store: &'s dyn CustomerStore, org_id: impl Into<String>) -> Self {
        Self {
            store,
            org_id: org_id.into(),
            config: StitchConfig::default(),
            source: None,
            overrides: MappingOverrides::new(),
        }
    }

    pub fn with_config(mut self, config: StitchConfig) -> Self {
        self.config = config;
        self
    }

    /// Skip detection and import as `source`.
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = Some(source);
        self
    }

    /// Manual corrections applied on top of the suggested mapping.
    pub fn with_overrides(mut self, overrides: MappingOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Parse and import a file.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportReport> {
        let parser = Parser::with_config(self.config.parser.clone());
        let (table, metadata) = parser.parse_file(path)?;
        self.import_table(&metadata.file, &table)
    }

    /// Parse and import CSV text.
    pub fn import_str(&self, file_name: &str, text: &str) -> Result<ImportReport> {
        let parser = Parser::with_config(self.config.parser.clone());
        let table = parser.parse_str(text)?;
        self.import_table(file_name, &table)
    }

    /// Import an already parsed table.
    ///
    /// Fails only when the import cannot start: the import record cannot be
    /// created, the source cannot be determined, or a required field has no
    /// column. Row problems are collected in the report.
    pub fn import_table(&self, file_name: &str, table: &DataTable) -> Result<ImportReport> {
        let import = self.store.create_import(&self.org_id, file_name, self.source)?;
        tracing::info!(import_id = %import.id, file = file_name, rows = table.row_count(), "import started");

        let samples = table.sample_rows(self.config.mapping.sample_rows);
        let (source, detection) = self.resolve_source(table, &samples)?;
        let schema = schema_for(source);

        let engine = MappingEngine::with_config(schema, self.config.mapping.clone());
        let suggestions = engine.suggest(&table.headers, &samples);
        let mapping = apply_overrides(&suggestions_to_mapping(&suggestions), &self.overrides, schema)?;

        let missing = unmapped_required_fields(&mapping, schema);
        if !missing.is_empty() {
            return Err(StitchError::MissingRequiredMapping {
                fields: missing.iter().map(|f| f.key.clone()).collect(),
            });
        }

        let stitcher = IdentityStitcher::new(self.store, self.org_id.clone())
            .with_import(import.id)
            .with_config(self.config.stitching.clone());

        let mut report = ImportReport {
            import_id: import.id,
            file_name: file_name.to_string(),
            source,
            detection,
            suggestions,
            mapping,
            rows_total: table.row_count(),
            rows_imported: 0,
            rows_failed: 0,
            duplicates: 0,
            customers_created: 0,
            conflicts_flagged: 0,
            post_import_conflicts: 0,
            errors: Vec::new(),
            parse_issues: table.issues.clone(),
        };

        for (position, raw) in table.raw_rows().enumerate() {
            self.import_row(table.record_index(position), &raw, schema, &stitcher, &mut report);
        }

        report.post_import_conflicts = stitcher.detect_post_import_conflicts(import.id);

        if let Err(e) = self.store.finish_import(import.id, source, report.summary()) {
            tracing::warn!(import_id = %import.id, error = %e, "could not finalize import record");
        }

        tracing::info!(
            import_id = %import.id,
            source = %source,
            imported = report.rows_imported,
            failed = report.rows_failed,
            duplicates = report.duplicates,
            customers_created = report.customers_created,
            conflicts = report.total_conflicts(),
            "import finished"
        );

        Ok(report)
    }

    fn resolve_source(
        &self,
        table: &DataTable,
        samples: &[RawRow],
    ) -> Result<(SourceKind, Vec<DetectionResult>)> {
        if let Some(source) = self.source {
            return Ok((source, Vec::new()));
        }

        let detector = SourceDetector::new()
            .with_config(self.config.mapping.clone(), self.config.detection.clone());
        let results = detector.detect(&table.headers, samples);

        let confident = detector.is_confident(&results);
        match results.first().map(|top| (top.source, top.confidence)) {
            Some((source, confidence)) if confident => {
                tracing::info!(%source, confidence, "source detected");
                Ok((source, results))
            }
            _ => Err(StitchError::UndeterminedSource {
                candidates: results.iter().map(|r| r.source.to_string()).collect(),
            }),
        }
    }

    fn import_row(
        &self,
        index: usize,
        raw: &RawRow,
        schema: &SourceSchema,
        stitcher: &IdentityStitcher<'_>,
        report: &mut ImportReport,
    ) {
        let mut row = apply_mapping(raw, &report.mapping);
        normalize_row_status(&mut row, schema);

        let errors = validate_mapped_row(&row, schema, index);
        if !errors.is_empty() {
            tracing::debug!(row = index, errors = errors.len(), "row failed validation");
            report.rows_failed += 1;
            report.errors.extend(errors.into_iter().map(RowError::from));
            return;
        }

        let Some(external_id) = row.get(&schema.id_field) else {
            report.rows_failed += 1;
            report
                .errors
                .push(RowError::new(index, RowStage::Validation, "Record identifier missing"));
            return;
        };

        let stitched = match stitcher.stitch_identity(
            schema.source,
            external_id,
            row.get(&schema.email_field),
            row.get(&schema.name_field),
        ) {
            Ok(stitched) => stitched,
            Err(e) => {
                tracing::warn!(row = index, error = %e, "could not resolve customer");
                report.rows_failed += 1;
                report
                    .errors
                    .push(RowError::new(index, RowStage::Stitching, e.to_string()));
                return;
            }
        };

        if stitched.is_new {
            report.customers_created += 1;
        }
        report.conflicts_flagged += stitched.conflicts_flagged;

        let record = SourceRecord {
            org_id: self.org_id.clone(),
            key: external_id.to_string(),
            customer_id: stitched.customer_id,
            import_id: report.import_id,
            fields: coerce_row(&row, schema),
        };

        match self.store.insert_source_record(&schema.table, record) {
            Ok(()) => report.rows_imported += 1,
            Err(StoreError::Duplicate { key, .. }) => {
                tracing::warn!(row = index, table = %schema.table, key = %key, "record already imported");
                report.duplicates += 1;
            }
            Err(e) => {
                report.rows_failed += 1;
                report.errors.push(RowError::new(index, RowStage::Insert, e.to_string()));
            }
        }
    }
}
