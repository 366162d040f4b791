//! Row application, validation and typed coercion.
//!
//! A raw CSV row moves through three stages: [`apply_mapping`] reshapes it
//! into a [`MappedRow`] of trimmed strings, [`validate_mapped_row`] checks it
//! against the schema, and [`coerce_row`] turns a clean row into a
//! [`TypedRow`].

mod apply;
mod coerce;
mod status;
mod validator;
mod values;

pub use apply::{apply_mapping, MappedRow};
pub use coerce::{coerce_row, FieldValue, TypedRow};
pub use status::{normalize_row_status, normalize_status};
pub use validator::{validate_and_coerce, validate_mapped_row, ValidationError};
pub use values::{is_valid_email, parse_currency, parse_timestamp};
