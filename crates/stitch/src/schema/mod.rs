//! Source schemas: the canonical fields each export is mapped onto.

mod field;
mod registry;
mod source;
mod types;

pub use field::SchemaField;
pub use registry::{builtin_schemas, schema_for};
pub use source::SourceSchema;
pub use types::{FieldType, SourceKind};
