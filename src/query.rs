//! SQL text generation for the canonical model operations.

use crate::{
    error::Result,
    field::{Field, FieldRegistry},
    value::FieldType,
};

/// Name of the identifier column every model table carries
pub const ID_FIELD: &str = "_id";

/// Dialect-specific statement synthesis.
///
/// Implementations are pure: they only produce text. Column lists follow the
/// registry's insertion order, so the column list and the value list of one
/// statement always line up.
pub trait QueryBuilder {
    /// Column type keyword for a field type
    fn column_type(&self, ty: FieldType) -> Result<&'static str>;

    /// SQL literal for the field's current value
    fn format_value(&self, field: &Field<'_>) -> Result<String>;

    /// `CREATE TABLE IF NOT EXISTS` covering every registered field
    fn create_table_query(&self, table: &str, fields: &FieldRegistry<'_>) -> Result<String>;

    /// `INSERT OR REPLACE` writing every registered field
    fn insert_query(&self, table: &str, fields: &FieldRegistry<'_>) -> Result<String>;

    /// `SELECT *`, with an empty `condition` omitting `WHERE` and a
    /// non-positive `limit` omitting `LIMIT`
    fn select_query(&self, table: &str, condition: &str, limit: i64) -> String;

    fn delete_query(&self, table: &str, id: i64) -> String;

    fn drop_table_query(&self, table: &str) -> String;
}
