//! Execution gateway contract between models and a database engine.

use crate::{error::Result, query::QueryBuilder};
use std::{ops::ControlFlow, rc::Rc};

/// One result record with every value delivered as text.
///
/// Columns keep the order the engine returned them in; `None` marks NULL.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, Option<String>)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column value
    pub fn push(&mut self, column: impl Into<String>, value: Option<String>) {
        self.columns.push((column.into(), value));
    }

    /// Text value of `column`, `None` when absent or NULL
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<String>)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (S, Option<String>)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// A connected relational engine that runs SQL text.
///
/// Calls block until the statement finishes. Implementations use interior
/// mutability so a handle can be shared by every model built on it.
pub trait Database {
    fn connect(&self, url: &str) -> Result<()>;

    fn is_connected(&self) -> bool;

    fn disconnect(&self) -> Result<()>;

    /// Statement synthesizer for this engine's dialect
    fn query_builder(&self) -> &dyn QueryBuilder;

    /// Run a statement for effect only, returning the number of rows changed
    fn execute(&self, sql: &str) -> Result<usize>;

    /// Run a statement and hand every result row to `on_row`.
    ///
    /// Returning `ControlFlow::Break` stops row delivery early.
    fn query(
        &self,
        sql: &str,
        on_row: &mut dyn FnMut(ResultRow) -> ControlFlow<()>,
    ) -> Result<()>;

    /// Run a statement and collect every result row
    fn query_rows(&self, sql: &str) -> Result<Vec<ResultRow>> {
        let mut rows = Vec::new();
        self.query(sql, &mut |row| {
            rows.push(row);
            ControlFlow::Continue(())
        })?;
        Ok(rows)
    }
}

/// Shared single-threaded handle to a database
pub type DatabaseHandle = Rc<dyn Database>;
