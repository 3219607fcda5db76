use crate::{
    database::{Database, ResultRow},
    error::{Error, Result},
    field::{Field, FieldRegistry},
    query::{QueryBuilder, ID_FIELD},
    value::FieldType,
};
use rusqlite::{types::ValueRef, Connection};
use serde::Deserialize;
use std::{cell::RefCell, ops::ControlFlow, path::Path, path::PathBuf, time::Duration};
use tracing::{debug, info};
use url::Url;

/// SQLite connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or `:memory:`
    pub db_path: String,
    /// How long a statement waits on a locked database
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

impl SqliteConfig {
    /// Create a new SQLite config for the given path
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout_ms: None,
        }
    }

    /// Config for a private in-memory database
    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    pub fn with_busy_timeout(mut self, millis: u64) -> Self {
        self.busy_timeout_ms = Some(millis);
        self
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Statement synthesizer for the SQLite dialect
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteQueryBuilder;

impl QueryBuilder for SqliteQueryBuilder {
    fn column_type(&self, ty: FieldType) -> Result<&'static str> {
        Ok(ty.column_type())
    }

    fn format_value(&self, field: &Field<'_>) -> Result<String> {
        field.value().to_literal()
    }

    fn create_table_query(&self, table: &str, fields: &FieldRegistry<'_>) -> Result<String> {
        let columns = fields
            .iter()
            .map(|field| {
                let ty = self.column_type(field.field_type())?;
                Ok(if field.name() == ID_FIELD {
                    format!("{ID_FIELD} INTEGER PRIMARY KEY")
                } else {
                    format!("{} {}", field.name(), ty)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            table,
            columns.join(", ")
        ))
    }

    fn insert_query(&self, table: &str, fields: &FieldRegistry<'_>) -> Result<String> {
        let mut columns = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for field in fields.iter() {
            columns.push(field.name());
            values.push(self.format_value(field)?);
        }

        Ok(format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES ({});",
            table,
            columns.join(", "),
            values.join(", ")
        ))
    }

    fn select_query(&self, table: &str, condition: &str, limit: i64) -> String {
        let mut query = format!("SELECT * FROM {table}");
        if !condition.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(condition);
        }
        if limit > 0 {
            query.push_str(&format!(" LIMIT {limit}"));
        }
        query.push(';');
        query
    }

    fn delete_query(&self, table: &str, id: i64) -> String {
        format!("DELETE FROM {table} WHERE {ID_FIELD} = {id};")
    }

    fn drop_table_query(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {table};")
    }
}

#[derive(Debug, PartialEq)]
enum Target {
    InMemory,
    File(PathBuf),
}

impl Target {
    /// Accepts `:memory:`, `sqlite:` URLs and plain file paths
    fn parse(url: &str) -> Result<Self> {
        if url == ":memory:" {
            return Ok(Target::InMemory);
        }

        match Url::parse(url) {
            Ok(parsed) if parsed.scheme() == "sqlite" => match parsed.path() {
                ":memory:" => Ok(Target::InMemory),
                "" => Err(Error::connection(format!(
                    "connection URL has no database path; url={url}"
                ))),
                path => Ok(Target::File(PathBuf::from(path))),
            },
            // single-letter schemes are Windows drive letters
            Ok(parsed) if parsed.scheme().len() > 1 => Err(Error::connection(format!(
                "connection URL does not have a `sqlite` scheme; url={url}"
            ))),
            _ => Ok(Target::File(PathBuf::from(url))),
        }
    }
}

/// SQLite execution gateway.
///
/// Every column value is handed back as text, the way `sqlite3_exec`
/// reports rows: numbers in decimal form, NULL as absent.
#[derive(Debug, Default)]
pub struct Sqlite {
    connection: RefCell<Option<Connection>>,
    busy_timeout: Option<Duration>,
    builder: SqliteQueryBuilder,
}

impl Sqlite {
    /// Create a disconnected gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway and connect it using `config`
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let sqlite = Self {
            busy_timeout: config.busy_timeout_ms.map(Duration::from_millis),
            ..Self::default()
        };
        sqlite.connect(&config.db_path)?;
        Ok(sqlite)
    }

    /// Create a gateway connected to a private in-memory database
    pub fn in_memory() -> Result<Self> {
        Self::open(&SqliteConfig::in_memory())
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self
            .connection
            .try_borrow()
            .map_err(|_| Error::connection("connection is being reconfigured"))?;
        match guard.as_ref() {
            Some(connection) => f(connection),
            None => Err(Error::connection("not connected")),
        }
    }

    fn replace_connection(&self, connection: Option<Connection>) -> Result<()> {
        let mut slot = self
            .connection
            .try_borrow_mut()
            .map_err(|_| Error::connection("connection is in use"))?;
        *slot = connection;
        Ok(())
    }
}

fn text_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(v) => Some(v.to_string()),
        ValueRef::Real(v) => Some(v.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl Database for Sqlite {
    fn connect(&self, url: &str) -> Result<()> {
        info!(url, "connecting to sqlite database");
        let connection = match Target::parse(url)? {
            Target::InMemory => Connection::open_in_memory(),
            Target::File(path) => Connection::open(path),
        }
        .map_err(|err| Error::connection(format!("unable to connect to {url}: {err}")))?;

        if let Some(timeout) = self.busy_timeout {
            connection.busy_timeout(timeout)?;
        }
        self.replace_connection(Some(connection))
    }

    fn is_connected(&self) -> bool {
        self.connection
            .try_borrow()
            .map(|guard| guard.is_some())
            .unwrap_or(true)
    }

    fn disconnect(&self) -> Result<()> {
        info!("disconnecting sqlite database");
        self.replace_connection(None)
    }

    fn query_builder(&self) -> &dyn QueryBuilder {
        &self.builder
    }

    fn execute(&self, sql: &str) -> Result<usize> {
        debug!(sql, "executing statement");
        self.with_connection(|connection| Ok(connection.execute(sql, [])?))
    }

    fn query(
        &self,
        sql: &str,
        on_row: &mut dyn FnMut(ResultRow) -> ControlFlow<()>,
    ) -> Result<()> {
        debug!(sql, "executing query");
        self.with_connection(|connection| {
            let mut stmt = connection.prepare(sql)?;
            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let mut result = ResultRow::new();
                for (index, name) in names.iter().enumerate() {
                    result.push(name.as_str(), text_value(row.get_ref(index)?));
                }
                if on_row(result).is_break() {
                    break;
                }
            }
            Ok(())
        })
    }
}
