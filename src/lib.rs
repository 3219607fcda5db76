//! Lightweight model persistence over SQLite for the Runar ecosystem.
//!
//! # Intention
//!
//! - Let application types declare their persisted fields once and get
//!   create/save/remove/find for free.
//! - Turn declared fields into SQL text, and result rows back into typed
//!   fields, through one closed set of field types.
//!
//! # Architectural Boundaries
//!
//! - Statement synthesis is pure text generation; only [`Database`]
//!   implementations talk to an engine.
//! - No query DSL, relationships, migrations or transactions.
//! - Single-threaded: handles are `Rc`, calls block until the engine is done.

pub mod database;
pub mod error;
pub mod field;
pub mod manager;
pub mod model;
pub mod query;
pub mod sqlite;
pub mod value;

pub use database::{Database, DatabaseHandle, ResultRow};
pub use error::{Error, Result};
pub use field::{Field, FieldRef, FieldRegistry};
pub use manager::{ConnectionManager, DatabaseKind};
pub use model::{Model, Record};
pub use query::{QueryBuilder, ID_FIELD};
pub use sqlite::{Sqlite, SqliteConfig, SqliteQueryBuilder};
pub use value::{FieldType, Value};
