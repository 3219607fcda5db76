//! Model definitions and the persisted record wrapper.

use crate::{
    database::{Database, DatabaseHandle, ResultRow},
    error::Result,
    field::FieldRegistry,
    query::ID_FIELD,
};
use std::{
    borrow::Cow,
    fmt,
    ops::{ControlFlow, Deref, DerefMut},
    rc::Rc,
    sync::atomic::{AtomicI64, Ordering},
};
use tracing::debug;

static NEXT_ID: AtomicI64 = AtomicI64::new(1);

fn next_id() -> i64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Application type persisted one row per value.
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// impl Model for User {
///     fn table_name() -> Cow<'static, str> {
///         "users".into()
///     }
///
///     fn fields<'a>(&'a mut self, fields: &mut FieldRegistry<'a>) {
///         fields.register("name", &mut self.name).register("age", &mut self.age);
///     }
/// }
/// ```
pub trait Model: Default {
    /// Table backing this type, the unqualified type name unless overridden
    fn table_name() -> Cow<'static, str> {
        Cow::Owned(type_table_name::<Self>())
    }

    /// Register every persisted attribute. `_id` is registered by [`Record`].
    fn fields<'a>(&'a mut self, fields: &mut FieldRegistry<'a>);
}

fn type_table_name<T: ?Sized>() -> String {
    let name = std::any::type_name::<T>();
    let path = name.split('<').next().unwrap_or(name);
    path.rsplit("::").next().unwrap_or(path).to_string()
}

/// One row's worth of state: a model value bound to a database.
///
/// Identifiers come from a process-wide counter starting at 1. The counter
/// knows nothing about rows already stored, so records created in a later
/// run reuse identifiers and `save` overwrites those rows. Use
/// [`Record::set_id`] when the identifier matters.
///
/// The first `save` or `remove` on each record issues
/// `CREATE TABLE IF NOT EXISTS`; records returned by the finders start over.
pub struct Record<M: Model> {
    db: DatabaseHandle,
    id: i64,
    table_created: bool,
    model: M,
}

impl<M: Model> Record<M> {
    /// Create a record holding `M::default()`
    pub fn new(db: DatabaseHandle) -> Self {
        Self::with_model(db, M::default())
    }

    pub fn with_model(db: DatabaseHandle, model: M) -> Self {
        Self {
            db,
            id: next_id(),
            table_created: false,
            model,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    pub fn table_name(&self) -> Cow<'static, str> {
        M::table_name()
    }

    /// True once this record has issued its create-table statement
    pub fn is_table_ensured(&self) -> bool {
        self.table_created
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Borrow every field, `_id` first
    pub fn registry(&mut self) -> FieldRegistry<'_> {
        Self::registry_of(&mut self.id, &mut self.model)
    }

    fn registry_of<'a>(id: &'a mut i64, model: &'a mut M) -> FieldRegistry<'a> {
        let mut fields = FieldRegistry::new();
        fields.register(ID_FIELD, id);
        model.fields(&mut fields);
        fields
    }

    /// Issue the create-table statement if this record has not done so yet
    pub fn create_table(&mut self) -> Result<()> {
        if self.table_created {
            return Ok(());
        }

        let table = M::table_name();
        let Self {
            db,
            id,
            model,
            table_created,
        } = self;
        let fields = Self::registry_of(id, model);
        let sql = db.query_builder().create_table_query(&table, &fields)?;
        db.execute(&sql)?;
        *table_created = true;

        debug!(table = %table, "table ensured");
        Ok(())
    }

    /// Insert this record, replacing any row with the same identifier.
    pub fn save(&mut self) -> Result<()> {
        self.create_table()?;

        let table = M::table_name();
        let Self { db, id, model, .. } = self;
        let sql = {
            let fields = Self::registry_of(id, model);
            db.query_builder().insert_query(&table, &fields)?
        };
        db.execute(&sql)?;

        debug!(table = %table, id = *id, "record saved");
        Ok(())
    }

    /// Delete the row with this record's identifier. Deleting a row that
    /// was never saved succeeds.
    pub fn remove(&mut self) -> Result<()> {
        self.create_table()?;

        let table = M::table_name();
        let sql = self.db.query_builder().delete_query(&table, self.id);
        let affected = self.db.execute(&sql)?;

        debug!(table = %table, id = self.id, affected, "record removed");
        Ok(())
    }

    /// Load the row with identifier `id`, `None` when no row matches
    pub fn find_one(db: &DatabaseHandle, id: i64) -> Result<Option<Self>> {
        let sql = db
            .query_builder()
            .select_query(&M::table_name(), &format!("{ID_FIELD} == {id}"), 1);

        let mut found = None;
        Self::load(db, &sql, |record| {
            found = Some(record);
            ControlFlow::Break(())
        })?;
        Ok(found)
    }

    /// Load every row in the order the engine returns them
    pub fn find_all(db: &DatabaseHandle) -> Result<Vec<Self>> {
        let sql = db.query_builder().select_query(&M::table_name(), "", -1);

        let mut records = Vec::new();
        Self::load(db, &sql, |record| {
            records.push(record);
            ControlFlow::Continue(())
        })?;
        Ok(records)
    }

    /// Drop the table backing `M` if it exists
    pub fn drop_table(db: &DatabaseHandle) -> Result<()> {
        let sql = db.query_builder().drop_table_query(&M::table_name());
        db.execute(&sql)?;
        Ok(())
    }

    fn load(
        db: &DatabaseHandle,
        sql: &str,
        mut sink: impl FnMut(Self) -> ControlFlow<()>,
    ) -> Result<()> {
        let mut failure = None;
        db.query(sql, &mut |row| match Self::from_row(db, &row) {
            Ok(record) => sink(record),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        })?;
        failure.map_or(Ok(()), Err)
    }

    /// Build a fresh record from one result row. NULL values and columns
    /// without a registered field are skipped.
    fn from_row(db: &DatabaseHandle, row: &ResultRow) -> Result<Self> {
        let mut record = Self::new(Rc::clone(db));
        {
            let mut fields = record.registry();
            for (column, value) in row.iter() {
                if let Some(text) = value {
                    if fields.contains(column) {
                        fields.update_from_text(column, text)?;
                    }
                }
            }
        }
        Ok(record)
    }
}

impl<M: Model> Deref for Record<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M: Model> DerefMut for Record<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.model
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for Record<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("table_created", &self.table_created)
            .field("model", &self.model)
            .finish()
    }
}
