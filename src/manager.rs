//! Registry of named database connections.

use crate::{
    database::{Database, DatabaseHandle},
    error::{Error, Result},
    sqlite::Sqlite,
};
use std::{collections::HashMap, rc::Rc};

/// Supported engine kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Sqlite,
}

/// Keeps one gateway per connection URL.
///
/// The manager is an ordinary value: construct it where the application
/// starts and pass the handles it returns to whatever builds models.
#[derive(Default)]
pub struct ConnectionManager {
    databases: HashMap<String, DatabaseHandle>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to `url`, registering a gateway of `kind` on first use
    pub fn connect(&mut self, url: &str, kind: DatabaseKind) -> Result<DatabaseHandle> {
        let database = self
            .databases
            .entry(url.to_string())
            .or_insert_with(|| match kind {
                DatabaseKind::Sqlite => Rc::new(Sqlite::new()) as DatabaseHandle,
            });
        database.connect(url)?;
        Ok(Rc::clone(database))
    }

    pub fn is_connected(&self, url: &str) -> Result<bool> {
        Ok(self.registered(url)?.is_connected())
    }

    pub fn disconnect(&self, url: &str) -> Result<()> {
        self.registered(url)?.disconnect()
    }

    /// Handle registered for `url`, if any
    pub fn get(&self, url: &str) -> Option<DatabaseHandle> {
        self.databases.get(url).cloned()
    }

    fn registered(&self, url: &str) -> Result<&DatabaseHandle> {
        self.databases
            .get(url)
            .ok_or_else(|| Error::connection(format!("database at {url} not registered")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_reuses_gateway() {
        let mut manager = ConnectionManager::new();
        let first = manager.connect(":memory:", DatabaseKind::Sqlite).unwrap();
        first.execute("CREATE TABLE t (x INTEGER);").unwrap();

        let second = manager.get(":memory:").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert!(manager.is_connected(":memory:").unwrap());

        manager.disconnect(":memory:").unwrap();
        assert!(!first.is_connected());
        assert!(matches!(
            first.execute("SELECT 1;"),
            Err(Error::Connection(_))
        ));
    }

    #[test]
    fn test_unregistered_url() {
        let manager = ConnectionManager::new();
        assert!(matches!(
            manager.is_connected("missing.db"),
            Err(Error::Connection(_))
        ));
        assert!(manager.disconnect("missing.db").is_err());
        assert!(manager.get("missing.db").is_none());
    }
}
