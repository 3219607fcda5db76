//! Per-instance field registry.
//!
//! A registry borrows a model's attributes mutably, so every write made
//! through it lands in the model itself. It lives for one operation and is
//! rebuilt from the model whenever another one is needed.

use crate::{
    error::{Error, Result},
    value::{FieldType, Value},
};

/// Exclusive reference into a model attribute
#[derive(Debug)]
pub enum FieldRef<'a> {
    Integer(&'a mut i64),
    Real(&'a mut f64),
    Text(&'a mut String),
    Boolean(&'a mut bool),
}

impl<'a> From<&'a mut i64> for FieldRef<'a> {
    fn from(v: &'a mut i64) -> Self {
        FieldRef::Integer(v)
    }
}

impl<'a> From<&'a mut f64> for FieldRef<'a> {
    fn from(v: &'a mut f64) -> Self {
        FieldRef::Real(v)
    }
}

impl<'a> From<&'a mut String> for FieldRef<'a> {
    fn from(v: &'a mut String) -> Self {
        FieldRef::Text(v)
    }
}

impl<'a> From<&'a mut bool> for FieldRef<'a> {
    fn from(v: &'a mut bool) -> Self {
        FieldRef::Boolean(v)
    }
}

/// A single registered field
#[derive(Debug)]
pub struct Field<'a> {
    name: &'a str,
    storage: FieldRef<'a>,
}

impl<'a> Field<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        match self.storage {
            FieldRef::Integer(_) => FieldType::Integer,
            FieldRef::Real(_) => FieldType::Real,
            FieldRef::Text(_) => FieldType::Text,
            FieldRef::Boolean(_) => FieldType::Boolean,
        }
    }

    /// Snapshot of the current value
    pub fn value(&self) -> Value {
        match &self.storage {
            FieldRef::Integer(v) => Value::Integer(**v),
            FieldRef::Real(v) => Value::Real(**v),
            FieldRef::Text(v) => Value::Text((**v).clone()),
            FieldRef::Boolean(v) => Value::Boolean(**v),
        }
    }

    /// Write `value` through to the model. The value type must match.
    pub fn set(&mut self, value: Value) -> Result<()> {
        let name = self.name;
        let expected = self.field_type();
        match (&mut self.storage, value) {
            (FieldRef::Integer(slot), Value::Integer(v)) => **slot = v,
            (FieldRef::Real(slot), Value::Real(v)) => **slot = v,
            (FieldRef::Text(slot), Value::Text(v)) => **slot = v,
            (FieldRef::Boolean(slot), Value::Boolean(v)) => **slot = v,
            (_, value) => {
                return Err(Error::InvalidValue(format!(
                    "field `{name}` is {expected} but got {}",
                    value.field_type()
                )))
            }
        }
        Ok(())
    }

    pub fn set_from_text(&mut self, text: &str) -> Result<()> {
        let value = Value::from_text(text, self.field_type())?;
        self.set(value)
    }
}

/// Insertion-ordered mapping from field name to field
#[derive(Debug, Default)]
pub struct FieldRegistry<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> FieldRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `storage` under `name`.
    ///
    /// Registering a name twice replaces the earlier storage and keeps its
    /// position.
    pub fn register(&mut self, name: &'a str, storage: impl Into<FieldRef<'a>>) -> &mut Self {
        let storage = storage.into();
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => field.storage = storage,
            None => self.fields.push(Field { name, storage }),
        }
        self
    }

    pub fn get(&self, name: &str) -> Result<&Field<'a>> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Field<'a>> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Parse `text` with the field's type and write it through
    pub fn update_from_text(&mut self, name: &str, text: &str) -> Result<()> {
        self.get_mut(name)?.set_from_text(text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        name: String,
        age: i64,
        height: f64,
        active: bool,
    }

    fn person() -> Person {
        Person {
            name: "Bob".to_string(),
            age: 22,
            height: 1.8,
            active: false,
        }
    }

    #[test]
    fn test_writes_alias_the_model() {
        let mut p = person();
        {
            let mut registry = FieldRegistry::new();
            registry
                .register("name", &mut p.name)
                .register("age", &mut p.age)
                .register("height", &mut p.height)
                .register("active", &mut p.active);

            registry.update_from_text("name", "Alice").unwrap();
            registry.update_from_text("age", "23").unwrap();
            registry.update_from_text("height", "1.65").unwrap();
            registry.update_from_text("active", "1").unwrap();
        }
        assert_eq!(p.name, "Alice");
        assert_eq!(p.age, 23);
        assert_eq!(p.height, 1.65);
        assert!(p.active);
    }

    #[test]
    fn test_lookup_errors() {
        let mut p = person();
        let mut registry = FieldRegistry::new();
        registry.register("age", &mut p.age);

        assert!(matches!(registry.get("missing"), Err(Error::NotFound(name)) if name == "missing"));
        assert!(matches!(
            registry.update_from_text("age", "twenty"),
            Err(Error::Parse { expected: FieldType::Integer, .. })
        ));
        assert_eq!(registry.get("age").unwrap().value(), Value::Integer(22));
    }

    #[test]
    fn test_duplicate_name_keeps_one_entry() {
        let mut p = person();
        let mut other: i64 = 5;
        let mut registry = FieldRegistry::new();
        registry.register("age", &mut p.age).register("age", &mut other);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("age").unwrap().value(), Value::Integer(5));
    }

    #[test]
    fn test_set_rejects_mismatched_type() {
        let mut p = person();
        let mut registry = FieldRegistry::new();
        registry.register("name", &mut p.name);

        let field = registry.get_mut("name").unwrap();
        assert!(field.set(Value::Integer(1)).is_err());
        assert_eq!(field.field_type(), FieldType::Text);
    }
}
