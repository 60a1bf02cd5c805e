use super::Value;
use crate::{driver::SubQueryExecutor, Result};

use indexmap::IndexMap;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A lazily loaded property: the sub-query to run and the parameter resolved
/// from the owning row, executed synchronously on first read.
pub struct PendingLoad {
    pub statement_id: String,
    pub param: Value,
    pub executor: Rc<dyn SubQueryExecutor>,
}

struct ObjectData {
    type_name: String,
    fields: IndexMap<String, Value>,
    pending: IndexMap<String, PendingLoad>,
}

/// A materialized object, held by a shared handle.
///
/// Handles are identity-comparable; linking an in-flight ancestor into a
/// nested property yields the same instance, which is what lets cyclic result
/// maps terminate. Scope and objects are single-threaded, hence `Rc`.
#[derive(Clone)]
pub struct Object {
    data: Rc<RefCell<ObjectData>>,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Object {
        Object {
            data: Rc::new(RefCell::new(ObjectData {
                type_name: type_name.into(),
                fields: IndexMap::new(),
                pending: IndexMap::new(),
            })),
        }
    }

    pub fn type_name(&self) -> String {
        self.data.borrow().type_name.clone()
    }

    pub fn ptr_eq(a: &Object, b: &Object) -> bool {
        Rc::ptr_eq(&a.data, &b.data)
    }

    /// Reads a property, triggering a pending lazy load first if one is
    /// registered for the name. The loader runs synchronously, exactly once,
    /// and is removed before the value is stored.
    pub fn get(&self, name: &str) -> Result<Value> {
        let load = self.data.borrow_mut().pending.shift_remove(name);
        if let Some(load) = load {
            let value = load.executor.execute(&load.statement_id, &load.param)?;
            self.set(name, value);
        }
        Ok(self.peek(name))
    }

    /// Reads a property without touching pending loaders. A property that is
    /// still pending reads as [`Value::Deferred`]; a missing one as `Null`.
    pub fn peek(&self, name: &str) -> Value {
        self.data
            .borrow()
            .fields
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Writes a property. An explicit set drops any pending loader for the
    /// name without executing it, as a setter wins over a deferred load.
    pub fn set(&self, name: &str, value: Value) {
        let mut data = self.data.borrow_mut();
        data.pending.shift_remove(name);
        data.fields.insert(name.to_string(), value);
    }

    /// Appends to a collection property, materializing the empty list first
    /// when the property is unset.
    pub fn push(&self, name: &str, value: Value) -> Result<()> {
        let mut data = self.data.borrow_mut();
        let slot = data
            .fields
            .entry(name.to_string())
            .or_insert_with(|| Value::List(Vec::new()));
        match slot {
            Value::List(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(crate::Error::type_conversion(other.clone(), "list")),
        }
    }

    pub fn defer(&self, name: &str, load: PendingLoad) {
        let mut data = self.data.borrow_mut();
        data.fields.insert(name.to_string(), Value::Deferred);
        data.pending.insert(name.to_string(), load);
    }

    pub fn has_pending(&self, name: &str) -> bool {
        self.data.borrow().pending.contains_key(name)
    }

    pub fn pending_count(&self) -> usize {
        self.data.borrow().pending.len()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.data.borrow().fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().fields.is_empty()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        let mut s = f.debug_struct(&data.type_name);
        for (name, value) in &data.fields {
            s.field(name, value);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_materializes_collection() {
        let obj = Object::new("Blog");
        obj.push("posts", Value::I64(1)).unwrap();
        obj.push("posts", Value::I64(2)).unwrap();
        assert_eq!(obj.peek("posts"), Value::List(vec![1i64.into(), 2i64.into()]));
    }

    #[test]
    fn identity_not_structure() {
        let a = Object::new("A");
        let b = Object::new("A");
        assert!(Object::ptr_eq(&a, &a.clone()));
        assert!(!Object::ptr_eq(&a, &b));
    }
}
