mod object;
pub use object::{Object, PendingLoad};

use crate::{Error, Result};

/// A dynamically typed value flowing through templates, rows and materialized
/// object graphs.
#[derive(Debug, Default, Clone)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit float
    F64(f64),

    /// String value
    String(String),

    /// Raw byte payload
    Bytes(Vec<u8>),

    /// Null value
    #[default]
    Null,

    /// A list of values; also the collection type for one-to-many properties
    List(Vec<Value>),

    /// A materialized object, shared by handle
    Object(Object),

    /// Placeholder assigned in place of a lazily loaded property.
    ///
    /// Consumers must recognize it and must never persist it as the real
    /// value; the real value arrives through [`Object::get`].
    Deferred,
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred)
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Name of the value's runtime type, used in conversion errors.
    pub fn ty_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I64(_) => "i64",
            Self::F64(_) => "f64",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Null => "null",
            Self::List(_) => "list",
            Self::Object(_) => "object",
            Self::Deferred => "deferred",
        }
    }

    pub fn to_bool(self) -> Result<bool> {
        match self {
            Self::Bool(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "bool")),
        }
    }

    pub fn to_i64(self) -> Result<i64> {
        match self {
            Self::I64(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "i64")),
        }
    }

    pub fn to_f64(self) -> Result<f64> {
        match self {
            Self::F64(v) => Ok(v),
            Self::I64(v) => Ok(v as f64),
            _ => Err(Error::type_conversion(self, "f64")),
        }
    }

    pub fn to_text(self) -> Result<String> {
        match self {
            Self::String(v) => Ok(v),
            _ => Err(Error::type_conversion(self, "string")),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(&**v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_object(&self) -> &Object {
        match self {
            Self::Object(obj) => obj,
            _ => panic!("expected object; value={self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_list(&self) -> &[Value] {
        match self {
            Self::List(items) => items,
            _ => panic!("expected list; value={self:#?}"),
        }
    }

    /// Navigates a dot-separated property path, yielding `Null` on any miss.
    pub fn path(&self, dotted: &str) -> Value {
        let mut current = self.clone();
        for step in dotted.split('.') {
            current = match &current {
                Self::Object(obj) => obj.peek(step),
                _ => return Value::Null,
            };
        }
        current
    }

    /// Renders the value as SQL fragment text for `${}` substitution.
    ///
    /// Deliberately unescaped; substitution may alter SQL structure and the
    /// caller owns keeping it safe.
    pub fn to_sql_text(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::I64(v) => v.to_string(),
            Self::F64(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Bytes(_) => String::new(),
            Self::Null => "null".to_string(),
            Self::List(items) => items
                .iter()
                .map(Value::to_sql_text)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Object(obj) => obj.type_name().to_string(),
            Self::Deferred => String::new(),
        }
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a == b,
            (Self::I64(a), Self::F64(b)) | (Self::F64(b), Self::I64(a)) => *a as f64 == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Deferred, Self::Deferred) => true,
            (Self::List(a), Self::List(b)) => a == b,
            // Object equality is handle identity, not structural
            (Self::Object(a), Self::Object(b)) => Object::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Self {
        Self::Bool(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Self {
        Self::I64(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Self {
        Self::I64(src as i64)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Self {
        Self::F64(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Self {
        Self::String(src)
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Self {
        Self::String(src.to_string())
    }
}

impl From<Object> for Value {
    fn from(src: Object) -> Self {
        Self::Object(src)
    }
}

impl From<Vec<Value>> for Value {
    fn from(src: Vec<Value>) -> Self {
        Self::List(src)
    }
}

impl<T> From<Option<T>> for Value
where
    Self: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::from(value),
            None => Self::Null,
        }
    }
}
