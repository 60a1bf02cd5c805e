use crate::ty::ScalarType;
use crate::{Error, Result, Value};

use std::collections::HashMap;

/// Scalar conversion seam between raw cursor values and mapped values.
///
/// Treated as a pure function; conversion failures propagate and abort the
/// statement rather than being defaulted.
pub trait TypeHandler {
    /// Converts a raw column value to the target scalar type.
    fn read(&self, raw: Value, target: ScalarType) -> Result<Value>;

    /// Converts a bound parameter value to its driver-native representation.
    fn write(&self, value: &Value) -> Value {
        value.clone()
    }
}

/// The default handler: permissive numeric widening, stringification toward
/// `String` targets, parsing from strings, strict everywhere else.
pub struct ConvertingTypeHandler;

impl TypeHandler for ConvertingTypeHandler {
    fn read(&self, raw: Value, target: ScalarType) -> Result<Value> {
        use ScalarType::*;

        if raw.is_null() {
            return Ok(Value::Null);
        }
        Ok(match (raw, target) {
            (raw, Unknown) => raw,
            (Value::Bool(v), Bool) => Value::Bool(v),
            (Value::I64(v), I64) => Value::I64(v),
            (Value::F64(v), F64) => Value::F64(v),
            (Value::String(v), String) => Value::String(v),
            (Value::Bytes(v), Bytes) => Value::Bytes(v),
            (Value::I64(v), F64) => Value::F64(v as f64),
            (Value::I64(v), Bool) => Value::Bool(v != 0),
            (Value::F64(v), I64) if v.fract() == 0.0 => Value::I64(v as i64),
            (Value::Bool(v), String) => Value::String(v.to_string()),
            (Value::I64(v), String) => Value::String(v.to_string()),
            (Value::F64(v), String) => Value::String(v.to_string()),
            (Value::String(v), I64) => match v.trim().parse::<i64>() {
                Ok(parsed) => Value::I64(parsed),
                Err(_) => return Err(Error::type_conversion(Value::String(v), "i64")),
            },
            (Value::String(v), F64) => match v.trim().parse::<f64>() {
                Ok(parsed) => Value::F64(parsed),
                Err(_) => return Err(Error::type_conversion(Value::String(v), "f64")),
            },
            (Value::String(v), Bool) => match v.as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => return Err(Error::type_conversion(Value::String(v), "bool")),
            },
            (raw, target) => return Err(Error::type_conversion(raw, target.name())),
        })
    }
}

/// Registry of scalar handlers, with the converting handler as fallback.
pub struct TypeHandlerRegistry {
    handlers: HashMap<ScalarType, Box<dyn TypeHandler>>,
    fallback: Box<dyn TypeHandler>,
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        TypeHandlerRegistry {
            handlers: HashMap::new(),
            fallback: Box::new(ConvertingTypeHandler),
        }
    }
}

impl TypeHandlerRegistry {
    /// Overrides the handler used for one target type.
    pub fn register(&mut self, target: ScalarType, handler: Box<dyn TypeHandler>) {
        self.handlers.insert(target, handler);
    }

    pub fn read(&self, raw: Value, target: ScalarType) -> Result<Value> {
        self.handler_for(target).read(raw, target)
    }

    pub fn write(&self, value: &Value, target: ScalarType) -> Value {
        self.handler_for(target).write(value)
    }

    fn handler_for(&self, target: ScalarType) -> &dyn TypeHandler {
        self.handlers
            .get(&target)
            .map(|h| &**h)
            .unwrap_or(&*self.fallback)
    }
}
