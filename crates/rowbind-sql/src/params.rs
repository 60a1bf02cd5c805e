use crate::placeholder::ParamMode;
use crate::render::RenderedSql;

use rowbind_core::{Result, Value};

/// Resolves the ordered parameter values for a rendered statement.
///
/// Resolution order per placeholder: the render's extra bindings first (loop
/// aliases and `bind` variables), then the parameter object's property; a
/// null parameter object resolves everything to null. Out-only placeholders
/// are skipped.
pub fn resolve_params(rendered: &RenderedSql, param: &Value) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(rendered.placeholders.len());

    for placeholder in &rendered.placeholders {
        if placeholder.mode == ParamMode::Out {
            continue;
        }
        let property = placeholder.property.as_str();

        let value = if let Some(bound) = rendered.bindings.get(property) {
            bound.clone()
        } else if let Some((head, rest)) = property.split_once('.') {
            match rendered.bindings.get(head) {
                Some(base) => base.path(rest),
                None => param.path(property),
            }
        } else if param.is_null() {
            Value::Null
        } else {
            param.path(property)
        };
        values.push(value);
    }
    Ok(values)
}
