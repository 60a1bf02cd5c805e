use rowbind_core::driver::{RowCursor, TypeHandlerRegistry};
use rowbind_core::{Error, Result, Value};

/// Copies database-generated key columns back onto the parameter objects of
/// an insert/update, one generated row per target.
///
/// Count mismatches are fatal: more generated rows than targets, fewer rows
/// than targets, or fewer returned columns than key properties all abort
/// rather than silently truncating.
pub(crate) fn assign_generated_keys(
    handlers: &TypeHandlerRegistry,
    cursor: &mut dyn RowCursor,
    key_properties: &[String],
    targets: &mut [Value],
) -> Result<()> {
    if key_properties.is_empty() {
        return Ok(());
    }
    if cursor.column_names().len() < key_properties.len() {
        return Err(Error::mapping(format!(
            "generated key result has {} columns but {} key properties are configured",
            cursor.column_names().len(),
            key_properties.len()
        )));
    }

    let mut assigned = 0usize;
    while cursor.advance()? {
        if assigned >= targets.len() {
            return Err(Error::mapping(format!(
                "too many generated keys: there are only {} target objects",
                targets.len()
            )));
        }
        let target = targets[assigned]
            .as_object()
            .ok_or_else(|| Error::mapping("generated keys require an object parameter"))?
            .clone();
        for (index, property) in key_properties.iter().enumerate() {
            let raw = cursor.raw_value(index)?;
            let value = handlers.read(raw, cursor.declared_type(index))?;
            target.set(property, value);
        }
        assigned += 1;
    }

    if assigned < targets.len() {
        return Err(Error::mapping(format!(
            "not enough generated keys: got {assigned} rows for {} target objects",
            targets.len()
        )));
    }
    Ok(())
}
