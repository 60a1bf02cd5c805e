use rowbind_core::driver::{RowCursor, TypeHandlerRegistry};
use rowbind_core::{Error, Result, ResultMap, ScalarType, Value};

use std::collections::HashMap;

/// Wraps one result set's cursor with the column bookkeeping the
/// materializer needs: label lookup, declared types, and the per-result-map
/// partition of columns into explicitly mapped and unmapped.
pub(crate) struct RowReader {
    cursor: Box<dyn RowCursor>,
    labels: Vec<String>,
    labels_upper: Vec<String>,
    types: Vec<ScalarType>,
    // "map-id:prefix" → (mapped upper-cased, unmapped original-cased)
    partitions: HashMap<String, (Vec<String>, Vec<String>)>,
}

impl RowReader {
    pub(crate) fn new(cursor: Box<dyn RowCursor>) -> RowReader {
        let labels: Vec<String> = cursor.column_names().to_vec();
        let labels_upper = labels.iter().map(|l| l.to_uppercase()).collect();
        let types = (0..labels.len()).map(|i| cursor.declared_type(i)).collect();
        RowReader {
            cursor,
            labels,
            labels_upper,
            types,
            partitions: HashMap::new(),
        }
    }

    pub(crate) fn advance(&mut self) -> Result<bool> {
        self.cursor.advance()
    }

    pub(crate) fn close(&mut self) {
        self.cursor.close();
    }

    pub(crate) fn labels(&self) -> &[String] {
        &self.labels
    }

    pub(crate) fn labels_upper(&self) -> &[String] {
        &self.labels_upper
    }

    pub(crate) fn column_count(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub(crate) fn declared_type(&self, index: usize) -> ScalarType {
        self.types[index]
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        let upper = name.to_uppercase();
        self.labels_upper.iter().position(|l| *l == upper)
    }

    /// Raw, unconverted value of a column in the current row.
    pub(crate) fn raw(&self, column: &str) -> Result<Value> {
        let index = self
            .index_of(column)
            .ok_or_else(|| Error::mapping(format!("unknown column `{column}`")))?;
        self.cursor.raw_value(index)
    }

    /// Value of a column converted to the target type; without a declared
    /// target the column's own declared type applies.
    pub(crate) fn read(
        &self,
        column: &str,
        handlers: &TypeHandlerRegistry,
        target: Option<ScalarType>,
    ) -> Result<Value> {
        let index = self
            .index_of(column)
            .ok_or_else(|| Error::mapping(format!("unknown column `{column}`")))?;
        let raw = self.cursor.raw_value(index)?;
        handlers.read(raw, target.unwrap_or_else(|| self.declared_type(index)))
    }

    pub(crate) fn read_at(
        &self,
        index: usize,
        handlers: &TypeHandlerRegistry,
        target: ScalarType,
    ) -> Result<Value> {
        let raw = self.cursor.raw_value(index)?;
        handlers.read(raw, target)
    }

    /// Stringified column value, `None` for SQL null.
    pub(crate) fn get_string(&self, column: &str) -> Result<Option<String>> {
        Ok(match self.raw(column)? {
            Value::Null => None,
            value => Some(value.to_sql_text()),
        })
    }

    /// Columns of this result set that `map` (under `prefix`) maps
    /// explicitly, upper-cased.
    pub(crate) fn mapped_columns(&mut self, map: &ResultMap, prefix: &str) -> Vec<String> {
        self.partition(map, prefix).0
    }

    /// Columns of this result set that `map` (under `prefix`) does not map.
    pub(crate) fn unmapped_columns(&mut self, map: &ResultMap, prefix: &str) -> Vec<String> {
        self.partition(map, prefix).1
    }

    fn partition(&mut self, map: &ResultMap, prefix: &str) -> (Vec<String>, Vec<String>) {
        let key = format!("{}:{}", map.id(), prefix);
        if let Some(found) = self.partitions.get(&key) {
            return found.clone();
        }

        let upper_prefix = prefix.to_uppercase();
        let mapped_set: Vec<String> = map
            .mapped_columns()
            .iter()
            .map(|column| format!("{upper_prefix}{column}"))
            .collect();

        let mut mapped = Vec::new();
        let mut unmapped = Vec::new();
        for (label, upper) in self.labels.iter().zip(&self.labels_upper) {
            if mapped_set.iter().any(|column| column == upper) {
                mapped.push(upper.clone());
            } else {
                unmapped.push(label.clone());
            }
        }
        self.partitions.insert(key, (mapped.clone(), unmapped.clone()));
        (mapped, unmapped)
    }
}
