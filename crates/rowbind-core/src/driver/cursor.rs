use crate::ty::ScalarType;
use crate::{Error, Result, Value};

/// A forward-only cursor over the rows of one result set.
///
/// The engine never sees the wire protocol; rows come through this seam. A
/// closed cursor must fail further pulls cleanly instead of blocking — that
/// is how cancellation is expressed.
pub trait RowCursor {
    /// Moves to the next row; `false` once exhausted.
    fn advance(&mut self) -> Result<bool>;

    fn column_names(&self) -> &[String];

    /// Declared scalar type of a column, by position.
    fn declared_type(&self, index: usize) -> ScalarType;

    /// Raw value of the given column in the current row, unconverted.
    fn raw_value(&self, index: usize) -> Result<Value>;

    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Provider of the (possibly several) result sets one statement produced.
pub trait StatementResults {
    fn next_cursor(&mut self) -> Result<Option<Box<dyn RowCursor>>>;
}

/// In-memory [`RowCursor`] used by tests and demos.
pub struct MemoryCursor {
    columns: Vec<String>,
    types: Vec<ScalarType>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
    closed: bool,
}

impl MemoryCursor {
    pub fn new(columns: &[&str], rows: Vec<Vec<Value>>) -> MemoryCursor {
        let types = vec![ScalarType::Unknown; columns.len()];
        MemoryCursor::with_types(columns, types, rows)
    }

    pub fn with_types(
        columns: &[&str],
        types: Vec<ScalarType>,
        rows: Vec<Vec<Value>>,
    ) -> MemoryCursor {
        assert_eq!(columns.len(), types.len());
        MemoryCursor {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            types,
            rows,
            position: None,
            closed: false,
        }
    }
}

impl RowCursor for MemoryCursor {
    fn advance(&mut self) -> Result<bool> {
        if self.closed {
            return Err(Error::mapping("cursor is closed"));
        }
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = Some(self.rows.len());
            Ok(false)
        }
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn declared_type(&self, index: usize) -> ScalarType {
        self.types.get(index).copied().unwrap_or(ScalarType::Unknown)
    }

    fn raw_value(&self, index: usize) -> Result<Value> {
        if self.closed {
            return Err(Error::mapping("cursor is closed"));
        }
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| Error::mapping("cursor is not positioned on a row"))?;
        Ok(row.get(index).cloned().unwrap_or(Value::Null))
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// In-memory [`StatementResults`] yielding pre-built cursors in order.
pub struct MemoryResults {
    cursors: Vec<MemoryCursor>,
}

impl MemoryResults {
    pub fn new(cursors: Vec<MemoryCursor>) -> MemoryResults {
        let mut cursors = cursors;
        cursors.reverse();
        MemoryResults { cursors }
    }

    pub fn single(cursor: MemoryCursor) -> MemoryResults {
        MemoryResults::new(vec![cursor])
    }
}

impl StatementResults for MemoryResults {
    fn next_cursor(&mut self) -> Result<Option<Box<dyn RowCursor>>> {
        Ok(self
            .cursors
            .pop()
            .map(|cursor| Box::new(cursor) as Box<dyn RowCursor>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_cursor_fails_cleanly() {
        let mut cursor = MemoryCursor::new(&["id"], vec![vec![Value::I64(1)]]);
        assert!(cursor.advance().unwrap());
        cursor.close();
        assert!(cursor.advance().unwrap_err().is_mapping());
        assert!(cursor.raw_value(0).unwrap_err().is_mapping());
    }

    #[test]
    fn advance_past_end_stays_false() {
        let mut cursor = MemoryCursor::new(&["id"], vec![vec![Value::I64(1)]]);
        assert!(cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
        assert!(!cursor.advance().unwrap());
    }
}
