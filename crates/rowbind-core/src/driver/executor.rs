use crate::{Error, Result, Value};

/// Runs nested sub-queries on behalf of the materializer.
///
/// `execute` returns the mapped result of the named statement for the given
/// parameter (a list, or a single value for one-row statements). The engine
/// treats it as a pure call; caching lives behind this seam, with `is_cached`
/// letting the materializer register a deferred load instead of re-executing.
pub trait SubQueryExecutor {
    fn execute(&self, statement_id: &str, param: &Value) -> Result<Value>;

    fn is_cached(&self, _statement_id: &str, _param: &Value) -> bool {
        false
    }
}

/// Executor for statements without nested sub-queries; any execution attempt
/// is a mapping error.
pub struct NullExecutor;

impl SubQueryExecutor for NullExecutor {
    fn execute(&self, statement_id: &str, _param: &Value) -> Result<Value> {
        Err(Error::mapping(format!(
            "no sub-query executor configured; cannot run `{statement_id}`"
        )))
    }
}
