use rowbind_core::{Result, Value};

/// Per-row callback for streaming consumption; `ctx.stop()` ends the loop
/// early without draining the cursor.
pub trait RowHandler {
    fn handle(&mut self, ctx: &mut ResultContext) -> Result<()>;
}

/// State handed to a [`RowHandler`]: the current row's object, the running
/// count, and the stop flag.
#[derive(Default)]
pub struct ResultContext {
    current: Value,
    count: usize,
    stopped: bool,
}

impl ResultContext {
    pub(crate) fn new() -> ResultContext {
        ResultContext::default()
    }

    pub fn result(&self) -> &Value {
        &self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Requests early termination; no further rows are materialized.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub(crate) fn next(&mut self, value: Value) {
        self.count += 1;
        self.current = value;
    }
}

/// The default handler: accumulates every row object into a list.
#[derive(Default)]
pub struct CollectingHandler {
    pub results: Vec<Value>,
}

impl RowHandler for CollectingHandler {
    fn handle(&mut self, ctx: &mut ResultContext) -> Result<()> {
        self.results.push(ctx.result().clone());
        Ok(())
    }
}
