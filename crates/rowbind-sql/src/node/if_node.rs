use super::SqlNode;
use crate::render::RenderContext;

use rowbind_core::Result;

/// Applies its child only when the test expression holds.
#[derive(Debug, Clone)]
pub struct IfNode {
    test: String,
    child: Box<SqlNode>,
}

impl IfNode {
    pub fn new(test: impl Into<String>, child: SqlNode) -> IfNode {
        IfNode {
            test: test.into(),
            child: Box::new(child),
        }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        if ctx.eval_bool(&self.test)? {
            self.child.apply(ctx)?;
            return Ok(true);
        }
        Ok(false)
    }
}
