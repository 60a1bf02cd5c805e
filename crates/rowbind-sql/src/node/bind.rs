use crate::render::RenderContext;

use rowbind_core::Result;

/// Evaluates an expression once and binds the result under a name, visible to
/// every subsequent sibling and descendant node.
#[derive(Debug, Clone)]
pub struct BindNode {
    name: String,
    expr: String,
}

impl BindNode {
    pub fn new(name: impl Into<String>, expr: impl Into<String>) -> BindNode {
        BindNode {
            name: name.into(),
            expr: expr.into(),
        }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let value = ctx.eval_value(&self.expr)?;
        ctx.bind(&self.name, value);
        Ok(true)
    }
}
