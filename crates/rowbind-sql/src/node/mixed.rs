use super::SqlNode;
use crate::render::RenderContext;

use rowbind_core::Result;

/// Ordered composition of child nodes; no branching of its own.
#[derive(Debug, Clone)]
pub struct MixedNode {
    children: Vec<SqlNode>,
}

impl MixedNode {
    pub fn new(children: Vec<SqlNode>) -> MixedNode {
        MixedNode { children }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        for child in &self.children {
            child.apply(ctx)?;
        }
        Ok(true)
    }
}
