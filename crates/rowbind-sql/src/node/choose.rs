use super::{IfNode, SqlNode};
use crate::render::RenderContext;

use rowbind_core::Result;

/// Applies the first `when` whose test holds, in declaration order; falls
/// back to `otherwise` when none do, and contributes nothing without one.
#[derive(Debug, Clone)]
pub struct ChooseNode {
    whens: Vec<IfNode>,
    otherwise: Option<Box<SqlNode>>,
}

impl ChooseNode {
    pub fn new(whens: Vec<IfNode>, otherwise: Option<SqlNode>) -> ChooseNode {
        ChooseNode {
            whens,
            otherwise: otherwise.map(Box::new),
        }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        for when in &self.whens {
            if when.apply(ctx)? {
                return Ok(true);
            }
        }
        if let Some(otherwise) = &self.otherwise {
            otherwise.apply(ctx)?;
            return Ok(true);
        }
        Ok(false)
    }
}
