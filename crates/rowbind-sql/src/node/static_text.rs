use crate::render::RenderContext;
use rowbind_core::Result;

/// Literal SQL text, appended verbatim.
#[derive(Debug, Clone)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    pub fn new(text: impl Into<String>) -> StaticText {
        StaticText { text: text.into() }
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        ctx.append(&self.text);
        Ok(true)
    }
}
