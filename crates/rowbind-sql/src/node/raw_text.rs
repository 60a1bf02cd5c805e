use crate::render::RenderContext;
use crate::token;

use rowbind_core::Result;

/// Text carrying `${}` substitution tokens.
///
/// Each token is evaluated against the bindings and spliced in stringified
/// and unescaped. This is textual substitution, not a bound placeholder: it
/// may alter SQL structure (dynamic table and column names), and keeping it
/// safe is the caller's documented responsibility.
#[derive(Debug, Clone)]
pub struct RawText {
    text: String,
}

impl RawText {
    pub fn new(text: impl Into<String>) -> RawText {
        RawText { text: text.into() }
    }

    /// Any occurrence of the opening marker routes the text through raw
    /// substitution, where an unterminated token becomes a render error.
    pub fn is_dynamic(text: &str) -> bool {
        text.contains("${")
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let substituted = token::parse_tokens(&self.text, "${", "}", &mut |body| {
            Ok(ctx.eval_value(body.trim())?.to_sql_text())
        })?;
        ctx.append(&substituted);
        Ok(true)
    }
}
