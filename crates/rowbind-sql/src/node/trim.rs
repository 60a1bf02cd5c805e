use super::SqlNode;
use crate::render::RenderContext;

use rowbind_core::Result;

/// Renders its child into a private buffer, then — once, no matter how many
/// sub-fragments contributed — strips at most one configured prefix token and
/// one suffix token from the trimmed text and inserts the configured
/// prefix/suffix strings.
///
/// Override tokens are matched case-normalized against the buffer; trailing
/// whitespace in an override is significant for matching (`"AND "` does not
/// strip a bare trailing `AND`).
#[derive(Debug, Clone)]
pub struct TrimNode {
    child: Box<SqlNode>,
    prefix: Option<String>,
    suffix: Option<String>,
    prefix_overrides: Vec<String>,
    suffix_overrides: Vec<String>,
}

impl TrimNode {
    pub fn new(child: SqlNode) -> TrimNode {
        TrimNode {
            child: Box::new(child),
            prefix: None,
            suffix: None,
            prefix_overrides: Vec::new(),
            suffix_overrides: Vec::new(),
        }
    }

    /// `WHERE` preset: insert the prefix, strip one leading `AND`/`OR`.
    pub fn where_clause(child: SqlNode) -> TrimNode {
        TrimNode::new(child)
            .prefix("WHERE")
            .prefix_overrides("AND |OR |AND\t|OR\t|AND\n|OR\n|AND\r|OR\r")
    }

    /// `SET` preset: insert the prefix, strip dangling commas.
    pub fn set_clause(child: SqlNode) -> TrimNode {
        TrimNode::new(child)
            .prefix("SET")
            .prefix_overrides(",")
            .suffix_overrides(",")
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> TrimNode {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> TrimNode {
        self.suffix = Some(suffix.into());
        self
    }

    /// Pipe-separated tokens to strip from the front of the child's output.
    pub fn prefix_overrides(mut self, overrides: &str) -> TrimNode {
        self.prefix_overrides = parse_overrides(overrides);
        self
    }

    /// Pipe-separated tokens to strip from the end of the child's output.
    pub fn suffix_overrides(mut self, overrides: &str) -> TrimNode {
        self.suffix_overrides = parse_overrides(overrides);
        self
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let (piece, applied) = ctx.capture(|c| self.child.apply(c))?;
        let mut buf = piece.trim().to_string();

        if !buf.is_empty() {
            let upper = buf.to_uppercase();
            for token in &self.prefix_overrides {
                if upper.starts_with(token.as_str()) {
                    buf.drain(..token.trim_end().len());
                    let trimmed = buf.trim_start().to_string();
                    buf = trimmed;
                    break;
                }
            }
            let upper = buf.to_uppercase();
            for token in &self.suffix_overrides {
                if upper.ends_with(token.as_str()) || upper.ends_with(token.trim()) {
                    buf.truncate(buf.len() - token.trim().len());
                    let trimmed = buf.trim_end().to_string();
                    buf = trimmed;
                    break;
                }
            }
            if let Some(prefix) = &self.prefix {
                buf = format!("{prefix} {buf}");
            }
            if let Some(suffix) = &self.suffix {
                buf = format!("{buf} {suffix}");
            }
            ctx.append(&buf);
        }
        Ok(applied)
    }
}

fn parse_overrides(overrides: &str) -> Vec<String> {
    overrides
        .split('|')
        .filter(|token| !token.is_empty())
        .map(|token| token.to_uppercase())
        .collect()
}
