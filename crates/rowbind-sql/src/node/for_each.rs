use super::SqlNode;
use crate::render::RenderContext;
use crate::token;

use rowbind_core::Result;

/// Prefix of the per-iteration unique aliases bound for loop variables.
pub const ITEM_PREFIX: &str = "__frch_";

/// Expands its child once per element of the collection expression.
///
/// Each iteration binds the item and index variables under their plain names
/// *and* under an iteration-unique alias, then rewrites `#{item…}` /
/// `#{index…}` references in the child's output to the alias, so the final
/// parameter list carries one distinct named value per iteration even though
/// the template mentions the variable once. An empty iterable emits nothing —
/// no open, close or separator. The plain-name bindings are removed after the
/// loop so they do not leak to sibling nodes.
#[derive(Debug, Clone)]
pub struct ForEachNode {
    collection: String,
    item: Option<String>,
    index: Option<String>,
    open: Option<String>,
    close: Option<String>,
    separator: Option<String>,
    child: Box<SqlNode>,
}

impl ForEachNode {
    pub fn new(collection: impl Into<String>, child: SqlNode) -> ForEachNode {
        ForEachNode {
            collection: collection.into(),
            item: None,
            index: None,
            open: None,
            close: None,
            separator: None,
            child: Box::new(child),
        }
    }

    pub fn item(mut self, item: impl Into<String>) -> ForEachNode {
        self.item = Some(item.into());
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> ForEachNode {
        self.index = Some(index.into());
        self
    }

    pub fn open(mut self, open: impl Into<String>) -> ForEachNode {
        self.open = Some(open.into());
        self
    }

    pub fn close(mut self, close: impl Into<String>) -> ForEachNode {
        self.close = Some(close.into());
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> ForEachNode {
        self.separator = Some(separator.into());
        self
    }

    pub(crate) fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        let entries = ctx.eval_iterable(&self.collection)?;
        if entries.is_empty() {
            return Ok(true);
        }

        if let Some(open) = &self.open {
            ctx.append(open);
        }
        let mut first = true;
        for (key, item) in entries {
            let n = ctx.unique_number();
            if let Some(index) = &self.index {
                ctx.bind(index, key.clone());
                ctx.bind(&itemize(index, n), key);
            }
            if let Some(item_var) = &self.item {
                ctx.bind(item_var, item.clone());
                ctx.bind(&itemize(item_var, n), item);
            }

            let (piece, _) = ctx.capture(|c| self.child.apply(c))?;
            let piece = rewrite_aliases(
                &piece,
                self.item.as_deref(),
                self.index.as_deref(),
                n,
            )?;
            if !piece.trim().is_empty() {
                if !first {
                    if let Some(separator) = &self.separator {
                        ctx.append(separator);
                    }
                }
                ctx.append(&piece);
                first = false;
            }
        }
        if let Some(close) = &self.close {
            ctx.append(close);
        }

        if let Some(item_var) = &self.item {
            ctx.unbind(item_var);
        }
        if let Some(index) = &self.index {
            ctx.unbind(index);
        }
        Ok(true)
    }
}

fn itemize(var: &str, n: u32) -> String {
    format!("{ITEM_PREFIX}{var}_{n}")
}

/// Rewrites `#{var…}` references to the iteration-unique alias. The variable
/// must be a whole word: followed by `.`/`,`/`:`/whitespace or the end of the
/// token body, so `#{values}` is untouched when the item is named `v`.
fn rewrite_aliases(
    piece: &str,
    item: Option<&str>,
    index: Option<&str>,
    n: u32,
) -> Result<String> {
    token::parse_tokens(piece, "#{", "}", &mut |body| {
        let rewritten = rewrite_body(body, item, n)
            .or_else(|| rewrite_body(body, index, n))
            .unwrap_or_else(|| body.to_string());
        Ok(format!("#{{{rewritten}}}"))
    })
}

fn rewrite_body(body: &str, var: Option<&str>, n: u32) -> Option<String> {
    let var = var?;
    let trimmed = body.trim_start();
    let rest = trimmed.strip_prefix(var)?;
    match rest.chars().next() {
        None => {}
        Some(c) if c == '.' || c == ',' || c == ':' || c.is_whitespace() => {}
        _ => return None,
    }
    Some(format!("{}{rest}", itemize(var, n)))
}
