mod bind;
pub use bind::BindNode;

mod choose;
pub use choose::ChooseNode;

mod for_each;
pub use for_each::ForEachNode;

mod if_node;
pub use if_node::IfNode;

mod mixed;
pub use mixed::MixedNode;

mod raw_text;
pub use raw_text::RawText;

mod static_text;
pub use static_text::StaticText;

mod trim;
pub use trim::TrimNode;

use crate::render::RenderContext;
use rowbind_core::Result;

/// One node of a dynamic SQL template.
///
/// A closed sum over the node kinds: adding a tag means adding a variant, not
/// patching a dispatch table. Trees are immutable, built once per statement
/// and shared across executions.
#[derive(Debug, Clone)]
pub enum SqlNode {
    Static(StaticText),
    Raw(RawText),
    If(IfNode),
    Choose(ChooseNode),
    Trim(TrimNode),
    ForEach(ForEachNode),
    Bind(BindNode),
    Mixed(MixedNode),
}

impl SqlNode {
    /// Appends this node's contribution to the context's buffer. The returned
    /// flag reports whether the node contributed (an `If` whose test failed
    /// did not), which `Choose` uses to pick its branch.
    pub fn apply(&self, ctx: &mut RenderContext<'_>) -> Result<bool> {
        match self {
            SqlNode::Static(node) => node.apply(ctx),
            SqlNode::Raw(node) => node.apply(ctx),
            SqlNode::If(node) => node.apply(ctx),
            SqlNode::Choose(node) => node.apply(ctx),
            SqlNode::Trim(node) => node.apply(ctx),
            SqlNode::ForEach(node) => node.apply(ctx),
            SqlNode::Bind(node) => node.apply(ctx),
            SqlNode::Mixed(node) => node.apply(ctx),
        }
    }

    /// Static text, or raw text when it carries `${}` substitution tokens.
    pub fn text(text: impl Into<String>) -> SqlNode {
        let text = text.into();
        if RawText::is_dynamic(&text) {
            SqlNode::Raw(RawText::new(text))
        } else {
            SqlNode::Static(StaticText::new(text))
        }
    }

    pub fn mixed(children: Vec<SqlNode>) -> SqlNode {
        SqlNode::Mixed(MixedNode::new(children))
    }

    pub fn when(test: impl Into<String>, child: SqlNode) -> SqlNode {
        SqlNode::If(IfNode::new(test, child))
    }

    /// `Trim` preset emitting a `WHERE` clause with leading `AND`/`OR` strip.
    pub fn where_clause(child: SqlNode) -> SqlNode {
        SqlNode::Trim(TrimNode::where_clause(child))
    }

    /// `Trim` preset emitting a `SET` clause with trailing comma strip.
    pub fn set_clause(child: SqlNode) -> SqlNode {
        SqlNode::Trim(TrimNode::set_clause(child))
    }
}
