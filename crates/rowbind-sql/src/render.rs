use crate::eval::{ExpressionEvaluator, Scope};
use crate::node::SqlNode;
use crate::placeholder::Placeholder;
use crate::{token, Flavor};

use rowbind_core::{Result, Value};

use indexmap::IndexMap;

/// Binding name under which the whole parameter object is reachable.
pub const PARAMETER_OBJECT_KEY: &str = "_parameter";

/// The mutable environment threaded through one template evaluation:
/// current bindings (falling back to the parameter object), accumulated SQL
/// fragments, and the counter producing collision-free loop aliases.
///
/// One context per render; the node tree itself is immutable and shared.
pub struct RenderContext<'a> {
    evaluator: &'a dyn ExpressionEvaluator,
    bindings: IndexMap<String, Value>,
    param: Value,
    fragments: Vec<String>,
    unique: u32,
}

impl<'a> RenderContext<'a> {
    pub fn new(param: Value, evaluator: &'a dyn ExpressionEvaluator) -> RenderContext<'a> {
        let mut bindings = IndexMap::new();
        bindings.insert(PARAMETER_OBJECT_KEY.to_string(), param.clone());
        RenderContext {
            evaluator,
            bindings,
            param,
            fragments: Vec::new(),
            unique: 0,
        }
    }

    pub fn bind(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn unbind(&mut self, name: &str) {
        self.bindings.shift_remove(name);
    }

    pub fn append(&mut self, sql: &str) {
        self.fragments.push(sql.to_string());
    }

    /// The SQL accumulated so far, fragments joined by single spaces.
    pub fn sql(&self) -> String {
        self.fragments.join(" ").trim().to_string()
    }

    pub fn unique_number(&mut self) -> u32 {
        let n = self.unique;
        self.unique += 1;
        n
    }

    pub fn eval_bool(&self, expr: &str) -> Result<bool> {
        self.evaluator.eval_bool(expr, self)
    }

    pub fn eval_value(&self, expr: &str) -> Result<Value> {
        self.evaluator.eval_value(expr, self)
    }

    pub fn eval_iterable(&self, expr: &str) -> Result<Vec<(Value, Value)>> {
        self.evaluator.eval_iterable(expr, self)
    }

    /// Runs `f` with an empty fragment buffer and returns what it produced,
    /// restoring the outer buffer afterwards. Bindings and the unique counter
    /// stay shared. This is how `Trim` and `ForEach` post-process the text
    /// their children emit before it reaches the outer buffer.
    pub fn capture(
        &mut self,
        f: impl FnOnce(&mut RenderContext<'a>) -> Result<bool>,
    ) -> Result<(String, bool)> {
        let outer = std::mem::take(&mut self.fragments);
        let applied = f(self);
        let captured = self.sql();
        self.fragments = outer;
        Ok((captured, applied?))
    }

    pub(crate) fn into_bindings(self) -> IndexMap<String, Value> {
        self.bindings
    }
}

impl Scope for RenderContext<'_> {
    fn resolve(&self, name: &str) -> Value {
        if let Some(value) = self.bindings.get(name) {
            return value.clone();
        }
        self.param.path(name)
    }
}

/// Final output of a render: trimmed SQL text with flavor placeholders, the
/// ordered placeholder descriptors, and the extra bindings (`bind` variables
/// and per-iteration loop aliases) that parameter resolution needs.
#[derive(Debug)]
pub struct RenderedSql {
    pub text: String,
    pub placeholders: Vec<Placeholder>,
    pub bindings: IndexMap<String, Value>,
}

/// Evaluates a node tree against a parameter object, producing the final SQL
/// text and its ordered placeholder descriptors.
///
/// Rendering the same tree with the same parameter object twice yields
/// byte-identical output.
pub fn render(
    node: &SqlNode,
    param: Value,
    evaluator: &dyn ExpressionEvaluator,
    flavor: Flavor,
) -> Result<RenderedSql> {
    let mut ctx = RenderContext::new(param, evaluator);
    node.apply(&mut ctx)?;
    let raw = ctx.sql();

    let mut placeholders = Vec::new();
    let text = token::parse_tokens(&raw, "#{", "}", &mut |body| {
        let placeholder = Placeholder::parse(body)?;
        placeholders.push(placeholder);
        Ok(flavor.placeholder(placeholders.len()))
    })?;

    log::debug!("rendered sql: {text}");
    Ok(RenderedSql {
        text,
        placeholders,
        bindings: ctx.into_bindings(),
    })
}
