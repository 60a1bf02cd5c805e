pub mod eval;
pub use eval::{ExpressionEvaluator, Scope, SimpleEvaluator};

mod flavor;
pub use flavor::Flavor;

pub mod node;
pub use node::SqlNode;

mod params;
pub use params::resolve_params;

mod placeholder;
pub use placeholder::{ParamMode, Placeholder};

mod render;
pub use render::{render, RenderContext, RenderedSql};

pub(crate) mod token;
