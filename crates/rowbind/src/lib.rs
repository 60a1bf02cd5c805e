mod engine;
pub use engine::{Engine, EngineBuilder, MaterializedResults};

pub mod result;
pub use result::{CollectingHandler, ResultContext, RowHandler};

mod row_bounds;
pub use row_bounds::RowBounds;

mod settings;
pub use settings::{AutoMapping, Settings};

mod statement;
pub use statement::Statement;

pub use rowbind_core::{
    driver, schema, ty, value, Discriminator, Error, Object, PropertyMapping, Result, ResultMap,
    Value,
};
pub use rowbind_sql::{
    node, render, resolve_params, ExpressionEvaluator, Flavor, ParamMode, Placeholder,
    RenderedSql, SimpleEvaluator, SqlNode,
};
