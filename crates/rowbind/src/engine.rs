use crate::result::{keygen, Materializer, RowHandler};
use crate::row_bounds::RowBounds;
use crate::settings::Settings;
use crate::statement::Statement;

use rowbind_core::driver::{
    DynamicObjectFactory, ObjectFactory, RowCursor, StatementResults, SubQueryExecutor,
    TypeHandlerRegistry,
};
use rowbind_core::schema::ResultMapBuilder;
use rowbind_core::ty::TypeDescriptor;
use rowbind_core::{Error, Result, SchemaRegistry, TypeRegistry, Value};
use rowbind_sql::{ExpressionEvaluator, RenderedSql, SimpleEvaluator};

use std::collections::HashMap;
use std::rc::Rc;

/// The configured mapping engine: statements, result maps, type descriptors
/// and the collaborator implementations, assembled once and shared by every
/// execution.
pub struct Engine {
    settings: Settings,
    types: TypeRegistry,
    schemas: SchemaRegistry,
    handlers: TypeHandlerRegistry,
    factory: Box<dyn ObjectFactory>,
    evaluator: Box<dyn ExpressionEvaluator>,
    statements: HashMap<String, Statement>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("statements", &self.statements.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            settings: Settings::default(),
            types: TypeRegistry::default(),
            result_maps: Vec::new(),
            statements: Vec::new(),
            handlers: TypeHandlerRegistry::default(),
            factory: Box::new(DynamicObjectFactory),
            evaluator: Box::new(SimpleEvaluator),
        }
    }

    /// Assembles the final SQL text and ordered placeholder descriptors for a
    /// statement against the given parameter object.
    pub fn render(&self, statement_id: &str, param: Value) -> Result<RenderedSql> {
        let statement = self.statement(statement_id)?;
        rowbind_sql::render(statement.root(), param, &*self.evaluator, self.settings.flavor)
    }

    /// Maps every result set of a statement into object graphs: one list per
    /// declared result map.
    pub fn materialize(
        &self,
        statement_id: &str,
        results: &mut dyn StatementResults,
        executor: Rc<dyn SubQueryExecutor>,
    ) -> Result<MaterializedResults> {
        self.materialize_bounded(statement_id, results, executor, RowBounds::DEFAULT)
    }

    /// Like [`materialize`](Self::materialize) with an offset/limit window.
    /// Rejected over nested result maps while `safe_row_bounds` holds.
    pub fn materialize_bounded(
        &self,
        statement_id: &str,
        results: &mut dyn StatementResults,
        executor: Rc<dyn SubQueryExecutor>,
        bounds: RowBounds,
    ) -> Result<MaterializedResults> {
        let statement = self.statement(statement_id)?;
        let materializer = Materializer::new(self, statement, executor, bounds);
        let lists = materializer.run(results, None)?;
        Ok(MaterializedResults { lists })
    }

    /// Streaming variant: rows go to `handler` as they materialize instead of
    /// accumulating, and `ctx.stop()` ends consumption early.
    pub fn materialize_with_handler(
        &self,
        statement_id: &str,
        results: &mut dyn StatementResults,
        executor: Rc<dyn SubQueryExecutor>,
        handler: &mut dyn RowHandler,
    ) -> Result<()> {
        let statement = self.statement(statement_id)?;
        let materializer = Materializer::new(self, statement, executor, RowBounds::DEFAULT);
        materializer.run(results, Some(handler))?;
        Ok(())
    }

    /// Assigns database-generated key columns back onto the parameter
    /// objects, per the statement's configured key properties.
    pub fn assign_generated_keys(
        &self,
        statement_id: &str,
        cursor: &mut dyn RowCursor,
        targets: &mut [Value],
    ) -> Result<()> {
        let statement = self.statement(statement_id)?;
        keygen::assign_generated_keys(
            &self.handlers,
            cursor,
            statement.key_properties(),
            targets,
        )
    }

    pub fn statement(&self, id: &str) -> Result<&Statement> {
        self.statements
            .get(id)
            .ok_or_else(|| Error::mapping(format!("unknown statement `{id}`")))
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub(crate) fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub(crate) fn handlers(&self) -> &TypeHandlerRegistry {
        &self.handlers
    }

    pub(crate) fn factory(&self) -> &dyn ObjectFactory {
        &*self.factory
    }
}

/// Collects configuration, then validates the whole of it at `build`:
/// result maps resolve against registered types, forward references must be
/// satisfied, statements must name registered result maps.
pub struct EngineBuilder {
    settings: Settings,
    types: TypeRegistry,
    result_maps: Vec<ResultMapBuilder>,
    statements: Vec<Statement>,
    handlers: TypeHandlerRegistry,
    factory: Box<dyn ObjectFactory>,
    evaluator: Box<dyn ExpressionEvaluator>,
}

impl EngineBuilder {
    pub fn settings(mut self, settings: Settings) -> EngineBuilder {
        self.settings = settings;
        self
    }

    pub fn register_type(mut self, descriptor: TypeDescriptor) -> EngineBuilder {
        self.types.register(descriptor);
        self
    }

    pub fn result_map(mut self, builder: ResultMapBuilder) -> EngineBuilder {
        self.result_maps.push(builder);
        self
    }

    pub fn statement(mut self, statement: Statement) -> EngineBuilder {
        self.statements.push(statement);
        self
    }

    pub fn type_handler(
        mut self,
        target: rowbind_core::ScalarType,
        handler: Box<dyn rowbind_core::driver::TypeHandler>,
    ) -> EngineBuilder {
        self.handlers.register(target, handler);
        self
    }

    pub fn object_factory(mut self, factory: Box<dyn ObjectFactory>) -> EngineBuilder {
        self.factory = factory;
        self
    }

    pub fn evaluator(mut self, evaluator: Box<dyn ExpressionEvaluator>) -> EngineBuilder {
        self.evaluator = evaluator;
        self
    }

    pub fn build(self) -> Result<Engine> {
        let mut schemas = SchemaRegistry::default();
        for builder in self.result_maps {
            schemas.register(builder.build(&self.types)?)?;
        }
        schemas.assert_complete()?;

        let mut statements = HashMap::new();
        for statement in self.statements {
            for map_id in statement.result_map_ids() {
                schemas.get(map_id).map_err(|err| {
                    err.context(Error::schema_build(format!(
                        "statement `{}` names an unknown result map",
                        statement.id()
                    )))
                })?;
            }
            statements.insert(statement.id().to_string(), statement);
        }

        Ok(Engine {
            settings: self.settings,
            types: self.types,
            schemas,
            handlers: self.handlers,
            factory: self.factory,
            evaluator: self.evaluator,
            statements,
        })
    }
}

/// The materialized output of one statement: one list per declared result
/// map.
#[derive(Debug)]
pub struct MaterializedResults {
    lists: Vec<Value>,
}

impl MaterializedResults {
    pub fn lists(&self) -> &[Value] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Collapses a single-result-map statement to its one list; statements
    /// with several declared result maps stay a list of lists.
    pub fn into_single(mut self) -> Value {
        if self.lists.len() == 1 {
            self.lists.pop().unwrap()
        } else {
            Value::List(self.lists)
        }
    }
}
