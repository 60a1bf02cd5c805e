mod cursor;
pub use cursor::{MemoryCursor, MemoryResults, RowCursor, StatementResults};

mod executor;
pub use executor::{NullExecutor, SubQueryExecutor};

mod object_factory;
pub use object_factory::{DynamicObjectFactory, ObjectFactory};

mod type_handler;
pub use type_handler::{ConvertingTypeHandler, TypeHandler, TypeHandlerRegistry};
