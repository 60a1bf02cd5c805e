mod context;
pub use context::{CollectingHandler, ResultContext, RowHandler};

mod key;
pub use key::RowKey;

pub(crate) mod keygen;

mod materializer;
pub(crate) use materializer::Materializer;

mod reader;
pub(crate) use reader::RowReader;

mod scope;
pub(crate) use scope::{AutoMapEntry, MaterializationScope, PendingRelation};
