mod discriminator;
pub use discriminator::Discriminator;

mod mapping;
pub use mapping::PropertyMapping;

mod registry;
pub use registry::SchemaRegistry;

mod result_map;
pub use result_map::{ResultMap, ResultMapBuilder};
