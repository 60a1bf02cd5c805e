pub mod driver;

mod error;
pub use error::Error;

pub mod schema;
pub use schema::{Discriminator, PropertyMapping, ResultMap, SchemaRegistry};

pub mod ty;
pub use ty::{ConstructorDef, PropertyDef, PropertyType, ScalarType, TypeDescriptor, TypeRegistry};

pub mod value;
pub use value::{Object, Value};

/// A Result type alias that uses rowbind's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
