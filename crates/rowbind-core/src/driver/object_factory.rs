use crate::ty::{ConstructorDef, PropertyType, TargetKind, TypeDescriptor};
use crate::{Error, Object, Result, Value};

/// Instantiates target objects for the materializer. All instantiation goes
/// through here except direct scalar rows.
pub trait ObjectFactory {
    /// Default construction.
    fn create(&self, descriptor: &TypeDescriptor) -> Result<Value>;

    /// Construction through a specific constructor with resolved arguments,
    /// in the constructor's declaration order.
    fn create_with_args(
        &self,
        descriptor: &TypeDescriptor,
        constructor: &ConstructorDef,
        args: Vec<Value>,
    ) -> Result<Value>;

    fn create_collection(&self) -> Value {
        Value::List(Vec::new())
    }

    fn is_collection(&self, ty: &PropertyType) -> bool {
        ty.is_collection()
    }
}

/// Reference implementation building dynamic [`Object`] handles.
#[derive(Default)]
pub struct DynamicObjectFactory;

impl ObjectFactory for DynamicObjectFactory {
    fn create(&self, descriptor: &TypeDescriptor) -> Result<Value> {
        match descriptor.kind() {
            TargetKind::Scalar(_) => Err(Error::mapping(format!(
                "scalar type `{}` is not object-constructible",
                descriptor.name()
            ))),
            TargetKind::Map | TargetKind::Struct { .. } => {
                Ok(Object::new(descriptor.name()).into())
            }
        }
    }

    fn create_with_args(
        &self,
        descriptor: &TypeDescriptor,
        constructor: &ConstructorDef,
        args: Vec<Value>,
    ) -> Result<Value> {
        if constructor.args.len() != args.len() {
            return Err(Error::mapping(format!(
                "constructor of `{}` takes {} arguments, got {}",
                descriptor.name(),
                constructor.args.len(),
                args.len()
            )));
        }
        let object = Object::new(descriptor.name());
        for ((name, _), value) in constructor.args.iter().zip(args) {
            object.set(name, value);
        }
        Ok(object.into())
    }
}
