use crate::{Error, Result};

use std::collections::HashMap;

/// Scalar column/property types the engine converts between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    I64,
    F64,
    String,
    Bytes,
    /// No declared type; values pass through unconverted.
    Unknown,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I64 => "i64",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(src: &str) -> Result<ScalarType> {
        Ok(match src {
            "bool" => Self::Bool,
            "i64" => Self::I64,
            "f64" => Self::F64,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "unknown" => Self::Unknown,
            _ => return Err(Error::template(format!("unknown scalar type `{src}`"))),
        })
    }

    /// Whether the default converting handler can produce `self` from a
    /// column declared as `from`. Used by the constructor-signature search.
    pub fn convertible_from(self, from: ScalarType) -> bool {
        use ScalarType::*;

        match (from, self) {
            (_, Unknown) | (Unknown, _) => true,
            (a, b) if a == b => true,
            (I64, F64) | (I64, Bool) | (I64, String) => true,
            (F64, I64) | (F64, String) => true,
            (String, I64) | (String, F64) | (String, Bool) => true,
            (Bool, String) => true,
            _ => false,
        }
    }
}

/// Declared type of a settable property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(ScalarType),
    /// Nested object of the named target type.
    Object(String),
    /// One-to-many collection property.
    List,
}

impl PropertyType {
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List)
    }

    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            Self::Scalar(ty) => Some(*ty),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub ty: PropertyType,
    pub settable: bool,
}

/// A constructor the object factory can invoke: named, scalar-typed
/// arguments in declaration order.
#[derive(Debug, Clone)]
pub struct ConstructorDef {
    pub args: Vec<(String, ScalarType)>,
    /// Marks the constructor preferred by the signature search, standing in
    /// for the original's annotation-marked automap constructor.
    pub default_mapping: bool,
}

#[derive(Debug, Clone)]
pub enum TargetKind {
    /// Single-column rows convert straight to this scalar; no properties.
    Scalar(ScalarType),
    /// Open property set; every returned column is settable.
    Map,
    Struct {
        properties: Vec<PropertyDef>,
        constructors: Vec<ConstructorDef>,
    },
}

/// Compile-time stand-in for runtime reflection: everything the engine needs
/// to know about a target type is captured here when the configuration is
/// built.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TargetKind,
}

impl TypeDescriptor {
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> TypeDescriptor {
        TypeDescriptor {
            name: name.into(),
            kind: TargetKind::Scalar(ty),
        }
    }

    pub fn map(name: impl Into<String>) -> TypeDescriptor {
        TypeDescriptor {
            name: name.into(),
            kind: TargetKind::Map,
        }
    }

    pub fn strct(name: impl Into<String>) -> TypeDescriptor {
        TypeDescriptor {
            name: name.into(),
            kind: TargetKind::Struct {
                properties: Vec::new(),
                constructors: Vec::new(),
            },
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, ty: PropertyType) -> TypeDescriptor {
        if let TargetKind::Struct { properties, .. } = &mut self.kind {
            properties.push(PropertyDef {
                name: name.into(),
                ty,
                settable: true,
            });
        }
        self
    }

    pub fn with_readonly_property(
        mut self,
        name: impl Into<String>,
        ty: PropertyType,
    ) -> TypeDescriptor {
        if let TargetKind::Struct { properties, .. } = &mut self.kind {
            properties.push(PropertyDef {
                name: name.into(),
                ty,
                settable: false,
            });
        }
        self
    }

    pub fn with_constructor(mut self, args: &[(&str, ScalarType)]) -> TypeDescriptor {
        self.push_constructor(args, false);
        self
    }

    /// Registers a constructor and marks it as the default mapping one.
    pub fn with_default_constructor(mut self, args: &[(&str, ScalarType)]) -> TypeDescriptor {
        self.push_constructor(args, true);
        self
    }

    fn push_constructor(&mut self, args: &[(&str, ScalarType)], default_mapping: bool) {
        if let TargetKind::Struct { constructors, .. } = &mut self.kind {
            constructors.push(ConstructorDef {
                args: args
                    .iter()
                    .map(|(name, ty)| (name.to_string(), *ty))
                    .collect(),
                default_mapping,
            });
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    pub fn as_scalar(&self) -> Option<ScalarType> {
        match &self.kind {
            TargetKind::Scalar(ty) => Some(*ty),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, TargetKind::Map)
    }

    pub fn properties(&self) -> &[PropertyDef] {
        match &self.kind {
            TargetKind::Struct { properties, .. } => properties,
            _ => &[],
        }
    }

    pub fn constructors(&self) -> &[ConstructorDef] {
        match &self.kind {
            TargetKind::Struct { constructors, .. } => constructors,
            _ => &[],
        }
    }

    /// Declaring constructors opts a struct out of default construction
    /// unless one of them is zero-arg; map targets always construct empty.
    pub fn is_default_constructible(&self) -> bool {
        match &self.kind {
            TargetKind::Map => true,
            TargetKind::Struct { constructors, .. } => {
                constructors.is_empty() || constructors.iter().any(|ctor| ctor.args.is_empty())
            }
            TargetKind::Scalar(_) => false,
        }
    }

    /// Case-insensitive property lookup; with `underscore_to_camel` a column
    /// like `author_id` also finds `authorId`.
    pub fn find_property(&self, name: &str, underscore_to_camel: bool) -> Option<&PropertyDef> {
        match &self.kind {
            TargetKind::Struct { properties, .. } => {
                let wanted = normalize(name, underscore_to_camel);
                properties
                    .iter()
                    .find(|prop| normalize(&prop.name, underscore_to_camel) == wanted)
            }
            _ => None,
        }
    }

    pub fn property_type(&self, name: &str) -> Option<&PropertyType> {
        self.find_property(name, false).map(|prop| &prop.ty)
    }

    /// Finds a constructor whose argument names match the given set, in any
    /// declaration order. Used to order explicit constructor mappings.
    pub fn matching_constructor(&self, arg_names: &[&str]) -> Option<&ConstructorDef> {
        self.constructors().iter().find(|ctor| {
            ctor.args.len() == arg_names.len()
                && ctor
                    .args
                    .iter()
                    .all(|(name, _)| arg_names.iter().any(|n| *n == name.as_str()))
        })
    }
}

fn normalize(name: &str, strip_underscores: bool) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if strip_underscores && ch == '_' {
            continue;
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Registry of target type descriptors, keyed by name.
///
/// `default()` seeds the scalar primitives and a generic `map` target so
/// simple statements work without any registration.
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry {
            types: HashMap::new(),
        };
        for ty in [
            ScalarType::Bool,
            ScalarType::I64,
            ScalarType::F64,
            ScalarType::String,
            ScalarType::Bytes,
        ] {
            registry.register(TypeDescriptor::scalar(ty.name(), ty));
        }
        registry.register(TypeDescriptor::map("map"));
        registry
    }
}

impl TypeRegistry {
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(name)
            .ok_or_else(|| Error::schema_build(format!("unknown target type `{name}`")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}
