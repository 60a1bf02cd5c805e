use crate::ty::ScalarType;

use indexmap::IndexMap;

/// Per-row polymorphic schema selector: reads one column and maps its
/// stringified value to a result map id. Chained resolution (the selected map
/// may carry its own discriminator) is driven by the materializer.
#[derive(Debug, Clone)]
pub struct Discriminator {
    column: String,
    ty: ScalarType,
    cases: IndexMap<String, String>,
}

impl Discriminator {
    pub fn new(column: impl Into<String>) -> Discriminator {
        Discriminator {
            column: column.into(),
            ty: ScalarType::Unknown,
            cases: IndexMap::new(),
        }
    }

    pub fn ty(mut self, ty: ScalarType) -> Discriminator {
        self.ty = ty;
        self
    }

    pub fn case(mut self, value: impl Into<String>, result_map: impl Into<String>) -> Discriminator {
        self.cases.insert(value.into(), result_map.into());
        self
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn declared_ty(&self) -> ScalarType {
        self.ty
    }

    /// Unmapped values return `None`; the caller falls back to the base map.
    pub fn resolve(&self, value: &str) -> Option<&str> {
        self.cases.get(value).map(String::as_str)
    }

    pub fn case_ids(&self) -> impl Iterator<Item = &str> {
        self.cases.values().map(String::as_str)
    }
}
