use crate::ty::ScalarType;

/// One column-to-property rule inside a [`super::ResultMap`].
///
/// Exactly one of the shapes is typically populated: a plain column, a
/// composite column list (sub-query parameter assembly), a nested result map,
/// a nested sub-query, or a foreign result-set reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMapping {
    property: Option<String>,
    column: Option<String>,
    composites: Vec<(String, String)>,
    ty: Option<ScalarType>,
    nested_map: Option<String>,
    nested_query: Option<String>,
    lazy: bool,
    result_set: Option<String>,
    foreign_columns: Vec<(String, String)>,
    not_null_columns: Vec<String>,
    column_prefix: Option<String>,
    collection: bool,
    id_flag: bool,
    constructor_flag: bool,
}

impl PropertyMapping {
    pub fn new(property: impl Into<String>, column: impl Into<String>) -> PropertyMapping {
        let column = column.into();
        PropertyMapping {
            property: Some(property.into()),
            column: (!column.is_empty()).then_some(column),
            ..PropertyMapping::empty()
        }
    }

    /// Mapping with no target property: contributes to identity/ordering only.
    pub fn column_only(column: impl Into<String>) -> PropertyMapping {
        PropertyMapping {
            column: Some(column.into()),
            ..PropertyMapping::empty()
        }
    }

    fn empty() -> PropertyMapping {
        PropertyMapping {
            property: None,
            column: None,
            composites: Vec::new(),
            ty: None,
            nested_map: None,
            nested_query: None,
            lazy: false,
            result_set: None,
            foreign_columns: Vec::new(),
            not_null_columns: Vec::new(),
            column_prefix: None,
            collection: false,
            id_flag: false,
            constructor_flag: false,
        }
    }

    pub fn id(mut self) -> PropertyMapping {
        self.id_flag = true;
        self
    }

    pub fn constructor(mut self) -> PropertyMapping {
        self.constructor_flag = true;
        self
    }

    pub fn ty(mut self, ty: ScalarType) -> PropertyMapping {
        self.ty = Some(ty);
        self
    }

    /// Composite `(property, column)` pairs assembling a sub-query parameter
    /// object from several columns of the owning row.
    pub fn composite(mut self, pairs: &[(&str, &str)]) -> PropertyMapping {
        self.composites = pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect();
        self
    }

    pub fn nested_map(mut self, result_map: impl Into<String>) -> PropertyMapping {
        self.nested_map = Some(result_map.into());
        self
    }

    pub fn nested_query(mut self, statement: impl Into<String>) -> PropertyMapping {
        self.nested_query = Some(statement.into());
        self
    }

    pub fn lazy(mut self) -> PropertyMapping {
        self.lazy = true;
        self
    }

    /// Ties the property to a named foreign result set of the same statement;
    /// `pairs` are `(column, foreign_column)` correlation pairs.
    pub fn result_set(
        mut self,
        name: impl Into<String>,
        pairs: &[(&str, &str)],
    ) -> PropertyMapping {
        self.result_set = Some(name.into());
        self.foreign_columns = pairs
            .iter()
            .map(|(c, f)| (c.to_string(), f.to_string()))
            .collect();
        self
    }

    pub fn not_null_columns(mut self, columns: &[&str]) -> PropertyMapping {
        self.not_null_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn column_prefix(mut self, prefix: impl Into<String>) -> PropertyMapping {
        self.column_prefix = Some(prefix.into());
        self
    }

    /// Marks the property as a one-to-many collection. Also inferred from the
    /// target type descriptor when one declares the property as a list.
    pub fn collection(mut self) -> PropertyMapping {
        self.collection = true;
        self
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn composites(&self) -> &[(String, String)] {
        &self.composites
    }

    pub fn is_composite(&self) -> bool {
        !self.composites.is_empty()
    }

    pub fn declared_ty(&self) -> Option<ScalarType> {
        self.ty
    }

    pub fn nested_map_id(&self) -> Option<&str> {
        self.nested_map.as_deref()
    }

    pub fn nested_query_id(&self) -> Option<&str> {
        self.nested_query.as_deref()
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn result_set_name(&self) -> Option<&str> {
        self.result_set.as_deref()
    }

    pub fn foreign_columns(&self) -> &[(String, String)] {
        &self.foreign_columns
    }

    pub fn get_not_null_columns(&self) -> &[String] {
        &self.not_null_columns
    }

    pub fn get_column_prefix(&self) -> Option<&str> {
        self.column_prefix.as_deref()
    }

    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn is_id(&self) -> bool {
        self.id_flag
    }

    pub fn is_constructor_arg(&self) -> bool {
        self.constructor_flag
    }
}
