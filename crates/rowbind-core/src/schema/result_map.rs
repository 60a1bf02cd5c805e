use super::{Discriminator, PropertyMapping};
use crate::ty::{ConstructorDef, TypeRegistry};
use crate::{Error, Result};

use std::collections::HashSet;

/// Declarative description of how a row maps onto a target type, including
/// nested references to other result maps (self-reference allowed).
///
/// Built once at configuration time and immutable afterwards; the same map is
/// shared by every execution of the statements that name it.
#[derive(Debug, Clone)]
pub struct ResultMap {
    id: String,
    type_name: String,
    mappings: Vec<PropertyMapping>,
    id_mappings: Vec<PropertyMapping>,
    constructor_mappings: Vec<PropertyMapping>,
    property_mappings: Vec<PropertyMapping>,
    constructor: Option<ConstructorDef>,
    mapped_columns: HashSet<String>,
    mapped_properties: HashSet<String>,
    discriminator: Option<Discriminator>,
    auto_mapping: Option<bool>,
    has_nested_maps: bool,
    has_nested_queries: bool,
}

impl ResultMap {
    pub fn builder(id: impl Into<String>, type_name: impl Into<String>) -> ResultMapBuilder {
        ResultMapBuilder {
            id: id.into(),
            type_name: type_name.into(),
            mappings: Vec::new(),
            discriminator: None,
            auto_mapping: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn mappings(&self) -> &[PropertyMapping] {
        &self.mappings
    }

    /// Identity contributors: id-flagged mappings, or every mapping when none
    /// carry the flag.
    pub fn id_mappings(&self) -> &[PropertyMapping] {
        &self.id_mappings
    }

    pub fn constructor_mappings(&self) -> &[PropertyMapping] {
        &self.constructor_mappings
    }

    /// The constructor matched against the constructor mappings, when any.
    pub fn constructor(&self) -> Option<&ConstructorDef> {
        self.constructor.as_ref()
    }

    /// Non-constructor mappings, applied after instantiation.
    pub fn property_mappings(&self) -> &[PropertyMapping] {
        &self.property_mappings
    }

    /// Explicitly mapped column names, upper-cased.
    pub fn mapped_columns(&self) -> &HashSet<String> {
        &self.mapped_columns
    }

    pub fn mapped_properties(&self) -> &HashSet<String> {
        &self.mapped_properties
    }

    pub fn discriminator(&self) -> Option<&Discriminator> {
        self.discriminator.as_ref()
    }

    /// Tri-state: explicit override here, engine default otherwise.
    pub fn auto_mapping(&self) -> Option<bool> {
        self.auto_mapping
    }

    pub fn has_nested_maps(&self) -> bool {
        self.has_nested_maps
    }

    pub fn has_nested_queries(&self) -> bool {
        self.has_nested_queries
    }

    /// Result-map ids this map references through nested mappings or its
    /// discriminator cases.
    pub fn referenced_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .mappings
            .iter()
            .filter_map(|m| m.nested_map_id())
            .collect();
        if let Some(discriminator) = &self.discriminator {
            ids.extend(discriminator.case_ids());
        }
        ids
    }
}

pub struct ResultMapBuilder {
    id: String,
    type_name: String,
    mappings: Vec<PropertyMapping>,
    discriminator: Option<Discriminator>,
    auto_mapping: Option<bool>,
}

impl ResultMapBuilder {
    pub fn mapping(mut self, mapping: PropertyMapping) -> ResultMapBuilder {
        self.mappings.push(mapping);
        self
    }

    pub fn discriminator(mut self, discriminator: Discriminator) -> ResultMapBuilder {
        self.discriminator = Some(discriminator);
        self
    }

    pub fn auto_mapping(mut self, enabled: bool) -> ResultMapBuilder {
        self.auto_mapping = Some(enabled);
        self
    }

    /// Partitions the mappings, derives the nested flags and column sets, and
    /// orders constructor mappings to match a constructor declared on the
    /// target type.
    pub fn build(self, types: &TypeRegistry) -> Result<ResultMap> {
        if self.id.is_empty() {
            return Err(Error::schema_build("result maps must have an id"));
        }
        let descriptor = types.get(&self.type_name)?;

        let mut mapped_columns = HashSet::new();
        let mut mapped_properties = HashSet::new();
        let mut id_mappings = Vec::new();
        let mut constructor_mappings = Vec::new();
        let mut property_mappings = Vec::new();
        let mut has_nested_maps = false;
        let mut has_nested_queries = false;

        for mapping in &self.mappings {
            has_nested_queries |= mapping.nested_query_id().is_some();
            has_nested_maps |=
                mapping.nested_map_id().is_some() && mapping.result_set_name().is_none();

            if let Some(column) = mapping.column() {
                mapped_columns.insert(column.to_uppercase());
            } else if mapping.is_composite() {
                for (_, column) in mapping.composites() {
                    mapped_columns.insert(column.to_uppercase());
                }
            }
            if let Some(property) = mapping.property() {
                mapped_properties.insert(property.to_string());
            }

            if mapping.is_constructor_arg() {
                constructor_mappings.push(mapping.clone());
            } else {
                property_mappings.push(mapping.clone());
            }
            if mapping.is_id() {
                id_mappings.push(mapping.clone());
            }
        }

        if id_mappings.is_empty() {
            id_mappings = self.mappings.clone();
        }

        // Order explicit constructor mappings to match a declared constructor
        let mut constructor = None;
        if !constructor_mappings.is_empty() {
            let arg_names: Vec<&str> = constructor_mappings
                .iter()
                .filter_map(|m| m.property())
                .collect();
            if arg_names.len() != constructor_mappings.len() {
                return Err(Error::schema_build(format!(
                    "result map `{}` has a constructor mapping without an argument name",
                    self.id
                )));
            }
            let Some(ctor) = descriptor.matching_constructor(&arg_names) else {
                return Err(Error::schema_build(format!(
                    "result map `{}` has no constructor on `{}` matching args {:?}",
                    self.id, self.type_name, arg_names
                )));
            };
            constructor_mappings.sort_by_key(|m| {
                ctor.args
                    .iter()
                    .position(|(name, _)| Some(name.as_str()) == m.property())
                    .unwrap_or(usize::MAX)
            });
            constructor = Some(ctor.clone());
        }

        Ok(ResultMap {
            id: self.id,
            type_name: self.type_name,
            mappings: self.mappings,
            id_mappings,
            constructor_mappings,
            property_mappings,
            constructor,
            mapped_columns,
            mapped_properties,
            discriminator: self.discriminator,
            auto_mapping: self.auto_mapping,
            has_nested_maps,
            has_nested_queries,
        })
    }
}
