use super::{
    AutoMapEntry, CollectingHandler, MaterializationScope, PendingRelation, ResultContext,
    RowHandler, RowKey, RowReader,
};
use crate::engine::Engine;
use crate::row_bounds::RowBounds;
use crate::settings::AutoMapping;
use crate::statement::Statement;

use rowbind_core::driver::{StatementResults, SubQueryExecutor};
use rowbind_core::value::PendingLoad;
use rowbind_core::{
    Error, Object, PropertyMapping, Result, ResultMap, ScalarType, TypeDescriptor, Value,
};

use log::{debug, trace};

use std::collections::HashSet;
use std::rc::Rc;

/// Drives one statement's result sets through a forward-only cursor and
/// rebuilds the object graph the result maps describe.
///
/// Holds the per-execution [`MaterializationScope`]; a materializer is built
/// for one call and dropped with it.
pub(crate) struct Materializer<'a> {
    engine: &'a Engine,
    statement: &'a Statement,
    executor: Rc<dyn SubQueryExecutor>,
    bounds: RowBounds,
    scope: MaterializationScope,
    use_constructor_mappings: bool,
    previous_row: Option<Value>,
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        statement: &'a Statement,
        executor: Rc<dyn SubQueryExecutor>,
        bounds: RowBounds,
    ) -> Materializer<'a> {
        Materializer {
            engine,
            statement,
            executor,
            bounds,
            scope: MaterializationScope::new(),
            use_constructor_mappings: false,
            previous_row: None,
        }
    }

    /// Consumes every result set of the statement. Declared result maps map
    /// positionally; extra result sets are routed by name to the pending
    /// relations registered while mapping earlier sets. Returns one list per
    /// declared result map (empty when a custom handler consumed the rows).
    pub(crate) fn run(
        mut self,
        results: &mut dyn StatementResults,
        mut user_handler: Option<&mut dyn RowHandler>,
    ) -> Result<Vec<Value>> {
        let mut multiple = Vec::new();
        let map_ids = self.statement.result_map_ids();
        let mut result_set_count = 0usize;

        let mut cursor = results.next_cursor()?;
        if cursor.is_some() && map_ids.is_empty() {
            return Err(Error::mapping(format!(
                "statement `{}` returned results but declares no result maps",
                self.statement.id()
            )));
        }

        while let Some(boxed) = cursor {
            let mut reader = RowReader::new(boxed);
            if result_set_count < map_ids.len() {
                let map = self.lookup_map(&map_ids[result_set_count])?;
                debug!(
                    "handling result set {result_set_count} with result map `{}`",
                    map.id()
                );
                if map.has_nested_maps() {
                    self.ensure_no_row_bounds()?;
                    self.ensure_safe_row_handler(user_handler.is_some())?;
                }
                match user_handler.as_mut() {
                    Some(handler) => self.handle_rows(&mut reader, map, &mut **handler, None)?,
                    None => {
                        let mut collecting = CollectingHandler::default();
                        self.handle_rows(&mut reader, map, &mut collecting, None)?;
                        multiple.push(Value::List(collecting.results));
                    }
                }
            } else if let Some(name) = self.statement.result_sets().get(result_set_count) {
                if let Some(parent_mapping) = self.scope.next_result_maps.get(name).cloned() {
                    let nested_id = parent_mapping.nested_map_id().ok_or_else(|| {
                        Error::mapping(format!(
                            "result set `{name}` mapping declares no nested result map"
                        ))
                    })?;
                    let map = self.lookup_map(nested_id)?;
                    debug!("handling foreign result set `{name}` with result map `{nested_id}`");
                    let mut sink = CollectingHandler::default();
                    self.handle_rows(&mut reader, map, &mut sink, Some(&parent_mapping))?;
                }
            } else {
                reader.close();
                break;
            }
            reader.close();
            self.scope.clear_between_result_sets();
            result_set_count += 1;
            cursor = results.next_cursor()?;
        }

        Ok(multiple)
    }

    fn handle_rows(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        handler: &mut dyn RowHandler,
        parent_mapping: Option<&PropertyMapping>,
    ) -> Result<()> {
        if map.has_nested_maps() {
            self.handle_rows_nested(reader, map, handler, parent_mapping)
        } else {
            self.handle_rows_simple(reader, map, handler, parent_mapping)
        }
    }

    //
    // Rows without nested result maps
    //

    fn handle_rows_simple(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        handler: &mut dyn RowHandler,
        parent_mapping: Option<&PropertyMapping>,
    ) -> Result<()> {
        let bounds = self.effective_bounds(parent_mapping);
        let mut ctx = ResultContext::new();
        skip_rows(reader, &bounds)?;
        while should_process(&ctx, &bounds) && reader.advance()? {
            let resolved = self.resolve_discriminated(reader, map, "")?;
            let value = self.row_value_simple(reader, resolved, "")?;
            self.store(handler, &mut ctx, value, parent_mapping, reader)?;
        }
        Ok(())
    }

    fn row_value_simple(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        prefix: &str,
    ) -> Result<Value> {
        let mut value = self.create_result_object(reader, map, prefix)?;
        if let Value::Object(obj) = value.clone() {
            let mut found = self.use_constructor_mappings;
            if self.should_auto_map(map, false) {
                found |= self.apply_auto_mappings(reader, map, &obj, prefix)?;
            }
            found |= self.apply_property_mappings(reader, map, &obj, prefix)?;
            found |= obj.pending_count() > 0;
            if !found && !self.engine.settings().return_instance_for_empty_row {
                value = Value::Null;
            }
        }
        Ok(value)
    }

    //
    // Rows with nested result maps
    //

    fn handle_rows_nested(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        handler: &mut dyn RowHandler,
        parent_mapping: Option<&PropertyMapping>,
    ) -> Result<()> {
        let bounds = self.effective_bounds(parent_mapping);
        let mut ctx = ResultContext::new();
        skip_rows(reader, &bounds)?;
        let mut row_value = self.previous_row.take();

        while should_process(&ctx, &bounds) && reader.advance()? {
            let resolved = self.resolve_discriminated(reader, map, "")?;
            let key = self.create_row_key(resolved, reader, "")?;
            let partial = if key.is_null() {
                None
            } else {
                self.scope.nested_results.get(&key).cloned()
            };

            if self.statement.result_ordered() {
                // Ordered rows let each finished parent flush immediately,
                // keeping the dedup map to the current group.
                if partial.is_none() {
                    if let Some(finished) = row_value.take() {
                        self.scope.nested_results.clear();
                        self.store(handler, &mut ctx, finished, parent_mapping, reader)?;
                    }
                }
                row_value = Some(self.row_value_nested(reader, resolved, &key, "", partial)?);
            } else {
                let value = self.row_value_nested(reader, resolved, &key, "", partial.clone())?;
                if partial.is_none() {
                    self.store(handler, &mut ctx, value.clone(), parent_mapping, reader)?;
                }
                row_value = Some(value);
            }
        }

        if let Some(value) = row_value {
            if self.statement.result_ordered() && should_process(&ctx, &bounds) {
                self.store(handler, &mut ctx, value, parent_mapping, reader)?;
                self.previous_row = None;
            } else {
                self.previous_row = Some(value);
            }
        }
        Ok(())
    }

    fn row_value_nested(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        combined_key: &RowKey,
        prefix: &str,
        partial: Option<Value>,
    ) -> Result<Value> {
        if let Some(value) = partial {
            // Already materialized by an earlier row: only absorb additional
            // nested rows, never re-run property population.
            if let Value::Object(obj) = value.clone() {
                self.scope.ancestors.insert(map.id().to_string(), value.clone());
                self.apply_nested_mappings(reader, map, &obj, prefix, combined_key, false)?;
                self.scope.ancestors.remove(map.id());
            }
            return Ok(value);
        }

        let mut value = self.create_result_object(reader, map, prefix)?;
        if let Value::Object(obj) = value.clone() {
            let mut found = self.use_constructor_mappings;
            if self.should_auto_map(map, true) {
                found |= self.apply_auto_mappings(reader, map, &obj, prefix)?;
            }
            found |= self.apply_property_mappings(reader, map, &obj, prefix)?;

            self.scope.ancestors.insert(map.id().to_string(), value.clone());
            found |= self.apply_nested_mappings(reader, map, &obj, prefix, combined_key, true)?;
            self.scope.ancestors.remove(map.id());

            found |= obj.pending_count() > 0;
            if !found && !self.engine.settings().return_instance_for_empty_row {
                value = Value::Null;
            }
        }
        if !combined_key.is_null() {
            self.scope
                .nested_results
                .insert(combined_key.clone(), value.clone());
        }
        Ok(value)
    }

    fn apply_nested_mappings(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        parent: &Object,
        parent_prefix: &str,
        parent_key: &RowKey,
        new_object: bool,
    ) -> Result<bool> {
        let mut found = false;
        for mapping in map.property_mappings() {
            let Some(nested_id) = mapping.nested_map_id() else {
                continue;
            };
            if mapping.result_set_name().is_some() {
                continue;
            }

            let prefix = concat_prefix(parent_prefix, mapping.get_column_prefix());
            let nested = self.lookup_map(nested_id)?;
            let nested = self.resolve_discriminated(reader, nested, &prefix)?;

            // An ancestor of the same map already under construction is
            // linked directly instead of recursing; cyclic schemas terminate
            // here. Only without a column prefix, which would retarget the
            // nested columns.
            if mapping.get_column_prefix().is_none() {
                if let Some(ancestor) = self.scope.ancestors.get(nested.id()).cloned() {
                    if new_object {
                        self.link_objects(parent, mapping, ancestor)?;
                    }
                    continue;
                }
            }

            let row_key = self.create_row_key(nested, reader, &prefix)?;
            let combined = RowKey::combine(&row_key, parent_key);
            let known = if combined.is_null() {
                None
            } else {
                self.scope.nested_results.get(&combined).cloned()
            };

            self.instantiate_collection_property(parent, mapping)?;
            if self.any_not_null_column_has_value(reader, mapping, &prefix)? {
                let value =
                    self.row_value_nested(reader, nested, &combined, &prefix, known.clone())?;
                if !value.is_null() && known.is_none() {
                    self.link_objects(parent, mapping, value)?;
                    found = true;
                }
            }
        }
        Ok(found)
    }

    //
    // Instantiation
    //

    fn create_result_object(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        prefix: &str,
    ) -> Result<Value> {
        self.use_constructor_mappings = false;
        let descriptor = self.lookup_type(map.type_name())?;

        if let Some(scalar) = descriptor.as_scalar() {
            return self.create_scalar_result(reader, map, scalar, prefix);
        }
        if !map.constructor_mappings().is_empty() {
            let value = self.create_parameterized_result(reader, map, descriptor, prefix)?;
            self.use_constructor_mappings = !value.is_null();
            return Ok(value);
        }
        if descriptor.is_default_constructible() {
            return self.engine.factory().create(descriptor);
        }
        if self.should_auto_map(map, false) {
            return self.create_by_constructor_signature(reader, descriptor);
        }
        Err(Error::mapping(format!(
            "do not know how to create an instance of `{}`",
            map.type_name()
        )))
    }

    /// Single-column shortcut: the "object" is the converted scalar itself.
    fn create_scalar_result(
        &mut self,
        reader: &mut RowReader,
        map: &ResultMap,
        target: ScalarType,
        prefix: &str,
    ) -> Result<Value> {
        let column = match map.mappings().first().and_then(|m| m.column()) {
            Some(column) => prepend_prefix(Some(column), prefix).unwrap(),
            None => reader.label(0).to_string(),
        };
        reader.read(&column, self.engine.handlers(), Some(target))
    }

    fn create_parameterized_result(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        descriptor: &TypeDescriptor,
        prefix: &str,
    ) -> Result<Value> {
        let constructor = map.constructor().ok_or_else(|| {
            Error::mapping(format!(
                "result map `{}` has constructor mappings but no matched constructor",
                map.id()
            ))
        })?;

        let mut args = Vec::new();
        let mut found = false;
        for (position, mapping) in map.constructor_mappings().iter().enumerate() {
            let value = if let Some(query_id) = mapping.nested_query_id() {
                self.nested_query_constructor_value(reader, mapping, query_id, prefix)?
            } else if let Some(nested_id) = mapping.nested_map_id() {
                let nested = self.lookup_map(nested_id)?;
                let nested_prefix = concat_prefix(prefix, mapping.get_column_prefix());
                self.row_value_simple(reader, nested, &nested_prefix)?
            } else {
                let column = prepend_prefix(mapping.column(), prefix).ok_or_else(|| {
                    Error::mapping(format!(
                        "constructor mapping `{:?}` of result map `{}` names no column",
                        mapping.property(),
                        map.id()
                    ))
                })?;
                let target = mapping
                    .declared_ty()
                    .or_else(|| constructor.args.get(position).map(|(_, ty)| *ty));
                reader.read(&column, self.engine.handlers(), target)?
            };
            found |= !value.is_null();
            args.push(value);
        }

        if found {
            self.engine
                .factory()
                .create_with_args(descriptor, constructor, args)
        } else {
            Ok(Value::Null)
        }
    }

    /// No explicit mappings and no default constructor: pick a declared
    /// constructor whose parameters are all convertible from the returned
    /// columns, preferring the one marked as the default mapping.
    fn create_by_constructor_signature(
        &mut self,
        reader: &mut RowReader,
        descriptor: &TypeDescriptor,
    ) -> Result<Value> {
        let constructors = descriptor.constructors();
        let preferred = if constructors.len() == 1 {
            constructors.first()
        } else {
            constructors.iter().find(|ctor| ctor.default_mapping)
        };
        let chosen = preferred.or_else(|| {
            constructors
                .iter()
                .find(|ctor| self.constructor_accepts_columns(ctor, reader))
        });
        let Some(constructor) = chosen else {
            return Err(Error::mapping(format!(
                "no constructor found in `{}` matching columns {:?}",
                descriptor.name(),
                reader.labels()
            )));
        };

        let mut args = Vec::new();
        let mut found = false;
        for (index, (_, target)) in constructor.args.iter().enumerate() {
            let value = reader.read_at(index, self.engine.handlers(), *target)?;
            found |= !value.is_null();
            args.push(value);
        }
        self.use_constructor_mappings = found;
        if found {
            self.engine
                .factory()
                .create_with_args(descriptor, constructor, args)
        } else {
            Ok(Value::Null)
        }
    }

    fn constructor_accepts_columns(
        &self,
        constructor: &rowbind_core::ConstructorDef,
        reader: &RowReader,
    ) -> bool {
        constructor.args.len() == reader.column_count()
            && constructor
                .args
                .iter()
                .enumerate()
                .all(|(index, (_, target))| target.convertible_from(reader.declared_type(index)))
    }

    //
    // Property population
    //

    fn should_auto_map(&self, map: &ResultMap, is_nested: bool) -> bool {
        if let Some(enabled) = map.auto_mapping() {
            return enabled;
        }
        match self.engine.settings().auto_mapping {
            AutoMapping::None => false,
            AutoMapping::Partial => !is_nested,
            AutoMapping::Full => true,
        }
    }

    fn apply_auto_mappings(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        obj: &Object,
        prefix: &str,
    ) -> Result<bool> {
        let plan = self.auto_mapping_plan(reader, map, prefix)?;
        let mut found = false;
        for entry in &plan {
            let value = reader.read(&entry.column, self.engine.handlers(), Some(entry.target))?;
            if !value.is_null() {
                found = true;
            }
            if !value.is_null() || self.engine.settings().call_setters_on_nulls {
                obj.set(&entry.property, value);
            }
        }
        Ok(found)
    }

    fn auto_mapping_plan(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        prefix: &str,
    ) -> Result<Vec<AutoMapEntry>> {
        let cache_key = format!("{}:{}", map.id(), prefix);
        if let Some(plan) = self.scope.auto_mappings.get(&cache_key) {
            return Ok(plan.clone());
        }

        let descriptor = self.lookup_type(map.type_name())?;
        let settings = self.engine.settings();
        let upper_prefix = prefix.to_uppercase();
        let mut plan = Vec::new();

        for column in reader.unmapped_columns(map, prefix) {
            let property_name = if upper_prefix.is_empty() {
                column.clone()
            } else if column.to_uppercase().starts_with(&upper_prefix) {
                column[upper_prefix.len()..].to_string()
            } else {
                // with a prefix configured, columns outside it are ignored
                continue;
            };

            if descriptor.is_map() {
                plan.push(AutoMapEntry {
                    column,
                    property: property_name,
                    target: ScalarType::Unknown,
                });
                continue;
            }

            let Some(property) =
                descriptor.find_property(&property_name, settings.map_underscore_to_camel_case)
            else {
                continue;
            };
            if !property.settable || map.mapped_properties().contains(&property.name) {
                continue;
            }
            // only scalar-typed properties are auto-mappable
            let Some(target) = property.ty.as_scalar() else {
                continue;
            };
            plan.push(AutoMapEntry {
                column,
                property: property.name.clone(),
                target,
            });
        }

        self.scope.auto_mappings.insert(cache_key, plan.clone());
        Ok(plan)
    }

    fn apply_property_mappings(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        obj: &Object,
        prefix: &str,
    ) -> Result<bool> {
        let mapped = reader.mapped_columns(map, prefix);
        let mut found = false;

        for mapping in map.property_mappings() {
            let mut column = prepend_prefix(mapping.column(), prefix);
            if mapping.nested_map_id().is_some() {
                // a column attribute on a nested result map mapping is noise
                column = None;
            }
            let column_is_mapped = column
                .as_ref()
                .map(|c| mapped.contains(&c.to_uppercase()))
                .unwrap_or(false);

            if mapping.is_composite() || column_is_mapped || mapping.result_set_name().is_some() {
                let value = self.property_mapping_value(reader, map, obj, mapping, prefix)?;
                let Some(property) = mapping.property() else {
                    continue;
                };
                if value.is_deferred() {
                    found = true;
                    continue;
                }
                if !value.is_null() {
                    found = true;
                }
                if !value.is_null() || self.engine.settings().call_setters_on_nulls {
                    obj.set(property, value);
                }
            }
        }
        Ok(found)
    }

    fn property_mapping_value(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        obj: &Object,
        mapping: &PropertyMapping,
        prefix: &str,
    ) -> Result<Value> {
        if let Some(query_id) = mapping.nested_query_id() {
            self.nested_query_mapping_value(reader, obj, mapping, query_id, prefix)
        } else if mapping.result_set_name().is_some() {
            self.add_pending_child_relation(reader, obj, mapping)?;
            Ok(Value::Deferred)
        } else {
            let column = prepend_prefix(mapping.column(), prefix).unwrap_or_default();
            let target = mapping.declared_ty().or_else(|| {
                let descriptor = self.lookup_type(map.type_name()).ok()?;
                mapping
                    .property()
                    .and_then(|p| descriptor.property_type(p))
                    .and_then(|ty| ty.as_scalar())
            });
            reader.read(&column, self.engine.handlers(), target)
        }
    }

    //
    // Nested sub-queries
    //

    fn nested_query_constructor_value(
        &mut self,
        reader: &mut RowReader,
        mapping: &PropertyMapping,
        query_id: &str,
        prefix: &str,
    ) -> Result<Value> {
        // constructor arguments cannot defer; run synchronously
        let param = self.nested_query_param(reader, mapping, prefix)?;
        if param.is_null() {
            return Ok(Value::Null);
        }
        self.executor.execute(query_id, &param)
    }

    fn nested_query_mapping_value(
        &mut self,
        reader: &mut RowReader,
        obj: &Object,
        mapping: &PropertyMapping,
        query_id: &str,
        prefix: &str,
    ) -> Result<Value> {
        let Some(property) = mapping.property() else {
            return Ok(Value::Null);
        };
        let param = self.nested_query_param(reader, mapping, prefix)?;
        if param.is_null() {
            // a null key means no sub-query; the property stays unset
            return Ok(Value::Null);
        }

        if self.executor.is_cached(query_id, &param) || mapping.is_lazy() {
            trace!("deferring sub-query `{query_id}` for property `{property}`");
            obj.defer(
                property,
                PendingLoad {
                    statement_id: query_id.to_string(),
                    param,
                    executor: Rc::clone(&self.executor),
                },
            );
            Ok(Value::Deferred)
        } else {
            self.executor.execute(query_id, &param)
        }
    }

    /// Resolves the sub-query parameter from the owning row: the single key
    /// column, or a composite object when several columns feed it. All-null
    /// keys resolve to null and suppress the sub-query.
    fn nested_query_param(
        &mut self,
        reader: &mut RowReader,
        mapping: &PropertyMapping,
        prefix: &str,
    ) -> Result<Value> {
        if mapping.is_composite() {
            let param = Object::new("map");
            let mut found = false;
            for (property, column) in mapping.composites() {
                let column = prepend_prefix(Some(column), prefix).unwrap();
                let value = reader.read(&column, self.engine.handlers(), None)?;
                if !value.is_null() {
                    param.set(property, value);
                    found = true;
                }
            }
            Ok(if found { param.into() } else { Value::Null })
        } else {
            let column = prepend_prefix(mapping.column(), prefix).unwrap_or_default();
            reader.read(&column, self.engine.handlers(), mapping.declared_ty())
        }
    }

    //
    // Multiple result sets
    //

    fn add_pending_child_relation(
        &mut self,
        reader: &mut RowReader,
        obj: &Object,
        mapping: &PropertyMapping,
    ) -> Result<()> {
        let key = self.correlation_key(reader, mapping, false)?;
        self.scope
            .pending_relations
            .entry(key)
            .or_default()
            .push(PendingRelation {
                owner: obj.clone(),
                mapping: mapping.clone(),
            });

        let name = mapping.result_set_name().unwrap_or_default().to_string();
        match self.scope.next_result_maps.get(&name) {
            Some(previous) if previous != mapping => Err(Error::schema_build(format!(
                "two different properties are mapped to result set `{name}`"
            ))),
            Some(_) => Ok(()),
            None => {
                self.scope.next_result_maps.insert(name, mapping.clone());
                Ok(())
            }
        }
    }

    fn link_to_parents(
        &mut self,
        reader: &mut RowReader,
        parent_mapping: &PropertyMapping,
        value: Value,
    ) -> Result<()> {
        let key = self.correlation_key(reader, parent_mapping, true)?;
        let Some(relations) = self.scope.pending_relations.get(&key).cloned() else {
            return Ok(());
        };
        for relation in relations {
            if !value.is_null() {
                self.link_objects(&relation.owner, &relation.mapping, value.clone())?;
            }
        }
        Ok(())
    }

    /// Correlation key of the current row for a foreign-result-set mapping.
    /// The owning row reads its own columns; the foreign row reads the
    /// foreign columns, labeled with the owning ones so the keys align.
    fn correlation_key(
        &mut self,
        reader: &mut RowReader,
        mapping: &PropertyMapping,
        foreign: bool,
    ) -> Result<RowKey> {
        let mut key = RowKey::seeded(&format!(
            "{}#{}",
            mapping.result_set_name().unwrap_or_default(),
            mapping.property().unwrap_or_default()
        ));
        for (column, foreign_column) in mapping.foreign_columns() {
            let read_from = if foreign { foreign_column } else { column };
            if let Some(value) = reader.get_string(read_from)? {
                key.push(column, Some(value));
            }
        }
        Ok(key)
    }

    //
    // Linking
    //

    /// Appends to a collection property, assigns otherwise. The collection
    /// verdict comes from the mapping's flag, the property's current value,
    /// or the owner type's declared property type.
    fn link_objects(
        &mut self,
        parent: &Object,
        mapping: &PropertyMapping,
        value: Value,
    ) -> Result<()> {
        let property = mapping.property().ok_or_else(|| {
            Error::mapping("nested mapping with no target property cannot be linked".to_string())
        })?;
        if self.is_collection_property(parent, mapping, property) {
            parent.push(property, value)
        } else {
            parent.set(property, value);
            Ok(())
        }
    }

    fn instantiate_collection_property(
        &mut self,
        parent: &Object,
        mapping: &PropertyMapping,
    ) -> Result<()> {
        let Some(property) = mapping.property() else {
            return Ok(());
        };
        if parent.peek(property).is_null()
            && self.is_collection_property(parent, mapping, property)
        {
            parent.set(property, self.engine.factory().create_collection());
        }
        Ok(())
    }

    fn is_collection_property(
        &self,
        parent: &Object,
        mapping: &PropertyMapping,
        property: &str,
    ) -> bool {
        if mapping.is_collection() || parent.peek(property).is_list() {
            return true;
        }
        self.engine
            .types()
            .get(&parent.type_name())
            .ok()
            .and_then(|descriptor| descriptor.property_type(property))
            .map(|ty| ty.is_collection())
            .unwrap_or(false)
    }

    //
    // Discrimination
    //

    fn resolve_discriminated(
        &mut self,
        reader: &mut RowReader,
        map: &'a ResultMap,
        prefix: &str,
    ) -> Result<&'a ResultMap> {
        let mut current = map;
        let mut past: HashSet<String> = HashSet::new();

        while let Some(discriminator) = current.discriminator() {
            let column = prepend_prefix(Some(discriminator.column()), prefix).unwrap();
            let target = match discriminator.declared_ty() {
                ScalarType::Unknown => None,
                ty => Some(ty),
            };
            let value = reader.read(&column, self.engine.handlers(), target)?;
            let text = value.to_sql_text();

            let Some(id) = discriminator.resolve(&text) else {
                break;
            };
            if !self.engine.schemas().contains(id) {
                // unknown id: fall back to the last valid map
                break;
            }
            let id = id.to_string();
            current = self.lookup_map(&id)?;
            trace!("discriminator column `{column}` = `{text}` resolved to `{id}`");
            if !past.insert(id) {
                break;
            }
        }
        Ok(current)
    }

    //
    // Row identity
    //

    fn create_row_key(
        &mut self,
        map: &'a ResultMap,
        reader: &mut RowReader,
        prefix: &str,
    ) -> Result<RowKey> {
        let mut key = RowKey::seeded(map.id());

        if map.id_mappings().is_empty() {
            let descriptor = self.lookup_type(map.type_name())?;
            if descriptor.is_map() {
                self.row_key_for_map(reader, &mut key)?;
            } else {
                self.row_key_for_unmapped(map, reader, &mut key, prefix)?;
            }
        } else {
            let mappings = map.id_mappings().to_vec();
            self.row_key_for_mapped(map, reader, &mut key, &mappings, prefix)?;
        }

        if key.contributions() < 1 {
            return Ok(RowKey::null());
        }
        Ok(key)
    }

    fn row_key_for_mapped(
        &mut self,
        map: &'a ResultMap,
        reader: &mut RowReader,
        key: &mut RowKey,
        mappings: &[PropertyMapping],
        prefix: &str,
    ) -> Result<()> {
        for mapping in mappings {
            if mapping.nested_map_id().is_some() && mapping.result_set_name().is_none() {
                // identity of a nested row folds in its constructor columns
                let nested = self.lookup_map(mapping.nested_map_id().unwrap())?;
                let nested_prefix = concat_prefix(prefix, mapping.get_column_prefix());
                let nested_mappings = nested.constructor_mappings().to_vec();
                self.row_key_for_mapped(nested, reader, key, &nested_mappings, &nested_prefix)?;
            } else if mapping.nested_query_id().is_none() {
                let Some(column) = prepend_prefix(mapping.column(), prefix) else {
                    continue;
                };
                let mapped = reader.mapped_columns(map, prefix);
                if mapped.contains(&column.to_uppercase()) {
                    let value = reader.get_string(&column)?;
                    if value.is_some() || self.engine.settings().return_instance_for_empty_row {
                        key.push(&column.to_uppercase(), value);
                    }
                }
            }
        }
        Ok(())
    }

    fn row_key_for_unmapped(
        &mut self,
        map: &'a ResultMap,
        reader: &mut RowReader,
        key: &mut RowKey,
        prefix: &str,
    ) -> Result<()> {
        let descriptor = self.lookup_type(map.type_name())?;
        let settings = self.engine.settings();
        let upper_prefix = prefix.to_uppercase();

        for column in reader.unmapped_columns(map, prefix) {
            let property_name = if upper_prefix.is_empty() {
                column.clone()
            } else if column.to_uppercase().starts_with(&upper_prefix) {
                column[upper_prefix.len()..].to_string()
            } else {
                continue;
            };
            if descriptor
                .find_property(&property_name, settings.map_underscore_to_camel_case)
                .is_some()
            {
                if let Some(value) = reader.get_string(&column)? {
                    key.push(&column.to_uppercase(), Some(value));
                }
            }
        }
        Ok(())
    }

    fn row_key_for_map(&mut self, reader: &mut RowReader, key: &mut RowKey) -> Result<()> {
        for column in reader.labels().to_vec() {
            if let Some(value) = reader.get_string(&column)? {
                key.push(&column.to_uppercase(), Some(value));
            }
        }
        Ok(())
    }

    //
    // Guards and plumbing
    //

    fn any_not_null_column_has_value(
        &self,
        reader: &RowReader,
        mapping: &PropertyMapping,
        prefix: &str,
    ) -> Result<bool> {
        let not_null = mapping.get_not_null_columns();
        if !not_null.is_empty() {
            for column in not_null {
                let column = prepend_prefix(Some(column), prefix).unwrap();
                if !reader.raw(&column)?.is_null() {
                    return Ok(true);
                }
            }
            return Ok(false);
        }
        if !prefix.is_empty() {
            let upper = prefix.to_uppercase();
            return Ok(reader
                .labels_upper()
                .iter()
                .any(|label| label.starts_with(&upper)));
        }
        Ok(true)
    }

    fn ensure_no_row_bounds(&self) -> Result<()> {
        if self.engine.settings().safe_row_bounds && !self.bounds.is_default() {
            return Err(Error::mapping(
                "statements with nested result mappings cannot be safely constrained by row \
                 bounds; disable safe_row_bounds to bypass"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn ensure_safe_row_handler(&self, custom_handler: bool) -> Result<()> {
        if custom_handler
            && self.engine.settings().safe_row_handler
            && !self.statement.result_ordered()
        {
            return Err(Error::mapping(
                "statements with nested result mappings cannot be safely used with a custom row \
                 handler; declare the statement result-ordered or disable safe_row_handler"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn effective_bounds(&self, parent_mapping: Option<&PropertyMapping>) -> RowBounds {
        if parent_mapping.is_some() {
            RowBounds::DEFAULT
        } else {
            self.bounds
        }
    }

    fn store(
        &mut self,
        handler: &mut dyn RowHandler,
        ctx: &mut ResultContext,
        value: Value,
        parent_mapping: Option<&PropertyMapping>,
        reader: &mut RowReader,
    ) -> Result<()> {
        match parent_mapping {
            Some(mapping) => self.link_to_parents(reader, mapping, value),
            None => {
                ctx.next(value);
                handler.handle(ctx)
            }
        }
    }

    fn lookup_map(&self, id: &str) -> Result<&'a ResultMap> {
        let engine: &'a Engine = self.engine;
        engine.schemas().get(id)
    }

    fn lookup_type(&self, name: &str) -> Result<&'a TypeDescriptor> {
        let engine: &'a Engine = self.engine;
        engine.types().get(name)
    }
}

fn should_process(ctx: &ResultContext, bounds: &RowBounds) -> bool {
    !ctx.is_stopped() && ctx.count() < bounds.limit
}

fn skip_rows(reader: &mut RowReader, bounds: &RowBounds) -> Result<()> {
    for _ in 0..bounds.offset {
        if !reader.advance()? {
            break;
        }
    }
    Ok(())
}

fn prepend_prefix(column: Option<&str>, prefix: &str) -> Option<String> {
    let column = column?;
    if column.is_empty() {
        return None;
    }
    if prefix.is_empty() {
        Some(column.to_string())
    } else {
        Some(format!("{prefix}{column}"))
    }
}

fn concat_prefix(parent: &str, own: Option<&str>) -> String {
    format!("{parent}{}", own.unwrap_or_default()).to_uppercase()
}
