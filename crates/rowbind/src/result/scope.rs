use super::RowKey;

use rowbind_core::{Object, PropertyMapping, ScalarType, Value};

use std::collections::HashMap;

/// A link waiting for a row of a not-yet-processed foreign result set.
#[derive(Clone)]
pub(crate) struct PendingRelation {
    pub(crate) owner: Object,
    pub(crate) mapping: PropertyMapping,
}

/// One planned auto-mapping: which column feeds which settable property.
#[derive(Clone)]
pub(crate) struct AutoMapEntry {
    pub(crate) column: String,
    pub(crate) property: String,
    pub(crate) target: ScalarType,
}

/// Per-statement-execution state, created when result handling starts and
/// discarded at the end. Never shared between executions or threads; the
/// caches the original kept on a long-lived handler live here instead.
#[derive(Default)]
pub(crate) struct MaterializationScope {
    /// Row-identity dedup map for nested materialization.
    pub(crate) nested_results: HashMap<RowKey, Value>,

    /// Objects currently under construction, by result-map id. Linking an
    /// ancestor instead of recursing is what terminates cyclic schemas.
    pub(crate) ancestors: HashMap<String, Value>,

    /// Relations awaiting a named foreign result set, by correlation key.
    pub(crate) pending_relations: HashMap<RowKey, Vec<PendingRelation>>,

    /// Which property mapping claims each named result set. A second,
    /// different claim is a configuration error.
    pub(crate) next_result_maps: HashMap<String, PropertyMapping>,

    /// Auto-mapping plans, by "map-id:prefix".
    pub(crate) auto_mappings: HashMap<String, Vec<AutoMapEntry>>,
}

impl MaterializationScope {
    pub(crate) fn new() -> MaterializationScope {
        MaterializationScope::default()
    }

    /// Identities are meaningless across independent result sets; pending
    /// relations stay alive until every result set is consumed.
    pub(crate) fn clear_between_result_sets(&mut self) {
        self.nested_results.clear();
    }
}
