use rowbind_sql::Flavor;

/// When unmapped columns are matched against settable properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutoMapping {
    /// Never auto-map.
    None,
    /// Auto-map top-level result maps only, not nested ones.
    #[default]
    Partial,
    /// Auto-map nested result maps too.
    Full,
}

/// Engine-wide behavior switches, overridable per result map where a
/// tri-state exists.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auto_mapping: AutoMapping,
    pub map_underscore_to_camel_case: bool,
    /// Keep an empty instance (rather than null) for rows where nothing
    /// mapped; also keys null id columns into row identities.
    pub return_instance_for_empty_row: bool,
    pub call_setters_on_nulls: bool,
    /// Reject non-default row bounds over nested result maps.
    pub safe_row_bounds: bool,
    /// Reject custom row handlers over nested result maps unless the
    /// statement declares its rows ordered.
    pub safe_row_handler: bool,
    pub flavor: Flavor,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_mapping: AutoMapping::Partial,
            map_underscore_to_camel_case: false,
            return_instance_for_empty_row: false,
            call_setters_on_nulls: false,
            safe_row_bounds: true,
            safe_row_handler: true,
            flavor: Flavor::default(),
        }
    }
}

impl Settings {
    pub fn auto_mapping(mut self, behavior: AutoMapping) -> Settings {
        self.auto_mapping = behavior;
        self
    }

    pub fn map_underscore_to_camel_case(mut self, enabled: bool) -> Settings {
        self.map_underscore_to_camel_case = enabled;
        self
    }

    pub fn return_instance_for_empty_row(mut self, enabled: bool) -> Settings {
        self.return_instance_for_empty_row = enabled;
        self
    }

    pub fn call_setters_on_nulls(mut self, enabled: bool) -> Settings {
        self.call_setters_on_nulls = enabled;
        self
    }

    pub fn safe_row_bounds(mut self, enabled: bool) -> Settings {
        self.safe_row_bounds = enabled;
        self
    }

    pub fn safe_row_handler(mut self, enabled: bool) -> Settings {
        self.safe_row_handler = enabled;
        self
    }

    pub fn flavor(mut self, flavor: Flavor) -> Settings {
        self.flavor = flavor;
        self
    }
}
