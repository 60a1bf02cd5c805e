use rowbind_sql::SqlNode;

/// A configured statement: its template tree plus how its result sets map.
///
/// Built once at configuration time; the node tree is immutable and shared by
/// every execution.
#[derive(Debug, Clone)]
pub struct Statement {
    id: String,
    root: SqlNode,
    result_maps: Vec<String>,
    result_sets: Vec<String>,
    result_ordered: bool,
    key_properties: Vec<String>,
}

impl Statement {
    pub fn builder(id: impl Into<String>, root: SqlNode) -> StatementBuilder {
        StatementBuilder {
            statement: Statement {
                id: id.into(),
                root,
                result_maps: Vec::new(),
                result_sets: Vec::new(),
                result_ordered: false,
                key_properties: Vec::new(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &SqlNode {
        &self.root
    }

    pub fn result_map_ids(&self) -> &[String] {
        &self.result_maps
    }

    /// Positional names of the statement's result sets, used to route extra
    /// result sets to the properties awaiting them.
    pub fn result_sets(&self) -> &[String] {
        &self.result_sets
    }

    /// Declares that rows sharing a parent arrive adjacently, which lets the
    /// nested-map loop flush each parent as soon as its group ends.
    pub fn result_ordered(&self) -> bool {
        self.result_ordered
    }

    /// Parameter-object properties receiving database-generated keys.
    pub fn key_properties(&self) -> &[String] {
        &self.key_properties
    }
}

pub struct StatementBuilder {
    statement: Statement,
}

impl StatementBuilder {
    pub fn result_map(mut self, id: impl Into<String>) -> StatementBuilder {
        self.statement.result_maps.push(id.into());
        self
    }

    pub fn result_sets(mut self, names: &[&str]) -> StatementBuilder {
        self.statement.result_sets = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn result_ordered(mut self) -> StatementBuilder {
        self.statement.result_ordered = true;
        self
    }

    pub fn key_properties(mut self, properties: &[&str]) -> StatementBuilder {
        self.statement.key_properties = properties.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn build(self) -> Statement {
        self.statement
    }
}
