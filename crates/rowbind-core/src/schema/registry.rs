use super::ResultMap;
use crate::{Error, Result};

use std::collections::HashMap;

/// Id-keyed store of result maps supporting incremental registration.
///
/// Registration never fails on a forward reference: the map is stored
/// immediately (cycles such as A→B→A must resolve once both sides exist) and
/// the missing ids are tracked. Each later registration clears the references
/// it satisfies; `assert_complete` turns anything still dangling into a fatal
/// build error.
#[derive(Default)]
pub struct SchemaRegistry {
    maps: HashMap<String, ResultMap>,
    // missing id → referrer ids still waiting for it
    unresolved: HashMap<String, Vec<String>>,
}

impl SchemaRegistry {
    pub fn register(&mut self, map: ResultMap) -> Result<()> {
        if self.maps.contains_key(map.id()) {
            return Err(Error::schema_build(format!(
                "result map `{}` is already registered",
                map.id()
            )));
        }

        for referenced in map.referenced_ids() {
            if !self.maps.contains_key(referenced) && referenced != map.id() {
                self.unresolved
                    .entry(referenced.to_string())
                    .or_default()
                    .push(map.id().to_string());
            }
        }
        self.unresolved.remove(map.id());
        self.maps.insert(map.id().to_string(), map);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&ResultMap> {
        self.maps
            .get(id)
            .ok_or_else(|| Error::incomplete("<lookup>", id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.maps.contains_key(id)
    }

    /// True while some registered map still references an unknown id.
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Fails with the first dangling reference, if any remain.
    pub fn assert_complete(&self) -> Result<()> {
        if let Some((missing, referrers)) = self.unresolved.iter().next() {
            return Err(Error::incomplete(
                referrers.first().cloned().unwrap_or_default(),
                missing.clone(),
            ));
        }
        Ok(())
    }
}
