/// Stable composite identity of a logical row under one result map.
///
/// A key is a schema seed plus ordered `(label, value)` contributions; two
/// keys are equal iff seed and contributions match element-wise. A key with
/// no contributions is the null sentinel: such rows are never deduplicated,
/// never reused and never linked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowKey {
    seed: String,
    // value is None when a null column is keyed (return_instance_for_empty_row)
    parts: Vec<(String, Option<String>)>,
}

impl RowKey {
    pub fn null() -> RowKey {
        RowKey::default()
    }

    pub fn seeded(seed: &str) -> RowKey {
        RowKey {
            seed: seed.to_string(),
            parts: Vec::new(),
        }
    }

    pub fn push(&mut self, label: &str, value: Option<String>) {
        self.parts.push((label.to_string(), value));
    }

    pub fn is_null(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contributions(&self) -> usize {
        self.parts.len()
    }

    /// Indexes a nested row under its parent. Valid only when both inputs
    /// carry an identity; anything else collapses to the sentinel.
    pub fn combine(child: &RowKey, parent: &RowKey) -> RowKey {
        if child.is_null() || parent.is_null() {
            return RowKey::null();
        }
        let mut combined = child.clone();
        combined.seed.push(':');
        combined.seed.push_str(&parent.seed);
        combined.parts.extend(parent.parts.iter().cloned());
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_elementwise() {
        let mut a = RowKey::seeded("authorMap");
        a.push("ID", Some("1".into()));
        let mut b = RowKey::seeded("authorMap");
        b.push("ID", Some("1".into()));
        assert_eq!(a, b);

        b.push("NAME", Some("kafka".into()));
        assert_ne!(a, b);
    }

    #[test]
    fn seed_alone_is_the_sentinel() {
        let key = RowKey::seeded("authorMap");
        assert!(key.is_null());
        assert!(RowKey::null().is_null());
    }

    #[test]
    fn combine_requires_both_identities() {
        let mut child = RowKey::seeded("child");
        child.push("ID", Some("2".into()));
        let mut parent = RowKey::seeded("parent");
        parent.push("ID", Some("1".into()));

        assert!(!RowKey::combine(&child, &parent).is_null());
        assert!(RowKey::combine(&child, &RowKey::null()).is_null());
        assert!(RowKey::combine(&RowKey::null(), &parent).is_null());
    }

    #[test]
    fn null_column_distinct_from_empty_string() {
        let mut a = RowKey::seeded("m");
        a.push("NAME", None);
        let mut b = RowKey::seeded("m");
        b.push("NAME", Some(String::new()));
        assert_ne!(a, b);
    }
}
