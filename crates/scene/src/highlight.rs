use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Asset families that can be highlighted from outside (search results,
/// infrastructure cascade analysis, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Pipeline,
    Base,
    Nuclear,
    Conflict,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Pipeline,
        AssetKind::Base,
        AssetKind::Nuclear,
        AssetKind::Conflict,
    ];
}

/// Highlighted ids per asset kind.
///
/// Ids are kept sorted (`BTreeSet`), so iteration order is stable and can be
/// fed straight into a layer signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSets {
    sets: BTreeMap<AssetKind, BTreeSet<String>>,
}

impl HighlightSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(|s| s.is_empty())
    }

    /// Replace the set for `kind`; other kinds are untouched.
    pub fn replace<I, S>(&mut self, kind: AssetKind, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if set.is_empty() {
            self.sets.remove(&kind);
        } else {
            self.sets.insert(kind, set);
        }
    }

    pub fn contains(&self, kind: AssetKind, id: &str) -> bool {
        self.sets.get(&kind).is_some_and(|s| s.contains(id))
    }

    pub fn len(&self, kind: AssetKind) -> usize {
        self.sets.get(&kind).map_or(0, |s| s.len())
    }

    /// Sorted ids for `kind`.
    pub fn ids(&self, kind: AssetKind) -> impl Iterator<Item = &str> + '_ {
        self.sets
            .get(&kind)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetKind, HighlightSets};

    #[test]
    fn replace_and_query() {
        let mut h = HighlightSets::new();
        assert!(h.is_empty());
        h.replace(AssetKind::Base, ["b2", "b1", "b2"]);
        assert_eq!(h.len(AssetKind::Base), 2);
        assert!(h.contains(AssetKind::Base, "b1"));
        assert!(!h.contains(AssetKind::Nuclear, "b1"));
        let ids: Vec<&str> = h.ids(AssetKind::Base).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn empty_replace_removes_kind() {
        let mut h = HighlightSets::new();
        h.replace(AssetKind::Pipeline, ["p"]);
        h.replace(AssetKind::Pipeline, Vec::<String>::new());
        assert!(h.is_empty());
        assert_eq!(h.ids(AssetKind::Pipeline).count(), 0);
    }
}
