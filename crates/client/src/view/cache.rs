//! Student List Query Cache

use crate::api_client::StudentPage;
use std::collections::HashMap;

/// Identity of a list query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: u64,
    pub search: String,
}

impl QueryKey {
    pub fn new(page: u64, search: impl Into<String>) -> Self {
        Self {
            page,
            search: search.into(),
        }
    }
}

/// List results keyed by the exact (page, search) pair they were
/// requested with, so a late response can only ever fill its own slot.
///
/// Every invalidation starts a new generation; results fetched in an
/// earlier generation are refused.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, StudentPage>,
    generation: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&StudentPage> {
        self.entries.get(key)
    }

    /// Generation a fetch issued now belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Store a result fetched in `generation`; false when it predates the
    /// last invalidation and was discarded
    pub fn insert(&mut self, key: QueryKey, generation: u64, page: StudentPage) -> bool {
        if generation != self.generation {
            return false;
        }
        self.entries.insert(key, page);
        true
    }

    /// Drop every cached list and refuse results still in flight
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(total: u64) -> StudentPage {
        StudentPage {
            success: true,
            students: Vec::new(),
            total,
            page: 1,
            limit: 6,
            pages: total.div_ceil(6),
        }
    }

    #[test]
    fn test_keys_are_exact() {
        let mut cache = QueryCache::new();
        cache.insert(QueryKey::new(1, "an"), cache.generation(), page(2));

        assert!(cache.get(&QueryKey::new(1, "an")).is_some());
        assert!(cache.get(&QueryKey::new(1, "a")).is_none());
        assert!(cache.get(&QueryKey::new(2, "an")).is_none());
    }

    #[test]
    fn test_invalidate() {
        let mut cache = QueryCache::new();
        cache.insert(QueryKey::new(1, ""), 0, page(1));
        cache.insert(QueryKey::new(2, ""), 0, page(1));
        assert_eq!(cache.len(), 2);

        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_results_from_before_invalidation_are_refused() {
        let mut cache = QueryCache::new();
        let issued = cache.generation();
        cache.invalidate();

        assert!(cache.insert(QueryKey::new(1, ""), cache.generation(), page(3)));
        assert!(!cache.insert(QueryKey::new(1, ""), issued, page(2)));
        assert_eq!(cache.get(&QueryKey::new(1, "")).unwrap().total, 3);
    }
}
