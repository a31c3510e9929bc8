//! Task id interning.
//!
//! Maps string task ids to dense integer indices so the passes can work on
//! plain vectors. Ids are interned in sorted order, which makes index order
//! and id order the same; the builder relies on that for deterministic
//! tie-breaking.

use rustc_hash::FxHashMap;

/// Dense task index (u32 for compact adjacency lists).
pub type TaskIdx = u32;

#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    to_idx: FxHashMap<String, TaskIdx>,
    from_idx: Vec<String>,
}

impl TaskIndex {
    /// Build an index over `ids`. Returns the first duplicate id on failure.
    pub fn from_ids<'a, I>(ids: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sorted: Vec<&str> = ids.into_iter().collect();
        sorted.sort_unstable();
        if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(pair[0].to_string());
        }

        let mut to_idx = FxHashMap::with_capacity_and_hasher(sorted.len(), Default::default());
        let mut from_idx = Vec::with_capacity(sorted.len());
        for (i, id) in sorted.into_iter().enumerate() {
            to_idx.insert(id.to_string(), i as TaskIdx);
            from_idx.push(id.to_string());
        }
        Ok(Self { to_idx, from_idx })
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<TaskIdx> {
        self.to_idx.get(id).copied()
    }

    #[inline]
    pub fn resolve(&self, idx: TaskIdx) -> &str {
        &self.from_idx[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.from_idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_idx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_id_order() {
        let index = TaskIndex::from_ids(["task_c", "task_a", "task_b"]).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("task_a"), Some(0));
        assert_eq!(index.get("task_b"), Some(1));
        assert_eq!(index.get("task_c"), Some(2));
        assert_eq!(index.resolve(2), "task_c");
        assert_eq!(index.get("nonexistent"), None);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = TaskIndex::from_ids(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, "a");
    }

    #[test]
    fn test_empty_index() {
        let index = TaskIndex::from_ids(std::iter::empty()).unwrap();
        assert!(index.is_empty());
    }
}
