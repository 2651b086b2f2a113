//! Dense slot mapping for task IDs.
//!
//! Maps caller task IDs (arbitrary integers) to contiguous `u32` slots so the
//! graph arena can use plain `Vec` indexing.

use rustc_hash::FxHashMap;

use crate::models::TaskId;

/// Slot of a task inside the arena (u32 for compact edge lists).
pub type TaskSlot = u32;

/// Bidirectional mapping between task IDs and arena slots.
#[derive(Debug, Clone)]
pub struct TaskIndex {
    to_slot: FxHashMap<TaskId, TaskSlot>,
    from_slot: Vec<TaskId>,
}

impl TaskIndex {
    /// Create a new index with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_slot: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_slot: Vec::with_capacity(capacity),
        }
    }

    /// Insert a task ID, returning its new slot.
    ///
    /// Returns `None` if the ID already has a slot.
    pub fn insert(&mut self, id: TaskId) -> Option<TaskSlot> {
        if self.to_slot.contains_key(&id) {
            return None;
        }
        let slot = self.from_slot.len() as TaskSlot;
        self.from_slot.push(id);
        self.to_slot.insert(id, slot);
        Some(slot)
    }

    /// Get the slot for a task ID, if it exists.
    #[inline]
    pub fn get(&self, id: TaskId) -> Option<TaskSlot> {
        self.to_slot.get(&id).copied()
    }

    /// All task IDs, indexed by slot.
    #[inline]
    pub fn ids(&self) -> &[TaskId] {
        &self.from_slot
    }

    pub(crate) fn len(&self) -> usize {
        self.from_slot.len()
    }
}

impl Default for TaskIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut index = TaskIndex::with_capacity(4);

        let a = index.insert(101).unwrap();
        let b = index.insert(7).unwrap();

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(index.insert(101), None); // duplicate

        assert_eq!(index.get(101), Some(a));
        assert_eq!(index.get(7), Some(b));
        assert_eq!(index.get(999), None);
        assert_eq!(index.len(), 2);
        assert_eq!(index.ids(), &[101, 7]);
    }
}
