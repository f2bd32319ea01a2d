use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Target, TargetId};
use crate::store::Store;

#[derive(Debug, Default)]
struct RecentList {
    pinned: Vec<Target>,
    recent: VecDeque<Target>,
}

/// Small ordered list shown for an empty query: pinned targets first, then
/// recently used ones, most recent first.
#[derive(Debug)]
pub struct RecentTargets {
    capacity: usize,
    inner: Mutex<RecentList>,
}

impl RecentTargets {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(RecentList::default()),
        }
    }

    /// Load pinned and recent targets persisted in the store.
    pub fn load(store: &Store, capacity: usize) -> Result<Self, sqlite::Error> {
        let cache = Self::new(capacity);
        {
            let mut inner = cache.lock();
            for entry in store.get_recent_targets()? {
                if entry.pinned {
                    inner.pinned.push(entry.target);
                } else if inner.recent.len() < capacity {
                    inner.recent.push_back(entry.target);
                }
            }
        }
        Ok(cache)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecentList> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move `target` to the front of the recent list (pinned ones stay put).
    pub fn touch(&self, target: Target) {
        let mut inner = self.lock();
        if let Some(pinned) = inner.pinned.iter_mut().find(|t| t.id == target.id) {
            *pinned = target;
            return;
        }
        inner.recent.retain(|t| t.id != target.id);
        inner.recent.push_front(target);
        inner.recent.truncate(self.capacity);
    }

    pub fn pin(&self, target: Target) {
        let mut inner = self.lock();
        inner.recent.retain(|t| t.id != target.id);
        if !inner.pinned.iter().any(|t| t.id == target.id) {
            inner.pinned.push(target);
        }
    }

    /// Returns true if the target was pinned. It goes back to the recent list.
    pub fn unpin(&self, id: TargetId) -> bool {
        let mut inner = self.lock();
        let Some(pos) = inner.pinned.iter().position(|t| t.id == id) else {
            return false;
        };
        let target = inner.pinned.remove(pos);
        inner.recent.push_front(target);
        inner.recent.truncate(self.capacity);
        true
    }

    pub fn remove(&self, id: TargetId) {
        let mut inner = self.lock();
        inner.pinned.retain(|t| t.id != id);
        inner.recent.retain(|t| t.id != id);
    }

    pub fn snapshot(&self) -> Vec<Target> {
        let inner = self.lock();
        inner
            .pinned
            .iter()
            .chain(inner.recent.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TargetKind;
    use crate::store::user::UserRow;

    fn target(id: i64) -> Target {
        Target::new(TargetId(id), TargetKind::User, format!("User {}", id), None, id)
    }

    fn ids(cache: &RecentTargets) -> Vec<i64> {
        cache.snapshot().iter().map(|t| t.id.0).collect()
    }

    #[test]
    fn test_touch_moves_to_front() {
        let cache = RecentTargets::new(10);
        cache.touch(target(1));
        cache.touch(target(2));
        cache.touch(target(1));
        assert_eq!(ids(&cache), vec![1, 2]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let cache = RecentTargets::new(2);
        cache.touch(target(1));
        cache.touch(target(2));
        cache.touch(target(3));
        assert_eq!(ids(&cache), vec![3, 2]);
    }

    #[test]
    fn test_pinned_first_and_not_counted() {
        let cache = RecentTargets::new(1);
        cache.touch(target(1));
        cache.pin(target(9));
        cache.touch(target(2));
        assert_eq!(ids(&cache), vec![9, 2]);

        // Touching a pinned target keeps it pinned
        cache.touch(target(9));
        assert_eq!(ids(&cache), vec![9, 2]);
    }

    #[test]
    fn test_unpin_and_remove() {
        let cache = RecentTargets::new(5);
        cache.pin(target(1));
        cache.touch(target(2));
        assert!(cache.unpin(TargetId(1)));
        assert!(!cache.unpin(TargetId(1)));
        assert_eq!(ids(&cache), vec![1, 2]);

        cache.remove(TargetId(2));
        assert_eq!(ids(&cache), vec![1]);
    }

    #[test]
    fn test_load_from_store() {
        let store = Store::open_in_memory().unwrap();
        for id in 1..=3 {
            store
                .upsert_user(&UserRow {
                    user_id: id,
                    first_name: format!("User{}", id),
                    last_name: None,
                    username: None,
                    is_contact: true,
                })
                .unwrap();
        }
        store.touch_recent(TargetId(1), 100).unwrap();
        store.touch_recent(TargetId(2), 200).unwrap();
        store.touch_recent(TargetId(3), 300).unwrap();
        store.set_recent_pinned(TargetId(1), true).unwrap();

        let cache = RecentTargets::load(&store, 1).unwrap();
        assert_eq!(ids(&cache), vec![1, 3]);
    }
}
