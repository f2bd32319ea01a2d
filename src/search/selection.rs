use super::{SelectionSnapshot, TargetId};

/// Targets the user has ticked. Keyed by id only, so a selection survives
/// any amount of re-querying.
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    // Selection order; small enough that a linear scan is fine.
    ids: Vec<TargetId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the selection of `id`. Returns the new state.
    pub fn toggle(&mut self, id: TargetId) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn is_selected(&self, id: TargetId) -> bool {
        self.ids.contains(&id)
    }

    pub fn selected_count(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids in the order they were selected.
    pub fn selected_ids(&self) -> Vec<TargetId> {
        self.ids.clone()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            ids: self.selected_ids(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut sel = SelectionState::new();
        assert!(sel.toggle(TargetId(1)));
        assert!(sel.is_selected(TargetId(1)));
        assert!(!sel.toggle(TargetId(1)));
        assert!(!sel.is_selected(TargetId(1)));
        assert_eq!(sel.selected_count(), 0);
    }

    #[test]
    fn test_selection_order() {
        let mut sel = SelectionState::new();
        sel.toggle(TargetId(3));
        sel.toggle(TargetId(-100));
        sel.toggle(TargetId(1));
        sel.toggle(TargetId(-100));
        assert_eq!(sel.selected_ids(), vec![TargetId(3), TargetId(1)]);
        assert_eq!(sel.snapshot().ids, vec![TargetId(3), TargetId(1)]);
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionState::new();
        sel.toggle(TargetId(3));
        sel.clear();
        assert_eq!(sel.selected_count(), 0);
        assert!(!sel.snapshot().ids.contains(&TargetId(3)));
    }
}
