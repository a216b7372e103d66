use serde::{Deserialize, Serialize};

/// Kind of edit that may continue across several calls, keyed by the name
/// of the edited entity. Repeated edits with the same key share one
/// checkpoint and one history event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuousEdit {
    ShapeSize(String),
    PhysicsPosition(String),
}

/// Unsaved-edit counter and continuous-edit tracker for one scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditState {
    edit_count: usize,
    continuous: Option<ContinuousEdit>,
}

impl EditState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_unsaved_edits(&self) -> usize {
        self.edit_count
    }

    pub fn continuous(&self) -> Option<&ContinuousEdit> {
        self.continuous.as_ref()
    }

    /// True if an edit keyed by `key` continues the previous edit.
    pub fn is_continuation(&self, key: &ContinuousEdit) -> bool {
        self.continuous.as_ref() == Some(key)
    }

    /// Ends any continuous edit so the next edit starts afresh.
    pub fn pre_checkpoint(&mut self) {
        self.continuous = None;
    }

    /// Counts a discrete edit.
    pub fn set_edited(&mut self) {
        self.edit_count += 1;
        self.continuous = None;
    }

    /// Counts the first step of a continuous edit. Returns false, counting
    /// nothing, when `key` continues the previous edit.
    pub fn set_continuous(&mut self, key: ContinuousEdit) -> bool {
        if self.is_continuation(&key) {
            return false;
        }
        self.edit_count += 1;
        self.continuous = Some(key);
        true
    }

    /// Counts a resize of the named shape, once per continuous run.
    pub fn set_edited_shape_size(&mut self, shape_name: &str) -> bool {
        self.set_continuous(ContinuousEdit::ShapeSize(shape_name.to_string()))
    }

    /// Counts a move of the named collision object, once per continuous run.
    pub fn set_edited_physics_position(&mut self, pco_name: &str) -> bool {
        self.set_continuous(ContinuousEdit::PhysicsPosition(pco_name.to_string()))
    }

    /// A resize replaces the shape, so an ongoing resize follows the shape
    /// to its new name.
    pub fn replace_for_resize(&mut self, old_name: &str, new_name: &str) {
        if let Some(ContinuousEdit::ShapeSize(name)) = &mut self.continuous {
            if name == old_name {
                *name = new_name.to_string();
            }
        }
    }

    pub fn set_pristine(&mut self) {
        self.edit_count = 0;
        self.continuous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_counts_once() {
        let mut state = EditState::new();
        assert!(state.set_edited_physics_position("Rigid:1"));
        assert!(!state.set_edited_physics_position("Rigid:1"));
        assert_eq!(state.count_unsaved_edits(), 1);

        state.pre_checkpoint();
        assert!(state.set_edited_physics_position("Rigid:1"));
        assert_eq!(state.count_unsaved_edits(), 2);
    }

    #[test]
    fn discrete_edit_breaks_continuation() {
        let mut state = EditState::new();
        let key = ContinuousEdit::ShapeSize("3".to_string());
        state.set_continuous(key.clone());
        state.set_edited();

        assert!(!state.is_continuation(&key));
        assert_eq!(state.count_unsaved_edits(), 2);
    }

    #[test]
    fn resize_key_follows_replacement() {
        let mut state = EditState::new();
        state.set_edited_shape_size("3");
        state.replace_for_resize("3", "7");

        assert!(state.is_continuation(&ContinuousEdit::ShapeSize("7".to_string())));
        state.replace_for_resize("9", "10");
        assert!(state.is_continuation(&ContinuousEdit::ShapeSize("7".to_string())));
    }

    #[test]
    fn pristine_resets_counter() {
        let mut state = EditState::new();
        state.set_edited();
        state.set_pristine();
        assert_eq!(state.count_unsaved_edits(), 0);
        assert_eq!(state.continuous(), None);
    }
}
