use super::{Selection, cyclic_neighbor};
use crate::mirror::CgmPhysics;
use crate::physics::{Joint, JointEnd, JointId};
use serde::{Deserialize, Serialize};

/// The selected physics joint, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedJoint {
    slot: Selection<JointId>,
}

impl SelectedJoint {
    pub fn get(&self) -> Option<JointId> {
        self.slot.get()
    }

    pub fn select_none(&mut self) {
        self.slot.select_none();
    }

    pub fn forget(&mut self, id: JointId) -> bool {
        self.slot.forget(id)
    }

    pub fn find<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a Joint> {
        let id = self.slot.get()?;
        physics
            .view_joint(id)
            .and_then(|_| physics.model().joint(id))
    }

    pub fn id(&self, physics: &CgmPhysics) -> Option<JointId> {
        self.find(physics).and(self.slot.get())
    }

    pub fn is_selected(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some()
    }

    pub fn select(&mut self, physics: &CgmPhysics, id: JointId) -> bool {
        if physics.view_joint(id).is_some() {
            self.slot.select(id);
            true
        } else {
            false
        }
    }

    pub fn select_name(&mut self, physics: &CgmPhysics, name: &str) {
        if let Some(id) = physics.find_joint(name) {
            self.slot.select(id);
        }
    }

    /// Moves to the next joint in ascending id order, wrapping around.
    pub fn select_next(&mut self, physics: &CgmPhysics) {
        self.step(physics, true);
    }

    pub fn select_previous(&mut self, physics: &CgmPhysics) {
        self.step(physics, false);
    }

    pub fn name(&self, physics: &CgmPhysics) -> Option<String> {
        self.id(physics).map(JointId::name)
    }

    pub fn index(&self, physics: &CgmPhysics) -> Option<usize> {
        let id = self.id(physics)?;
        physics.list_joints().binary_search(&id).ok()
    }

    pub fn kind_label(&self, physics: &CgmPhysics) -> Option<&'static str> {
        self.find(physics).map(|joint| joint.kind.label())
    }

    /// Name of the body at one end. `None` for the free end of a
    /// single-ended joint.
    pub fn end_name(&self, physics: &CgmPhysics, end: JointEnd) -> Option<String> {
        let body = self.find(physics)?.body(end)?;
        physics.object_name(body)
    }

    fn step(&mut self, physics: &CgmPhysics, forward: bool) {
        let Some(current) = self.id(physics) else {
            return;
        };
        if let Some(next) = cyclic_neighbor(&physics.list_joints(), &current, forward) {
            self.slot.select(next);
        }
    }
}
