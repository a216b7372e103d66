pub mod control;
pub mod joint;
pub mod link;
pub mod object;
pub mod shape;

pub use control::SelectedControl;
pub use joint::SelectedJoint;
pub use link::SelectedLink;
pub use object::SelectedPco;
pub use shape::SelectedShape;

use crate::mirror::CgmPhysics;
use serde::{Deserialize, Serialize};

/// A selection slot. There is no terminal state: a slot may be selected and
/// cleared any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T> {
    Unselected,
    Selected(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::Unselected
    }
}

impl<T: Copy + PartialEq> Selection<T> {
    pub fn get(&self) -> Option<T> {
        match self {
            Selection::Unselected => None,
            Selection::Selected(id) => Some(*id),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }

    pub fn select(&mut self, id: T) {
        *self = Selection::Selected(id);
    }

    pub fn select_none(&mut self) {
        *self = Selection::Unselected;
    }

    /// Clears the slot if it holds `id`. Returns true if it did.
    pub fn forget(&mut self, id: T) -> bool {
        if self.get() == Some(id) {
            self.select_none();
            true
        } else {
            false
        }
    }
}

/// Selection slots of one scene. Every slot holds a model-side id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub shape: SelectedShape,
    pub pco: SelectedPco,
    pub joint: SelectedJoint,
    pub control: SelectedControl,
    pub link: SelectedLink,
}

impl Selections {
    /// Selects the link with the given name in the selected control.
    pub fn select_link_name(&mut self, physics: &CgmPhysics, name: &str) {
        if let Some(control) = self.control.id(physics) {
            self.link.select_name(physics, control, name);
        }
    }

    /// Selects the control owning the selected link.
    pub fn select_link_control(&mut self, physics: &CgmPhysics) -> bool {
        match self.link.control(physics) {
            Some(control) => self.control.select(physics, control),
            None => false,
        }
    }

    /// Selects the rigid body of the selected link.
    pub fn select_link_body(&mut self, physics: &CgmPhysics) -> bool {
        match self.link.body(physics) {
            Some(body) => self.pco.select(physics, body),
            None => false,
        }
    }

    /// Selects the joint between the selected link and its parent.
    pub fn select_link_joint(&mut self, physics: &CgmPhysics) -> bool {
        match self.link.joint(physics) {
            Some(joint) => self.joint.select(physics, joint),
            None => false,
        }
    }
}

/// Neighbor of `current` in `items`, wrapping at either end. `None` when
/// `current` is not in the list.
pub(crate) fn cyclic_neighbor<T: PartialEq + Clone>(
    items: &[T],
    current: &T,
    forward: bool,
) -> Option<T> {
    let index = items.iter().position(|item| item == current)?;
    let len = items.len();
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    items.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{
        BodySpec, CollisionShape, ControlSpec, JointKind, LinkSpec, PcoId, RigidBodyParams,
        ShapeId, ShapeSpec, Transform,
    };
    use glam::Vec3;

    #[test]
    fn new_slot_is_unselected() {
        let slot: Selection<ShapeId> = Selection::default();
        assert!(!slot.is_selected());
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn forget_only_clears_matching_id() {
        let mut slot = Selection::Unselected;
        slot.select(PcoId::from_raw(1));

        assert!(!slot.forget(PcoId::from_raw(2)));
        assert!(slot.is_selected());
        assert!(slot.forget(PcoId::from_raw(1)));
        assert_eq!(slot, Selection::Unselected);
    }

    #[test]
    fn neighbor_wraps_both_ways() {
        let items = [1, 2, 3];
        assert_eq!(cyclic_neighbor(&items, &3, true), Some(1));
        assert_eq!(cyclic_neighbor(&items, &1, false), Some(3));
        assert_eq!(cyclic_neighbor(&items, &2, true), Some(3));
        assert_eq!(cyclic_neighbor(&items, &9, true), None);
    }

    #[test]
    fn link_selection_reaches_body_joint_and_control() {
        let mut physics = CgmPhysics::new();
        let control = physics
            .add_control(&ragdoll_pair(), "puppet")
            .expect("valid ragdoll");
        let links = physics.control(control).unwrap().model.links().to_vec();
        let mut selections = Selections::default();

        selections.select_link_name(&physics, "child");
        assert_eq!(selections.link.get(), None);

        selections.control.select(&physics, control);
        selections.select_link_name(&physics, "child");
        assert!(selections.select_link_body(&physics));
        assert_eq!(selections.pco.get(), Some(links[1].body));
        assert!(selections.select_link_joint(&physics));
        assert_eq!(selections.joint.get(), links[1].joint);

        selections.control.select_none();
        assert!(selections.select_link_control(&physics));
        assert_eq!(selections.control.get(), Some(control));

        selections.select_link_name(&physics, "root");
        assert!(!selections.select_link_joint(&physics));
    }

    fn ragdoll_pair() -> ControlSpec {
        let link = |name: &str, parent: Option<usize>| LinkSpec {
            name: name.to_string(),
            body: BodySpec {
                shape: ShapeSpec::Primitive(CollisionShape::sphere(0.25)),
                transform: Transform::IDENTITY,
            },
            params: RigidBodyParams::default(),
            parent,
            joint: JointKind::Point,
            pivot: Vec3::ZERO,
        };
        ControlSpec::Ragdoll {
            links: vec![link("root", None), link("child", Some(0))],
        }
    }

    #[test]
    fn single_item_is_its_own_neighbor() {
        assert_eq!(cyclic_neighbor(&["only"], &"only", false), Some("only"));
    }
}
