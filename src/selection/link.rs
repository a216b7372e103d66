use super::{Selection, cyclic_neighbor};
use crate::mirror::{CgmPhysics, ControlId, LinkId};
use crate::physics::{JointId, PcoId, PhysicsLink};
use serde::{Deserialize, Serialize};

/// The selected ragdoll link, if any. A link is named within its control, so
/// navigation never leaves the ragdoll it started in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLink {
    slot: Selection<LinkId>,
}

impl SelectedLink {
    pub fn get(&self) -> Option<LinkId> {
        self.slot.get()
    }

    pub fn select_none(&mut self) {
        self.slot.select_none();
    }

    pub fn forget(&mut self, id: LinkId) -> bool {
        self.slot.forget(id)
    }

    /// Clears the slot if it holds any link of `control`.
    pub fn forget_control(&mut self, control: ControlId) -> bool {
        match self.slot.get() {
            Some(id) if id.control == control => {
                self.slot.select_none();
                true
            }
            _ => false,
        }
    }

    pub fn find<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a PhysicsLink> {
        physics.link(self.slot.get()?)
    }

    pub fn id(&self, physics: &CgmPhysics) -> Option<LinkId> {
        self.find(physics).and(self.slot.get())
    }

    pub fn is_selected(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some()
    }

    pub fn select(&mut self, physics: &CgmPhysics, id: LinkId) -> bool {
        if physics.link(id).is_some() {
            self.slot.select(id);
            true
        } else {
            false
        }
    }

    /// Selects the link of `control` with the given name; unknown names are
    /// ignored.
    pub fn select_name(&mut self, physics: &CgmPhysics, control: ControlId, name: &str) {
        if let Some(id) = physics.find_link(control, name) {
            self.slot.select(id);
        }
    }

    /// Moves to the next link of the same ragdoll in sorted name order,
    /// wrapping around.
    pub fn select_next(&mut self, physics: &CgmPhysics) {
        self.step(physics, true);
    }

    pub fn select_previous(&mut self, physics: &CgmPhysics) {
        self.step(physics, false);
    }

    /// Moves to the parent link. Returns false at the root or with nothing
    /// selected.
    pub fn select_parent(&mut self, physics: &CgmPhysics) -> bool {
        match self.parent(physics) {
            Some(parent) => {
                self.slot.select(parent);
                true
            }
            None => false,
        }
    }

    pub fn control(&self, physics: &CgmPhysics) -> Option<ControlId> {
        self.id(physics).map(|id| id.control)
    }

    pub fn name<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a str> {
        self.find(physics).map(|link| link.name.as_str())
    }

    /// Position in the sorted link names of the ragdoll.
    pub fn index(&self, physics: &CgmPhysics) -> Option<usize> {
        let id = self.id(physics)?;
        let name = self.name(physics)?;
        physics
            .list_link_names(id.control, "")
            .iter()
            .position(|candidate| candidate == name)
    }

    /// The link's rigid body in the model.
    pub fn body(&self, physics: &CgmPhysics) -> Option<PcoId> {
        self.find(physics).map(|link| link.body)
    }

    pub fn body_name(&self, physics: &CgmPhysics) -> Option<String> {
        physics.object_name(self.body(physics)?)
    }

    /// Joint to the parent link; `None` for the root.
    pub fn joint(&self, physics: &CgmPhysics) -> Option<JointId> {
        self.find(physics)?.joint
    }

    pub fn joint_name(&self, physics: &CgmPhysics) -> Option<String> {
        self.joint(physics).map(JointId::name)
    }

    pub fn is_root(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some_and(|link| link.parent.is_none())
    }

    pub fn parent(&self, physics: &CgmPhysics) -> Option<LinkId> {
        let id = self.id(physics)?;
        let index = self.find(physics)?.parent?;
        Some(LinkId {
            control: id.control,
            index,
        })
    }

    pub fn parent_name<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a str> {
        physics
            .link(self.parent(physics)?)
            .map(|link| link.name.as_str())
    }

    /// Sorted names of the links jointed directly to this one.
    pub fn child_names(&self, physics: &CgmPhysics) -> Vec<String> {
        let Some(id) = self.id(physics) else {
            return Vec::new();
        };
        let Some(control) = physics.control(id.control) else {
            return Vec::new();
        };
        let links = control.model.links();
        let mut names: Vec<String> = control
            .model
            .child_links(id.index)
            .into_iter()
            .filter_map(|index| links.get(index))
            .map(|link| link.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn count_children(&self, physics: &CgmPhysics) -> usize {
        let Some(id) = self.id(physics) else {
            return 0;
        };
        physics
            .control(id.control)
            .map_or(0, |control| control.model.child_links(id.index).len())
    }

    fn step(&mut self, physics: &CgmPhysics, forward: bool) {
        let (Some(id), Some(current)) = (self.id(physics), self.name(physics)) else {
            return;
        };
        let names = physics.list_link_names(id.control, "");
        if let Some(next) = cyclic_neighbor(&names, &current.to_string(), forward) {
            self.select_name(physics, id.control, &next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{
        BodySpec, CollisionShape, ControlSpec, JointKind, LinkSpec, RigidBodyParams, ShapeSpec,
        Transform,
    };
    use glam::Vec3;

    // pelvis
    //  +- spine
    //  |   +- head
    //  +- leg
    fn puppet() -> ControlSpec {
        let link = |name: &str, parent: Option<usize>| LinkSpec {
            name: name.to_string(),
            body: BodySpec {
                shape: ShapeSpec::Primitive(CollisionShape::sphere(0.2)),
                transform: Transform::IDENTITY,
            },
            params: RigidBodyParams::default(),
            parent,
            joint: JointKind::Cone,
            pivot: Vec3::ZERO,
        };
        ControlSpec::Ragdoll {
            links: vec![
                link("pelvis", None),
                link("spine", Some(0)),
                link("head", Some(1)),
                link("leg", Some(0)),
            ],
        }
    }

    fn scene() -> (CgmPhysics, ControlId) {
        let mut physics = CgmPhysics::new();
        let control = physics.add_control(&puppet(), "puppet").unwrap();
        (physics, control)
    }

    #[test]
    fn links_cycle_in_sorted_name_order() {
        let (physics, control) = scene();
        let mut selected = SelectedLink::default();
        selected.select_name(&physics, control, "head");
        assert_eq!(selected.index(&physics), Some(0));

        let mut visited = Vec::new();
        for _ in 0..4 {
            selected.select_next(&physics);
            visited.push(selected.name(&physics).unwrap().to_string());
        }
        assert_eq!(visited, vec!["leg", "pelvis", "spine", "head"]);

        selected.select_previous(&physics);
        assert_eq!(selected.name(&physics), Some("spine"));
    }

    #[test]
    fn parent_and_children() {
        let (physics, control) = scene();
        let mut selected = SelectedLink::default();
        selected.select_name(&physics, control, "pelvis");
        assert!(selected.is_root(&physics));
        assert_eq!(selected.joint(&physics), None);
        assert_eq!(selected.child_names(&physics), vec!["leg", "spine"]);
        assert_eq!(selected.count_children(&physics), 2);
        assert!(!selected.select_parent(&physics));

        selected.select_name(&physics, control, "head");
        assert_eq!(selected.parent_name(&physics), Some("spine"));
        assert!(selected.child_names(&physics).is_empty());
        assert!(selected.select_parent(&physics));
        assert_eq!(selected.name(&physics), Some("spine"));
        assert!(selected.select_parent(&physics));
        assert_eq!(selected.name(&physics), Some("pelvis"));
    }

    #[test]
    fn body_and_joint_belong_to_the_link() {
        let (physics, control) = scene();
        let links = physics.control(control).unwrap().model.links().to_vec();
        let mut selected = SelectedLink::default();
        selected.select_name(&physics, control, "spine");

        assert_eq!(selected.body(&physics), Some(links[1].body));
        assert_eq!(selected.body_name(&physics), physics.object_name(links[1].body));
        let joint = selected.joint(&physics).expect("spine is jointed to the pelvis");
        assert_eq!(selected.joint_name(&physics), Some(joint.name()));
        assert_eq!(physics.model().joint(joint).unwrap().end_b, links[1].body);
    }

    #[test]
    fn forget_control_only_clears_its_links() {
        let (physics, control) = scene();
        let mut selected = SelectedLink::default();
        selected.select_name(&physics, control, "leg");

        assert!(!selected.forget_control(ControlId(control.0 + 1)));
        assert!(selected.is_selected(&physics));
        assert!(selected.forget_control(control));
        assert_eq!(selected.get(), None);
    }

    #[test]
    fn unknown_names_select_nothing() {
        let (physics, control) = scene();
        let mut selected = SelectedLink::default();
        selected.select_name(&physics, control, "tail");
        selected.select_name(&physics, ControlId(9), "pelvis");
        assert_eq!(selected.get(), None);
        assert!(!selected.select(
            &physics,
            LinkId {
                control,
                index: 4
            }
        ));
    }
}
