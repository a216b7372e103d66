use super::{Selection, cyclic_neighbor};
use crate::mirror::{CgmPhysics, ControlId, MirroredControl};
use serde::{Deserialize, Serialize};

/// The selected physics control, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedControl {
    slot: Selection<ControlId>,
}

impl SelectedControl {
    pub fn get(&self) -> Option<ControlId> {
        self.slot.get()
    }

    pub fn select_none(&mut self) {
        self.slot.select_none();
    }

    pub fn forget(&mut self, id: ControlId) -> bool {
        self.slot.forget(id)
    }

    pub fn find<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a MirroredControl> {
        physics.control(self.slot.get()?)
    }

    pub fn id(&self, physics: &CgmPhysics) -> Option<ControlId> {
        self.find(physics).and(self.slot.get())
    }

    pub fn is_selected(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some()
    }

    pub fn select(&mut self, physics: &CgmPhysics, id: ControlId) -> bool {
        if physics.control(id).is_some() {
            self.slot.select(id);
            true
        } else {
            false
        }
    }

    /// Selects the control named like `Ragdoll:2`; unknown names are ignored.
    pub fn select_name(&mut self, physics: &CgmPhysics, name: &str) {
        if let Some(id) = physics.find_control(name) {
            self.slot.select(id);
        }
    }

    /// Moves to the next control in ascending id order, wrapping around.
    pub fn select_next(&mut self, physics: &CgmPhysics) {
        self.step(physics, true);
    }

    pub fn select_previous(&mut self, physics: &CgmPhysics) {
        self.step(physics, false);
    }

    pub fn name(&self, physics: &CgmPhysics) -> Option<String> {
        physics.control_name(self.id(physics)?)
    }

    pub fn index(&self, physics: &CgmPhysics) -> Option<usize> {
        let id = self.id(physics)?;
        physics.list_controls().binary_search(&id).ok()
    }

    pub fn kind_label(&self, physics: &CgmPhysics) -> Option<&'static str> {
        self.find(physics).map(|control| control.model.kind_label())
    }

    /// Label of the model part the control was added to.
    pub fn controlled_label<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a str> {
        self.find(physics).map(|control| control.label.as_str())
    }

    pub fn is_ragdoll(&self, physics: &CgmPhysics) -> bool {
        self.find(physics)
            .is_some_and(|control| !control.model.links().is_empty())
    }

    /// Number of ragdoll links; zero for other controls.
    pub fn count_links(&self, physics: &CgmPhysics) -> usize {
        self.find(physics)
            .map_or(0, |control| control.model.links().len())
    }

    pub fn has_link(&self, physics: &CgmPhysics, name: &str) -> bool {
        self.find(physics)
            .is_some_and(|control| control.model.link_index(name).is_some())
    }

    pub fn list_link_names(&self, physics: &CgmPhysics, prefix: &str) -> Vec<String> {
        self.id(physics)
            .map(|id| physics.list_link_names(id, prefix))
            .unwrap_or_default()
    }

    /// Sorted names of the links without a parent.
    pub fn root_link_names(&self, physics: &CgmPhysics) -> Vec<String> {
        let Some(control) = self.find(physics) else {
            return Vec::new();
        };
        let mut names: Vec<String> = control
            .model
            .links()
            .iter()
            .filter(|link| link.parent.is_none())
            .map(|link| link.name.clone())
            .collect();
        names.sort();
        names
    }

    fn step(&mut self, physics: &CgmPhysics, forward: bool) {
        let Some(current) = self.id(physics) else {
            return;
        };
        if let Some(next) = cyclic_neighbor(&physics.list_controls(), &current, forward) {
            self.slot.select(next);
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

    fn sphere() -> BodySpec {
        BodySpec {
            shape: ShapeSpec::Primitive(CollisionShape::sphere(0.3)),
            transform: Transform::IDENTITY,
        }
    }

    fn puppet() -> ControlSpec {
        let link = |name: &str, parent: Option<usize>| LinkSpec {
            name: name.to_string(),
            body: sphere(),
            params: RigidBodyParams::default(),
            parent,
            joint: JointKind::Point,
            pivot: Vec3::ZERO,
        };
        ControlSpec::Ragdoll {
            links: vec![link("pelvis", None), link("thigh", Some(0)), link("abdomen", Some(0))],
        }
    }

    fn scene() -> (CgmPhysics, ControlId, ControlId) {
        let mut physics = CgmPhysics::new();
        let ghost = physics
            .add_control(&ControlSpec::Ghost { body: sphere() }, "sensor")
            .unwrap();
        let ragdoll = physics.add_control(&puppet(), "puppet").unwrap();
        (physics, ghost, ragdoll)
    }

    #[test]
    fn controls_cycle_in_id_order() {
        let (physics, ghost, ragdoll) = scene();
        let mut selected = SelectedControl::default();
        assert!(selected.select(&physics, ghost));
        assert_eq!(selected.index(&physics), Some(0));

        selected.select_next(&physics);
        assert_eq!(selected.id(&physics), Some(ragdoll));
        selected.select_next(&physics);
        assert_eq!(selected.id(&physics), Some(ghost));
        selected.select_previous(&physics);
        assert_eq!(selected.name(&physics).as_deref(), Some("Ragdoll:1"));
    }

    #[test]
    fn names_must_match_exactly() {
        let (physics, ghost, _) = scene();
        let mut selected = SelectedControl::default();
        for name in ["Ragdoll:0", "Ghost:+0", "Ghost:00", "0", "Ghost:"] {
            selected.select_name(&physics, name);
            assert_eq!(selected.get(), None, "{name:?} selected something");
        }
        selected.select_name(&physics, "Ghost:0");
        assert_eq!(selected.get(), Some(ghost));
        assert_eq!(selected.kind_label(&physics), Some("Ghost"));
        assert_eq!(selected.controlled_label(&physics), Some("sensor"));
    }

    #[test]
    fn ragdoll_queries() {
        let (physics, ghost, ragdoll) = scene();
        let mut selected = SelectedControl::default();
        selected.select(&physics, ragdoll);

        assert!(selected.is_ragdoll(&physics));
        assert_eq!(selected.count_links(&physics), 3);
        assert!(selected.has_link(&physics, "thigh"));
        assert!(!selected.has_link(&physics, "tail"));
        assert_eq!(
            selected.list_link_names(&physics, ""),
            vec!["abdomen", "pelvis", "thigh"]
        );
        assert_eq!(selected.list_link_names(&physics, "t"), vec!["thigh"]);
        assert_eq!(selected.root_link_names(&physics), vec!["pelvis"]);

        selected.select(&physics, ghost);
        assert!(!selected.is_ragdoll(&physics));
        assert_eq!(selected.count_links(&physics), 0);
        assert!(selected.list_link_names(&physics, "").is_empty());
    }

    #[test]
    fn unknown_control_is_not_selected() {
        let (physics, _, _) = scene();
        let mut selected = SelectedControl::default();
        assert!(!selected.select(&physics, ControlId(7)));
        assert!(!selected.is_selected(&physics));
        assert_eq!(selected.index(&physics), None);
    }
}
