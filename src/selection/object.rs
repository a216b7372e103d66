use super::{Selection, cyclic_neighbor};
use crate::mirror::CgmPhysics;
use crate::physics::{CollisionObject, PcoId, RigidBodyParameter, ShapeId, Transform};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The selected collision object, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPco {
    slot: Selection<PcoId>,
}

impl SelectedPco {
    pub fn get(&self) -> Option<PcoId> {
        self.slot.get()
    }

    pub fn select_none(&mut self) {
        self.slot.select_none();
    }

    pub fn forget(&mut self, id: PcoId) -> bool {
        self.slot.forget(id)
    }

    pub fn find<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a CollisionObject> {
        let id = self.slot.get()?;
        if physics.has_object(id) {
            physics.model().object(id)
        } else {
            None
        }
    }

    pub fn id(&self, physics: &CgmPhysics) -> Option<PcoId> {
        self.find(physics).and(self.slot.get())
    }

    pub fn is_selected(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some()
    }

    pub fn select(&mut self, physics: &CgmPhysics, id: PcoId) -> bool {
        if physics.has_object(id) {
            self.slot.select(id);
            true
        } else {
            false
        }
    }

    /// Selects the object with the given name, e.g. `Rigid:3`. Unknown names
    /// are ignored.
    pub fn select_name(&mut self, physics: &CgmPhysics, name: &str) {
        if let Some(id) = physics.find_object(name) {
            self.slot.select(id);
        }
    }

    /// Moves to the next object in sorted name order, wrapping around.
    pub fn select_next(&mut self, physics: &CgmPhysics) {
        self.step(physics, true);
    }

    pub fn select_previous(&mut self, physics: &CgmPhysics) {
        self.step(physics, false);
    }

    pub fn name(&self, physics: &CgmPhysics) -> Option<String> {
        physics.object_name(self.id(physics)?)
    }

    /// Position in the sorted list of object names.
    pub fn index(&self, physics: &CgmPhysics) -> Option<usize> {
        let name = self.name(physics)?;
        physics
            .list_object_names("")
            .iter()
            .position(|candidate| *candidate == name)
    }

    pub fn kind_label(&self, physics: &CgmPhysics) -> Option<&'static str> {
        self.find(physics).map(|object| object.kind.label())
    }

    pub fn has_mass(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some_and(CollisionObject::has_mass)
    }

    /// Every object kind can be moved and rotated.
    pub fn can_position(&self, physics: &CgmPhysics) -> bool {
        self.is_selected(physics)
    }

    pub fn location(&self, physics: &CgmPhysics) -> Option<Vec3> {
        self.find(physics).map(|object| object.location)
    }

    pub fn orientation(&self, physics: &CgmPhysics) -> Option<Quat> {
        self.find(physics).map(|object| object.orientation)
    }

    pub fn transform(&self, physics: &CgmPhysics) -> Transform {
        self.find(physics)
            .map_or(Transform::IDENTITY, CollisionObject::transform)
    }

    pub fn shape_id(&self, physics: &CgmPhysics) -> Option<ShapeId> {
        self.find(physics).map(|object| object.shape)
    }

    pub fn uses_shape(&self, physics: &CgmPhysics, shape: ShapeId) -> bool {
        self.shape_id(physics) == Some(shape)
    }

    /// Reads a rigid-body parameter; NaN unless a rigid body is selected.
    pub fn parameter(&self, physics: &CgmPhysics, parameter: RigidBodyParameter) -> f32 {
        self.find(physics)
            .and_then(|object| object.rigid.as_ref())
            .map_or(f32::NAN, |params| parameter.read(params))
    }

    fn step(&mut self, physics: &CgmPhysics, forward: bool) {
        let Some(current) = self.name(physics) else {
            return;
        };
        let names = physics.list_object_names("");
        if let Some(next) = cyclic_neighbor(&names, &current, forward) {
            self.select_name(physics, &next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodySpec, CollisionShape, ControlSpec, RigidBodyParams, ShapeSpec};

    fn body(spec_kind: &str) -> ControlSpec {
        let body = BodySpec {
            shape: ShapeSpec::Primitive(CollisionShape::sphere(0.5)),
            transform: Transform::from_location(Vec3::Y),
        };
        match spec_kind {
            "ghost" => ControlSpec::Ghost { body },
            _ => ControlSpec::RigidBody {
                body,
                params: RigidBodyParams::default(),
            },
        }
    }

    fn scene() -> CgmPhysics {
        let mut physics = CgmPhysics::new();
        for kind in ["rigid", "ghost", "rigid"] {
            physics.add_control(&body(kind), kind).expect("valid body");
        }
        physics
    }

    #[test]
    fn cycling_follows_sorted_names() {
        let physics = scene();
        let names = physics.list_object_names("");
        let mut selected = SelectedPco::default();
        selected.select_name(&physics, &names[0]);

        for expected in names.iter().cycle().skip(1).take(names.len()) {
            selected.select_next(&physics);
            assert_eq!(selected.name(&physics).as_ref(), Some(expected));
        }
        selected.select_previous(&physics);
        assert_eq!(selected.index(&physics), Some(names.len() - 1));
    }

    #[test]
    fn ghost_has_no_mass_or_parameters() {
        let physics = scene();
        let ghost = physics.list_object_names("Ghost")[0].clone();
        let mut selected = SelectedPco::default();
        selected.select_name(&physics, &ghost);

        assert_eq!(selected.kind_label(&physics), Some("Ghost"));
        assert!(!selected.has_mass(&physics));
        assert!(selected.can_position(&physics));
        assert!(selected.parameter(&physics, RigidBodyParameter::Mass).is_nan());
    }

    #[test]
    fn rigid_body_reports_pose_and_shape() {
        let physics = scene();
        let rigid = physics.list_object_names("Rigid")[0].clone();
        let mut selected = SelectedPco::default();
        selected.select_name(&physics, &rigid);

        assert_eq!(selected.location(&physics), Some(Vec3::Y));
        assert_eq!(selected.parameter(&physics, RigidBodyParameter::Mass), 1.0);
        let shape = selected.shape_id(&physics).expect("rigid body has a shape");
        assert!(selected.uses_shape(&physics, shape));
    }

    #[test]
    fn unknown_name_keeps_selection() {
        let physics = scene();
        let mut selected = SelectedPco::default();
        selected.select_name(&physics, "Rigid:ffffffff");
        assert!(!selected.is_selected(&physics));
        assert!(!selected.can_position(&physics));
    }
}
