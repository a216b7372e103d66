use super::{Selection, cyclic_neighbor};
use crate::mirror::CgmPhysics;
use crate::physics::{CollisionShape, PcoId, ShapeId, ShapeParameter, Transform, UserId};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The selected collision shape, if any. The slot may outlive the shape it
/// names; every query re-resolves the id against the model's reachable
/// shapes and treats a stale id as no selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedShape {
    slot: Selection<ShapeId>,
}

impl SelectedShape {
    /// The raw slot contents, resolved or not.
    pub fn get(&self) -> Option<ShapeId> {
        self.slot.get()
    }

    pub fn select_none(&mut self) {
        self.slot.select_none();
    }

    pub fn forget(&mut self, id: ShapeId) -> bool {
        self.slot.forget(id)
    }

    pub fn find<'a>(&self, physics: &'a CgmPhysics) -> Option<&'a CollisionShape> {
        let id = self.slot.get()?;
        physics
            .model()
            .is_reachable(id)
            .then(|| physics.model().shape(id))
            .flatten()
    }

    pub fn id(&self, physics: &CgmPhysics) -> Option<ShapeId> {
        self.find(physics).and(self.slot.get())
    }

    pub fn is_selected(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some()
    }

    /// Selects `id` if it names a reachable shape. Returns true on success.
    pub fn select(&mut self, physics: &CgmPhysics, id: ShapeId) -> bool {
        if physics.model().is_reachable(id) {
            self.slot.select(id);
            true
        } else {
            false
        }
    }

    /// Selects the shape with the given name; unknown names are ignored.
    pub fn select_name(&mut self, physics: &CgmPhysics, name: &str) {
        if let Some(id) = physics.find_shape(name) {
            self.slot.select(id);
        }
    }

    pub fn select_next(&mut self, physics: &CgmPhysics) {
        self.step(physics, true);
    }

    pub fn select_previous(&mut self, physics: &CgmPhysics) {
        self.step(physics, false);
    }

    pub fn select_first_child(&mut self, physics: &CgmPhysics) {
        let first = self
            .find(physics)
            .and_then(|shape| shape.children().first())
            .map(|child| child.shape);
        if let Some(child) = first {
            self.slot.select(child);
        }
    }

    /// Position among the model's shapes in ascending id order.
    pub fn index(&self, physics: &CgmPhysics) -> Option<usize> {
        let id = self.id(physics)?;
        physics.list_shapes().iter().position(|shape| *shape == id)
    }

    pub fn kind_label(&self, physics: &CgmPhysics) -> Option<&'static str> {
        self.find(physics).map(CollisionShape::kind_label)
    }

    pub fn axis_index(&self, physics: &CgmPhysics) -> Option<usize> {
        self.find(physics)
            .and_then(CollisionShape::axis)
            .map(|axis| axis.index())
    }

    pub fn is_compound(&self, physics: &CgmPhysics) -> bool {
        self.find(physics).is_some_and(CollisionShape::is_compound)
    }

    pub fn count_children(&self, physics: &CgmPhysics) -> usize {
        self.find(physics).map_or(0, |shape| shape.children().len())
    }

    /// Names of the compound's children, in child order.
    pub fn list_child_names(&self, physics: &CgmPhysics, prefix: &str) -> Vec<String> {
        self.find(physics)
            .map(|shape| {
                shape
                    .children()
                    .iter()
                    .map(|child| child.shape.name())
                    .filter(|name| name.starts_with(prefix))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn user_set(&self, physics: &CgmPhysics) -> BTreeSet<UserId> {
        self.id(physics)
            .map(|id| physics.model().user_set(id))
            .unwrap_or_default()
    }

    pub fn can_set(&self, physics: &CgmPhysics, parameter: ShapeParameter) -> bool {
        self.find(physics)
            .is_some_and(|shape| parameter.can_set(shape))
    }

    /// Reads a parameter; NaN when nothing is selected or it does not apply.
    pub fn value(&self, physics: &CgmPhysics, parameter: ShapeParameter) -> f32 {
        let Some(id) = self.id(physics) else {
            return f32::NAN;
        };
        match (parameter, physics.model().shape(id)) {
            (ShapeParameter::ScaledVolume, Some(shape)) if shape.is_compound() => {
                physics.model().scaled_volume(id).unwrap_or(f32::NAN)
            }
            (_, Some(shape)) => parameter.read(shape),
            (_, None) => f32::NAN,
        }
    }

    pub fn half_extents(&self, physics: &CgmPhysics) -> Option<Vec3> {
        self.find(physics).and_then(CollisionShape::half_extents)
    }

    pub fn scale(&self, physics: &CgmPhysics) -> Option<Vec3> {
        self.find(physics).map(CollisionShape::scale)
    }

    /// World transform of the shape. When the selected collision object uses
    /// the shape directly, that object's transform wins.
    pub fn transform(&self, physics: &CgmPhysics, selected_pco: Option<PcoId>) -> Transform {
        let Some(id) = self.id(physics) else {
            return Transform::IDENTITY;
        };
        let direct = selected_pco
            .and_then(|pco| physics.model().object(pco))
            .filter(|object| object.shape == id)
            .map(|object| object.transform());
        direct.unwrap_or_else(|| physics.model().shape_transform(id))
    }

    fn step(&mut self, physics: &CgmPhysics, forward: bool) {
        let Some(current) = self.slot.get() else {
            return;
        };
        if let Some(next) = cyclic_neighbor(&physics.list_shapes(), &current, forward) {
            self.slot.select(next);
        }
    }
}
