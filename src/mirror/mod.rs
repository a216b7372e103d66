pub mod identity;

pub use identity::IdentityMap;

use crate::physics::{
    CollisionObject, CollisionShape, ControlSpec, JointId, PcoId, PhysicsControl, PhysicsError,
    PhysicsLink, PhysicsSpace, RigidBodyParameter, ShapeId, Transform, UserId, object_name, parse_id,
    parse_object_name, require_non_negative,
};
use crate::selection::Selections;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MirrorError {
    #[error("model entity {0} is already associated")]
    AlreadyAssociated(String),
    #[error("view entity {0} is already associated")]
    ViewAlreadyAssociated(String),
    #[error("model entity {0} has no view counterpart")]
    NotAssociated(String),
    #[error("no physics control {0}")]
    NoSuchControl(ControlId),
    #[error("model and view disagree: {0}")]
    Inconsistent(String),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Identifies a physics control added to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId(pub u32);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One link of a ragdoll control, addressed by its position in the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId {
    pub control: ControlId,
    pub index: usize,
}

/// A control's model-side and view-side instantiations.
#[derive(Debug, Clone, PartialEq)]
pub struct MirroredControl {
    pub label: String,
    pub model: PhysicsControl,
    pub view: PhysicsControl,
}

/// Physics state of one scene: an editable model space, a live view space,
/// and the identity maps pairing their entities. Every mutation goes through
/// this type so both sides change together.
#[derive(Clone, Default)]
pub struct CgmPhysics {
    model: PhysicsSpace,
    view: PhysicsSpace,
    objects: IdentityMap<PcoId, PcoId>,
    joints: IdentityMap<JointId, JointId>,
    shapes: IdentityMap<ShapeId, ShapeId>,
    controls: BTreeMap<ControlId, MirroredControl>,
    next_control: u32,
}

impl CgmPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &PhysicsSpace {
        &self.model
    }

    pub fn view(&self) -> &PhysicsSpace {
        &self.view
    }

    pub fn control(&self, id: ControlId) -> Option<&MirroredControl> {
        self.controls.get(&id)
    }

    pub fn controls(&self) -> impl Iterator<Item = (ControlId, &MirroredControl)> + '_ {
        self.controls.iter().map(|(id, control)| (*id, control))
    }

    /// Controls in ascending id order.
    pub fn list_controls(&self) -> Vec<ControlId> {
        self.controls.keys().copied().collect()
    }

    pub fn count_controls(&self) -> usize {
        self.controls.len()
    }

    /// `Kind:id`, e.g. `Ragdoll:2`.
    pub fn control_name(&self, id: ControlId) -> Option<String> {
        let control = self.controls.get(&id)?;
        Some(format!("{}:{id}", control.model.kind_label()))
    }

    pub fn list_control_names(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .controls
            .keys()
            .filter_map(|id| self.control_name(*id))
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    /// Inverse of [`CgmPhysics::control_name`]. Only the exact name matches.
    pub fn find_control(&self, name: &str) -> Option<ControlId> {
        let (_, number) = name.split_once(':')?;
        let id = ControlId(number.parse().ok()?);
        (self.control_name(id).as_deref() == Some(name)).then_some(id)
    }

    /// The model side of a ragdoll link.
    pub fn link(&self, id: LinkId) -> Option<&PhysicsLink> {
        self.controls.get(&id.control)?.model.links().get(id.index)
    }

    pub fn find_link(&self, control: ControlId, name: &str) -> Option<LinkId> {
        let index = self.controls.get(&control)?.model.link_index(name)?;
        Some(LinkId { control, index })
    }

    /// Sorted link names of one control starting with `prefix`.
    pub fn list_link_names(&self, control: ControlId, prefix: &str) -> Vec<String> {
        let Some(control) = self.controls.get(&control) else {
            return Vec::new();
        };
        let mut names: Vec<String> = control
            .model
            .links()
            .iter()
            .map(|link| link.name.clone())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    /// Instantiates `spec` in the model, then in the view, and pairs up
    /// every object, joint and fresh shape.
    pub fn add_control(
        &mut self,
        spec: &ControlSpec,
        label: &str,
    ) -> Result<ControlId, MirrorError> {
        spec.validate(&self.model)?;
        for id in spec.existing_shapes() {
            if !self.shapes.contains(id) {
                return Err(MirrorError::NotAssociated(id.name()));
            }
        }

        let model_made = spec.instantiate(&mut self.model, &|id| Some(id))?;
        let shapes = &self.shapes;
        let view_made = spec.instantiate(&mut self.view, &|id| shapes.view_of(id))?;

        let objects = model_made.control.objects();
        for (model, view) in objects.into_iter().zip(view_made.control.objects()) {
            self.objects.associate(view, model)?;
        }
        let joints = model_made.control.joints();
        for (model, view) in joints.into_iter().zip(view_made.control.joints()) {
            self.joints.associate(view, model)?;
        }
        for (model, view) in model_made
            .created_shapes
            .iter()
            .zip(view_made.created_shapes.iter())
        {
            self.shapes.associate(*view, *model)?;
        }

        let id = ControlId(self.next_control);
        self.next_control += 1;
        log::debug!(
            "[physics] added {} control {id} to {label}",
            model_made.control.kind_label()
        );
        self.controls.insert(
            id,
            MirroredControl {
                label: label.to_string(),
                model: model_made.control,
                view: view_made.control,
            },
        );
        Ok(id)
    }

    /// Removes a control from both sides. Selections referencing the control,
    /// its links, joints or objects are cleared, the selected shape is deselected once nothing
    /// uses it, and orphaned shapes are purged.
    pub fn remove_control(
        &mut self,
        id: ControlId,
        selections: &mut Selections,
    ) -> Result<MirroredControl, MirrorError> {
        let control = self
            .controls
            .remove(&id)
            .ok_or(MirrorError::NoSuchControl(id))?;

        for joint in control.model.joints() {
            let view = self.joints.disassociate(joint)?;
            selections.joint.forget(joint);
            self.model.remove_joint(joint)?;
            self.view.remove_joint(view)?;
        }
        selections.control.forget(id);
        selections.link.forget_control(id);
        for pco in control.model.objects() {
            let view = self.objects.disassociate(pco)?;
            selections.pco.forget(pco);
            self.model.remove_object(pco)?;
            self.view.remove_object(view)?;
        }

        if let Some(shape) = selections.shape.get() {
            if self.model.user_set(shape).is_empty() {
                selections.shape.select_none();
            }
        }
        self.purge_orphans();

        log::debug!("[physics] removed control {id} from {}", control.label);
        Ok(control)
    }

    /// Swaps `old` for a copy of `replacement` on both sides, in every
    /// compound and every object that uses it. Returns the new model id, or
    /// `None` when nothing used `old` and so nothing changed.
    pub fn replace_shape(
        &mut self,
        old: ShapeId,
        replacement: CollisionShape,
    ) -> Result<Option<ShapeId>, MirrorError> {
        if replacement.is_compound() {
            return Err(PhysicsError::CompoundNotAllowed.into());
        }
        self.model.require_shape(old)?;
        if self.model.user_set(old).is_empty() {
            return Ok(None);
        }
        let old_view = self.require_view_shape(old)?;

        let new_model = self.model.add_shape(replacement.clone());
        let new_view = self.view.add_shape(replacement);

        self.model.replace_in_compounds(old, new_model);
        self.view.replace_in_compounds(old_view, new_view);
        self.model.replace_in_objects(old, new_model);
        self.view.replace_in_objects(old_view, new_view);

        self.shapes.associate(new_view, new_model)?;
        self.purge_orphans();

        log::debug!("[physics] replaced shape {old} with {new_model}");
        Ok(Some(new_model))
    }

    /// Wraps `child` in a new compound in every object that uses it
    /// directly. Compounds that hold `child` keep it. Returns the compound's
    /// model id, or `None` when no object uses `child` directly.
    pub fn add_parent_compound(
        &mut self,
        child: ShapeId,
        margin: f32,
    ) -> Result<Option<ShapeId>, MirrorError> {
        self.model.require_shape(child)?;
        require_non_negative("margin", margin)?;
        let used_by_object = self
            .model
            .user_set(child)
            .iter()
            .any(|user| matches!(user, UserId::Object(_)));
        if !used_by_object {
            return Ok(None);
        }
        let view_child = self.require_view_shape(child)?;

        let compound = CollisionShape::compound().with_margin(margin);
        let model_parent = self.model.add_shape(compound.clone());
        let view_parent = self.view.add_shape(compound);
        self.shapes.associate(view_parent, model_parent)?;
        self.replace_in_objects_only(child, model_parent)?;
        self.model.add_child(model_parent, child, Transform::IDENTITY)?;
        self.view.add_child(view_parent, view_child, Transform::IDENTITY)?;

        log::debug!("[physics] wrapped shape {child} in compound {model_parent}");
        Ok(Some(model_parent))
    }

    /// Points every object using `old` at `new` on both sides, leaving
    /// compounds alone. Both shapes must already be mirrored. Returns how
    /// many model objects changed.
    pub fn replace_in_objects_only(
        &mut self,
        old: ShapeId,
        new: ShapeId,
    ) -> Result<usize, MirrorError> {
        self.model.require_shape(new)?;
        let old_view = self.require_view_shape(old)?;
        let new_view = self.require_view_shape(new)?;

        let changed = self.model.replace_in_objects(old, new);
        let view_changed = self.view.replace_in_objects(old_view, new_view);
        if changed != view_changed {
            return Err(MirrorError::Inconsistent(format!(
                "shape {old} has {changed} model users but {view_changed} view users"
            )));
        }
        Ok(changed)
    }

    pub fn set_margin(&mut self, shape: ShapeId, margin: f32) -> Result<(), MirrorError> {
        require_non_negative("margin", margin)?;
        let view = self.require_view_shape(shape)?;
        self.model
            .shape_mut(shape)
            .ok_or(PhysicsError::NoSuchShape(shape))?
            .set_margin(margin);
        self.view
            .shape_mut(view)
            .ok_or(PhysicsError::NoSuchShape(view))?
            .set_margin(margin);
        Ok(())
    }

    pub fn set_object_location(&mut self, pco: PcoId, location: Vec3) -> Result<(), MirrorError> {
        self.update_objects(pco, |object| object.location = location)
    }

    pub fn set_object_orientation(
        &mut self,
        pco: PcoId,
        orientation: Quat,
    ) -> Result<(), MirrorError> {
        let orientation = orientation.normalize();
        self.update_objects(pco, |object| object.orientation = orientation)
    }

    pub fn set_rigid_body_parameter(
        &mut self,
        pco: PcoId,
        parameter: RigidBodyParameter,
        value: f32,
    ) -> Result<(), MirrorError> {
        if !self.model.require_object(pco)?.has_mass() {
            return Err(PhysicsError::NotRigidBody(pco).into());
        }
        if !parameter.can_set(value) {
            return Err(PhysicsError::InvalidValue {
                name: parameter.label(),
                value,
            }
            .into());
        }
        self.update_objects(pco, |object| {
            if let Some(params) = object.rigid.as_mut() {
                parameter.set(params, value);
            }
        })
    }

    pub fn count_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn count_joints(&self) -> usize {
        self.joints.len()
    }

    pub fn count_shapes(&self) -> usize {
        self.model.count_shapes()
    }

    pub fn has_object(&self, id: PcoId) -> bool {
        self.objects.contains(id)
    }

    /// True if `name` parses to a shape reachable in the model.
    pub fn has_shape(&self, name: &str) -> bool {
        self.find_shape(name).is_some()
    }

    pub fn find_shape(&self, name: &str) -> Option<ShapeId> {
        let id = ShapeId::from_raw(parse_id(name).ok()?);
        self.model.is_reachable(id).then_some(id)
    }

    pub fn find_object(&self, name: &str) -> Option<PcoId> {
        let (kind, id) = parse_object_name(name).ok()?;
        let object = self.model.object(id)?;
        (self.objects.contains(id) && object.kind == kind).then_some(id)
    }

    pub fn find_joint(&self, name: &str) -> Option<JointId> {
        let id = JointId::from_raw(parse_id(name).ok()?);
        self.joints.contains(id).then_some(id)
    }

    pub fn object_name(&self, id: PcoId) -> Option<String> {
        self.model
            .object(id)
            .map(|object| object_name(object.kind, id))
    }

    /// Display name of a shape or object owner.
    pub fn user_name(&self, user: UserId) -> String {
        match user {
            UserId::Object(pco) => self.object_name(pco).unwrap_or_else(|| pco.name()),
            UserId::Shape(shape) => shape.name(),
        }
    }

    /// Sorted names of model objects starting with `prefix`.
    pub fn list_object_names(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .iter()
            .filter_map(|(model, _)| self.object_name(model))
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    pub fn list_shape_names(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .model
            .shape_ids()
            .into_iter()
            .map(ShapeId::name)
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    pub fn list_joint_names(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .joints
            .iter()
            .map(|(model, _)| model.name())
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    /// Reachable model shapes in ascending id order.
    pub fn list_shapes(&self) -> Vec<ShapeId> {
        self.model.shape_ids()
    }

    /// Model joints in ascending id order.
    pub fn list_joints(&self) -> Vec<JointId> {
        self.joints.iter().map(|(model, _)| model).collect()
    }

    pub fn view_shape(&self, model: ShapeId) -> Option<ShapeId> {
        self.shapes.view_of(model)
    }

    pub fn view_object(&self, model: PcoId) -> Option<PcoId> {
        self.objects.view_of(model)
    }

    pub fn view_joint(&self, model: JointId) -> Option<JointId> {
        self.joints.view_of(model)
    }

    pub fn model_shape(&self, view: ShapeId) -> Option<ShapeId> {
        self.shapes.model_of(view)
    }

    /// Verifies that the view mirrors the model entity by entity.
    pub fn check_consistency(&self) -> Result<(), MirrorError> {
        let inconsistent = |what: String| Err(MirrorError::Inconsistent(what));

        if self.model.count_objects() != self.view.count_objects()
            || self.objects.len() != self.model.count_objects()
        {
            return inconsistent("collision object counts differ".to_string());
        }
        for (model_id, view_id) in self.objects.iter() {
            let (Some(model), Some(view)) = (self.model.object(model_id), self.view.object(view_id))
            else {
                return inconsistent(format!("object {model_id} is missing a side"));
            };
            if self.shapes.view_of(model.shape) != Some(view.shape)
                || model.location != view.location
                || model.orientation != view.orientation
                || model.rigid != view.rigid
            {
                return inconsistent(format!("object {model_id} differs from its view"));
            }
        }

        for (model_id, view_id) in self.joints.iter() {
            let (Some(model), Some(view)) = (self.model.joint(model_id), self.view.joint(view_id))
            else {
                return inconsistent(format!("joint {model_id} is missing a side"));
            };
            let ends_match = self.objects.view_of(model.end_b) == Some(view.end_b)
                && model.end_a.and_then(|a| self.objects.view_of(a)) == view.end_a;
            if !ends_match || model.kind != view.kind {
                return inconsistent(format!("joint {model_id} differs from its view"));
            }
        }

        let model_shapes = self.model.shape_ids();
        if model_shapes.len() != self.view.count_shapes() {
            return inconsistent("reachable shape counts differ".to_string());
        }
        for model_id in model_shapes {
            let Some(view_id) = self.shapes.view_of(model_id) else {
                return inconsistent(format!("shape {model_id} has no view counterpart"));
            };
            let (Some(model), Some(view)) = (self.model.shape(model_id), self.view.shape(view_id))
            else {
                return inconsistent(format!("shape {model_id} is missing a side"));
            };
            let children_match = model.children().len() == view.children().len()
                && model.children().iter().zip(view.children()).all(|(m, v)| {
                    self.shapes.view_of(m.shape) == Some(v.shape) && m.offset == v.offset
                });
            let same_geometry = model.kind_label() == view.kind_label()
                && model.margin() == view.margin()
                && (model.is_compound() || model.kind() == view.kind());
            if !children_match || !same_geometry {
                return inconsistent(format!("shape {model_id} differs from its view"));
            }
        }
        Ok(())
    }

    fn require_view_shape(&self, model: ShapeId) -> Result<ShapeId, MirrorError> {
        self.shapes
            .view_of(model)
            .ok_or_else(|| MirrorError::NotAssociated(model.name()))
    }

    fn update_objects(
        &mut self,
        pco: PcoId,
        mut update: impl FnMut(&mut CollisionObject),
    ) -> Result<(), MirrorError> {
        let view = self
            .objects
            .view_of(pco)
            .ok_or_else(|| MirrorError::NotAssociated(pco.name()))?;
        update(
            self.model
                .object_mut(pco)
                .ok_or(PhysicsError::NoSuchObject(pco))?,
        );
        update(
            self.view
                .object_mut(view)
                .ok_or(PhysicsError::NoSuchObject(view))?,
        );
        Ok(())
    }

    /// Drops unreachable shapes from both spaces and from the shape map.
    fn purge_orphans(&mut self) {
        let removed: BTreeSet<ShapeId> = self.model.purge_orphans().into_iter().collect();
        for id in &removed {
            let _ = self.shapes.disassociate(*id);
        }
        let view_removed = self.view.purge_orphans();
        if !removed.is_empty() || !view_removed.is_empty() {
            log::debug!(
                "[physics] purged {} model and {} view shapes",
                removed.len(),
                view_removed.len()
            );
        }
    }
}
