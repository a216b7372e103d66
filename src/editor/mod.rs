pub mod cgm;
pub mod config;
pub mod edit_state;
pub mod history;

pub use cgm::Cgm;
pub use config::{ConfigError, EditorConfig};
pub use edit_state::{ContinuousEdit, EditState};
pub use history::{Checkpoint, History};

use crate::mirror::{CgmPhysics, ControlId, MirrorError};
use crate::physics::{
    ControlSpec, PcoId, PhysicsError, RigidBodyParameter, ShapeId, ShapeParameter, UserId,
};
use crate::selection::Selections;
use glam::{Quat, Vec3};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    #[error("no {0} is selected")]
    NothingSelected(&'static str),
    #[error("{parameter} cannot be set on a {kind} shape")]
    NotSettable {
        parameter: ShapeParameter,
        kind: &'static str,
    },
    #[error("a {kind} shape cannot take {parameter} = {value}")]
    UnsupportedResize {
        parameter: ShapeParameter,
        kind: &'static str,
        value: f32,
    },
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

fn rejected(err: EditError) -> EditError {
    log::warn!("[edit] rejected: {err}");
    err
}

/// What a checkpoint saves: the scene and its edit state.
#[derive(Clone)]
pub struct Snapshot {
    pub cgm: Cgm,
    pub edit_state: EditState,
}

/// An editing session over one scene. Every mutation of persisted state
/// goes through here, is preceded by a checkpoint (subject to auto-add and
/// continuous-edit coalescing) and records one history event.
pub struct EditableCgm {
    cgm: Cgm,
    edit_state: EditState,
    history: History<Snapshot>,
    config: EditorConfig,
}

impl Default for EditableCgm {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditableCgm {
    pub fn new(config: EditorConfig) -> Self {
        let mut history = History::new().with_max_checkpoints(config.max_checkpoints);
        history.set_auto_add(config.auto_add_checkpoints);
        Self {
            cgm: Cgm::new(),
            edit_state: EditState::new(),
            history,
            config,
        }
    }

    pub fn cgm(&self) -> &Cgm {
        &self.cgm
    }

    pub fn physics(&self) -> &CgmPhysics {
        self.cgm.physics()
    }

    pub fn selection(&self) -> &Selections {
        self.cgm.selection()
    }

    /// See [`Cgm::selecting`]. Selection changes are not edits.
    pub fn selecting(&mut self) -> (&CgmPhysics, &mut Selections) {
        self.cgm.selecting()
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History<Snapshot> {
        &mut self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit_state
    }

    pub fn count_unsaved_edits(&self) -> usize {
        self.edit_state.count_unsaved_edits()
    }

    pub fn add_checkpoint(&mut self) -> usize {
        self.edit_state.pre_checkpoint();
        let snapshot = self.snapshot();
        self.history.add_checkpoint(snapshot)
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        let restored = self.history.undo(&current);
        self.restore(restored)
    }

    pub fn redo(&mut self) -> bool {
        let restored = self.history.redo();
        self.restore(restored)
    }

    pub fn redo_all(&mut self) -> bool {
        let restored = self.history.redo_all();
        self.restore(restored)
    }

    /// Marks the scene as saved.
    pub fn mark_pristine(&mut self, description: &str) {
        self.edit_state.set_pristine();
        self.history.add_event(description);
    }

    pub fn add_control(
        &mut self,
        spec: &ControlSpec,
        label: &str,
    ) -> Result<ControlId, EditError> {
        spec.validate(self.cgm.physics.model())
            .map_err(|err| rejected(err.into()))?;

        self.auto_checkpoint();
        let id = self.cgm.physics.add_control(spec, label)?;
        self.set_edited(format!("add physics control to {label}"));
        Ok(id)
    }

    pub fn remove_control(&mut self, id: ControlId) -> Result<(), EditError> {
        if self.cgm.physics.control(id).is_none() {
            return Err(rejected(MirrorError::NoSuchControl(id).into()));
        }

        self.auto_checkpoint();
        self.cgm
            .physics
            .remove_control(id, &mut self.cgm.selection)?;
        self.set_edited(format!("remove physics control {id}"));
        Ok(())
    }

    /// Removes the selected physics control and returns its id.
    pub fn delete_selected_control(&mut self) -> Result<ControlId, EditError> {
        let id = self
            .cgm
            .selection
            .control
            .id(&self.cgm.physics)
            .ok_or_else(|| rejected(EditError::NothingSelected("physics control")))?;
        self.remove_control(id)?;
        self.cgm.selection.control.select_none();
        self.cgm.selection.link.select_none();
        Ok(id)
    }

    /// Alters a parameter of the selected shape. Margin changes in place;
    /// size changes replace the shape everywhere it is used and select the
    /// replacement. Setting the current value does nothing.
    pub fn set_shape_parameter(
        &mut self,
        parameter: ShapeParameter,
        value: f32,
    ) -> Result<(), EditError> {
        let physics = &self.cgm.physics;
        let id = self
            .cgm
            .selection
            .shape
            .id(physics)
            .ok_or_else(|| rejected(EditError::NothingSelected("collision shape")))?;
        let shape = physics.model().require_shape(id)?;
        if !parameter.can_set(shape) {
            return Err(rejected(EditError::NotSettable {
                parameter,
                kind: shape.kind_label(),
            }));
        }
        if !value.is_finite() || value < parameter.min_value() || value > parameter.max_value() {
            return Err(rejected(
                PhysicsError::InvalidValue {
                    name: parameter.label(),
                    value,
                }
                .into(),
            ));
        }
        if parameter.read(shape) == value {
            return Ok(());
        }

        if parameter.is_in_place() {
            self.auto_checkpoint();
            self.cgm.physics.set_margin(id, value)?;
            self.set_edited(format!("change shape's margin to {value}"));
            return Ok(());
        }

        let replacement = parameter.resized(shape, value)?.ok_or_else(|| {
            rejected(EditError::UnsupportedResize {
                parameter,
                kind: shape.kind_label(),
                value,
            })
        })?;
        let old_name = id.name();
        let continuing = self
            .edit_state
            .is_continuation(&ContinuousEdit::ShapeSize(old_name.clone()));
        if !continuing {
            self.auto_checkpoint();
        }

        match self.cgm.physics.replace_shape(id, replacement)? {
            Some(new_id) => {
                self.cgm.selection.shape.select(&self.cgm.physics, new_id);
                let new_name = new_id.name();
                if continuing {
                    self.edit_state.replace_for_resize(&old_name, &new_name);
                } else if self.edit_state.set_edited_shape_size(&new_name) {
                    self.history
                        .add_event(format!("resize collision shape {old_name}"));
                }
            }
            None => self.cgm.selection.shape.select_none(),
        }
        Ok(())
    }

    /// Wraps the selected shape in a new compound shape in every collision
    /// object that uses it, and selects the compound. Returns `None`, without
    /// recording an edit, when no object uses the shape directly.
    pub fn add_parent_shape(&mut self) -> Result<Option<ShapeId>, EditError> {
        let physics = &self.cgm.physics;
        let id = self
            .cgm
            .selection
            .shape
            .id(physics)
            .ok_or_else(|| rejected(EditError::NothingSelected("collision shape")))?;
        if physics.model().require_shape(id)?.is_compound() {
            return Err(rejected(PhysicsError::CompoundNotAllowed.into()));
        }
        let used_by_object = physics
            .model()
            .user_set(id)
            .iter()
            .any(|user| matches!(user, UserId::Object(_)));
        if !used_by_object {
            return Ok(None);
        }

        self.auto_checkpoint();
        let parent = self
            .cgm
            .physics
            .add_parent_compound(id, self.config.default_margin)?;
        if let Some(parent) = parent {
            self.cgm.selection.shape.select(&self.cgm.physics, parent);
            self.set_edited("replace collision shape with a compound shape".to_string());
        }
        Ok(parent)
    }

    pub fn set_object_location(&mut self, location: Vec3) -> Result<(), EditError> {
        if !location.is_finite() {
            return Err(rejected(EditError::NonFinite("location")));
        }
        let pco = self.selected_pco()?;
        self.reposition(pco, |physics| physics.set_object_location(pco, location))
    }

    pub fn set_object_orientation(&mut self, orientation: Quat) -> Result<(), EditError> {
        if !orientation.is_finite() || orientation.length_squared() == 0.0 {
            return Err(rejected(EditError::NonFinite("orientation")));
        }
        let pco = self.selected_pco()?;
        self.reposition(pco, |physics| physics.set_object_orientation(pco, orientation))
    }

    pub fn set_rigid_body_parameter(
        &mut self,
        parameter: RigidBodyParameter,
        value: f32,
    ) -> Result<(), EditError> {
        let pco = self.selected_pco()?;
        let physics = &self.cgm.physics;
        let Some(params) = physics.model().require_object(pco)?.rigid else {
            return Err(rejected(PhysicsError::NotRigidBody(pco).into()));
        };
        if !parameter.can_set(value) {
            return Err(rejected(
                PhysicsError::InvalidValue {
                    name: parameter.label(),
                    value,
                }
                .into(),
            ));
        }
        if parameter.read(&params) == value {
            return Ok(());
        }
        let name = physics.object_name(pco).unwrap_or_else(|| pco.name());

        self.auto_checkpoint();
        self.cgm
            .physics
            .set_rigid_body_parameter(pco, parameter, value)?;
        self.set_edited(format!("set {name}.{parameter} = {value}"));
        Ok(())
    }

    fn selected_pco(&self) -> Result<PcoId, EditError> {
        self.cgm
            .selection
            .pco
            .id(&self.cgm.physics)
            .ok_or_else(|| rejected(EditError::NothingSelected("collision object")))
    }

    fn reposition(
        &mut self,
        pco: PcoId,
        apply: impl FnOnce(&mut CgmPhysics) -> Result<(), MirrorError>,
    ) -> Result<(), EditError> {
        let name = self
            .cgm
            .physics
            .object_name(pco)
            .unwrap_or_else(|| pco.name());
        let key = ContinuousEdit::PhysicsPosition(name.clone());
        if !self.edit_state.is_continuation(&key) {
            self.auto_checkpoint();
        }
        apply(&mut self.cgm.physics)?;
        if self.edit_state.set_edited_physics_position(&name) {
            self.history
                .add_event(format!("reposition collision object {name}"));
        }
        Ok(())
    }

    fn set_edited(&mut self, description: String) {
        self.edit_state.set_edited();
        self.history.add_event(description);
    }

    fn auto_checkpoint(&mut self) {
        let Self {
            cgm,
            edit_state,
            history,
            ..
        } = self;
        history.auto_add(|| {
            edit_state.pre_checkpoint();
            Snapshot {
                cgm: cgm.clone(),
                edit_state: edit_state.clone(),
            }
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cgm: self.cgm.clone(),
            edit_state: self.edit_state.clone(),
        }
    }

    fn restore(&mut self, snapshot: Option<Snapshot>) -> bool {
        match snapshot {
            Some(snapshot) => {
                self.cgm = snapshot.cgm;
                self.edit_state = snapshot.edit_state;
                true
            }
            None => false,
        }
    }
}
