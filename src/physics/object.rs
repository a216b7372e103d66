use super::{ParseIdError, PcoId, ShapeId, Transform, parse_id};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PcoKind {
    RigidBody,
    Ghost,
    Character,
}

impl PcoKind {
    pub const ALL: [PcoKind; 3] = [PcoKind::RigidBody, PcoKind::Ghost, PcoKind::Character];

    pub fn from_label(label: &str) -> Option<PcoKind> {
        PcoKind::ALL.into_iter().find(|kind| kind.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            PcoKind::RigidBody => "Rigid",
            PcoKind::Ghost => "Ghost",
            PcoKind::Character => "Character",
        }
    }
}

/// Builds the display name of a collision object, e.g. `Rigid:100000003`.
pub fn object_name(kind: PcoKind, id: PcoId) -> String {
    format!("{}:{}", kind.label(), id.name())
}

/// Inverse of [`object_name`]: splits `Kind:hex` into its kind and id.
pub fn parse_object_name(name: &str) -> Result<(PcoKind, PcoId), ParseIdError> {
    let (label, hex) = name
        .split_once(':')
        .ok_or_else(|| ParseIdError::UnknownKind(name.to_string()))?;
    let kind = PcoKind::from_label(label)
        .ok_or_else(|| ParseIdError::UnknownKind(name.to_string()))?;
    let id = PcoId::from_raw(parse_id(hex)?);
    Ok((kind, id))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyParams {
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub linear_sleep: f32,
    pub angular_sleep: f32,
    pub gravity: Vec3,
}

impl Default for RigidBodyParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            friction: 0.5,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            linear_sleep: 0.8,
            angular_sleep: 1.0,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RigidBodyParameter {
    AngularDamping,
    AngularSleep,
    Friction,
    GravityX,
    GravityY,
    GravityZ,
    LinearDamping,
    LinearSleep,
    Mass,
    Restitution,
}

impl RigidBodyParameter {
    pub const ALL: [RigidBodyParameter; 10] = [
        RigidBodyParameter::AngularDamping,
        RigidBodyParameter::AngularSleep,
        RigidBodyParameter::Friction,
        RigidBodyParameter::GravityX,
        RigidBodyParameter::GravityY,
        RigidBodyParameter::GravityZ,
        RigidBodyParameter::LinearDamping,
        RigidBodyParameter::LinearSleep,
        RigidBodyParameter::Mass,
        RigidBodyParameter::Restitution,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RigidBodyParameter::AngularDamping => "AngularDamping",
            RigidBodyParameter::AngularSleep => "AngularSleep",
            RigidBodyParameter::Friction => "Friction",
            RigidBodyParameter::GravityX => "GravityX",
            RigidBodyParameter::GravityY => "GravityY",
            RigidBodyParameter::GravityZ => "GravityZ",
            RigidBodyParameter::LinearDamping => "LinearDamping",
            RigidBodyParameter::LinearSleep => "LinearSleep",
            RigidBodyParameter::Mass => "Mass",
            RigidBodyParameter::Restitution => "Restitution",
        }
    }

    pub fn read(self, params: &RigidBodyParams) -> f32 {
        match self {
            RigidBodyParameter::AngularDamping => params.angular_damping,
            RigidBodyParameter::AngularSleep => params.angular_sleep,
            RigidBodyParameter::Friction => params.friction,
            RigidBodyParameter::GravityX => params.gravity.x,
            RigidBodyParameter::GravityY => params.gravity.y,
            RigidBodyParameter::GravityZ => params.gravity.z,
            RigidBodyParameter::LinearDamping => params.linear_damping,
            RigidBodyParameter::LinearSleep => params.linear_sleep,
            RigidBodyParameter::Mass => params.mass,
            RigidBodyParameter::Restitution => params.restitution,
        }
    }

    pub fn can_set(self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            RigidBodyParameter::AngularDamping | RigidBodyParameter::LinearDamping => {
                (0.0..=1.0).contains(&value)
            }
            RigidBodyParameter::GravityX
            | RigidBodyParameter::GravityY
            | RigidBodyParameter::GravityZ => true,
            RigidBodyParameter::AngularSleep
            | RigidBodyParameter::LinearSleep
            | RigidBodyParameter::Friction
            | RigidBodyParameter::Mass
            | RigidBodyParameter::Restitution => value >= 0.0,
        }
    }

    pub fn set(self, params: &mut RigidBodyParams, value: f32) {
        let slot = match self {
            RigidBodyParameter::AngularDamping => &mut params.angular_damping,
            RigidBodyParameter::AngularSleep => &mut params.angular_sleep,
            RigidBodyParameter::Friction => &mut params.friction,
            RigidBodyParameter::GravityX => &mut params.gravity.x,
            RigidBodyParameter::GravityY => &mut params.gravity.y,
            RigidBodyParameter::GravityZ => &mut params.gravity.z,
            RigidBodyParameter::LinearDamping => &mut params.linear_damping,
            RigidBodyParameter::LinearSleep => &mut params.linear_sleep,
            RigidBodyParameter::Mass => &mut params.mass,
            RigidBodyParameter::Restitution => &mut params.restitution,
        };
        *slot = value;
    }
}

impl fmt::Display for RigidBodyParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionObject {
    pub kind: PcoKind,
    pub shape: ShapeId,
    pub location: Vec3,
    pub orientation: Quat,
    pub rigid: Option<RigidBodyParams>,
}

impl CollisionObject {
    pub fn rigid_body(shape: ShapeId, params: RigidBodyParams) -> Self {
        Self {
            kind: PcoKind::RigidBody,
            shape,
            location: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            rigid: Some(params),
        }
    }

    pub fn ghost(shape: ShapeId) -> Self {
        Self {
            kind: PcoKind::Ghost,
            shape,
            location: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            rigid: None,
        }
    }

    pub fn character(shape: ShapeId) -> Self {
        Self {
            kind: PcoKind::Character,
            ..Self::ghost(shape)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.location = transform.location;
        self.orientation = transform.rotation;
        self
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.location, self.orientation)
    }

    pub fn has_mass(&self) -> bool {
        self.rigid.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JointKind {
    Point,
    Hinge,
    Cone,
    #[default]
    SixDof,
    Slider,
}

impl JointKind {
    pub fn label(self) -> &'static str {
        match self {
            JointKind::Point => "Point",
            JointKind::Hinge => "Hinge",
            JointKind::Cone => "Cone",
            JointKind::SixDof => "SixDof",
            JointKind::Slider => "Slider",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointEnd {
    A,
    B,
}

/// Joint between two collision objects. A single-ended joint pins `end_b`
/// to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub kind: JointKind,
    pub end_a: Option<PcoId>,
    pub end_b: PcoId,
    pub pivot_a: Vec3,
    pub pivot_b: Vec3,
}

impl Joint {
    pub fn new(kind: JointKind, end_a: Option<PcoId>, end_b: PcoId) -> Self {
        Self {
            kind,
            end_a,
            end_b,
            pivot_a: Vec3::ZERO,
            pivot_b: Vec3::ZERO,
        }
    }

    pub fn body(&self, end: JointEnd) -> Option<PcoId> {
        match end {
            JointEnd::A => self.end_a,
            JointEnd::B => Some(self.end_b),
        }
    }

    pub fn uses_body(&self, body: PcoId) -> bool {
        self.end_b == body || self.end_a == Some(body)
    }
}
