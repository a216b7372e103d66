pub mod arena;
pub mod control;
pub mod object;
pub mod shape;
pub mod space;

pub use arena::{Arena, ArenaError, Handle};
pub use control::{
    BodySpec, ChildSpec, ControlSpec, Instantiation, LinkSpec, PhysicsControl, PhysicsLink,
    ShapeSpec,
};
pub use object::{
    CollisionObject, Joint, JointEnd, JointKind, PcoKind, RigidBodyParameter, RigidBodyParams,
    object_name, parse_object_name,
};
pub use shape::{Axis, ChildShape, CollisionShape, DEFAULT_MARGIN, ShapeKind, ShapeParameter};
pub use space::{PhysicsSpace, UserId};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! physics_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Handle);

        impl $name {
            pub const fn from_handle(handle: Handle) -> Self {
                Self(handle)
            }

            pub const fn handle(self) -> Handle {
                self.0
            }

            pub const fn to_raw(self) -> u64 {
                self.0.to_raw()
            }

            pub const fn from_raw(raw: u64) -> Self {
                Self(Handle::from_raw(raw))
            }

            /// Lowercase hexadecimal form of the raw id.
            pub fn name(self) -> String {
                format!("{:x}", self.to_raw())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:x}", self.to_raw())
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                parse_id(name).map(Self::from_raw)
            }
        }
    };
}

physics_id!(
    /// Identifies a collision shape within one physics space.
    ShapeId
);
physics_id!(
    /// Identifies a collision object (rigid body, ghost or character).
    PcoId
);
physics_id!(
    /// Identifies a physics joint.
    JointId
);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("empty id")]
    Empty,
    #[error("{0:?} is not a hexadecimal id")]
    NotHex(String),
    #[error("{0:?} is not written in lowercase hex without padding")]
    NotCanonical(String),
    #[error("{0:?} does not start with a collision object kind")]
    UnknownKind(String),
}

/// Parses the hexadecimal form produced by the `name()` of any id type.
/// Only that exact form is accepted: no sign, padding, whitespace or
/// uppercase digits.
pub fn parse_id(name: &str) -> Result<u64, ParseIdError> {
    if name.is_empty() {
        return Err(ParseIdError::Empty);
    }
    let raw = u64::from_str_radix(name, 16).map_err(|_| ParseIdError::NotHex(name.to_string()))?;
    if format!("{raw:x}") != name {
        return Err(ParseIdError::NotCanonical(name.to_string()));
    }
    Ok(raw)
}

/// Rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        location: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(location: Vec3, rotation: Quat) -> Self {
        Self { location, rotation }
    }

    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            rotation: Quat::IDENTITY,
        }
    }

    /// Expresses this local transform in the parent's frame.
    pub fn combine_with_parent(self, parent: &Transform) -> Transform {
        Transform {
            location: parent.rotation * self.location + parent.location,
            rotation: (parent.rotation * self.rotation).normalize(),
        }
    }

    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: f32) -> bool {
        self.location.abs_diff_eq(other.location, max_abs_diff)
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PhysicsError {
    #[error("no collision shape {0}")]
    NoSuchShape(ShapeId),
    #[error("no collision object {0}")]
    NoSuchObject(PcoId),
    #[error("no physics joint {0}")]
    NoSuchJoint(JointId),
    #[error("compound shapes are not allowed here")]
    CompoundNotAllowed,
    #[error("collision shape {0} is not a compound shape")]
    NotCompound(ShapeId),
    #[error("adding {child} to compound {parent} would create a cycle")]
    CyclicCompound { parent: ShapeId, child: ShapeId },
    #[error("invalid value {value} for {name}")]
    InvalidValue { name: &'static str, value: f32 },
    #[error("link {link} names parent {parent}, which is not an earlier link")]
    InvalidLinkParent { link: usize, parent: usize },
    #[error("a ragdoll needs at least one link")]
    EmptyRagdoll,
    #[error("more than one ragdoll link is named {0:?}")]
    DuplicateLinkName(String),
    #[error("collision object {0} is not a rigid body")]
    NotRigidBody(PcoId),
}

pub(crate) fn require_non_negative(name: &'static str, value: f32) -> Result<f32, PhysicsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PhysicsError::InvalidValue { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn shape_id_name_is_plain_hex() {
        let id = ShapeId::from_handle(Handle::new(0x2a, 1));
        assert_eq!(id.name(), "10000002a");
        assert_eq!(id.to_string(), "10000002a");
        assert_eq!("10000002a".parse::<ShapeId>(), Ok(id));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert_eq!(parse_id(""), Err(ParseIdError::Empty));
        assert!(matches!(parse_id("xyz"), Err(ParseIdError::NotHex(_))));
        assert_eq!(parse_id("ff"), Ok(255));
    }

    #[test]
    fn parse_id_accepts_only_the_canonical_form() {
        for name in ["+0", "+ff", "FF", "0ff", "00", " ff", "ff\n"] {
            assert!(parse_id(name).is_err(), "{name:?} should be rejected");
        }
        assert_eq!(parse_id("0"), Ok(0));
        assert!("+0".parse::<ShapeId>().is_err());
    }

    #[test]
    fn combine_with_parent_rotates_then_translates() {
        let parent = Transform::new(Vec3::new(1.0, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2));
        let child = Transform::from_location(Vec3::new(1.0, 0.0, 0.0));

        let world = child.combine_with_parent(&parent);
        assert!(world.location.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
        assert!(world.rotation.abs_diff_eq(parent.rotation, 1e-5));
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(require_non_negative("radius", -1.0).is_err());
        assert!(require_non_negative("radius", f32::NAN).is_err());
        assert_eq!(require_non_negative("radius", 0.0), Ok(0.0));
    }
}
