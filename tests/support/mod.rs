#![allow(dead_code)]

use glam::Vec3;
use maud_editor::physics::{
    Axis, BodySpec, ChildSpec, CollisionShape, ControlSpec, JointKind, LinkSpec, RigidBodyParams,
    ShapeId, ShapeSpec, Transform,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn body(shape: ShapeSpec) -> BodySpec {
    BodySpec {
        shape,
        transform: Transform::IDENTITY,
    }
}

pub fn rigid_box(half_extents: Vec3) -> ControlSpec {
    ControlSpec::RigidBody {
        body: body(ShapeSpec::Primitive(CollisionShape::new_box(half_extents))),
        params: RigidBodyParams::default(),
    }
}

pub fn rigid_sharing(shape: ShapeId) -> ControlSpec {
    ControlSpec::RigidBody {
        body: body(ShapeSpec::Existing(shape)),
        params: RigidBodyParams::default(),
    }
}

/// A ghost whose compound holds a box at +X and a capsule at the origin.
pub fn ghost_compound() -> ControlSpec {
    ControlSpec::Ghost {
        body: body(ShapeSpec::Compound(vec![
            ChildSpec {
                shape: ShapeSpec::Primitive(CollisionShape::new_box(Vec3::splat(0.5))),
                offset: Transform::from_location(Vec3::X),
            },
            ChildSpec {
                shape: ShapeSpec::Primitive(CollisionShape::capsule(0.25, 1.0, Axis::Y)),
                offset: Transform::IDENTITY,
            },
        ])),
    }
}

/// A chain of `links` spheres, each jointed to the one before it.
pub fn ragdoll_chain(links: usize) -> ControlSpec {
    let links = (0..links)
        .map(|index| LinkSpec {
            name: format!("bone{index}"),
            body: BodySpec {
                shape: ShapeSpec::Primitive(CollisionShape::sphere(0.2)),
                transform: Transform::from_location(Vec3::Y * index as f32),
            },
            params: RigidBodyParams::default(),
            parent: index.checked_sub(1),
            joint: JointKind::Cone,
            pivot: Vec3::new(0.0, -0.5, 0.0),
        })
        .collect();
    ControlSpec::Ragdoll { links }
}
