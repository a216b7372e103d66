mod support;

use glam::Vec3;
use maud_editor::mirror::CgmPhysics;
use maud_editor::physics::{
    JointId, PcoId, PcoKind, ShapeId, object_name, parse_id, parse_object_name,
};
use maud_editor::selection::Selections;
use proptest::prelude::*;
use support::{ragdoll_chain, rigid_box};

fn kind() -> impl Strategy<Value = PcoKind> {
    prop_oneof![
        Just(PcoKind::RigidBody),
        Just(PcoKind::Ghost),
        Just(PcoKind::Character),
    ]
}

proptest! {
    #[test]
    fn shape_names_round_trip(raw in any::<u64>()) {
        let id = ShapeId::from_raw(raw);
        prop_assert_eq!(id.name().parse::<ShapeId>(), Ok(id));
        prop_assert_eq!(parse_id(&id.to_string()), Ok(raw));
        let plus_prefixed = format!("+{id}");
        let zero_prefixed = format!("0{id}");
        prop_assert!(parse_id(&plus_prefixed).is_err());
        prop_assert!(parse_id(&zero_prefixed).is_err());
    }

    #[test]
    fn object_names_round_trip(raw in any::<u64>(), kind in kind()) {
        let id = PcoId::from_raw(raw);
        let name = object_name(kind, id);
        prop_assert!(name.starts_with(kind.label()));
        prop_assert_eq!(parse_object_name(&name), Ok((kind, id)));
    }

    #[test]
    fn joint_names_round_trip(raw in any::<u64>()) {
        let id = JointId::from_raw(raw);
        prop_assert_eq!(id.name().parse::<JointId>(), Ok(id));
    }

    #[test]
    fn next_undoes_previous(boxes in 1usize..5, links in 1usize..4, pick in any::<prop::sample::Index>()) {
        let mut physics = CgmPhysics::new();
        for index in 0..boxes {
            physics
                .add_control(&rigid_box(Vec3::splat(0.5 + index as f32)), "box")
                .unwrap();
        }
        physics.add_control(&ragdoll_chain(links), "chain").unwrap();
        let mut selection = Selections::default();

        let shapes = physics.list_shapes();
        let start = shapes[pick.index(shapes.len())];
        selection.shape.select(&physics, start);
        selection.shape.select_previous(&physics);
        selection.shape.select_next(&physics);
        prop_assert_eq!(selection.shape.get(), Some(start));

        let names = physics.list_object_names("");
        let start = names[pick.index(names.len())].clone();
        selection.pco.select_name(&physics, &start);
        selection.pco.select_next(&physics);
        selection.pco.select_previous(&physics);
        prop_assert_eq!(selection.pco.name(&physics), Some(start));
    }
}

#[test]
fn malformed_names_select_nothing() {
    let mut physics = CgmPhysics::new();
    physics.add_control(&rigid_box(Vec3::ONE), "box").unwrap();
    let mut selection = Selections::default();

    selection.shape.select_name(&physics, "not-hex");
    selection.pco.select_name(&physics, "Rigid:");
    selection.joint.select_name(&physics, "ffffffffff");
    assert_eq!(selection.shape.get(), None);
    assert_eq!(selection.pco.get(), None);
    assert_eq!(selection.joint.get(), None);
}

#[test]
fn wrong_kind_or_padded_names_select_nothing() {
    let mut physics = CgmPhysics::new();
    physics.add_control(&rigid_box(Vec3::ONE), "box").unwrap();
    let mut selection = Selections::default();
    let rigid = physics.list_object_names("Rigid")[0].clone();
    let hex = rigid.trim_start_matches("Rigid:").to_string();
    let shape = physics.list_shape_names("")[0].clone();

    selection.pco.select_name(&physics, &format!("Ghost:{hex}"));
    assert_eq!(selection.pco.get(), None);
    selection.pco.select_name(&physics, &format!("Rigid:+{hex}"));
    assert_eq!(selection.pco.get(), None);
    selection.shape.select_name(&physics, &format!("+{shape}"));
    selection.shape.select_name(&physics, &format!("0{shape}"));
    assert_eq!(selection.shape.get(), None);

    selection.pco.select_name(&physics, &rigid);
    assert_eq!(selection.pco.name(&physics), Some(rigid));
}
