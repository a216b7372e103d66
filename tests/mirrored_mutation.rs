mod support;

use glam::Vec3;
use maud_editor::editor::EditableCgm;
use maud_editor::mirror::{CgmPhysics, ControlId};
use maud_editor::physics::{CollisionShape, Transform, UserId};
use maud_editor::selection::Selections;
use support::{ghost_compound, init_logging, ragdoll_chain, rigid_box, rigid_sharing};

#[test]
fn replacing_a_single_user_shape_updates_both_sides() {
    init_logging();
    let mut physics = CgmPhysics::new();
    let control = physics.add_control(&rigid_box(Vec3::ONE), "crate").unwrap();
    let pco = physics.control(control).unwrap().model.objects()[0];
    let old = physics.list_shapes()[0];
    let old_view = physics.view_shape(old).unwrap();

    let new = physics
        .replace_shape(old, CollisionShape::sphere(2.0))
        .unwrap()
        .expect("shape had a user");

    let view_pco = physics.view_object(pco).unwrap();
    assert_eq!(physics.model().object(pco).unwrap().shape, new);
    assert_eq!(
        Some(physics.view().object(view_pco).unwrap().shape),
        physics.view_shape(new)
    );
    assert!(!physics.model().is_reachable(old));
    assert!(!physics.view().is_reachable(old_view));
    assert_eq!(physics.count_shapes(), 1);
    physics.check_consistency().unwrap();
}

#[test]
fn replacing_a_compound_child_keeps_its_offset_and_slot() {
    let mut physics = CgmPhysics::new();
    physics.add_control(&ghost_compound(), "sentinel").unwrap();
    let compound = physics
        .list_shapes()
        .into_iter()
        .find(|id| physics.model().shape(*id).is_some_and(CollisionShape::is_compound))
        .unwrap();
    let first = physics.model().shape(compound).unwrap().children()[0].shape;

    let new = physics
        .replace_shape(first, CollisionShape::sphere(0.3))
        .unwrap()
        .unwrap();

    let children = physics.model().shape(compound).unwrap().children();
    assert_eq!(children[0].shape, new);
    assert_eq!(children[0].offset, Transform::from_location(Vec3::X));
    let view_children = physics
        .view()
        .shape(physics.view_shape(compound).unwrap())
        .unwrap()
        .children();
    assert_eq!(Some(view_children[0].shape), physics.view_shape(new));
    physics.check_consistency().unwrap();
}

#[test]
fn unused_shape_cannot_be_replaced() {
    let mut physics = CgmPhysics::new();
    let control = physics.add_control(&rigid_box(Vec3::ONE), "crate").unwrap();
    let shape = physics.list_shapes()[0];
    physics
        .remove_control(control, &mut Selections::default())
        .unwrap();

    assert!(physics.replace_shape(shape, CollisionShape::sphere(1.0)).is_err());
    assert_eq!(physics.count_shapes(), 0);
}

#[test]
fn shared_shape_stays_selected_until_its_last_user_goes() {
    init_logging();
    let mut editor = EditableCgm::default();
    let first = editor.add_control(&rigid_box(Vec3::ONE), "a").unwrap();
    let shape = editor.physics().list_shapes()[0];
    let second = editor.add_control(&rigid_sharing(shape), "b").unwrap();
    {
        let (physics, selection) = editor.selecting();
        assert!(selection.shape.select(physics, shape));
        assert_eq!(selection.shape.user_set(physics).len(), 2);
    }

    editor.remove_control(first).unwrap();
    assert_eq!(editor.selection().shape.get(), Some(shape));

    editor.remove_control(second).unwrap();
    assert_eq!(editor.selection().shape.get(), None);
    assert_eq!(editor.physics().count_shapes(), 0);
}

#[test]
fn next_then_previous_returns_to_start() {
    let mut physics = CgmPhysics::new();
    physics.add_control(&ragdoll_chain(3), "puppet").unwrap();
    physics.add_control(&ghost_compound(), "sentinel").unwrap();
    let mut selection = Selections::default();

    for shape in physics.list_shapes() {
        selection.shape.select(&physics, shape);
        selection.shape.select_next(&physics);
        selection.shape.select_previous(&physics);
        assert_eq!(selection.shape.get(), Some(shape));
    }
    for name in physics.list_object_names("") {
        selection.pco.select_name(&physics, &name);
        selection.pco.select_previous(&physics);
        selection.pco.select_next(&physics);
        assert_eq!(selection.pco.name(&physics), Some(name));
    }
    for joint in physics.list_joints() {
        selection.joint.select(&physics, joint);
        selection.joint.select_next(&physics);
        selection.joint.select_previous(&physics);
        assert_eq!(selection.joint.get(), Some(joint));
    }
}

#[test]
fn removing_selected_entities_leaves_slots_unselected() {
    let mut physics = CgmPhysics::new();
    let keep = physics.add_control(&rigid_box(Vec3::ONE), "crate").unwrap();
    let puppet = physics.add_control(&ragdoll_chain(2), "puppet").unwrap();
    let mut selection = Selections::default();
    let joint = physics.list_joints()[0];
    let bone = physics.control(puppet).unwrap().model.objects()[1];
    selection.joint.select(&physics, joint);
    selection.pco.select(&physics, bone);

    physics.remove_control(puppet, &mut selection).unwrap();

    assert_eq!(selection.joint.get(), None);
    assert_eq!(selection.pco.get(), None);
    assert_eq!(physics.count_joints(), 0);
    assert!(physics.control(keep).is_some());
    assert!(physics.remove_control(ControlId(99), &mut selection).is_err());
    physics.check_consistency().unwrap();
}

#[test]
fn wrapping_a_shared_child_leaves_other_compounds_alone() {
    let mut physics = CgmPhysics::new();
    physics.add_control(&ghost_compound(), "sentinel").unwrap();
    let compound = physics
        .list_shapes()
        .into_iter()
        .find(|id| physics.model().shape(*id).is_some_and(CollisionShape::is_compound))
        .unwrap();
    let child = physics.model().shape(compound).unwrap().children()[1].shape;
    physics.add_control(&rigid_sharing(child), "prop").unwrap();

    let parent = physics.add_parent_compound(child, 0.04).unwrap().unwrap();

    let users = physics.model().user_set(child);
    assert!(users.contains(&UserId::Shape(compound)));
    assert!(users.contains(&UserId::Shape(parent)));
    assert!(!users.iter().any(|user| matches!(user, UserId::Object(_))));
    physics.check_consistency().unwrap();
}

#[test]
fn removing_a_ragdoll_forgets_its_selected_control_and_link() {
    init_logging();
    let mut physics = CgmPhysics::new();
    let keep = physics.add_control(&ragdoll_chain(2), "left").unwrap();
    let puppet = physics.add_control(&ragdoll_chain(3), "right").unwrap();
    let mut selection = Selections::default();

    selection.control.select_name(&physics, &format!("Ragdoll:{puppet}"));
    assert_eq!(selection.control.get(), Some(puppet));
    selection.select_link_name(&physics, "bone2");
    assert_eq!(selection.link.parent_name(&physics), Some("bone1"));
    assert!(selection.link.select_parent(&physics));
    assert_eq!(selection.link.child_names(&physics), vec!["bone2"]);

    physics.remove_control(puppet, &mut selection).unwrap();
    assert_eq!(selection.control.get(), None);
    assert_eq!(selection.link.get(), None);

    selection.control.select(&physics, keep);
    selection.select_link_name(&physics, "bone0");
    physics.remove_control(puppet, &mut selection).unwrap_err();
    assert_eq!(selection.link.name(&physics), Some("bone0"));
    assert_eq!(physics.list_controls(), vec![keep]);
}

#[test]
fn deleting_the_selected_control_through_the_editor() {
    let mut editor = EditableCgm::default();
    let first = editor.add_control(&rigid_box(Vec3::ONE), "crate").unwrap();
    let puppet = editor.add_control(&ragdoll_chain(2), "puppet").unwrap();

    let (physics, selection) = editor.selecting();
    selection.control.select(physics, first);
    selection.control.select_next(physics);
    assert_eq!(selection.control.get(), Some(puppet));
    selection.select_link_name(physics, "bone1");
    assert!(selection.select_link_joint(physics));

    assert_eq!(editor.delete_selected_control(), Ok(puppet));
    let selection = editor.selection();
    assert_eq!(selection.control.get(), None);
    assert_eq!(selection.link.get(), None);
    assert_eq!(selection.joint.get(), None);
    assert_eq!(editor.physics().list_controls(), vec![first]);
    editor.physics().check_consistency().unwrap();
}
