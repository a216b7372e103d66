use maud_editor::mirror::CgmPhysics;
use maud_editor::physics::ControlSpec;
use serde::Deserialize;
use std::env;
use std::fs;

#[derive(Deserialize)]
struct SceneEntry {
    label: String,
    spec: ControlSpec,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("[scene_report] error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .ok_or("usage: scene_report <scene.json>")?;
    let entries: Vec<SceneEntry> = serde_json::from_str(&fs::read_to_string(&path)?)?;

    let mut physics = CgmPhysics::new();
    for entry in &entries {
        physics.add_control(&entry.spec, &entry.label)?;
    }
    physics.check_consistency()?;

    println!(
        "[scene_report] {} controls, {} objects, {} joints, {} shapes",
        entries.len(),
        physics.count_objects(),
        physics.count_joints(),
        physics.count_shapes()
    );
    for shape in physics.list_shapes() {
        let users: Vec<String> = physics
            .model()
            .user_set(shape)
            .into_iter()
            .map(|user| physics.user_name(user))
            .collect();
        println!("{shape}: {}", users.join(", "));
    }
    Ok(())
}
