//! Scene Switching — two independent worlds under one manager.
//!
//! A "menu" scene counts idle ticks; after a few it asks the manager to
//! switch to "level". The level spawns a crate per tick until a system
//! fails on purpose, which the level's `Isolate` policy turns into a
//! report entry instead of an aborted tick.
//!
//! Run with: `RUST_LOG=info cargo run -p vargr --example scene_switching`

use vargr::prelude::*;

struct IdleTicks(u32);

struct Crate;

fn count_idle(world: &mut World, _dt: f32) -> Result<()> {
    if let Some(idle) = world.get_resource_mut::<IdleTicks>() {
        idle.0 += 1;
    }
    Ok(())
}

fn spawn_crates(world: &mut World, _dt: f32) -> Result<()> {
    world.spawn((Info::new("crate"), Transform::default(), Crate))?;
    Ok(())
}

fn too_many_crates(world: &mut World, _dt: f32) -> Result<()> {
    let count = world.each::<Crate>().count();
    if count > 3 {
        return Err(EcsError::failure(format!("{count} crates is too many")));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut menu = Scene::new("menu");
    menu.world_mut().insert_resource(IdleTicks(0));
    menu.add_system(count_idle);

    let config = SceneConfig::default().with_error_policy(ErrorPolicy::Isolate);
    let mut level = Scene::with_config("level", config);
    level.add_plugin(TransformPlugin)?;
    level.add_system(spawn_crates);
    level.add_system(too_many_crates);

    let mut manager = SceneManager::new();
    manager.add(menu)?;
    manager.add(level)?;

    for _ in 0..10 {
        let idle = manager
            .get("menu")
            .and_then(|s| s.world().get_resource::<IdleTicks>())
            .map_or(0, |i| i.0);
        if idle == 3 && manager.active_name() == Some("menu") {
            manager.goto("level")?;
        }

        if let Some(report) = manager.tick_active(1.0 / 30.0)? {
            println!(
                "[{}] tick {} ran {} system(s)",
                manager.active_name().unwrap_or("-"),
                report.tick,
                report.systems_run
            );
            for failure in &report.failures {
                println!("    `{}` failed: {}", failure.system, failure.error);
            }
        }
    }

    #[cfg(feature = "diagnostics")]
    if let Some(level) = manager.get_mut("level") {
        match level.diagnostics().to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("diagnostics: {err}"),
        }
    }

    // The menu kept its state while the level ran.
    let menu = manager.remove("menu")?;
    println!(
        "menu idled {} tick(s)",
        menu.world().get_resource::<IdleTicks>().map_or(0, |i| i.0)
    );
    Ok(())
}
