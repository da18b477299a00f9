//! Entity Hierarchies — solar system demo.
//!
//! A sun spins in place; planets hang off it and moons hang off planets, so
//! every body inherits the rotation of everything above it. Prints world
//! positions for a few simulated seconds.
//!
//! Run with: `RUST_LOG=debug cargo run -p vargr --example hierarchy`

use vargr::prelude::*;

// ── Spin component ──────────────────────────────────────────────────────

/// Degrees per second about the Y axis.
struct Spin(f32);

struct SpinSystem;

impl EntitySystem for SpinSystem {
    type Query = (&'static mut Transform, &'static Spin);

    fn on_update(
        &mut self,
        ctx: &mut SystemContext<'_>,
        _entity: Entity,
        (transform, spin): (&mut Transform, &Spin),
    ) -> Result<()> {
        transform.rotate(Vec3::new(0.0, spin.0 * ctx.dt(), 0.0));
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut scene = Scene::new("solar-system");
    // Spin before resolving so this tick's rotation is visible this tick.
    scene.register(SpinSystem)?;
    scene.add_plugin(TransformPlugin)?;

    let sun = scene.spawn((Info::new("sun"), Transform::default(), Spin(20.0)))?;

    for (i, (distance, speed)) in [(10.0, 45.0), (18.0, 30.0), (30.0, 12.0)].into_iter().enumerate() {
        let planet = scene.spawn((
            Info::new(format!("planet-{i}")),
            Transform::from_xyz(distance, 0.0, 0.0),
            Spin(speed),
        ))?;
        scene.set_parent(planet, Some(sun))?;

        let moon = scene.spawn((
            Info::new(format!("moon-{i}")),
            Transform::from_xyz(2.0, 0.0, 0.0).with_scale(Vec3::splat(0.3)),
        ))?;
        scene.set_parent(moon, Some(planet))?;
    }

    let camera = scene.spawn((
        Transform::from_xyz(0.0, 40.0, 60.0).with_rotation(Vec3::new(-35.0, 0.0, 0.0)),
        Camera::default().with_primary(true),
    ))?;

    for second in 0..5 {
        for _ in 0..60 {
            scene.tick(1.0 / 60.0)?;
        }
        println!("t = {}s", second + 1);
        for name in ["planet-0", "moon-0", "planet-2"] {
            if let Some(e) = scene.find_named(name) {
                let p = scene.get::<Transform>(e).map(Transform::world_translation);
                println!("  {name:<9} {:?}", p.unwrap_or_default());
            }
        }
    }

    if let Some(cam) = scene.primary_camera() {
        debug_assert_eq!(cam, camera);
        let vp = scene.get::<Camera>(cam).map(Camera::view_projection);
        println!("camera view-projection: {:?}", vp.unwrap_or_default());
    }

    // Dropping the sun takes the whole system with it.
    let released = scene.release_recursive(sun)?;
    println!("released {released} bodies, {} entities left", scene.world().entity_count());
    Ok(())
}
