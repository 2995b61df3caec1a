use glam::Vec3;
use phys_pipeline::config::{initialize_physics_settings, load_physics_settings, LoggingSettings};
use phys_pipeline::utils::logging::{init_logging, log_system_info};
use phys_pipeline::utils::math::parse_vec3;
use phys_pipeline::world::{Contact, PhysicsController, PhysicsParams, PhysicsReport, SceneObject};
use std::env;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_TICKS: u32 = 120;

// Unit cube corners, the render layer would hand us the full mesh
fn unit_cube_vertices() -> Vec<f32> {
    (0..8u32)
        .flat_map(|corner| [1, 2, 4].map(|bit| if corner & bit != 0 { 0.5 } else { -0.5 }))
        .collect()
}

fn spawn(
    controller: &PhysicsController,
    name: &str,
    position: Vec3,
    is_kinematic: bool,
    obey_gravity: bool,
) -> anyhow::Result<Arc<SceneObject>> {
    let object = SceneObject::with_mesh(name, &unit_cube_vertices())?;
    object.set_translation(position);
    object.update_collider();

    let params = PhysicsParams {
        position,
        is_kinematic,
        obey_gravity,
        elasticity: 0.5,
    };
    controller.add_scene_object(&object, &params)?;
    debug!("Spawned {} as {}", name, object.id());
    Ok(object)
}

fn main() -> anyhow::Result<()> {
    let persisted = load_physics_settings();
    let logging = persisted
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_else(LoggingSettings::default);
    init_logging(&logging)?;
    log_system_info();

    let settings = match persisted {
        Some(settings) => settings,
        None => initialize_physics_settings(),
    };

    let ticks = env::var("PHYS_TICKS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(DEFAULT_TICKS);
    let player_velocity = match env::var("PHYS_PLAYER_VELOCITY") {
        Ok(value) => parse_vec3(&value).map_err(anyhow::Error::msg)?,
        Err(_) => Vec3::new(0.05, 0.0, 0.0),
    };

    let controller = PhysicsController::new(&settings.pool)?;

    let player = spawn(&controller, "player", Vec3::ZERO, true, false)?;
    let obstacle = spawn(&controller, "obstacle", Vec3::new(4.0, 0.0, 0.0), false, false)?;
    let debris = spawn(&controller, "debris", Vec3::new(-3.0, 6.0, 0.0), true, true)?;
    let scene = vec![Arc::clone(&player), Arc::clone(&obstacle), Arc::clone(&debris)];

    controller.subscribe("collision-log", |report: &PhysicsReport| {
        let names: Vec<&str> = report.collisions.iter().map(|c| c.name()).collect();
        info!("{} is touching {:?}", report.parent.name(), names);
    })?;

    controller.set_velocity("player", player_velocity, false)?;
    let affected = controller.apply_gravity(settings.gravity());
    info!("Gravity {:?} applied to {} objects", settings.gravity(), affected);

    for tick in 0..ticks {
        controller.update()?;

        // Scene layer: pull positions, then refit colliders before any query
        for object in &scene {
            if let Some(state) = controller.state_of(object) {
                object.set_translation(state.position);
            }
            object.update_collider();
        }

        match player.get_collision(&obstacle, player_velocity)? {
            Contact::Colliding => {
                info!("Tick {}: player hit the obstacle, stopping", tick);
                controller.set_velocity("player", Vec3::ZERO, false)?;
            }
            Contact::Imminent => info!("Tick {}: player is about to hit the obstacle", tick),
            Contact::Clear => {}
        }

        controller.publish_collisions(&scene)?;
    }

    if let Some(state) = controller.state_of(&player) {
        info!("Player finished at {:?}", state.position);
    } else {
        warn!("Player is no longer tracked");
    }

    controller.remove_scene_object(&debris)?;
    controller.unsubscribe("collision-log")?;
    controller.stop();
    info!("Physics demo finished after {} ticks", ticks);
    Ok(())
}
