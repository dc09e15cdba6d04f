use std::f32::consts::FRAC_PI_2;

use bevy::{ecs::event::Events, prelude::*};
use bevy_rapier3d::prelude::*;

use portal_walker::plugins::{
    first_person_controller::{BodyPose, ControllerConfig, FirstPersonController, MotionPhase, TickClock},
    input::InputSnapshot,
    physics::{PhysicsWorld, RayHit},
    portal::{teleport_travellers, Portal, PortalPlugin, TeleportEvent},
    scaled_mass::{apply_scaled_mass_gravity, ScaledMassBody},
};

const DT: f32 = 1. / 60.;

/// Infinite floor at `y = 0`.
struct Floor;

impl PhysicsWorld for Floor {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32, _layers: Option<Group>) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        if direction.y >= 0. {
            return None;
        }
        let distance = origin.y / -direction.y;
        (distance >= 0. && distance <= max_distance).then(|| RayHit {
            distance,
            point: origin + direction * distance,
            normal: Vec3::Y,
        })
    }
}

fn player(config: &ControllerConfig) -> FirstPersonController {
    FirstPersonController::new(config, 0.9, Quat::IDENTITY, Entity::from_raw(100), Entity::from_raw(101))
}

#[test]
fn jump_then_land() {
    let config = ControllerConfig::default();
    let mut controller = player(&config);
    let grounded_pose = BodyPose {
        position: Vec3::Y * 0.9,
        rotation: Quat::IDENTITY,
    };
    let airborne_pose = BodyPose {
        position: Vec3::Y * 3.,
        rotation: Quat::IDENTITY,
    };
    let jump = InputSnapshot {
        jump_pressed: true,
        ..default()
    };
    let clock = TickClock { delta: DT, elapsed: 0. };

    let output = controller.frame_tick(Some(&Floor), &grounded_pose, &jump, &clock, &config);
    assert_eq!(output.phase, MotionPhase::Jumping);
    assert_eq!(controller.locomotion.velocity.y, config.movement.jump_force);

    let output = controller.frame_tick(Some(&Floor), &airborne_pose, &default(), &clock, &config);
    assert_eq!(output.phase, MotionPhase::Airborne);
    assert!(controller.locomotion.velocity.y < config.movement.jump_force);

    // Still rising when touching down again: the jump keeps going.
    let output = controller.frame_tick(Some(&Floor), &grounded_pose, &default(), &clock, &config);
    assert_eq!(output.phase, MotionPhase::Jumping);

    for _ in 0..120 {
        controller.frame_tick(Some(&Floor), &airborne_pose, &default(), &clock, &config);
    }
    assert!(controller.locomotion.velocity.y < 0.);
    let output = controller.frame_tick(Some(&Floor), &grounded_pose, &default(), &clock, &config);
    assert_eq!(output.phase, MotionPhase::Grounded);
    assert_eq!(controller.locomotion.velocity.y, 0.);
}

#[test]
fn turning_the_camera_turns_movement() {
    let config = ControllerConfig::default();
    let mut controller = player(&config);
    let pose = BodyPose {
        position: Vec3::Y * 0.9,
        rotation: Quat::IDENTITY,
    };
    let clock = TickClock { delta: DT, elapsed: 0. };

    // A quarter turn counter-clockwise, fed in deltas below the spurious threshold.
    let frames = 10;
    let gain = config.camera.mouse_sensitivity * 100. * DT;
    let turn = InputSnapshot {
        pointer_delta: Vec2::new(90. / (frames as f32 * gain), 0.),
        ..default()
    };
    for _ in 0..frames {
        controller.frame_tick(Some(&Floor), &pose, &turn, &clock, &config);
    }
    for _ in 0..120 {
        controller.frame_tick(Some(&Floor), &pose, &default(), &clock, &config);
    }
    assert!((controller.pivot_yaw - 90.).abs() < 1.);

    let forward = InputSnapshot {
        movement: Vec2::Y,
        any_movement_key: true,
        ..default()
    };
    for _ in 0..60 {
        controller.frame_tick(Some(&Floor), &pose, &forward, &clock, &config);
    }
    // Facing -X after turning left from -Z.
    let velocity = controller.locomotion.velocity;
    assert!(velocity.x < -1.);
    assert!(velocity.z.abs() < 0.1 * velocity.x.abs());
}

#[test]
fn scaled_mass_system_updates_mass_and_force() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_system(apply_scaled_mass_gravity);

    let body = app
        .world
        .spawn((
            Transform::from_scale(Vec3::splat(2.)),
            ScaledMassBody { gravity_force: 10. },
            ColliderMassProperties::Mass(1.),
            ExternalForce::default(),
        ))
        .id();
    app.update();

    let entity = app.world.entity(body);
    let mass = entity.get::<ColliderMassProperties>().unwrap();
    assert!(matches!(mass, ColliderMassProperties::Mass(m) if *m == 2.));
    assert_eq!(entity.get::<ExternalForce>().unwrap().force, Vec3::new(0., -40., 0.));
}

#[test]
fn player_walking_into_portal_comes_out_of_the_other() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugin(PortalPlugin)
        .add_system(teleport_travellers::<FirstPersonController>);

    let entry = app
        .world
        .spawn((Transform::from_xyz(0., 1., -5.), Portal::default()))
        .id();
    let exit = app
        .world
        .spawn((
            Transform::from_xyz(5., 1., 0.).with_rotation(Quat::from_rotation_y(-FRAC_PI_2)),
            Portal {
                linked_portal: Some(entry),
            },
        ))
        .id();
    app.world.entity_mut(entry).insert(Portal {
        linked_portal: Some(exit),
    });

    let config = ControllerConfig::default();
    let traveller = app
        .world
        .spawn((
            Transform::from_xyz(0., 0.9, -5.2),
            Velocity::default(),
            player(&config),
        ))
        .id();
    app.update();

    let transform = app.world.get::<Transform>(traveller).unwrap();
    assert!((transform.translation - Vec3::new(4.8, 0.9, 0.)).length() < 1e-3);

    let events = app.world.resource::<Events<TeleportEvent>>();
    let mut reader = events.get_reader();
    let sent: Vec<_> = reader.iter(events).copied().collect();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].entity, traveller);
    assert_eq!(sent[0].entry, entry);
    assert_eq!(sent[0].exit, exit);
    assert!(!sent[0].tilted);

    // Out of the exit portal's range on the far side: no ping-pong on the next frame.
    app.update();
    let transform = app.world.get::<Transform>(traveller).unwrap();
    assert!((transform.translation - Vec3::new(4.8, 0.9, 0.)).length() < 1e-3);
}
