//! This module contains the first person controller plugin.
//!
//! Per player, every frame:
//!
//! * the camera rig turns the pointer delta into a smoothed pan and tilt,
//! * the gravity state integrates the falling velocity and handles jumps,
//! * the locomotion integrator smooths the horizontal velocity towards the input.
//!
//! A fixed rate physics phase then aligns the body to walls when enabled and hands the
//! resulting velocity and gravity force over to rapier.

use bevy::{prelude::*, reflect::FromReflect, render::camera::Projection, time::FixedTimestep};
use bevy_rapier3d::prelude::*;
use leafwing_input_manager::prelude::*;

pub mod camera;
pub mod config;
pub mod footsteps;
pub mod gravity;
pub mod locomotion;
pub mod sensor;
pub mod shooting;
pub mod spherical;
pub mod wall_walk;

pub use camera::{CameraOrientation, CameraRig};
pub use config::{ConfigError, ControllerConfig};
pub use footsteps::{FootstepEvent, FootstepKind, FootstepSounds, FootstepTimer};
pub use gravity::{GravityState, MotionPhase};
pub use locomotion::{Locomotion, PhysicsCommand};
pub use sensor::{GroundingSensor, ProbeMode};
pub use shooting::{Projectile, ProjectileTemplate};
pub use spherical::Planet;
pub use wall_walk::WallWalk;

use crate::plugins::{
    input::{default_input_map, Actions, InputSnapshot},
    physics::*,
    portal::{teleport, teleport_travellers, PortalLabels, PortalPair, Teleportable, TeleportSubject},
    shader_globals::{publish_inside_sphere, publish_spherical_world, ShaderGlobals},
};

const PLAYER_HEIGHT: f32 = 1.8;
const PLAYER_RADIUS: f32 = 0.4;
const EYE_HEIGHT: f32 = 1.25;
/// Used when rapier has not computed the body mass yet.
const FALLBACK_MASS: f32 = 1.;

#[derive(Debug)]
/// First person controller plugin, which registers the required systems to use the first person
/// controller also provided by this module.
pub struct FirstPersonControllerPlugin;

impl Plugin for FirstPersonControllerPlugin {
    fn build(&self, app: &mut App) {
        if !app.world.contains_resource::<ControllerConfig>() {
            app.insert_resource(ControllerConfig::load_or_default(config::CONFIG_PATH));
        }

        app.register_type::<FirstPersonCamera>()
            .register_type::<FirstPersonControllerSpawner>()
            .register_type::<Planet>()
            .add_event::<FootstepEvent>()
            .add_system(spawn_controller.label(FirstPersonLabels::SpawnControllers))
            .add_system(
                process_controller_inputs
                    .label(FirstPersonLabels::ProcessInputs)
                    .after(FirstPersonLabels::SpawnControllers),
            )
            .add_system_set(
                SystemSet::new()
                    .label(FirstPersonLabels::Features)
                    .after(FirstPersonLabels::ProcessInputs)
                    .with_system(align_to_planet)
                    .with_system(publish_player_shader_globals)
                    .with_system(fire_projectiles)
                    .with_system(footsteps::play_footsteps)
                    .with_system(shooting::despawn_projectiles_on_impact)
                    .with_system(shooting::expire_projectiles),
            )
            .add_system(
                teleport_travellers::<FirstPersonController>
                    .label(PortalLabels::TeleportEntities)
                    .after(FirstPersonLabels::Features),
            )
            .add_system_set(
                SystemSet::new()
                    .label(FirstPersonLabels::PhysicsTick)
                    .with_run_criteria(FixedTimestep::step(PHYSICS_STEP as f64))
                    .after(PortalLabels::TeleportEntities)
                    .with_system(apply_controller_physics),
            );
    }
}

#[derive(Debug, SystemLabel)]
/// Labels for the first person controller systems.
pub enum FirstPersonLabels {
    SpawnControllers,
    ProcessInputs,
    Features,
    PhysicsTick,
}

/// Derived every frame, never accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionFlags {
    pub grounded: bool,
    pub jumping: bool,
    pub sprinting: bool,
    pub moving: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl From<&Transform> for BodyPose {
    fn from(transform: &Transform) -> Self {
        BodyPose {
            position: transform.translation,
            rotation: transform.rotation,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickClock {
    pub delta: f32,
    pub elapsed: f32,
}

impl From<&Time> for TickClock {
    fn from(time: &Time) -> Self {
        TickClock {
            delta: time.delta_seconds(),
            elapsed: time.elapsed_seconds(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub orientation: CameraOrientation,
    pub phase: MotionPhase,
    pub footstep: Option<FootstepEvent>,
}

#[derive(Debug, Component)]
/// First person controller component.
pub struct FirstPersonController {
    pub camera: CameraRig,
    pub gravity: GravityState,
    pub locomotion: Locomotion,
    pub wall_walk: WallWalk,
    pub footsteps: FootstepTimer,
    pub sensor: GroundingSensor,
    pub flags: MotionFlags,
    /// Yaw currently applied to the camera pivot, in degrees. Movement is relative to it.
    pub pivot_yaw: f32,
    pub camera_anchor: Entity,
    pub camera_entity: Entity,
}

pub fn probe_mode(config: &ControllerConfig) -> ProbeMode {
    if config.movement.slopes {
        ProbeMode::Slopes
    } else if config.spherical.enabled && !config.spherical.is_model {
        ProbeMode::Spherical
    } else {
        ProbeMode::Flat
    }
}

impl FirstPersonController {
    pub fn new(
        config: &ControllerConfig,
        half_height: f32,
        body_rotation: Quat,
        camera_anchor: Entity,
        camera_entity: Entity,
    ) -> Self {
        let pan = crate::util::math::yaw_degrees(body_rotation);
        FirstPersonController {
            camera: CameraRig::new(pan, 0.),
            gravity: GravityState::default(),
            locomotion: Locomotion::new(&config.movement),
            wall_walk: WallWalk::new(body_rotation * Vec3::Y),
            footsteps: FootstepTimer::default(),
            sensor: GroundingSensor::new(half_height, probe_mode(config)),
            flags: MotionFlags::default(),
            pivot_yaw: pan,
            camera_anchor,
            camera_entity,
        }
    }

    /// Frame phase: camera, gravity and locomotion, in that order.
    pub fn frame_tick<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: Option<&W>,
        body: &BodyPose,
        input: &InputSnapshot,
        clock: &TickClock,
        config: &ControllerConfig,
    ) -> FrameOutput {
        let dt = clock.delta;
        let orientation = self.camera.update(input.pointer_delta, &config.camera, dt);

        let grounded = self.sensor.is_grounded(world, body.position, body.rotation);
        self.gravity
            .update(input.jump_pressed, grounded, &config.movement, dt, clock.elapsed);

        // Movement follows the pivot as it was before this frame's camera update is applied.
        self.locomotion.update(
            input.movement,
            self.pivot_yaw,
            input.sprint_held,
            grounded,
            self.gravity.jumping,
            &config.movement,
            dt,
        );
        if self.sensor.is_ceiling_hit(world, body.position, body.rotation) {
            self.gravity.hit_ceiling();
        }
        self.locomotion.set_falling_velocity(self.gravity.falling_velocity);
        self.pivot_yaw = self.camera.pan_smooth;

        self.flags = MotionFlags {
            grounded,
            jumping: self.gravity.jumping,
            sprinting: self.locomotion.sprinting,
            moving: input.any_movement_key && grounded,
        };

        let footstep = if config.sound.enabled {
            self.footsteps.tick(
                self.flags.moving,
                self.flags.sprinting,
                &config.movement,
                &config.sound,
                dt,
            )
        } else {
            None
        };

        FrameOutput {
            orientation,
            phase: self.gravity.phase(grounded),
            footstep,
        }
    }

    /// Physics phase: wall alignment, then the velocity change and gravity for the body.
    pub fn physics_tick<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: Option<&W>,
        body: &mut BodyPose,
        current_velocity: Vec3,
        mass: f32,
        config: &ControllerConfig,
        dt: f32,
    ) -> PhysicsCommand {
        if config.wall_walk.enabled {
            body.rotation = self.wall_walk.update(
                world,
                body.position,
                body.rotation,
                self.locomotion.velocity,
                GROUND_GROUP,
                &config.wall_walk,
                dt,
            );
        }
        locomotion::physics_command(
            body.rotation,
            self.locomotion.velocity,
            current_velocity,
            mass,
            config.movement.gravity_force,
        )
    }
}

impl Teleportable for FirstPersonController {
    fn teleport(
        &mut self,
        pair: &PortalPair,
        destination_position: Vec3,
        destination_rotation: Quat,
        body: &mut Transform,
        velocity: &mut Velocity,
    ) -> bool {
        let subject = TeleportSubject {
            rotation: body.rotation,
            pivot_rotation: body.rotation * Quat::from_rotation_y(self.pivot_yaw.to_radians()),
            pan_smooth: self.camera.pan_smooth,
            velocity: self.locomotion.velocity,
        };
        let outcome = teleport(pair, destination_position, destination_rotation, &subject);

        self.camera.shift_pan(outcome.pan_shift);
        self.pivot_yaw = self.camera.pan_smooth;
        self.locomotion.velocity = outcome.velocity;

        body.translation = outcome.position;
        body.rotation = outcome.rotation;
        // Rapier picks both up before its next step, so the body does not drift back.
        velocity.linvel = outcome.rotation * outcome.velocity;
        outcome.tilted
    }
}

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Marker trait for first person cameras
pub struct FirstPersonCamera;

#[derive(Debug, Component, Default, Reflect, FromReflect)]
#[reflect(Component)]
pub struct FirstPersonControllerSpawner {}

fn spawn_controller(
    mut commands: Commands,
    config: Res<ControllerConfig>,
    spawners_query: Query<(&Transform, Entity), With<FirstPersonControllerSpawner>>,
) {
    for (transform, id) in &spawners_query {
        const CAMERA_OFFSET: Vec3 = Vec3::new(0., EYE_HEIGHT - PLAYER_HEIGHT / 2., 0.);

        let camera_anchor = commands
            .spawn(SpatialBundle::from(Transform::from_translation(CAMERA_OFFSET)))
            .insert(Name::from("Camera anchor"))
            .id();

        let camera = commands
            .spawn(Camera3dBundle {
                projection: Projection::Perspective(PerspectiveProjection {
                    fov: std::f32::consts::FRAC_PI_4,
                    aspect_ratio: 16. / 9.,
                    near: 0.1,
                    far: 1000.,
                }),
                ..default()
            })
            .insert((Name::from("Player camera"), FirstPersonCamera))
            .id();

        commands.entity(camera_anchor).push_children(&[camera]);

        let half_height = PLAYER_HEIGHT / 2.;
        commands
            .entity(id)
            .insert(InputManagerBundle {
                action_state: ActionState::default(),
                input_map: default_input_map(),
            })
            .insert((
                RigidBody::Dynamic,
                Collider::capsule_y(half_height - PLAYER_RADIUS, PLAYER_RADIUS),
                LockedAxes::ROTATION_LOCKED,
                Velocity::default(),
                ExternalForce::default(),
                ReadMassProperties::default(),
                Sleeping::disabled(),
                Ccd::enabled(),
                Name::from("Player"),
                CollisionGroups::new(PLAYER_GROUP, ALL_GROUPS),
            ))
            .insert(FirstPersonController::new(
                &config,
                half_height,
                transform.rotation,
                camera_anchor,
                camera,
            ))
            .add_child(camera_anchor)
            .remove::<FirstPersonControllerSpawner>();

        info!("Spawned first person controller at {}", transform.translation);
    }
}

fn process_controller_inputs(
    rapier: Option<Res<RapierContext>>,
    time: Res<Time>,
    config: Res<ControllerConfig>,
    mut player_query: Query<(
        Entity,
        &ActionState<Actions>,
        &mut FirstPersonController,
        &Transform,
    )>,
    mut camera_query: Query<&mut Transform, Without<FirstPersonController>>,
    mut footsteps: EventWriter<FootstepEvent>,
) {
    let clock = TickClock::from(&*time);
    for (entity, actions, mut controller, transform) in &mut player_query {
        let input = InputSnapshot::from_action_state(actions, config.camera.pointer_scale);
        let world = rapier
            .as_deref()
            .map(|context| RapierWorld::new(context).excluding(entity));
        let output = controller.frame_tick(world.as_ref(), &BodyPose::from(transform), &input, &clock, &config);

        if let Some(step) = output.footstep {
            footsteps.send(step);
        }

        // Rotation around the vertical axis goes on the camera anchor, so the root body keeps
        // its own orientation. The pitch only rotates the camera.
        if let Ok(mut anchor) = camera_query.get_mut(controller.camera_anchor) {
            anchor.rotation = output.orientation.pivot_rotation();
        }
        if let Ok(mut camera) = camera_query.get_mut(controller.camera_entity) {
            camera.rotation = output.orientation.camera_rotation();
        }
    }
}

fn apply_controller_physics(
    rapier: Option<Res<RapierContext>>,
    config: Res<ControllerConfig>,
    mut player_query: Query<(
        Entity,
        &mut FirstPersonController,
        &mut Transform,
        &mut Velocity,
        &mut ExternalForce,
        Option<&ReadMassProperties>,
    )>,
) {
    for (entity, mut controller, mut transform, mut velocity, mut force, mass) in &mut player_query {
        let world = rapier
            .as_deref()
            .map(|context| RapierWorld::new(context).excluding(entity));
        let mass = mass
            .map(|mass| mass.0.mass)
            .filter(|mass| *mass > 0.)
            .unwrap_or(FALLBACK_MASS);

        let mut body = BodyPose::from(&*transform);
        let command = controller.physics_tick(
            world.as_ref(),
            &mut body,
            velocity.linvel,
            mass,
            &config,
            PHYSICS_STEP,
        );
        if transform.rotation != body.rotation {
            transform.rotation = body.rotation;
        }
        velocity.linvel += command.velocity_change;
        force.force = command.force;
    }
}

fn align_to_planet(
    config: Res<ControllerConfig>,
    planets: Query<&GlobalTransform, With<Planet>>,
    mut players: Query<&mut Transform, With<FirstPersonController>>,
) {
    if !config.spherical.enabled {
        return;
    }
    let Ok(planet) = planets.get_single() else {
        return;
    };
    let blend = config.camera.rotation_smooth_time * 2.;
    for mut transform in &mut players {
        transform.rotation =
            spherical::planet_alignment(transform.translation, transform.rotation, planet.translation(), blend);
    }
}

fn publish_player_shader_globals(
    config: Res<ControllerConfig>,
    mut globals: ResMut<ShaderGlobals>,
    players: Query<&Transform, With<FirstPersonController>>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    if config.inside_sphere.enabled {
        publish_inside_sphere(&mut *globals, player.translation, &config.inside_sphere);
    }
    if config.spherical_world.enabled {
        publish_spherical_world(
            &mut *globals,
            player.translation,
            config.inside_sphere.enabled,
            &config.spherical_world,
        );
    }
}

fn fire_projectiles(
    mut commands: Commands,
    config: Res<ControllerConfig>,
    template: Option<Res<ProjectileTemplate>>,
    players: Query<&ActionState<Actions>, With<FirstPersonController>>,
    cameras: Query<&GlobalTransform, With<FirstPersonCamera>>,
) {
    if !config.shooting.enabled {
        return;
    }
    let Some(template) = template else {
        return;
    };
    let (Ok(actions), Ok(camera)) = (players.get_single(), cameras.get_single()) else {
        return;
    };
    if InputSnapshot::from_action_state(actions, config.camera.pointer_scale).fire_pressed {
        let launch = shooting::projectile_launch(camera, &config.shooting, PHYSICS_STEP);
        shooting::spawn_projectile(&mut commands, &template, launch);
    }
}
