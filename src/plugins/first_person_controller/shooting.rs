//! Projectile launching from the player camera.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::config::ShootingConfig;
use crate::plugins::physics::*;

/// Projectiles spawn this far below the camera.
const MUZZLE_DROP: f32 = 0.15;
/// Launch force per unit of projectile speed.
const LAUNCH_FORCE_SCALE: f32 = 20.;
/// Projectiles that hit nothing are removed after this many seconds.
pub const PROJECTILE_LIFETIME: f32 = 5.;

/// Shape and mass of spawned projectiles. Shooting is disabled while it is absent.
#[derive(Debug, Clone, Resource)]
pub struct ProjectileTemplate {
    pub radius: f32,
    pub mass: f32,
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

#[derive(Debug, Component)]
pub struct Projectile {
    pub lifetime: Timer,
}

impl Default for Projectile {
    fn default() -> Self {
        Projectile {
            lifetime: Timer::from_seconds(PROJECTILE_LIFETIME, TimerMode::Once),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub position: Vec3,
    pub rotation: Quat,
    pub impulse: Vec3,
}

/// Where and how hard to launch a projectile fired from `camera`.
///
/// The launch force acts for a single physics step, so it is handed over as an impulse.
pub fn projectile_launch(camera: &GlobalTransform, config: &ShootingConfig, step: f32) -> ProjectileLaunch {
    let camera = camera.compute_transform();
    let forward = camera.forward();
    ProjectileLaunch {
        position: camera.translation - Vec3::Y * MUZZLE_DROP,
        rotation: camera.rotation,
        impulse: forward * config.projectile_speed * LAUNCH_FORCE_SCALE * step,
    }
}

pub fn spawn_projectile(commands: &mut Commands, template: &ProjectileTemplate, launch: ProjectileLaunch) -> Entity {
    debug!("Spawning projectile at {}", launch.position);
    commands
        .spawn(PbrBundle {
            mesh: template.mesh.clone(),
            material: template.material.clone(),
            transform: Transform::from_translation(launch.position).with_rotation(launch.rotation),
            ..default()
        })
        .insert((
            Name::from("Projectile"),
            Projectile::default(),
            RigidBody::Dynamic,
            Collider::ball(template.radius),
            ColliderMassProperties::Mass(template.mass),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            CollisionGroups::new(PROJECTILE_GROUP, WALLS_GROUP | GROUND_GROUP | PROPS_GROUP),
            GravityScale(0.),
            Velocity::default(),
            ExternalImpulse {
                impulse: launch.impulse,
                torque_impulse: Vec3::ZERO,
            },
        ))
        .id()
}

/// Remove projectiles as soon as they touch anything.
pub fn despawn_projectiles_on_impact(
    mut commands: Commands,
    mut collisions: EventReader<CollisionEvent>,
    projectiles: Query<(), With<Projectile>>,
) {
    for collision in collisions.iter() {
        if let CollisionEvent::Started(collider_a, collider_b, _flags) = collision {
            for entity in [collider_a, collider_b] {
                if projectiles.contains(*entity) {
                    commands.entity(*entity).despawn_recursive();
                }
            }
        }
    }
}

/// Remove projectiles that flew for their whole lifetime without touching anything.
pub fn expire_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile)>,
) {
    for (entity, mut projectile) in &mut projectiles {
        if projectile.lifetime.tick(time.delta()).finished() {
            debug!("Projectile {:?} expired", entity);
            commands.entity(entity).despawn_recursive();
        }
    }
}
