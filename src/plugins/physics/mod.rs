use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub const WALLS_GROUP: Group = Group::GROUP_1;
pub const PROPS_GROUP: Group = Group::GROUP_2;
pub const PORTAL_GROUP: Group = Group::GROUP_3;
pub const PLAYER_GROUP: Group = Group::GROUP_4;
pub const RAYCAST_GROUP: Group = Group::GROUP_5;
pub const GROUND_GROUP: Group = Group::GROUP_6;
pub const PROJECTILE_GROUP: Group = Group::GROUP_7;
pub const ALL_GROUPS: Group = Group::ALL;

/// Step used by the fixed-rate physics phase of the controllers, in seconds.
pub const PHYSICS_STEP: f32 = 1. / 50.;

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_startup_system(configure_rapier);
    }
}

fn configure_rapier(mut config: ResMut<RapierConfiguration>) {
    // Extra CCD substeps because them portals can go fast
    config.timestep_mode = TimestepMode::Variable {
        max_dt: 1. / 20.,
        time_scale: 1.,
        substeps: 4,
    };
    // Gravity is applied by the controllers as a force along each body's own down axis.
    config.gravity = Vec3::ZERO;
}

/// Result of a successful ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Ray queries against the collision world.
///
/// A `None` result is a regular negative answer, not a failure.
pub trait PhysicsWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: Option<Group>,
    ) -> Option<RayHit>;

    fn ray_hits(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
        self.cast_ray(origin, direction, max_distance, None).is_some()
    }
}

/// [`PhysicsWorld`] backed by the rapier context, ignoring the colliders of one body.
pub struct RapierWorld<'a> {
    context: &'a RapierContext,
    exclude: Option<Entity>,
}

impl<'a> RapierWorld<'a> {
    pub fn new(context: &'a RapierContext) -> Self {
        RapierWorld {
            context,
            exclude: None,
        }
    }

    pub fn excluding(mut self, body: Entity) -> Self {
        self.exclude = Some(body);
        self
    }
}

impl PhysicsWorld for RapierWorld<'_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: Option<Group>,
    ) -> Option<RayHit> {
        let direction = direction.try_normalize()?;
        let filter = QueryFilter {
            groups: layers.map(|filter| CollisionGroups::new(RAYCAST_GROUP, filter).into()),
            exclude_rigid_body: self.exclude,
            flags: QueryFilterFlags::EXCLUDE_SENSORS,
            ..default()
        };
        let (_entity, intersection) =
            self.context
                .cast_ray_and_get_normal(origin, direction, max_distance, true, filter)?;
        Some(RayHit {
            distance: intersection.toi,
            point: intersection.point,
            normal: intersection.normal,
        })
    }
}
