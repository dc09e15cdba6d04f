//! Props whose mass follows their scale and which pull themselves down.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub const DEFAULT_GRAVITY_FORCE: f32 = 20.;

pub struct ScaledMassPlugin;

impl Plugin for ScaledMassPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ScaledMassBody>()
            .add_system(apply_scaled_mass_gravity);
    }
}

#[derive(Debug, Component, Reflect)]
#[reflect(Component)]
pub struct ScaledMassBody {
    pub gravity_force: f32,
}

impl Default for ScaledMassBody {
    fn default() -> Self {
        ScaledMassBody {
            gravity_force: DEFAULT_GRAVITY_FORCE,
        }
    }
}

impl ScaledMassBody {
    /// Mass for the given scale and the force it pulls itself down with.
    pub fn update(&self, transform: &Transform) -> (f32, Vec3) {
        let mass = transform.scale.x;
        (mass, -transform.up() * mass * self.gravity_force)
    }
}

pub fn apply_scaled_mass_gravity(
    mut bodies: Query<(
        &ScaledMassBody,
        &Transform,
        &mut ColliderMassProperties,
        &mut ExternalForce,
    )>,
) {
    for (body, transform, mut mass_properties, mut force) in &mut bodies {
        let (mass, gravity) = body.update(transform);
        if !matches!(*mass_properties, ColliderMassProperties::Mass(current) if current == mass) {
            *mass_properties = ColliderMassProperties::Mass(mass);
        }
        force.force = gravity;
    }
}
