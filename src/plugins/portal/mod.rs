use bevy::{prelude::*, reflect::FromReflect};
use bevy_rapier3d::prelude::*;

mod geometry;
mod teleport;

pub use geometry::{destination, has_crossed, portal_to_portal};
pub use teleport::{correct_exit_yaw, teleport, PortalPair, TeleportOutcome, TeleportSubject};

use super::physics::*;

/// Distance from a portal center under which travellers are checked for crossing.
pub const PROXIMITY_THRESHOLD: f32 = 1.0;

#[derive(Debug)]
pub struct PortalPlugin;

impl Plugin for PortalPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Portal>().add_event::<TeleportEvent>();
    }
}

#[derive(Debug, SystemLabel)]
pub enum PortalLabels {
    TeleportEntities,
}

/// One side of a portal pair. The portal faces into the surface it is placed on.
#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
pub struct Portal {
    pub linked_portal: Option<Entity>,
}

/// Sent after an entity went through a portal.
#[derive(Debug, Clone, Copy)]
pub struct TeleportEvent {
    pub entity: Entity,
    pub entry: Entity,
    pub exit: Entity,
    pub tilted: bool,
}

/// Something that knows how to carry its own state through a portal pair.
pub trait Teleportable {
    /// Move `body` to the destination and adjust velocity and any view state.
    /// Returns whether the exit portal was tilted.
    fn teleport(
        &mut self,
        pair: &PortalPair,
        destination_position: Vec3,
        destination_rotation: Quat,
        body: &mut Transform,
        velocity: &mut Velocity,
    ) -> bool;
}

#[derive(Bundle)]
pub struct PortalBundle {
    #[bundle]
    pub mesh_bundle: PbrBundle,
    pub portal: Portal,
    pub collider: Collider,
    pub sensor: Sensor,
    pub collision_groups: CollisionGroups,
}

impl Default for PortalBundle {
    fn default() -> Self {
        PortalBundle {
            mesh_bundle: PbrBundle::default(),
            portal: Portal::default(),
            collider: Collider::cuboid(1., 1., 0.05),
            sensor: Sensor,
            collision_groups: CollisionGroups::new(PORTAL_GROUP, PLAYER_GROUP | PROPS_GROUP),
        }
    }
}

/// Spawn two portals linked to each other.
pub fn spawn_portal_pair(
    commands: &mut Commands,
    mesh: Handle<Mesh>,
    materials: [Handle<StandardMaterial>; 2],
    transforms: [Transform; 2],
) -> [Entity; 2] {
    let [material_a, material_b] = materials;
    let [transform_a, transform_b] = transforms;
    let portal_a = commands
        .spawn(PortalBundle {
            mesh_bundle: PbrBundle {
                mesh: mesh.clone(),
                material: material_a,
                transform: transform_a,
                ..default()
            },
            ..default()
        })
        .insert(Name::from("Portal A"))
        .id();
    let portal_b = commands
        .spawn(PortalBundle {
            mesh_bundle: PbrBundle {
                mesh,
                material: material_b,
                transform: transform_b,
                ..default()
            },
            portal: Portal {
                linked_portal: Some(portal_a),
            },
            ..default()
        })
        .insert(Name::from("Portal B"))
        .id();
    commands.entity(portal_a).insert(Portal {
        linked_portal: Some(portal_b),
    });
    info!("Spawned portal pair at {} and {}", transform_a.translation, transform_b.translation);
    [portal_a, portal_b]
}

/// Teleport every `T` that went through a linked portal this frame.
pub fn teleport_travellers<T: Teleportable + Component>(
    portals: Query<(Entity, &Transform, &Portal), Without<T>>,
    mut travellers: Query<(Entity, &mut T, &mut Transform, &mut Velocity)>,
    mut events: EventWriter<TeleportEvent>,
) {
    for (entity, mut traveller, mut transform, mut velocity) in &mut travellers {
        let crossing = portals.iter().find_map(|(entry_entity, entry, portal)| {
            let exit_entity = portal.linked_portal?;
            if !has_crossed(entry, transform.translation, PROXIMITY_THRESHOLD) {
                return None;
            }
            let (_, exit, _) = portals.get(exit_entity).ok()?;
            Some((entry_entity, *entry, exit_entity, *exit))
        });
        let Some((entry_entity, entry, exit_entity, exit)) = crossing else {
            continue;
        };

        let (position, rotation) = destination(&entry, &exit, &*transform);
        let pair = PortalPair::new(entry, exit);
        let tilted = traveller.teleport(&pair, position, rotation, &mut transform, &mut velocity);
        info!(
            "Teleported {:?} from portal {:?} to portal {:?} ({} exit)",
            entity,
            entry_entity,
            exit_entity,
            if tilted { "tilted" } else { "flat" }
        );
        events.send(TeleportEvent {
            entity,
            entry: entry_entity,
            exit: exit_entity,
            tilted,
        });
    }
}
