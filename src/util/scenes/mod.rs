use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::plugins::{physics::*, shader_globals::SphereMaskMaterial};

const WALL_THICKNESS: f32 = 1.;
const WALL_HEIGHT: f32 = 6.;
/// Underside of the jump shelf: out of reach of the ceiling probe while standing, hit while jumping.
pub const JUMP_SHELF_HEIGHT: f32 = 2.6;

/// A fixed box collider of the test scenes.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBlock {
    pub name: String,
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
    pub memberships: Group,
    pub color: Color,
}

impl StaticBlock {
    fn transform(&self) -> Transform {
        Transform::from_translation(self.center).with_rotation(self.rotation)
    }

    /// Lowest point of an unrotated block.
    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_extents.y
    }
}

/// Walls and shelf of a square arena of side `length`. The floor is spawned separately.
///
/// Walls belong to the ground layer as well, so a wall walking controller can climb them.
pub fn arena_blocks(length: f32) -> Vec<StaticBlock> {
    let half_len = length / 2.;
    let wall_colors = [Color::RED, Color::GREEN, Color::BLUE, Color::ANTIQUE_WHITE];

    let mut blocks: Vec<_> = wall_colors
        .into_iter()
        .enumerate()
        .map(|(i, color)| {
            let rotation = Quat::from_rotation_y(i as f32 * FRAC_PI_2);
            StaticBlock {
                name: format!("Wall_{i}"),
                center: rotation * Vec3::new(0., WALL_HEIGHT / 2., -(half_len + WALL_THICKNESS / 2.)),
                half_extents: Vec3::new(half_len, WALL_HEIGHT / 2., WALL_THICKNESS / 2.),
                rotation,
                memberships: WALLS_GROUP | GROUND_GROUP,
                color,
            }
        })
        .collect();

    blocks.push(StaticBlock {
        name: "Jump shelf".to_string(),
        center: Vec3::new(-half_len / 2., JUMP_SHELF_HEIGHT + 0.25, half_len / 2.),
        half_extents: Vec3::new(2., 0.25, 2.),
        rotation: Quat::IDENTITY,
        memberships: GROUND_GROUP,
        color: Color::GRAY,
    });
    blocks
}

fn spawn_static_block<M: Material>(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<M>,
    block: &StaticBlock,
) -> Entity {
    let size = block.half_extents * 2.;
    commands
        .spawn(MaterialMeshBundle {
            mesh: meshes.add(shape::Box::new(size.x, size.y, size.z).into()),
            material,
            transform: block.transform(),
            ..default()
        })
        .insert((
            Name::from(block.name.as_str()),
            RigidBody::Fixed,
            Collider::cuboid(block.half_extents.x, block.half_extents.y, block.half_extents.z),
            CollisionGroups::new(block.memberships, ALL_GROUPS),
        ))
        .id()
}

/// Spawn a square arena with a masked floor, climbable walls and a shelf low enough to bump into
/// when jumping.
pub fn make_test_arena(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    mask_materials: &mut Assets<SphereMaskMaterial>,
    length: f32,
) {
    let floor = StaticBlock {
        name: "Ground".to_string(),
        center: Vec3::new(0., -WALL_THICKNESS / 2., 0.),
        half_extents: Vec3::new(length / 2. + WALL_THICKNESS, WALL_THICKNESS / 2., length / 2. + WALL_THICKNESS),
        rotation: Quat::IDENTITY,
        memberships: GROUND_GROUP,
        color: Color::DARK_GRAY,
    };
    let floor_material = mask_materials.add(SphereMaskMaterial::from(floor.color));
    spawn_static_block(commands, meshes, floor_material, &floor);

    for block in arena_blocks(length) {
        let material = materials.add(StandardMaterial::from(block.color));
        spawn_static_block(commands, meshes, material, &block);
    }
}

/// Spawn a ramp steep enough that walking up it rotates a wall walking controller.
pub fn make_wall_walk_ramp(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    position: Vec3,
) {
    let ramp = StaticBlock {
        name: "Wall walk ramp".to_string(),
        center: position + Vec3::Y * 1.5,
        half_extents: Vec3::new(1.5, 0.1, 3.),
        rotation: Quat::from_rotation_x(FRAC_PI_6),
        memberships: GROUND_GROUP,
        color: Color::SEA_GREEN,
    };
    let material = materials.add(StandardMaterial::from(ramp.color));
    spawn_static_block(commands, meshes, material, &ramp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::first_person_controller::config::MovementConfig;

    #[test]
    fn walls_are_climbable_ground() {
        let blocks = arena_blocks(20.);
        let walls: Vec<_> = blocks.iter().filter(|b| b.name.starts_with("Wall")).collect();
        assert_eq!(walls.len(), 4);
        for wall in walls {
            assert!(wall.memberships.contains(GROUND_GROUP));
            // Inner face sits on the arena boundary.
            let inward = wall.rotation * Vec3::Z;
            let inner_face = wall.center + inward * WALL_THICKNESS / 2.;
            assert!((inner_face.x.abs().max(inner_face.z.abs()) - 10.).abs() < 1e-4);
        }
    }

    #[test]
    fn shelf_is_only_reached_by_jumping() {
        const STANDING_CENTER: f32 = 0.9;
        const CEILING_REACH: f32 = 1.0;
        let movement = MovementConfig::default();
        let apex = STANDING_CENTER + movement.jump_force.powi(2) / (2. * movement.gravity_force);

        let shelf = arena_blocks(20.)
            .into_iter()
            .find(|b| b.name == "Jump shelf")
            .unwrap();
        assert!((shelf.bottom() - JUMP_SHELF_HEIGHT).abs() < 1e-5);
        assert!(STANDING_CENTER + CEILING_REACH < shelf.bottom());
        assert!(apex + CEILING_REACH > shelf.bottom());
    }
}
