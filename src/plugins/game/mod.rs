use std::f32::consts::*;

use crate::{
    plugins::{
        first_person_controller::{
            ControllerConfig, FirstPersonControllerPlugin, FirstPersonControllerSpawner, FootstepSounds,
            ProjectileTemplate,
        },
        input::InputPlugin,
        physics::*,
        portal::{spawn_portal_pair, PortalPlugin},
        scaled_mass::{ScaledMassBody, ScaledMassPlugin},
        shader_globals::{ShaderGlobalsPlugin, SphereMaskMaterial},
    },
    util::scenes::{make_test_arena, make_wall_walk_ramp},
};

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

const PROJECTILE_RADIUS: f32 = 0.1;
const PROJECTILE_MASS: f32 = 0.1;
const FOOTSTEP_CLIPS: usize = 4;

#[derive(Debug)]
/// Main game plugin, responsible for loading the other game plugins and bootstrapping the game.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            window: WindowDescriptor {
                title: "Portal Walker".to_string(),
                width: 1280.,
                height: 720.,
                ..default()
            },
            ..default()
        }));

        #[cfg(feature = "devel")]
        {
            app.add_plugin(crate::plugins::debug::DeveloperPlugins);
        }

        app.add_plugin(RapierPhysicsPlugin::<NoUserData>::default());
        app.add_plugin(PhysicsPlugin);
        app.add_plugin(FirstPersonControllerPlugin);
        app.add_plugin(InputPlugin);
        app.add_plugin(PortalPlugin);
        app.add_plugin(ShaderGlobalsPlugin);
        app.add_plugin(ScaledMassPlugin);

        app.add_startup_system(setup);
    }
}

/// Perform game initialization
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut mask_materials: ResMut<Assets<SphereMaskMaterial>>,
    asset_server: Res<AssetServer>,
    config: Res<ControllerConfig>,
) {
    make_test_arena(&mut commands, &mut meshes, &mut materials, &mut mask_materials, 20.);
    if config.wall_walk.enabled {
        make_wall_walk_ramp(&mut commands, &mut meshes, &mut materials, Vec3::new(5., 0., 5.));
    }

    // Light
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            color: Color::ANTIQUE_WHITE,
            illuminance: 20_000.,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform {
            translation: Vec3::Y * 5.,
            rotation: Quat::from_euler(EulerRot::YXZ, FRAC_PI_4, -FRAC_PI_4, 0.),
            scale: Vec3::ONE,
        },
        ..default()
    });

    // Spawn player
    commands.spawn((
        SpatialBundle::from(Transform::from_xyz(0., 1., 0.)),
        FirstPersonControllerSpawner {},
    ));

    // Crate whose mass follows its scale
    commands
        .spawn(PbrBundle {
            mesh: meshes.add(shape::Cube { size: 1. }.into()),
            material: materials.add(StandardMaterial::from(Color::ORANGE)),
            transform: Transform::from_xyz(-3., 1., -3.).with_scale(Vec3::splat(1.5)),
            ..default()
        })
        .insert((
            Name::from("Scaled crate"),
            RigidBody::Dynamic,
            Collider::cuboid(0.5, 0.5, 0.5),
            ColliderMassProperties::Mass(1.),
            ExternalForce::default(),
            Velocity::default(),
            CollisionGroups::new(PROPS_GROUP, ALL_GROUPS),
            ScaledMassBody::default(),
        ));

    // Free standing portals, crossed from their visible face
    let portal_mesh = meshes.add(shape::Quad::new(Vec2::new(2., 2.)).into());
    let portal_materials = [
        materials.add(StandardMaterial::from(Color::ORANGE_RED)),
        materials.add(StandardMaterial::from(Color::MIDNIGHT_BLUE)),
    ];
    spawn_portal_pair(
        &mut commands,
        portal_mesh,
        portal_materials,
        [
            Transform::from_xyz(0., 1., -5.),
            Transform::from_xyz(5., 1., 0.).with_rotation(Quat::from_rotation_y(-FRAC_PI_2)),
        ],
    );

    commands.insert_resource(ProjectileTemplate {
        radius: PROJECTILE_RADIUS,
        mass: PROJECTILE_MASS,
        mesh: meshes.add(
            shape::UVSphere {
                radius: PROJECTILE_RADIUS,
                ..default()
            }
            .into(),
        ),
        material: materials.add(StandardMaterial::from(Color::YELLOW)),
    });

    if config.sound.enabled {
        let load_clips = |kind: &str| -> Vec<Handle<AudioSource>> {
            (0..FOOTSTEP_CLIPS)
                .map(|i| asset_server.load(format!("sounds/footstep_{kind}_{i}.ogg").as_str()))
                .collect()
        };
        commands.insert_resource(FootstepSounds::new(load_clips("walk"), load_clips("sprint")));
    }
}
