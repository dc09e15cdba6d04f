//! Global shader parameters published by gameplay code.
//!
//! [`SphereMaskMaterial`] instances get their uniforms refreshed from [`ShaderGlobals`] whenever
//! the globals change.

use bevy::{
    prelude::*,
    reflect::TypeUuid,
    render::render_resource::{AsBindGroup, ShaderRef, ShaderType},
    utils::HashMap,
};

use crate::plugins::first_person_controller::config::{InsideSphereConfig, SphericalWorldConfig};

pub const PLAYER_POSITION: &str = "player_pos";
pub const MASK_RADIUS: &str = "mask_radius";
pub const SPHERE_X_AXIS: &str = "sphere_x_axis";
pub const SPHERE_Y_AXIS: &str = "sphere_y_axis";

/// Write-only sink for named shader globals.
pub trait ShaderParameterSink {
    fn set_float(&mut self, name: &str, value: f32);
    fn set_vector(&mut self, name: &str, value: Vec4);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShaderValue {
    Float(f32),
    Vector(Vec4),
}

#[derive(Debug, Default, Resource)]
pub struct ShaderGlobals {
    values: HashMap<String, ShaderValue>,
}

impl ShaderGlobals {
    pub fn get(&self, name: &str) -> Option<ShaderValue> {
        self.values.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            ShaderValue::Float(value) => Some(value),
            ShaderValue::Vector(_) => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        match self.get(name)? {
            ShaderValue::Vector(value) => Some(value),
            ShaderValue::Float(_) => None,
        }
    }
}

impl ShaderParameterSink for ShaderGlobals {
    fn set_float(&mut self, name: &str, value: f32) {
        self.values.insert(name.to_owned(), ShaderValue::Float(value));
    }

    fn set_vector(&mut self, name: &str, value: Vec4) {
        self.values.insert(name.to_owned(), ShaderValue::Vector(value));
    }
}

pub struct ShaderGlobalsPlugin;

impl Plugin for ShaderGlobalsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShaderGlobals>()
            .register_type::<SphereMaskMaterial>()
            .add_plugin(MaterialPlugin::<SphereMaskMaterial>::default())
            .add_system_to_stage(CoreStage::PostUpdate, sync_sphere_mask_materials);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, ShaderType, Reflect)]
pub struct SphereMaskUniform {
    pub player_pos: Vec4,
    /// Zero disables the mask.
    pub mask_radius: f32,
    pub sphere_x_axis: f32,
    pub sphere_y_axis: f32,
}

impl SphereMaskUniform {
    /// Read the uniform back from the globals. Missing values are zero.
    pub fn from_globals(globals: &ShaderGlobals) -> Self {
        SphereMaskUniform {
            player_pos: globals.vector(PLAYER_POSITION).unwrap_or(Vec4::ZERO),
            mask_radius: globals.float(MASK_RADIUS).unwrap_or(0.),
            sphere_x_axis: globals.float(SPHERE_X_AXIS).unwrap_or(0.),
            sphere_y_axis: globals.float(SPHERE_Y_AXIS).unwrap_or(0.),
        }
    }
}

#[derive(AsBindGroup, Debug, Clone, TypeUuid, Reflect)]
#[uuid = "6f1d2c8e-4b0a-4e55-9a3d-2f8c71b6e0a4"]
/// Flat colored surface, cut around the player by the inside-sphere mask and shaded by the
/// curved world parameters.
pub struct SphereMaskMaterial {
    #[uniform(0)]
    pub base_color: Color,
    #[uniform(1)]
    pub mask: SphereMaskUniform,
}

impl From<Color> for SphereMaskMaterial {
    fn from(base_color: Color) -> Self {
        SphereMaskMaterial {
            base_color,
            mask: default(),
        }
    }
}

impl Material for SphereMaskMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/sphere_mask.wgsl".into()
    }
}

fn sync_sphere_mask_materials(globals: Res<ShaderGlobals>, mut materials: ResMut<Assets<SphereMaskMaterial>>) {
    if !globals.is_changed() {
        return;
    }
    let mask = SphereMaskUniform::from_globals(&globals);
    for (_, material) in materials.iter_mut() {
        material.mask = mask;
    }
}

/// Parameters of the mask that reveals the inside of a sphere around the player.
pub fn publish_inside_sphere(sink: &mut impl ShaderParameterSink, player: Vec3, config: &InsideSphereConfig) {
    sink.set_vector(PLAYER_POSITION, player.extend(0.));
    sink.set_float(MASK_RADIUS, config.radius);
}

/// Parameters of the curved world effect. The player position is left to the inside-sphere
/// mask when that one is active.
pub fn publish_spherical_world(
    sink: &mut impl ShaderParameterSink,
    player: Vec3,
    inside_sphere: bool,
    config: &SphericalWorldConfig,
) {
    if !inside_sphere {
        sink.set_vector(PLAYER_POSITION, player.extend(0.));
    }
    sink.set_float(SPHERE_X_AXIS, config.x_axis);
    sink.set_float(SPHERE_Y_AXIS, config.y_axis);
}
