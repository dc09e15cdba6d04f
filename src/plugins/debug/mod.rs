pub mod draw;

use bevy::prelude::*;
use bevy_prototype_debug_lines::DebugLinesPlugin;

use super::first_person_controller::FirstPersonLabels;

#[derive(Debug)]
/// Development plugins intended for debug builds use.
pub struct DeveloperPlugins;

impl Plugin for DeveloperPlugins {
    fn build(&self, app: &mut App) {
        app.add_plugin(bevy_editor_pls::prelude::EditorPlugin)
            .add_plugin(bevy_inspector_egui_rapier::InspectableRapierPlugin)
            .add_plugin(DebugLinesPlugin::with_depth_test(true))
            .add_system(draw::draw_grounding_probes.after(FirstPersonLabels::PhysicsTick));
    }
}
