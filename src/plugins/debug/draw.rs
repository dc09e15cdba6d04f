use bevy::prelude::*;
use bevy_prototype_debug_lines::DebugLines;

use crate::plugins::first_person_controller::FirstPersonController;

/// Draw the grounding and ceiling probes of every controller, plus its wall walking up direction.
pub fn draw_grounding_probes(
    mut lines: ResMut<DebugLines>,
    players: Query<(&FirstPersonController, &Transform)>,
) {
    for (controller, transform) in &players {
        let (position, rotation) = (transform.translation, transform.rotation);
        let ground_color = if controller.flags.grounded {
            Color::GREEN
        } else {
            Color::RED
        };

        for probe in controller.sensor.ground_probes(position, rotation) {
            lines.line_colored(probe.origin, probe.origin + probe.direction * probe.length, 0., ground_color);
        }

        let ceiling = controller.sensor.ceiling_probe(position, rotation);
        lines.line_colored(ceiling.origin, ceiling.origin + ceiling.direction * ceiling.length, 0., Color::YELLOW);

        lines.line_colored(position, position + controller.wall_walk.surface_direction, 0., Color::CYAN);
    }
}
