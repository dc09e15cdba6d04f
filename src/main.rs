use bevy::prelude::*;

use portal_walker::plugins::game::GamePlugin;

fn main() {
    App::new().add_plugin(GamePlugin).run();
}
