use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_mod_openxr::add_xr_plugins;

pub mod select_input;
pub mod setup;
pub mod sketch;

use select_input::SelectInputPlugin;
use sketch::SketchPlugin;

#[bevy_main]
pub fn main() {
    color_eyre::install().unwrap();

    info!("Running xr_blockout");
    let mut app = App::new();

    app
        //the usual diagnostic stuff
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins(FrameTimeDiagnosticsPlugin)
        //xr defaults
        .add_plugins(add_xr_plugins(DefaultPlugins))
        .insert_resource(ClearColor(Color::srgb_u8(0x80, 0x80, 0x80)))
        //the starting scene
        .add_systems(Startup, setup::setup_scene)
        //point pair sketching and the controllers driving it
        .add_plugins(SketchPlugin)
        .add_plugins(SelectInputPlugin);

    app.run();
}
