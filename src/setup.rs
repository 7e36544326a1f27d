use bevy::prelude::*;

/// set up the room: floor, lights and a camera for running flat
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // floor
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(4.0, 4.0)),
        material: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0xee, 0xee, 0xee),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        }),
        ..default()
    });
    // light
    commands.insert_resource(AmbientLight {
        color: Color::srgb_u8(0x80, 0x80, 0x80),
        brightness: 400.0,
    });
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 6.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
        ..default()
    });
    // camera
    commands.spawn(Camera3dBundle {
        projection: PerspectiveProjection {
            fov: 50.0_f32.to_radians(),
            near: 0.1,
            far: 10.0,
            ..default()
        }
        .into(),
        transform: Transform::from_xyz(0.0, 1.6, 3.0),
        ..default()
    });
}
