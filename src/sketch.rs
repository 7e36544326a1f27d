//! Point pair sketching: every select event marks a corner, every completed
//! pair of corners spawns a box spanning them.

use bevy::prelude::*;

/// Fired by the input layer whenever a controller starts a select, carrying
/// the controller position at that moment. Which hand fired it does not
/// matter here, both feed the same pair.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectStarted {
    pub position: Vec3,
}

/// Set containing the systems that react to [`SelectStarted`] events.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct SketchSet;

/// Small red sphere marking a selected corner of the pair in progress.
#[derive(Component)]
pub struct CornerMarker;

/// A box spawned from a completed corner pair. Untracked once spawned.
#[derive(Component)]
pub struct SketchedBlock;

/// Appearance of the markers and blocks. Insert before [`SketchPlugin`] to
/// override the defaults.
#[derive(Resource, Clone, Copy)]
pub struct SketchConfig {
    pub marker_radius: f32,
    pub marker_color: Color,
    pub block_color: Color,
}

impl Default for SketchConfig {
    fn default() -> Self {
        SketchConfig {
            marker_radius: 0.01,
            marker_color: Color::srgb_u8(0xff, 0x00, 0x00),
            block_color: Color::srgb_u8(0x00, 0xff, 0x00),
        }
    }
}

/// Where the current pair stands. Cycles indefinitely, there is no terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SketchState {
    #[default]
    Empty,
    FirstCorner(Vec3),
    CornerPair(Vec3, Vec3),
}

/// Scene mutations requested by a transition, applied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SketchEffect {
    /// Despawn both markers of the finished pair.
    ClearMarkers,
    /// Spawn a corner marker at the position.
    SpawnMarker(Vec3),
    /// Spawn a block spanning the pair. Extents are signed per axis, a second
    /// corner below the first on some axis just flips the winding, same as
    /// the markers were placed.
    SpawnBlock { center: Vec3, extents: Vec3 },
}

impl SketchState {
    /// Advance the state machine with a select at `position`.
    #[must_use]
    pub fn on_select(self, position: Vec3) -> (SketchState, Vec<SketchEffect>) {
        match self {
            SketchState::Empty => (
                SketchState::FirstCorner(position),
                vec![SketchEffect::SpawnMarker(position)],
            ),
            // a select while a pair is still displayed starts the next pair
            SketchState::CornerPair(_, _) => (
                SketchState::FirstCorner(position),
                vec![
                    SketchEffect::ClearMarkers,
                    SketchEffect::SpawnMarker(position),
                ],
            ),
            SketchState::FirstCorner(first) => {
                let extents = position - first;
                let center = first + extents / 2.0;
                (
                    SketchState::CornerPair(first, position),
                    vec![
                        SketchEffect::SpawnMarker(position),
                        SketchEffect::SpawnBlock { center, extents },
                    ],
                )
            }
        }
    }
}

/// The single owner of the selector state, plus the entities of the markers
/// currently on display so ClearMarkers removes exactly those.
#[derive(Resource, Default)]
pub struct Sketch {
    pub state: SketchState,
    markers: Vec<Entity>,
}

/// Marker mesh and material are shared across all markers.
#[derive(Resource)]
struct MarkerAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

fn setup_marker_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<SketchConfig>,
) {
    commands.insert_resource(MarkerAssets {
        mesh: meshes.add(Sphere::new(config.marker_radius).mesh().uv(32, 32)),
        material: materials.add(config.marker_color),
    });
}

fn handle_select_events(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    marker_assets: Res<MarkerAssets>,
    config: Res<SketchConfig>,
    mut sketch: ResMut<Sketch>,
    mut events: EventReader<SelectStarted>,
) {
    for event in events.read() {
        let (next, effects) = sketch.state.on_select(event.position);
        sketch.state = next;
        for effect in effects {
            match effect {
                SketchEffect::ClearMarkers => {
                    for marker in sketch.markers.drain(..) {
                        commands.entity(marker).despawn();
                    }
                }
                SketchEffect::SpawnMarker(position) => {
                    let marker = commands
                        .spawn((
                            PbrBundle {
                                mesh: marker_assets.mesh.clone(),
                                material: marker_assets.material.clone(),
                                transform: Transform::from_translation(position),
                                ..default()
                            },
                            CornerMarker,
                        ))
                        .id();
                    sketch.markers.push(marker);
                }
                SketchEffect::SpawnBlock { center, extents } => {
                    info!("spawning block at {} with extents {}", center, extents);
                    commands.spawn((
                        PbrBundle {
                            mesh: meshes.add(Cuboid::new(extents.x, extents.y, extents.z)),
                            material: materials.add(config.block_color),
                            transform: Transform::from_translation(center),
                            ..default()
                        },
                        SketchedBlock,
                    ));
                }
            }
        }
    }
}

pub struct SketchPlugin;

impl Plugin for SketchPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SketchConfig>()
            .init_resource::<Sketch>()
            .add_event::<SelectStarted>()
            .add_systems(Startup, setup_marker_assets)
            .add_systems(Update, handle_select_events.in_set(SketchSet));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::AssetPlugin;

    #[test]
    fn first_select_marks_a_corner() {
        let (state, effects) = SketchState::Empty.on_select(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state, SketchState::FirstCorner(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(
            effects,
            vec![SketchEffect::SpawnMarker(Vec3::new(1.0, 2.0, 3.0))]
        );
    }

    #[test]
    fn second_select_completes_the_pair() {
        let (state, _) = SketchState::Empty.on_select(Vec3::ZERO);
        let (state, effects) = state.on_select(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(
            state,
            SketchState::CornerPair(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(
            effects,
            vec![
                SketchEffect::SpawnMarker(Vec3::new(2.0, 0.0, 0.0)),
                SketchEffect::SpawnBlock {
                    center: Vec3::new(1.0, 0.0, 0.0),
                    extents: Vec3::new(2.0, 0.0, 0.0),
                },
            ]
        );
    }

    #[test]
    fn select_after_a_pair_starts_over() {
        let (state, _) = SketchState::Empty.on_select(Vec3::ZERO);
        let (state, _) = state.on_select(Vec3::ONE);
        let (state, effects) = state.on_select(Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(state, SketchState::FirstCorner(Vec3::new(5.0, 1.0, 1.0)));
        assert_eq!(
            effects,
            vec![
                SketchEffect::ClearMarkers,
                SketchEffect::SpawnMarker(Vec3::new(5.0, 1.0, 1.0)),
            ]
        );
    }

    #[test]
    fn extents_keep_their_sign() {
        let (state, _) = SketchState::Empty.on_select(Vec3::new(2.0, 2.0, 2.0));
        let (_, effects) = state.on_select(Vec3::ZERO);
        assert_eq!(
            effects[1],
            SketchEffect::SpawnBlock {
                center: Vec3::ONE,
                extents: Vec3::new(-2.0, -2.0, -2.0),
            }
        );
    }

    #[test]
    fn coincident_corners_make_a_degenerate_block() {
        let point = Vec3::new(5.0, 1.0, 1.0);
        let (state, effects) = SketchState::FirstCorner(point).on_select(point);
        assert_eq!(state, SketchState::CornerPair(point, point));
        assert_eq!(
            effects[1],
            SketchEffect::SpawnBlock {
                center: point,
                extents: Vec3::ZERO,
            }
        );
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()));
        app.init_asset::<Mesh>();
        app.init_asset::<StandardMaterial>();
        app.add_plugins(SketchPlugin);
        // run Startup so the marker assets exist
        app.update();
        app
    }

    fn select(app: &mut App, position: Vec3) {
        app.world_mut().send_event(SelectStarted { position });
        app.update();
    }

    fn marker_positions(app: &mut App) -> Vec<Vec3> {
        let mut query = app
            .world_mut()
            .query_filtered::<&Transform, With<CornerMarker>>();
        query.iter(app.world()).map(|t| t.translation).collect()
    }

    fn block_positions(app: &mut App) -> Vec<Vec3> {
        let mut query = app
            .world_mut()
            .query_filtered::<&Transform, With<SketchedBlock>>();
        query.iter(app.world()).map(|t| t.translation).collect()
    }

    fn state(app: &App) -> SketchState {
        app.world().resource::<Sketch>().state
    }

    #[test]
    fn one_select_displays_one_marker() {
        let mut app = test_app();
        select(&mut app, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state(&app), SketchState::FirstCorner(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(marker_positions(&mut app), vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert!(block_positions(&mut app).is_empty());
    }

    #[test]
    fn a_pair_displays_two_markers_and_a_block() {
        let mut app = test_app();
        select(&mut app, Vec3::ZERO);
        select(&mut app, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(
            state(&app),
            SketchState::CornerPair(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(marker_positions(&mut app).len(), 2);
        assert_eq!(block_positions(&mut app), vec![Vec3::new(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn starting_over_clears_markers_but_keeps_blocks() {
        let mut app = test_app();
        select(&mut app, Vec3::ZERO);
        select(&mut app, Vec3::new(2.0, 0.0, 0.0));
        select(&mut app, Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(state(&app), SketchState::FirstCorner(Vec3::new(5.0, 1.0, 1.0)));
        assert_eq!(marker_positions(&mut app), vec![Vec3::new(5.0, 1.0, 1.0)]);
        // the block from the finished pair stays
        assert_eq!(block_positions(&mut app), vec![Vec3::new(1.0, 0.0, 0.0)]);
    }

    #[test]
    fn four_selects_make_exactly_two_blocks() {
        let mut app = test_app();
        select(&mut app, Vec3::ZERO);
        select(&mut app, Vec3::new(2.0, 0.0, 0.0));
        select(&mut app, Vec3::new(5.0, 1.0, 1.0));
        select(&mut app, Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(block_positions(&mut app).len(), 2);
        assert_eq!(
            state(&app),
            SketchState::CornerPair(Vec3::new(5.0, 1.0, 1.0), Vec3::new(5.0, 1.0, 1.0))
        );
    }

    #[test]
    fn rendering_between_selects_changes_nothing() {
        let mut app = test_app();
        select(&mut app, Vec3::ZERO);
        for _ in 0..32 {
            app.update();
        }
        assert_eq!(state(&app), SketchState::FirstCorner(Vec3::ZERO));
        assert_eq!(marker_positions(&mut app).len(), 1);
        assert!(block_positions(&mut app).is_empty());
    }

    #[test]
    fn both_hands_selecting_in_one_frame_apply_in_order() {
        let mut app = test_app();
        app.world_mut().send_event(SelectStarted { position: Vec3::ZERO });
        app.world_mut()
            .send_event(SelectStarted { position: Vec3::new(0.0, 1.0, 0.0) });
        app.update();
        assert_eq!(
            state(&app),
            SketchState::CornerPair(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0))
        );
        assert_eq!(marker_positions(&mut app).len(), 2);
        assert_eq!(block_positions(&mut app), vec![Vec3::new(0.0, 0.5, 0.0)]);
    }

    #[test]
    fn three_selects_in_one_frame_leave_one_live_marker_pair() {
        let mut app = test_app();
        for position in [Vec3::ZERO, Vec3::ONE, Vec3::new(3.0, 0.0, 0.0)] {
            app.world_mut().send_event(SelectStarted { position });
        }
        app.update();
        assert_eq!(state(&app), SketchState::FirstCorner(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(marker_positions(&mut app), vec![Vec3::new(3.0, 0.0, 0.0)]);
        assert_eq!(block_positions(&mut app).len(), 1);
    }
}
