//! OpenXR side of the sketcher: a select action and a grip pose per hand,
//! tracked controller entities, and rising edge detection that turns trigger
//! pulls into [`SelectStarted`] events.

use std::ops::Deref;

use bevy::prelude::*;
use bevy_mod_openxr::{
    action_binding::{OxrSendActionBindings, OxrSuggestActionBinding},
    action_set_attaching::OxrAttachActionSet,
    action_set_syncing::{OxrActionSetSyncSet, OxrSyncActionSet},
    openxr_session_running,
    resources::OxrInstance,
    session::OxrSession,
    spaces::OxrSpaceExt,
};
use bevy_mod_xr::{
    session::{session_available, XrSessionCreated},
    spaces::XrSpace,
};
use openxr::Posef;

use crate::sketch::{SelectStarted, SketchSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Component)]
pub enum Hand {
    Left,
    Right,
}

#[derive(Resource)]
pub struct SelectActions {
    set: openxr::ActionSet,
    select: openxr::Action<bool>,
    grip_pose: openxr::Action<Posef>,
    left_path: openxr::Path,
    right_path: openxr::Path,
}

pub struct SelectInputPlugin;

impl Plugin for SelectInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, create_actions.run_if(session_available));
        app.add_systems(OxrSendActionBindings, suggest_bindings);
        app.add_systems(XrSessionCreated, (attach_action_set, spawn_controllers));
        app.add_systems(
            PreUpdate,
            sync_action_set
                .before(OxrActionSetSyncSet)
                .run_if(openxr_session_running),
        );
        app.add_systems(
            Update,
            emit_select_events
                .before(SketchSet)
                .run_if(openxr_session_running),
        );
    }
}

fn create_actions(instance: Res<OxrInstance>, mut commands: Commands) {
    let left_path = instance.string_to_path("/user/hand/left").unwrap();
    let right_path = instance.string_to_path("/user/hand/right").unwrap();
    let set = instance
        .create_action_set("blockout", "Blockout", 0)
        .unwrap();
    let select = set
        .create_action("select", "Select Corner", &[left_path, right_path])
        .unwrap();
    let grip_pose = set
        .create_action("grip_pose", "Controller Grip Pose", &[left_path, right_path])
        .unwrap();

    commands.insert_resource(SelectActions {
        set,
        select,
        grip_pose,
        left_path,
        right_path,
    });
}

fn suggest_bindings(
    actions: Res<SelectActions>,
    mut bindings: EventWriter<OxrSuggestActionBinding>,
) {
    // select maps to whatever the profile calls its primary trigger
    for (profile, input) in [
        ("/interaction_profiles/khr/simple_controller", "select/click"),
        ("/interaction_profiles/oculus/touch_controller", "trigger/value"),
        ("/interaction_profiles/valve/index_controller", "trigger/click"),
        ("/interaction_profiles/htc/vive_controller", "trigger/click"),
    ] {
        bindings.send(OxrSuggestActionBinding {
            action: actions.select.as_raw(),
            interaction_profile: profile.into(),
            bindings: vec![
                format!("/user/hand/left/input/{input}").into(),
                format!("/user/hand/right/input/{input}").into(),
            ],
        });
        bindings.send(OxrSuggestActionBinding {
            action: actions.grip_pose.as_raw(),
            interaction_profile: profile.into(),
            bindings: vec![
                "/user/hand/left/input/grip/pose".into(),
                "/user/hand/right/input/grip/pose".into(),
            ],
        });
    }
}

fn attach_action_set(actions: Res<SelectActions>, mut attach: EventWriter<OxrAttachActionSet>) {
    attach.send(OxrAttachActionSet(actions.set.clone()));
}

fn sync_action_set(actions: Res<SelectActions>, mut sync: EventWriter<OxrSyncActionSet>) {
    sync.send(OxrSyncActionSet(actions.set.clone()));
}

/// Spawn one visual per hand, tracked by its grip action space.
fn spawn_controllers(
    actions: Res<SelectActions>,
    session: Res<OxrSession>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Cuboid::new(0.04, 0.04, 0.12));
    let material = materials.add(Color::srgb_u8(0x40, 0x40, 0x40));
    for (hand, path) in [
        (Hand::Left, actions.left_path),
        (Hand::Right, actions.right_path),
    ] {
        let space = XrSpace::from_openxr_space(
            actions
                .grip_pose
                .create_space(session.deref().deref().clone(), path, Posef::IDENTITY)
                .unwrap(),
        );
        commands.spawn((
            PbrBundle {
                mesh: mesh.clone(),
                material: material.clone(),
                ..default()
            },
            space,
            hand,
        ));
    }
}

/// A select event fires when the action went from released to pressed since
/// the last sync, at the current position of the controller that pressed it.
fn emit_select_events(
    actions: Res<SelectActions>,
    session: Res<OxrSession>,
    controllers: Query<(&Transform, &Hand)>,
    mut writer: EventWriter<SelectStarted>,
) {
    for (hand, path) in [
        (Hand::Left, actions.left_path),
        (Hand::Right, actions.right_path),
    ] {
        let state = match actions.select.state(&session, path) {
            Ok(state) => state,
            Err(err) => {
                warn!("unable to read select action state: {err}");
                continue;
            }
        };
        if !(state.is_active && state.current_state && state.changed_since_last_sync) {
            continue;
        }
        match controllers.iter().find(|(_, h)| **h == hand) {
            Some((transform, _)) => {
                debug!("select started on {hand:?} at {}", transform.translation);
                writer.send(SelectStarted {
                    position: transform.translation,
                });
            }
            None => warn!("select started on {hand:?} but it has no controller entity"),
        }
    }
}
