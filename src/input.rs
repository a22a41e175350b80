//! Source-agnostic input routing.
//!
//! Game code translates whatever raw devices it reads (keyboard, gamepad,
//! replay files) into named [`AxisInput`], [`AxisPairInput`], and
//! [`ActionInput`] events. [`route_inputs`] then forwards the bindings named
//! in [`InputBindings`] to every character snapshot and camera input in the
//! world, so the controller never touches device APIs directly.

use bevy::prelude::*;

use crate::camera::CameraInput;
use crate::intent::PlayerInputSnapshot;

/// A single named analog axis sample.
#[derive(Event, Debug, Clone)]
pub struct AxisInput {
    /// Binding name, matched against [`InputBindings`].
    pub name: String,
    /// Axis value for this frame.
    pub value: f32,
}

impl AxisInput {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self { name: name.into(), value }
    }
}

/// A named two-dimensional axis sample, such as a stick or mouse delta.
#[derive(Event, Debug, Clone)]
pub struct AxisPairInput {
    /// Binding name, matched against [`InputBindings`].
    pub name: String,
    /// Horizontal axis value.
    pub x: f32,
    /// Vertical axis value.
    pub y: f32,
}

impl AxisPairInput {
    pub fn new(name: impl Into<String>, x: f32, y: f32) -> Self {
        Self { name: name.into(), x, y }
    }

    pub fn value(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Which edge of a button press an [`ActionInput`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed,
    Released,
}

/// A named digital action edge.
#[derive(Event, Debug, Clone)]
pub struct ActionInput {
    /// Binding name, matched against [`InputBindings`].
    pub name: String,
    /// Whether the action was pressed or released.
    pub edge: ButtonEdge,
}

impl ActionInput {
    pub fn pressed(name: impl Into<String>) -> Self {
        Self { name: name.into(), edge: ButtonEdge::Pressed }
    }

    pub fn released(name: impl Into<String>) -> Self {
        Self { name: name.into(), edge: ButtonEdge::Released }
    }
}

/// Binding names the controller listens for.
#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    /// Axis pair driving planar movement (x = right, y = forward).
    pub move_axes: String,
    /// Axis pair driving camera look.
    pub look_axes: String,
    /// Axis driving camera zoom. Positive zooms out.
    pub zoom_axis: String,
    /// Action requesting a jump on its pressed edge.
    pub jump_action: String,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            move_axes: "move".into(),
            look_axes: "look".into(),
            zoom_axis: "zoom".into(),
            jump_action: "jump".into(),
        }
    }
}

/// Forward bound input events to character snapshots and camera inputs.
///
/// Move values overwrite the snapshot (axes report absolute deflection),
/// while look and zoom accumulate (deltas may arrive in several events per
/// frame). Only the pressed edge of the jump action latches the snapshot.
pub fn route_inputs(
    bindings: Res<InputBindings>,
    mut axis_events: EventReader<AxisInput>,
    mut pair_events: EventReader<AxisPairInput>,
    mut action_events: EventReader<ActionInput>,
    mut snapshots: Query<&mut PlayerInputSnapshot>,
    mut cameras: Query<&mut CameraInput>,
) {
    for event in pair_events.read() {
        if event.name == bindings.move_axes {
            for mut snapshot in &mut snapshots {
                snapshot.set_move(event.y, event.x);
            }
        } else if event.name == bindings.look_axes {
            for mut camera in &mut cameras {
                camera.add_look(event.value());
            }
        }
    }

    for event in axis_events.read() {
        if event.name == bindings.zoom_axis {
            for mut camera in &mut cameras {
                camera.add_zoom(event.value);
            }
        }
    }

    for event in action_events.read() {
        if event.name == bindings.jump_action && event.edge == ButtonEdge::Pressed {
            for mut snapshot in &mut snapshots {
                snapshot.jump_pressed = true;
            }
        }
    }
}
