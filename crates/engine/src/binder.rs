use catalogue::{ParamKind, ParameterDescriptor};

use crate::api::GraphicsApi;
use crate::params::ParameterState;
use crate::program::BuiltProgram;

/// Built-in uniform names a program opts into by declaring them. Programs
/// that leave one undeclared simply do not receive it.
pub const TIME_UNIFORM: &str = "u_time";
pub const RESOLUTION_UNIFORM: &str = "u_resolution";
pub const POINTER_UNIFORM: &str = "u_mouse";
pub const FRAME_UNIFORM: &str = "u_frame";

/// Per-frame inputs. Recomputed every tick and passed by value; nothing
/// here touches the heap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    /// Seconds since the active program was loaded.
    pub time_seconds: f32,
    /// Draw-buffer dimensions in physical pixels.
    pub resolution: [f32; 2],
    /// Pointer position in draw-buffer coordinates, Y from the bottom.
    pub pointer: [f32; 2],
    /// Frames rendered since the active program was loaded.
    pub frame_index: i32,
}

/// Maps frame inputs and parameter state onto the program's uniforms.
///
/// Runs exactly once per frame, after the program is made current.
/// Built-ins go first, then parameters in descriptor order; any uniform
/// missing from the table is skipped silently. Integer-kind parameters are
/// quantized with round-half-away-from-zero, matching the panel formatter.
/// The uniform table and descriptor slice are borrowed as-is — no binding
/// structures are allocated here.
pub fn bind_frame<G: GraphicsApi>(
    gl: &G,
    built: &BuiltProgram<G>,
    inputs: FrameInputs,
    state: &ParameterState,
    descriptors: &[ParameterDescriptor],
) {
    let table = built.uniforms();

    if let Some(location) = table.get(TIME_UNIFORM) {
        gl.set_f32(location, inputs.time_seconds);
    }
    if let Some(location) = table.get(RESOLUTION_UNIFORM) {
        gl.set_vec2(location, inputs.resolution);
    }
    if let Some(location) = table.get(POINTER_UNIFORM) {
        gl.set_vec2(location, inputs.pointer);
    }
    if let Some(location) = table.get(FRAME_UNIFORM) {
        gl.set_i32(location, inputs.frame_index);
    }

    for descriptor in descriptors {
        let Some(location) = table.get(&descriptor.uniform) else {
            continue;
        };
        let Some(value) = state.get(&descriptor.uniform) else {
            continue;
        };
        match descriptor.kind {
            ParamKind::Int | ParamKind::Select => gl.set_i32(location, value.round() as i32),
            ParamKind::Float => gl.set_f32(location, value as f32),
        }
    }
}
