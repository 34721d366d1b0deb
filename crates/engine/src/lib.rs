//! Shader-program lifecycle and parameter-binding engine.
//!
//! The engine owns everything between catalogue data and GL calls: building
//! programs with structured diagnostics (`program`), resolving descriptor
//! lists into live parameter state and visibility (`params`), writing frame
//! inputs and parameter values into uniforms once per frame (`binder`), and
//! orchestrating the single active program across switches (`session`). All
//! of it is written against the `GraphicsApi` capability trait (`api`);
//! `gpu` provides the glow-backed implementation used by the viewer binary.
mod api;
mod binder;
mod clock;
mod gpu;
mod params;
mod program;
mod session;
#[cfg(test)]
mod testgl;

pub use api::{GraphicsApi, ShaderStage};
pub use binder::{
    bind_frame, FrameInputs, FRAME_UNIFORM, POINTER_UNIFORM, RESOLUTION_UNIFORM, TIME_UNIFORM,
};
pub use clock::{BoxedTimeSource, SystemTimeSource, TimeSample, TimeSource};
pub use gpu::GlowContext;
pub use params::{ParameterState, VisibilityState};
pub use program::{build_program, BuildError, BuiltProgram, UniformTable};
pub use session::{PanelRow, Session, SessionError};
