use std::fmt;

/// Pipeline stage a shader source compiles into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Capability surface the engine consumes from a graphics backend.
///
/// The engine never talks to a GL context directly; everything it needs —
/// stage compilation, program linking, active-uniform enumeration, uniform
/// stores, and the full-viewport draw — goes through this trait. The shipped
/// implementation is [`crate::GlowContext`]; tests drive the engine with an
/// in-memory fake.
///
/// Diagnostics are plain strings because that is all the drivers provide;
/// the program builder wraps them into typed errors.
pub trait GraphicsApi {
    /// Compiled-but-unlinked shader stage object.
    type Stage;
    /// Linked program handle.
    type Program;
    /// Opaque uniform binding location.
    type Location: Clone;

    /// Compiles one stage. On failure the backend must have released the
    /// native stage object before returning the diagnostic text.
    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::Stage, String>;

    /// Releases a compiled stage that will not be linked.
    fn release_stage(&self, stage: Self::Stage);

    /// Links the two stages into a program. Both stages are consumed and
    /// released whether or not the link succeeds.
    fn link_stages(
        &self,
        vertex: Self::Stage,
        fragment: Self::Stage,
    ) -> Result<Self::Program, String>;

    /// Releases a linked program.
    fn release_program(&self, program: Self::Program);

    /// Enumerates every active uniform with its binding location. Uniforms
    /// the driver optimized away do not appear.
    fn active_uniforms(&self, program: &Self::Program) -> Vec<(String, Self::Location)>;

    /// Makes the program current for subsequent uniform stores and draws.
    fn bind_program(&self, program: &Self::Program);

    fn set_f32(&self, location: &Self::Location, value: f32);
    fn set_i32(&self, location: &Self::Location, value: i32);
    fn set_vec2(&self, location: &Self::Location, value: [f32; 2]);

    /// Issues the full-viewport triangle draw.
    fn draw(&self);
}
