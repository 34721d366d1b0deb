use glow::HasContext;

use crate::api::{GraphicsApi, ShaderStage};

/// glow-backed implementation of the capability surface, targeting an
/// OpenGL 3.3 core context.
///
/// The constructor creates and binds a vertex array once: the core profile
/// refuses to draw without one even though the full-screen triangle pulls
/// its corners out of `gl_VertexID` and uses no vertex buffers.
pub struct GlowContext {
    gl: glow::Context,
}

impl GlowContext {
    pub fn new(gl: glow::Context) -> Result<Self, String> {
        unsafe {
            let vao = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vao));
        }
        Ok(Self { gl })
    }

    /// Matches the GL viewport to the current draw-buffer size.
    pub fn set_viewport(&self, width: i32, height: i32) {
        unsafe {
            self.gl.viewport(0, 0, width.max(1), height.max(1));
        }
    }
}

impl GraphicsApi for GlowContext {
    type Stage = glow::Shader;
    type Program = glow::Program;
    type Location = glow::UniformLocation;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::Stage, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self.gl.create_shader(kind)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let diagnostic = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(diagnostic);
            }
            Ok(shader)
        }
    }

    fn release_stage(&self, stage: Self::Stage) {
        unsafe {
            self.gl.delete_shader(stage);
        }
    }

    fn link_stages(
        &self,
        vertex: Self::Stage,
        fragment: Self::Stage,
    ) -> Result<Self::Program, String> {
        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(diagnostic) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(diagnostic);
                }
            };
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);

            let linked = self.gl.get_program_link_status(program);
            let diagnostic = if linked {
                String::new()
            } else {
                self.gl.get_program_info_log(program)
            };

            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !linked {
                self.gl.delete_program(program);
                return Err(diagnostic);
            }
            Ok(program)
        }
    }

    fn release_program(&self, program: Self::Program) {
        unsafe {
            self.gl.delete_program(program);
        }
    }

    fn active_uniforms(&self, program: &Self::Program) -> Vec<(String, Self::Location)> {
        unsafe {
            let count = self.gl.get_active_uniforms(*program);
            let mut uniforms = Vec::with_capacity(count as usize);
            for index in 0..count {
                let Some(info) = self.gl.get_active_uniform(*program, index) else {
                    continue;
                };
                if let Some(location) = self.gl.get_uniform_location(*program, &info.name) {
                    uniforms.push((info.name, location));
                }
            }
            uniforms
        }
    }

    fn bind_program(&self, program: &Self::Program) {
        unsafe {
            self.gl.use_program(Some(*program));
        }
    }

    fn set_f32(&self, location: &Self::Location, value: f32) {
        unsafe {
            self.gl.uniform_1_f32(Some(location), value);
        }
    }

    fn set_i32(&self, location: &Self::Location, value: i32) {
        unsafe {
            self.gl.uniform_1_i32(Some(location), value);
        }
    }

    fn set_vec2(&self, location: &Self::Location, value: [f32; 2]) {
        unsafe {
            self.gl.uniform_2_f32(Some(location), value[0], value[1]);
        }
    }

    fn draw(&self) {
        unsafe {
            self.gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
    }
}
