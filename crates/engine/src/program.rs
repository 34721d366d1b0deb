use std::collections::HashMap;

use thiserror::Error;

use crate::api::{GraphicsApi, ShaderStage};

/// Why a program could not be built. Both variants are recoverable: the
/// session keeps its previous program and surfaces the diagnostic.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{stage} shader compile error:\n{diagnostic}")]
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },

    #[error("program link error:\n{diagnostic}")]
    Link { diagnostic: String },
}

/// Name → location table for a program's active uniforms. Built once at
/// link time, immutable afterward, and scoped to that program's lifetime.
#[derive(Debug)]
pub struct UniformTable<L> {
    locations: HashMap<String, L>,
}

impl<L> UniformTable<L> {
    fn new(pairs: Vec<(String, L)>) -> Self {
        Self {
            locations: pairs.into_iter().collect(),
        }
    }

    /// Location for `name`, or `None` when the program does not declare it
    /// (callers treat absence as "skip", never as an error).
    pub fn get(&self, name: &str) -> Option<&L> {
        self.locations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// A linked program together with its uniform table.
pub struct BuiltProgram<G: GraphicsApi> {
    pub(crate) program: G::Program,
    pub(crate) uniforms: UniformTable<G::Location>,
}

impl<G: GraphicsApi> BuiltProgram<G> {
    pub fn uniforms(&self) -> &UniformTable<G::Location> {
        &self.uniforms
    }
}

impl<G: GraphicsApi> std::fmt::Debug for BuiltProgram<G>
where
    G::Program: std::fmt::Debug,
    G::Location: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltProgram")
            .field("program", &self.program)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

/// Compiles and links a program from vertex and fragment source.
///
/// Each stage compiles independently; a fragment failure releases the
/// already-compiled vertex stage. Stage objects never outlive this call:
/// `link_stages` consumes and releases both on every path. On success the
/// active uniforms are enumerated into the table exactly once.
pub fn build_program<G: GraphicsApi>(
    gl: &G,
    vertex: &str,
    fragment: &str,
) -> Result<BuiltProgram<G>, BuildError> {
    let vertex_stage =
        gl.compile_stage(ShaderStage::Vertex, vertex)
            .map_err(|diagnostic| BuildError::Compile {
                stage: ShaderStage::Vertex,
                diagnostic,
            })?;

    let fragment_stage = match gl.compile_stage(ShaderStage::Fragment, fragment) {
        Ok(stage) => stage,
        Err(diagnostic) => {
            gl.release_stage(vertex_stage);
            return Err(BuildError::Compile {
                stage: ShaderStage::Fragment,
                diagnostic,
            });
        }
    };

    let program = gl
        .link_stages(vertex_stage, fragment_stage)
        .map_err(|diagnostic| BuildError::Link { diagnostic })?;

    let uniforms = UniformTable::new(gl.active_uniforms(&program));
    Ok(BuiltProgram { program, uniforms })
}
