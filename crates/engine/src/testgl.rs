//! Scripted in-memory `GraphicsApi` used by the engine's unit tests.
//!
//! The fake treats any `uniform <type> <name>;` declaration in a stage
//! source as an active uniform, so tests control the uniform table through
//! ordinary-looking shader text. Failures are injected one-shot through
//! the shared [`GlProbe`], which also records stage/program lifecycles and
//! every uniform store for later assertions.
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::api::{GraphicsApi, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub enum Store {
    F32(f32),
    I32(i32),
    Vec2([f32; 2]),
}

#[derive(Default)]
pub struct GlLog {
    pub stages_created: usize,
    pub stages_released: usize,
    pub programs_created: usize,
    pub programs_released: usize,
    pub bound_programs: Vec<u32>,
    pub stores: Vec<(String, Store)>,
    pub draws: usize,
}

#[derive(Clone, Default)]
pub struct GlProbe {
    log: Rc<RefCell<GlLog>>,
    fail_compile: Rc<RefCell<Option<(ShaderStage, String)>>>,
    fail_link: Rc<RefCell<Option<String>>>,
}

impl GlProbe {
    pub fn fail_next_compile(&self, stage: ShaderStage, diagnostic: &str) {
        *self.fail_compile.borrow_mut() = Some((stage, diagnostic.to_string()));
    }

    pub fn fail_next_link(&self, diagnostic: &str) {
        *self.fail_link.borrow_mut() = Some(diagnostic.to_string());
    }

    pub fn log(&self) -> Ref<'_, GlLog> {
        self.log.borrow()
    }

    /// (created, released) stage counts; equal means nothing leaked.
    pub fn stage_balance(&self) -> (usize, usize) {
        let log = self.log.borrow();
        (log.stages_created, log.stages_released)
    }

    pub fn programs_alive(&self) -> usize {
        let log = self.log.borrow();
        log.programs_created - log.programs_released
    }

    pub fn stores_for(&self, name: &str) -> Vec<Store> {
        self.log
            .borrow()
            .stores
            .iter()
            .filter(|(stored, _)| stored == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    pub fn last_store(&self, name: &str) -> Option<Store> {
        self.stores_for(name).pop()
    }

    pub fn draw_count(&self) -> usize {
        self.log.borrow().draws
    }
}

pub struct FakeStage {
    uniforms: Vec<String>,
}

#[derive(Debug)]
pub struct FakeProgram {
    pub id: u32,
    uniforms: Vec<String>,
}

pub struct FakeGl {
    probe: GlProbe,
    next_program: Cell<u32>,
}

impl FakeGl {
    pub fn new() -> (Self, GlProbe) {
        let probe = GlProbe::default();
        (
            Self {
                probe: probe.clone(),
                next_program: Cell::new(1),
            },
            probe,
        )
    }
}

fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed.strip_prefix("uniform ")?;
            let name = rest.split_whitespace().nth(1)?;
            Some(name.trim_end_matches(';').to_string())
        })
        .collect()
}

impl GraphicsApi for FakeGl {
    type Stage = FakeStage;
    type Program = FakeProgram;
    type Location = String;

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::Stage, String> {
        let pending = self.probe.fail_compile.borrow_mut().take();
        if let Some((failing_stage, diagnostic)) = pending {
            if failing_stage == stage {
                return Err(diagnostic);
            }
            *self.probe.fail_compile.borrow_mut() = Some((failing_stage, diagnostic));
        }
        self.probe.log.borrow_mut().stages_created += 1;
        Ok(FakeStage {
            uniforms: declared_uniforms(source),
        })
    }

    fn release_stage(&self, _stage: Self::Stage) {
        self.probe.log.borrow_mut().stages_released += 1;
    }

    fn link_stages(
        &self,
        vertex: Self::Stage,
        fragment: Self::Stage,
    ) -> Result<Self::Program, String> {
        let mut log = self.probe.log.borrow_mut();
        log.stages_released += 2;

        if let Some(diagnostic) = self.probe.fail_link.borrow_mut().take() {
            return Err(diagnostic);
        }

        let mut uniforms = vertex.uniforms;
        for name in fragment.uniforms {
            if !uniforms.contains(&name) {
                uniforms.push(name);
            }
        }
        let id = self.next_program.get();
        self.next_program.set(id + 1);
        log.programs_created += 1;
        Ok(FakeProgram { id, uniforms })
    }

    fn release_program(&self, _program: Self::Program) {
        self.probe.log.borrow_mut().programs_released += 1;
    }

    fn active_uniforms(&self, program: &Self::Program) -> Vec<(String, Self::Location)> {
        program
            .uniforms
            .iter()
            .map(|name| (name.clone(), name.clone()))
            .collect()
    }

    fn bind_program(&self, program: &Self::Program) {
        self.probe.log.borrow_mut().bound_programs.push(program.id);
    }

    fn set_f32(&self, location: &Self::Location, value: f32) {
        self.probe
            .log
            .borrow_mut()
            .stores
            .push((location.clone(), Store::F32(value)));
    }

    fn set_i32(&self, location: &Self::Location, value: i32) {
        self.probe
            .log
            .borrow_mut()
            .stores
            .push((location.clone(), Store::I32(value)));
    }

    fn set_vec2(&self, location: &Self::Location, value: [f32; 2]) {
        self.probe
            .log
            .borrow_mut()
            .stores
            .push((location.clone(), Store::Vec2(value)));
    }

    fn draw(&self) {
        self.probe.log.borrow_mut().draws += 1;
    }
}
