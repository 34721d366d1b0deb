use catalogue::{Catalogue, ParameterDescriptor, ShaderEntry};
use thiserror::Error;

use crate::api::GraphicsApi;
use crate::binder::{bind_frame, FrameInputs};
use crate::clock::{BoxedTimeSource, SystemTimeSource};
use crate::params::{ParameterState, VisibilityState};
use crate::program::{build_program, BuildError, BuiltProgram};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("catalogue has no entry at index {0}")]
    UnknownEntry(usize),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// One row of the parameter panel as the presentation layer sees it.
pub struct PanelRow<'a> {
    pub descriptor: &'a ParameterDescriptor,
    pub value: f64,
    pub visible: bool,
}

impl PanelRow<'_> {
    /// Panel text for the current value, consistent with binder rounding.
    pub fn value_text(&self) -> String {
        self.descriptor.value_label(self.value)
    }
}

struct ActiveProgram<G: GraphicsApi> {
    index: usize,
    entry: ShaderEntry,
    built: BuiltProgram<G>,
    params: ParameterState,
    visibility: VisibilityState,
}

/// Owns the single active-program slot and drives the frame loop.
///
/// All mutable state — parameter values, visibility, the active handle, the
/// error surface — lives on this instance; input handlers and render ticks
/// run to completion on one logical thread, so no locking is involved.
/// Switching is atomic: the replacement program is fully built before the
/// previous handle is released, and a failed build leaves the running
/// program, its parameter state, and its clock untouched.
pub struct Session<G: GraphicsApi> {
    gl: G,
    catalogue: Catalogue,
    clock: BoxedTimeSource,
    viewport: [f32; 2],
    pointer: [f32; 2],
    active: Option<ActiveProgram<G>>,
    error: Option<String>,
}

impl<G: GraphicsApi> Session<G> {
    pub fn new(gl: G, catalogue: Catalogue) -> Self {
        Self::with_time_source(gl, catalogue, Box::new(SystemTimeSource::new()))
    }

    pub fn with_time_source(gl: G, catalogue: Catalogue, clock: BoxedTimeSource) -> Self {
        Self {
            gl,
            catalogue,
            clock,
            viewport: [1.0, 1.0],
            pointer: [0.0, 0.0],
            active: None,
            error: None,
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// The underlying capability surface, for backend concerns the session
    /// does not own (viewport updates on resize).
    pub fn graphics(&self) -> &G {
        &self.gl
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.index)
    }

    pub fn active_entry(&self) -> Option<&ShaderEntry> {
        self.active.as_ref().map(|active| &active.entry)
    }

    /// Current diagnostic, if the last switch attempt failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Compiles the catalogue entry at `index` and adopts it: the previous
    /// handle is released only after the replacement exists, parameter
    /// state is reseeded from the new entry's defaults, and elapsed time
    /// and the frame counter restart from zero. On failure the previous
    /// program keeps running and the diagnostic lands on the error surface.
    pub fn switch_to(&mut self, index: usize) -> Result<(), SessionError> {
        let entry = self
            .catalogue
            .get(index)
            .ok_or(SessionError::UnknownEntry(index))?
            .clone();

        match build_program(&self.gl, catalogue::VERTEX_SOURCE, &entry.fragment) {
            Ok(built) => {
                if let Some(old) = self.active.take() {
                    self.gl.release_program(old.built.program);
                }
                let params = ParameterState::resolve(&entry.params);
                let visibility = VisibilityState::evaluate(&entry.params, &params);
                tracing::info!(
                    entry = %entry.id,
                    uniforms = built.uniforms().len(),
                    params = entry.params.len(),
                    "activated shader program"
                );
                self.active = Some(ActiveProgram {
                    index,
                    entry,
                    built,
                    params,
                    visibility,
                });
                self.clock.reset();
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!(entry = %entry.id, error = %err, "shader program build failed");
                self.error = Some(format!("{}: {}", entry.name, err));
                Err(SessionError::Build(err))
            }
        }
    }

    /// Switches to the next catalogue entry, wrapping at the end.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.switch_to(self.neighbor(1))
    }

    /// Switches to the previous catalogue entry, wrapping at the start.
    pub fn retreat(&mut self) -> Result<(), SessionError> {
        self.switch_to(self.neighbor(self.catalogue.len() - 1))
    }

    fn neighbor(&self, offset: usize) -> usize {
        match self.active.as_ref() {
            Some(active) => (active.index + offset) % self.catalogue.len(),
            None => self.catalogue.default_index(),
        }
    }

    /// Stores a parameter value and re-evaluates visibility before
    /// returning, so a render tick never observes the two out of sync.
    pub fn set_parameter(&mut self, uniform: &str, value: f64) {
        if let Some(active) = self.active.as_mut() {
            if active.params.set(uniform, value) {
                active.visibility =
                    VisibilityState::evaluate(&active.entry.params, &active.params);
            }
        }
    }

    /// Reseeds every parameter to its default in one pass, then
    /// re-evaluates visibility.
    pub fn reset_parameters(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.params.reset(&active.entry.params);
            active.visibility = VisibilityState::evaluate(&active.entry.params, &active.params);
        }
    }

    /// Latest draw-buffer dimensions, fed into the next frame's inputs.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = [width.max(1.0), height.max(1.0)];
    }

    /// Latest pointer position in draw-buffer coordinates, Y from bottom.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = [x, y];
    }

    /// Runs one tick of the frame loop: sample the clock, bind built-ins
    /// and parameters, draw. Does nothing before the first successful
    /// switch.
    pub fn render_frame(&mut self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let sample = self.clock.sample();
        let inputs = FrameInputs {
            time_seconds: sample.seconds,
            resolution: self.viewport,
            pointer: self.pointer,
            frame_index: sample.frame_index.min(i32::MAX as u64) as i32,
        };
        self.gl.bind_program(&active.built.program);
        bind_frame(
            &self.gl,
            &active.built,
            inputs,
            &active.params,
            &active.entry.params,
        );
        self.gl.draw();
    }

    /// Panel rows for the active program, in descriptor order. Empty when
    /// nothing is active or the program has no parameters.
    pub fn panel(&self) -> impl Iterator<Item = PanelRow<'_>> {
        self.active.iter().flat_map(|active| {
            active.entry.params.iter().map(move |descriptor| PanelRow {
                descriptor,
                value: active
                    .params
                    .get(&descriptor.uniform)
                    .unwrap_or(descriptor.default),
                visible: active.visibility.get(&descriptor.id),
            })
        })
    }
}

impl<G: GraphicsApi> Drop for Session<G> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            self.gl.release_program(active.built.program);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use catalogue::{ParamKind, ParamRange, SelectOption};

    use super::*;
    use crate::binder::{FRAME_UNIFORM, TIME_UNIFORM};
    use crate::clock::testing::ManualTimeSource;
    use crate::testgl::{FakeGl, GlProbe, Store};

    fn entry(id: &str, fragment: &str, params: Vec<ParameterDescriptor>) -> ShaderEntry {
        ShaderEntry {
            id: id.into(),
            name: id.into(),
            fragment: fragment.into(),
            params,
            default: false,
        }
    }

    fn slider(uniform: &str, default: f64) -> ParameterDescriptor {
        ParameterDescriptor {
            id: uniform.trim_start_matches("u_").into(),
            name: uniform.into(),
            uniform: uniform.into(),
            kind: ParamKind::Float,
            default,
            range: Some(ParamRange {
                min: 0.0,
                max: 10.0,
                step: 0.1,
            }),
            options: Vec::new(),
            visible_when: BTreeMap::new(),
        }
    }

    fn formula_select() -> ParameterDescriptor {
        ParameterDescriptor {
            id: "formula".into(),
            name: "Formula".into(),
            uniform: "u_formula".into(),
            kind: ParamKind::Select,
            default: 0.0,
            range: None,
            options: vec![
                SelectOption {
                    value: 0.0,
                    label: "Plain".into(),
                },
                SelectOption {
                    value: 1.0,
                    label: "Fancy".into(),
                },
            ],
            visible_when: BTreeMap::new(),
        }
    }

    fn session_with(entries: Vec<ShaderEntry>) -> (Session<FakeGl>, GlProbe) {
        let (gl, probe) = FakeGl::new();
        let catalogue = Catalogue::new(entries).expect("valid catalogue");
        let session = Session::with_time_source(
            gl,
            catalogue,
            Box::new(ManualTimeSource::stepping(0.1)),
        );
        (session, probe)
    }

    #[test]
    fn bare_program_has_empty_panel_and_state() {
        let (mut session, _probe) = session_with(vec![entry(
            "bare",
            "uniform float u_time;\nvoid main() {}",
            Vec::new(),
        )]);
        session.switch_to(0).expect("switch succeeds");
        assert_eq!(session.panel().count(), 0);
    }

    #[test]
    fn schema_matches_descriptor_count_after_load() {
        let (mut session, _probe) = session_with(vec![entry(
            "sliders",
            "uniform float u_speed;\nuniform float u_scale;\nvoid main() {}",
            vec![slider("u_speed", 1.0), slider("u_scale", 2.0)],
        )]);
        session.switch_to(0).expect("switch succeeds");
        let rows: Vec<_> = session.panel().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, 1.0);
        assert_eq!(rows[1].value, 2.0);
    }

    #[test]
    fn conditional_parameter_follows_the_select() {
        let mut detail = slider("u_detail", 0.5);
        detail.visible_when.insert("u_formula".into(), vec![1.0]);
        let (mut session, _probe) = session_with(vec![entry(
            "conditional",
            "uniform int u_formula;\nuniform float u_detail;\nvoid main() {}",
            vec![formula_select(), detail],
        )]);
        session.switch_to(0).expect("switch succeeds");

        let initial: Vec<_> = session.panel().map(|row| row.visible).collect();
        assert_eq!(initial, vec![true, false]);

        session.set_parameter("u_formula", 1.0);
        let toggled: Vec<_> = session.panel().map(|row| row.visible).collect();
        assert_eq!(toggled, vec![true, true]);
    }

    #[test]
    fn reset_restores_defaults_and_is_idempotent() {
        let (mut session, _probe) = session_with(vec![entry(
            "sliders",
            "uniform float u_speed;\nvoid main() {}",
            vec![slider("u_speed", 1.0)],
        )]);
        session.switch_to(0).expect("switch succeeds");
        session.set_parameter("u_speed", 7.5);
        session.reset_parameters();
        let after_once: Vec<_> = session.panel().map(|row| row.value).collect();
        session.reset_parameters();
        let after_twice: Vec<_> = session.panel().map(|row| row.value).collect();
        assert_eq!(after_once, vec![1.0]);
        assert_eq!(after_once, after_twice);
    }

    #[test]
    fn switch_resets_clock_and_state() {
        let programs = vec![
            entry(
                "first",
                "uniform float u_time;\nuniform int u_frame;\nuniform float u_speed;\nvoid main() {}",
                vec![slider("u_speed", 1.0)],
            ),
            entry(
                "second",
                "uniform float u_time;\nuniform int u_frame;\nuniform float u_scale;\nvoid main() {}",
                vec![slider("u_scale", 3.0)],
            ),
        ];
        let (mut session, probe) = session_with(programs);
        session.switch_to(0).expect("switch succeeds");
        session.set_parameter("u_speed", 9.0);
        for _ in 0..5 {
            session.render_frame();
        }
        assert_eq!(probe.last_store(FRAME_UNIFORM), Some(Store::I32(4)));

        session.switch_to(1).expect("switch succeeds");
        session.render_frame();

        assert_eq!(probe.last_store(FRAME_UNIFORM), Some(Store::I32(0)));
        assert_eq!(probe.last_store(TIME_UNIFORM), Some(Store::F32(0.0)));
        let rows: Vec<_> = session.panel().map(|row| row.value).collect();
        assert_eq!(rows, vec![3.0], "state matches the new entry's defaults");
        assert_eq!(probe.programs_alive(), 1, "superseded handle was released");
    }

    #[test]
    fn failed_switch_leaves_the_running_program_untouched() {
        let programs = vec![
            entry(
                "good",
                "uniform float u_time;\nuniform int u_frame;\nuniform float u_speed;\nvoid main() {}",
                vec![slider("u_speed", 1.0)],
            ),
            entry("broken", "void main() {}", Vec::new()),
        ];
        let (mut session, probe) = session_with(programs);
        session.switch_to(0).expect("switch succeeds");
        session.set_parameter("u_speed", 4.2);
        for _ in 0..3 {
            session.render_frame();
        }

        probe.fail_next_compile(crate::ShaderStage::Fragment, "syntax error near line 1");
        let err = session.switch_to(1).expect_err("switch fails");
        assert!(matches!(err, SessionError::Build(BuildError::Compile { .. })));

        assert_eq!(session.active_index(), Some(0));
        assert_eq!(
            session.error(),
            Some("broken: fragment shader compile error:\nsyntax error near line 1")
        );
        let rows: Vec<_> = session.panel().map(|row| row.value).collect();
        assert_eq!(rows, vec![4.2], "parameter state survives the failure");

        session.render_frame();
        assert_eq!(
            probe.last_store(FRAME_UNIFORM),
            Some(Store::I32(3)),
            "frame counter continues from where it was"
        );

        session.switch_to(0).expect("recovery switch succeeds");
        assert_eq!(session.error(), None, "error surface clears on success");
    }

    #[test]
    fn advance_and_retreat_wrap_around() {
        let fragment = "uniform float u_time;\nvoid main() {}";
        let (mut session, _probe) = session_with(vec![
            entry("a", fragment, Vec::new()),
            entry("b", fragment, Vec::new()),
            entry("c", fragment, Vec::new()),
        ]);
        session.switch_to(2).expect("switch succeeds");
        session.advance().expect("advance succeeds");
        assert_eq!(session.active_index(), Some(0));
        session.retreat().expect("retreat succeeds");
        assert_eq!(session.active_index(), Some(2));
    }

    #[test]
    fn render_before_first_switch_is_a_noop() {
        let (mut session, probe) = session_with(vec![entry(
            "bare",
            "void main() {}",
            Vec::new(),
        )]);
        session.render_frame();
        assert_eq!(probe.draw_count(), 0);
        assert!(probe.log().bound_programs.is_empty());
    }

    #[test]
    fn hidden_parameter_value_still_binds() {
        let mut detail = slider("u_detail", 0.5);
        detail.visible_when.insert("u_formula".into(), vec![1.0]);
        let (mut session, probe) = session_with(vec![entry(
            "conditional",
            "uniform int u_formula;\nuniform float u_detail;\nvoid main() {}",
            vec![formula_select(), detail],
        )]);
        session.switch_to(0).expect("switch succeeds");
        session.set_parameter("u_formula", 1.0);
        session.set_parameter("u_detail", 0.9);
        session.set_parameter("u_formula", 0.0);

        session.render_frame();

        let hidden = session.panel().find(|row| row.descriptor.id == "detail");
        assert!(!hidden.expect("detail row").visible);
        assert_eq!(probe.last_store("u_detail"), Some(Store::F32(0.9)));
    }

    #[test]
    fn drop_releases_the_active_program() {
        let (mut session, probe) = session_with(vec![entry(
            "bare",
            "void main() {}",
            Vec::new(),
        )]);
        session.switch_to(0).expect("switch succeeds");
        assert_eq!(probe.programs_alive(), 1);
        drop(session);
        assert_eq!(probe.programs_alive(), 0);
    }
}
