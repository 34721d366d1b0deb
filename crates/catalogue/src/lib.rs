//! Shader catalogue: the ordered set of viewable programs and their
//! parameter panels. An entry carries everything the engine needs to build
//! and drive one program — fragment source, descriptor list, default flag —
//! while this crate guarantees at load time that the descriptor lists are
//! internally consistent (no duplicate uniforms, no dangling or cyclic
//! `visible_when` references).
//!
//! Types:
//!
//! - `ShaderEntry` is one catalogue row; `validate` returns human-readable
//!   issues so loaders can surface misconfigurations without panicking.
//! - `Catalogue` wraps the validated, ordered entry list and resolves the
//!   default entry and id lookups.
//! - `CatalogueError` classifies manifest parsing, validation, and I/O
//!   failures for the binary's error reporting.
//!
//! Functions:
//!
//! - `Catalogue::new` validates an in-memory entry list (used by
//!   `builtin::builtin_catalogue`).
//! - `Catalogue::load` reads a `catalogue.toml` manifest directory from
//!   disk (see `manifest`).
mod builtin;
mod descriptor;
mod manifest;

pub use builtin::builtin_catalogue;
pub use descriptor::{ParamKind, ParamRange, ParameterDescriptor, SelectOption};
pub use manifest::{CatalogueManifest, EntryManifest};

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// GLSL source for the shared full-screen triangle vertex stage. Every
/// catalogue entry is a fragment shader drawn over this triangle; no vertex
/// buffers are involved.
pub const VERTEX_SOURCE: &str = include_str!("../shaders/fullscreen.vert");

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("catalogue manifest not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to parse catalogue manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("catalogue validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One viewable program: identity, fragment source, and its parameter panel.
#[derive(Debug, Clone)]
pub struct ShaderEntry {
    pub id: String,
    pub name: String,
    pub fragment: String,
    pub params: Vec<ParameterDescriptor>,
    pub default: bool,
}

impl ShaderEntry {
    /// Checks the descriptor list for internal consistency and returns every
    /// issue found. An empty result means the entry is safe to resolve into
    /// live parameter state.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for param in &self.params {
            if !seen.insert(param.uniform.as_str()) {
                issues.push(format!(
                    "entry '{}' declares uniform '{}' more than once",
                    self.id, param.uniform
                ));
            }
            match param.kind {
                ParamKind::Select => {
                    if param.options.is_empty() {
                        issues.push(format!(
                            "select parameter '{}' in '{}' has no options",
                            param.id, self.id
                        ));
                    } else if param.options.iter().all(|o| o.value != param.default) {
                        issues.push(format!(
                            "select parameter '{}' in '{}' defaults to {} which is not an option",
                            param.id, self.id, param.default
                        ));
                    }
                }
                ParamKind::Float | ParamKind::Int => match param.range {
                    None => issues.push(format!(
                        "parameter '{}' in '{}' declares no range",
                        param.id, self.id
                    )),
                    Some(range) if range.step <= 0.0 => issues.push(format!(
                        "parameter '{}' in '{}' has a non-positive step",
                        param.id, self.id
                    )),
                    Some(_) => {}
                },
            }
            for reference in param.visible_when.keys() {
                if self.params.iter().all(|other| &other.uniform != reference) {
                    issues.push(format!(
                        "parameter '{}' in '{}' is conditioned on unknown uniform '{}'",
                        param.id, self.id, reference
                    ));
                }
            }
        }
        issues.extend(self.visibility_cycles());
        issues
    }

    /// Detects cycles in the `visible_when` dependency graph. Visibility is
    /// a pure function of parameter values, but a cyclic condition graph is
    /// a configuration mistake and is rejected rather than resolved.
    fn visibility_cycles(&self) -> Vec<String> {
        let deps: BTreeMap<&str, Vec<&str>> = self
            .params
            .iter()
            .map(|param| {
                (
                    param.uniform.as_str(),
                    param
                        .visible_when
                        .keys()
                        .map(String::as_str)
                        .filter(|name| self.params.iter().any(|p| p.uniform == *name))
                        .collect(),
                )
            })
            .collect();

        let mut issues = Vec::new();
        let mut settled = HashSet::new();
        for &start in deps.keys() {
            if settled.contains(start) {
                continue;
            }
            let mut trail: Vec<&str> = Vec::new();
            if let Some(cycle) = walk(start, &deps, &mut trail, &mut settled) {
                issues.push(format!(
                    "entry '{}' has a visibility dependency cycle: {}",
                    self.id,
                    cycle.join(" -> ")
                ));
                // report each cycle once, not once per participant
                settled.extend(trail.iter().copied());
            }
        }
        issues
    }
}

fn walk<'a>(
    node: &'a str,
    deps: &BTreeMap<&'a str, Vec<&'a str>>,
    trail: &mut Vec<&'a str>,
    settled: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    if let Some(position) = trail.iter().position(|seen| *seen == node) {
        let mut cycle: Vec<String> = trail[position..].iter().map(|s| s.to_string()).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }
    if settled.contains(node) {
        return None;
    }
    trail.push(node);
    if let Some(children) = deps.get(node) {
        for &child in children {
            if let Some(cycle) = walk(child, deps, trail, settled) {
                return Some(cycle);
            }
        }
    }
    trail.pop();
    settled.insert(node);
    None
}

/// Validated, ordered collection of shader entries.
#[derive(Debug, Clone)]
pub struct Catalogue {
    entries: Vec<ShaderEntry>,
}

impl Catalogue {
    pub fn new(entries: Vec<ShaderEntry>) -> Result<Self, CatalogueError> {
        let mut issues = Vec::new();
        if entries.is_empty() {
            issues.push("catalogue must declare at least one entry".to_string());
        }
        let mut ids = HashSet::new();
        for entry in &entries {
            if !ids.insert(entry.id.as_str()) {
                issues.push(format!("duplicate entry id '{}'", entry.id));
            }
            issues.extend(entry.validate());
        }
        if !issues.is_empty() {
            return Err(CatalogueError::Validation(issues));
        }
        Ok(Self { entries })
    }

    /// Loads a catalogue from a directory containing `catalogue.toml` and
    /// the fragment files it references.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        manifest::load_dir(dir.as_ref())
    }

    pub fn entries(&self) -> &[ShaderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShaderEntry> {
        self.entries.get(index)
    }

    /// Index of the entry flagged as default, or the first entry.
    pub fn default_index(&self) -> usize {
        self.entries
            .iter()
            .position(|entry| entry.default)
            .unwrap_or(0)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}
