use std::collections::HashMap;

use catalogue::ParameterDescriptor;

/// Live values for the active program's parameters, keyed by uniform name.
///
/// Holds exactly one entry per descriptor of the active program: seeding
/// happens in [`ParameterState::resolve`], and [`ParameterState::set`]
/// refuses to introduce keys, so the invariant cannot drift.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParameterState {
    values: HashMap<String, f64>,
}

impl ParameterState {
    /// Seeds one entry per descriptor at its default value. Descriptor
    /// order is presentation-only and does not affect the result.
    pub fn resolve(descriptors: &[ParameterDescriptor]) -> Self {
        Self {
            values: descriptors
                .iter()
                .map(|d| (d.uniform.clone(), d.default))
                .collect(),
        }
    }

    /// Re-seeds every entry to its descriptor default in one pass.
    pub fn reset(&mut self, descriptors: &[ParameterDescriptor]) {
        for descriptor in descriptors {
            self.values
                .insert(descriptor.uniform.clone(), descriptor.default);
        }
    }

    /// Updates an existing entry. Unknown names are ignored so the state
    /// always mirrors the descriptor list exactly; returns whether a value
    /// was written.
    pub fn set(&mut self, uniform: &str, value: f64) -> bool {
        match self.values.get_mut(uniform) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => {
                tracing::debug!(uniform, "ignoring value for undeclared parameter");
                false
            }
        }
    }

    pub fn get(&self, uniform: &str) -> Option<f64> {
        self.values.get(uniform).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Which parameters are currently relevant, keyed by descriptor id.
/// Derivable from [`ParameterState`] at any time; recomputed after every
/// mutation rather than persisted across switches.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VisibilityState {
    visible: HashMap<String, bool>,
}

impl VisibilityState {
    pub fn evaluate(descriptors: &[ParameterDescriptor], state: &ParameterState) -> Self {
        Self {
            visible: descriptors
                .iter()
                .map(|d| (d.id.clone(), is_visible(d, state)))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(true)
    }
}

/// A parameter with no condition is always visible; otherwise every named
/// uniform's current value must be in its allowed set. The first unmet
/// clause decides, so evaluation short-circuits.
fn is_visible(descriptor: &ParameterDescriptor, state: &ParameterState) -> bool {
    for (uniform, allowed) in &descriptor.visible_when {
        let Some(value) = state.get(uniform) else {
            return false;
        };
        if !allowed.contains(&value) {
            return false;
        }
    }
    true
}
