//! Declares the tunable-parameter schema attached to catalogue entries.
//! Each `ParameterDescriptor` names one shader uniform, its kind, bounds or
//! options, default value, and an optional visibility condition over sibling
//! parameters. Descriptors are static data; the engine derives live state
//! from them and never mutates them.
//!
//! Types:
//!
//! - `ParamKind` is the closed set of parameter kinds; the engine matches on
//!   it exhaustively when binding and formatting values.
//! - `ParamRange` bounds slider-style parameters and carries the step that
//!   drives display precision.
//! - `SelectOption` pairs a bound value with its panel label.
//! - `ParameterDescriptor` ties the above together and holds the
//!   `visible_when` condition map (uniform name → allowed values).
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Float,
    Int,
    Select,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SelectOption {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub id: String,
    pub name: String,
    pub uniform: String,
    pub kind: ParamKind,
    pub default: f64,
    #[serde(default)]
    pub range: Option<ParamRange>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub visible_when: BTreeMap<String, Vec<f64>>,
}

impl ParameterDescriptor {
    /// Display precision for the panel: integer kinds always render whole,
    /// float kinds infer decimals from the declared step.
    pub fn decimal_places(&self) -> usize {
        match self.kind {
            ParamKind::Int | ParamKind::Select => 0,
            ParamKind::Float => match self.range {
                Some(range) if range.step >= 1.0 => 0,
                Some(range) if range.step >= 0.1 => 1,
                _ => 2,
            },
        }
    }

    /// Renders a value the way the panel shows it. Integer kinds round half
    /// away from zero, which is also how the uniform binder quantizes them.
    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            ParamKind::Int | ParamKind::Select => format!("{}", value.round() as i64),
            ParamKind::Float => format!("{:.*}", self.decimal_places(), value),
        }
    }

    /// Panel label for the current value: the matching option label for
    /// selects, the formatted number otherwise.
    pub fn value_label(&self, value: f64) -> String {
        if self.kind == ParamKind::Select {
            let rounded = value.round();
            if let Some(option) = self.options.iter().find(|o| o.value == rounded) {
                return option.label.clone();
            }
        }
        self.format_value(value)
    }
}
