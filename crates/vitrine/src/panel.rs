//! Terminal rendering of the parameter panel and the keyboard nudge rules.
//! The engine exposes panel rows as data; this module is the only place
//! that turns them into text or derives new values from key presses.
use catalogue::{ParamKind, ParameterDescriptor};
use engine::PanelRow;

/// Renders the visible panel rows with a selection marker. Programs without
/// parameters collapse to the title line.
pub fn render<'a>(
    title: &str,
    rows: impl Iterator<Item = PanelRow<'a>>,
    selected: usize,
) -> String {
    let visible: Vec<PanelRow<'a>> = rows.filter(|row| row.visible).collect();
    let mut out = format!("== {title} ==");
    if visible.is_empty() {
        return out;
    }
    for (index, row) in visible.iter().enumerate() {
        let marker = if index == selected { '>' } else { ' ' };
        out.push_str(&format!(
            "\n{marker} {:<16} {}",
            row.descriptor.name,
            row.value_text()
        ));
    }
    out.push_str("\n  tab: select   +/-: adjust   r: reset   arrows: switch shader");
    out
}

/// New value for a parameter after one keyboard step in `direction`
/// (+1.0 or -1.0). Sliders move by their declared step and clamp to their
/// range; selects walk their option list and wrap.
pub fn nudged(descriptor: &ParameterDescriptor, value: f64, direction: f64) -> f64 {
    match descriptor.kind {
        ParamKind::Select => {
            if descriptor.options.is_empty() {
                return value;
            }
            let rounded = value.round();
            let current = descriptor
                .options
                .iter()
                .position(|option| option.value == rounded)
                .unwrap_or(0);
            let len = descriptor.options.len() as isize;
            let next = (current as isize + direction as isize).rem_euclid(len) as usize;
            descriptor.options[next].value
        }
        ParamKind::Float | ParamKind::Int => match descriptor.range {
            Some(range) => (value + direction * range.step).clamp(range.min, range.max),
            None => value,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use catalogue::{ParamRange, SelectOption};

    use super::*;

    fn slider(step: f64, min: f64, max: f64) -> ParameterDescriptor {
        ParameterDescriptor {
            id: "speed".into(),
            name: "Speed".into(),
            uniform: "u_speed".into(),
            kind: ParamKind::Float,
            default: 1.0,
            range: Some(ParamRange { min, max, step }),
            options: Vec::new(),
            visible_when: BTreeMap::new(),
        }
    }

    fn select() -> ParameterDescriptor {
        ParameterDescriptor {
            id: "mode".into(),
            name: "Mode".into(),
            uniform: "u_mode".into(),
            kind: ParamKind::Select,
            default: 0.0,
            range: None,
            options: vec![
                SelectOption {
                    value: 0.0,
                    label: "A".into(),
                },
                SelectOption {
                    value: 1.0,
                    label: "B".into(),
                },
                SelectOption {
                    value: 3.0,
                    label: "C".into(),
                },
            ],
            visible_when: BTreeMap::new(),
        }
    }

    #[test]
    fn sliders_step_and_clamp() {
        let descriptor = slider(0.5, 0.0, 2.0);
        assert_eq!(nudged(&descriptor, 1.0, 1.0), 1.5);
        assert_eq!(nudged(&descriptor, 2.0, 1.0), 2.0);
        assert_eq!(nudged(&descriptor, 0.0, -1.0), 0.0);
    }

    #[test]
    fn selects_walk_options_and_wrap() {
        let descriptor = select();
        assert_eq!(nudged(&descriptor, 0.0, 1.0), 1.0);
        assert_eq!(nudged(&descriptor, 1.0, 1.0), 3.0);
        assert_eq!(nudged(&descriptor, 3.0, 1.0), 0.0);
        assert_eq!(nudged(&descriptor, 0.0, -1.0), 3.0);
    }

    #[test]
    fn render_hides_invisible_rows() {
        let visible = slider(0.1, 0.0, 1.0);
        let hidden = select();
        let rows = vec![
            PanelRow {
                descriptor: &visible,
                value: 0.5,
                visible: true,
            },
            PanelRow {
                descriptor: &hidden,
                value: 0.0,
                visible: false,
            },
        ];
        let text = render("Demo", rows.into_iter(), 0);
        assert!(text.contains("Speed"));
        assert!(text.contains("0.5"));
        assert!(!text.contains("Mode"));
    }

    #[test]
    fn render_collapses_empty_panels() {
        let text = render("Bare", std::iter::empty(), 0);
        assert_eq!(text, "== Bare ==");
    }
}
