//! The built-in shader set bundled with the viewer. Sources live next to
//! this crate under `shaders/` and are embedded at compile time; the
//! Mandelbulb entry carries the full parameter panel, including the
//! formula-dependent visibility conditions.
use std::collections::BTreeMap;

use crate::{
    Catalogue, ParamKind, ParamRange, ParameterDescriptor, SelectOption, ShaderEntry,
};

const IKEDA: &str = include_str!("../shaders/ikeda.frag");
const PLASMA: &str = include_str!("../shaders/plasma.frag");
const RAYMARCH: &str = include_str!("../shaders/raymarch.frag");
const VORONOI: &str = include_str!("../shaders/voronoi.frag");
const MANDELBULB: &str = include_str!("../shaders/mandelbulb.frag");

/// Builds the bundled catalogue. The entry set is fixed, so validation
/// failing here would be a packaging bug; it is still routed through
/// `Catalogue::new` so bundled and on-disk entries obey the same rules.
pub fn builtin_catalogue() -> Catalogue {
    let entries = vec![
        ShaderEntry {
            id: "ikeda".into(),
            name: "Ryoji Ikeda — Data Stream".into(),
            fragment: IKEDA.into(),
            params: Vec::new(),
            default: true,
        },
        ShaderEntry {
            id: "plasma".into(),
            name: "Classic Plasma".into(),
            fragment: PLASMA.into(),
            params: Vec::new(),
            default: false,
        },
        ShaderEntry {
            id: "raymarch".into(),
            name: "Raymarched Spheres".into(),
            fragment: RAYMARCH.into(),
            params: Vec::new(),
            default: false,
        },
        ShaderEntry {
            id: "voronoi".into(),
            name: "Voronoi Cells".into(),
            fragment: VORONOI.into(),
            params: Vec::new(),
            default: false,
        },
        ShaderEntry {
            id: "mandelbulb".into(),
            name: "Mandelbulb 3D Fractal".into(),
            fragment: MANDELBULB.into(),
            params: mandelbulb_params(),
            default: false,
        },
    ];

    Catalogue::new(entries).expect("bundled catalogue is valid")
}

fn slider(
    id: &str,
    name: &str,
    uniform: &str,
    kind: ParamKind,
    min: f64,
    max: f64,
    step: f64,
    default: f64,
) -> ParameterDescriptor {
    ParameterDescriptor {
        id: id.into(),
        name: name.into(),
        uniform: uniform.into(),
        kind,
        default,
        range: Some(ParamRange { min, max, step }),
        options: Vec::new(),
        visible_when: BTreeMap::new(),
    }
}

fn when_formula(mut param: ParameterDescriptor, allowed: &[f64]) -> ParameterDescriptor {
    param
        .visible_when
        .insert("u_formula".into(), allowed.to_vec());
    param
}

fn mandelbulb_params() -> Vec<ParameterDescriptor> {
    use ParamKind::{Float, Int};

    let formula = ParameterDescriptor {
        id: "formula".into(),
        name: "Formula".into(),
        uniform: "u_formula".into(),
        kind: ParamKind::Select,
        default: 0.0,
        range: None,
        options: [
            (0.0, "Mandelbulb"),
            (1.0, "Juliabulb"),
            (2.0, "Burning Ship 3D"),
            (3.0, "Mandelbox"),
            (4.0, "Quaternion Julia"),
            (5.0, "Sierpinski"),
        ]
        .into_iter()
        .map(|(value, label)| SelectOption {
            value,
            label: label.into(),
        })
        .collect(),
        visible_when: BTreeMap::new(),
    };

    vec![
        formula,
        when_formula(
            slider("power", "Power", "u_power", Float, 2.0, 16.0, 0.1, 8.0),
            &[0.0, 1.0, 2.0],
        ),
        slider(
            "iterations",
            "Iterations",
            "u_iterations",
            Int,
            2.0,
            16.0,
            1.0,
            4.0,
        ),
        when_formula(
            slider("bailout", "Bailout", "u_bailout", Float, 4.0, 512.0, 1.0, 256.0),
            &[0.0, 1.0, 2.0, 4.0],
        ),
        when_formula(
            slider("mbScale", "Box Scale", "u_mb_scale", Float, -3.0, 3.0, 0.01, -1.5),
            &[3.0],
        ),
        when_formula(
            slider(
                "mbMinRad",
                "Min Radius",
                "u_mb_min_rad",
                Float,
                0.01,
                1.0,
                0.01,
                0.5,
            ),
            &[3.0],
        ),
        when_formula(
            slider("juliaX", "Julia X", "u_julia_x", Float, -2.0, 2.0, 0.01, -0.2),
            &[1.0, 4.0],
        ),
        when_formula(
            slider("juliaY", "Julia Y", "u_julia_y", Float, -2.0, 2.0, 0.01, 0.8),
            &[1.0, 4.0],
        ),
        when_formula(
            slider("juliaZ", "Julia Z", "u_julia_z", Float, -2.0, 2.0, 0.01, 0.0),
            &[1.0, 4.0],
        ),
        when_formula(
            slider("juliaW", "Julia W", "u_julia_w", Float, -2.0, 2.0, 0.01, 0.0),
            &[4.0],
        ),
        slider(
            "camDist",
            "Camera Dist",
            "u_cam_dist",
            Float,
            1.5,
            10.0,
            0.05,
            2.5,
        ),
        slider("fov", "FOV", "u_fov", Float, 0.8, 3.0, 0.05, 1.8),
        slider(
            "rotSpeed",
            "Rotation Speed",
            "u_rot_speed",
            Float,
            0.0,
            1.0,
            0.01,
            0.15,
        ),
        slider(
            "colorShift",
            "Color Shift",
            "u_color_shift",
            Float,
            0.0,
            6.28,
            0.01,
            0.0,
        ),
        slider(
            "aoStrength",
            "AO Strength",
            "u_ao_strength",
            Float,
            0.0,
            6.0,
            0.1,
            3.0,
        ),
        slider(
            "specPower",
            "Spec Sharpness",
            "u_spec_power",
            Float,
            4.0,
            128.0,
            1.0,
            48.0,
        ),
    ]
}
