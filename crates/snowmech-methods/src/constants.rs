//! Physical constants and field-measurement conventions.

use snowmech_core::uncertain::UncertainValue;

/// Density of ice (kg/m³), the reference value shared by the relative-density
/// parameterizations.
pub const RHO_ICE: f64 = 917.0;

/// Shear modulus of ice (MPa), after Kermani et al.
pub fn g_ice() -> UncertainValue {
    UncertainValue::new(407.7, 65.4)
}

/// Standard measurement uncertainty on the hand hardness index.
pub const U_HAND_HARDNESS_INDEX: f64 = 0.5;

/// Standard measurement uncertainty on grain size (mm).
pub const U_GRAIN_SIZE_MM: f64 = 0.25;

/// Relative measurement uncertainty on layer thickness.
pub const U_THICKNESS_FRACTION: f64 = 0.05;

/// Relative measurement uncertainty on directly measured density.
pub const U_DENSITY_FRACTION: f64 = 0.05;

/// Standard measurement uncertainty on slope angle (degrees).
pub const U_SLOPE_ANGLE_DEG: f64 = 2.0;

/// Maps a hand hardness code to its numeric index.
///
/// `F` (fist) through `K` (knife), with `-`/`+` refinements in steps of a
/// third of a hardness class.
pub fn hand_hardness_index(code: &str) -> Option<f64> {
    let index = match code {
        "F-" => 0.67,
        "F" => 1.0,
        "F+" => 1.33,
        "4F-" => 1.67,
        "4F" => 2.0,
        "4F+" => 2.33,
        "1F-" => 2.67,
        "1F" => 3.0,
        "1F+" => 3.33,
        "P-" => 3.67,
        "P" => 4.0,
        "P+" => 4.33,
        "K-" => 4.67,
        "K" => 5.0,
        "K+" => 5.33,
        _ => return None,
    };
    Some(index)
}
