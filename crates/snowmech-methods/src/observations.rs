//! Building records from field observations.
//!
//! Field measurements come in as plain numbers and codes; this module
//! applies the standard measurement uncertainties from [`crate::constants`]
//! and derives the hand hardness index, producing [`Layer`]/[`Slab`] records
//! ready for execution.

use snowmech_core::record::{Layer, Slab};

use crate::constants::{
    hand_hardness_index, U_DENSITY_FRACTION, U_GRAIN_SIZE_MM, U_HAND_HARDNESS_INDEX,
    U_SLOPE_ANGLE_DEG, U_THICKNESS_FRACTION,
};

/// One observed layer, straight from a profile. Every field is optional;
/// absent measurements simply leave the corresponding raw fields off the
/// record, and pathways that need them fail with `MissingInput`.
#[derive(Debug, Clone, Default)]
pub struct ObservedLayer {
    /// Layer thickness (cm).
    pub thickness_cm: Option<f64>,
    /// Directly measured density (kg/m³).
    pub density_kg_m3: Option<f64>,
    /// Hand hardness code (`F-` .. `K+`).
    pub hand_hardness: Option<String>,
    /// Grain form code: sub-grain class if available (`FCxr`, `PPgp`),
    /// otherwise basic class (`FC`, `PP`).
    pub grain_form: Option<String>,
    /// Average grain size (mm).
    pub grain_size_mm: Option<f64>,
}

impl From<ObservedLayer> for Layer {
    fn from(obs: ObservedLayer) -> Layer {
        let mut layer = Layer::new();
        if let Some(t) = obs.thickness_cm {
            layer = layer.with_scalar("thickness", t, t.abs() * U_THICKNESS_FRACTION);
        }
        if let Some(rho) = obs.density_kg_m3 {
            layer = layer.with_scalar("density_measured", rho, rho.abs() * U_DENSITY_FRACTION);
        }
        if let Some(code) = obs.hand_hardness {
            if let Some(index) = hand_hardness_index(&code) {
                layer = layer.with_scalar("hand_hardness_index", index, U_HAND_HARDNESS_INDEX);
            }
            layer = layer.with_code("hand_hardness", code);
        }
        if let Some(gf) = obs.grain_form {
            layer = layer.with_code("grain_form", gf);
        }
        if let Some(gs) = obs.grain_size_mm {
            layer = layer.with_scalar("grain_size", gs, U_GRAIN_SIZE_MM);
        }
        layer
    }
}

/// Builds a slab from observed layers (surface first) and an optional slope
/// angle in degrees.
pub fn slab_from_observations(layers: Vec<ObservedLayer>, slope_angle_deg: Option<f64>) -> Slab {
    let slab = Slab::new(layers.into_iter().map(Layer::from).collect());
    match slope_angle_deg {
        Some(angle) => slab.with_scalar("slope_angle", angle, U_SLOPE_ANGLE_DEG),
        None => slab,
    }
}
