//! Elastic modulus parameterizations (MPa).
//!
//! All four methods are power laws on the relative density `rho / rho_ice`.
//! Inputs are in kg/m³, outputs in MPa.

use tracing::debug;

use snowmech_core::uncertain::UncertainValue;

use crate::constants::RHO_ICE;

/// Bergfeld et al. (2023): `E = 6.5 GPa * (rho/rho_ice)^(4.4 ± 0.18)`.
pub fn bergfeld(density: UncertainValue) -> UncertainValue {
    if density.mean <= 0.0 {
        debug!(density = density.mean, "bergfeld: non-positive density");
        return UncertainValue::nan();
    }
    let c0 = 6500.0; // MPa
    let c1 = UncertainValue::new(4.4, 0.18);
    c0 * (density / RHO_ICE).pow(c1)
}

/// Köchle & Schneebeli (2014): `E = 4.5 GPa * (rho/rho_ice)^1.9`.
pub fn kochle(density: UncertainValue) -> UncertainValue {
    4500.0 * (density / RHO_ICE).powf(1.9)
}

/// Wautier et al. (2015): `E = E_ice * 0.78 * (rho/rho_ice)^2.34` with
/// `E_ice = 1.06 ± 0.19 GPa`.
pub fn wautier(density: UncertainValue) -> UncertainValue {
    let e_ice = UncertainValue::new(1060.0, 190.0); // MPa
    e_ice * 0.78 * (density / RHO_ICE).powf(2.34)
}

/// Schöttner et al. (2024): `E = 5.1 GPa * (rho/rho_ice)^2.94`.
pub fn schottner(density: UncertainValue) -> UncertainValue {
    if density.mean <= 0.0 {
        debug!(density = density.mean, "schottner: non-positive density");
        return UncertainValue::nan();
    }
    5100.0 * (density / RHO_ICE).powf(2.94)
}
