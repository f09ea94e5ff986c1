//! Shear modulus parameterization (MPa).

use tracing::debug;

use snowmech_core::uncertain::UncertainValue;

use crate::constants::{g_ice, RHO_ICE};
use crate::grain::basic_class;

/// Wautier et al. (2015): `G = G_ice * 0.92 * (rho/rho_ice)^2.51`, valid
/// for densities between 103 and 544 kg/m³.
pub fn wautier(density: UncertainValue, grain_form: &str) -> UncertainValue {
    match basic_class(grain_form) {
        Some("DF") | Some("RG") | Some("FC") | Some("DH") | Some("MF") => {}
        _ => {
            debug!(grain_form, "wautier: unsupported grain form");
            return UncertainValue::nan();
        }
    }
    if density.mean < 103.0 || density.mean > 544.0 {
        debug!(
            density = density.mean,
            "wautier: density outside valid range 103-544 kg/m³"
        );
        return UncertainValue::nan();
    }
    g_ice() * (0.92 * (density / RHO_ICE).powf(2.51))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_power_law_in_range() {
        let g = wautier(UncertainValue::exact(300.0), "RG");
        let rel = (300.0_f64 / RHO_ICE).powf(2.51);
        assert!((g.mean - 407.7 * 0.92 * rel).abs() < 1e-6);
        assert!((g.std_dev - 65.4 * 0.92 * rel).abs() < 1e-6);
    }

    #[test]
    fn density_range_gates() {
        assert!(wautier(UncertainValue::exact(100.0), "RG").is_nan());
        assert!(wautier(UncertainValue::exact(550.0), "RG").is_nan());
        assert!(!wautier(UncertainValue::exact(103.0), "RG").is_nan());
        assert!(!wautier(UncertainValue::exact(544.0), "RG").is_nan());
    }

    #[test]
    fn grain_form_gates() {
        assert!(!wautier(UncertainValue::exact(300.0), "MFcr").is_nan());
        assert!(wautier(UncertainValue::exact(300.0), "PP").is_nan());
        assert!(wautier(UncertainValue::exact(300.0), "X").is_nan());
    }
}
