//! Poisson's ratio parameterizations (dimensionless).
//!
//! Both methods are grain-type means from finite-element simulations of
//! micro-CT snow geometry; the reported standard deviations are the
//! method's inherent uncertainty and are dropped when
//! `include_method_uncertainty` is off.

use tracing::debug;

use snowmech_core::uncertain::UncertainValue;

use crate::grain::basic_class;

fn grain_mean(value: f64, std: f64, include_method_uncertainty: bool) -> UncertainValue {
    UncertainValue::new(value, if include_method_uncertainty { std } else { 0.0 })
}

/// Köchle & Schneebeli (2014) grain-type means: RG, FC, DH.
pub fn kochle(grain_form: &str, include_method_uncertainty: bool) -> UncertainValue {
    match basic_class(grain_form) {
        Some("RG") => grain_mean(0.171, 0.026, include_method_uncertainty),
        Some("FC") => grain_mean(0.130, 0.040, include_method_uncertainty),
        Some("DH") => grain_mean(0.087, 0.063, include_method_uncertainty),
        _ => {
            debug!(grain_form, "kochle: unsupported grain form");
            UncertainValue::nan()
        }
    }
}

/// Srivastava et al. (2016) grain-type means, valid for densities above
/// 200 kg/m³ (and at most 580 kg/m³ for rounded grains).
pub fn srivastava(
    density: UncertainValue,
    grain_form: &str,
    include_method_uncertainty: bool,
) -> UncertainValue {
    if density.mean <= 200.0 {
        debug!(
            density = density.mean,
            "srivastava: density below valid range (> 200 kg/m³)"
        );
        return UncertainValue::nan();
    }
    match basic_class(grain_form) {
        Some("RG") => {
            if density.mean > 580.0 {
                debug!(
                    density = density.mean,
                    "srivastava: density above valid range for RG (<= 580 kg/m³)"
                );
                return UncertainValue::nan();
            }
            grain_mean(0.191, 0.008, include_method_uncertainty)
        }
        Some("PP") | Some("DF") => grain_mean(0.132, 0.053, include_method_uncertainty),
        Some("FC") | Some("DH") => grain_mean(0.17, 0.02, include_method_uncertainty),
        _ => {
            debug!(grain_form, "srivastava: unsupported grain form");
            UncertainValue::nan()
        }
    }
}
