//! Laminate plate-theory slab parameters, after Weißgraeber & Rosendahl
//! (2023).
//!
//! All four stiffnesses integrate layer properties over the slab, with
//! z-coordinates measured from the geometric centroid (layer thickness in cm
//! is converted to mm):
//!
//! - `A11 = Σ E'_i h_i` (extensional, N/mm)
//! - `B11 = ½ Σ E'_i (z_{i+1}² − z_i²)` (bending-extension coupling, N)
//! - `D11 = ⅓ Σ E'_i (z_{i+1}³ − z_i³)` (bending, N·mm)
//! - `A55 = κ Σ G_i h_i` with `κ = 5/6` (shear, N/mm)
//!
//! where `E'_i = E_i / (1 − ν_i²)` is the plane-strain modulus. Missing
//! layer data or a Poisson's ratio outside `(-1, 1)` yields the NaN
//! sentinel; the engine reports NaN results as numerical failures.

use tracing::debug;

use snowmech_core::record::Slab;
use snowmech_core::uncertain::UncertainValue;

const CM_TO_MM: f64 = 10.0;

/// Per-layer quantities handed to the accumulators.
struct LayerTerm {
    plane_strain_modulus: UncertainValue,
    z_top: UncertainValue,
    z_bottom: UncertainValue,
}

/// Walks the slab top-down accumulating `Σ accumulate(term_i)` over the
/// plane-strain modulus and z-coordinates of each layer.
fn integrate_plane_strain(
    slab: &Slab,
    accumulate: impl Fn(&LayerTerm) -> UncertainValue,
) -> UncertainValue {
    if slab.is_empty() {
        debug!("plate integral: slab has no layers");
        return UncertainValue::nan();
    }

    let mut total = UncertainValue::exact(0.0);
    for (i, layer) in slab.layers().iter().enumerate() {
        match layer.raw_scalar("thickness") {
            Some(h) => total = total + h * CM_TO_MM,
            None => {
                debug!(layer = i, "plate integral: layer missing thickness");
                return UncertainValue::nan();
            }
        }
    }

    let z_top_surface = total / 2.0;
    let mut depth_from_top = UncertainValue::exact(0.0);
    let mut result = UncertainValue::exact(0.0);

    for (i, layer) in slab.layers().iter().enumerate() {
        let e = match layer.computed("elastic_modulus") {
            Some(e) => e,
            None => {
                debug!(layer = i, "plate integral: layer missing elastic_modulus");
                return UncertainValue::nan();
            }
        };
        let nu = match layer.computed("poissons_ratio") {
            Some(nu) => nu,
            None => {
                debug!(layer = i, "plate integral: layer missing poissons_ratio");
                return UncertainValue::nan();
            }
        };
        if nu.mean >= 1.0 || nu.mean < -1.0 {
            debug!(layer = i, nu = nu.mean, "plate integral: Poisson's ratio out of range");
            return UncertainValue::nan();
        }
        // Checked above, layers unchanged since.
        let h = match layer.raw_scalar("thickness") {
            Some(h) => h * CM_TO_MM,
            None => return UncertainValue::nan(),
        };

        let plane_strain_modulus = e / (UncertainValue::exact(1.0) - nu.powi(2));
        let z_top = z_top_surface - depth_from_top;
        let z_bottom = z_top_surface - (depth_from_top + h);
        depth_from_top = depth_from_top + h;

        result = result
            + accumulate(&LayerTerm {
                plane_strain_modulus,
                z_top,
                z_bottom,
            });
    }
    result
}

/// Extensional stiffness (N/mm).
pub fn a11(slab: &Slab) -> UncertainValue {
    integrate_plane_strain(slab, |term| {
        term.plane_strain_modulus * (term.z_top - term.z_bottom)
    })
}

/// Bending-extension coupling stiffness (N).
pub fn b11(slab: &Slab) -> UncertainValue {
    integrate_plane_strain(slab, |term| {
        0.5 * term.plane_strain_modulus * (term.z_top.powi(2) - term.z_bottom.powi(2))
    })
}

/// Bending stiffness (N·mm).
pub fn d11(slab: &Slab) -> UncertainValue {
    integrate_plane_strain(slab, |term| {
        (1.0 / 3.0) * term.plane_strain_modulus * (term.z_top.powi(3) - term.z_bottom.powi(3))
    })
}

/// Shear stiffness with correction factor `κ = 5/6` (N/mm).
pub fn a55(slab: &Slab) -> UncertainValue {
    if slab.is_empty() {
        debug!("a55: slab has no layers");
        return UncertainValue::nan();
    }
    let kappa = 5.0 / 6.0;
    let mut sum = UncertainValue::exact(0.0);
    for (i, layer) in slab.layers().iter().enumerate() {
        let g = match layer.computed("shear_modulus") {
            Some(g) => g,
            None => {
                debug!(layer = i, "a55: layer missing shear_modulus");
                return UncertainValue::nan();
            }
        };
        let h = match layer.raw_scalar("thickness") {
            Some(h) => h * CM_TO_MM,
            None => {
                debug!(layer = i, "a55: layer missing thickness");
                return UncertainValue::nan();
            }
        };
        sum = sum + g * h;
    }
    kappa * sum
}
