//! Density estimation from hand hardness, grain form, and grain size.
//!
//! Three empirical regressions, each with per-grain-form parameters:
//!
//! - `geldsetzer` -- Geldsetzer & Jamieson (2000), linear in the hand
//!   hardness index, with a non-linear power model for rounded grains.
//! - `kim_jamieson_table2` -- Kim & Jamieson (2014) Table 2, linear, with an
//!   exponential model for rounded grains whose coefficient standard error
//!   propagates through the exponent.
//! - `kim_jamieson_table5` -- Kim & Jamieson (2014) Table 6 multivariable
//!   regression on hardness index and grain size.
//!
//! All three honor `include_method_uncertainty`: when set, the regression's
//! residual standard error is combined in quadrature with the propagated
//! input uncertainty (for the exponential model, the coefficient SE is
//! propagated instead). When unset, the nominal value is unchanged and only
//! input uncertainty remains.
//!
//! Out-of-vocabulary grain forms yield the NaN sentinel; the registry's
//! domain tables normally reject them before these functions run.

use tracing::debug;

use snowmech_core::uncertain::UncertainValue;

/// Geldsetzer & Jamieson (2000), Table 3 regressions.
///
/// Linear grain forms use `rho = A + B*h`; rounded grains use the
/// non-linear `rho = A + B*h^3.15` from the discussion of equation 5.
pub fn geldsetzer(
    hand_hardness_index: UncertainValue,
    grain_form: &str,
    include_method_uncertainty: bool,
) -> UncertainValue {
    // (A, B, SE, nonlinear)
    let (a, b, se, nonlinear) = match grain_form {
        "PP" => (45.0, 36.0, 27.0, false),
        "PPgp" => (83.0, 37.0, 42.0, false),
        "DF" => (65.0, 36.0, 30.0, false),
        // SE for the nonlinear fit is not published; the linear SE is used.
        "RG" => (154.0, 1.51, 46.0, true),
        "RGmx" => (91.0, 42.0, 32.0, false),
        "FC" => (112.0, 46.0, 43.0, false),
        "FCmx" => (56.0, 64.0, 43.0, false),
        "DH" => (185.0, 25.0, 41.0, false),
        _ => {
            debug!(grain_form, "geldsetzer: unsupported grain form");
            return UncertainValue::nan();
        }
    };

    let h = hand_hardness_index;
    let rho = if nonlinear {
        a + b * h.powf(3.15)
    } else {
        a + b * h
    };
    if include_method_uncertainty {
        rho.with_quadrature_err(se)
    } else {
        rho
    }
}

/// Kim & Jamieson (2014), Table 2 regressions.
///
/// Linear grain forms use `rho = A + B*h` with a residual density SE. For
/// rounded grains the model is `rho = A * e^(B*h)` where the published SE
/// (0.2) is the standard error of the coefficient `B = 0.270`; it is
/// propagated through the exponential, producing density-dependent method
/// uncertainty.
pub fn kim_jamieson_table2(
    hand_hardness_index: UncertainValue,
    grain_form: &str,
    include_method_uncertainty: bool,
) -> UncertainValue {
    let h = hand_hardness_index;

    if grain_form == "RG" {
        let b_se = if include_method_uncertainty { 0.2 } else { 0.0 };
        let b = UncertainValue::new(0.270, b_se);
        return 91.8 * (b * h).exp();
    }

    let (a, b, se) = match grain_form {
        "PP" => (41.3, 40.3, 27.0),
        "PPgp" => (61.8, 46.4, 43.0),
        "DF" => (62.5, 37.4, 31.0),
        "RGxf" => (85.0, 46.3, 40.0),
        "FC" => (103.0, 50.6, 47.0),
        "FCxr" => (68.8, 58.6, 46.0),
        "DH" => (214.0, 19.0, 48.0),
        "MFcr" => (235.0, 15.1, 58.0),
        _ => {
            debug!(grain_form, "kim_jamieson_table2: unsupported grain form");
            return UncertainValue::nan();
        }
    };

    let rho = a + b * h;
    if include_method_uncertainty {
        rho.with_quadrature_err(se)
    } else {
        rho
    }
}

/// Kim & Jamieson (2014), Table 6 multivariable regression:
/// `rho = A*h + B*gs + C` on hardness index and grain size (mm).
pub fn kim_jamieson_table5(
    hand_hardness_index: UncertainValue,
    grain_form: &str,
    grain_size: UncertainValue,
    include_method_uncertainty: bool,
) -> UncertainValue {
    let (a, b, c, se) = match grain_form {
        "FC" => (51.9, 19.7, 82.8, 46.0),
        "FCxr" => (60.4, 27.7, 36.7, 45.0),
        "PP" => (40.0, -7.33, 52.8, 25.0),
        "PPgp" => (38.8, 18.8, 35.7, 33.0),
        "DF" => (37.9, -8.87, 71.4, 31.0),
        "MF" => (34.9, 11.2, 124.5, 63.0),
        _ => {
            debug!(grain_form, "kim_jamieson_table5: unsupported grain form");
            return UncertainValue::nan();
        }
    };

    let rho = a * hand_hardness_index + b * grain_size + c;
    if include_method_uncertainty {
        rho.with_quadrature_err(se)
    } else {
        rho
    }
}
