//! The default snow parameter dependency graph.
//!
//! Layer level:
//!
//! ```text
//! snow_pit -> measured_* (data flow)
//! measured_density --direct--> density
//! measured_hand_hardness + measured_grain_form
//!     -> merge_hand_hardness_grain_form --geldsetzer--> density
//!                                       --kim_jamieson_table2--> density
//! measured_hand_hardness + measured_grain_form + measured_grain_size
//!     -> merge_hand_hardness_grain_form_grain_size --kim_jamieson_table5--> density
//! density + measured_grain_form
//!     -> merge_density_grain_form --bergfeld|kochle|wautier|schottner--> elastic_modulus
//!                                 --srivastava--> poissons_ratio
//!                                 --wautier--> shear_modulus
//! measured_grain_form --kochle--> poissons_ratio
//! ```
//!
//! Slab level:
//!
//! ```text
//! measured_layer_thickness + elastic_modulus + poissons_ratio
//!     -> merge_thickness_E_nu --weissgraeber_rosendahl--> A11, B11, D11
//! measured_layer_thickness + shear_modulus
//!     -> merge_thickness_G --weissgraeber_rosendahl--> A55
//! ```
//!
//! `density` is the single shared node feeding both elastic modulus and the
//! srivastava Poisson's ratio method, so any pathway using srivastava must
//! use the same density method as elastic modulus; the enumerator's
//! fingerprint deduplication enforces this, constraining D11 to
//! 4 density x 4 E x 2 nu = 32 unique pathways.
//!
//! `density` is also the only cacheable node: it depends exclusively on
//! layer-intrinsic measurements, so pathways sharing a density method may
//! safely reuse its value. Downstream parameters depend on which density
//! method ran upstream and are recomputed per pathway.

use snowmech_core::error::GraphError;
use snowmech_core::graph::{GraphBuilder, ParamGraph};
use snowmech_core::node::Level;

/// Builds the default sealed snow parameter graph.
pub fn default_graph() -> ParamGraph {
    build().expect("builtin parameter graph is well-formed")
}

fn build() -> Result<ParamGraph, GraphError> {
    let mut b = GraphBuilder::new();

    // Root and measured inputs.
    let snow_pit = b.param("snow_pit")?;
    let measured_density = b.param("measured_density")?;
    let measured_hand_hardness = b.param("measured_hand_hardness")?;
    let measured_grain_form = b.param("measured_grain_form")?;
    let measured_grain_size = b.param("measured_grain_size")?;
    let measured_layer_thickness = b.param("measured_layer_thickness")?;

    // Calculated layer parameters.
    let density = b.param_leveled("density", Level::Layer)?;
    let elastic_modulus = b.param_leveled("elastic_modulus", Level::Layer)?;
    let poissons_ratio = b.param_leveled("poissons_ratio", Level::Layer)?;
    let shear_modulus = b.param_leveled("shear_modulus", Level::Layer)?;

    // Calculated slab parameters (plate theory).
    let a11 = b.param_leveled("A11", Level::Slab)?;
    let b11 = b.param_leveled("B11", Level::Slab)?;
    let d11 = b.param_leveled("D11", Level::Slab)?;
    let a55 = b.param_leveled("A55", Level::Slab)?;

    // Merge nodes.
    let merge_hh_gf = b.merge("merge_hand_hardness_grain_form")?;
    let merge_hh_gf_gs = b.merge("merge_hand_hardness_grain_form_grain_size")?;
    let merge_d_gf = b.merge("merge_density_grain_form")?;
    let merge_hi_e_nu = b.merge("merge_thickness_E_nu")?;
    let merge_hi_g = b.merge("merge_thickness_G")?;

    // Snow pit to measured parameters.
    b.flow(snow_pit, measured_density)?;
    b.flow(snow_pit, measured_hand_hardness)?;
    b.flow(snow_pit, measured_grain_form)?;
    b.flow(snow_pit, measured_grain_size)?;
    b.flow(snow_pit, measured_layer_thickness)?;

    // Density: direct measurement plus three regressions.
    b.method(measured_density, density, "direct")?;
    b.flow(measured_hand_hardness, merge_hh_gf)?;
    b.flow(measured_grain_form, merge_hh_gf)?;
    b.method(merge_hh_gf, density, "geldsetzer")?;
    b.method(merge_hh_gf, density, "kim_jamieson_table2")?;
    b.flow(measured_hand_hardness, merge_hh_gf_gs)?;
    b.flow(measured_grain_form, merge_hh_gf_gs)?;
    b.flow(measured_grain_size, merge_hh_gf_gs)?;
    b.method(merge_hh_gf_gs, density, "kim_jamieson_table5")?;

    // Elastic modulus, Poisson's ratio, shear modulus from density + grain
    // form (merge_density_grain_form is shared by all three).
    b.flow(density, merge_d_gf)?;
    b.flow(measured_grain_form, merge_d_gf)?;
    b.method(merge_d_gf, elastic_modulus, "bergfeld")?;
    b.method(merge_d_gf, elastic_modulus, "kochle")?;
    b.method(merge_d_gf, elastic_modulus, "wautier")?;
    b.method(merge_d_gf, elastic_modulus, "schottner")?;
    b.method(measured_grain_form, poissons_ratio, "kochle")?;
    b.method(merge_d_gf, poissons_ratio, "srivastava")?;
    b.method(merge_d_gf, shear_modulus, "wautier")?;

    // Slab level: A11, B11, D11 need thickness + E + nu on every layer;
    // A55 needs thickness + G.
    b.flow(measured_layer_thickness, merge_hi_e_nu)?;
    b.flow(elastic_modulus, merge_hi_e_nu)?;
    b.flow(poissons_ratio, merge_hi_e_nu)?;
    b.method(merge_hi_e_nu, a11, "weissgraeber_rosendahl")?;
    b.method(merge_hi_e_nu, b11, "weissgraeber_rosendahl")?;
    b.method(merge_hi_e_nu, d11, "weissgraeber_rosendahl")?;
    b.flow(measured_layer_thickness, merge_hi_g)?;
    b.flow(shear_modulus, merge_hi_g)?;
    b.method(merge_hi_g, a55, "weissgraeber_rosendahl")?;

    b.mark_cacheable("density")?;
    b.seal()
}
