//! Default method registry: every edge of the default graph bound to its
//! implementation.

use snowmech_core::node::Level;
use snowmech_engine::{
    Engine, EngineError, MethodFailure, MethodRegistry, MethodSpec,
};

use crate::density;
use crate::elastic;
use crate::grain::grain_form_table;
use crate::graph_def::default_graph;
use crate::plate;
use crate::poisson;
use crate::shear;

/// Builds the default registry matching [`default_graph`].
pub fn default_registry() -> MethodRegistry {
    build().expect("builtin method registry is well-formed")
}

/// An engine over the default graph and registry.
pub fn default_engine() -> Engine {
    Engine::new(default_graph(), default_registry())
}

fn build() -> Result<MethodRegistry, EngineError> {
    let table = |method: &str| {
        grain_form_table(method).expect("density methods carry grain-form tables")
    };
    let mut r = MethodRegistry::new();

    // --- Density (layer) ---

    r.register(MethodSpec::new(
        "density",
        "direct",
        Level::Layer,
        ["density_measured"],
        |inputs, _| inputs.require_scalar("density_measured"),
    ))?;

    r.register(
        MethodSpec::new(
            "density",
            "geldsetzer",
            Level::Layer,
            ["hand_hardness_index", "grain_form"],
            |inputs, flags| {
                Ok(density::geldsetzer(
                    inputs.require_scalar("hand_hardness_index")?,
                    inputs.require_code("grain_form")?,
                    flags.include_method_uncertainty,
                ))
            },
        )
        .with_domain_table("grain_form", table("geldsetzer"))
        .with_method_uncertainty(),
    )?;

    r.register(
        MethodSpec::new(
            "density",
            "kim_jamieson_table2",
            Level::Layer,
            ["hand_hardness_index", "grain_form"],
            |inputs, flags| {
                Ok(density::kim_jamieson_table2(
                    inputs.require_scalar("hand_hardness_index")?,
                    inputs.require_code("grain_form")?,
                    flags.include_method_uncertainty,
                ))
            },
        )
        .with_domain_table("grain_form", table("kim_jamieson_table2"))
        .with_method_uncertainty(),
    )?;

    r.register(
        MethodSpec::new(
            "density",
            "kim_jamieson_table5",
            Level::Layer,
            ["hand_hardness_index", "grain_form", "grain_size"],
            |inputs, flags| {
                Ok(density::kim_jamieson_table5(
                    inputs.require_scalar("hand_hardness_index")?,
                    inputs.require_code("grain_form")?,
                    inputs.require_scalar("grain_size")?,
                    flags.include_method_uncertainty,
                ))
            },
        )
        .with_domain_table("grain_form", table("kim_jamieson_table5"))
        .with_method_uncertainty(),
    )?;

    // --- Elastic modulus (layer) ---

    r.register(MethodSpec::new(
        "elastic_modulus",
        "bergfeld",
        Level::Layer,
        ["density", "grain_form"],
        |inputs, _| Ok(elastic::bergfeld(inputs.require_scalar("density")?)),
    ))?;
    r.register(MethodSpec::new(
        "elastic_modulus",
        "kochle",
        Level::Layer,
        ["density", "grain_form"],
        |inputs, _| Ok(elastic::kochle(inputs.require_scalar("density")?)),
    ))?;
    r.register(MethodSpec::new(
        "elastic_modulus",
        "wautier",
        Level::Layer,
        ["density", "grain_form"],
        |inputs, _| Ok(elastic::wautier(inputs.require_scalar("density")?)),
    ))?;
    r.register(MethodSpec::new(
        "elastic_modulus",
        "schottner",
        Level::Layer,
        ["density", "grain_form"],
        |inputs, _| Ok(elastic::schottner(inputs.require_scalar("density")?)),
    ))?;

    // --- Poisson's ratio (layer) ---

    r.register(
        MethodSpec::new(
            "poissons_ratio",
            "kochle",
            Level::Layer,
            ["grain_form"],
            |inputs, flags| {
                Ok(poisson::kochle(
                    inputs.require_code("grain_form")?,
                    flags.include_method_uncertainty,
                ))
            },
        )
        .with_method_uncertainty(),
    )?;
    r.register(
        MethodSpec::new(
            "poissons_ratio",
            "srivastava",
            Level::Layer,
            ["density", "grain_form"],
            |inputs, flags| {
                Ok(poisson::srivastava(
                    inputs.require_scalar("density")?,
                    inputs.require_code("grain_form")?,
                    flags.include_method_uncertainty,
                ))
            },
        )
        .with_method_uncertainty(),
    )?;

    // --- Shear modulus (layer) ---

    r.register(MethodSpec::new(
        "shear_modulus",
        "wautier",
        Level::Layer,
        ["density", "grain_form"],
        |inputs, _| {
            Ok(shear::wautier(
                inputs.require_scalar("density")?,
                inputs.require_code("grain_form")?,
            ))
        },
    ))?;

    // --- Plate theory (slab) ---

    r.register(MethodSpec::new(
        "A11",
        "weissgraeber_rosendahl",
        Level::Slab,
        Vec::<String>::new(),
        |inputs, _| Ok(plate::a11(require_slab(inputs)?)),
    ))?;
    r.register(MethodSpec::new(
        "B11",
        "weissgraeber_rosendahl",
        Level::Slab,
        Vec::<String>::new(),
        |inputs, _| Ok(plate::b11(require_slab(inputs)?)),
    ))?;
    r.register(MethodSpec::new(
        "D11",
        "weissgraeber_rosendahl",
        Level::Slab,
        Vec::<String>::new(),
        |inputs, _| Ok(plate::d11(require_slab(inputs)?)),
    ))?;
    r.register(MethodSpec::new(
        "A55",
        "weissgraeber_rosendahl",
        Level::Slab,
        Vec::<String>::new(),
        |inputs, _| Ok(plate::a55(require_slab(inputs)?)),
    ))?;

    Ok(r)
}

fn require_slab<'a>(
    inputs: &snowmech_engine::ResolvedInputs<'a>,
) -> Result<&'a snowmech_core::record::Slab, MethodFailure> {
    inputs
        .slab
        .ok_or_else(|| MethodFailure::new("slab context required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_graph_method() {
        let graph = default_graph();
        let registry = default_registry();
        // Every leveled parameter's methods in the registry must match the
        // method edges in the graph.
        for (parameter, expected) in [
            (
                "density",
                vec!["direct", "geldsetzer", "kim_jamieson_table2", "kim_jamieson_table5"],
            ),
            (
                "elastic_modulus",
                vec!["bergfeld", "kochle", "schottner", "wautier"],
            ),
            ("poissons_ratio", vec!["kochle", "srivastava"]),
            ("shear_modulus", vec!["wautier"]),
            ("A11", vec!["weissgraeber_rosendahl"]),
            ("B11", vec!["weissgraeber_rosendahl"]),
            ("D11", vec!["weissgraeber_rosendahl"]),
            ("A55", vec!["weissgraeber_rosendahl"]),
        ] {
            assert_eq!(registry.methods_for(parameter), expected, "{}", parameter);
            let node_id = graph.node_id(parameter).unwrap();
            let mut edge_methods: Vec<String> = graph
                .incoming(node_id)
                .into_iter()
                .filter_map(|(_, label)| label.method().map(String::from))
                .collect();
            edge_methods.sort_unstable();
            assert_eq!(edge_methods, expected, "{}", parameter);
        }
    }

    #[test]
    fn registry_size() {
        assert_eq!(default_registry().len(), 15);
    }
}
