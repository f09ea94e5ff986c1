//! End-to-end tests over the default snow graph and registry.
//!
//! These drive the full stack the way a caller would: build a slab from
//! field observations, execute all pathways to layer- and slab-level
//! targets, and check pathway counts, cache behavior, provenance, and the
//! copy-on-write guarantees against hand-computed expectations.

use std::collections::BTreeMap;

use snowmech_engine::{EngineError, ExecutionConfig, FailureKind};
use snowmech_methods::constants::RHO_ICE;
use snowmech_methods::{default_engine, slab_from_observations, ObservedLayer};

fn config() -> ExecutionConfig {
    ExecutionConfig::default()
}

/// A fully measured layer: every density method applies to faceted
/// crystals, so all four density alternatives succeed.
fn full_layer() -> ObservedLayer {
    ObservedLayer {
        thickness_cm: Some(30.0),
        density_kg_m3: Some(250.0),
        hand_hardness: Some("P".into()),
        grain_form: Some("FC".into()),
        grain_size_mm: Some(1.0),
    }
}

fn full_slab(n: usize) -> snowmech_core::record::Slab {
    slab_from_observations(vec![full_layer(); n], Some(35.0))
}

// ---------------------------------------------------------------------------
// Pathway enumeration over the real graph
// ---------------------------------------------------------------------------

#[test]
fn list_pathways_counts() {
    let engine = default_engine();
    assert_eq!(engine.list_pathways("density").unwrap().len(), 4);
    assert_eq!(engine.list_pathways("elastic_modulus").unwrap().len(), 16);
    assert_eq!(engine.list_pathways("poissons_ratio").unwrap().len(), 5);
    assert_eq!(engine.list_pathways("shear_modulus").unwrap().len(), 4);
    assert_eq!(engine.list_pathways("D11").unwrap().len(), 32);
    assert_eq!(engine.list_pathways("A11").unwrap().len(), 32);
    assert_eq!(engine.list_pathways("B11").unwrap().len(), 32);
    assert_eq!(engine.list_pathways("A55").unwrap().len(), 4);
}

#[test]
fn unknown_target_faults() {
    let engine = default_engine();
    assert!(matches!(
        engine.list_pathways("densityy").unwrap_err(),
        EngineError::UnknownTarget { .. }
    ));
    assert!(matches!(
        engine.list_pathways("merge_density_grain_form").unwrap_err(),
        EngineError::NotAParameter { .. }
    ));
}

// ---------------------------------------------------------------------------
// Density
// ---------------------------------------------------------------------------

#[test]
fn density_pathways_on_full_profile() {
    let engine = default_engine();
    let slab = full_slab(1);
    let results = engine.execute_all(&slab, "density", &config()).unwrap();

    assert_eq!(results.total, 4);
    assert_eq!(results.successful, 4);

    // Direct measurement passes the measured value through.
    let direct = results.pathway_by_id("density:direct").unwrap();
    let value = direct.slab.layer(0).unwrap().computed("density").unwrap();
    assert_eq!(value.mean, 250.0);
    assert_eq!(value.std_dev, 12.5);

    // Geldsetzer for faceted crystals at hardness P: 112 + 46*4, with the
    // input term 46*0.5 and the method SE 43 in quadrature.
    let geldsetzer = results.pathway_by_id("density:geldsetzer").unwrap();
    let value = geldsetzer.slab.layer(0).unwrap().computed("density").unwrap();
    assert!((value.mean - 296.0).abs() < 1e-6);
    assert!((value.std_dev - 23.0_f64.hypot(43.0)).abs() < 1e-6);

    // A plain basic-class grain form is not a degraded resolution.
    for pathway in results.pathways.values() {
        assert!(pathway.warnings.is_empty(), "{:?}", pathway.warnings);
    }
}

#[test]
fn sub_grain_code_triggers_fallback_warning() {
    let engine = default_engine();
    let mut layer = full_layer();
    // Not in any specific set; falls back to basic class FC.
    layer.grain_form = Some("FCso".into());
    let slab = slab_from_observations(vec![layer], None);
    let results = engine.execute_all(&slab, "density", &config()).unwrap();

    let geldsetzer = results.pathway_by_id("density:geldsetzer").unwrap();
    assert!(geldsetzer.success);
    assert_eq!(geldsetzer.warnings.len(), 1);
    assert!(geldsetzer.warnings[0].contains("FCso"));
    // The direct pathway reads no grain form and stays silent.
    let direct = results.pathway_by_id("density:direct").unwrap();
    assert!(direct.warnings.is_empty());
}

#[test]
fn missing_measurements_fail_only_dependent_pathways() {
    let engine = default_engine();
    // No hand hardness: the three regressions fail, direct succeeds.
    let slab = slab_from_observations(
        vec![ObservedLayer {
            thickness_cm: Some(30.0),
            density_kg_m3: Some(250.0),
            grain_form: Some("RG".into()),
            grain_size_mm: Some(1.0),
            ..ObservedLayer::default()
        }],
        None,
    );
    let results = engine.execute_all(&slab, "density", &config()).unwrap();
    assert_eq!(results.total, 4);
    assert_eq!(results.successful, 1);
    assert_eq!(results.failed, 3);

    let geldsetzer = results.pathway_by_id("density:geldsetzer").unwrap();
    assert_eq!(
        geldsetzer.traces[0].failure.as_ref().unwrap().kind,
        FailureKind::MissingInput
    );
}

// ---------------------------------------------------------------------------
// Elastic modulus: caching of the shared density stage
// ---------------------------------------------------------------------------

#[test]
fn elastic_modulus_caches_density_across_pathways() {
    let engine = default_engine();
    let slab = full_slab(1);
    let results = engine.execute_all(&slab, "elastic_modulus", &config()).unwrap();

    assert_eq!(results.total, 16);
    assert_eq!(results.successful, 16);

    // One layer, four density methods: each is computed once (miss) and
    // reused by the remaining twelve pathways (3 hits each).
    assert_eq!(results.cache_stats.misses, 4);
    assert_eq!(results.cache_stats.hits, 12);
    assert!((results.cache_stats.hit_rate() - 0.75).abs() < 1e-12);

    // Cached density values agree across pathways sharing a method.
    let mut by_method: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for pathway in results.pathways.values() {
        let density_method = pathway.methods["density"].as_str();
        for trace in pathway.traces_for("density") {
            by_method
                .entry(density_method)
                .or_default()
                .push(trace.output.unwrap().mean);
        }
    }
    for (method, values) in by_method {
        assert_eq!(values.len(), 4, "{}", method);
        assert!(values.windows(2).all(|w| w[0] == w[1]), "{}", method);
    }

    // Elastic modulus itself is never cached.
    for pathway in results.pathways.values() {
        assert!(pathway.traces_for("elastic_modulus").all(|t| !t.cached));
    }
}

#[test]
fn bergfeld_direct_value_is_reproduced() {
    let engine = default_engine();
    let slab = full_slab(1);
    let results = engine.execute_all(&slab, "elastic_modulus", &config()).unwrap();
    let pathway = results
        .pathway_by_id("density:direct->elastic_modulus:bergfeld")
        .unwrap();
    let e = pathway
        .slab
        .layer(0)
        .unwrap()
        .computed("elastic_modulus")
        .unwrap();
    let expected = 6500.0 * (250.0 / RHO_ICE).powf(4.4);
    assert!((e.mean - expected).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Slab-level target
// ---------------------------------------------------------------------------

#[test]
fn d11_end_to_end_on_three_layers() {
    let engine = default_engine();
    let slab = full_slab(3);
    let results = engine.execute_all(&slab, "D11", &config()).unwrap();

    assert_eq!(results.total, 32);
    assert_eq!(results.successful, 32);

    for pathway in results.pathways.values() {
        // Exactly one slab-level trace per pathway.
        let d11_traces: Vec<_> = pathway.traces_for("D11").collect();
        assert_eq!(d11_traces.len(), 1);
        assert_eq!(d11_traces[0].layer_index, None);

        let d11 = pathway.slab.computed("D11").unwrap();
        assert!(d11.mean > 0.0);
        assert!(d11.std_dev > 0.0);
        // Only the target is computed at slab level, not its siblings.
        assert!(pathway.slab.computed("A11").is_none());
        assert!(pathway.slab.computed("B11").is_none());
        assert!(pathway.slab.computed("A55").is_none());
    }
}

#[test]
fn d11_with_rounded_grains_fails_table5_pathways() {
    let engine = default_engine();
    // Rounded grains are outside table 5's vocabulary, so its 8 pathways
    // (4 E x 2 nu) lose density and fail at the prerequisite check.
    let mut layer = full_layer();
    layer.grain_form = Some("RG".into());
    let slab = slab_from_observations(vec![layer; 3], Some(35.0));
    let results = engine.execute_all(&slab, "D11", &config()).unwrap();

    assert_eq!(results.total, 32);
    assert_eq!(results.successful, 24);
    assert_eq!(results.failed, 8);

    for pathway in results.pathways.values() {
        if pathway.methods["density"] == "kim_jamieson_table5" {
            assert!(!pathway.success);
            let d11_trace = pathway.traces_for("D11").next().unwrap();
            assert_eq!(
                d11_trace.failure.as_ref().unwrap().kind,
                FailureKind::MissingPrerequisite
            );
        } else {
            assert!(pathway.success, "{}", pathway.description);
        }
    }
}

#[test]
fn a55_end_to_end() {
    let engine = default_engine();
    let slab = full_slab(2);
    let results = engine.execute_all(&slab, "A55", &config()).unwrap();
    assert_eq!(results.total, 4);
    // Shear wautier accepts FC and all four densities are in 103..544.
    assert_eq!(results.successful, 4);

    for pathway in results.successful_pathways() {
        let a55 = pathway.1.slab.computed("A55").unwrap();
        assert!(a55.mean > 0.0);
    }
}

#[test]
fn layer_failure_surfaces_as_missing_prerequisite() {
    let engine = default_engine();
    // Layer 1 has no grain form: every density regression and the direct
    // path still works, but elastic modulus requires grain_form as an
    // input, so it fails on that layer and D11 cannot run.
    let mut bad_layer = full_layer();
    bad_layer.grain_form = None;
    let slab = slab_from_observations(vec![full_layer(), bad_layer, full_layer()], None);

    let results = engine.execute_all(&slab, "D11", &config()).unwrap();
    assert_eq!(results.successful, 0);

    let direct = results
        .pathway_by_id(
            "D11:weissgraeber_rosendahl->density:direct->elastic_modulus:bergfeld->poissons_ratio:kochle",
        )
        .unwrap();
    let e_failure = direct
        .traces
        .iter()
        .find(|t| t.parameter == "elastic_modulus" && !t.success)
        .unwrap();
    assert_eq!(e_failure.layer_index, Some(1));
    let d11_trace = direct.traces_for("D11").next().unwrap();
    assert_eq!(
        d11_trace.failure.as_ref().unwrap().kind,
        FailureKind::MissingPrerequisite
    );
    assert!(d11_trace.failure.as_ref().unwrap().detail.contains("layer 1"));
}

// ---------------------------------------------------------------------------
// Cross-cutting guarantees on the real stack
// ---------------------------------------------------------------------------

#[test]
fn input_slab_unchanged_and_unmodified_layers_shared() {
    let engine = default_engine();
    let slab = full_slab(2);
    let before = serde_json::to_string(&slab).unwrap();

    let results = engine.execute_all(&slab, "elastic_modulus", &config()).unwrap();
    assert_eq!(serde_json::to_string(&slab).unwrap(), before);

    // Every successful pathway wrote to both layers, so nothing is shared;
    // the source_slab inside the results still shares everything.
    for (_, pathway) in results.successful_pathways() {
        assert!(!pathway.slab.shares_layer_with(&slab, 0));
        assert!(!pathway.slab.shares_layer_with(&slab, 1));
    }
    assert!(results.source_slab.shares_layer_with(&slab, 0));
    assert!(results.source_slab.shares_layer_with(&slab, 1));
}

#[test]
fn execute_all_is_deterministic() {
    let engine = default_engine();
    let slab = full_slab(2);
    let a = engine.execute_all(&slab, "D11", &config()).unwrap();
    let b = engine.execute_all(&slab, "D11", &config()).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn execute_single_round_trips() {
    let engine = default_engine();
    let slab = full_slab(2);
    let results = engine.execute_all(&slab, "elastic_modulus", &config()).unwrap();

    let (description, pathway) = results.pathways.iter().next().unwrap();
    let single = engine
        .execute_single(&slab, "elastic_modulus", &pathway.methods, &config())
        .unwrap();
    assert_eq!(&single.description, description);
    assert_eq!(single.slab, pathway.slab);

    // A partial map selects the first matching pathway.
    let mut partial = BTreeMap::new();
    partial.insert("density".to_string(), "geldsetzer".to_string());
    let matched = engine
        .execute_single(&slab, "elastic_modulus", &partial, &config())
        .unwrap();
    assert_eq!(matched.methods["density"], "geldsetzer");

    // An impossible map is a fault.
    let mut impossible = BTreeMap::new();
    impossible.insert("density".to_string(), "bergfeld".to_string());
    assert!(matches!(
        engine
            .execute_single(&slab, "elastic_modulus", &impossible, &config())
            .unwrap_err(),
        EngineError::NoSuchPathway { .. }
    ));
}

#[test]
fn method_uncertainty_toggle_shrinks_spread() {
    let engine = default_engine();
    let slab = full_slab(1);

    let with_mu = engine.execute_all(&slab, "density", &config()).unwrap();
    let without_mu = engine
        .execute_all(
            &slab,
            "density",
            &ExecutionConfig {
                include_method_uncertainty: false,
                ..ExecutionConfig::default()
            },
        )
        .unwrap();

    let pick = |r: &snowmech_engine::ExecutionResults| {
        r.pathway_by_id("density:geldsetzer")
            .unwrap()
            .slab
            .layer(0)
            .unwrap()
            .computed("density")
            .unwrap()
    };
    let loud = pick(&with_mu);
    let quiet = pick(&without_mu);
    assert_eq!(loud.mean, quiet.mean);
    assert!(loud.std_dev > quiet.std_dev);
    // Input (hand hardness) uncertainty still propagates when the method
    // term is off.
    assert!(quiet.std_dev > 0.0);
}

#[test]
fn zero_layer_slab() {
    let engine = default_engine();
    let slab = slab_from_observations(vec![], None);
    let results = engine.execute_all(&slab, "density", &config()).unwrap();
    assert_eq!(results.total, 4);
    assert_eq!(results.failed, 4);
    for pathway in results.pathways.values() {
        assert!(pathway.traces.is_empty());
        assert!(!pathway.success);
    }
}

#[test]
fn trace_totality_for_layer_target() {
    let engine = default_engine();
    let slab = full_slab(3);
    let results = engine.execute_all(&slab, "shear_modulus", &config()).unwrap();
    for pathway in results.pathways.values() {
        assert_eq!(pathway.traces_for("shear_modulus").count(), 3);
    }
}
