//! Backward enumeration of derivation trees.
//!
//! [`enumerate_derivations`] finds every distinct way to derive a target
//! parameter from the graph's source node. The traversal walks incoming
//! edges backward from the target:
//!
//! - **Parameter nodes** are OR points: each incoming edge is an alternative
//!   method, enumerated independently.
//! - **Merge nodes** are AND points: all incoming edges are required, so the
//!   per-edge subtree lists combine as a Cartesian product.
//!
//! Results are memoized per node, so each graph node is expanded once per
//! call; subtrees are shared via `Arc` rather than cloned.
//!
//! # Fingerprint deduplication
//!
//! The Cartesian product at merge nodes produces structurally distinct trees
//! that commit to the same method choices whenever a shared parameter (e.g.
//! density) feeds two sibling branches. Only one method can be in use per
//! parameter per execution, so such trees would execute identically. Each
//! tree is therefore reduced to its *method fingerprint* -- the sorted
//! `(parameter, method)` pairs over leveled parameter nodes -- and only the
//! first tree per fingerprint is kept.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::edge::EdgeLabel;
use crate::graph::ParamGraph;
use crate::id::NodeId;

/// A concrete derivation: one chosen incoming edge per parameter node, all
/// incoming edges per merge node, grounded at the source.
///
/// For parameter nodes `children` has length 0 (the source) or 1; for merge
/// nodes it has length equal to the merge's in-degree. The label on each
/// child pair is the label of the edge from that child up into this node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationTree {
    pub node: NodeId,
    pub children: Vec<(Arc<DerivationTree>, EdgeLabel)>,
}

/// A deduplicated derivation: the representative tree, the method map it
/// commits to, and the canonical fingerprint string (which doubles as the
/// pathway id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Derivation {
    pub tree: Arc<DerivationTree>,
    /// Leveled parameter name -> method identifier.
    pub methods: BTreeMap<String, String>,
    /// Sorted `"param:method"` pairs joined with `->`.
    pub fingerprint: String,
}

/// Enumerates all distinct derivations of `target`, deduplicated by method
/// fingerprint. A pure function of the sealed graph: repeated calls return
/// the same derivations in the same order.
pub fn enumerate_derivations(graph: &ParamGraph, target: NodeId) -> Vec<Derivation> {
    let mut memo: HashMap<NodeId, Arc<Vec<Arc<DerivationTree>>>> = HashMap::new();
    let trees = backtrack(graph, target, &mut memo);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();
    for tree in trees.iter() {
        let mut methods = BTreeMap::new();
        collect_methods(graph, tree, &mut methods);
        let fingerprint = fingerprint_of(&methods);
        if seen.insert(fingerprint.clone()) {
            out.push(Derivation {
                tree: Arc::clone(tree),
                methods,
                fingerprint,
            });
        }
    }
    out
}

/// The canonical fingerprint string for a method map.
pub fn fingerprint_of(methods: &BTreeMap<String, String>) -> String {
    methods
        .iter()
        .map(|(p, m)| format!("{}:{}", p, m))
        .collect::<Vec<_>>()
        .join("->")
}

fn backtrack(
    graph: &ParamGraph,
    v: NodeId,
    memo: &mut HashMap<NodeId, Arc<Vec<Arc<DerivationTree>>>>,
) -> Arc<Vec<Arc<DerivationTree>>> {
    if let Some(trees) = memo.get(&v) {
        return Arc::clone(trees);
    }

    let trees = if v == graph.source() {
        vec![Arc::new(DerivationTree {
            node: v,
            children: Vec::new(),
        })]
    } else if graph.node(v).map(|n| n.is_parameter()).unwrap_or(false) {
        // OR logic: each incoming edge is an alternative.
        let mut out = Vec::new();
        for (u, label) in graph.incoming(v) {
            let subs = backtrack(graph, u, memo);
            for sub in subs.iter() {
                out.push(Arc::new(DerivationTree {
                    node: v,
                    children: vec![(Arc::clone(sub), label.clone())],
                }));
            }
        }
        out
    } else {
        // AND logic: one subtree per incoming edge, combined as a Cartesian
        // product that preserves edge identity.
        let mut lists: Vec<Vec<(Arc<DerivationTree>, EdgeLabel)>> = Vec::new();
        for (u, label) in graph.incoming(v) {
            let subs = backtrack(graph, u, memo);
            lists.push(
                subs.iter()
                    .map(|t| (Arc::clone(t), label.clone()))
                    .collect(),
            );
        }
        let mut combos: Vec<Vec<(Arc<DerivationTree>, EdgeLabel)>> = vec![Vec::new()];
        for list in &lists {
            let mut next = Vec::with_capacity(combos.len() * list.len());
            for combo in &combos {
                for item in list {
                    let mut extended = combo.clone();
                    extended.push(item.clone());
                    next.push(extended);
                }
            }
            combos = next;
        }
        combos
            .into_iter()
            .map(|children| Arc::new(DerivationTree { node: v, children }))
            .collect()
    };

    let trees = Arc::new(trees);
    memo.insert(v, Arc::clone(&trees));
    trees
}

/// Walks a tree recording, for every leveled parameter node, the method id
/// on its chosen incoming edge. Data flow edges, merge nodes, and unleveled
/// parameters (the source and measured inputs) contribute nothing.
fn collect_methods(graph: &ParamGraph, tree: &DerivationTree, out: &mut BTreeMap<String, String>) {
    for (child, _) in &tree.children {
        collect_methods(graph, child, out);
    }
    if let Some(node) = graph.node(tree.node) {
        if node.level().is_some() {
            if let [(_, label)] = tree.children.as_slice() {
                if let Some(method) = label.method() {
                    out.insert(node.name.clone(), method.to_string());
                }
            }
        }
    }
}

/// Collects the leveled parameter names appearing anywhere in a tree.
pub fn leveled_params_in(graph: &ParamGraph, tree: &DerivationTree) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_leveled(graph, tree, &mut out);
    out
}

fn collect_leveled(graph: &ParamGraph, tree: &DerivationTree, out: &mut BTreeSet<String>) {
    if let Some(node) = graph.node(tree.node) {
        if node.level().is_some() {
            out.insert(node.name.clone());
        }
    }
    for (child, _) in &tree.children {
        collect_leveled(graph, child, out);
    }
}

/// Dependency sets among the leveled parameters of a tree: for each leveled
/// parameter `p`, the leveled parameters appearing strictly below `p`'s
/// subtree. Where a parameter occurs more than once (shared branches of a
/// merge), the union is taken.
pub fn leveled_dependencies(
    graph: &ParamGraph,
    tree: &DerivationTree,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut deps = BTreeMap::new();
    collect_deps(graph, tree, &mut deps);
    deps
}

fn collect_deps(
    graph: &ParamGraph,
    tree: &DerivationTree,
    deps: &mut BTreeMap<String, BTreeSet<String>>,
) -> BTreeSet<String> {
    let mut below = BTreeSet::new();
    for (child, _) in &tree.children {
        below.extend(collect_deps(graph, child, deps));
    }
    if let Some(node) = graph.node(tree.node) {
        if node.level().is_some() {
            deps.entry(node.name.clone())
                .or_default()
                .extend(below.iter().cloned());
            let mut with_self = below;
            with_self.insert(node.name.clone());
            return with_self;
        }
    }
    below
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::node::Level;

    /// S -> m_raw -> p_out via method "direct".
    fn direct_graph() -> ParamGraph {
        let mut b = GraphBuilder::new();
        let s = b.param("snow_pit").unwrap();
        let raw = b.param("measured_density").unwrap();
        let p = b.param_leveled("density", Level::Layer).unwrap();
        b.flow(s, raw).unwrap();
        b.method(raw, p, "direct").unwrap();
        b.seal().unwrap()
    }

    #[test]
    fn single_pathway_direct_method() {
        let graph = direct_graph();
        let target = graph.node_id("density").unwrap();
        let derivations = enumerate_derivations(&graph, target);
        assert_eq!(derivations.len(), 1);
        let d = &derivations[0];
        assert_eq!(d.methods.len(), 1);
        assert_eq!(d.methods["density"], "direct");
        assert_eq!(d.fingerprint, "density:direct");
    }

    #[test]
    fn alternatives_multiply() {
        // Two methods for p1, two for p2 depending on p1: 4 pathways.
        let mut b = GraphBuilder::new();
        let s = b.param("snow_pit").unwrap();
        let a = b.param("a").unwrap();
        let p1 = b.param_leveled("p1", Level::Layer).unwrap();
        let p2 = b.param_leveled("p2", Level::Layer).unwrap();
        b.flow(s, a).unwrap();
        b.method(a, p1, "m1").unwrap();
        b.method(a, p1, "m2").unwrap();
        b.method(p1, p2, "f").unwrap();
        b.method(p1, p2, "g").unwrap();
        let graph = b.seal().unwrap();

        let derivations = enumerate_derivations(&graph, graph.node_id("p2").unwrap());
        assert_eq!(derivations.len(), 4);
        let fingerprints: BTreeSet<_> =
            derivations.iter().map(|d| d.fingerprint.clone()).collect();
        assert_eq!(fingerprints.len(), 4);
        assert!(fingerprints.contains("p1:m1->p2:f"));
        assert!(fingerprints.contains("p1:m2->p2:g"));
    }

    #[test]
    fn merge_requires_all_inputs() {
        // S -> A -> M; S -> B -> M; M -> T [f]: a single pathway whose tree
        // carries both merge branches.
        let mut b = GraphBuilder::new();
        let s = b.param("snow_pit").unwrap();
        let a = b.param("a").unwrap();
        let bb = b.param("b").unwrap();
        let m = b.merge("m").unwrap();
        let t = b.param_leveled("t", Level::Layer).unwrap();
        b.flow(s, a).unwrap();
        b.flow(s, bb).unwrap();
        b.flow(a, m).unwrap();
        b.flow(bb, m).unwrap();
        b.method(m, t, "f").unwrap();
        let graph = b.seal().unwrap();

        let derivations = enumerate_derivations(&graph, graph.node_id("t").unwrap());
        assert_eq!(derivations.len(), 1);
        let tree = &derivations[0].tree;
        // t has one chosen edge from the merge; the merge has two children.
        assert_eq!(tree.children.len(), 1);
        let (merge_tree, label) = &tree.children[0];
        assert_eq!(label.method(), Some("f"));
        assert_eq!(merge_tree.children.len(), 2);
    }

    /// Shared upstream parameter feeding two merge branches: the Cartesian
    /// product enumerates k^2 structurally distinct trees for k upstream
    /// methods, which must collapse to k fingerprints.
    #[test]
    fn fingerprint_dedup_collapses_shared_branches() {
        let mut b = GraphBuilder::new();
        let s = b.param("snow_pit").unwrap();
        let a = b.param("a").unwrap();
        let p1 = b.param_leveled("p1", Level::Layer).unwrap();
        let e = b.param_leveled("e", Level::Layer).unwrap();
        let nu = b.param_leveled("nu", Level::Layer).unwrap();
        let m = b.merge("merge_e_nu").unwrap();
        let p2 = b.param_leveled("p2", Level::Layer).unwrap();
        b.flow(s, a).unwrap();
        // Three alternative methods for the shared parameter.
        b.method(a, p1, "m1").unwrap();
        b.method(a, p1, "m2").unwrap();
        b.method(a, p1, "m3").unwrap();
        // Both e and nu derive from p1.
        b.method(p1, e, "fe").unwrap();
        b.method(p1, nu, "fn").unwrap();
        b.flow(e, m).unwrap();
        b.flow(nu, m).unwrap();
        b.method(m, p2, "g").unwrap();
        let graph = b.seal().unwrap();

        let derivations = enumerate_derivations(&graph, graph.node_id("p2").unwrap());
        // 3 choices for p1 via e x 3 via nu = 9 trees pre-dedup, 3 after.
        assert_eq!(derivations.len(), 3);
        let fingerprints: BTreeSet<_> =
            derivations.iter().map(|d| d.fingerprint.clone()).collect();
        assert_eq!(fingerprints.len(), 3);
        for d in &derivations {
            assert_eq!(d.methods["e"], "fe");
            assert_eq!(d.methods["nu"], "fn");
            assert_eq!(d.methods["p2"], "g");
            assert!(["m1", "m2", "m3"].contains(&d.methods["p1"].as_str()));
        }
    }

    #[test]
    fn data_flow_edges_do_not_enter_fingerprints() {
        // A leveled parameter reached purely by data flow records no method.
        let mut b = GraphBuilder::new();
        let s = b.param("snow_pit").unwrap();
        let raw = b.param("raw").unwrap();
        let p = b.param_leveled("p", Level::Layer).unwrap();
        let q = b.param_leveled("q", Level::Layer).unwrap();
        b.flow(s, raw).unwrap();
        b.flow(raw, p).unwrap();
        b.method(p, q, "m").unwrap();
        let graph = b.seal().unwrap();

        let derivations = enumerate_derivations(&graph, graph.node_id("q").unwrap());
        assert_eq!(derivations.len(), 1);
        assert_eq!(derivations[0].methods.len(), 1);
        assert_eq!(derivations[0].fingerprint, "q:m");
    }

    #[test]
    fn enumeration_is_deterministic() {
        let graph = direct_graph();
        let target = graph.node_id("density").unwrap();
        let first = enumerate_derivations(&graph, target);
        let second = enumerate_derivations(&graph, target);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.fingerprint, b.fingerprint);
            assert_eq!(a.methods, b.methods);
            assert_eq!(a.tree, b.tree);
        }
    }

    #[test]
    fn source_target_yields_trivial_derivation() {
        let graph = direct_graph();
        let derivations = enumerate_derivations(&graph, graph.source());
        assert_eq!(derivations.len(), 1);
        assert!(derivations[0].methods.is_empty());
    }

    #[test]
    fn leveled_dependencies_follow_subtrees() {
        let mut b = GraphBuilder::new();
        let s = b.param("snow_pit").unwrap();
        let a = b.param("a").unwrap();
        let p1 = b.param_leveled("p1", Level::Layer).unwrap();
        let p2 = b.param_leveled("p2", Level::Layer).unwrap();
        b.flow(s, a).unwrap();
        b.method(a, p1, "m").unwrap();
        b.method(p1, p2, "f").unwrap();
        let graph = b.seal().unwrap();

        let derivations = enumerate_derivations(&graph, graph.node_id("p2").unwrap());
        let deps = leveled_dependencies(&graph, &derivations[0].tree);
        assert!(deps["p1"].is_empty());
        assert_eq!(deps["p2"].iter().collect::<Vec<_>>(), ["p1"]);
    }
}
