//! Input records: layers and slabs.
//!
//! A [`Layer`] holds raw measured fields (scalars with uncertainty, or
//! categorical codes) plus computed parameter slots that start empty and are
//! written at most once per pathway execution. A [`Slab`] is an ordered list
//! of layers from the surface down, plus slab-level raw fields and computed
//! slots.
//!
//! Layers inside a slab are held behind `Arc` so a pathway's result slab can
//! share every layer it did not modify with the input slab (copy-on-write):
//! the input record is never mutated by execution.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::uncertain::UncertainValue;

/// A raw measured field on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// A numeric measurement, with uncertainty where known.
    Scalar(UncertainValue),
    /// A categorical code (e.g. a grain-form classification).
    Code(String),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<UncertainValue> {
        match self {
            FieldValue::Scalar(v) => Some(*v),
            FieldValue::Code(_) => None,
        }
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::Code(c) => Some(c),
        }
    }
}

/// One layer of a slab: raw measured fields plus computed parameter slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    raw: BTreeMap<String, FieldValue>,
    computed: BTreeMap<String, UncertainValue>,
}

impl Layer {
    pub fn new() -> Self {
        Layer::default()
    }

    /// Builder-style: attach a scalar raw field.
    pub fn with_scalar(mut self, name: impl Into<String>, mean: f64, std_dev: f64) -> Self {
        self.raw.insert(
            name.into(),
            FieldValue::Scalar(UncertainValue::new(mean, std_dev)),
        );
        self
    }

    /// Builder-style: attach a scalar raw field from an existing value.
    pub fn with_value(mut self, name: impl Into<String>, value: UncertainValue) -> Self {
        self.raw.insert(name.into(), FieldValue::Scalar(value));
        self
    }

    /// Builder-style: attach a categorical raw field.
    pub fn with_code(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.raw.insert(name.into(), FieldValue::Code(code.into()));
        self
    }

    pub fn raw(&self, name: &str) -> Option<&FieldValue> {
        self.raw.get(name)
    }

    pub fn raw_scalar(&self, name: &str) -> Option<UncertainValue> {
        self.raw.get(name).and_then(FieldValue::as_scalar)
    }

    pub fn raw_code(&self, name: &str) -> Option<&str> {
        self.raw.get(name).and_then(FieldValue::as_code)
    }

    /// A computed parameter slot, if filled.
    pub fn computed(&self, name: &str) -> Option<UncertainValue> {
        self.computed.get(name).copied()
    }

    pub fn set_computed(&mut self, name: impl Into<String>, value: UncertainValue) {
        self.computed.insert(name.into(), value);
    }

    pub fn computed_slots(&self) -> &BTreeMap<String, UncertainValue> {
        &self.computed
    }

    pub fn raw_fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.raw
    }
}

/// An ordered stack of layers plus slab-level fields and computed slots.
///
/// Layers are indexed 0..N-1 from the surface down. The empty slab is legal;
/// layer-level executions over it simply produce no traces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    layers: Vec<Arc<Layer>>,
    raw: BTreeMap<String, FieldValue>,
    computed: BTreeMap<String, UncertainValue>,
}

impl Slab {
    pub fn new(layers: Vec<Layer>) -> Self {
        Slab {
            layers: layers.into_iter().map(Arc::new).collect(),
            raw: BTreeMap::new(),
            computed: BTreeMap::new(),
        }
    }

    /// Builder-style: attach a slab-level scalar raw field (e.g. slope angle).
    pub fn with_scalar(mut self, name: impl Into<String>, mean: f64, std_dev: f64) -> Self {
        self.raw.insert(
            name.into(),
            FieldValue::Scalar(UncertainValue::new(mean, std_dev)),
        );
        self
    }

    /// Builder-style: attach a slab-level categorical raw field.
    pub fn with_code(mut self, name: impl Into<String>, code: impl Into<String>) -> Self {
        self.raw.insert(name.into(), FieldValue::Code(code.into()));
        self
    }

    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Replaces one layer with a modified copy. Used by the executor to
    /// install a written-to working layer under the copy-on-write rule.
    pub fn replace_layer(&mut self, index: usize, layer: Layer) {
        if index < self.layers.len() {
            self.layers[index] = Arc::new(layer);
        }
    }

    /// True if this slab and `other` share the same allocation for layer
    /// `index` (i.e. the layer was not copied).
    pub fn shares_layer_with(&self, other: &Slab, index: usize) -> bool {
        match (self.layers.get(index), other.layers.get(index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn raw(&self, name: &str) -> Option<&FieldValue> {
        self.raw.get(name)
    }

    pub fn raw_scalar(&self, name: &str) -> Option<UncertainValue> {
        self.raw.get(name).and_then(FieldValue::as_scalar)
    }

    pub fn raw_code(&self, name: &str) -> Option<&str> {
        self.raw.get(name).and_then(FieldValue::as_code)
    }

    /// A slab-level computed parameter slot, if filled.
    pub fn computed(&self, name: &str) -> Option<UncertainValue> {
        self.computed.get(name).copied()
    }

    pub fn set_computed(&mut self, name: impl Into<String>, value: UncertainValue) {
        self.computed.insert(name.into(), value);
    }

    pub fn computed_slots(&self) -> &BTreeMap<String, UncertainValue> {
        &self.computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layer() -> Layer {
        Layer::new()
            .with_scalar("thickness", 30.0, 1.5)
            .with_scalar("density_measured", 250.0, 12.5)
            .with_code("grain_form", "RGmx")
            .with_code("hand_hardness", "4F")
    }

    #[test]
    fn raw_field_accessors() {
        let layer = sample_layer();
        assert_eq!(layer.raw_scalar("thickness").unwrap().mean, 30.0);
        assert_eq!(layer.raw_code("grain_form"), Some("RGmx"));
        assert_eq!(layer.raw_scalar("grain_form"), None);
        assert_eq!(layer.raw_code("thickness"), None);
        assert_eq!(layer.raw("missing"), None);
    }

    #[test]
    fn computed_slots_start_empty() {
        let mut layer = sample_layer();
        assert_eq!(layer.computed("density"), None);
        layer.set_computed("density", UncertainValue::new(250.0, 10.0));
        assert_eq!(layer.computed("density").unwrap().mean, 250.0);
    }

    #[test]
    fn slab_indexing() {
        let slab = Slab::new(vec![sample_layer(), Layer::new()]);
        assert_eq!(slab.len(), 2);
        assert!(slab.layer(0).unwrap().raw_code("grain_form").is_some());
        assert!(slab.layer(2).is_none());
    }

    #[test]
    fn empty_slab_is_legal() {
        let slab = Slab::new(vec![]);
        assert!(slab.is_empty());
        assert_eq!(slab.len(), 0);
    }

    #[test]
    fn clone_shares_layers_until_replace() {
        let slab = Slab::new(vec![sample_layer(), sample_layer()]);
        let mut copy = slab.clone();
        assert!(copy.shares_layer_with(&slab, 0));
        assert!(copy.shares_layer_with(&slab, 1));

        let mut modified = slab.layer(0).unwrap().clone();
        modified.set_computed("density", UncertainValue::exact(200.0));
        copy.replace_layer(0, modified);

        assert!(!copy.shares_layer_with(&slab, 0));
        assert!(copy.shares_layer_with(&slab, 1));
        // The original is untouched.
        assert_eq!(slab.layer(0).unwrap().computed("density"), None);
    }

    #[test]
    fn slab_level_fields() {
        let mut slab = Slab::new(vec![sample_layer()]).with_scalar("slope_angle", 35.0, 2.0);
        assert_eq!(slab.raw_scalar("slope_angle").unwrap().mean, 35.0);
        assert_eq!(slab.computed("A11"), None);
        slab.set_computed("A11", UncertainValue::new(1200.0, 80.0));
        assert_eq!(slab.computed("A11").unwrap().mean, 1200.0);
    }

    #[test]
    fn serde_roundtrip() {
        let slab = Slab::new(vec![sample_layer()]).with_scalar("slope_angle", 35.0, 2.0);
        let json = serde_json::to_string(&slab).unwrap();
        let back: Slab = serde_json::from_str(&json).unwrap();
        assert_eq!(slab, back);
    }
}
