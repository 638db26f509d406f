use std::collections::BTreeMap;

use crate::ir::DatedTree;

pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Linear mapping from `[0, max]` onto a stroke-width range, clamped at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl AttributeScale {
    pub fn new(max_value: f64, range: [f64; 2]) -> Self {
        Self {
            domain: [0.0, max_value],
            range,
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span.is_nan() || span <= 0.0 || value.is_nan() {
            return r0;
        }
        let t = ((value - d0) / span).clamp(0.0, 1.0);
        r0 + (r1 - r0) * t
    }
}

/// One scale per edge attribute key, computed once over the whole time series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeScales {
    scales: BTreeMap<String, AttributeScale>,
}

impl EdgeScales {
    pub fn from_dated_trees(trees: &[DatedTree], range: [f64; 2]) -> Self {
        let mut pooled: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for dated in trees {
            dated.tree.walk(&mut |node| {
                for (key, values) in &node.edge_data {
                    pooled
                        .entry(key.as_str())
                        .or_default()
                        .extend(values.iter().flatten().copied());
                }
            });
        }

        let scales = pooled
            .into_iter()
            .map(|(key, values)| {
                let max_value = values.into_iter().fold(0.0_f64, f64::max);
                (key.to_string(), AttributeScale::new(max_value, range))
            })
            .collect();
        Self { scales }
    }

    pub fn get(&self, key: &str) -> Option<&AttributeScale> {
        self.scales.get(key)
    }

    /// Stroke width for `value` under `key`; keys without observed values get the default width.
    pub fn width(&self, key: &str, value: f64) -> f64 {
        self.scales
            .get(key)
            .map(|scale| scale.apply(value))
            .unwrap_or(DEFAULT_STROKE_WIDTH)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scales.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}
