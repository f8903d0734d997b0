use std::collections::HashMap;

use crate::model::ConstructId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    CronbachsAlpha,
    CompositeReliability,
    AverageVarianceExtracted,
}

impl MetricKind {
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::CronbachsAlpha => "cronbachs_alpha",
            MetricKind::CompositeReliability => "composite_reliability",
            MetricKind::AverageVarianceExtracted => "ave",
        }
    }
}

/// Latest full-precision value per (construct, metric).
#[derive(Debug, Clone, Default)]
pub struct MetricCache {
    entries: HashMap<(ConstructId, MetricKind), f64>,
}

impl MetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value unless `edited` is set or nothing is cached,
    /// in which case `compute` runs and its value replaces the entry. A failed
    /// recomputation drops the entry, so a stale value is never served later.
    pub fn get_or_compute<E>(
        &mut self,
        construct: ConstructId,
        kind: MetricKind,
        edited: bool,
        compute: impl FnOnce() -> Result<f64, E>,
    ) -> Result<f64, E> {
        let key = (construct, kind);
        if !edited {
            if let Some(&value) = self.entries.get(&key) {
                tracing::debug!(construct = construct.0, metric = kind.label(), "cache hit");
                return Ok(value);
            }
        }
        let value = match compute() {
            Ok(value) => value,
            Err(err) => {
                if self.entries.remove(&key).is_some() {
                    tracing::debug!(construct = construct.0, metric = kind.label(), "dropped stale entry");
                }
                return Err(err);
            }
        };
        tracing::debug!(construct = construct.0, metric = kind.label(), value, "recomputed");
        self.entries.insert(key, value);
        Ok(value)
    }

    #[cfg(test)]
    pub fn get(&self, construct: ConstructId, kind: MetricKind) -> Option<f64> {
        self.entries.get(&(construct, kind)).copied()
    }

    pub fn retain_constructs(&mut self, keep: &[ConstructId]) {
        self.entries.retain(|(id, _), _| keep.contains(id));
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/cache.rs"]
mod tests;
