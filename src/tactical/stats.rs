//! Running statistics for check latency and execution time.

use serde::Serialize;
use tdigests::TDigest;

/// One series of samples (e.g. active service check latency).
#[derive(Debug, Clone, Default)]
pub struct StatSeries {
    count: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
    samples: Vec<f64>,
}

impl StatSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.samples.push(value);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest sample, 0.0 when nothing was recorded.
    pub fn min(&self) -> f64 {
        self.min.unwrap_or(0.0)
    }

    /// Largest sample, 0.0 when nothing was recorded.
    pub fn max(&self) -> f64 {
        self.max.unwrap_or(0.0)
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Estimated quantile `q` in `[0, 1]`, 0.0 when nothing was recorded.
    pub fn percentile(&self, q: f64) -> f64 {
        match self.digest() {
            Some(td) => td.estimate_quantile(q),
            None => 0.0,
        }
    }

    fn digest(&self) -> Option<TDigest> {
        if self.samples.is_empty() {
            return None;
        }
        let mut values = self.samples.clone();
        values.sort_by(f64::total_cmp);
        let mut td = TDigest::from_values(values);
        td.compress(100);
        Some(td)
    }

    pub fn summary(&self) -> SeriesSummary {
        let (p50, p95) = match self.digest() {
            Some(td) => (td.estimate_quantile(0.5), td.estimate_quantile(0.95)),
            None => (0.0, 0.0),
        };

        SeriesSummary {
            samples: self.count,
            min: self.min(),
            max: self.max(),
            average: self.average(),
            p50,
            p95,
        }
    }
}

/// Serializable view of a [`StatSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub samples: u64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub p50: f64,
    pub p95: f64,
}
