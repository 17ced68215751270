//! Statistical reduction of latency samples and report types
//!
//! The reducer is a pure function: a non-empty sample of integer millisecond
//! durations goes in, a [`StepReport`] with min/max/avg and a configurable
//! percentile distribution comes out.
//!
//! Percentile method: linear interpolation over the sorted sample at index
//! `p/100 * (n - 1)`, rounded half-up to integer milliseconds. This is the
//! single method used for every rank; nearest-rank is deliberately not offered
//! so that reports stay comparable across runs.

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default percentile rank set used when the run configuration does not
/// override it
pub const DEFAULT_PERCENTILE_RANKS: [u8; 8] = [50, 66, 75, 80, 90, 95, 98, 99];

/// Summary statistics for one resource step
///
/// All values are integer milliseconds. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Minimum observed duration
    pub min: u64,
    /// Maximum observed duration
    pub max: u64,
    /// Mean duration, computed over the unrounded sum and rounded once
    pub avg: u64,
    /// Percentile rank -> value, ascending by rank
    pub percentiles: BTreeMap<u8, u64>,
}

/// Validate a percentile rank set ahead of any computation
///
/// Ranks must be unique and in `1..=100`. An invalid set is a configuration
/// error, not a runtime fault, and is rejected before any invocation runs.
pub fn validate_ranks(ranks: &[u8]) -> Result<()> {
    if ranks.is_empty() {
        return Err(Error::Config("percentile rank set is empty".into()));
    }
    let mut seen = [false; 101];
    for &p in ranks {
        if p == 0 || p > 100 {
            return Err(Error::Config(format!(
                "percentile rank {p} out of range (expected 1..=100)"
            )));
        }
        if seen[p as usize] {
            return Err(Error::Config(format!("duplicate percentile rank {p}")));
        }
        seen[p as usize] = true;
    }
    Ok(())
}

/// Reduce a non-empty sample set into a [`StepReport`]
///
/// # Errors
/// `Error::Config` for an invalid rank set, `Error::EmptySampleSet` if
/// `samples` is empty.
pub fn reduce(samples: &[u64], ranks: &[u8]) -> Result<StepReport> {
    validate_ranks(ranks)?;
    if samples.is_empty() {
        return Err(Error::EmptySampleSet);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let sum: u128 = sorted.iter().map(|&v| v as u128).sum();
    let avg = round_half_up(sum as f64 / sorted.len() as f64);

    let mut percentiles = BTreeMap::new();
    for &p in ranks {
        percentiles.insert(p, percentile(&sorted, p));
    }

    Ok(StepReport {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        avg,
        percentiles,
    })
}

/// Interpolated percentile over a sorted sample, rounded to integer ms
fn percentile(sorted: &[u64], rank: u8) -> u64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = rank as f64 / 100.0 * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if upper >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    round_half_up(sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac)
}

/// Round-half-up to the nearest integer millisecond
///
/// `f64::round` rounds half away from zero, which is half-up for the
/// non-negative durations handled here.
fn round_half_up(value: f64) -> u64 {
    value.round() as u64
}

/// One completed step of the sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEntry {
    /// Resource step value (memory size in MB) the cycle ran under
    pub memory_mb: u64,
    /// Reduced statistics for the cycle
    pub report: StepReport,
}

/// Full sweep report, iteration order = sweep order
///
/// Built incrementally by the sweep controller, one entry per completed step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    entries: Vec<StepEntry>,
}

impl RunReport {
    /// Append a completed step
    pub fn push(&mut self, memory_mb: u64, report: StepReport) {
        self.entries.push(StepEntry { memory_mb, report });
    }

    /// Look up the report for a step value (first occurrence in sweep order)
    pub fn get(&self, memory_mb: u64) -> Option<&StepReport> {
        self.entries
            .iter()
            .find(|e| e.memory_mb == memory_mb)
            .map(|e| &e.report)
    }

    /// Iterate entries in sweep order
    pub fn iter(&self) -> impl Iterator<Item = &StepEntry> {
        self.entries.iter()
    }

    /// Number of completed steps
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no step has completed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the lowest average latency, if any
    ///
    /// The usual starting point when picking a cost/performance tradeoff
    /// from the profile.
    pub fn fastest(&self) -> Option<&StepEntry> {
        self.entries.iter().min_by_key(|e| e.report.avg)
    }
}

impl<'a> IntoIterator for &'a RunReport {
    type Item = &'a StepEntry;
    type IntoIter = std::slice::Iter<'a, StepEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
