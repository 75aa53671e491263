use std::io::BufRead;

use indicatif::ProgressBar;
use log::{info, warn};

use crate::config::AbundanceConfig;
use crate::consts::{PROGRESS_LOG_INTERVAL, SPINNER_UPDATE_INTERVAL};
use crate::errors::{AbundanceError, Result};
use crate::record::AlignmentRecord;
use crate::registry::FeatureRegistry;

///
/// Running totals of one sample, one slot per registry feature.
///
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCounters {
    raw_reads: Vec<u64>,
    norm_reads: Vec<f64>,
    raw_bases: Vec<u64>,
    norm_bases: Vec<f64>,
}

impl FeatureCounters {
    pub fn new(n_features: usize) -> Self {
        FeatureCounters {
            raw_reads: vec![0; n_features],
            norm_reads: vec![0.0; n_features],
            raw_bases: vec![0; n_features],
            norm_bases: vec![0.0; n_features],
        }
    }

    ///
    /// Count one read against the feature at `position`.
    ///
    /// With a length normalisation constant the normalised counters grow by
    /// `constant / length` per read and `base_mapped * constant / length` per base;
    /// without one they grow like the raw counters. `length` must not be zero when
    /// a constant is given.
    ///
    pub fn add(
        &mut self,
        position: usize,
        length: u64,
        base_mapped: u64,
        length_normalisation: Option<f64>,
    ) {
        self.raw_reads[position] += 1;
        self.raw_bases[position] += base_mapped;
        match length_normalisation {
            Some(constant) => {
                let length = length as f64;
                self.norm_reads[position] += (1.0 / length) * constant;
                self.norm_bases[position] += (base_mapped as f64 / length) * constant;
            }
            None => {
                self.norm_reads[position] += 1.0;
                self.norm_bases[position] += base_mapped as f64;
            }
        }
    }

    pub fn raw_reads(&self) -> &[u64] {
        &self.raw_reads
    }

    pub fn norm_reads(&self) -> &[f64] {
        &self.norm_reads
    }

    pub fn raw_bases(&self) -> &[u64] {
        &self.raw_bases
    }

    pub fn norm_bases(&self) -> &[f64] {
        &self.norm_bases
    }

    pub fn len(&self) -> usize {
        self.raw_reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_reads.is_empty()
    }
}

/// Record tallies of one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSummary {
    pub records: u64,
    pub counted: u64,
    pub below_identity: u64,
    pub degenerate: u64,
}

/// Filters and constants applied while counting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountingOptions {
    /// minimum `matched bases / read length`
    pub identity_cutoff: f64,
    pub length_normalisation: Option<f64>,
}

impl From<&AbundanceConfig> for CountingOptions {
    fn from(config: &AbundanceConfig) -> Self {
        CountingOptions {
            identity_cutoff: config.identity_fraction(),
            length_normalisation: config.length_normalisation(),
        }
    }
}

///
/// Count the alignment records of one sample against the registry.
///
/// # Arguments
/// - records: the sample's record lines, `@` header lines are skipped
/// - sample: sample name, used in diagnostics
/// - registry: the features to count against
/// - options: identity cutoff and length normalisation
/// - spinner: progress display, may be hidden
///
/// # Returns
/// A fresh set of counters for the sample and its record tallies.
///
pub fn count_sample_records<R: BufRead>(
    records: R,
    sample: &str,
    registry: &FeatureRegistry,
    options: &CountingOptions,
    spinner: &ProgressBar,
) -> Result<(FeatureCounters, SampleSummary)> {
    let mut counters = FeatureCounters::new(registry.len());
    let mut summary = SampleSummary::default();

    for (index, line) in records.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('@') {
            continue;
        }

        summary.records += 1;
        if summary.records % PROGRESS_LOG_INTERVAL == 0 {
            info!("Alignment record {} processed", summary.records);
        }
        if summary.records % SPINNER_UPDATE_INTERVAL == 0 {
            spinner.set_message(format!("{}: processed {} records", sample, summary.records));
        }
        spinner.inc(1);

        let malformed =
            |reason: String| AbundanceError::malformed(sample, index + 1, &line, reason);

        let record = AlignmentRecord::parse(&line).map_err(malformed)?;
        let position =
            registry
                .position(record.target)
                .ok_or_else(|| AbundanceError::UnknownFeature {
                    sample: sample.to_string(),
                    feature: registry.resolve(record.target).to_string(),
                    record: summary.records,
                })?;
        let base_mapped = record
            .matched_bases()
            .map_err(|reason| AbundanceError::malformed(sample, index + 1, &line, reason))?;

        if record.read_len == 0 {
            warn!(
                "Sample '{}', record {}: empty read, record skipped: {:?}",
                sample, summary.records, line
            );
            summary.degenerate += 1;
            continue;
        }

        let identity = base_mapped as f64 / record.read_len as f64;
        if identity < options.identity_cutoff {
            summary.below_identity += 1;
            continue;
        }

        let length = registry.length(position);
        if length == 0 && options.length_normalisation.is_some() {
            return Err(AbundanceError::ZeroLengthFeature(
                registry.features()[position].clone(),
            ));
        }

        counters.add(position, length, base_mapped, options.length_normalisation);
        summary.counted += 1;
    }

    Ok((counters, summary))
}
