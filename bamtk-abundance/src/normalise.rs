use crate::config::{AbundanceConfig, LibrarySizeSource};
use crate::consts::TPM_SCALE;
use crate::counting::FeatureCounters;
use crate::manifest::LibrarySize;

/// Constants and switches that drive the per-sample normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalisationOptions {
    /// features per this many reads, 1e6 by default
    pub feature_normalisation: f64,
    pub library_size_source: LibrarySizeSource,
    pub discard_library_size: bool,
}

impl From<&AbundanceConfig> for NormalisationOptions {
    fn from(config: &AbundanceConfig) -> Self {
        NormalisationOptions {
            feature_normalisation: config.feature_normalisation,
            library_size_source: config.library_size_normalisation,
            discard_library_size: config.discard_library_size_normalisation,
        }
    }
}

///
/// Every per-feature view of one sample.
///
#[derive(Debug, Clone, PartialEq)]
pub struct SampleAbundance {
    pub raw_reads: Vec<f64>,
    pub tpm: Vec<f64>,
    pub normalised_reads: Vec<f64>,
    pub relative_reads: Vec<f64>,
    pub raw_bases: Vec<f64>,
    pub normalised_bases: Vec<f64>,
    pub relative_bases: Vec<f64>,
    /// denominator used for the normalised views
    pub library_size: f64,
}

///
/// Pick the denominator of the library size normalisation.
///
/// The aligned source always uses the total length-normalised read mass of the
/// sample, discarded or not. With the manifest source a discarded normalisation
/// divides by one, and a manifest without a usable size falls back to the aligned
/// mass. The aligned mass falls back to one when no read was counted.
///
pub fn resolve_library_size(
    declared: LibrarySize,
    norm_reads: &[f64],
    options: &NormalisationOptions,
) -> f64 {
    let aligned = || {
        let total: f64 = norm_reads.iter().sum();
        if total == 0.0 { 1.0 } else { total }
    };
    match (options.library_size_source, declared) {
        (LibrarySizeSource::Aligned, _) => aligned(),
        (LibrarySizeSource::Total, _) if options.discard_library_size => 1.0,
        (LibrarySizeSource::Total, LibrarySize::Total(size)) => size as f64,
        (LibrarySizeSource::Total, LibrarySize::Unknown) => aligned(),
    }
}

/// `values[f] * scale / Σ values`, or the values untouched when they sum to zero.
fn scale_by_total(values: &[f64], scale: f64) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return values.to_vec();
    }
    values.iter().map(|v| v * scale / total).collect()
}

fn per_library(values: &[f64], library_size: f64, feature_normalisation: f64) -> Vec<f64> {
    values
        .iter()
        .map(|v| (v / library_size) * feature_normalisation)
        .collect()
}

///
/// Derive the normalised views of a sample from its counters.
///
/// # Arguments
/// - counters: the sample's counters after the full stream pass
/// - declared: library size from the manifest
/// - options: normalisation constants
///
pub fn normalise_sample(
    counters: &FeatureCounters,
    declared: LibrarySize,
    options: &NormalisationOptions,
) -> SampleAbundance {
    let norm_reads = counters.norm_reads();
    let norm_bases = counters.norm_bases();
    let library_size = resolve_library_size(declared, norm_reads, options);

    SampleAbundance {
        raw_reads: counters.raw_reads().iter().map(|&v| v as f64).collect(),
        tpm: scale_by_total(norm_reads, TPM_SCALE),
        normalised_reads: per_library(norm_reads, library_size, options.feature_normalisation),
        relative_reads: scale_by_total(norm_reads, 1.0),
        raw_bases: counters.raw_bases().iter().map(|&v| v as f64).collect(),
        normalised_bases: per_library(norm_bases, library_size, options.feature_normalisation),
        relative_bases: scale_by_total(norm_bases, 1.0),
        library_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn options() -> NormalisationOptions {
        NormalisationOptions {
            feature_normalisation: 1_000_000.0,
            library_size_source: LibrarySizeSource::Total,
            discard_library_size: false,
        }
    }

    #[fixture]
    fn counters() -> FeatureCounters {
        let mut counters = FeatureCounters::new(3);
        // chrA 1000 bp: three full reads, chrB 500 bp: one half-matched read
        for _ in 0..3 {
            counters.add(0, 1000, 100, Some(1000.0));
        }
        counters.add(1, 500, 50, Some(1000.0));
        counters
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    #[rstest]
    #[case(LibrarySizeSource::Total, LibrarySize::Total(2000), false, 2000.0)]
    #[case(LibrarySizeSource::Total, LibrarySize::Unknown, false, 5.0)]
    #[case(LibrarySizeSource::Aligned, LibrarySize::Total(2000), false, 5.0)]
    #[case(LibrarySizeSource::Aligned, LibrarySize::Total(2000), true, 5.0)]
    #[case(LibrarySizeSource::Total, LibrarySize::Total(2000), true, 1.0)]
    #[case(LibrarySizeSource::Total, LibrarySize::Unknown, true, 1.0)]
    fn test_resolve_library_size(
        counters: FeatureCounters,
        #[case] source: LibrarySizeSource,
        #[case] declared: LibrarySize,
        #[case] discard: bool,
        #[case] expected: f64,
    ) {
        let options = NormalisationOptions {
            feature_normalisation: 1_000_000.0,
            library_size_source: source,
            discard_library_size: discard,
        };
        let size = resolve_library_size(declared, counters.norm_reads(), &options);
        assert!((size - expected).abs() < 1e-9);
    }

    #[rstest]
    fn test_resolve_library_size_empty_sample(options: NormalisationOptions) {
        let counters = FeatureCounters::new(2);
        let size = resolve_library_size(LibrarySize::Unknown, counters.norm_reads(), &options);
        assert_eq!(size, 1.0);
    }

    #[rstest]
    fn test_aligned_source_ignores_discard() {
        let mut counters = FeatureCounters::new(1);
        counters.add(0, 1000, 100, Some(1000.0));
        counters.add(0, 1000, 100, Some(1000.0));
        let options = NormalisationOptions {
            feature_normalisation: 1_000_000.0,
            library_size_source: LibrarySizeSource::Aligned,
            discard_library_size: true,
        };

        let abundance = normalise_sample(&counters, LibrarySize::Total(5000), &options);
        assert_eq!(abundance.library_size, 2.0);
        assert_close(&abundance.normalised_reads, &[1_000_000.0]);
    }

    #[rstest]
    fn test_normalise_sample(counters: FeatureCounters, options: NormalisationOptions) {
        let abundance = normalise_sample(&counters, LibrarySize::Total(2000), &options);

        // norm_reads = [3, 2], norm_bases = [300, 100]
        assert_eq!(abundance.raw_reads, vec![3.0, 1.0, 0.0]);
        assert_eq!(abundance.raw_bases, vec![300.0, 50.0, 0.0]);
        assert_close(&abundance.tpm, &[600_000.0, 400_000.0, 0.0]);
        assert_close(&abundance.normalised_reads, &[1500.0, 1000.0, 0.0]);
        assert_close(&abundance.relative_reads, &[0.6, 0.4, 0.0]);
        assert_close(&abundance.normalised_bases, &[150_000.0, 50_000.0, 0.0]);
        assert_close(&abundance.relative_bases, &[0.75, 0.25, 0.0]);
        assert_eq!(abundance.library_size, 2000.0);
    }

    #[rstest]
    fn test_relative_views_sum_to_one(counters: FeatureCounters, options: NormalisationOptions) {
        let abundance = normalise_sample(&counters, LibrarySize::Unknown, &options);
        let reads: f64 = abundance.relative_reads.iter().sum();
        let bases: f64 = abundance.relative_bases.iter().sum();
        assert!((reads - 1.0).abs() < 1e-12);
        assert!((bases - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_empty_sample_never_divides_by_zero(options: NormalisationOptions) {
        let counters = FeatureCounters::new(2);
        let abundance = normalise_sample(&counters, LibrarySize::Unknown, &options);

        for view in [
            &abundance.tpm,
            &abundance.normalised_reads,
            &abundance.relative_reads,
            &abundance.normalised_bases,
            &abundance.relative_bases,
        ] {
            assert_eq!(view, &vec![0.0, 0.0]);
        }
        assert_eq!(abundance.library_size, 1.0);
    }
}
