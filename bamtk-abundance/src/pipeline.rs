use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::annotation::{AnnotationCatalog, AnnotationRollup, FeatureAnnotationMap};
use crate::config::AbundanceConfig;
use crate::counting::{CountingOptions, SampleSummary, count_sample_records};
use crate::errors::Result;
use crate::manifest::SampleManifest;
use crate::matrix::{FeatureMatrix, MatrixKind, annotation_outputs, feature_outputs};
use crate::normalise::{NormalisationOptions, SampleAbundance, normalise_sample};
use crate::registry::{FeatureRegistry, GroupingMode};
use crate::source::RecordSource;
use crate::utils::{ensure_dir_exists, ensure_files_exist, prepare_output_dir};

/// What a feature abundance run went through.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRun {
    pub features: usize,
    pub samples: Vec<(String, SampleSummary)>,
}

fn record_spinner(progress: bool) -> Result<ProgressBar> {
    if !progress {
        return Ok(ProgressBar::hidden());
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg} ({per_sec})")?
            .tick_strings(&["-", "\\", "|", "/"]),
    );
    Ok(spinner)
}

///
/// Count every sample of a manifest against the features of an index and write
/// the feature level matrices.
///
/// # Arguments
/// - index: feature index (faidx), plain or gzipped
/// - manifest: sample manifest
/// - output_dir: where the matrices go, created when missing
/// - config: run configuration
/// - source: producer of the alignment records of each sample
/// - progress: show a spinner while records are consumed
///
pub fn feature_abundance(
    index: &Path,
    manifest: &Path,
    output_dir: &Path,
    config: &AbundanceConfig,
    source: &impl RecordSource,
    progress: bool,
) -> Result<FeatureRun> {
    ensure_files_exist(&[index, manifest])?;
    prepare_output_dir(output_dir, &feature_outputs(), config.force_overwrite)?;

    info!("Loading features from {}", index.display());
    let grouping = GroupingMode::from_config(config, index);
    let registry = FeatureRegistry::from_index(index, grouping)?;
    let manifest = SampleManifest::from_file(manifest, &config.extension)?;
    info!("{} samples to process", manifest.len());

    let counting = CountingOptions::from(config);
    let normalisation = NormalisationOptions::from(config);
    let spinner = record_spinner(progress)?;

    let mut abundances: Vec<SampleAbundance> = Vec::with_capacity(manifest.len());
    let mut summaries = Vec::with_capacity(manifest.len());
    for sample in manifest.samples() {
        info!("Processing sample {} ({})", sample.name, sample.source);
        spinner.set_message(format!("{}: reading records", sample.name));

        let mut stream = source.open(&sample.source)?;
        let (counters, summary) =
            count_sample_records(&mut stream, &sample.name, &registry, &counting, &spinner)?;
        stream.finish()?;

        let abundance = normalise_sample(&counters, sample.library_size, &normalisation);
        info!(
            "{}: {} records, {} counted, {} below the identity cutoff, {} skipped, library size {}",
            sample.name,
            summary.records,
            summary.counted,
            summary.below_identity,
            summary.degenerate,
            abundance.library_size
        );
        abundances.push(abundance);
        summaries.push((sample.name.clone(), summary));
    }
    spinner.finish_and_clear();

    let samples = manifest.names();
    for kind in MatrixKind::ALL {
        let matrix = FeatureMatrix::from_samples(kind, &registry, &samples, &abundances)?;
        info!("Writing {} matrix", kind.label());
        matrix.write_to_file(&output_dir.join(kind.features_file()), config.removed)?;
    }
    info!("Feature matrices written to {}", output_dir.display());

    Ok(FeatureRun {
        features: registry.len(),
        samples: summaries,
    })
}

///
/// Roll the feature matrices of a directory up to annotations. The annotation
/// matrices are written next to the feature matrices.
///
/// # Arguments
/// - features_dir: directory holding the feature level matrices
/// - mapping: feature id to annotation id table
/// - description: annotation id to description table, gives the row order
/// - config: run configuration (`removed`, `force_overwrite`)
///
pub fn annotate_features(
    features_dir: &Path,
    mapping: &Path,
    description: &Path,
    config: &AbundanceConfig,
) -> Result<()> {
    ensure_dir_exists(features_dir)?;
    let inputs: Vec<_> = MatrixKind::ANNOTATABLE
        .iter()
        .map(|kind| features_dir.join(kind.features_file()))
        .collect();
    let mut required: Vec<&Path> = vec![mapping, description];
    required.extend(inputs.iter().map(|p| p.as_path()));
    ensure_files_exist(&required)?;
    prepare_output_dir(features_dir, &annotation_outputs(), config.force_overwrite)?;

    let mapping = FeatureAnnotationMap::from_file(mapping)?;
    let catalog = AnnotationCatalog::from_file(description)?;
    let mut rollup = AnnotationRollup::new(&mapping, &catalog);

    for (kind, input) in MatrixKind::ANNOTATABLE.iter().zip(&inputs) {
        let Some(output) = kind.annotation_file() else {
            continue;
        };
        let features = FeatureMatrix::from_file(input)?;
        let annotations = rollup.roll_up(&features)?;
        info!("Writing {} annotation matrix", kind.label());
        annotations.write_to_file(&features_dir.join(output), config.removed)?;
    }

    if rollup.missing_features() > 0 {
        info!(
            "{} features without annotation mapping were left out",
            rollup.missing_features()
        );
    }
    info!("Annotation matrices written to {}", features_dir.display());
    Ok(())
}

///
/// Feature abundance followed by the annotation rollup of its output.
///
#[allow(clippy::too_many_arguments)]
pub fn workflow(
    index: &Path,
    manifest: &Path,
    mapping: &Path,
    description: &Path,
    output_dir: &Path,
    config: &AbundanceConfig,
    source: &impl RecordSource,
    progress: bool,
) -> Result<FeatureRun> {
    // every input is checked before the first matrix is written
    ensure_files_exist(&[index, manifest, mapping, description])?;
    let mut outputs = feature_outputs();
    outputs.extend(annotation_outputs());
    prepare_output_dir(output_dir, &outputs, config.force_overwrite)?;

    let run = feature_abundance(index, manifest, output_dir, config, source, progress)?;
    annotate_features(output_dir, mapping, description, config)?;
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    use crate::errors::AbundanceError;
    use crate::source::InMemorySource;

    #[rstest]
    fn test_missing_index_is_checked_first() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let result = feature_abundance(
            &dir.path().join("absent.fai"),
            &dir.path().join("absent.tsv"),
            &out,
            &AbundanceConfig::default(),
            &InMemorySource::new(),
            false,
        );

        assert!(matches!(result, Err(AbundanceError::MissingInputFile(_))));
        assert!(!out.exists());
    }

    #[rstest]
    fn test_annotate_requires_features_dir() {
        let dir = tempdir().unwrap();
        let result = annotate_features(
            &dir.path().join("nope"),
            &dir.path().join("map.tsv"),
            &dir.path().join("desc.tsv"),
            &AbundanceConfig::default(),
        );
        assert!(matches!(result, Err(AbundanceError::MissingInputFile(_))));
    }

    #[rstest]
    fn test_hidden_spinner() {
        let spinner = record_spinner(false).unwrap();
        assert!(spinner.is_hidden());
        assert_eq!(spinner.position(), 0);
    }
}
