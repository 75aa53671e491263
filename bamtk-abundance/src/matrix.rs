use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::consts::{FEATURES_HEADER, FEATURES_SIZE_HEADER, TPM_FILE};
use crate::counts::CountMatrix;
use crate::errors::{AbundanceError, Result};
use crate::normalise::SampleAbundance;
use crate::registry::FeatureRegistry;
use crate::utils::read_data_lines;

///
/// The per-sample views written for a run, one matrix file each.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    RawReads,
    NormalisedReads,
    RelativeReads,
    RawBases,
    NormalisedBases,
    RelativeBases,
    Tpm,
}

impl MatrixKind {
    /// Views that are rolled up to annotations.
    pub const ANNOTATABLE: [MatrixKind; 6] = [
        MatrixKind::RawReads,
        MatrixKind::NormalisedReads,
        MatrixKind::RelativeReads,
        MatrixKind::RawBases,
        MatrixKind::NormalisedBases,
        MatrixKind::RelativeBases,
    ];

    pub const ALL: [MatrixKind; 7] = [
        MatrixKind::RawReads,
        MatrixKind::NormalisedReads,
        MatrixKind::RelativeReads,
        MatrixKind::RawBases,
        MatrixKind::NormalisedBases,
        MatrixKind::RelativeBases,
        MatrixKind::Tpm,
    ];

    pub fn features_file(self) -> &'static str {
        match self {
            MatrixKind::RawReads => "features_reads_raw_abundance.tsv",
            MatrixKind::NormalisedReads => "features_reads_normalised_abundance.tsv",
            MatrixKind::RelativeReads => "features_reads_relative_abundance.tsv",
            MatrixKind::RawBases => "features_base_raw_abundance.tsv",
            MatrixKind::NormalisedBases => "features_base_normalised_abundance.tsv",
            MatrixKind::RelativeBases => "features_base_relative_abundance.tsv",
            MatrixKind::Tpm => TPM_FILE,
        }
    }

    /// File name of the annotation level matrix, `None` for TPM.
    pub fn annotation_file(self) -> Option<&'static str> {
        match self {
            MatrixKind::RawReads => Some("annotate_reads_raw_abundance.tsv"),
            MatrixKind::NormalisedReads => Some("annotate_reads_normalised_abundance.tsv"),
            MatrixKind::RelativeReads => Some("annotate_reads_relative_abundance.tsv"),
            MatrixKind::RawBases => Some("annotate_base_raw_abundance.tsv"),
            MatrixKind::NormalisedBases => Some("annotate_base_normalised_abundance.tsv"),
            MatrixKind::RelativeBases => Some("annotate_base_relative_abundance.tsv"),
            MatrixKind::Tpm => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatrixKind::RawReads => "raw reads",
            MatrixKind::NormalisedReads => "normalised reads",
            MatrixKind::RelativeReads => "relative reads",
            MatrixKind::RawBases => "raw bases",
            MatrixKind::NormalisedBases => "normalised bases",
            MatrixKind::RelativeBases => "relative bases",
            MatrixKind::Tpm => "TPM",
        }
    }

    /// The values of this view for one sample.
    pub fn view(self, abundance: &SampleAbundance) -> &[f64] {
        match self {
            MatrixKind::RawReads => &abundance.raw_reads,
            MatrixKind::NormalisedReads => &abundance.normalised_reads,
            MatrixKind::RelativeReads => &abundance.relative_reads,
            MatrixKind::RawBases => &abundance.raw_bases,
            MatrixKind::NormalisedBases => &abundance.normalised_bases,
            MatrixKind::RelativeBases => &abundance.relative_bases,
            MatrixKind::Tpm => &abundance.tpm,
        }
    }
}

/// File names of every feature level matrix.
pub fn feature_outputs() -> Vec<&'static str> {
    MatrixKind::ALL.iter().map(|k| k.features_file()).collect()
}

/// File names of every annotation level matrix.
pub fn annotation_outputs() -> Vec<&'static str> {
    MatrixKind::ANNOTATABLE
        .iter()
        .filter_map(|k| k.annotation_file())
        .collect()
}

///
/// Write one tab separated row: the leading cells, then the values.
///
pub(crate) fn write_row<W: Write>(writer: &mut W, leading: &[&str], values: &[f64]) -> Result<()> {
    let mut cells: Vec<String> = leading.iter().map(|cell| cell.to_string()).collect();
    cells.extend(values.iter().map(|value| value.to_string()));
    writeln!(writer, "{}", cells.join("\t"))?;
    Ok(())
}

///
/// A feature x sample matrix together with the feature sizes.
///
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    features: Vec<String>,
    sizes: Vec<u64>,
    samples: Vec<String>,
    counts: CountMatrix<f64>,
}

impl FeatureMatrix {
    ///
    /// Assemble one view of every sample into a matrix in registry order.
    ///
    /// # Arguments
    /// - kind: which view to take from each sample
    /// - registry: features of the run
    /// - samples: sample names, in manifest order
    /// - abundances: one entry per sample, same order as `samples`
    ///
    pub fn from_samples(
        kind: MatrixKind,
        registry: &FeatureRegistry,
        samples: &[String],
        abundances: &[SampleAbundance],
    ) -> Result<Self> {
        let columns: Vec<&[f64]> = abundances.iter().map(|a| kind.view(a)).collect();
        let counts = CountMatrix::from_columns(registry.len(), &columns)
            .map_err(AbundanceError::Shape)?;

        Ok(FeatureMatrix {
            features: registry.features().to_vec(),
            sizes: registry.lengths().to_vec(),
            samples: samples.to_vec(),
            counts,
        })
    }

    ///
    /// Read a feature matrix written by [FeatureMatrix::write_to_file].
    ///
    pub fn from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let mut lines = read_data_lines(path)?.into_iter();

        let (header_number, header) = lines.next().ok_or_else(|| {
            AbundanceError::malformed(&origin, 1, "", "missing matrix header")
        })?;
        let mut columns = header.split('\t');
        if columns.next() != Some(FEATURES_HEADER) || columns.next() != Some(FEATURES_SIZE_HEADER) {
            return Err(AbundanceError::malformed(
                &origin,
                header_number,
                &header,
                format!(
                    "header must start with {}\t{}",
                    FEATURES_HEADER, FEATURES_SIZE_HEADER
                ),
            ));
        }
        let samples: Vec<String> = columns.map(|s| s.to_string()).collect();

        let mut features = Vec::new();
        let mut sizes = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (line_number, line) in lines {
            let malformed =
                |reason: String| AbundanceError::malformed(&origin, line_number, &line, reason);
            let mut fields = line.split('\t');
            let feature = fields.next().unwrap_or_default();
            let size = fields
                .next()
                .ok_or_else(|| malformed("missing feature size".to_string()))?
                .parse::<u64>()
                .map_err(|err| malformed(format!("invalid feature size: {}", err)))?;
            let values = fields
                .map(|field| {
                    field
                        .parse::<f64>()
                        .map_err(|err| malformed(format!("invalid value '{}': {}", field, err)))
                })
                .collect::<Result<Vec<f64>>>()?;
            if values.len() != samples.len() {
                return Err(malformed(format!(
                    "expected {} values, found {}",
                    samples.len(),
                    values.len()
                )));
            }
            features.push(feature.to_string());
            sizes.push(size);
            rows.push(values);
        }

        let mut counts = CountMatrix::new(features.len(), samples.len());
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                counts
                    .set(row, col, value)
                    .map_err(AbundanceError::Shape)?;
            }
        }

        Ok(FeatureMatrix {
            features,
            sizes,
            samples,
            counts,
        })
    }

    ///
    /// Write the matrix as tab separated text.
    ///
    /// With `remove_empty`, rows summing to zero in this matrix are left out.
    /// Returns the number of rows written.
    ///
    pub fn write<W: Write>(&self, mut writer: W, remove_empty: bool) -> Result<usize> {
        let mut header = vec![FEATURES_HEADER, FEATURES_SIZE_HEADER];
        header.extend(self.samples.iter().map(String::as_str));
        writeln!(writer, "{}", header.join("\t"))?;

        let mut written = 0;
        for (row, feature) in self.features.iter().enumerate() {
            if remove_empty && self.counts.row_sum(row) == 0.0 {
                continue;
            }
            let size = self.sizes[row].to_string();
            write_row(&mut writer, &[feature.as_str(), size.as_str()], self.counts.row(row))?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }

    pub fn write_to_file(&self, path: &Path, remove_empty: bool) -> Result<usize> {
        let writer = BufWriter::new(File::create(path)?);
        let written = self.write(writer, remove_empty)?;
        info!("{} rows written to {}", written, path.display());
        Ok(written)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn counts(&self) -> &CountMatrix<f64> {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    use crate::registry::GroupingMode;

    #[fixture]
    fn registry() -> FeatureRegistry {
        let mut registry = FeatureRegistry::new(GroupingMode::None);
        registry.insert("chrA", 1000);
        registry.insert("chrB", 500);
        registry
    }

    fn abundance(raw_reads: Vec<f64>, raw_bases: Vec<f64>) -> SampleAbundance {
        SampleAbundance {
            tpm: raw_reads.clone(),
            normalised_reads: raw_reads.clone(),
            relative_reads: raw_reads.clone(),
            normalised_bases: raw_bases.clone(),
            relative_bases: raw_bases.clone(),
            raw_reads,
            raw_bases,
            library_size: 1.0,
        }
    }

    fn render(matrix: &FeatureMatrix, remove_empty: bool) -> String {
        let mut out = Vec::new();
        matrix.write(&mut out, remove_empty).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[rstest]
    fn test_write_keeps_registry_order(registry: FeatureRegistry) {
        let samples = vec!["S1".to_string(), "S2".to_string()];
        let abundances = vec![
            abundance(vec![2.0, 0.0], vec![200.0, 0.0]),
            abundance(vec![0.5, 0.0], vec![50.0, 0.0]),
        ];
        let matrix =
            FeatureMatrix::from_samples(MatrixKind::RawReads, &registry, &samples, &abundances)
                .unwrap();

        assert_eq!(
            render(&matrix, false),
            "Features\tFeatures_size\tS1\tS2\nchrA\t1000\t2\t0.5\nchrB\t500\t0\t0\n"
        );
        assert_eq!(
            render(&matrix, true),
            "Features\tFeatures_size\tS1\tS2\nchrA\t1000\t2\t0.5\n"
        );
    }

    #[rstest]
    fn test_removal_uses_the_matrix_own_sums(registry: FeatureRegistry) {
        // chrB has reads but no matched base
        let samples = vec!["S1".to_string()];
        let abundances = vec![abundance(vec![1.0, 1.0], vec![100.0, 0.0])];

        let reads =
            FeatureMatrix::from_samples(MatrixKind::RawReads, &registry, &samples, &abundances)
                .unwrap();
        let bases =
            FeatureMatrix::from_samples(MatrixKind::RawBases, &registry, &samples, &abundances)
                .unwrap();

        assert!(render(&reads, true).contains("chrB"));
        assert!(!render(&bases, true).contains("chrB"));
    }

    #[rstest]
    fn test_file_round_trip(registry: FeatureRegistry) {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MatrixKind::Tpm.features_file());
        let samples = vec!["S1".to_string()];
        let abundances = vec![abundance(vec![0.25, 0.75], vec![1.0, 3.0])];
        let matrix =
            FeatureMatrix::from_samples(MatrixKind::Tpm, &registry, &samples, &abundances).unwrap();

        assert_eq!(matrix.write_to_file(&path, false).unwrap(), 2);
        assert_eq!(FeatureMatrix::from_file(&path).unwrap(), matrix);
    }

    #[rstest]
    #[case("Feature\tFeatures_size\tS1\nchrA\t10\t1\n")]
    #[case("Features\tFeatures_size\tS1\nchrA\tten\t1\n")]
    #[case("Features\tFeatures_size\tS1\nchrA\t10\t1\t2\n")]
    #[case("Features\tFeatures_size\tS1\nchrA\t10\tnope\n")]
    fn test_malformed_matrix(#[case] content: &str) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matrix.tsv");
        std::fs::write(&path, content).unwrap();

        assert!(matches!(
            FeatureMatrix::from_file(&path),
            Err(AbundanceError::MalformedLine { .. })
        ));
    }

    #[rstest]
    fn test_output_names() {
        assert_eq!(feature_outputs().len(), 7);
        assert!(feature_outputs().contains(&"TPM.tsv"));
        assert_eq!(
            annotation_outputs()[3],
            "annotate_base_raw_abundance.tsv"
        );
    }
}
