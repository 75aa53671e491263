use std::path::Path;

use crate::errors::{AbundanceError, Result};
use crate::utils::{file_stem_without, read_data_lines};

/// Library size declared for a sample in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySize {
    Total(u64),
    /// empty or zero in the manifest: fall back to the aligned read mass
    Unknown,
}

impl LibrarySize {
    pub fn parse(field: Option<&str>) -> std::result::Result<Self, String> {
        let field = field.map(str::trim).unwrap_or_default();
        if field.is_empty() {
            return Ok(LibrarySize::Unknown);
        }
        match field.parse::<u64>() {
            Ok(0) => Ok(LibrarySize::Unknown),
            Ok(size) => Ok(LibrarySize::Total(size)),
            Err(_) => Err(format!("library size '{}' is not an integer", field)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    /// handed as is to the record producer
    pub source: String,
    pub name: String,
    pub library_size: LibrarySize,
}

///
/// The list of alignment sources to process, one sample per line:
///
/// | alignment_source     | library_size |
/// |----------------------|--------------|
/// | /data/S1.bam         | 1200000      |
/// | /data/S2.bam         |              |
///
pub struct SampleManifest {
    samples: Vec<SampleEntry>,
}

impl SampleManifest {
    ///
    /// Read a sample manifest.
    ///
    /// # Arguments
    /// - path: tab separated manifest, `#` lines are comments
    /// - extension: alignment file extension removed to build sample names
    ///
    pub fn from_file(path: &Path, extension: &str) -> Result<Self> {
        let origin = path.display().to_string();
        let mut samples = Vec::new();

        for (line_number, line) in read_data_lines(path)? {
            let mut parts = line.split('\t');
            let source = parts.next().unwrap_or_default().trim();
            if source.is_empty() {
                return Err(AbundanceError::malformed(
                    &origin,
                    line_number,
                    &line,
                    "missing alignment source",
                ));
            }
            let library_size = LibrarySize::parse(parts.next())
                .map_err(|reason| AbundanceError::malformed(&origin, line_number, &line, reason))?;

            samples.push(SampleEntry {
                source: source.to_string(),
                name: file_stem_without(source, extension),
                library_size,
            });
        }

        Ok(SampleManifest { samples })
    }

    pub fn samples(&self) -> &[SampleEntry] {
        &self.samples
    }

    pub fn names(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::path::PathBuf;

    #[rstest]
    #[case(None, LibrarySize::Unknown)]
    #[case(Some(""), LibrarySize::Unknown)]
    #[case(Some("0"), LibrarySize::Unknown)]
    #[case(Some("1500 "), LibrarySize::Total(1500))]
    fn test_library_size_parse(#[case] field: Option<&str>, #[case] expected: LibrarySize) {
        assert_eq!(LibrarySize::parse(field).unwrap(), expected);
    }

    #[rstest]
    fn test_library_size_parse_rejects_text() {
        assert!(LibrarySize::parse(Some("many")).is_err());
    }

    #[rstest]
    fn test_from_file() {
        let path = PathBuf::from("../tests/data/abundance/samples.tsv");
        let manifest = SampleManifest::from_file(&path, "bam").unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.names(), vec!["S1", "S2"]);
        assert_eq!(manifest.samples()[0].source, "alignments/S1.bam");
        assert_eq!(manifest.samples()[0].library_size, LibrarySize::Total(2000));
        assert_eq!(manifest.samples()[1].library_size, LibrarySize::Unknown);
    }
}
