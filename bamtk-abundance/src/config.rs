use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::AbundanceError;

/// Where the per-sample library size comes from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LibrarySizeSource {
    /// The value given in the sample manifest.
    #[default]
    Total,
    /// The length-normalised mass of reads that passed the filters.
    Aligned,
}

impl FromStr for LibrarySizeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "total" => Ok(LibrarySizeSource::Total),
            "aligned" => Ok(LibrarySizeSource::Aligned),
            _ => Err(format!(
                "Invalid library size normalisation: {}. Expected `total` or `aligned`",
                s
            )),
        }
    }
}

impl Display for LibrarySizeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibrarySizeSource::Total => write!(f, "total"),
            LibrarySizeSource::Aligned => write!(f, "aligned"),
        }
    }
}

///
/// Every knob of a run. Missing keys in a TOML file fall back to the defaults.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AbundanceConfig {
    /// extension stripped from alignment file names to get sample names
    pub extension: String,
    /// extension stripped from the index file name to get the reference name
    pub faidx_extension: String,
    /// threads handed to the record producer
    pub threads: usize,
    pub map_q: u8,
    /// fraction (0-1) or percentage (above 1) of the read that must be matched
    pub id_cutoff: f64,
    pub merge: bool,
    pub separator: String,
    pub genome: bool,
    pub feature_normalisation: f64,
    pub feature_size_normalisation: f64,
    pub discard_feature_length_normalisation: bool,
    pub discard_library_size_normalisation: bool,
    pub library_size_normalisation: LibrarySizeSource,
    pub removed: bool,
    pub force_overwrite: bool,
    pub samtools: String,
}

impl Default for AbundanceConfig {
    fn default() -> Self {
        AbundanceConfig {
            extension: DEFAULT_ALIGNMENT_EXTENSION.to_string(),
            faidx_extension: DEFAULT_INDEX_EXTENSION.to_string(),
            threads: DEFAULT_THREADS,
            map_q: DEFAULT_MIN_MAPQ,
            id_cutoff: DEFAULT_IDENTITY_CUTOFF,
            merge: false,
            separator: DEFAULT_SEPARATOR.to_string(),
            genome: false,
            feature_normalisation: DEFAULT_FEATURE_NORMALISATION,
            feature_size_normalisation: DEFAULT_FEATURE_SIZE_NORMALISATION,
            discard_feature_length_normalisation: false,
            discard_library_size_normalisation: false,
            library_size_normalisation: LibrarySizeSource::Total,
            removed: false,
            force_overwrite: false,
            samtools: DEFAULT_SAMTOOLS.to_string(),
        }
    }
}

impl AbundanceConfig {
    /// The identity cutoff as a fraction of the read length.
    pub fn identity_fraction(&self) -> f64 {
        if self.id_cutoff > 1.0 {
            self.id_cutoff / 100.0
        } else {
            self.id_cutoff
        }
    }

    /// Constant applied to length-normalised counters, `None` when length
    /// normalisation is disabled.
    pub fn length_normalisation(&self) -> Option<f64> {
        match self.discard_feature_length_normalisation {
            true => None,
            false => Some(self.feature_size_normalisation),
        }
    }
}

impl TryFrom<&Path> for AbundanceConfig {
    type Error = AbundanceError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        if !path.is_file() {
            return Err(AbundanceError::MissingInputFile(path.to_path_buf()));
        }
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
