use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for abundance computations.
#[derive(Error, Debug)]
pub enum AbundanceError {
    /// An input file required by the run does not exist.
    #[error("Input file not found: {0:?}")]
    MissingInputFile(PathBuf),

    /// A record targets a feature the index does not know about.
    #[error(
        "Sample '{sample}', record {record}: feature '{feature}' is absent from the feature index. Check the index file and the grouping options."
    )]
    UnknownFeature {
        sample: String,
        feature: String,
        record: u64,
    },

    /// A read was assigned to a feature whose length is zero.
    #[error("Feature '{0}' has a length of zero and cannot be length normalised")]
    ZeroLengthFeature(String),

    /// A line of an input file could not be parsed.
    #[error("Malformed line {line_number} in {origin}: {reason}: {line:?}")]
    MalformedLine {
        origin: String,
        line_number: usize,
        line: String,
        reason: String,
    },

    /// An output file exists and overwriting was not requested.
    #[error("Output file already exists: {0:?}. Use --force_overwrite to replace it")]
    OutputExists(PathBuf),

    /// The external record producer could not run or exited with an error.
    #[error("Alignment record producer failed for '{source_id}': {message}")]
    ProducerFailed { source_id: String, message: String },

    /// Per-sample values do not line up with the features of the run.
    #[error("Matrix shape mismatch: {0}")]
    Shape(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Progress(#[from] indicatif::style::TemplateError),
}

impl AbundanceError {
    pub(crate) fn malformed(
        origin: impl Into<String>,
        line_number: usize,
        line: &str,
        reason: impl Into<String>,
    ) -> Self {
        AbundanceError::MalformedLine {
            origin: origin.into(),
            line_number,
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for bamtk-abundance operations.
pub type Result<T> = std::result::Result<T, AbundanceError>;
