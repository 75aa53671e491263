pub const FEATURES_HEADER: &str = "Features";
pub const FEATURES_SIZE_HEADER: &str = "Features_size";

pub const TPM_FILE: &str = "TPM.tsv";
pub const LOG_FILE: &str = "bamtk.log";

/// Annotation id that collects every feature annotated as unknown.
pub const UNANNOTATED: &str = "hypothetical protein";

pub const DEFAULT_ALIGNMENT_EXTENSION: &str = "bam";
pub const DEFAULT_INDEX_EXTENSION: &str = "fasta.fai";
pub const DEFAULT_SEPARATOR: &str = ".";
pub const DEFAULT_THREADS: usize = 2;
pub const DEFAULT_MIN_MAPQ: u8 = 10;
pub const DEFAULT_IDENTITY_CUTOFF: f64 = 0.0;
pub const DEFAULT_FEATURE_NORMALISATION: f64 = 1_000_000.0;
pub const DEFAULT_FEATURE_SIZE_NORMALISATION: f64 = 1_000.0;
pub const DEFAULT_SAMTOOLS: &str = "samtools";

pub const TPM_SCALE: f64 = 1_000_000.0;

// zero-based columns of an alignment record
pub const TARGET_FIELD: usize = 2;
pub const CIGAR_FIELD: usize = 5;
pub const READ_FIELD: usize = 6;

pub const PROGRESS_LOG_INTERVAL: u64 = 1_000_000;
pub const SPINNER_UPDATE_INTERVAL: u64 = 10_000;
