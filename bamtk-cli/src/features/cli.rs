use clap::{Arg, Command};

use crate::common::{with_common_args, with_feature_args};

pub const FEATURES_CMD: &str = "mm_features";

pub fn create_features_cli() -> Command {
    let cmd = Command::new(FEATURES_CMD)
        .about("Count the reads of every sample against the features of a fasta index and write the abundance matrices.")
        .arg(Arg::new("faidx").required(true).help("Fasta index (.fai) of the reference"))
        .arg(
            Arg::new("bam_list")
                .required(true)
                .help("Sample manifest: alignment file and library size per line"),
        )
        .arg(Arg::new("output_dir").required(true).help("Output directory"));
    with_feature_args(with_common_args(cmd))
}
