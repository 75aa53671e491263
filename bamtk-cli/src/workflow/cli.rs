use clap::{Arg, Command};

use crate::common::{with_common_args, with_feature_args};

pub const WORKFLOW_CMD: &str = "mm_wf";

pub fn create_workflow_cli() -> Command {
    let cmd = Command::new(WORKFLOW_CMD)
        .about("Run mm_features then mm_annotated_features on its output.")
        .arg(Arg::new("faidx").required(true).help("Fasta index (.fai) of the reference"))
        .arg(
            Arg::new("bam_list")
                .required(true)
                .help("Sample manifest: alignment file and library size per line"),
        )
        .arg(
            Arg::new("features_annotation")
                .required(true)
                .help("Feature id to annotation id table"),
        )
        .arg(
            Arg::new("annotation_description")
                .required(true)
                .help("Annotation id to description table"),
        )
        .arg(Arg::new("output_dir").required(true).help("Output directory"));
    with_feature_args(with_common_args(cmd))
}
