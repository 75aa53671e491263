use clap::{Arg, Command};

use crate::common::with_common_args;

pub const ANNOTATE_CMD: &str = "mm_annotated_features";

pub fn create_annotate_cli() -> Command {
    let cmd = Command::new(ANNOTATE_CMD)
        .about("Roll the feature abundance matrices of a directory up to annotations.")
        .arg(
            Arg::new("features_dir")
                .required(true)
                .help("Directory holding the feature abundance matrices"),
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
        );
    with_common_args(cmd)
}
