use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use bamtk_abundance::{SamtoolsView, workflow};

use crate::common::{build_config, is_silent};

pub fn run_workflow(matches: &ArgMatches) -> Result<()> {
    let faidx = matches
        .get_one::<String>("faidx")
        .expect("A path to a fasta index is required.");

    let bam_list = matches
        .get_one::<String>("bam_list")
        .expect("A path to a sample manifest is required.");

    let features_annotation = matches
        .get_one::<String>("features_annotation")
        .expect("A path to a feature annotation table is required.");

    let annotation_description = matches
        .get_one::<String>("annotation_description")
        .expect("A path to an annotation description table is required.");

    let output_dir = matches
        .get_one::<String>("output_dir")
        .expect("An output directory is required.");

    let config = build_config(matches)?;
    let source = SamtoolsView::from_config(&config);

    workflow(
        Path::new(faidx),
        Path::new(bam_list),
        Path::new(features_annotation),
        Path::new(annotation_description),
        Path::new(output_dir),
        &config,
        &source,
        !is_silent(matches),
    )?;

    Ok(())
}
