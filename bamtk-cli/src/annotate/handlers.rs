use std::path::Path;

use anyhow::Result;
use clap::ArgMatches;

use bamtk_abundance::annotate_features;

use crate::common::build_config;

pub fn run_annotate(matches: &ArgMatches) -> Result<()> {
    let features_dir = matches
        .get_one::<String>("features_dir")
        .expect("A path to a features directory is required.");

    let features_annotation = matches
        .get_one::<String>("features_annotation")
        .expect("A path to a feature annotation table is required.");

    let annotation_description = matches
        .get_one::<String>("annotation_description")
        .expect("A path to an annotation description table is required.");

    let config = build_config(matches)?;

    annotate_features(
        Path::new(features_dir),
        Path::new(features_annotation),
        Path::new(annotation_description),
        &config,
    )?;

    Ok(())
}
