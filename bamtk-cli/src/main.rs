mod annotate;
mod common;
mod features;
mod logging;
mod workflow;

use std::path::Path;

use clap::{ArgMatches, Command};
use log::error;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "bamtk";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Abundance matrices of features and annotations from BAM alignment files.")
        .subcommand_required(true)
        .subcommand(features::cli::create_features_cli())
        .subcommand(annotate::cli::create_annotate_cli())
        .subcommand(workflow::cli::create_workflow_cli())
}

/// Directory that receives the run log of a subcommand.
fn log_dir(matches: &ArgMatches) -> Option<&Path> {
    ["output_dir", "features_dir"]
        .iter()
        .find_map(|id| matches.try_get_one::<String>(id).ok().flatten())
        .map(Path::new)
}

fn main() {
    let app = build_parser();
    let matches = app.get_matches();

    if let Some((_, sub_matches)) = matches.subcommand() {
        logging::init_logging(log_dir(sub_matches), common::is_silent(sub_matches));
    }

    let result = match matches.subcommand() {
        //
        // FEATURE ABUNDANCE
        //
        Some((features::cli::FEATURES_CMD, matches)) => features::handlers::run_features(matches),

        //
        // ANNOTATION ROLLUP
        //
        Some((annotate::cli::ANNOTATE_CMD, matches)) => annotate::handlers::run_annotate(matches),

        //
        // FULL WORKFLOW
        //
        Some((workflow::cli::WORKFLOW_CMD, matches)) => workflow::handlers::run_workflow(matches),

        _ => unreachable!("Subcommand not found"),
    };

    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
