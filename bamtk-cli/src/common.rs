use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, arg, value_parser};

use bamtk_abundance::{AbundanceConfig, LibrarySizeSource};

///
/// Options shared by every subcommand.
///
pub fn with_common_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(--config <config>).help("TOML file with default values for the options below"),
    )
    .arg(
        arg!(--removed)
            .help("Leave out rows that sum to zero over all samples")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(--silent)
            .help("Turn off logging and progress display")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(--force_overwrite)
            .help("Replace existing output files")
            .action(ArgAction::SetTrue),
    )
}

///
/// Options of the feature counting step.
///
pub fn with_feature_args(cmd: Command) -> Command {
    cmd.arg(
        arg!(-x --extension <extension>).help("Alignment file extension removed from sample names [bam]"),
    )
    .arg(
        arg!(--faidx_extension <faidx_extension>)
            .help("Index file extension removed from the reference name [fasta.fai]"),
    )
    .arg(
        arg!(-t --threads <threads>)
            .help("Threads handed to samtools view [2]")
            .value_parser(value_parser!(usize)),
    )
    .arg(
        Arg::new("mapQ")
            .short('Q')
            .long("mapQ")
            .help("Minimum mapping quality [10]")
            .value_parser(value_parser!(u8)),
    )
    .arg(
        arg!(-i --id_cutoff <id_cutoff>)
            .help("Minimum fraction (or percentage) of the read that must match [0]")
            .value_parser(value_parser!(f64)),
    )
    .arg(
        arg!(-m --merge)
            .help("Merge sequences sharing a name prefix up to the last separator")
            .action(ArgAction::SetTrue),
    )
    .arg(arg!(-s --separator <separator>).help("Separator used by --merge [.]"))
    .arg(
        arg!(-g --genome)
            .help("Count every sequence towards a single feature named after the reference")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(-n --feature_normalisation <feature_normalisation>)
            .help("Normalised abundances are given per this many reads [1000000]")
            .value_parser(value_parser!(f64)),
    )
    .arg(
        arg!(--feature_size_normalisation <feature_size_normalisation>)
            .help("Feature lengths are normalised to this many bases [1000]")
            .value_parser(value_parser!(f64)),
    )
    .arg(
        arg!(-f --discard_feature_length_normalisation)
            .help("Do not normalise by feature length")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(-l --discard_library_size_normalisation)
            .help("Do not normalise by library size")
            .action(ArgAction::SetTrue),
    )
    .arg(
        arg!(--library_size_normalisation <library_size_normalisation>)
            .help("Library size used for normalisation: total or aligned [total]"),
    )
    .arg(arg!(--samtools <samtools>).help("Path to the samtools executable [samtools]"))
}

fn option<'a, T: Clone + Send + Sync + 'static>(matches: &'a ArgMatches, id: &str) -> Option<&'a T> {
    matches.try_get_one::<T>(id).ok().flatten()
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    option::<bool>(matches, id).copied().unwrap_or(false)
}

pub fn is_silent(matches: &ArgMatches) -> bool {
    flag(matches, "silent")
}

///
/// Build the run configuration: the `--config` file (or the defaults), then every
/// option given on the command line on top.
///
pub fn build_config(matches: &ArgMatches) -> Result<AbundanceConfig> {
    let mut config = match option::<String>(matches, "config") {
        Some(path) => AbundanceConfig::try_from(Path::new(path))
            .with_context(|| format!("Could not load the configuration file {}", path))?,
        None => AbundanceConfig::default(),
    };

    if let Some(extension) = option::<String>(matches, "extension") {
        config.extension = extension.clone();
    }
    if let Some(extension) = option::<String>(matches, "faidx_extension") {
        config.faidx_extension = extension.clone();
    }
    if let Some(&threads) = option::<usize>(matches, "threads") {
        config.threads = threads;
    }
    if let Some(&map_q) = option::<u8>(matches, "mapQ") {
        config.map_q = map_q;
    }
    if let Some(&cutoff) = option::<f64>(matches, "id_cutoff") {
        config.id_cutoff = cutoff;
    }
    if let Some(separator) = option::<String>(matches, "separator") {
        config.separator = separator.clone();
    }
    if let Some(&value) = option::<f64>(matches, "feature_normalisation") {
        config.feature_normalisation = value;
    }
    if let Some(&value) = option::<f64>(matches, "feature_size_normalisation") {
        config.feature_size_normalisation = value;
    }
    if let Some(source) = option::<String>(matches, "library_size_normalisation") {
        config.library_size_normalisation = match LibrarySizeSource::from_str(source) {
            Ok(source) => source,
            Err(_err) => anyhow::bail!("Unknown library size normalisation supplied: {}", source),
        };
    }
    if let Some(samtools) = option::<String>(matches, "samtools") {
        config.samtools = samtools.clone();
    }

    // flags only switch things on
    config.merge |= flag(matches, "merge");
    config.genome |= flag(matches, "genome");
    config.discard_feature_length_normalisation |=
        flag(matches, "discard_feature_length_normalisation");
    config.discard_library_size_normalisation |=
        flag(matches, "discard_library_size_normalisation");
    config.removed |= flag(matches, "removed");
    config.force_overwrite |= flag(matches, "force_overwrite");

    Ok(config)
}
