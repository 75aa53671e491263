use std::path::Path;

use fxhash::FxHashMap;
use log::{info, warn};

use crate::config::AbundanceConfig;
use crate::errors::{AbundanceError, Result};
use crate::utils::{file_stem_without, read_data_lines};

///
/// How reference sequence names are turned into feature identifiers.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupingMode {
    /// every reference sequence is its own feature
    None,
    /// drop the last separator-delimited component: `contig_1.3` -> `contig_1`
    MergeBySeparator(String),
    /// every sequence counts towards a single feature named after the reference
    WholeReference(String),
}

impl GroupingMode {
    ///
    /// Pick the grouping mode requested by a configuration.
    ///
    /// Whole-reference grouping takes precedence over merging. The reference name
    /// is the index file name without its index extension.
    ///
    pub fn from_config(config: &AbundanceConfig, index: &Path) -> Self {
        if config.genome {
            let index = index.to_string_lossy();
            GroupingMode::WholeReference(file_stem_without(&index, &config.faidx_extension))
        } else if config.merge {
            GroupingMode::MergeBySeparator(config.separator.clone())
        } else {
            GroupingMode::None
        }
    }

    /// Effective feature identifier for a reference sequence name.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        match self {
            GroupingMode::None => name,
            GroupingMode::MergeBySeparator(separator) if !separator.is_empty() => {
                match name.rsplit_once(separator.as_str()) {
                    Some((group, _)) => group,
                    None => name,
                }
            }
            GroupingMode::MergeBySeparator(_) => name,
            GroupingMode::WholeReference(reference) => reference.as_str(),
        }
    }
}

///
/// The set of features reads are counted against.
///
/// Features keep the order in which they first appear in the index; that order is
/// the row order of every matrix written for the run.
///
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: Vec<String>,
    lengths: Vec<u64>,
    index: FxHashMap<String, usize>,
    grouping: GroupingMode,
}

impl FeatureRegistry {
    pub fn new(grouping: GroupingMode) -> Self {
        FeatureRegistry {
            features: Vec::new(),
            lengths: Vec::new(),
            index: FxHashMap::default(),
            grouping,
        }
    }

    ///
    /// Load the registry from a fasta index (`name<TAB>length<TAB>...`).
    ///
    /// # Arguments
    /// - path: path to the index, gzip'd or not
    /// - grouping: how sequence names collapse into features
    ///
    pub fn from_index(path: &Path, grouping: GroupingMode) -> Result<Self> {
        let mut registry = FeatureRegistry::new(grouping);
        let origin = path.display().to_string();
        let mut sequences = 0_usize;

        for (line_number, line) in read_data_lines(path)? {
            let mut parts = line.split('\t');
            let name = parts.next().unwrap_or_default();
            let length = parts.next().ok_or_else(|| {
                AbundanceError::malformed(&origin, line_number, &line, "missing length column")
            })?;
            let length = length.trim().parse::<u64>().map_err(|_| {
                AbundanceError::malformed(&origin, line_number, &line, "length is not an integer")
            })?;
            registry.insert(name, length);
            sequences += 1;
        }

        for (feature, length) in registry.iter() {
            if length == 0 {
                warn!("Feature '{}' has a length of zero", feature);
            }
        }

        info!(
            "{} features loaded from {} ({} reference sequences)",
            registry.len(),
            origin,
            sequences
        );

        Ok(registry)
    }

    ///
    /// Register a reference sequence. Sequences that resolve to an existing feature
    /// add their length to it.
    ///
    pub fn insert(&mut self, name: &str, length: u64) {
        let feature = self.grouping.resolve(name).to_string();
        match self.index.get(&feature) {
            Some(&position) => self.lengths[position] += length,
            None => {
                self.index.insert(feature.clone(), self.features.len());
                self.features.push(feature);
                self.lengths.push(length);
            }
        }
    }

    /// Position of the feature a reference sequence name resolves to.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(self.grouping.resolve(name)).copied()
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.grouping.resolve(name)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    pub fn length(&self, position: usize) -> u64 {
        self.lengths[position]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.features
            .iter()
            .map(String::as_str)
            .zip(self.lengths.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
