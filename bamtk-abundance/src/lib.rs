//! # Feature abundance from alignment records
//!
//! `bamtk-abundance` counts the alignment records of a set of samples against the
//! features (reference sequences, merged contigs or whole references) of a faidx
//! index, normalises the counts per sample and writes feature x sample abundance
//! matrices. The matrices can then be rolled up to annotations.
//!
//! ## Example
//! ```rust,no_run
//! use std::path::Path;
//!
//! use bamtk_abundance::{AbundanceConfig, SamtoolsView, feature_abundance};
//!
//! let config = AbundanceConfig::default();
//! let source = SamtoolsView::from_config(&config);
//! feature_abundance(
//!     Path::new("contigs.fasta.fai"),
//!     Path::new("samples.tsv"),
//!     Path::new("abundance"),
//!     &config,
//!     &source,
//!     true,
//! )
//! .unwrap();
//! ```
pub mod annotation;
pub mod config;
pub mod consts;
pub mod counting;
pub mod counts;
pub mod errors;
pub mod manifest;
pub mod matrix;
pub mod normalise;
pub mod pipeline;
pub mod record;
pub mod registry;
pub mod source;
pub mod utils;

// re-exports
pub use annotation::*;
pub use config::*;
pub use counting::*;
pub use counts::*;
pub use errors::*;
pub use manifest::*;
pub use matrix::*;
pub use normalise::*;
pub use pipeline::*;
pub use record::*;
pub use registry::*;
pub use source::*;
