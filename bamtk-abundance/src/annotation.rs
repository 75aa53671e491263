use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fxhash::{FxHashMap, FxHashSet};
use log::{debug, info, warn};

use crate::consts::{FEATURES_HEADER, UNANNOTATED};
use crate::counts::CountMatrix;
use crate::errors::{AbundanceError, Result};
use crate::matrix::{FeatureMatrix, write_row};
use crate::utils::read_data_lines;

///
/// Feature id to annotation id, read from a two column table.
///
#[derive(Debug, Clone, Default)]
pub struct FeatureAnnotationMap {
    map: FxHashMap<String, String>,
}

impl FeatureAnnotationMap {
    pub fn from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let mut map = FxHashMap::default();

        for (line_number, line) in read_data_lines(path)? {
            let mut parts = line.split('\t');
            let feature = parts.next().unwrap_or_default().trim();
            let annotation = parts.next().map(str::trim).unwrap_or_default();
            if feature.is_empty() || annotation.is_empty() {
                return Err(AbundanceError::malformed(
                    &origin,
                    line_number,
                    &line,
                    "expected a feature id and an annotation id",
                ));
            }
            map.insert(feature.to_string(), annotation.to_string());
        }

        info!("{} feature annotations loaded from {}", map.len(), origin);
        Ok(FeatureAnnotationMap { map })
    }

    pub fn insert(&mut self, feature: &str, annotation: &str) {
        self.map.insert(feature.to_string(), annotation.to_string());
    }

    pub fn get(&self, feature: &str) -> Option<&str> {
        self.map.get(feature).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

///
/// The annotations of the output rows, in output order.
///
/// The order is the one of the description table, with the catch-all annotation
/// for unannotated features always last.
///
#[derive(Debug, Clone)]
pub struct AnnotationCatalog {
    annotations: Vec<String>,
    descriptions: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl Default for AnnotationCatalog {
    fn default() -> Self {
        AnnotationCatalog::new()
    }
}

impl AnnotationCatalog {
    /// A catalog holding only the catch-all annotation.
    pub fn new() -> Self {
        let mut catalog = AnnotationCatalog {
            annotations: Vec::new(),
            descriptions: Vec::new(),
            index: FxHashMap::default(),
        };
        catalog.push(UNANNOTATED, "");
        catalog
    }

    fn push(&mut self, annotation: &str, description: &str) {
        self.index
            .insert(annotation.to_string(), self.annotations.len());
        self.annotations.push(annotation.to_string());
        self.descriptions.push(description.to_string());
    }

    ///
    /// Add an annotation before the catch-all. Known annotations keep their place.
    ///
    pub fn insert(&mut self, annotation: &str, description: &str) {
        if annotation == UNANNOTATED {
            if let Some(last) = self.descriptions.last_mut() {
                *last = description.to_string();
            }
            return;
        }
        if self.index.contains_key(annotation) {
            return;
        }
        // the catch-all is always the last row
        let catch_all = self.annotations.len() - 1;
        self.annotations.insert(catch_all, annotation.to_string());
        self.descriptions.insert(catch_all, description.to_string());
        self.index.insert(annotation.to_string(), catch_all);
        self.index.insert(UNANNOTATED.to_string(), catch_all + 1);
    }

    ///
    /// Read an annotation description table: annotation id, then an optional
    /// free text description.
    ///
    pub fn from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let mut catalog = AnnotationCatalog::new();

        for (line_number, line) in read_data_lines(path)? {
            let (annotation, description) = match line.split_once('\t') {
                Some((annotation, description)) => (annotation.trim(), description.trim()),
                None => (line.trim(), ""),
            };
            if annotation.is_empty() {
                return Err(AbundanceError::malformed(
                    &origin,
                    line_number,
                    &line,
                    "missing annotation id",
                ));
            }
            catalog.insert(annotation, description);
        }

        info!(
            "{} annotations loaded from {}",
            catalog.len() - 1,
            origin
        );
        Ok(catalog)
    }

    pub fn position(&self, annotation: &str) -> Option<usize> {
        self.index.get(annotation).copied()
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn description(&self, annotation: &str) -> Option<&str> {
        self.position(annotation)
            .map(|position| self.descriptions[position].as_str())
    }

    pub fn catch_all(&self) -> usize {
        self.annotations.len() - 1
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

///
/// An annotation x sample matrix.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationMatrix {
    annotations: Vec<String>,
    samples: Vec<String>,
    counts: CountMatrix<f64>,
}

impl AnnotationMatrix {
    ///
    /// Write the matrix as tab separated text, without a size column.
    ///
    /// With `remove_empty`, rows summing to zero are left out. Returns the number
    /// of rows written.
    ///
    pub fn write<W: Write>(&self, mut writer: W, remove_empty: bool) -> Result<usize> {
        let mut header = vec![FEATURES_HEADER];
        header.extend(self.samples.iter().map(String::as_str));
        writeln!(writer, "{}", header.join("\t"))?;

        let mut written = 0;
        for (row, annotation) in self.annotations.iter().enumerate() {
            if remove_empty && self.counts.row_sum(row) == 0.0 {
                continue;
            }
            write_row(&mut writer, &[annotation.as_str()], self.counts.row(row))?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }

    pub fn write_to_file(&self, path: &Path, remove_empty: bool) -> Result<usize> {
        let writer = BufWriter::new(File::create(path)?);
        let written = self.write(writer, remove_empty)?;
        info!("{} rows written to {}", written, path.display());
        Ok(written)
    }

    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn counts(&self) -> &CountMatrix<f64> {
        &self.counts
    }
}

///
/// Collapses feature matrices into annotation matrices.
///
/// Missing mappings and undescribed annotations are reported once each over the
/// whole run, however many matrices are rolled up.
///
pub struct AnnotationRollup<'a> {
    mapping: &'a FeatureAnnotationMap,
    catalog: &'a AnnotationCatalog,
    missing_features: FxHashSet<String>,
    missing_annotations: FxHashSet<String>,
}

impl<'a> AnnotationRollup<'a> {
    pub fn new(mapping: &'a FeatureAnnotationMap, catalog: &'a AnnotationCatalog) -> Self {
        AnnotationRollup {
            mapping,
            catalog,
            missing_features: FxHashSet::default(),
            missing_annotations: FxHashSet::default(),
        }
    }

    /// Row of the output matrix a feature accumulates into, if any.
    fn target_row(&mut self, feature: &str) -> Option<usize> {
        let Some(annotation) = self.mapping.get(feature) else {
            if self.missing_features.insert(feature.to_string()) {
                warn!(
                    "Feature '{}' has no annotation mapping, excluded from the annotation matrices",
                    feature
                );
            }
            return None;
        };

        match self.catalog.position(annotation) {
            Some(position) => {
                debug!(
                    "{} -> {} ({})",
                    feature,
                    annotation,
                    self.catalog.description(annotation).unwrap_or_default()
                );
                Some(position)
            }
            None => {
                if self.missing_annotations.insert(annotation.to_string()) {
                    warn!(
                        "Annotation '{}' is absent from the annotation descriptions, its features are excluded",
                        annotation
                    );
                }
                None
            }
        }
    }

    ///
    /// Sum the rows of a feature matrix per annotation.
    ///
    pub fn roll_up(&mut self, features: &FeatureMatrix) -> Result<AnnotationMatrix> {
        let samples = features.samples().to_vec();
        let mut counts = CountMatrix::new(self.catalog.len(), samples.len());

        for (row, feature) in features.features().iter().enumerate() {
            let Some(target) = self.target_row(feature) else {
                continue;
            };
            for (col, &value) in features.counts().row(row).iter().enumerate() {
                counts.add(target, col, value).map_err(AbundanceError::Shape)?;
            }
        }

        Ok(AnnotationMatrix {
            annotations: self.catalog.annotations().to_vec(),
            samples,
            counts,
        })
    }

    /// Features without an annotation mapping seen so far.
    pub fn missing_features(&self) -> usize {
        self.missing_features.len()
    }

    /// Mapped annotations without a description seen so far.
    pub fn missing_annotations(&self) -> usize {
        self.missing_annotations.len()
    }
}
