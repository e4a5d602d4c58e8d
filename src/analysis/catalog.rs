//! Pattern catalog with a non-destructive selection mask
//!
//! Records are immutable once imported and keep their import order. Selection
//! lives in a separate bit vector so that masking never adds, removes or
//! reorders rows.

use crate::io::configuration::PROBABILITY_SUM_TOLERANCE;
use crate::io::error::{Result, configuration_error, invalid_source};
use crate::math::codec::{PatternCode, WindowShape, decode_with_shape};
use crate::math::probability::entropy_contribution;
use bitvec::prelude::*;
use ndarray::Array3;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Statistics of a single pattern
#[derive(Clone, Debug, PartialEq)]
pub struct PatternRecord {
    /// Pattern code, unique within a catalog
    pub pattern_value: PatternCode,
    /// Measured or estimated probability
    pub probability: f64,
    /// Information contribution `-p·log2(p)`
    pub entropy: f64,
    /// Share of the catalog's total entropy
    pub entropy_ratio: f64,
    /// Pixel changes between consecutive frames, once computed
    pub velocity: Option<u32>,
}

/// Flat view of one catalog row including geometry and selection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternRow {
    /// Pattern code
    pub pattern_value: PatternCode,
    /// Probability of the pattern
    pub probability: f64,
    /// Entropy contribution
    pub entropy: f64,
    /// Entropy share
    pub entropy_ratio: f64,
    /// Temporal depth of the catalog's windows
    pub time_filter: usize,
    /// Spatial side of the catalog's windows
    pub space_filter: usize,
    /// Whether the row is currently selected
    pub mask: bool,
    /// Temporal change count, if computed
    pub velocity: Option<u32>,
}

/// Ordered collection of pattern records keyed by pattern code
#[derive(Clone, Debug)]
pub struct PatternCatalog {
    shape: WindowShape,
    records: Vec<PatternRecord>,
    mask: BitVec,
    positions: HashMap<PatternCode, usize>,
    total_iterations: Option<f64>,
}

impl PatternCatalog {
    /// Build a catalog from `(code, probability)` pairs in import order
    ///
    /// Entropy and entropy ratio are derived from the probabilities. Every row
    /// starts selected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSourceData` for a probability outside `[0, 1]`, a
    /// duplicated code, or a code that does not fit the window shape.
    pub fn from_probabilities<I>(shape: WindowShape, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (PatternCode, f64)>,
    {
        let mut records = Vec::new();
        let mut positions = HashMap::new();

        for (pattern_value, probability) in entries {
            if !(0.0..=1.0).contains(&probability) {
                return Err(invalid_source(&format!(
                    "pattern {pattern_value} has probability {probability} outside [0, 1]"
                )));
            }
            if pattern_value > shape.max_code() {
                return Err(invalid_source(&format!(
                    "pattern {pattern_value} does not fit a {}x{}x{} window",
                    shape.time(),
                    shape.space(),
                    shape.space()
                )));
            }
            if positions.insert(pattern_value, records.len()).is_some() {
                return Err(invalid_source(&format!(
                    "pattern {pattern_value} appears more than once"
                )));
            }

            records.push(PatternRecord {
                pattern_value,
                probability,
                entropy: entropy_contribution(probability),
                entropy_ratio: 0.0,
                velocity: None,
            });
        }

        let total_entropy: f64 = records.iter().map(|record| record.entropy).sum();
        if total_entropy > 0.0 {
            for record in &mut records {
                record.entropy_ratio = record.entropy / total_entropy;
            }
        }

        let mask = bitvec![1; records.len()];

        Ok(Self {
            shape,
            records,
            mask,
            positions,
            total_iterations: None,
        })
    }

    /// Attach the iteration count reported by a level-count table header
    #[must_use]
    pub fn with_total_iterations(mut self, total_iterations: f64) -> Self {
        self.total_iterations = Some(total_iterations);
        self
    }

    /// Window geometry shared by every row
    pub const fn shape(&self) -> WindowShape {
        self.shape
    }

    /// Iteration count of the source sketch, for estimated catalogs
    pub const fn total_iterations(&self) -> Option<f64> {
        self.total_iterations
    }

    /// Number of rows regardless of selection
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in import order
    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }

    /// Row index of a pattern code
    pub fn position(&self, code: PatternCode) -> Option<usize> {
        self.positions.get(&code).copied()
    }

    /// Flat view of the row at `index`
    pub fn row(&self, index: usize) -> Option<PatternRow> {
        self.records.get(index).map(|record| PatternRow {
            pattern_value: record.pattern_value,
            probability: record.probability,
            entropy: record.entropy,
            entropy_ratio: record.entropy_ratio,
            time_filter: self.shape.time(),
            space_filter: self.shape.space(),
            mask: self.is_selected(index),
            velocity: record.velocity,
        })
    }

    /// Flat views of every row in import order
    pub fn rows(&self) -> impl Iterator<Item = PatternRow> + '_ {
        (0..self.records.len()).filter_map(|index| self.row(index))
    }

    /// Whether the row at `index` is selected
    pub fn is_selected(&self, index: usize) -> bool {
        self.mask.get(index).is_some_and(|bit| *bit)
    }

    /// Set the selection flag of the row at `index`
    ///
    /// Indices past the end are ignored.
    pub fn set_selected(&mut self, index: usize, selected: bool) {
        if index < self.mask.len() {
            self.mask.set(index, selected);
        }
    }

    /// Select or deselect every row
    pub fn set_all_selected(&mut self, selected: bool) {
        self.mask.fill(selected);
    }

    pub(crate) fn set_velocity(&mut self, index: usize, velocity: u32) {
        if let Some(record) = self.records.get_mut(index) {
            record.velocity = Some(velocity);
        }
    }

    fn scoped(&self, masked: bool) -> impl Iterator<Item = &PatternRecord> + '_ {
        self.records
            .iter()
            .zip(self.mask.iter().by_vals())
            .filter(move |&(_, selected)| !masked || selected)
            .map(|(record, _)| record)
    }

    /// Number of rows in scope
    pub fn count(&self, masked: bool) -> usize {
        if masked {
            self.mask.count_ones()
        } else {
            self.records.len()
        }
    }

    /// Probability mass of the rows in scope
    pub fn bandwidth(&self, masked: bool) -> f64 {
        self.scoped(masked).map(|record| record.probability).sum()
    }

    /// Summed entropy contribution of the rows in scope
    pub fn entropy(&self, masked: bool) -> f64 {
        self.scoped(masked).map(|record| record.entropy).sum()
    }

    /// Summed entropy ratio of the rows in scope
    pub fn entropy_ratio(&self, masked: bool) -> f64 {
        self.scoped(masked).map(|record| record.entropy_ratio).sum()
    }

    /// Pattern codes of the rows in scope, in catalog order
    pub fn pattern_values(&self, masked: bool) -> Vec<PatternCode> {
        self.scoped(masked)
            .map(|record| record.pattern_value)
            .collect()
    }

    /// Decoded windows of the rows in scope, in catalog order
    ///
    /// # Errors
    ///
    /// Propagates decoding errors, which cannot occur for codes accepted at
    /// construction.
    pub fn pattern_windows(&self, masked: bool) -> Result<Vec<Array3<u8>>> {
        self.scoped(masked)
            .map(|record| decode_with_shape(record.pattern_value, self.shape))
            .collect()
    }

    /// Selected codes as a lookup set
    pub fn selected_codes(&self) -> HashSet<PatternCode> {
        self.scoped(true).map(|record| record.pattern_value).collect()
    }

    /// Whether all probabilities sum to one within tolerance
    pub fn is_normalized(&self) -> bool {
        (self.bandwidth(false) - 1.0).abs() <= PROBABILITY_SUM_TOLERANCE
    }

    /// Check that the catalog was built for the given window geometry
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the shapes differ.
    pub fn ensure_shape(&self, expected: WindowShape) -> Result<()> {
        if expected == self.shape {
            Ok(())
        } else {
            Err(configuration_error(
                "window_shape",
                &format!("{}x{}", expected.time(), expected.space()),
                &format!(
                    "catalog was built for TimeFilter={} SpaceFilter={}",
                    self.shape.time(),
                    self.shape.space()
                ),
            ))
        }
    }

    /// Run `update` on this catalog or on an independent copy of it
    ///
    /// With `inplace` the catalog itself is mutated and handed back borrowed.
    /// Otherwise a deep copy is mutated and returned owned, leaving the
    /// original (mask included) untouched.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `update`.
    pub fn modify<R, F>(&mut self, inplace: bool, update: F) -> Result<(Cow<'_, Self>, R)>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        if inplace {
            let outcome = update(&mut *self)?;
            Ok((Cow::Borrowed(self), outcome))
        } else {
            let mut copy = self.clone();
            let outcome = update(&mut copy)?;
            Ok((Cow::Owned(copy), outcome))
        }
    }

    /// Aggregate metrics of the rows in scope
    pub fn summary(&self, masked: bool) -> CatalogSummary {
        CatalogSummary {
            masked,
            count: self.count(masked),
            bandwidth: self.bandwidth(masked),
            entropy: self.entropy(masked),
            entropy_ratio: self.entropy_ratio(masked),
        }
    }
}

/// Aggregate metrics of a catalog scope
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogSummary {
    /// Whether only selected rows were considered
    pub masked: bool,
    /// Number of rows
    pub count: usize,
    /// Probability mass
    pub bandwidth: f64,
    /// Summed entropy
    pub entropy: f64,
    /// Summed entropy ratio
    pub entropy_ratio: f64,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = if self.masked { "selected" } else { "total" };
        write!(
            f,
            "{scope} patterns: {}, bandwidth: {:.6}, entropy: {:.6}, entropy ratio: {:.6}",
            self.count, self.bandwidth, self.entropy, self.entropy_ratio
        )
    }
}
