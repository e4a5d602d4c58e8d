//! Bandwidth- and count-bounded pattern selection
//!
//! Every strategy is a single greedy pass over the catalog rows ordered by
//! probability, with ties broken by ascending pattern code. A row is accepted
//! only if it keeps every cap satisfied; otherwise it is skipped and the walk
//! continues with the next row. The resulting choice replaces the catalog's
//! mask, rows are never removed.

use crate::analysis::catalog::PatternCatalog;
use crate::io::configuration::CAP_ROUNDING_ULPS;
use crate::io::error::{Result, configuration_error};
use crate::math::codec::WindowShape;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Caps shared by all selection strategies
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionLimits {
    max_bandwidth: f64,
    max_count: usize,
    shape: Option<WindowShape>,
}

impl SelectionLimits {
    /// Validate the bandwidth ceiling `Max_W` and count ceiling `Max_N`
    ///
    /// # Errors
    ///
    /// Returns `Configuration` unless `0 < max_bandwidth <= 1` and
    /// `max_count >= 1`.
    pub fn new(max_bandwidth: f64, max_count: usize) -> Result<Self> {
        if !(max_bandwidth > 0.0 && max_bandwidth <= 1.0) {
            return Err(configuration_error(
                "max_bandwidth",
                &max_bandwidth,
                &"must lie in (0, 1]",
            ));
        }
        if max_count == 0 {
            return Err(configuration_error(
                "max_count",
                &max_count,
                &"must be at least 1",
            ));
        }

        Ok(Self {
            max_bandwidth,
            max_count,
            shape: None,
        })
    }

    /// Require the catalog to have been built for this window geometry
    #[must_use]
    pub const fn with_shape(mut self, shape: WindowShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Bandwidth ceiling `Max_W`
    pub const fn max_bandwidth(&self) -> f64 {
        self.max_bandwidth
    }

    /// Count ceiling `Max_N`
    pub const fn max_count(&self) -> usize {
        self.max_count
    }

    /// Expected window geometry, if any
    pub const fn shape(&self) -> Option<WindowShape> {
        self.shape
    }

    fn check(&self, catalog: &PatternCatalog) -> Result<()> {
        match self.shape {
            Some(shape) => catalog.ensure_shape(shape),
            None => Ok(()),
        }
    }
}

/// Available selection strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SelectionStrategy {
    /// Most probable first, bounded by bandwidth and count
    Heuristic,
    /// Rarest first, bounded by bandwidth, count and the heuristic's entropy
    RariMatchInfo,
    /// Most common first, bounded by bandwidth, count and the heuristic's entropy
    ComuniMatchInfo,
    /// Rarest first, bounded by bandwidth and count
    #[value(name = "rari-match-n-w")]
    RariMatchNW,
    /// Most common first, bounded by bandwidth and count
    #[value(name = "comuni-match-n-w")]
    ComuniMatchNW,
}

impl SelectionStrategy {
    /// All strategies in a fixed order
    pub const ALL: [Self; 5] = [
        Self::Heuristic,
        Self::RariMatchInfo,
        Self::ComuniMatchInfo,
        Self::RariMatchNW,
        Self::ComuniMatchNW,
    ];

    const fn order(self) -> ProbabilityOrder {
        match self {
            Self::Heuristic | Self::ComuniMatchInfo | Self::ComuniMatchNW => {
                ProbabilityOrder::Descending
            }
            Self::RariMatchInfo | Self::RariMatchNW => ProbabilityOrder::Ascending,
        }
    }

    const fn matches_information(self) -> bool {
        matches!(self, Self::RariMatchInfo | Self::ComuniMatchInfo)
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heuristic => "heuristic",
            Self::RariMatchInfo => "rari-match-info",
            Self::ComuniMatchInfo => "comuni-match-info",
            Self::RariMatchNW => "rari-match-n-w",
            Self::ComuniMatchNW => "comuni-match-n-w",
        };
        f.write_str(name)
    }
}

/// Walk direction over probabilities
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbabilityOrder {
    /// Rarest patterns first
    Ascending,
    /// Most common patterns first
    Descending,
}

/// Result of a selection pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// Rows accepted into the selection
    pub selected: usize,
    /// Rows rejected by one of the caps
    pub skipped: usize,
}

/// Row indices sorted by probability, ties by ascending pattern code
pub fn ordered_indices(catalog: &PatternCatalog, order: ProbabilityOrder) -> Vec<usize> {
    let records = catalog.records();
    let mut indices: Vec<usize> = (0..records.len()).collect();

    indices.sort_by(|&a, &b| match (records.get(a), records.get(b)) {
        (Some(ra), Some(rb)) => {
            let by_probability = match order {
                ProbabilityOrder::Ascending => ra.probability.total_cmp(&rb.probability),
                ProbabilityOrder::Descending => rb.probability.total_cmp(&ra.probability),
            };
            by_probability.then(ra.pattern_value.cmp(&rb.pattern_value))
        }
        _ => Ordering::Equal,
    });

    indices
}

/// Whether a running sum of `terms` non-negative values stays under `cap`
///
/// The sum may exceed `cap` only by the worst-case rounding error of adding
/// `terms` values in floating point, a few ULPs per term. Any larger excess
/// is a real overshoot.
pub fn within_cap(total: f64, cap: f64, terms: usize) -> bool {
    let magnitude = total.abs().max(cap.abs());
    let slack = CAP_ROUNDING_ULPS * terms.max(1) as f64 * f64::EPSILON * magnitude;
    total <= cap + slack
}

struct Plan {
    chosen: Vec<usize>,
    skipped: usize,
}

fn plan(
    catalog: &PatternCatalog,
    order: ProbabilityOrder,
    limits: &SelectionLimits,
    entropy_cap: Option<f64>,
) -> Plan {
    let records = catalog.records();
    let mut chosen = Vec::new();
    let mut skipped = 0;
    let mut bandwidth = 0.0;
    let mut entropy = 0.0;

    for index in ordered_indices(catalog, order) {
        let Some(record) = records.get(index) else {
            continue;
        };

        let terms = chosen.len() + 1;
        let fits = chosen.len() < limits.max_count
            && within_cap(bandwidth + record.probability, limits.max_bandwidth, terms)
            && entropy_cap.is_none_or(|cap| within_cap(entropy + record.entropy, cap, terms));

        if fits {
            chosen.push(index);
            bandwidth += record.probability;
            entropy += record.entropy;
        } else {
            skipped += 1;
        }
    }

    Plan { chosen, skipped }
}

fn commit(catalog: &mut PatternCatalog, plan: &Plan) -> SelectionOutcome {
    catalog.set_all_selected(false);
    for &index in &plan.chosen {
        catalog.set_selected(index, true);
    }

    SelectionOutcome {
        selected: plan.chosen.len(),
        skipped: plan.skipped,
    }
}

/// Entropy retained by the heuristic selection under the same caps
///
/// Summed in catalog order, so it equals `entropy(masked = true)` of the
/// heuristic's result.
pub fn reference_entropy(catalog: &PatternCatalog, limits: &SelectionLimits) -> f64 {
    let mut chosen = plan(catalog, ProbabilityOrder::Descending, limits, None).chosen;
    chosen.sort_unstable();

    let records = catalog.records();
    chosen
        .iter()
        .filter_map(|&index| records.get(index))
        .map(|record| record.entropy)
        .sum()
}

/// Run a strategy on the catalog's own mask
///
/// # Errors
///
/// Returns `Configuration` if the limits require a different window geometry.
pub fn select(
    catalog: &mut PatternCatalog,
    strategy: SelectionStrategy,
    limits: &SelectionLimits,
) -> Result<SelectionOutcome> {
    limits.check(catalog)?;

    let entropy_cap = if strategy.matches_information() {
        let target = reference_entropy(catalog, limits);
        if target <= 0.0 {
            catalog.set_all_selected(false);
            tracing::debug!(%strategy, target, "reference entropy is empty, nothing selected");
            return Ok(SelectionOutcome::default());
        }
        Some(target)
    } else {
        None
    };

    let plan = plan(catalog, strategy.order(), limits, entropy_cap);
    let outcome = commit(catalog, &plan);

    tracing::debug!(
        %strategy,
        selected = outcome.selected,
        skipped = outcome.skipped,
        bandwidth = catalog.bandwidth(true),
        entropy = catalog.entropy(true),
        "selection applied"
    );

    Ok(outcome)
}

/// Run a strategy on an independent copy, leaving `catalog` untouched
///
/// Only needs shared access, so several strategies may run on one catalog
/// concurrently.
///
/// # Errors
///
/// Returns `Configuration` if the limits require a different window geometry.
pub fn select_copy(
    catalog: &PatternCatalog,
    strategy: SelectionStrategy,
    limits: &SelectionLimits,
) -> Result<(PatternCatalog, SelectionOutcome)> {
    let mut copy = catalog.clone();
    let outcome = select(&mut copy, strategy, limits)?;
    Ok((copy, outcome))
}

/// Run a strategy in place or on an independent copy
///
/// Returns the resulting catalog and the number of skipped rows.
///
/// # Errors
///
/// Returns `Configuration` if the limits require a different window geometry.
pub fn apply<'a>(
    catalog: &'a mut PatternCatalog,
    strategy: SelectionStrategy,
    limits: &SelectionLimits,
    inplace: bool,
) -> Result<(Cow<'a, PatternCatalog>, usize)> {
    let (target, outcome) =
        catalog.modify(inplace, |target| select(target, strategy, limits))?;
    Ok((target, outcome.skipped))
}

/// Most probable patterns first under bandwidth `max_bandwidth` and count `max_count`
///
/// # Errors
///
/// Returns `Configuration` for caps outside their valid ranges.
pub fn apply_heuristic(
    catalog: &mut PatternCatalog,
    max_bandwidth: f64,
    max_count: usize,
    inplace: bool,
) -> Result<Cow<'_, PatternCatalog>> {
    let limits = SelectionLimits::new(max_bandwidth, max_count)?;
    apply(catalog, SelectionStrategy::Heuristic, &limits, inplace).map(|(target, _)| target)
}

/// Rarest patterns first, matching the heuristic's entropy
///
/// # Errors
///
/// Returns `Configuration` for caps outside their valid ranges.
pub fn apply_rari_match_info(
    catalog: &mut PatternCatalog,
    max_bandwidth: f64,
    max_count: usize,
    inplace: bool,
) -> Result<(Cow<'_, PatternCatalog>, usize)> {
    let limits = SelectionLimits::new(max_bandwidth, max_count)?;
    apply(catalog, SelectionStrategy::RariMatchInfo, &limits, inplace)
}

/// Most common patterns first, matching the heuristic's entropy
///
/// # Errors
///
/// Returns `Configuration` for caps outside their valid ranges.
pub fn apply_comuni_match_info(
    catalog: &mut PatternCatalog,
    max_bandwidth: f64,
    max_count: usize,
    inplace: bool,
) -> Result<(Cow<'_, PatternCatalog>, usize)> {
    let limits = SelectionLimits::new(max_bandwidth, max_count)?;
    apply(catalog, SelectionStrategy::ComuniMatchInfo, &limits, inplace)
}

/// Rarest patterns first under bandwidth and count only
///
/// # Errors
///
/// Returns `Configuration` for caps outside their valid ranges.
pub fn apply_rari_match_n_w(
    catalog: &mut PatternCatalog,
    max_bandwidth: f64,
    max_count: usize,
    inplace: bool,
) -> Result<(Cow<'_, PatternCatalog>, usize)> {
    let limits = SelectionLimits::new(max_bandwidth, max_count)?;
    apply(catalog, SelectionStrategy::RariMatchNW, &limits, inplace)
}

/// Most common patterns first under bandwidth and count only
///
/// # Errors
///
/// Returns `Configuration` for caps outside their valid ranges.
pub fn apply_comuni_match_n_w(
    catalog: &mut PatternCatalog,
    max_bandwidth: f64,
    max_count: usize,
    inplace: bool,
) -> Result<(Cow<'_, PatternCatalog>, usize)> {
    let limits = SelectionLimits::new(max_bandwidth, max_count)?;
    apply(catalog, SelectionStrategy::ComuniMatchNW, &limits, inplace)
}
