//! Multi-criteria suitability scoring for tehsils.
//!
//! Each criterion is min-max scaled to `0..=100` across the batch, combined
//! into a weighted composite and ranked. The scorer is a pure function: it
//! does no I/O and keeps no state between calls.

use crate::error::ScoringError;
use crate::types::{
    CriteriaWeights, Criterion, CriterionScores, Direction, RegionInput, RegionResult,
};
use std::collections::HashSet;

/// Score given to every region on a criterion whose values are all equal.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Non-fatal: a criterion had zero range across the batch and was scored
/// neutrally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegenerateCriterion(pub Criterion);

#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    /// Ordered by rank.
    pub results: Vec<RegionResult>,
    pub degenerate: Vec<DegenerateCriterion>,
}

/// `population * density / 1e6`: a proxy combining absolute size and
/// concentration.
pub fn economic_activity(region: &RegionInput) -> f64 {
    region.population * region.density / 1_000_000.0
}

/// Min-max scale `values` to `0..=100`.
///
/// Returns `None` when max equals min, or when any value is not finite.
pub fn normalize(values: &[f64], direction: Direction) -> Option<Vec<f64>> {
    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let (mut min, mut max) = (f64::MAX, f64::MIN);
    for v in values {
        min = min.min(*v);
        max = max.max(*v);
    }
    // Halved operands keep `max - min` finite for extreme finite inputs.
    let half_range = max / 2.0 - min / 2.0;
    if !(half_range > 0.0) {
        return None;
    }
    let scaled = values
        .iter()
        .map(|v| {
            let offset = match direction {
                Direction::HigherIsBetter => v / 2.0 - min / 2.0,
                Direction::LowerIsBetter => max / 2.0 - v / 2.0,
            };
            (offset / half_range * 100.0).clamp(0.0, 100.0)
        })
        .collect();
    Some(scaled)
}

/// Score and rank `regions`. See [`score_detailed`].
pub fn score(
    regions: &[RegionInput],
    weights: &CriteriaWeights,
) -> Result<Vec<RegionResult>, ScoringError> {
    score_detailed(regions, weights).map(|card| card.results)
}

/// Score and rank `regions`, also reporting criteria that collapsed to the
/// neutral score.
///
/// Infrastructure has no raw metric of its own and reuses the density
/// score. Ties in the composite keep input order.
pub fn score_detailed(
    regions: &[RegionInput],
    weights: &CriteriaWeights,
) -> Result<Scorecard, ScoringError> {
    validate(regions, weights)?;

    let economic: Vec<f64> = regions.iter().map(economic_activity).collect();
    let mut degenerate = Vec::new();
    let mut column = |criterion: Criterion, values: Vec<f64>| {
        match normalize(&values, criterion.direction()) {
            Some(scaled) => scaled,
            None => {
                degenerate.push(DegenerateCriterion(criterion));
                vec![NEUTRAL_SCORE; values.len()]
            }
        }
    };

    let density = column(
        Criterion::PopulationDensity,
        regions.iter().map(|r| r.density).collect(),
    );
    let growth = column(
        Criterion::GrowthRate,
        regions.iter().map(|r| r.growth_rate).collect(),
    );
    let accessibility = column(
        Criterion::Accessibility,
        regions.iter().map(|r| r.area).collect(),
    );
    let economic_scores = column(Criterion::EconomicActivity, economic.clone());
    if degenerate.contains(&DegenerateCriterion(Criterion::PopulationDensity)) {
        degenerate.push(DegenerateCriterion(Criterion::Infrastructure));
    }

    let mut scored: Vec<RegionResult> = regions
        .iter()
        .enumerate()
        .map(|(i, region)| {
            let scores = CriterionScores {
                density: density[i],
                growth: growth[i],
                accessibility: accessibility[i],
                economic: economic_scores[i],
                infrastructure: density[i],
            };
            let composite: f64 = Criterion::ALL
                .iter()
                .map(|c| scores.get(*c) * weights.get(*c))
                .sum();
            RegionResult {
                name: region.name.clone(),
                economic_activity: economic[i],
                scores,
                composite,
                rank: 0,
            }
        })
        .collect();

    // `sort_by` is stable, so equal composites keep input order.
    scored.sort_by(|a, b| b.composite.total_cmp(&a.composite));
    for (idx, r) in scored.iter_mut().enumerate() {
        r.rank = idx + 1;
    }

    Ok(Scorecard {
        results: scored,
        degenerate,
    })
}

fn validate(regions: &[RegionInput], weights: &CriteriaWeights) -> Result<(), ScoringError> {
    if regions.is_empty() {
        return Err(ScoringError::NoRegions);
    }
    for criterion in Criterion::ALL {
        let weight = weights.get(criterion);
        if !weight.is_finite() || weight < 0.0 {
            return Err(ScoringError::InvalidWeight { criterion, weight });
        }
    }
    let mut seen = HashSet::new();
    for (index, region) in regions.iter().enumerate() {
        if region.name.trim().is_empty() {
            return Err(ScoringError::UnnamedRegion { index });
        }
        if !seen.insert(region.name.as_str()) {
            return Err(ScoringError::DuplicateRegion(region.name.clone()));
        }
        let fields = [
            ("population", region.population),
            ("density", region.density),
            ("growth_rate", region.growth_rate),
            ("area", region.area),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ScoringError::NonFiniteValue {
                    region: region.name.clone(),
                    field,
                    value,
                });
            }
        }
        // Finite inputs can still overflow the derived metric.
        let economic = economic_activity(region);
        if !economic.is_finite() {
            return Err(ScoringError::NonFiniteValue {
                region: region.name.clone(),
                field: "economic_activity",
                value: economic,
            });
        }
    }
    Ok(())
}
