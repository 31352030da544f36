use crate::loader::LoadReport;
use crate::output::markdown_table;
use crate::scoring::DegenerateCriterion;
use crate::sites::SitePlan;
use crate::types::{
    AnalysisSummary, CriteriaWeights, Criterion, DistrictTotals, RegionInput, RegionResult,
    SiteRecommendation, SiteRecommendationRow, TehsilRankingRow,
};
use crate::util::{format_count, format_number, format_percent};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write as _;

fn inputs_by_name(regions: &[RegionInput]) -> HashMap<&str, &RegionInput> {
    regions.iter().map(|r| (r.name.as_str(), r)).collect()
}

pub fn tehsil_rows(results: &[RegionResult], regions: &[RegionInput]) -> Vec<TehsilRankingRow> {
    let inputs = inputs_by_name(regions);
    results
        .iter()
        .map(|r| {
            let input = inputs.get(r.name.as_str());
            TehsilRankingRow {
                rank: r.rank,
                tehsil: r.name.clone(),
                population: input.map(|i| format_count(i.population)).unwrap_or_default(),
                density: input.map(|i| format_number(i.density, 0)).unwrap_or_default(),
                growth_rate: input.map(|i| format_number(i.growth_rate, 2)).unwrap_or_default(),
                area: input.map(|i| format_number(i.area, 0)).unwrap_or_default(),
                density_score: format_number(r.scores.density, 2),
                growth_score: format_number(r.scores.growth, 2),
                accessibility_score: format_number(r.scores.accessibility, 2),
                economic_score: format_number(r.scores.economic, 2),
                infrastructure_score: format_number(r.scores.infrastructure, 2),
                composite_score: format_number(r.composite, 2),
            }
        })
        .collect()
}

pub fn site_rows(recommendations: &[SiteRecommendation]) -> Vec<SiteRecommendationRow> {
    recommendations
        .iter()
        .map(|s| SiteRecommendationRow {
            site_name: s.site.name.clone(),
            tehsil: s.site.tehsil.clone(),
            priority_rank: s.tehsil_rank,
            site_type: s.site.site_type.clone(),
            latitude: s.site.lat,
            longitude: s.site.lon,
            tehsil_score: format_number(s.tehsil_score, 2),
            site_score: format_number(s.site_score, 2),
            population_served: format_count(s.population_served),
            growth_potential: format_number(s.growth_potential, 2),
            recommendation: s.recommendation.label().to_string(),
        })
        .collect()
}

pub fn build_summary(
    results: &[RegionResult],
    regions: &[RegionInput],
    plan: &SitePlan,
    weights: &CriteriaWeights,
    degenerate: &[DegenerateCriterion],
    generated_at: DateTime<Utc>,
) -> AnalysisSummary {
    let top = results.first();
    AnalysisSummary {
        generated_at: generated_at.to_rfc3339(),
        total_tehsils: results.len(),
        total_sites: plan.recommendations.len(),
        total_population: regions.iter().map(|r| r.population).sum(),
        top_tehsil: top.map(|r| r.name.clone()),
        top_tehsil_score: top.map(|r| r.composite),
        top_site: plan.recommendations.first().map(|s| s.site.name.clone()),
        high_priority_sites: plan
            .recommendations
            .iter()
            .filter(|s| s.recommendation == crate::types::Recommendation::HighPriority)
            .count(),
        weights: *weights,
        degenerate_criteria: degenerate.iter().map(|d| d.0).collect(),
        unmatched_sites: plan.unmatched.clone(),
    }
}

/// One line per criterion, e.g. `Population Density: 30%`.
pub fn criteria_lines(weights: &CriteriaWeights) -> Vec<String> {
    Criterion::ALL
        .iter()
        .map(|c| format!("{}: {}", c.label(), format_percent(weights.get(*c))))
        .collect()
}

fn max_by<'a, F>(regions: &'a [RegionInput], key: F) -> Option<&'a RegionInput>
where
    F: Fn(&RegionInput) -> f64,
{
    // First maximum wins on ties.
    regions.iter().fold(None, |best: Option<&RegionInput>, r| match best {
        Some(b) if key(b).partial_cmp(&key(r)) != Some(Ordering::Less) => Some(b),
        _ => Some(r),
    })
}

/// Markdown data summary: district totals, per-tehsil breakdown, key
/// insights and the suitability ranking.
///
/// When the census carried no district aggregate row, totals are summed
/// from the tehsils.
pub fn data_summary_markdown(
    regions: &[RegionInput],
    district: Option<&DistrictTotals>,
    results: &[RegionResult],
) -> String {
    let summed;
    let totals = match district {
        Some(d) => d,
        None => {
            let population: f64 = regions.iter().map(|r| r.population).sum();
            let area: f64 = regions.iter().map(|r| r.area).sum();
            let growth_rate = if population > 0.0 {
                regions.iter().map(|r| r.growth_rate * r.population).sum::<f64>() / population
            } else {
                0.0
            };
            summed = DistrictTotals {
                name: "All Tehsils".to_string(),
                population,
                area,
                density: if area > 0.0 { population / area } else { 0.0 },
                growth_rate,
            };
            &summed
        }
    };

    let mut md = String::new();
    let _ = writeln!(md, "# Lahore EV Charging Station Analysis - Data Summary\n");
    let _ = writeln!(md, "## Population Analysis (2023 Census)");
    let _ = writeln!(md, "- **Total Population**: {}", format_count(totals.population));
    let _ = writeln!(md, "- **Total Area**: {} sq.km", format_number(totals.area, 0));
    let _ = writeln!(
        md,
        "- **Average Density**: {} people/sq.km",
        format_number(totals.density, 0)
    );
    let _ = writeln!(md, "- **Annual Growth Rate**: {}%\n", format_number(totals.growth_rate, 1));

    let _ = writeln!(md, "## Tehsil Analysis");
    for r in regions {
        let share = if totals.population > 0.0 {
            r.population / totals.population * 100.0
        } else {
            0.0
        };
        let _ = writeln!(md, "\n### {}", r.name);
        let _ = writeln!(
            md,
            "- Population: {} ({}% of district)",
            format_count(r.population),
            format_number(share, 1)
        );
        let _ = writeln!(md, "- Density: {} people/sq.km", format_number(r.density, 0));
        let _ = writeln!(md, "- Growth Rate: {}% annually", format_number(r.growth_rate, 1));
        if let Some(h) = r.household_size {
            let _ = writeln!(md, "- Household Size: {} people", format_number(h, 1));
        }
    }

    let _ = writeln!(md, "\n## Key Insights");
    if let Some(r) = max_by(regions, |r| r.density) {
        let _ = writeln!(
            md,
            "1. **Highest Density Area**: {} ({} people/sq.km)",
            r.name,
            format_number(r.density, 0)
        );
    }
    if let Some(r) = max_by(regions, |r| r.growth_rate) {
        let _ = writeln!(
            md,
            "2. **Fastest Growing Area**: {} ({}% annual growth)",
            r.name,
            format_number(r.growth_rate, 1)
        );
    }
    if let Some(r) = max_by(regions, |r| r.population) {
        let _ = writeln!(
            md,
            "3. **Largest Population**: {} ({} people)",
            r.name,
            format_count(r.population)
        );
    }
    if let Some(r) = results.first() {
        let _ = writeln!(
            md,
            "4. **Top Suitability**: {} (composite score {})",
            r.name,
            format_number(r.composite, 1)
        );
    }

    if !results.is_empty() {
        let _ = writeln!(md, "\n## Suitability Ranking\n");
        let _ = writeln!(md, "{}", markdown_table(&tehsil_rows(results, regions), results.len()));
    }
    md
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityLevel {
    Excellent,
    Good,
    Limited,
    Minimal,
}

impl QualityLevel {
    pub fn describe(self) -> &'static str {
        match self {
            QualityLevel::Excellent => "EXCELLENT: rich input data available",
            QualityLevel::Good => "GOOD: decent input data available",
            QualityLevel::Limited => "LIMITED: some input data, consider proxies",
            QualityLevel::Minimal => "MINIMAL: no usable input data",
        }
    }
}

/// Grade the usable tehsil and site records.
pub fn assess_quality(report: &LoadReport, sites_loaded: usize) -> QualityLevel {
    match report.loaded_rows + sites_loaded {
        n if n > 50 => QualityLevel::Excellent,
        n if n > 20 => QualityLevel::Good,
        n if n > 0 => QualityLevel::Limited,
        _ => QualityLevel::Minimal,
    }
}
