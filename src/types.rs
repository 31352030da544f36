use crate::error::ScoringError;
use crate::util::parse_f64_safe;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

#[derive(Debug, Deserialize)]
pub struct RawTehsilRow {
    #[serde(rename = "Tehsil")]
    pub tehsil: Option<String>,
    #[serde(rename = "Population_2023")]
    pub population: Option<String>,
    #[serde(rename = "Area_SqKm")]
    pub area_sq_km: Option<String>,
    #[serde(rename = "Population_Density")]
    pub population_density: Option<String>,
    #[serde(rename = "Annual_Growth_Rate")]
    pub annual_growth_rate: Option<String>,
    #[serde(rename = "Household_Size", default)]
    pub household_size: Option<String>,
    #[serde(rename = "Lat", default)]
    pub lat: Option<String>,
    #[serde(rename = "Lon", default)]
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSiteRow {
    #[serde(rename = "Tehsil")]
    pub tehsil: Option<String>,
    #[serde(rename = "Site_Name")]
    pub site_name: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: Option<String>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<String>,
    #[serde(rename = "Site_Type", default)]
    pub site_type: Option<String>,
}

/// One tehsil as fed to the scorer. Only `population`, `density`,
/// `growth_rate` and `area` take part in scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionInput {
    pub name: String,
    pub population: f64,
    pub density: f64,
    pub growth_rate: f64,
    pub area: f64,
    pub household_size: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RegionInput {
    pub fn new(
        name: impl Into<String>,
        population: f64,
        density: f64,
        growth_rate: f64,
        area: f64,
    ) -> Self {
        Self {
            name: name.into(),
            population,
            density,
            growth_rate,
            area,
            household_size: None,
            lat: None,
            lon: None,
        }
    }

    /// Build a region from a CSV row, failing on the first required metric
    /// that is absent or unparsable.
    pub fn from_raw(row: &RawTehsilRow) -> Result<Self, ScoringError> {
        let name = row.tehsil.as_deref().unwrap_or("").trim().to_string();
        let required = |value: Option<&str>, field: &'static str| {
            parse_f64_safe(value).ok_or_else(|| ScoringError::MissingField {
                region: name.clone(),
                field,
            })
        };
        let population = required(row.population.as_deref(), "Population_2023")?;
        let density = required(row.population_density.as_deref(), "Population_Density")?;
        let growth_rate = required(row.annual_growth_rate.as_deref(), "Annual_Growth_Rate")?;
        let area = required(row.area_sq_km.as_deref(), "Area_SqKm")?;
        Ok(Self {
            population,
            density,
            growth_rate,
            area,
            household_size: parse_f64_safe(row.household_size.as_deref()),
            lat: parse_f64_safe(row.lat.as_deref()),
            lon: parse_f64_safe(row.lon.as_deref()),
            name,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    PopulationDensity,
    GrowthRate,
    Accessibility,
    EconomicActivity,
    Infrastructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

// Canonical keys plus the short aliases accepted in weight maps.
static CRITERION_KEYS: Lazy<HashMap<&'static str, Criterion>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for c in Criterion::ALL {
        m.insert(c.key(), c);
    }
    m.insert("density", Criterion::PopulationDensity);
    m.insert("growth", Criterion::GrowthRate);
    m
});

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::PopulationDensity,
        Criterion::GrowthRate,
        Criterion::Accessibility,
        Criterion::EconomicActivity,
        Criterion::Infrastructure,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Criterion::PopulationDensity => "population_density",
            Criterion::GrowthRate => "growth_rate",
            Criterion::Accessibility => "accessibility",
            Criterion::EconomicActivity => "economic_activity",
            Criterion::Infrastructure => "infrastructure",
        }
    }

    pub fn from_key(key: &str) -> Option<Criterion> {
        CRITERION_KEYS.get(key.trim()).copied()
    }

    /// Accessibility uses area as an inverse proxy: smaller tehsils score higher.
    pub fn direction(self) -> Direction {
        match self {
            Criterion::Accessibility => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Criterion::PopulationDensity => "Population Density",
            Criterion::GrowthRate => "Growth Rate",
            Criterion::Accessibility => "Accessibility",
            Criterion::EconomicActivity => "Economic Activity",
            Criterion::Infrastructure => "Infrastructure",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Weight per criterion. A criterion without an entry weighs nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriteriaWeights {
    pub population_density: f64,
    pub growth_rate: f64,
    pub accessibility: f64,
    pub economic_activity: f64,
    pub infrastructure: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            population_density: 0.30,
            growth_rate: 0.20,
            accessibility: 0.25,
            economic_activity: 0.15,
            infrastructure: 0.10,
        }
    }
}

impl CriteriaWeights {
    pub fn zero() -> Self {
        Self {
            population_density: 0.0,
            growth_rate: 0.0,
            accessibility: 0.0,
            economic_activity: 0.0,
            infrastructure: 0.0,
        }
    }

    /// Unknown keys are ignored. Values are not validated here; the scorer
    /// rejects negative or non-finite weights.
    pub fn from_map<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut weights = Self::zero();
        for (key, value) in entries {
            if let Some(c) = Criterion::from_key(key) {
                weights.set(c, value);
            }
        }
        weights
    }

    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::PopulationDensity => self.population_density,
            Criterion::GrowthRate => self.growth_rate,
            Criterion::Accessibility => self.accessibility,
            Criterion::EconomicActivity => self.economic_activity,
            Criterion::Infrastructure => self.infrastructure,
        }
    }

    pub fn set(&mut self, criterion: Criterion, value: f64) {
        match criterion {
            Criterion::PopulationDensity => self.population_density = value,
            Criterion::GrowthRate => self.growth_rate = value,
            Criterion::Accessibility => self.accessibility = value,
            Criterion::EconomicActivity => self.economic_activity = value,
            Criterion::Infrastructure => self.infrastructure = value,
        }
    }

    pub fn total(&self) -> f64 {
        Criterion::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriterionScores {
    pub density: f64,
    pub growth: f64,
    pub accessibility: f64,
    pub economic: f64,
    pub infrastructure: f64,
}

impl CriterionScores {
    pub fn get(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::PopulationDensity => self.density,
            Criterion::GrowthRate => self.growth,
            Criterion::Accessibility => self.accessibility,
            Criterion::EconomicActivity => self.economic,
            Criterion::Infrastructure => self.infrastructure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionResult {
    pub name: String,
    pub economic_activity: f64,
    pub scores: CriterionScores,
    pub composite: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSite {
    pub tehsil: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub site_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    HighPriority,
    MediumPriority,
    FutureConsideration,
}

impl Recommendation {
    pub fn for_score(score: f64) -> Self {
        if score > 70.0 {
            Recommendation::HighPriority
        } else if score > 50.0 {
            Recommendation::MediumPriority
        } else {
            Recommendation::FutureConsideration
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recommendation::HighPriority => "High Priority",
            Recommendation::MediumPriority => "Medium Priority",
            Recommendation::FutureConsideration => "Future Consideration",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecommendation {
    pub site: CandidateSite,
    pub tehsil_rank: usize,
    pub tehsil_score: f64,
    pub site_score: f64,
    pub population_served: f64,
    pub growth_potential: f64,
    pub recommendation: Recommendation,
}

/// The district-wide aggregate row carried alongside tehsil rows in the census table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictTotals {
    pub name: String,
    pub population: f64,
    pub area: f64,
    pub density: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TehsilRankingRow {
    #[serde(rename = "Priority_Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Tehsil")]
    #[tabled(rename = "Tehsil")]
    pub tehsil: String,
    #[serde(rename = "Population_2023")]
    #[tabled(rename = "Population")]
    pub population: String,
    #[serde(rename = "Population_Density")]
    #[tabled(rename = "Density")]
    pub density: String,
    #[serde(rename = "Annual_Growth_Rate")]
    #[tabled(rename = "Growth")]
    pub growth_rate: String,
    #[serde(rename = "Area_SqKm")]
    #[tabled(rename = "Area")]
    pub area: String,
    #[serde(rename = "density_score")]
    #[tabled(rename = "DensityScore")]
    pub density_score: String,
    #[serde(rename = "growth_score")]
    #[tabled(rename = "GrowthScore")]
    pub growth_score: String,
    #[serde(rename = "accessibility_score")]
    #[tabled(rename = "AccessScore")]
    pub accessibility_score: String,
    #[serde(rename = "economic_score")]
    #[tabled(rename = "EconScore")]
    pub economic_score: String,
    #[serde(rename = "infrastructure_score")]
    #[tabled(rename = "InfraScore")]
    pub infrastructure_score: String,
    #[serde(rename = "composite_score")]
    #[tabled(rename = "Composite")]
    pub composite_score: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SiteRecommendationRow {
    #[serde(rename = "Site_Name")]
    #[tabled(rename = "Site")]
    pub site_name: String,
    #[serde(rename = "Tehsil")]
    #[tabled(rename = "Tehsil")]
    pub tehsil: String,
    #[serde(rename = "Priority_Rank")]
    #[tabled(rename = "Rank")]
    pub priority_rank: usize,
    #[serde(rename = "Site_Type")]
    #[tabled(rename = "Type")]
    pub site_type: String,
    #[serde(rename = "Latitude")]
    #[tabled(skip)]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    #[tabled(skip)]
    pub longitude: f64,
    #[serde(rename = "Tehsil_Score")]
    #[tabled(rename = "TehsilScore")]
    pub tehsil_score: String,
    #[serde(rename = "Site_Score")]
    #[tabled(rename = "SiteScore")]
    pub site_score: String,
    #[serde(rename = "Population_Served")]
    #[tabled(rename = "Population")]
    pub population_served: String,
    #[serde(rename = "Growth_Potential")]
    #[tabled(skip)]
    pub growth_potential: String,
    #[serde(rename = "Recommendation")]
    #[tabled(rename = "Recommendation")]
    pub recommendation: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub generated_at: String,
    pub total_tehsils: usize,
    pub total_sites: usize,
    pub total_population: f64,
    pub top_tehsil: Option<String>,
    pub top_tehsil_score: Option<f64>,
    pub top_site: Option<String>,
    pub high_priority_sites: usize,
    pub weights: CriteriaWeights,
    pub degenerate_criteria: Vec<Criterion>,
    pub unmatched_sites: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, pop: Option<&str>) -> RawTehsilRow {
        RawTehsilRow {
            tehsil: Some(name.to_string()),
            population: pop.map(str::to_string),
            area_sq_km: Some("214".to_string()),
            population_density: Some("19,268".to_string()),
            annual_growth_rate: Some("2.08".to_string()),
            household_size: None,
            lat: Some("31.52".to_string()),
            lon: None,
        }
    }

    #[test]
    fn test_from_raw_parses_separators() {
        let region = RegionInput::from_raw(&raw("Lahore City", Some("4,123,354"))).unwrap();
        assert_eq!(region.name, "Lahore City");
        assert_eq!(region.population, 4_123_354.0);
        assert_eq!(region.density, 19_268.0);
        assert_eq!(region.lat, Some(31.52));
        assert_eq!(region.lon, None);
    }

    #[test]
    fn test_from_raw_missing_field() {
        let err = RegionInput::from_raw(&raw("Raiwind", None)).unwrap_err();
        assert_eq!(
            err,
            ScoringError::MissingField {
                region: "Raiwind".to_string(),
                field: "Population_2023",
            }
        );
    }

    #[test]
    fn test_weights_from_map_ignores_unknown_keys() {
        let w = CriteriaWeights::from_map([("density", 0.5), ("growth", 0.5), ("parking", 9.0)]);
        assert_eq!(w.population_density, 0.5);
        assert_eq!(w.growth_rate, 0.5);
        assert_eq!(w.accessibility, 0.0);
        assert_eq!(w.total(), 1.0);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((CriteriaWeights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_recommendation_thresholds_are_strict() {
        assert_eq!(Recommendation::for_score(70.1), Recommendation::HighPriority);
        assert_eq!(Recommendation::for_score(70.0), Recommendation::MediumPriority);
        assert_eq!(Recommendation::for_score(50.0), Recommendation::FutureConsideration);
        assert_eq!(Recommendation::for_score(0.0), Recommendation::FutureConsideration);
    }

    #[test]
    fn test_criterion_keys_round_trip() {
        for c in Criterion::ALL {
            assert_eq!(Criterion::from_key(c.key()), Some(c));
        }
        assert_eq!(Criterion::direction(Criterion::Accessibility), Direction::LowerIsBetter);
    }
}
