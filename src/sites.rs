//! Site-level recommendations derived from tehsil scores.

use crate::error::InvalidJitter;
use crate::types::{CandidateSite, Recommendation, RegionInput, RegionResult, SiteRecommendation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Per-site score offset drawn uniformly from `[-amplitude, amplitude]`.
///
/// With zero amplitude no randomness is drawn and every site gets its
/// tehsil's score unchanged.
pub struct SiteJitter {
    amplitude: f64,
    rng: StdRng,
}

impl SiteJitter {
    pub fn none() -> Self {
        Self {
            amplitude: 0.0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn seeded(amplitude: f64, seed: u64) -> Result<Self, InvalidJitter> {
        Ok(Self {
            amplitude: check_amplitude(amplitude)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Seeded from the OS; output differs between runs.
    pub fn unseeded(amplitude: f64) -> Result<Self, InvalidJitter> {
        Ok(Self {
            amplitude: check_amplitude(amplitude)?,
            rng: StdRng::from_os_rng(),
        })
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    fn offset(&mut self) -> f64 {
        if self.amplitude > 0.0 {
            self.rng.random_range(-self.amplitude..=self.amplitude)
        } else {
            0.0
        }
    }
}

/// The sampled interval `[-a, a]` has width `2a`, which must stay finite.
fn check_amplitude(amplitude: f64) -> Result<f64, InvalidJitter> {
    if amplitude.is_finite() && amplitude >= 0.0 && (2.0 * amplitude).is_finite() {
        Ok(amplitude)
    } else {
        Err(InvalidJitter(amplitude))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitePlan {
    /// Ordered by site score, best first.
    pub recommendations: Vec<SiteRecommendation>,
    /// Sites whose tehsil was not scored.
    pub unmatched: Vec<String>,
}

/// Attach each candidate site to its scored tehsil and rank the sites.
///
/// Sites are visited in tehsil rank order, then in input order, so a seeded
/// jitter draws the same offset for the same site on every run.
pub fn recommend_sites(
    results: &[RegionResult],
    regions: &[RegionInput],
    sites: &[CandidateSite],
    jitter: &mut SiteJitter,
) -> SitePlan {
    let inputs: HashMap<&str, &RegionInput> =
        regions.iter().map(|r| (r.name.as_str(), r)).collect();
    let mut by_tehsil: HashMap<&str, Vec<&CandidateSite>> = HashMap::new();
    for site in sites {
        by_tehsil.entry(site.tehsil.as_str()).or_default().push(site);
    }

    let mut recommendations = Vec::new();
    for result in results {
        let Some(tehsil_sites) = by_tehsil.remove(result.name.as_str()) else {
            continue;
        };
        let input = inputs.get(result.name.as_str());
        for site in tehsil_sites {
            let site_score = (result.composite + jitter.offset()).max(0.0);
            recommendations.push(SiteRecommendation {
                site: site.clone(),
                tehsil_rank: result.rank,
                tehsil_score: result.composite,
                site_score,
                population_served: input.map(|r| r.population).unwrap_or(0.0),
                growth_potential: input.map(|r| r.growth_rate).unwrap_or(0.0),
                recommendation: Recommendation::for_score(site_score),
            });
        }
    }
    recommendations.sort_by(|a, b| b.site_score.total_cmp(&a.site_score));

    let unmatched = sites
        .iter()
        .filter(|s| by_tehsil.contains_key(s.tehsil.as_str()))
        .map(|s| s.name.clone())
        .collect();

    SitePlan {
        recommendations,
        unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::score;
    use crate::types::CriteriaWeights;

    fn regions() -> Vec<RegionInput> {
        vec![
            RegionInput::new("Lahore City", 4_123_354.0, 19_268.0, 2.08, 214.0),
            RegionInput::new("Shalimar", 2_670_140.0, 9_817.0, 2.66, 272.0),
            RegionInput::new("Raiwind", 1_080_637.0, 2_314.0, 4.12, 467.0),
        ]
    }

    fn site(tehsil: &str, name: &str) -> CandidateSite {
        CandidateSite {
            tehsil: tehsil.to_string(),
            name: name.to_string(),
            lat: 31.5,
            lon: 74.3,
            site_type: "Commercial".to_string(),
        }
    }

    fn sites() -> Vec<CandidateSite> {
        vec![
            site("Raiwind", "Raiwind Road Commercial"),
            site("Lahore City", "Liberty Market Area"),
            site("Shalimar", "GT Road Commercial"),
            site("Lahore City", "Mall Road Business District"),
            site("Gulberg", "Nowhere Plaza"),
        ]
    }

    #[test]
    fn test_no_jitter_inherits_tehsil_score() {
        let regions = regions();
        let results = score(&regions, &CriteriaWeights::default()).unwrap();
        let plan = recommend_sites(&results, &regions, &sites(), &mut SiteJitter::none());

        assert_eq!(plan.recommendations.len(), 4);
        for rec in &plan.recommendations {
            assert_eq!(rec.site_score, rec.tehsil_score);
            assert_eq!(rec.recommendation, Recommendation::for_score(rec.site_score));
        }
        assert_eq!(plan.recommendations[0].site.name, "Liberty Market Area");
        assert_eq!(plan.recommendations[1].site.name, "Mall Road Business District");
        assert_eq!(plan.recommendations[0].tehsil_rank, 1);
        assert_eq!(plan.recommendations[0].population_served, 4_123_354.0);
    }

    #[test]
    fn test_unmatched_sites_are_reported() {
        let regions = regions();
        let results = score(&regions, &CriteriaWeights::default()).unwrap();
        let plan = recommend_sites(&results, &regions, &sites(), &mut SiteJitter::none());
        assert_eq!(plan.unmatched, vec!["Nowhere Plaza".to_string()]);
    }

    #[test]
    fn test_seeded_jitter_is_reproducible_and_bounded() {
        let regions = regions();
        let results = score(&regions, &CriteriaWeights::default()).unwrap();
        let mut first = SiteJitter::seeded(5.0, 42).unwrap();
        let mut second = SiteJitter::seeded(5.0, 42).unwrap();
        let a = recommend_sites(&results, &regions, &sites(), &mut first);
        let b = recommend_sites(&results, &regions, &sites(), &mut second);
        assert_eq!(a, b);
        for rec in &a.recommendations {
            assert!(rec.site_score >= 0.0);
            assert!(rec.site_score <= rec.tehsil_score + 5.0);
            assert!(rec.site_score >= (rec.tehsil_score - 5.0).max(0.0));
        }
    }

    #[test]
    fn test_site_score_floors_at_zero() {
        let regions = regions();
        let results = score(&regions, &CriteriaWeights::default()).unwrap();
        let mut jitter = SiteJitter::seeded(1000.0, 7).unwrap();
        let plan = recommend_sites(&results, &regions, &sites(), &mut jitter);
        assert!(plan.recommendations.iter().all(|r| r.site_score >= 0.0));
    }

    #[test]
    fn test_rejects_unsampleable_amplitudes() {
        for amplitude in [f64::INFINITY, f64::NAN, 1e308, f64::MAX, -5.0] {
            assert!(SiteJitter::seeded(amplitude, 1).is_err(), "{amplitude}");
            assert!(SiteJitter::unseeded(amplitude).is_err(), "{amplitude}");
        }
        assert_eq!(SiteJitter::seeded(-5.0, 1).err(), Some(InvalidJitter(-5.0)));
    }

    #[test]
    fn test_large_finite_amplitude_is_sampled() {
        let regions = regions();
        let results = score(&regions, &CriteriaWeights::default()).unwrap();
        let mut jitter = SiteJitter::seeded(1e307, 3).unwrap();
        let plan = recommend_sites(&results, &regions, &sites(), &mut jitter);
        assert_eq!(plan.recommendations.len(), 4);
        assert!(plan.recommendations.iter().all(|r| r.site_score.is_finite()));
    }

    #[test]
    fn test_zero_amplitude_is_accepted() {
        let jitter = SiteJitter::seeded(0.0, 9).unwrap();
        assert_eq!(jitter.amplitude(), 0.0);
    }
}
