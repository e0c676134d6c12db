//! Tunable constants for scoring and ranking.
//!
//! Every heuristic threshold lives here as a named field. All structs
//! deserialize with defaults, so a JSON override only needs the fields it
//! changes.

use internmatch_explain::RecommendConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Reject when stipend < ratio * profile minimum
    pub min_stipend_ratio: f64,

    /// Skills band maximum
    pub skills_weight: f32,
    /// Points for a full matched/required ratio
    pub skill_ratio_points: f32,
    /// Ratio assumed when a posting lists no required skills
    pub no_requirement_ratio: f32,
    /// Points for full cosine similarity of feature vectors
    pub similarity_points: f32,
    /// Bonus for matching every required skill when at least
    /// `perfect_match_min_skills` are required
    pub perfect_match_bonus: f32,
    pub perfect_match_min_skills: usize,
    /// Bonus when at least `breadth_min_skills` skills matched
    pub breadth_bonus: f32,
    pub breadth_min_skills: usize,

    /// Stipend band maximum
    pub stipend_weight: f32,
    /// Points for the log-normalized stipend
    pub stipend_scale_points: f32,
    /// Bonus when stipend exceeds `above_average_multiplier` * average
    pub above_average_bonus: f32,
    pub above_average_multiplier: f64,

    /// Location band maximum
    pub location_weight: f32,

    /// Sector band maximum
    pub sector_weight: f32,
    pub high_demand_sector_points: f32,
    pub moderate_demand_sector_points: f32,
    pub standard_sector_points: f32,
    pub interest_bonus: f32,

    /// Company band maximum
    pub company_weight: f32,
    pub top_tier_points: f32,
    pub mid_tier_points: f32,
    pub recognizable_points: f32,
    pub unlisted_points: f32,
    /// Bonus for unlisted employers paying >= `startup_stipend_multiplier` * average
    pub startup_bonus: f32,
    pub startup_stipend_multiplier: f64,

    /// Uniqueness band maximum
    pub uniqueness_weight: f32,
    /// A skill required by at most this many postings is rare
    pub rare_skill_max_frequency: usize,
    /// A skill required by at most this many postings is uncommon
    pub uncommon_skill_max_frequency: usize,
    pub uncommon_skill_points: f32,
    /// Skip the uniqueness band for catalogs smaller than this; 0 disables
    /// the gate
    pub rarity_min_catalog: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_stipend_ratio: 0.7,

            skills_weight: 40.0,
            skill_ratio_points: 28.0,
            no_requirement_ratio: 0.5,
            similarity_points: 6.0,
            perfect_match_bonus: 4.0,
            perfect_match_min_skills: 3,
            breadth_bonus: 2.0,
            breadth_min_skills: 4,

            stipend_weight: 20.0,
            stipend_scale_points: 16.0,
            above_average_bonus: 4.0,
            above_average_multiplier: 1.5,

            location_weight: 15.0,

            sector_weight: 10.0,
            high_demand_sector_points: 6.0,
            moderate_demand_sector_points: 4.0,
            standard_sector_points: 2.0,
            interest_bonus: 4.0,

            company_weight: 10.0,
            top_tier_points: 10.0,
            mid_tier_points: 8.0,
            recognizable_points: 6.0,
            unlisted_points: 3.0,
            startup_bonus: 2.0,
            startup_stipend_multiplier: 1.2,

            uniqueness_weight: 5.0,
            rare_skill_max_frequency: 2,
            uncommon_skill_max_frequency: 5,
            uncommon_skill_points: 2.5,
            rarity_min_catalog: 0,
        }
    }
}

/// Thresholds for the bucketed ranking comparator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingConfig {
    /// Skill ratios closer than this are treated as tied
    pub skill_ratio_gap: f32,
    /// Composite scores closer than this are treated as tied
    pub score_gap: u8,
    /// Stipends closer than this are treated as tied
    pub stipend_gap: u64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            skill_ratio_gap: 0.15,
            score_gap: 3,
            stipend_gap: 2000,
        }
    }
}

/// Everything a matching pass needs to know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfig {
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub recommend: RecommendConfig,
}

impl MatchConfig {
    /// Parse a partial JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands_sum_to_hundred() {
        let c = ScoringConfig::default();
        let total = c.skills_weight
            + c.stipend_weight
            + c.location_weight
            + c.sector_weight
            + c.company_weight
            + c.uniqueness_weight;
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_override() {
        let config =
            MatchConfig::from_json(r#"{"ranking": {"stipendGap": 100}, "recommend": {"count": 5}}"#)
                .unwrap();
        assert_eq!(config.ranking.stipend_gap, 100);
        assert_eq!(config.ranking.score_gap, 3);
        assert_eq!(config.recommend.count, 5);
        assert_eq!(config.recommend.min_score, 60);
        assert_eq!(config.scoring, ScoringConfig::default());
    }
}
