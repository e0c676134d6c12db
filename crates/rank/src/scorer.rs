//! Composite scoring of a posting against a profile.
//!
//! Scoring is pure: the same profile, posting, corpus statistics and
//! reference data always produce the same outcome. Postings that break a
//! hard rule are rejected outright rather than scored as zero.

use std::collections::BTreeSet;
use std::fmt;

use internmatch_explain::explain;
use internmatch_features::{
    cosine_similarity, estimate_proximity, normalize_key_set, normalize_skill_set, posting_vector,
    profile_vector, CorpusStats,
};
use internmatch_model::{
    CompanyTier, Posting, Profile, Proximity, ScoreBreakdown, SectorTier, WorkMode,
};
use internmatch_reference::ReferenceData;

use crate::config::ScoringConfig;

/// Why a posting was excluded from the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    BelowMinimumStipend { offered: u64, required: u64 },
    NoMatchingSkills,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowMinimumStipend { offered, required } => write!(
                f,
                "below minimum stipend requirement ({} offered, {} required)",
                offered, required
            ),
            Self::NoMatchingSkills => write!(f, "no matching skills"),
        }
    }
}

/// Result of evaluating one posting.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(ScoreBreakdown),
    Rejected(Rejection),
}

/// A non-rejected score with its rationale.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    /// Composite score, 1..=100
    pub value: u8,
    pub explanation: String,
    pub breakdown: ScoreBreakdown,
}

/// Scores postings for one profile.
///
/// Profile-side features (normalized skills, sectors, feature vector) are
/// computed once here and reused for every posting in the pass.
pub struct Scorer<'a> {
    profile: &'a Profile,
    stats: &'a CorpusStats,
    reference: &'a dyn ReferenceData,
    config: &'a ScoringConfig,
    profile_skills: BTreeSet<String>,
    profile_sectors: BTreeSet<String>,
    profile_vector: Vec<f32>,
}

impl<'a> Scorer<'a> {
    pub fn new(
        profile: &'a Profile,
        stats: &'a CorpusStats,
        reference: &'a dyn ReferenceData,
        config: &'a ScoringConfig,
    ) -> Self {
        Self {
            profile,
            stats,
            reference,
            config,
            profile_skills: normalize_skill_set(&profile.skills),
            profile_sectors: normalize_key_set(&profile.interested_sectors),
            profile_vector: profile_vector(profile, stats, reference),
        }
    }

    /// Score a posting, or return `None` if a hard rule rejects it.
    pub fn score(&self, posting: &Posting) -> Option<Scored> {
        match self.evaluate(posting) {
            ScoreOutcome::Scored(breakdown) => Some(Scored {
                value: breakdown.composite(),
                explanation: explain(&breakdown),
                breakdown,
            }),
            ScoreOutcome::Rejected(_) => None,
        }
    }

    /// Apply hard rules, then compute every sub-score.
    pub fn evaluate(&self, posting: &Posting) -> ScoreOutcome {
        let c = self.config;
        let amount = posting.stipend_amount();

        if let Some(required) = self.profile.min_stipend {
            if (amount as f64) < c.min_stipend_ratio * required as f64 {
                return ScoreOutcome::Rejected(Rejection::BelowMinimumStipend {
                    offered: amount,
                    required,
                });
            }
        }

        let required = normalize_skill_set(&posting.required_skills);
        let matched: Vec<String> = required
            .iter()
            .filter(|s| self.profile_skills.contains(*s))
            .cloned()
            .collect();

        if !self.profile_skills.is_empty() && !required.is_empty() && matched.is_empty() {
            return ScoreOutcome::Rejected(Rejection::NoMatchingSkills);
        }

        let mut breakdown = ScoreBreakdown {
            required_skill_count: required.len(),
            stipend_amount: amount,
            ..Default::default()
        };

        self.score_skills(posting, &required, matched, &mut breakdown);
        self.score_stipend(amount, &mut breakdown);
        self.score_location(posting, &mut breakdown);
        self.score_sector(posting, &mut breakdown);
        self.score_company(posting, amount, &mut breakdown);
        self.score_uniqueness(&required, &mut breakdown);

        ScoreOutcome::Scored(breakdown)
    }

    fn score_skills(
        &self,
        posting: &Posting,
        required: &BTreeSet<String>,
        matched: Vec<String>,
        breakdown: &mut ScoreBreakdown,
    ) {
        let c = self.config;

        let ratio = if required.is_empty() {
            c.no_requirement_ratio
        } else {
            matched.len() as f32 / required.len() as f32
        };
        let posting_features = posting_vector(posting, self.stats, self.reference);
        let similarity = cosine_similarity(&self.profile_vector, &posting_features);

        let mut points = ratio * c.skill_ratio_points + similarity * c.similarity_points;
        if !required.is_empty()
            && matched.len() == required.len()
            && required.len() >= c.perfect_match_min_skills
        {
            points += c.perfect_match_bonus;
        }
        if matched.len() >= c.breadth_min_skills {
            points += c.breadth_bonus;
        }

        breakdown.skills = points.min(c.skills_weight);
        breakdown.skill_ratio = ratio;
        breakdown.vector_similarity = similarity;
        breakdown.matched_skills = matched;
    }

    /// Log-normalized against the catalog maximum so a few outliers do not
    /// flatten everyone else.
    fn score_stipend(&self, amount: u64, breakdown: &mut ScoreBreakdown) {
        let c = self.config;
        let max = self.stats.max_stipend;

        let normalized = if max > 0 && amount > 0 {
            ((amount as f64).ln_1p() / (max as f64).ln_1p()).min(1.0) as f32
        } else {
            0.0
        };
        let above_average = self.stats.average_stipend > 0.0
            && amount as f64 > c.above_average_multiplier * self.stats.average_stipend;

        let mut points = normalized * c.stipend_scale_points;
        if above_average {
            points += c.above_average_bonus;
        }

        breakdown.stipend = points.min(c.stipend_weight);
        breakdown.above_average_stipend = above_average;
    }

    fn score_location(&self, posting: &Posting, breakdown: &mut ScoreBreakdown) {
        let proximity = if posting.work_mode == WorkMode::Remote {
            Proximity::Remote
        } else {
            match (self.profile.effective_location(), posting.effective_location()) {
                (Some(from), Some(to)) => estimate_proximity(from, to, self.reference),
                _ => Proximity::Unspecified,
            }
        };

        breakdown.location = proximity.fraction() * self.config.location_weight;
        breakdown.proximity = proximity;
    }

    fn score_sector(&self, posting: &Posting, breakdown: &mut ScoreBreakdown) {
        let c = self.config;
        let tier = posting
            .sector_tags
            .iter()
            .map(|s| self.reference.sector_tier(s))
            .max()
            .unwrap_or_default();
        let interest_match = normalize_key_set(&posting.sector_tags)
            .iter()
            .any(|s| self.profile_sectors.contains(s));

        let mut points = match tier {
            SectorTier::HighDemand => c.high_demand_sector_points,
            SectorTier::ModerateDemand => c.moderate_demand_sector_points,
            SectorTier::Standard => c.standard_sector_points,
        };
        if interest_match {
            points += c.interest_bonus;
        }

        breakdown.sector = points.min(c.sector_weight);
        breakdown.sector_tier = tier;
        breakdown.interest_match = interest_match;
    }

    /// Unlisted employers paying a competitive stipend get a bonus so
    /// startups are not penalized for being absent from the curated lists.
    fn score_company(&self, posting: &Posting, amount: u64, breakdown: &mut ScoreBreakdown) {
        let c = self.config;
        let tier = self.reference.company_tier(&posting.company);
        let competitive_startup = tier == CompanyTier::Unlisted
            && self.stats.average_stipend > 0.0
            && amount as f64 >= c.startup_stipend_multiplier * self.stats.average_stipend;

        let mut points = match tier {
            CompanyTier::TopTier => c.top_tier_points,
            CompanyTier::MidTier => c.mid_tier_points,
            CompanyTier::Recognizable => c.recognizable_points,
            CompanyTier::Unlisted => c.unlisted_points,
        };
        if competitive_startup {
            points += c.startup_bonus;
        }

        breakdown.company = points.min(c.company_weight);
        breakdown.company_tier = tier;
        breakdown.competitive_startup = competitive_startup;
    }

    fn score_uniqueness(&self, required: &BTreeSet<String>, breakdown: &mut ScoreBreakdown) {
        let c = self.config;
        if self.stats.posting_count < c.rarity_min_catalog {
            return;
        }

        let rare: Vec<String> = required
            .iter()
            .filter(|s| self.stats.frequency_of(s) <= c.rare_skill_max_frequency)
            .cloned()
            .collect();
        let uncommon = required
            .iter()
            .any(|s| self.stats.frequency_of(s) <= c.uncommon_skill_max_frequency);

        breakdown.uniqueness = if !rare.is_empty() {
            c.uniqueness_weight
        } else if uncommon {
            c.uncommon_skill_points.min(c.uniqueness_weight)
        } else {
            0.0
        };
        breakdown.rare_skills = rare;
    }
}

/// Score a single posting for a profile.
///
/// Convenience over [`Scorer`] for one-off calls; batch callers should build
/// the scorer once per pass.
pub fn score(
    profile: &Profile,
    posting: &Posting,
    stats: &CorpusStats,
    reference: &dyn ReferenceData,
    config: &ScoringConfig,
) -> Option<Scored> {
    Scorer::new(profile, stats, reference, config).score(posting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use internmatch_reference::ReferenceTables;

    fn catalog() -> Vec<Posting> {
        vec![
            Posting::new("1", "Data Intern", "Acme Analytics")
                .with_skills(&["Python", "SQL", "Java"])
                .with_sectors(&["Data Science"])
                .with_location("Delhi")
                .with_stipend("₹15,000"),
            Posting::new("2", "Java Intern", "Globex")
                .with_skills(&["Java"])
                .with_location("Remote")
                .with_stipend("₹20,000"),
        ]
    }

    fn build_stats(postings: &[Posting]) -> CorpusStats {
        CorpusStats::build(postings, &ReferenceTables::builtin())
    }

    fn evaluate(profile: &Profile, posting: &Posting, stats: &CorpusStats) -> ScoreOutcome {
        let tables = ReferenceTables::builtin();
        let config = ScoringConfig::default();
        Scorer::new(profile, stats, &tables, &config).evaluate(posting)
    }

    #[test]
    fn test_rejects_disjoint_skills() {
        let postings = catalog();
        let stats = build_stats(&postings);
        let profile = Profile::new().with_skills(&["Python", "SQL"]);
        assert_eq!(
            evaluate(&profile, &postings[1], &stats),
            ScoreOutcome::Rejected(Rejection::NoMatchingSkills)
        );
    }

    #[test]
    fn test_rejects_low_stipend() {
        let postings = catalog();
        let stats = build_stats(&postings);
        // 15,000 < 0.7 * 25,000
        let profile = Profile::new().with_skills(&["Python"]).with_min_stipend(25000);
        assert_eq!(
            evaluate(&profile, &postings[0], &stats),
            ScoreOutcome::Rejected(Rejection::BelowMinimumStipend {
                offered: 15000,
                required: 25000
            })
        );

        // 15,000 >= 0.7 * 20,000 survives
        let lenient = Profile::new().with_skills(&["Python"]).with_min_stipend(20000);
        assert!(matches!(
            evaluate(&lenient, &postings[0], &stats),
            ScoreOutcome::Scored(_)
        ));
    }

    #[test]
    fn test_empty_profile_skills_skip_rejection() {
        let postings = catalog();
        let stats = build_stats(&postings);
        let profile = Profile::new();
        match evaluate(&profile, &postings[1], &stats) {
            ScoreOutcome::Scored(b) => {
                assert_eq!(b.skill_ratio, 0.0);
                assert!(b.composite() >= 1);
            }
            other => panic!("expected a score, got {:?}", other),
        }
    }

    #[test]
    fn test_breakdown_fields() {
        let postings = catalog();
        let stats = build_stats(&postings);
        let profile = Profile::new()
            .with_skills(&["python", "sql"])
            .with_sectors(&["data science"])
            .with_location("Delhi");
        let ScoreOutcome::Scored(b) = evaluate(&profile, &postings[0], &stats) else {
            panic!("expected a score");
        };

        assert_eq!(b.matched_skills, vec!["python", "sql"]);
        assert_eq!(b.required_skill_count, 3);
        assert!((b.skill_ratio - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(b.proximity, Proximity::SameCity);
        assert_eq!(b.sector_tier, SectorTier::HighDemand);
        assert!(b.interest_match);
        assert_eq!(b.sector, 10.0);
        assert_eq!(b.company_tier, CompanyTier::Unlisted);
        assert!(b.vector_similarity > 0.0);
        // every skill appears in at most two postings
        assert_eq!(b.uniqueness, 5.0);
        assert_eq!(b.rare_skills, vec!["java", "python", "sql"]);
    }

    #[test]
    fn test_stipend_is_log_normalized() {
        let postings = vec![
            Posting::new("low", "A", "X").with_stipend("₹10,000"),
            Posting::new("outlier", "B", "Y").with_stipend("₹10,00,000"),
        ];
        let stats = build_stats(&postings);
        let profile = Profile::new();
        let ScoreOutcome::Scored(low) = evaluate(&profile, &postings[0], &stats) else {
            panic!("expected a score");
        };
        // linear would give 16 * 0.01; log keeps it well above half the scale
        assert!(low.stipend > 10.0);
        assert!(!low.above_average_stipend);
    }

    #[test]
    fn test_no_required_skills_uses_neutral_ratio() {
        let postings = vec![Posting::new("1", "Generalist", "X").with_stipend("₹5,000")];
        let stats = build_stats(&postings);
        let profile = Profile::new().with_skills(&["Python"]);
        let ScoreOutcome::Scored(b) = evaluate(&profile, &postings[0], &stats) else {
            panic!("expected a score");
        };
        assert_eq!(b.skill_ratio, 0.5);
        assert_eq!(b.required_skill_count, 0);
    }

    #[test]
    fn test_perfect_match_bonus_and_startup_bonus() {
        let postings = vec![
            Posting::new("1", "Full Stack", "Tiny Startup")
                .with_skills(&["JS", "React", "Node"])
                .with_stipend("₹40,000"),
            Posting::new("2", "Other", "Y").with_stipend("₹10,000"),
        ];
        let stats = build_stats(&postings);
        let profile = Profile::new().with_skills(&["JavaScript", "ReactJS", "Node.js"]);
        let ScoreOutcome::Scored(b) = evaluate(&profile, &postings[0], &stats) else {
            panic!("expected a score");
        };
        assert_eq!(b.skill_ratio, 1.0);
        // 28 ratio + 4 perfect + some similarity
        assert!(b.skills > 32.0);
        assert!(b.competitive_startup);
        assert_eq!(b.company, 5.0);
        assert!(b.above_average_stipend);
        assert_eq!(b.stipend, 20.0);
    }

    #[test]
    fn test_rarity_with_large_catalog() {
        let mut postings: Vec<Posting> = (0..12)
            .map(|i| Posting::new(i.to_string(), "Web", "X").with_skills(&["HTML"]))
            .collect();
        postings.push(Posting::new("rare", "Compiler", "Y").with_skills(&["HTML", "LLVM"]));
        let stats = build_stats(&postings);
        let profile = Profile::new().with_skills(&["HTML"]);

        let ScoreOutcome::Scored(rare) = evaluate(&profile, &postings[12], &stats) else {
            panic!("expected a score");
        };
        assert_eq!(rare.rare_skills, vec!["llvm"]);
        assert_eq!(rare.uniqueness, 5.0);

        let ScoreOutcome::Scored(common) = evaluate(&profile, &postings[0], &stats) else {
            panic!("expected a score");
        };
        assert_eq!(common.uniqueness, 0.0);
    }

    #[test]
    fn test_rarity_in_small_catalog() {
        let postings = vec![
            Posting::new("plain", "Web", "X").with_skills(&["Python"]),
            Posting::new("rare", "Compiler", "Y").with_skills(&["Python", "LLVM"]),
        ];
        let stats = build_stats(&postings);
        let profile = Profile::new().with_skills(&["Python"]);
        let ScoreOutcome::Scored(b) = evaluate(&profile, &postings[1], &stats) else {
            panic!("expected a score");
        };
        assert_eq!(b.rare_skills, vec!["llvm", "python"]);
        assert_eq!(b.uniqueness, 5.0);
    }

    #[test]
    fn test_rarity_gate_is_configurable() {
        let postings = vec![Posting::new("rare", "Compiler", "Y").with_skills(&["LLVM"])];
        let stats = build_stats(&postings);
        let tables = ReferenceTables::builtin();
        let config = ScoringConfig {
            rarity_min_catalog: 10,
            ..Default::default()
        };
        let profile = Profile::new().with_skills(&["LLVM"]);
        let scorer = Scorer::new(&profile, &stats, &tables, &config);
        let ScoreOutcome::Scored(b) = scorer.evaluate(&postings[0]) else {
            panic!("expected a score");
        };
        assert_eq!(b.uniqueness, 0.0);
        assert!(b.rare_skills.is_empty());
    }

    #[test]
    fn test_remote_work_mode_counts_as_remote() {
        let postings = vec![Posting::new("1", "A", "X")
            .with_location("Chennai")
            .with_work_mode(WorkMode::Remote)];
        let stats = build_stats(&postings);
        let profile = Profile::new().with_location("Delhi");
        let ScoreOutcome::Scored(b) = evaluate(&profile, &postings[0], &stats) else {
            panic!("expected a score");
        };
        assert_eq!(b.proximity, Proximity::Remote);
        assert_eq!(b.location, 15.0);
    }

    #[test]
    fn test_score_wrapper_explains() {
        let postings = catalog();
        let stats = build_stats(&postings);
        let tables = ReferenceTables::builtin();
        let profile = Profile::new().with_skills(&["Python", "SQL"]).with_location("Delhi");
        let scored = score(&profile, &postings[0], &stats, &tables, &ScoringConfig::default())
            .expect("posting should not be rejected");
        assert!((1..=100).contains(&scored.value));
        assert!(scored.explanation.starts_with("2/3 skills match."));
        assert!(scored.explanation.contains("Great location match."));

        assert!(score(&profile, &postings[1], &stats, &tables, &ScoringConfig::default()).is_none());
    }
}
