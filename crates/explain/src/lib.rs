//! Explanation generation for internship matches.
//!
//! Converts a score breakdown into a short human-readable rationale and a
//! set of qualitative tags suitable for display next to each match.

use internmatch_model::{
    CompanyTier, Match, MatchTag, Posting, Proximity, ScoreBreakdown, SectorTier, WorkMode,
};
use serde::{Deserialize, Serialize};

/// Controls which top-ranked matches receive the `AiRecommended` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendConfig {
    /// How many leading matches may be tagged
    pub count: usize,
    /// Minimum composite score to be tagged
    pub min_score: u8,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            count: 3,
            min_score: 60,
        }
    }
}

/// Build the rationale sentence list for a breakdown.
///
/// Each clause comes from a sub-score that cleared a notable threshold. The
/// result is never empty.
pub fn explain(breakdown: &ScoreBreakdown) -> String {
    let mut parts: Vec<String> = Vec::new();

    if breakdown.required_skill_count > 0 {
        parts.push(format!(
            "{}/{} skills match.",
            breakdown.matched_skills.len(),
            breakdown.required_skill_count
        ));
    } else {
        parts.push("No specific skills required.".to_string());
    }

    match breakdown.proximity {
        Proximity::Remote => parts.push("Remote-friendly.".to_string()),
        Proximity::SameCity | Proximity::Within50Km => {
            parts.push("Great location match.".to_string())
        }
        Proximity::Within200Km => parts.push("Nearby location.".to_string()),
        _ => {}
    }

    if breakdown.above_average_stipend {
        parts.push("Above-average stipend.".to_string());
    }

    match breakdown.sector_tier {
        SectorTier::HighDemand => parts.push("High-demand sector.".to_string()),
        SectorTier::ModerateDemand => parts.push("Growing sector.".to_string()),
        SectorTier::Standard => {}
    }
    if breakdown.interest_match {
        parts.push("Matches your interests.".to_string());
    }

    match breakdown.company_tier {
        CompanyTier::TopTier | CompanyTier::MidTier => parts.push("Reputed company.".to_string()),
        CompanyTier::Recognizable => parts.push("Well-known employer.".to_string()),
        CompanyTier::Unlisted if breakdown.competitive_startup => {
            parts.push("Competitive startup.".to_string())
        }
        CompanyTier::Unlisted => {}
    }

    if !breakdown.rare_skills.is_empty() {
        parts.push(format!("Rare skills: {}.", breakdown.rare_skills.join(", ")));
    }

    parts.join(" ")
}

/// Derive qualitative tags from a breakdown.
///
/// `AiRecommended` is not derived here; it depends on rank position and is
/// applied by [`annotate_recommended`].
pub fn derive_tags(breakdown: &ScoreBreakdown, posting: &Posting) -> Vec<MatchTag> {
    let mut tags = Vec::new();

    if breakdown.required_skill_count > 0
        && breakdown.matched_skills.len() == breakdown.required_skill_count
    {
        tags.push(MatchTag::PerfectSkillMatch);
    }
    if breakdown.above_average_stipend {
        tags.push(MatchTag::HighStipend);
    }
    if matches!(
        breakdown.proximity,
        Proximity::SameCity | Proximity::Within50Km
    ) {
        tags.push(MatchTag::GreatLocation);
    }
    if breakdown.proximity == Proximity::Remote || posting.work_mode == WorkMode::Remote {
        tags.push(MatchTag::RemoteFriendly);
    }
    if breakdown.company_tier == CompanyTier::TopTier {
        tags.push(MatchTag::TopCompany);
    }
    if breakdown.sector_tier == SectorTier::HighDemand {
        tags.push(MatchTag::HighDemandSector);
    }
    if !breakdown.rare_skills.is_empty() {
        tags.push(MatchTag::RareSkills);
    }

    tags
}

/// Tag the leading matches of an already-ranked list as recommended.
///
/// Only the first `config.count` positions are considered, and only those
/// scoring at least `config.min_score` are tagged.
pub fn annotate_recommended(matches: &mut [Match], config: &RecommendConfig) {
    for m in matches.iter_mut().take(config.count) {
        if m.score >= config.min_score {
            m.add_tag(MatchTag::AiRecommended);
        }
    }
}

/// One-line verdict for a match.
pub fn summarize_match(m: &Match) -> String {
    let level = if m.score >= 75 {
        "STRONG MATCH"
    } else if m.score >= 50 {
        "GOOD MATCH"
    } else {
        "PARTIAL MATCH"
    };

    if m.tags.is_empty() {
        format!("{} ({})", level, m.score)
    } else {
        format!("{} ({}): {}", level, m.score, m.tag_labels().join(", "))
    }
}
