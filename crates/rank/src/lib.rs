//! Scoring and ranking for internship matches.
//!
//! Takes a profile and a posting catalog and produces an ordered,
//! explained list of matches:
//! - `scorer`: hard rejections and the composite 0-100 score
//! - `ranker`: threshold-bucketed best-match ordering and sort options
//! - `session`: explicit recompute-vs-refilter state transitions

pub mod config;
pub mod ranker;
pub mod scorer;
pub mod session;

pub use config::{MatchConfig, RankingConfig, ScoringConfig};
pub use ranker::{compare, rank, sort_matches, SortOption};
pub use scorer::{score, Rejection, ScoreOutcome, Scored, Scorer};
pub use session::MatchSession;

use internmatch_explain::{annotate_recommended, derive_tags, explain};
use internmatch_features::CorpusStats;
use internmatch_model::{Match, Posting, Profile};
use internmatch_reference::ReferenceData;

/// Score every posting in catalog order, dropping rejected ones.
pub fn score_catalog(
    profile: &Profile,
    catalog: &[Posting],
    stats: &CorpusStats,
    reference: &dyn ReferenceData,
    config: &ScoringConfig,
) -> Vec<Match> {
    let scorer = Scorer::new(profile, stats, reference, config);
    let mut rejected = 0_usize;

    let matches: Vec<Match> = catalog
        .iter()
        .filter_map(|posting| match scorer.evaluate(posting) {
            ScoreOutcome::Scored(breakdown) => Some(Match {
                posting: posting.clone(),
                score: breakdown.composite(),
                explanation: explain(&breakdown),
                tags: derive_tags(&breakdown, posting),
                breakdown,
            }),
            ScoreOutcome::Rejected(reason) => {
                tracing::debug!(posting = %posting.id, %reason, "posting rejected");
                rejected += 1;
                None
            }
        })
        .collect();

    tracing::info!(
        catalog = catalog.len(),
        matched = matches.len(),
        rejected,
        reference = reference.name(),
        "scored catalog"
    );

    matches
}

/// Score, rank and annotate a catalog for a profile.
pub fn match_postings(
    profile: &Profile,
    catalog: &[Posting],
    stats: &CorpusStats,
    reference: &dyn ReferenceData,
    config: &MatchConfig,
) -> Vec<Match> {
    let scored = score_catalog(profile, catalog, stats, reference, &config.scoring);
    let mut ranked = rank(scored, profile, &config.ranking);
    annotate_recommended(&mut ranked, &config.recommend);
    ranked
}
