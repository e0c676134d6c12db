//! Ordering of scored matches.
//!
//! The best-match order uses a layered, threshold-bucketed comparator: a
//! criterion only decides the order when the difference clears its gap,
//! otherwise the next criterion is consulted. Near-ties therefore fall
//! through to more meaningful signals instead of flipping on noise.

use std::cmp::Ordering;

use internmatch_model::{normalize_key, Match, Profile};
use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;

/// Slack for float noise when comparing ratio differences against a gap.
const RATIO_EPSILON: f32 = 1e-6;

/// User-selectable orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    /// Layered bucketed comparator
    BestMatch,
    /// Composite score, descending
    Score,
    StipendHighToLow,
    StipendLowToHigh,
}

impl Default for SortOption {
    fn default() -> Self {
        Self::BestMatch
    }
}

/// Descending comparison that treats differences within `gap` as ties.
fn bucketed_desc(a: f64, b: f64, gap: f64) -> Ordering {
    if (a - b).abs() > gap {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    } else {
        Ordering::Equal
    }
}

fn same_city(m: &Match, profile_city: Option<&str>) -> bool {
    match (profile_city, m.posting.effective_location()) {
        (Some(wanted), Some(location)) => normalize_key(location.city()) == wanted,
        _ => false,
    }
}

/// Compare two matches for best-match order. `Less` means `a` ranks first.
///
/// `profile_city` is the profile's normalized effective city.
pub fn compare(
    a: &Match,
    b: &Match,
    profile_city: Option<&str>,
    config: &RankingConfig,
) -> Ordering {
    let ra = &a.breakdown;
    let rb = &b.breakdown;

    bucketed_desc(
        f64::from(ra.skill_ratio),
        f64::from(rb.skill_ratio),
        f64::from(config.skill_ratio_gap + RATIO_EPSILON),
    )
    .then_with(|| {
        bucketed_desc(
            f64::from(a.score),
            f64::from(b.score),
            f64::from(config.score_gap),
        )
    })
    .then_with(|| {
        bucketed_desc(
            ra.stipend_amount as f64,
            rb.stipend_amount as f64,
            config.stipend_gap as f64,
        )
    })
    .then_with(|| rb.sector_tier.cmp(&ra.sector_tier))
    .then_with(|| rb.company_tier.cmp(&ra.company_tier))
    .then_with(|| same_city(b, profile_city).cmp(&same_city(a, profile_city)))
    .then_with(|| rb.stipend_amount.cmp(&ra.stipend_amount))
    .then_with(|| a.posting.id.cmp(&b.posting.id))
}

/// Stable merge sort.
///
/// The bucketed comparator is not transitive (a≈b and b≈c does not imply
/// a≈c), and the standard library sorts may panic on such comparators. A
/// plain merge sort never does, and is deterministic for a given input.
fn merge_sort_by<T, F>(mut items: Vec<T>, cmp: &F) -> Vec<T>
where
    F: Fn(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}

/// Order matches best-first for a profile.
pub fn rank(matches: Vec<Match>, profile: &Profile, config: &RankingConfig) -> Vec<Match> {
    let profile_city = profile.effective_location().map(|c| normalize_key(c.city()));
    merge_sort_by(matches, &|a: &Match, b: &Match| {
        compare(a, b, profile_city.as_deref(), config)
    })
}

/// Re-sort already-scored matches. Never rescores.
pub fn sort_matches(
    mut matches: Vec<Match>,
    option: SortOption,
    profile: &Profile,
    config: &RankingConfig,
) -> Vec<Match> {
    let stipend = |m: &Match| m.breakdown.stipend_amount;
    match option {
        SortOption::BestMatch => return rank(matches, profile, config),
        SortOption::Score => matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| stipend(b).cmp(&stipend(a)))
                .then_with(|| a.posting.id.cmp(&b.posting.id))
        }),
        SortOption::StipendHighToLow => matches.sort_by(|a, b| {
            stipend(b)
                .cmp(&stipend(a))
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| a.posting.id.cmp(&b.posting.id))
        }),
        SortOption::StipendLowToHigh => matches.sort_by(|a, b| {
            stipend(a)
                .cmp(&stipend(b))
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| a.posting.id.cmp(&b.posting.id))
        }),
    }
    matches
}
