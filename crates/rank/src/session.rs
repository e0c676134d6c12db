//! Explicit state transitions for an interactive matching session.
//!
//! Each transition does only the work it needs:
//! - `catalog_refreshed`: rebuild corpus statistics and rescore
//! - `profile_submitted`: rescore
//! - `sort_changed`: re-sort already-scored matches
//! - `filters_changed`: nothing is recomputed; `visible` filters lazily

use internmatch_features::CorpusStats;
use internmatch_filter::{apply_filters, FilterState};
use internmatch_model::{Match, Posting, Profile};
use internmatch_reference::ReferenceData;

use crate::config::MatchConfig;
use crate::match_postings;
use crate::ranker::{sort_matches, SortOption};

/// Caller-side holder of the current catalog, profile and view settings.
pub struct MatchSession<R: ReferenceData> {
    reference: R,
    config: MatchConfig,
    catalog: Vec<Posting>,
    stats: CorpusStats,
    profile: Option<Profile>,
    /// Best-match order, as produced by the last scoring pass
    ranked: Vec<Match>,
    /// `ranked` under the current sort option
    sorted: Vec<Match>,
    sort: SortOption,
    filters: FilterState,
    rescore_count: usize,
}

impl<R: ReferenceData> MatchSession<R> {
    pub fn new(reference: R, config: MatchConfig) -> Self {
        Self {
            reference,
            config,
            catalog: Vec::new(),
            stats: CorpusStats::default(),
            profile: None,
            ranked: Vec::new(),
            sorted: Vec::new(),
            sort: SortOption::default(),
            filters: FilterState::default(),
            rescore_count: 0,
        }
    }

    /// Replace the catalog. Rebuilds statistics and rescores.
    pub fn catalog_refreshed(&mut self, catalog: Vec<Posting>) {
        tracing::debug!(postings = catalog.len(), "catalog refreshed");
        self.stats = CorpusStats::build(&catalog, &self.reference);
        self.catalog = catalog;
        self.rescore();
    }

    /// Replace the profile. Rescores against the cached statistics.
    pub fn profile_submitted(&mut self, profile: Profile) {
        tracing::debug!(skills = profile.skills.len(), "profile submitted");
        self.profile = Some(profile);
        self.rescore();
    }

    /// Change the ordering of the scored list without rescoring.
    pub fn sort_changed(&mut self, sort: SortOption) {
        tracing::debug!(?sort, "sort changed");
        self.sort = sort;
        self.resort();
    }

    /// Change the filter selections. Scores and order are untouched.
    pub fn filters_changed(&mut self, filters: FilterState) {
        tracing::debug!(?filters, "filters changed");
        self.filters = filters;
    }

    /// Matches passing the current filters, in the current sort order.
    pub fn visible(&self) -> Vec<&Match> {
        apply_filters(&self.sorted, &self.filters)
    }

    /// Every scored match in the current sort order, ignoring filters.
    pub fn matches(&self) -> &[Match] {
        &self.sorted
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    /// Number of full scoring passes run so far.
    pub fn rescore_count(&self) -> usize {
        self.rescore_count
    }

    fn rescore(&mut self) {
        let Some(profile) = &self.profile else {
            self.ranked.clear();
            self.sorted.clear();
            return;
        };

        self.ranked = match_postings(
            profile,
            &self.catalog,
            &self.stats,
            &self.reference,
            &self.config,
        );
        self.rescore_count += 1;
        self.resort();
    }

    fn resort(&mut self) {
        self.sorted = match (&self.profile, self.sort) {
            (Some(_), SortOption::BestMatch) | (None, _) => self.ranked.clone(),
            (Some(profile), sort) => {
                sort_matches(self.ranked.clone(), sort, profile, &self.config.ranking)
            }
        };
    }
}
