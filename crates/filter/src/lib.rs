//! Post-ranking filters over matches.
//!
//! Filters remove rows from an already-ranked list; they never rescore or
//! reorder. Every predicate is pure and selections compose with AND, so
//! applying the same `FilterState` twice yields the same subset.

use std::collections::BTreeSet;

use internmatch_features::{normalize_key_set, normalize_skill_set};
use internmatch_model::{EducationLevel, Match, WorkMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Unknown work mode: {0}")]
    UnknownWorkMode(String),
    #[error("Unknown education level: {0}")]
    UnknownEducationLevel(String),
    #[error("Score threshold out of range: {0} (expected 0-100)")]
    ScoreOutOfRange(u8),
}

/// User-chosen hard constraints. Empty or absent selections pass everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    /// Posting must carry at least one of these sector tags
    pub sectors: Vec<String>,
    /// Posting must require at least one of these skills
    pub skills: Vec<String>,
    pub work_mode: Option<WorkMode>,
    /// Posting must accept this level (or state no preference)
    pub education: Option<EducationLevel>,
    pub min_stipend: Option<u64>,
    pub min_score: Option<u8>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter state from raw user selections.
    pub fn from_selections(
        sectors: &[String],
        skills: &[String],
        work_mode: Option<&str>,
        education: Option<&str>,
        min_stipend: Option<u64>,
        min_score: Option<u8>,
    ) -> Result<Self, FilterError> {
        let work_mode = work_mode.map(parse_work_mode).transpose()?;
        let education = education
            .map(|e| {
                EducationLevel::parse(e).ok_or_else(|| FilterError::UnknownEducationLevel(e.into()))
            })
            .transpose()?;
        if let Some(score) = min_score {
            if score > 100 {
                return Err(FilterError::ScoreOutOfRange(score));
            }
        }

        Ok(Self {
            sectors: sectors.to_vec(),
            skills: skills.to_vec(),
            work_mode,
            education,
            min_stipend,
            min_score,
        })
    }

    pub fn with_sectors(mut self, sectors: &[&str]) -> Self {
        self.sectors = sectors.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_work_mode(mut self, mode: WorkMode) -> Self {
        self.work_mode = Some(mode);
        self
    }

    pub fn with_education(mut self, level: EducationLevel) -> Self {
        self.education = Some(level);
        self
    }

    pub fn with_min_stipend(mut self, amount: u64) -> Self {
        self.min_stipend = Some(amount);
        self
    }

    pub fn with_min_score(mut self, score: u8) -> Self {
        self.min_score = Some(score);
        self
    }

    /// True when no constraint is selected.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compile selections into normalized form once per filtering pass.
    fn compile(&self) -> CompiledFilter<'_> {
        CompiledFilter {
            state: self,
            sectors: normalize_key_set(&self.sectors),
            skills: normalize_skill_set(&self.skills),
        }
    }

    /// Check a single match against every selection.
    pub fn matches(&self, m: &Match) -> bool {
        self.compile().matches(m)
    }
}

struct CompiledFilter<'a> {
    state: &'a FilterState,
    sectors: BTreeSet<String>,
    skills: BTreeSet<String>,
}

impl CompiledFilter<'_> {
    fn matches(&self, m: &Match) -> bool {
        self.sector_ok(m)
            && self.skill_ok(m)
            && self.work_mode_ok(m)
            && self.education_ok(m)
            && self.stipend_ok(m)
            && self.score_ok(m)
    }

    fn sector_ok(&self, m: &Match) -> bool {
        self.sectors.is_empty()
            || normalize_key_set(&m.posting.sector_tags)
                .iter()
                .any(|s| self.sectors.contains(s))
    }

    fn skill_ok(&self, m: &Match) -> bool {
        self.skills.is_empty()
            || normalize_skill_set(&m.posting.required_skills)
                .iter()
                .any(|s| self.skills.contains(s))
    }

    fn work_mode_ok(&self, m: &Match) -> bool {
        self.state
            .work_mode
            .map_or(true, |mode| m.posting.work_mode == mode)
    }

    fn education_ok(&self, m: &Match) -> bool {
        let preferred = &m.posting.preferred_education_levels;
        self.state
            .education
            .map_or(true, |level| preferred.is_empty() || preferred.contains(&level))
    }

    fn stipend_ok(&self, m: &Match) -> bool {
        self.state
            .min_stipend
            .map_or(true, |min| m.posting.stipend_amount() >= min)
    }

    fn score_ok(&self, m: &Match) -> bool {
        self.state.min_score.map_or(true, |min| m.score >= min)
    }
}

/// Parse a user-facing work mode selection.
pub fn parse_work_mode(text: &str) -> Result<WorkMode, FilterError> {
    match WorkMode::from(text) {
        WorkMode::Unspecified => Err(FilterError::UnknownWorkMode(text.to_string())),
        mode => Ok(mode),
    }
}

/// Keep the matches that pass every selection, preserving order.
pub fn apply_filters<'a>(matches: &'a [Match], filters: &FilterState) -> Vec<&'a Match> {
    let compiled = filters.compile();
    matches.iter().filter(|m| compiled.matches(m)).collect()
}
