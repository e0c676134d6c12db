//! Catalog-wide statistics used for normalization.
//!
//! Built once per catalog load and passed by reference to every scoring
//! call, so per-candidate scoring never rescans the catalog.

use std::collections::{BTreeMap, BTreeSet};

use internmatch_model::Posting;
use internmatch_reference::ReferenceData;
use serde::Serialize;

use crate::geo::city_key;
use crate::{normalize_key_set, normalize_skill_set};

/// Aggregate facts about a posting catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusStats {
    /// Sorted, deduplicated normalized skills
    pub all_skills: Vec<String>,
    /// Sorted, deduplicated normalized sector tags
    pub all_sectors: Vec<String>,
    /// Sorted, deduplicated canonical city keys (aliases folded)
    pub all_locations: Vec<String>,
    /// Largest stipend among postings paying more than zero
    pub max_stipend: u64,
    /// Mean stipend among postings paying more than zero
    pub average_stipend: f64,
    /// Number of postings requiring each normalized skill
    pub skill_frequency: BTreeMap<String, usize>,
    pub posting_count: usize,
}

impl CorpusStats {
    /// Scan the catalog once.
    pub fn build(postings: &[Posting], reference: &dyn ReferenceData) -> Self {
        let mut skills = BTreeSet::new();
        let mut sectors = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut skill_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut max_stipend = 0_u64;
        let mut stipend_sum = 0_u128;
        let mut paid_count = 0_u64;

        for posting in postings {
            let amount = posting.stipend_amount();
            if amount > 0 {
                max_stipend = max_stipend.max(amount);
                stipend_sum += u128::from(amount);
                paid_count += 1;
            }

            for skill in normalize_skill_set(&posting.required_skills) {
                *skill_frequency.entry(skill.clone()).or_insert(0) += 1;
                skills.insert(skill);
            }

            sectors.extend(normalize_key_set(&posting.sector_tags));

            if let Some(location) = posting.effective_location() {
                locations.insert(city_key(location, reference));
            }
        }

        let average_stipend = if paid_count == 0 {
            0.0
        } else {
            stipend_sum as f64 / paid_count as f64
        };

        Self {
            all_skills: skills.into_iter().collect(),
            all_sectors: sectors.into_iter().collect(),
            all_locations: locations.into_iter().collect(),
            max_stipend,
            average_stipend,
            skill_frequency,
            posting_count: postings.len(),
        }
    }

    /// How many postings require a normalized skill.
    pub fn frequency_of(&self, skill: &str) -> usize {
        self.skill_frequency.get(skill).copied().unwrap_or(0)
    }

    /// Total vector dimension across all vocabularies.
    pub fn dimension(&self) -> usize {
        self.all_skills.len() + self.all_sectors.len() + self.all_locations.len()
    }
}
