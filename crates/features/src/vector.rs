//! Binary feature vectors over the corpus vocabularies.
//!
//! Layout is skills, then sectors, then locations, one dimension per
//! vocabulary entry in `CorpusStats`. Locations use canonical city keys, so
//! aliases of one city share a dimension.

use std::collections::BTreeSet;

use internmatch_model::{CityRef, Posting, Profile};
use internmatch_reference::ReferenceData;

use crate::geo::city_key;
use crate::{normalize_key_set, normalize_skill_set, CorpusStats};

fn encode(
    stats: &CorpusStats,
    reference: &dyn ReferenceData,
    skills: &BTreeSet<String>,
    sectors: &BTreeSet<String>,
    location: Option<&CityRef>,
) -> Vec<f32> {
    let mut vector = vec![0.0_f32; stats.dimension()];
    let sector_offset = stats.all_skills.len();
    let location_offset = sector_offset + stats.all_sectors.len();

    for skill in skills {
        if let Ok(i) = stats.all_skills.binary_search(skill) {
            vector[i] = 1.0;
        }
    }
    for sector in sectors {
        if let Ok(i) = stats.all_sectors.binary_search(sector) {
            vector[sector_offset + i] = 1.0;
        }
    }
    if let Some(city) = location {
        if let Ok(i) = stats.all_locations.binary_search(&city_key(city, reference)) {
            vector[location_offset + i] = 1.0;
        }
    }

    vector
}

/// Vectorize the candidate's skills, interests and effective location.
pub fn profile_vector(
    profile: &Profile,
    stats: &CorpusStats,
    reference: &dyn ReferenceData,
) -> Vec<f32> {
    encode(
        stats,
        reference,
        &normalize_skill_set(&profile.skills),
        &normalize_key_set(&profile.interested_sectors),
        profile.effective_location(),
    )
}

/// Vectorize a posting's required skills, sector tags and location.
pub fn posting_vector(
    posting: &Posting,
    stats: &CorpusStats,
    reference: &dyn ReferenceData,
) -> Vec<f32> {
    encode(
        stats,
        reference,
        &normalize_skill_set(&posting.required_skills),
        &normalize_key_set(&posting.sector_tags),
        posting.effective_location(),
    )
}

/// Cosine similarity, 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "feature dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use internmatch_reference::ReferenceTables;

    fn stats() -> CorpusStats {
        CorpusStats::build(
            &[
                Posting::new("1", "A", "X")
                    .with_skills(&["Python", "SQL"])
                    .with_sectors(&["Technology"])
                    .with_location("Delhi"),
                Posting::new("2", "B", "Y")
                    .with_skills(&["Java"])
                    .with_sectors(&["Finance"])
                    .with_location("Mumbai"),
            ],
            &ReferenceTables::builtin(),
        )
    }

    #[test]
    fn test_vector_layout() {
        let stats = stats();
        // skills: java, python, sql | sectors: finance, technology | cities: delhi, mumbai
        let v = posting_vector(
            &Posting::new("1", "A", "X")
                .with_skills(&["python", "SQL"])
                .with_sectors(&["Technology"])
                .with_location("Delhi"),
            &stats,
            &ReferenceTables::builtin(),
        );
        assert_eq!(v, vec![0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_profile_vector_ignores_unknown_items() {
        let stats = stats();
        let profile = Profile::new()
            .with_skills(&["Rust", "Java"])
            .with_sectors(&["Space"])
            .with_location("Atlantis");
        let v = profile_vector(&profile, &stats, &ReferenceTables::builtin());
        assert_eq!(v.len(), stats.dimension());
        assert_eq!(v.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_city_aliases_share_a_dimension() {
        let stats = stats();
        let tables = ReferenceTables::builtin();
        let bombay = profile_vector(&Profile::new().with_location("Bombay"), &stats, &tables);
        let mumbai = posting_vector(
            &Posting::new("3", "C", "Z").with_location("Mumbai"),
            &stats,
            &tables,
        );
        assert_eq!(bombay, mumbai);
        assert!((cosine_similarity(&bombay, &mumbai) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_identity() {
        let v = vec![1.0, 0.0, 1.0, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let v = vec![1.0, 1.0, 0.0];
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_symmetric_and_bounded() {
        let a = vec![1.0, 1.0, 0.0, 1.0];
        let b = vec![0.0, 1.0, 1.0, 1.0];
        let ab = cosine_similarity(&a, &b);
        assert_eq!(ab, cosine_similarity(&b, &a));
        assert!((0.0..=1.0).contains(&ab));
        assert!((ab - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }
}
