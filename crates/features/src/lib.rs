//! Feature extraction for internship matching.
//!
//! Provides pure functions for computing features used in scoring:
//! - Skill normalization and overlap
//! - Phonetic encodings (Soundex, Metaphone) for fuzzy city names
//! - Corpus statistics (`corpus`)
//! - Binary feature vectors and cosine similarity (`vector`)
//! - Great-circle distance and proximity bands (`geo`)

pub mod corpus;
pub mod geo;
pub mod vector;

pub use corpus::CorpusStats;
pub use geo::{city_key, estimate_proximity, haversine_km, resolve_coordinates, EARTH_RADIUS_KM};
pub use vector::{cosine_similarity, posting_vector, profile_vector};

use std::collections::BTreeSet;

use internmatch_model::normalize_key;
use rphonetic::{Encoder, Metaphone, Soundex};

/// Phonetic encoding results for a name.
#[derive(Debug, Clone, Default)]
pub struct PhoneticCodes {
    pub soundex: Option<String>,
    pub metaphone: Option<String>,
}

/// Compute phonetic encodings for a name.
pub fn compute_phonetics(text: &str) -> PhoneticCodes {
    let soundex = Soundex::default();
    let metaphone = Metaphone::default();

    let soundex_code = soundex.encode(text);
    let metaphone_code = metaphone.encode(text);

    PhoneticCodes {
        soundex: if soundex_code.is_empty() { None } else { Some(soundex_code) },
        metaphone: if metaphone_code.is_empty() { None } else { Some(metaphone_code) },
    }
}

/// Check if two names are phonetically similar.
///
/// Returns the algorithm and code that matched.
pub fn phonetic_match(text1: &str, text2: &str) -> Option<(String, String)> {
    let codes1 = compute_phonetics(text1);
    let codes2 = compute_phonetics(text2);

    if let (Some(s1), Some(s2)) = (&codes1.soundex, &codes2.soundex) {
        if s1 == s2 {
            return Some(("soundex".to_string(), s1.clone()));
        }
    }

    if let (Some(m1), Some(m2)) = (&codes1.metaphone, &codes2.metaphone) {
        if m1 == m2 {
            return Some(("metaphone".to_string(), m1.clone()));
        }
    }

    None
}

/// Map a normalized skill key to its canonical alias.
fn canonical_skill(key: &str) -> &str {
    match key {
        "js" | "java script" | "ecmascript" | "es6" => "javascript",
        "ts" | "type script" => "typescript",
        "py" | "python3" | "python 3" => "python",
        "reactjs" | "react.js" | "react js" => "react",
        "node" | "node.js" | "node js" => "nodejs",
        "vuejs" | "vue.js" | "vue js" => "vue",
        "nextjs" | "next.js" => "next",
        "golang" => "go",
        "k8s" => "kubernetes",
        "postgres" | "postgre" => "postgresql",
        "mongo" => "mongodb",
        "ml" => "machine learning",
        "ai" => "artificial intelligence",
        "dl" => "deep learning",
        "nlp" => "natural language processing",
        "cv" => "computer vision",
        "ms excel" | "microsoft excel" | "advanced excel" => "excel",
        "csharp" | "c sharp" => "c#",
        "cpp" | "c plus plus" => "c++",
        "amazon web services" => "aws",
        "google cloud" | "google cloud platform" => "gcp",
        "ui/ux" | "ux/ui" | "ui ux" | "ui-ux" => "ui/ux design",
        "seo" => "search engine optimization",
        "dsa" => "data structures",
        other => other,
    }
}

/// Normalize a skill for comparison: case-insensitive and lightly aliased.
pub fn normalize_skill(skill: &str) -> String {
    let key = normalize_key(skill);
    canonical_skill(&key).to_string()
}

/// Normalize a list of skills into a sorted, deduplicated set.
pub fn normalize_skill_set(skills: &[String]) -> BTreeSet<String> {
    skills
        .iter()
        .map(|s| normalize_skill(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Required skills the candidate covers, in sorted order.
pub fn skill_overlap(required: &[String], offered: &[String]) -> Vec<String> {
    let offered = normalize_skill_set(offered);
    normalize_skill_set(required)
        .into_iter()
        .filter(|s| offered.contains(s))
        .collect()
}

/// Normalize a list of plain keys (sectors, cities) into a sorted set.
pub fn normalize_key_set(items: &[String]) -> BTreeSet<String> {
    items
        .iter()
        .map(|s| normalize_key(s))
        .filter(|s| !s.is_empty())
        .collect()
}
