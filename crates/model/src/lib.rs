//! Core domain model for internmatch.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Profile`: The candidate side of matching
//! - `Posting`: An internship opening from the catalog
//! - `ScoreBreakdown`: Per-dimension evidence behind a composite score
//! - `Match`: A ranked, explained result
//! - `MatchTag`: Qualitative labels attached to a match

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Unknown education level: {0}")]
    UnknownEducationLevel(String),
}

/// Normalize a free-text key for case-insensitive identity.
///
/// Lowercases, trims and collapses internal whitespace. Punctuation is kept
/// so that skills like "C++" and "C#" stay distinct.
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a currency-formatted stipend into a whole amount.
///
/// Skips any leading non-digit text ("₹", "INR ", "Rs."), then reads the
/// first numeric run, ignoring thousands separators. Anything after that run
/// (a range upper bound, "/month") is ignored. Returns 0 when no digit is
/// present.
pub fn parse_stipend(text: &str) -> u64 {
    let mut amount: u64 = 0;
    let mut seen_digit = false;

    for c in text.chars() {
        if let Some(d) = c.to_digit(10) {
            seen_digit = true;
            amount = amount.saturating_mul(10).saturating_add(u64::from(d));
        } else if seen_digit && matches!(c, ',' | '_' | '\'') {
            continue;
        } else if seen_digit {
            break;
        }
    }

    amount
}

/// Education level, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EducationLevel {
    Class12,
    Diploma,
    Undergraduate,
    Postgraduate,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 4] = [
        Self::Class12,
        Self::Diploma,
        Self::Undergraduate,
        Self::Postgraduate,
    ];

    /// Parse common spellings of an education level.
    pub fn parse(text: &str) -> Option<Self> {
        let key: String = normalize_key(text)
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "class12" | "12th" | "xii" | "classxii" | "highersecondary" | "hsc" => {
                Some(Self::Class12)
            }
            "diploma" | "polytechnic" => Some(Self::Diploma),
            "undergraduate" | "ug" | "bachelor" | "bachelors" | "graduate" | "btech" | "be"
            | "bsc" | "bcom" | "ba" => Some(Self::Undergraduate),
            "postgraduate" | "pg" | "master" | "masters" | "mtech" | "msc" | "mba" | "ma" => {
                Some(Self::Postgraduate)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class12 => "Class12",
            Self::Diploma => "Diploma",
            Self::Undergraduate => "Undergraduate",
            Self::Postgraduate => "Postgraduate",
        }
    }
}

impl TryFrom<String> for EducationLevel {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or(ModelError::UnknownEducationLevel(s))
    }
}

impl From<EducationLevel> for String {
    fn from(level: EducationLevel) -> Self {
        level.as_str().to_string()
    }
}

/// How the internship is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkMode {
    Remote,
    Onsite,
    Hybrid,
    /// Not stated in the posting
    Unspecified,
}

impl Default for WorkMode {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl From<&str> for WorkMode {
    fn from(s: &str) -> Self {
        let key: String = normalize_key(s)
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match key.as_str() {
            "remote" | "wfh" | "workfromhome" => Self::Remote,
            "onsite" | "office" | "inoffice" | "inperson" => Self::Onsite,
            "hybrid" => Self::Hybrid,
            _ => Self::Unspecified,
        }
    }
}

impl From<String> for WorkMode {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<WorkMode> for String {
    fn from(mode: WorkMode) -> Self {
        match mode {
            WorkMode::Remote => "Remote",
            WorkMode::Onsite => "Onsite",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::Unspecified => "Unspecified",
        }
        .to_string()
    }
}

/// Geographic coordinates in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A city reference, either a bare name or a name with coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CityRef {
    Name(String),
    Detailed {
        city: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latitude: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        longitude: Option<f64>,
    },
}

impl CityRef {
    pub fn city(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { city, .. } => city,
        }
    }

    /// Coordinates carried by the reference itself, if both are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Detailed {
                latitude: Some(latitude),
                longitude: Some(longitude),
                ..
            } => Some(Coordinates::new(*latitude, *longitude)),
            _ => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        normalize_key(self.city()) == "remote"
    }

    /// True when the name is blank, which counts as no location at all.
    pub fn is_blank(&self) -> bool {
        self.city().trim().is_empty()
    }
}

impl From<&str> for CityRef {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

/// Candidate attributes used as the query side of matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub interested_sectors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CityRef>,

    /// Takes precedence over `location` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_location: Option<CityRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stipend: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<EducationLevel>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_sectors(mut self, sectors: &[&str]) -> Self {
        self.interested_sectors = sectors.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<CityRef>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_desired_location(mut self, location: impl Into<CityRef>) -> Self {
        self.desired_location = Some(location.into());
        self
    }

    pub fn with_min_stipend(mut self, amount: u64) -> Self {
        self.min_stipend = Some(amount);
        self
    }

    pub fn with_education(mut self, level: EducationLevel) -> Self {
        self.education_level = Some(level);
        self
    }

    /// The location matching should use: desired first, then current.
    pub fn effective_location(&self) -> Option<&CityRef> {
        self.desired_location
            .as_ref()
            .filter(|c| !c.is_blank())
            .or(self.location.as_ref().filter(|c| !c.is_blank()))
    }
}

/// An internship opening from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CityRef>,

    /// Currency-formatted text, e.g. "₹15,000 /month"
    #[serde(default, deserialize_with = "string_or_number")]
    pub stipend: String,

    #[serde(default)]
    pub required_skills: Vec<String>,

    #[serde(default)]
    pub sector_tags: Vec<String>,

    /// Empty means no preference
    #[serde(default, deserialize_with = "lenient_levels")]
    pub preferred_education_levels: Vec<EducationLevel>,

    #[serde(default)]
    pub work_mode: WorkMode,
}

impl Posting {
    /// Create a minimal posting for testing.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.required_skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_sectors(mut self, sectors: &[&str]) -> Self {
        self.sector_tags = sectors.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<CityRef>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_stipend(mut self, stipend: impl Into<String>) -> Self {
        self.stipend = stipend.into();
        self
    }

    pub fn with_work_mode(mut self, mode: WorkMode) -> Self {
        self.work_mode = mode;
        self
    }

    pub fn with_education(mut self, levels: &[EducationLevel]) -> Self {
        self.preferred_education_levels = levels.to_vec();
        self
    }

    /// Parsed stipend amount (0 if unparseable).
    pub fn stipend_amount(&self) -> u64 {
        parse_stipend(&self.stipend)
    }

    /// The posting's location, ignoring blank names.
    pub fn effective_location(&self) -> Option<&CityRef> {
        self.location.as_ref().filter(|c| !c.is_blank())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Integer(n)) => n.to_string(),
        Some(Raw::Float(f)) => format!("{}", f.trunc()),
        None => String::new(),
    })
}

fn lenient_levels<'de, D>(deserializer: D) -> Result<Vec<EducationLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|s| EducationLevel::parse(s))
        .collect())
}

/// Curated desirability bucket for a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectorTier {
    Standard,
    ModerateDemand,
    HighDemand,
}

impl Default for SectorTier {
    fn default() -> Self {
        Self::Standard
    }
}

/// Curated employer reputation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompanyTier {
    /// Not on any curated list (startups, small firms)
    Unlisted,
    Recognizable,
    MidTier,
    TopTier,
}

impl Default for CompanyTier {
    fn default() -> Self {
        Self::Unlisted
    }
}

/// Banded geographic proximity between a profile and a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Proximity {
    Remote,
    SameCity,
    Within50Km,
    Within200Km,
    Within500Km,
    Within1000Km,
    Distant,
    /// Neither city could be placed on the map
    UnknownCities,
    /// One side gave no location at all
    Unspecified,
}

impl Default for Proximity {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl Proximity {
    /// Fraction of the location band awarded (never zero).
    pub fn fraction(&self) -> f32 {
        match self {
            Self::Remote => 1.0,
            Self::SameCity => 0.95,
            Self::Within50Km => 0.9,
            Self::Within200Km => 0.75,
            Self::Within500Km => 0.5,
            Self::Within1000Km => 0.3,
            Self::Distant => 0.15,
            Self::UnknownCities => 0.35,
            Self::Unspecified => 0.5,
        }
    }
}

/// Per-dimension scores and the evidence behind them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub skills: f32,
    pub stipend: f32,
    pub location: f32,
    pub sector: f32,
    pub company: f32,
    pub uniqueness: f32,

    /// Required skills the profile covers (normalized)
    pub matched_skills: Vec<String>,
    pub required_skill_count: usize,
    /// matched / required, or the neutral default when nothing is required
    pub skill_ratio: f32,
    /// Cosine similarity of the profile and posting feature vectors
    pub vector_similarity: f32,

    pub stipend_amount: u64,
    pub above_average_stipend: bool,

    pub proximity: Proximity,

    pub sector_tier: SectorTier,
    pub interest_match: bool,

    pub company_tier: CompanyTier,
    /// Unlisted employer paying a competitive stipend
    pub competitive_startup: bool,

    /// Required skills that are rare across the catalog
    pub rare_skills: Vec<String>,
}

impl ScoreBreakdown {
    /// Raw sum of all dimensions.
    pub fn total(&self) -> f32 {
        self.skills + self.stipend + self.location + self.sector + self.company + self.uniqueness
    }

    /// Composite score clamped to 1..=100. Zero is reserved for rejection.
    pub fn composite(&self) -> u8 {
        let total = self.total();
        if !total.is_finite() {
            return 1;
        }
        total.clamp(1.0, 100.0).round() as u8
    }
}

/// Qualitative labels attached to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchTag {
    AiRecommended,
    PerfectSkillMatch,
    HighStipend,
    GreatLocation,
    RemoteFriendly,
    TopCompany,
    HighDemandSector,
    RareSkills,
}

impl MatchTag {
    /// Get a human-readable label for this tag.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AiRecommended => "AI Recommended",
            Self::PerfectSkillMatch => "Perfect Skill Match",
            Self::HighStipend => "High Stipend",
            Self::GreatLocation => "Great Location",
            Self::RemoteFriendly => "Remote Friendly",
            Self::TopCompany => "Top Company",
            Self::HighDemandSector => "High-Demand Sector",
            Self::RareSkills => "Rare Skills",
        }
    }
}

/// A scored, explained posting. Only non-rejected postings become matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub posting: Posting,

    /// Composite score, 1..=100
    pub score: u8,

    pub explanation: String,

    #[serde(default)]
    pub tags: Vec<MatchTag>,

    pub breakdown: ScoreBreakdown,
}

impl Match {
    pub fn has_tag(&self, tag: MatchTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Add a tag, keeping the set free of duplicates.
    pub fn add_tag(&mut self, tag: MatchTag) {
        if !self.has_tag(tag) {
            self.tags.push(tag);
        }
    }

    pub fn tag_labels(&self) -> Vec<&'static str> {
        self.tags.iter().map(|t| t.label()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stipend() {
        assert_eq!(parse_stipend("₹15,000"), 15000);
        assert_eq!(parse_stipend("INR 8,000 /month"), 8000);
        assert_eq!(parse_stipend("₹10,000-15,000"), 10000);
        assert_eq!(parse_stipend("Unpaid"), 0);
        assert_eq!(parse_stipend(""), 0);
        assert_eq!(parse_stipend("25000"), 25000);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Machine   Learning "), "machine learning");
        assert_eq!(normalize_key("C++"), "c++");
    }

    #[test]
    fn test_education_parse_and_order() {
        assert_eq!(EducationLevel::parse("UG"), Some(EducationLevel::Undergraduate));
        assert_eq!(EducationLevel::parse("Class 12"), Some(EducationLevel::Class12));
        assert_eq!(EducationLevel::parse("Master's"), Some(EducationLevel::Postgraduate));
        assert_eq!(EducationLevel::parse("PhD"), None);
        assert!(EducationLevel::Class12 < EducationLevel::Postgraduate);
    }

    #[test]
    fn test_work_mode_from_str() {
        assert_eq!(WorkMode::from("Remote"), WorkMode::Remote);
        assert_eq!(WorkMode::from("on-site"), WorkMode::Onsite);
        assert_eq!(WorkMode::from("Work from home"), WorkMode::Remote);
        assert_eq!(WorkMode::from("whatever"), WorkMode::Unspecified);
    }

    #[test]
    fn test_posting_tolerates_missing_fields() {
        let json = r#"{"id": 7, "title": "Data Intern", "stipend": 12000,
            "preferredEducationLevels": ["UG", "PhD"], "workMode": "hybrid"}"#;
        let posting: Posting = serde_json::from_str(json).unwrap();
        assert_eq!(posting.id, "7");
        assert_eq!(posting.stipend_amount(), 12000);
        assert!(posting.required_skills.is_empty());
        assert_eq!(posting.preferred_education_levels, vec![EducationLevel::Undergraduate]);
        assert_eq!(posting.work_mode, WorkMode::Hybrid);
        assert!(posting.location.is_none());
    }

    #[test]
    fn test_city_ref_forms() {
        let plain: CityRef = serde_json::from_str(r#""Delhi""#).unwrap();
        assert_eq!(plain.city(), "Delhi");
        assert!(plain.coordinates().is_none());

        let detailed: CityRef =
            serde_json::from_str(r#"{"city": "Pune", "latitude": 18.52, "longitude": 73.85}"#)
                .unwrap();
        assert_eq!(detailed.city(), "Pune");
        assert_eq!(detailed.coordinates(), Some(Coordinates::new(18.52, 73.85)));
        assert!(CityRef::from("REMOTE").is_remote());
    }

    #[test]
    fn test_desired_location_takes_precedence() {
        let profile = Profile::new()
            .with_location("Delhi")
            .with_desired_location("Mumbai");
        assert_eq!(profile.effective_location().map(|c| c.city()), Some("Mumbai"));

        let blank_desired = Profile::new()
            .with_location("Delhi")
            .with_desired_location("  ");
        assert_eq!(blank_desired.effective_location().map(|c| c.city()), Some("Delhi"));
    }

    #[test]
    fn test_composite_never_zero() {
        let breakdown = ScoreBreakdown::default();
        assert_eq!(breakdown.composite(), 1);

        let maxed = ScoreBreakdown {
            skills: 80.0,
            stipend: 40.0,
            ..Default::default()
        };
        assert_eq!(maxed.composite(), 100);
    }

    #[test]
    fn test_add_tag_dedupes() {
        let mut m = Match {
            posting: Posting::new("1", "Intern", "Acme"),
            score: 50,
            explanation: String::new(),
            tags: Vec::new(),
            breakdown: ScoreBreakdown::default(),
        };
        m.add_tag(MatchTag::TopCompany);
        m.add_tag(MatchTag::TopCompany);
        assert_eq!(m.tag_labels(), vec!["Top Company"]);
    }
}
