//! Curated reference data used by scoring.
//!
//! Provides the `ReferenceData` trait and its table-backed implementation.
//! City coordinates, sector demand tiers and employer tiers live behind this
//! interface so the curated lists can change without touching scoring logic,
//! and so tests can substitute fixtures.

use std::collections::BTreeMap;
use std::path::Path;

use internmatch_model::{normalize_key, CompanyTier, Coordinates, SectorTier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading reference tables.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Failed to read reference file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid coordinates for {city}: ({latitude}, {longitude})")]
    InvalidCoordinates {
        city: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("Alias {alias} points to unknown city {target}")]
    DanglingAlias { alias: String, target: String },
}

/// Lookup service for curated reference data.
///
/// Lookups take raw text; implementations are responsible for normalizing.
pub trait ReferenceData {
    /// Coordinates of a known city, honoring aliases.
    fn city_coordinates(&self, city: &str) -> Option<Coordinates>;

    /// Canonical name of a city if it is known or aliased.
    fn canonical_city(&self, city: &str) -> Option<String>;

    /// All known canonical city names, sorted.
    fn city_names(&self) -> Vec<&str>;

    fn sector_tier(&self, sector: &str) -> SectorTier;

    fn company_tier(&self, company: &str) -> CompanyTier;

    /// Get the source name for logging.
    fn name(&self) -> &'static str;
}

/// Table-backed reference data, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTables {
    /// Canonical city name to coordinates
    #[serde(default)]
    pub cities: BTreeMap<String, Coordinates>,

    /// Alternate spelling to canonical city name
    #[serde(default)]
    pub city_aliases: BTreeMap<String, String>,

    #[serde(default)]
    pub high_demand_sectors: Vec<String>,

    #[serde(default)]
    pub moderate_demand_sectors: Vec<String>,

    #[serde(default)]
    pub top_tier_companies: Vec<String>,

    #[serde(default)]
    pub mid_tier_companies: Vec<String>,

    #[serde(default)]
    pub recognizable_companies: Vec<String>,
}

impl ReferenceTables {
    /// Built-in tables covering major Indian cities, sectors and employers.
    pub fn builtin() -> Self {
        let cities: &[(&str, f64, f64)] = &[
            ("ahmedabad", 23.0225, 72.5714),
            ("bengaluru", 12.9716, 77.5946),
            ("bhopal", 23.2599, 77.4126),
            ("bhubaneswar", 20.2961, 85.8245),
            ("chandigarh", 30.7333, 76.7794),
            ("chennai", 13.0827, 80.2707),
            ("coimbatore", 11.0168, 76.9558),
            ("dehradun", 30.3165, 78.0322),
            ("delhi", 28.7041, 77.1025),
            ("faridabad", 28.4089, 77.3178),
            ("ghaziabad", 28.6692, 77.4538),
            ("guwahati", 26.1445, 91.7362),
            ("gurugram", 28.4595, 77.0266),
            ("hyderabad", 17.3850, 78.4867),
            ("indore", 22.7196, 75.8577),
            ("jaipur", 26.9124, 75.7873),
            ("kochi", 9.9312, 76.2673),
            ("kolkata", 22.5726, 88.3639),
            ("lucknow", 26.8467, 80.9462),
            ("mumbai", 19.0760, 72.8777),
            ("mysuru", 12.2958, 76.6394),
            ("nagpur", 21.1458, 79.0882),
            ("new delhi", 28.6139, 77.2090),
            ("noida", 28.5355, 77.3910),
            ("panaji", 15.4909, 73.8278),
            ("patna", 25.5941, 85.1376),
            ("pune", 18.5204, 73.8567),
            ("surat", 21.1702, 72.8311),
            ("thiruvananthapuram", 8.5241, 76.9366),
            ("vadodara", 22.3072, 73.1812),
            ("visakhapatnam", 17.6868, 83.2185),
        ];

        let aliases: &[(&str, &str)] = &[
            ("bangalore", "bengaluru"),
            ("bombay", "mumbai"),
            ("calcutta", "kolkata"),
            ("cochin", "kochi"),
            ("delhi ncr", "delhi"),
            ("goa", "panaji"),
            ("gurgaon", "gurugram"),
            ("madras", "chennai"),
            ("mysore", "mysuru"),
            ("ncr", "delhi"),
            ("poona", "pune"),
            ("trivandrum", "thiruvananthapuram"),
            ("vizag", "visakhapatnam"),
        ];

        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            cities: cities
                .iter()
                .map(|(name, lat, lon)| (name.to_string(), Coordinates::new(*lat, *lon)))
                .collect(),
            city_aliases: aliases
                .iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string()))
                .collect(),
            high_demand_sectors: owned(&[
                "artificial intelligence",
                "cloud computing",
                "cybersecurity",
                "data science",
                "fintech",
                "information technology",
                "machine learning",
                "software",
                "technology",
            ]),
            moderate_demand_sectors: owned(&[
                "analytics",
                "biotechnology",
                "consulting",
                "design",
                "e-commerce",
                "edtech",
                "finance",
                "healthcare",
                "marketing",
                "media",
            ]),
            top_tier_companies: owned(&[
                "adobe",
                "amazon",
                "apple",
                "goldman sachs",
                "google",
                "meta",
                "microsoft",
                "netflix",
                "nvidia",
            ]),
            mid_tier_companies: owned(&[
                "accenture",
                "deloitte",
                "flipkart",
                "ibm",
                "infosys",
                "oracle",
                "paytm",
                "razorpay",
                "salesforce",
                "swiggy",
                "tata consultancy services",
                "tcs",
                "wipro",
                "zomato",
            ]),
            recognizable_companies: owned(&[
                "capgemini",
                "cognizant",
                "cred",
                "freshworks",
                "hcl",
                "myntra",
                "nykaa",
                "phonepe",
                "tech mahindra",
                "unacademy",
                "zoho",
            ]),
        }
    }

    /// Parse tables from JSON, normalizing keys and validating entries.
    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let tables: Self = serde_json::from_str(json)?;
        let tables = tables.normalized();
        tables.validate()?;
        Ok(tables)
    }

    /// Load tables from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tables = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            cities = tables.cities.len(),
            "loaded reference tables"
        );
        Ok(tables)
    }

    fn normalized(self) -> Self {
        let keys = |items: Vec<String>| items.iter().map(|s| normalize_key(s)).collect::<Vec<_>>();
        Self {
            cities: self
                .cities
                .into_iter()
                .map(|(name, coords)| (normalize_key(&name), coords))
                .collect(),
            city_aliases: self
                .city_aliases
                .into_iter()
                .map(|(alias, target)| (normalize_key(&alias), normalize_key(&target)))
                .collect(),
            high_demand_sectors: keys(self.high_demand_sectors),
            moderate_demand_sectors: keys(self.moderate_demand_sectors),
            top_tier_companies: keys(self.top_tier_companies),
            mid_tier_companies: keys(self.mid_tier_companies),
            recognizable_companies: keys(self.recognizable_companies),
        }
    }

    fn validate(&self) -> Result<(), ReferenceError> {
        for (city, coords) in &self.cities {
            let lat_ok = (-90.0..=90.0).contains(&coords.latitude);
            let lon_ok = (-180.0..=180.0).contains(&coords.longitude);
            if !lat_ok || !lon_ok {
                return Err(ReferenceError::InvalidCoordinates {
                    city: city.clone(),
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                });
            }
        }
        for (alias, target) in &self.city_aliases {
            if !self.cities.contains_key(target) {
                return Err(ReferenceError::DanglingAlias {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Company names match a curated entry exactly or as a leading word run,
/// so "Google India" is treated as "google".
fn company_listed(name: &str, entries: &[String]) -> bool {
    entries.iter().any(|entry| {
        name == entry
            || name
                .strip_prefix(entry.as_str())
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

impl ReferenceData for ReferenceTables {
    fn city_coordinates(&self, city: &str) -> Option<Coordinates> {
        let canonical = self.canonical_city(city)?;
        self.cities.get(&canonical).copied()
    }

    fn canonical_city(&self, city: &str) -> Option<String> {
        let key = normalize_key(city);
        if self.cities.contains_key(&key) {
            return Some(key);
        }
        self.city_aliases.get(&key).cloned()
    }

    fn city_names(&self) -> Vec<&str> {
        self.cities.keys().map(|s| s.as_str()).collect()
    }

    fn sector_tier(&self, sector: &str) -> SectorTier {
        let key = normalize_key(sector);
        if self.high_demand_sectors.contains(&key) {
            SectorTier::HighDemand
        } else if self.moderate_demand_sectors.contains(&key) {
            SectorTier::ModerateDemand
        } else {
            SectorTier::Standard
        }
    }

    fn company_tier(&self, company: &str) -> CompanyTier {
        let key = normalize_key(company);
        if company_listed(&key, &self.top_tier_companies) {
            CompanyTier::TopTier
        } else if company_listed(&key, &self.mid_tier_companies) {
            CompanyTier::MidTier
        } else if company_listed(&key, &self.recognizable_companies) {
            CompanyTier::Recognizable
        } else {
            CompanyTier::Unlisted
        }
    }

    fn name(&self) -> &'static str {
        "tables"
    }
}
