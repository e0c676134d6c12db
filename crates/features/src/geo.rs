//! Geographic proximity between a profile and a posting.
//!
//! Distances map onto fixed bands rather than a continuous curve so that
//! small coordinate differences never move a score.

use internmatch_model::{normalize_key, CityRef, Coordinates, Proximity};
use internmatch_reference::ReferenceData;
use strsim::damerau_levenshtein;

use crate::phonetic_match;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Names shorter than this never take the phonetic fallback.
const MIN_PHONETIC_LEN: usize = 4;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Band a distance in kilometres.
pub fn band_for_distance(km: f64) -> Proximity {
    if km <= 50.0 {
        Proximity::Within50Km
    } else if km <= 200.0 {
        Proximity::Within200Km
    } else if km <= 500.0 {
        Proximity::Within500Km
    } else if km <= 1000.0 {
        Proximity::Within1000Km
    } else {
        Proximity::Distant
    }
}

/// Canonical city key: the reference name when known, else the normalized
/// raw name. Aliases such as "Bangalore" and "Bengaluru" share one key.
pub fn city_key(city: &CityRef, reference: &dyn ReferenceData) -> String {
    reference
        .canonical_city(city.city())
        .unwrap_or_else(|| normalize_key(city.city()))
}

/// Edit distance a phonetic candidate may be from the input name.
fn max_fuzzy_distance(len: usize) -> usize {
    if len >= 8 {
        2
    } else {
        1
    }
}

/// Known city that is both phonetically equal and a near-spelling of `key`.
///
/// Returns `None` when nothing qualifies or when two candidates tie for the
/// closest distance.
fn fuzzy_city<'r>(key: &str, known: &[&'r str]) -> Option<&'r str> {
    let upper = key.to_uppercase();
    let mut best: Option<(&'r str, usize)> = None;
    let mut tied = false;

    for &name in known {
        if phonetic_match(&upper, &name.to_uppercase()).is_none() {
            continue;
        }
        let distance = damerau_levenshtein(key, name);
        if distance > max_fuzzy_distance(key.chars().count().max(name.chars().count())) {
            continue;
        }
        match best {
            Some((_, d)) if distance == d => tied = true,
            Some((_, d)) if distance > d => {}
            _ => {
                best = Some((name, distance));
                tied = false;
            }
        }
    }

    if tied {
        return None;
    }
    best.map(|(name, _)| name)
}

/// Resolve coordinates for a city.
///
/// Order: coordinates carried on the reference, then the reference table
/// (aliases included), then a known city name that sounds the same and is
/// at most one or two edits away.
pub fn resolve_coordinates(city: &CityRef, reference: &dyn ReferenceData) -> Option<Coordinates> {
    if let Some(coords) = city.coordinates() {
        return Some(coords);
    }
    if let Some(coords) = reference.city_coordinates(city.city()) {
        return Some(coords);
    }

    let key = normalize_key(city.city());
    if key.chars().count() < MIN_PHONETIC_LEN {
        return None;
    }

    let known = reference.city_names();
    let candidate = fuzzy_city(&key, &known)?;
    tracing::debug!(city = %key, resolved = %candidate, "resolved city by spelling");
    reference.city_coordinates(candidate)
}

/// Estimate proximity between the candidate's city and a posting's city.
pub fn estimate_proximity(
    from: &CityRef,
    to: &CityRef,
    reference: &dyn ReferenceData,
) -> Proximity {
    if from.is_remote() || to.is_remote() {
        return Proximity::Remote;
    }

    if city_key(from, reference) == city_key(to, reference) {
        return Proximity::SameCity;
    }

    match (
        resolve_coordinates(from, reference),
        resolve_coordinates(to, reference),
    ) {
        (Some(a), Some(b)) => band_for_distance(haversine_km(a, b)),
        _ => Proximity::UnknownCities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use internmatch_reference::ReferenceTables;

    const DELHI: Coordinates = Coordinates {
        latitude: 28.7041,
        longitude: 77.1025,
    };
    const MUMBAI: Coordinates = Coordinates {
        latitude: 19.0760,
        longitude: 72.8777,
    };

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km(DELHI, DELHI), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let ab = haversine_km(DELHI, MUMBAI);
        let ba = haversine_km(MUMBAI, DELHI);
        assert!((ab - ba).abs() < 1e-9);
        // Delhi to Mumbai is roughly 1150 km
        assert!((1100.0..1200.0).contains(&ab));
    }

    #[test]
    fn test_distance_bands() {
        assert_eq!(band_for_distance(10.0), Proximity::Within50Km);
        assert_eq!(band_for_distance(150.0), Proximity::Within200Km);
        assert_eq!(band_for_distance(450.0), Proximity::Within500Km);
        assert_eq!(band_for_distance(900.0), Proximity::Within1000Km);
        assert_eq!(band_for_distance(2000.0), Proximity::Distant);
    }

    #[test]
    fn test_remote_and_same_city() {
        let tables = ReferenceTables::builtin();
        let delhi = CityRef::from("Delhi");
        assert_eq!(
            estimate_proximity(&delhi, &CityRef::from("Remote"), &tables),
            Proximity::Remote
        );
        assert_eq!(
            estimate_proximity(&delhi, &CityRef::from("DELHI"), &tables),
            Proximity::SameCity
        );
        assert_eq!(
            estimate_proximity(&CityRef::from("Bangalore"), &CityRef::from("Bengaluru"), &tables),
            Proximity::SameCity
        );
    }

    #[test]
    fn test_known_city_bands() {
        let tables = ReferenceTables::builtin();
        let delhi = CityRef::from("Delhi");
        assert_eq!(
            estimate_proximity(&delhi, &CityRef::from("Noida"), &tables),
            Proximity::Within50Km
        );
        assert_eq!(
            estimate_proximity(&delhi, &CityRef::from("Jaipur"), &tables),
            Proximity::Within500Km
        );
        assert_eq!(
            estimate_proximity(&delhi, &CityRef::from("Chennai"), &tables),
            Proximity::Distant
        );
    }

    #[test]
    fn test_unknown_city_is_neutral_low() {
        let tables = ReferenceTables::builtin();
        let proximity =
            estimate_proximity(&CityRef::from("Delhi"), &CityRef::from("Xyzzy"), &tables);
        assert_eq!(proximity, Proximity::UnknownCities);
        assert!(proximity.fraction() > 0.0);
    }

    #[test]
    fn test_structured_coordinates_override_table() {
        let tables = ReferenceTables::builtin();
        let campus = CityRef::Detailed {
            city: "Tech Park".to_string(),
            latitude: Some(28.70),
            longitude: Some(77.10),
        };
        assert_eq!(
            estimate_proximity(&campus, &CityRef::from("Delhi"), &tables),
            Proximity::Within50Km
        );
    }

    #[test]
    fn test_phonetic_fallback() {
        let tables = ReferenceTables::builtin();
        let coords = resolve_coordinates(&CityRef::from("Dehli"), &tables);
        assert_eq!(coords, tables.city_coordinates("delhi"));

        let misspelt = resolve_coordinates(&CityRef::from("Hyderbad"), &tables);
        assert_eq!(misspelt, tables.city_coordinates("hyderabad"));
    }

    #[test]
    fn test_sound_alike_city_is_not_borrowed() {
        let tables = ReferenceTables::builtin();
        // Dhule shares Delhi's Soundex code but is a different city
        assert!(resolve_coordinates(&CityRef::from("Dhule"), &tables).is_none());
        assert_eq!(
            estimate_proximity(&CityRef::from("Delhi"), &CityRef::from("Dhule"), &tables),
            Proximity::UnknownCities
        );
    }

    #[test]
    fn test_fuzzy_city_rejects_ties() {
        assert_eq!(fuzzy_city("delhi", &["delhi", "dehli"]), Some("delhi"));
        assert_eq!(fuzzy_city("dalhi", &["delhi", "dolhi"]), None);
    }

    #[test]
    fn test_city_key_folds_aliases() {
        let tables = ReferenceTables::builtin();
        assert_eq!(city_key(&CityRef::from("Bangalore"), &tables), "bengaluru");
        assert_eq!(city_key(&CityRef::from(" Atlantis "), &tables), "atlantis");
    }
}
