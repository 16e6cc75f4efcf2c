//! Turning a provider's raw list into ranked candidates.

use crate::geo::{GeoPoint, haversine_distance};

use super::types::{LooseNumber, Place, PlaceId, PlaceType, RawPlace};

/// Rank raw places by distance from `origin`, nearest first.
///
/// Entries whose coordinates do not parse to finite numbers are dropped. A
/// provider distance is used when it parses to a finite, non-negative
/// number that fits in whole meters; otherwise the great-circle distance
/// from `origin` is used.
/// Distances are rounded to whole meters, ties keep provider order, and at
/// most `max_results` candidates are returned.
pub fn rank_candidates(
    origin: GeoPoint,
    raw: &[RawPlace],
    place_type: PlaceType,
    max_results: usize,
) -> Vec<Place> {
    let mut candidates: Vec<Place> = raw
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| to_candidate(origin, index, entry, place_type))
        .collect();

    candidates.sort_by_key(|c| c.distance_meters);
    candidates.truncate(max_results);
    candidates
}

fn to_candidate(
    origin: GeoPoint,
    index: usize,
    entry: &RawPlace,
    place_type: PlaceType,
) -> Option<Place> {
    let point = GeoPoint::new(entry.latitude(), entry.longitude());
    if !point.is_finite() {
        tracing::debug!(name = %entry.name, "skipping place with unusable coordinates");
        return None;
    }

    let distance_meters = entry
        .distance
        .as_ref()
        .map(LooseNumber::value)
        .and_then(whole_meters)
        .or_else(|| whole_meters(haversine_distance(origin, point)))?;

    Some(Place {
        id: PlaceId(u32::try_from(index).unwrap_or(u32::MAX)),
        name: entry.name.clone(),
        latitude: point.latitude,
        longitude: point.longitude,
        place_type,
        operator: entry.line.clone().filter(|l| !l.is_empty()),
        distance_meters,
    })
}

fn whole_meters(distance: f64) -> Option<u32> {
    let rounded = distance.round();
    (rounded.is_finite() && rounded >= 0.0 && rounded <= f64::from(u32::MAX))
        .then_some(rounded as u32)
}
