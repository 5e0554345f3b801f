use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::database::models::Lead;

/// Mean earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Validated constructor; None for out-of-range coordinates
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if lat.abs() <= 90.0 && lon.abs() <= 180.0 {
            Some(Self { lat, lon })
        } else {
            None
        }
    }
}

/// Great-circle distance between two points in kilometres
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// A lead with its distance to the query point or route
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadDistance {
    #[serde(flatten)]
    pub lead: Lead,

    /// Kilometres to the query point / nearest waypoint
    pub distance_km: f64,
}

/// Leads within `radius_km` of a point, nearest first
///
/// Leads without coordinates are skipped.
pub fn leads_within_radius(leads: Vec<Lead>, center: GeoPoint, radius_km: f64) -> Vec<LeadDistance> {
    let mut hits: Vec<LeadDistance> = leads
        .into_iter()
        .filter_map(|lead| {
            let point = lead_point(&lead)?;
            let distance_km = haversine_km(center, point);
            (distance_km <= radius_km).then_some(LeadDistance { lead, distance_km })
        })
        .collect();

    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hits
}

/// Leads within `corridor_km` of any waypoint of a route, nearest first
///
/// Distance is the minimum over the waypoints, which is a good enough
/// corridor approximation at field-visit densities.
pub fn leads_near_route(
    leads: Vec<Lead>,
    waypoints: &[GeoPoint],
    corridor_km: f64,
) -> Vec<LeadDistance> {
    if waypoints.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<LeadDistance> = leads
        .into_iter()
        .filter_map(|lead| {
            let point = lead_point(&lead)?;
            let distance_km = waypoints
                .iter()
                .map(|wp| haversine_km(*wp, point))
                .fold(f64::INFINITY, f64::min);
            (distance_km <= corridor_km).then_some(LeadDistance { lead, distance_km })
        })
        .collect();

    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    hits
}

/// Total length of a polyline in kilometres
pub fn route_length_km(waypoints: &[GeoPoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| haversine_km(pair[0], pair[1]))
        .sum()
}

fn lead_point(lead: &Lead) -> Option<GeoPoint> {
    match (lead.lat, lead.lon) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::enums::{LeadSource, LeadStatus};
    use chrono::Utc;

    // Warszawa and Kraków city centres
    const WARSZAWA: GeoPoint = GeoPoint { lat: 52.2297, lon: 21.0122 };
    const KRAKOW: GeoPoint = GeoPoint { lat: 50.0647, lon: 19.9450 };

    fn lead_at(name: &str, lat: f64, lon: f64) -> Lead {
        Lead {
            id: 0,
            company_name: name.to_string(),
            tax_id: None,
            email: None,
            phone: None,
            street: None,
            city: None,
            postal_code: None,
            lat: Some(lat),
            lon: Some(lon),
            status: LeadStatus::New,
            source: LeadSource::Manual,
            annual_volume_mwh: None,
            contract_end_date: None,
            notes: None,
            owner_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // Warszawa-Kraków is roughly 252 km
        let d = haversine_km(WARSZAWA, KRAKOW);
        assert!((d - 252.0).abs() < 3.0, "got {}", d);
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km(WARSZAWA, WARSZAWA), 0.0);
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(52.0, 21.0).is_some());
        assert!(GeoPoint::new(91.0, 21.0).is_none());
        assert!(GeoPoint::new(52.0, -181.0).is_none());
    }

    #[test]
    fn test_leads_within_radius_sorted_nearest_first() {
        let leads = vec![
            lead_at("far", 50.06, 19.94),  // Kraków, ~252 km out
            lead_at("near", 52.25, 21.00), // a few km out
            lead_at("gdansk", 54.35, 18.65), // ~300+ km out
        ];
        let mut no_coords = lead_at("none", 0.0, 0.0);
        no_coords.lat = None;
        no_coords.lon = None;

        let mut all = leads;
        all.push(no_coords);

        let hits = leads_within_radius(all, WARSZAWA, 260.0);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].lead.company_name, "near");
        assert_eq!(hits[1].lead.company_name, "far");
        assert!(hits[0].distance_km < hits[1].distance_km);
    }

    #[test]
    fn test_leads_near_route_uses_minimum_waypoint_distance() {
        let route = [WARSZAWA, KRAKOW];
        let leads = vec![
            lead_at("krk-suburb", 50.08, 20.02),
            lead_at("gdansk", 54.35, 18.65), // ~300 km from either end
        ];

        let hits = leads_near_route(leads, &route, 25.0);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lead.company_name, "krk-suburb");
    }

    #[test]
    fn test_route_length() {
        let len = route_length_km(&[WARSZAWA, KRAKOW]);
        assert!((len - 252.0).abs() < 3.0);
        assert_eq!(route_length_km(&[WARSZAWA]), 0.0);
    }
}
