//! Pure geometry for the attendance geofence gates.

use db::models::attendance_location::{LocationType, Model as Location};
use tracing::warn;

/// Mean Earth radius in meters, as used by the attendance screens.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two (lat, lng) points.
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Ray-casting point-in-polygon test over ordered `(lat, lng)` vertices.
///
/// The polygon is closed implicitly (last vertex connects back to the
/// first). Fewer than three vertices never contain anything.
pub fn point_in_polygon(lat: f64, lng: f64, polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (lat_i, lng_i) = polygon[i];
        let (lat_j, lng_j) = polygon[j];

        let crosses = (lng_i > lng) != (lng_j > lng)
            && lat < (lat_j - lat_i) * (lng - lng_i) / (lng_j - lng_i) + lat_i;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Returns the first active location containing the probe point, if any.
///
/// Radius zones use haversine distance against `radius_meters`; polygon
/// zones use ray casting over their stored vertices. Membership is checked
/// in slice order and the first match wins; callers fetch locations ordered
/// by id so overlap resolution is stable. A polygon zone with missing or
/// unparseable vertex data is skipped rather than failing the whole probe.
pub fn is_within_location<'a>(lat: f64, lng: f64, locations: &'a [Location]) -> Option<&'a Location> {
    locations.iter().find(|location| {
        if !location.is_active {
            return false;
        }
        match location.location_type {
            LocationType::Radius => match location.radius_meters {
                Some(radius) if radius > 0.0 => {
                    haversine_distance_m(lat, lng, location.latitude, location.longitude) <= radius
                }
                _ => false,
            },
            LocationType::Polygon => match location.polygon_points() {
                Ok(points) => point_in_polygon(lat, lng, &points),
                Err(err) => {
                    warn!(
                        location_id = location.id,
                        name = %location.name,
                        %err,
                        "skipping polygon zone with malformed coordinates"
                    );
                    false
                }
            },
        }
    })
}
