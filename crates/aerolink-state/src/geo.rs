//! Great-circle distance on a spherical Earth.

use aerolink_types::{Degrees, Distance};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two geodetic points.
///
/// Accurate to well under a metre for the ranges a vehicle covers from its
/// home position; altitude is ignored.
pub fn distance_between(
    from_lat: Degrees,
    from_lon: Degrees,
    to_lat: Degrees,
    to_lon: Degrees,
) -> Distance {
    let lat1 = from_lat.0.to_radians();
    let lat2 = to_lat.0.to_radians();
    let delta_lat = (to_lat.0 - from_lat.0).to_radians();
    let delta_lon = (to_lon.0 - from_lon.0).to_radians();

    let sin_dlat = (delta_lat / 2.0).sin();
    let sin_dlon = (delta_lon / 2.0).sin();
    let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    Distance(EARTH_RADIUS_M * c)
}
