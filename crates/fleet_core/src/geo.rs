//! Geographic primitives: coordinates, great-circle distance and straight-line interpolation.
//!
//! Distances use the haversine formula on a spherical Earth. Interpolation is planar
//! (latitude and longitude are blended independently), which is a deliberate
//! simplification for city-scale legs: it shapes the rendered path, while trip timing
//! always comes from [`distance_km`].

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Copy rounded to `places` decimal places, for wire output.
    pub fn rounded(&self, places: i32) -> Self {
        Self {
            lat: round_to(self.lat, places),
            lng: round_to(self.lng, places),
        }
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two coordinates in kilometres.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlng = (dlng * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    // Rounding can push h slightly past 1 for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Linear blend from `a` to `b`. `fraction` is clamped to [0, 1]; NaN counts as 0.
pub fn interpolate(a: Coordinate, b: Coordinate, fraction: f64) -> Coordinate {
    let t = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    if t == 0.0 {
        return a;
    }
    if t == 1.0 {
        return b;
    }
    Coordinate {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}

/// Minutes needed to cover `distance_km` at `speed_kmh`, rounded to one decimal.
pub fn eta_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    round_to((distance_km / speed_kmh) * 60.0, 1)
}

/// Seconds needed to cover `distance_km` at `speed_kmh`.
pub fn travel_seconds(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / (speed_kmh / 3600.0)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPOT: Coordinate = Coordinate::new(43.6532, -79.3832);
    const PEARSON: Coordinate = Coordinate::new(43.6777, -79.6248);

    #[test]
    fn depot_to_pearson_is_about_twenty_km() {
        let d = distance_km(DEPOT, PEARSON);
        assert!((d - 19.6).abs() < 0.5, "unexpected distance {d}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_identity() {
        assert_eq!(distance_km(DEPOT, DEPOT), 0.0);
        let ab = distance_km(DEPOT, PEARSON);
        let ba = distance_km(PEARSON, DEPOT);
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 0.0);
    }

    #[test]
    fn antipodal_points_stay_finite() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = distance_km(a, b);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);

        let north = Coordinate::new(90.0, 0.0);
        let south = Coordinate::new(-90.0, 0.0);
        assert!(distance_km(north, south).is_finite());
    }

    #[test]
    fn near_identical_points_have_tiny_distance() {
        let nudged = Coordinate::new(DEPOT.lat + 1e-9, DEPOT.lng);
        let d = distance_km(DEPOT, nudged);
        assert!(d >= 0.0 && d < 1e-3);
    }

    #[test]
    fn interpolate_clamps_fraction() {
        assert_eq!(interpolate(DEPOT, PEARSON, -0.5), DEPOT);
        assert_eq!(interpolate(DEPOT, PEARSON, 1.5), PEARSON);
        assert_eq!(interpolate(DEPOT, PEARSON, f64::NAN), DEPOT);

        let mid = interpolate(DEPOT, PEARSON, 0.5);
        assert!((mid.lat - (DEPOT.lat + PEARSON.lat) / 2.0).abs() < 1e-12);
        assert!((mid.lng - (DEPOT.lng + PEARSON.lng) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn eta_minutes_rounds_to_one_decimal() {
        assert_eq!(eta_minutes(35.0, 35.0), 60.0);
        assert_eq!(eta_minutes(1.0, 35.0), 1.7);
        assert_eq!(eta_minutes(0.0, 35.0), 0.0);
    }

    #[test]
    fn coordinate_validation_bounds() {
        assert!(DEPOT.is_valid());
        assert!(Coordinate::new(90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
