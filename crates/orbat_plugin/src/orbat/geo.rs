//! Geographic to render-space mapping.
//!
//! Render space is a local tangent plane anchored at the tree root: x points
//! east, y up, z south, all in meters. An equirectangular approximation is
//! fine at theatre scale; nothing downstream needs geodesic accuracy.

use glam::DVec3;
use serde::Deserialize;

use crate::constants::EARTH_RADIUS_M;

/// Geographic position as carried by the input document. All three fields
/// are required on the wire.
#[derive(Clone, Copy, PartialEq, Debug, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Height above the reference surface, meters.
    pub alt: f64,
}

/// Maps [`GeoPoint`]s into render space around a fixed anchor.
///
/// The configured height bias is added to every output so billboards float
/// clear of terrain relief instead of clipping into it.
#[derive(Clone, Copy, Debug)]
pub struct GeoProjector {
    anchor: GeoPoint,
    meters_per_lon_degree: f64,
    height_bias: f64,
}

const METERS_PER_LAT_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

impl GeoProjector {
    pub fn new(anchor: GeoPoint, height_bias: f64) -> Self {
        Self {
            anchor,
            meters_per_lon_degree: METERS_PER_LAT_DEGREE * anchor.lat.to_radians().cos(),
            height_bias,
        }
    }

    /// Render-space position of `p`.
    pub fn to_render(&self, p: GeoPoint) -> DVec3 {
        let east = (p.lon - self.anchor.lon) * self.meters_per_lon_degree;
        let north = (p.lat - self.anchor.lat) * METERS_PER_LAT_DEGREE;
        DVec3::new(east, p.alt + self.height_bias, -north)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANCHOR: GeoPoint = GeoPoint {
        lat: 50.0,
        lon: 30.0,
        alt: 0.0,
    };

    #[test]
    fn anchor_maps_to_origin_plus_bias() {
        let proj = GeoProjector::new(ANCHOR, 12.0);
        let p = proj.to_render(ANCHOR);
        assert_eq!(p, DVec3::new(0.0, 12.0, 0.0));
    }

    #[test]
    fn north_is_negative_z_and_east_is_positive_x() {
        let proj = GeoProjector::new(ANCHOR, 0.0);
        let north = proj.to_render(GeoPoint {
            lat: 50.1,
            ..ANCHOR
        });
        let east = proj.to_render(GeoPoint {
            lon: 30.1,
            ..ANCHOR
        });
        assert!(north.z < 0.0 && north.x.abs() < 1e-9);
        assert!(east.x > 0.0 && east.z.abs() < 1e-9);
        // One degree of latitude is ~111 km; longitude is shortened by cos(50°).
        assert!((north.z.abs() - 11_112.0).abs() < 30.0);
        assert!((east.x - 11_112.0 * 50.0_f64.to_radians().cos()).abs() < 30.0);
    }

    #[test]
    fn a_position_without_altitude_is_rejected() {
        let full: Result<GeoPoint, _> =
            serde_json::from_str(r#"{ "lat": 50.0, "lon": 30.0, "alt": 120.0 }"#);
        assert_eq!(full.unwrap().alt, 120.0);
        let missing: Result<GeoPoint, _> = serde_json::from_str(r#"{ "lat": 50.0, "lon": 30.0 }"#);
        assert!(missing.is_err());
    }

    #[test]
    fn altitude_passes_through() {
        let proj = GeoProjector::new(ANCHOR, 5.0);
        let p = proj.to_render(GeoPoint {
            alt: 100.0,
            ..ANCHOR
        });
        assert_eq!(p.y, 105.0);
    }
}
