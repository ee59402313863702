//! Unit-sphere directions and geographic coordinates.
//!
//! Frame: sphere-local, right-handed, Y-up. Latitude is measured from the XZ
//! plane toward +Y. Which way east runs around Y is a [`LongitudeConvention`]
//! and must match the texture wrapped on the sphere mesh.

use serde::{Deserialize, Serialize};

use super::Vec3;
use super::precision::canonical_f64;

/// Orientation of east-positive longitude around the Y axis.
///
/// Both conventions put the prime meridian on +X. An equirectangular texture
/// with its u=0 seam at lon -180, wrapped on a Y-up UV sphere whose seam sits
/// on -X, maps east toward -Z; that is [`LongitudeConvention::EastTowardNegativeZ`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeConvention {
    #[default]
    EastTowardNegativeZ,
    EastTowardPositiveZ,
}

impl LongitudeConvention {
    /// Sign mapping `atan2(z, x)` to east-positive longitude.
    pub fn east_sign(self) -> f64 {
        match self {
            LongitudeConvention::EastTowardNegativeZ => -1.0,
            LongitudeConvention::EastTowardPositiveZ => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LongitudeConvention::EastTowardNegativeZ => "east_toward_negative_z",
            LongitudeConvention::EastTowardPositiveZ => "east_toward_positive_z",
        }
    }
}

impl std::str::FromStr for LongitudeConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "east_toward_negative_z" | "negative_z" | "texture" => {
                Ok(LongitudeConvention::EastTowardNegativeZ)
            }
            "east_toward_positive_z" | "positive_z" => {
                Ok(LongitudeConvention::EastTowardPositiveZ)
            }
            other => Err(format!("unknown longitude convention: {other}")),
        }
    }
}

/// A point on the unit sphere.
///
/// Always unit length and finite; build one with [`Direction::new`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Direction(Vec3);

impl Direction {
    /// Normalizes `v`. Returns `None` for zero-length or non-finite vectors.
    pub fn new(v: Vec3) -> Option<Self> {
        v.normalize().map(Self)
    }

    pub fn as_vec3(self) -> Vec3 {
        self.0
    }

    /// Point at `radius` along this direction.
    pub fn scaled(self, radius: f64) -> Vec3 {
        self.0 * radius
    }
}

/// Latitude/longitude in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Canonical form: lat in [-90, 90], lon in (-180, 180].
    ///
    /// Latitudes past a pole continue down the opposite meridian.
    pub fn normalized(self) -> Self {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return self;
        }

        let mut lat = self.lat.rem_euclid(360.0);
        if lat > 180.0 {
            lat -= 360.0;
        }
        let mut lon = self.lon;
        if lat > 90.0 {
            lat = 180.0 - lat;
            lon += 180.0;
        } else if lat < -90.0 {
            lat = -180.0 - lat;
            lon += 180.0;
        }

        Self::new(canonical_f64(lat), wrap_longitude(lon))
    }
}

/// Wraps a longitude into (-180, 180].
pub fn wrap_longitude(lon: f64) -> f64 {
    if !lon.is_finite() {
        return lon;
    }
    if lon > -180.0 && lon <= 180.0 {
        return canonical_f64(lon);
    }
    let w = (lon + 180.0).rem_euclid(360.0) - 180.0;
    canonical_f64(if w <= -180.0 { 180.0 } else { w })
}

/// Converts between sphere directions and geographic coordinates under one
/// [`LongitudeConvention`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct GeoProjector {
    pub convention: LongitudeConvention,
}

impl GeoProjector {
    pub fn new(convention: LongitudeConvention) -> Self {
        Self { convention }
    }

    /// Direction → latitude/longitude.
    ///
    /// At the poles longitude is undefined; `atan2(0, 0)` yields 0 there.
    pub fn to_geo_coordinate(&self, direction: Direction) -> GeoCoordinate {
        // Renormalize: a Direction that went through serialization or manual
        // arithmetic may have drifted off the unit sphere.
        let v = direction.0.normalize().unwrap_or(direction.0);

        let lat = 90.0 - v.y.clamp(-1.0, 1.0).acos().to_degrees();
        let lon = (self.convention.east_sign() * v.z.atan2(v.x).to_degrees()).clamp(-180.0, 180.0);
        let lon = if lon <= -180.0 { 180.0 } else { lon };

        GeoCoordinate::new(canonical_f64(lat.clamp(-90.0, 90.0)), canonical_f64(lon))
    }

    /// Latitude/longitude → direction.
    ///
    /// Polar angle `phi = 90 - lat`. With the default convention this equals
    /// the seam-offset form `theta = lon + 180`, `x = -sin(phi)cos(theta)`,
    /// `z = sin(phi)sin(theta)`.
    pub fn to_direction(&self, coord: GeoCoordinate) -> Direction {
        let phi = (90.0 - coord.lat).to_radians();
        let azimuth = self.convention.east_sign() * coord.lon.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_az, cos_az) = azimuth.sin_cos();

        Direction(Vec3::new(sin_phi * cos_az, cos_phi, sin_phi * sin_az))
    }
}

/// [`GeoProjector::to_geo_coordinate`] with the default convention.
pub fn to_geo_coordinate(direction: Direction) -> GeoCoordinate {
    GeoProjector::default().to_geo_coordinate(direction)
}

/// [`GeoProjector::to_direction`] with the default convention.
pub fn to_direction(coord: GeoCoordinate) -> Direction {
    GeoProjector::default().to_direction(coord)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{
        Direction, GeoCoordinate, GeoProjector, LongitudeConvention, to_direction,
        to_geo_coordinate, wrap_longitude,
    };
    use crate::math::Vec3;

    /// Signed shortest difference `a - b` between two angles in degrees.
    fn angle_delta_deg(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        if d > 180.0 { d - 360.0 } else { d }
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn dir(x: f64, y: f64, z: f64) -> Direction {
        Direction::new(Vec3::new(x, y, z)).expect("non-zero direction")
    }

    #[test]
    fn round_trip_away_from_poles() {
        let mut rng = StdRng::seed_from_u64(0x6c6f_6e);
        for projector in [
            GeoProjector::new(LongitudeConvention::EastTowardNegativeZ),
            GeoProjector::new(LongitudeConvention::EastTowardPositiveZ),
        ] {
            for _ in 0..2000 {
                let lat = rng.gen_range(-89.9..=89.9);
                let lon = 180.0 - rng.gen_range(0.0..360.0);
                let c = GeoCoordinate::new(lat, lon);

                let rt = projector.to_geo_coordinate(projector.to_direction(c));
                assert_close(rt.lat, c.lat, 1e-6);
                assert_close(angle_delta_deg(rt.lon, c.lon), 0.0, 1e-6);
                assert!(rt.lon > -180.0 && rt.lon <= 180.0, "lon {} out of range", rt.lon);
            }
        }
    }

    #[test]
    fn poles_map_to_extreme_latitudes_with_finite_longitude() {
        let north = to_geo_coordinate(Direction::new(Vec3::Y).expect("dir"));
        assert_eq!(north.lat, 90.0);
        assert_eq!(north.lon, 0.0);

        let south = to_geo_coordinate(Direction::new(-Vec3::Y).expect("dir"));
        assert_eq!(south.lat, -90.0);
        assert!(south.lon.is_finite());
    }

    #[test]
    fn equator_prime_meridian_is_positive_x() {
        let d = to_direction(GeoCoordinate::new(0.0, 0.0));
        assert_close(d.as_vec3().x, 1.0, 1e-12);
        assert_close(d.as_vec3().y, 0.0, 1e-12);
        assert_close(d.as_vec3().z, 0.0, 1e-12);
    }

    #[test]
    fn east_runs_toward_negative_z_by_default() {
        let d = to_direction(GeoCoordinate::new(0.0, 90.0));
        assert_close(d.as_vec3().x, 0.0, 1e-12);
        assert_close(d.as_vec3().y, 0.0, 1e-12);
        assert_close(d.as_vec3().z, -1.0, 1e-12);

        let mirrored = GeoProjector::new(LongitudeConvention::EastTowardPositiveZ)
            .to_direction(GeoCoordinate::new(0.0, 90.0));
        assert_close(mirrored.as_vec3().z, 1.0, 1e-12);
    }

    #[test]
    fn matches_seam_offset_formula() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let c = GeoCoordinate::new(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let phi = (90.0 - c.lat).to_radians();
            let theta = (c.lon + 180.0).to_radians();
            let expected = Vec3::new(-phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());

            let d = to_direction(c);
            assert_close(d.as_vec3().x, expected.x, 1e-12);
            assert_close(d.as_vec3().y, expected.y, 1e-12);
            assert_close(d.as_vec3().z, expected.z, 1e-12);
        }
    }

    #[test]
    fn directions_are_unit_length() {
        let mut rng = StdRng::seed_from_u64(1000);
        for _ in 0..1000 {
            let c = GeoCoordinate::new(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let len = to_direction(c).as_vec3().length();
            assert_close(len, 1.0, 1e-9);
        }
    }

    #[test]
    fn positive_z_is_ninety_west() {
        let c = to_geo_coordinate(dir(0.0, 0.0, 1.0));
        assert_close(c.lat, 0.0, 1e-12);
        assert_close(c.lon, -90.0, 1e-12);
    }

    #[test]
    fn antimeridian_reports_positive_180() {
        // z = +0 with x < 0 makes atan2 return +pi, which negates to -180.
        let c = to_geo_coordinate(dir(-1.0, 0.0, 0.0));
        assert_eq!(c.lon, 180.0);
    }

    #[test]
    fn non_unit_input_is_renormalized() {
        let c = to_geo_coordinate(dir(0.0, 10.0, 0.0));
        assert_eq!(c.lat, 90.0);
        let c = to_geo_coordinate(dir(2.0, 2.0, 0.0));
        assert_close(c.lat, 45.0, 1e-9);
        assert_close(c.lon, 0.0, 1e-9);
    }

    #[test]
    fn direction_rejects_zero_and_nan() {
        assert!(Direction::new(Vec3::ZERO).is_none());
        assert!(Direction::new(Vec3::new(f64::NAN, 1.0, 0.0)).is_none());
    }

    #[test]
    fn wraps_longitudes() {
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(-180.0), 180.0);
        assert_close(wrap_longitude(190.0), -170.0, 1e-12);
        assert_close(wrap_longitude(-190.0), 170.0, 1e-12);
        assert_close(wrap_longitude(540.0), 180.0, 1e-12);
        assert_eq!(wrap_longitude(-0.0), 0.0);
    }

    #[test]
    fn normalizes_latitude_over_the_pole() {
        let c = GeoCoordinate::new(100.0, 10.0).normalized();
        assert_close(c.lat, 80.0, 1e-12);
        assert_close(c.lon, -170.0, 1e-12);

        let c = GeoCoordinate::new(-95.0, -170.0).normalized();
        assert_close(c.lat, -85.0, 1e-12);
        assert_close(c.lon, 10.0, 1e-12);

        // Both forms describe the same point on the sphere.
        let raw = GeoCoordinate::new(100.0, 10.0);
        let a = to_direction(raw).as_vec3();
        let b = to_direction(raw.normalized()).as_vec3();
        assert!(a.distance(b) < 1e-12);
    }

    #[test]
    fn parses_conventions() {
        assert_eq!(
            "east-toward-negative-z".parse::<LongitudeConvention>(),
            Ok(LongitudeConvention::EastTowardNegativeZ)
        );
        assert_eq!(
            "positive_z".parse::<LongitudeConvention>(),
            Ok(LongitudeConvention::EastTowardPositiveZ)
        );
        assert!("sideways".parse::<LongitudeConvention>().is_err());

        for c in [
            LongitudeConvention::EastTowardNegativeZ,
            LongitudeConvention::EastTowardPositiveZ,
        ] {
            assert_eq!(c.as_str().parse::<LongitudeConvention>(), Ok(c));
        }
    }
}
