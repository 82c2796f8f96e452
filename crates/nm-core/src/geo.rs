//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` (double-precision) latitude/longitude.  Matching
//! compares distances between many nearby candidates, so the extra precision
//! keeps tie-breaks stable where `f32` rounding would reorder agents a few
//! centimetres apart.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// A WGS-84 geographic coordinate in degrees.
///
/// `GeoPoint` is a plain value: copy it freely.  Use [`GeoPoint::try_new`] at
/// trust boundaries (feeds, rider requests); [`GeoPoint::new`] performs no
/// validation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Construct a point, rejecting out-of-range or non-finite coordinates.
    pub fn try_new(lat: f64, lon: f64) -> CoreResult<Self> {
        let p = Self { lat, lon };
        p.validate()?;
        Ok(p)
    }

    /// `true` if latitude ∈ [-90, 90] and longitude ∈ [-180, 180].
    ///
    /// NaN fails both range checks, so it is never valid.
    #[inline]
    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn validate(self) -> CoreResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CoreError::InvalidPosition { lat: self.lat, lon: self.lon })
        }
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        // Rounding can push `a` just past 1 for near-antipodal points.
        let a = ((d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2))
        .clamp(0.0, 1.0);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Project onto the unit sphere as `[x, y, z]`.
    ///
    /// Straight-line (chord) distance between two projected points grows
    /// monotonically with their great-circle angle, so a Euclidean nearest
    /// neighbour search over these vectors ranks points exactly as haversine
    /// does, across the poles and the antimeridian.
    #[inline]
    pub fn to_unit_vector(self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── DistanceUnit ──────────────────────────────────────────────────────────────

/// Unit used when presenting distances.  Internally everything is kilometres.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceUnit {
    #[default]
    Kilometres,
    Metres,
    Miles,
}

impl DistanceUnit {
    const KM_PER_MILE: f64 = 1.609_344;

    /// Convert a distance in kilometres to this unit.
    #[inline]
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometres => km,
            DistanceUnit::Metres     => km * 1_000.0,
            DistanceUnit::Miles      => km / Self::KM_PER_MILE,
        }
    }

    /// Short suffix for display, e.g. `"km"`.
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Kilometres => "km",
            DistanceUnit::Metres     => "m",
            DistanceUnit::Miles      => "mi",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
