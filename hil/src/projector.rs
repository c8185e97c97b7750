//! Local tangent-plane projection (approximate azimuthal equidistant) between
//! geodetic coordinates and local north/east meters.

use std::f64::consts::PI;

pub const EARTH_RADIUS: f64 = 6_371_000.0;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("projector used before a reference point was set")]
    NotInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Reference {
    lat:     f64,
    lon:     f64,
    sin_lat: f64,
    cos_lat: f64,
}

/// Projects around a reference point. `x` grows toward north, `y` toward east.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalPositionProjector {
    reference: Option<Reference>,
}

impl GlobalPositionProjector {
    #[inline]
    pub const fn new() -> Self {
        Self {
            reference: None,
        }
    }

    /// Convenience: a projector already anchored at `lat`, `lon` (degrees).
    pub fn at(lat: f64, lon: f64) -> Self {
        let mut projector = Self::new();
        projector.init(lat, lon);
        projector
    }

    pub fn init(&mut self, lat: f64, lon: f64) {
        let lat = lat.to_radians();
        let lon = lon.to_radians();

        self.reference = Some(Reference {
            lat,
            lon,
            sin_lat: lat.sin(),
            cos_lat: lat.cos(),
        });
    }

    #[inline]
    pub fn reset(&mut self) {
        self.reference = None;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.reference.is_some()
    }

    /// Reference point in degrees.
    pub fn reference(&self) -> Result<(f64, f64), ProjectionError> {
        let r = self.reference.ok_or(ProjectionError::NotInitialized)?;
        Ok((r.lat.to_degrees(), r.lon.to_degrees()))
    }

    /// Degrees to local meters.
    pub fn project(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjectionError> {
        let r = self.reference.ok_or(ProjectionError::NotInitialized)?;

        let lat = lat.to_radians();
        let lon = lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let cos_d_lon = (lon - r.lon).cos();

        let c = (r.sin_lat * sin_lat + r.cos_lat * cos_lat * cos_d_lon).clamp(-1., 1.).acos();
        let k = if c == 0. { 1. } else { c / c.sin() };

        let x = k * (r.cos_lat * sin_lat - r.sin_lat * cos_lat * cos_d_lon) * EARTH_RADIUS;
        let y = k * cos_lat * (lon - r.lon).sin() * EARTH_RADIUS;

        Ok((x, y))
    }

    /// Local meters to degrees.
    pub fn reproject(&self, x: f64, y: f64) -> Result<(f64, f64), ProjectionError> {
        let r = self.reference.ok_or(ProjectionError::NotInitialized)?;

        let x_rad = x / EARTH_RADIUS;
        let y_rad = y / EARTH_RADIUS;
        let c = (x_rad * x_rad + y_rad * y_rad).sqrt();

        if c == 0. {
            return Ok((r.lat * 180. / PI, r.lon * 180. / PI));
        }

        let (sin_c, cos_c) = c.sin_cos();
        let lat = (cos_c * r.sin_lat + (x_rad * sin_c * r.cos_lat) / c).asin();
        let lon = r.lon + (y_rad * sin_c).atan2(c * r.cos_lat * cos_c - x_rad * r.sin_lat * sin_c);

        Ok((lat * 180. / PI, lon * 180. / PI))
    }
}
