use std::f64::consts::PI;
use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Radius of the sphere used by the Web Mercator projection
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Coordinate reference system, identified by its EPSG code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub u32);

impl Crs {
    pub const WGS84: Crs = Crs(4326);
    pub const WEB_MERCATOR: Crs = Crs(3857);
    /// MGI / Austria Lambert, the native reference of GIP exports
    pub const AUSTRIA_LAMBERT: Crs = Crs(31287);

    pub fn epsg(&self) -> u32 {
        self.0
    }

    /// Reprojects a point of this reference to longitude/latitude.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCrs`] for references without a built-in
    /// inverse projection.
    pub fn to_lon_lat(&self, point: Point<f64>) -> Result<Point<f64>, Error> {
        match *self {
            Self::WGS84 => Ok(point),
            Self::WEB_MERCATOR => {
                let lon = (point.x() / WEB_MERCATOR_RADIUS).to_degrees();
                let lat = (2.0 * (point.y() / WEB_MERCATOR_RADIUS).exp().atan() - PI / 2.0)
                    .to_degrees();
                Ok(Point::new(lon, lat))
            }
            other => Err(Error::UnsupportedCrs(other.0)),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_mercator_origin_is_null_island() {
        let p = Crs::WEB_MERCATOR.to_lon_lat(Point::new(0.0, 0.0)).unwrap();
        assert!(p.x().abs() < 1e-12);
        assert!(p.y().abs() < 1e-12);
    }

    #[test]
    fn web_mercator_inverts_forward_projection() {
        let (lon, lat) = (16.3731_f64, 48.2082_f64);
        let x = WEB_MERCATOR_RADIUS * lon.to_radians();
        let y = WEB_MERCATOR_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
        let p = Crs::WEB_MERCATOR.to_lon_lat(Point::new(x, y)).unwrap();
        assert!((p.x() - lon).abs() < 1e-9);
        assert!((p.y() - lat).abs() < 1e-9);
    }

    #[test]
    fn lambert_has_no_builtin_inverse() {
        let err = Crs::AUSTRIA_LAMBERT.to_lon_lat(Point::new(0.0, 0.0));
        assert!(matches!(err, Err(Error::UnsupportedCrs(31287))));
    }
}
