//! Reprojection from a projected CRS (UTM) to geographic degrees.
//!
//! The target is the geographic CRS of the source datum, so the result is the
//! plain inverse map projection with no datum shift. Both CRSs use traditional
//! GIS axis order: easting before northing, longitude before latitude.
//!
//! Unprojected points must fall inside the EPSG area of use of the CRS,
//! widened by [`AREA_MARGIN_DEGREES`]. Points further out are rejected.

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use crate::model::{FixRecord, GeoPoint, Waypoint};

/// NAD83(CSRS98) / UTM zone 11N
pub const DEFAULT_EPSG: u32 = 2153;

/// Slack around the area of use, in degrees. Zone 11N is 6 degrees wide.
pub const AREA_MARGIN_DEGREES: f64 = 1.0;

/// Geographic bounding box a CRS is valid for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UseArea {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl UseArea {
    /// True when `point` lies inside the box widened by `margin` degrees.
    /// Boxes with `west > east` cross the antimeridian.
    pub fn contains(&self, point: &GeoPoint, margin: f64) -> bool {
        let lat_ok = point.lat >= self.south - margin && point.lat <= self.north + margin;
        let lon_ok = if self.west <= self.east {
            point.lon >= self.west - margin && point.lon <= self.east + margin
        } else {
            point.lon >= self.west - margin || point.lon <= self.east + margin
        };
        lat_ok && lon_ok
    }
}

pub struct UtmTransformer {
    epsg: u32,
    area: Option<UseArea>,
    inverse: CoordTransform,
    forward: CoordTransform,
}

impl UtmTransformer {
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        let mut projected = SpatialRef::from_epsg(epsg).map_err(|e| {
            ConvertError::Projection(format!("EPSG:{} is not a usable reference system: {}", epsg, e))
        })?;

        if !projected.is_projected() {
            return Err(ConvertError::Projection(format!(
                "EPSG:{} is not a projected reference system",
                epsg
            )));
        }

        let mut geographic = projected.geog_cs().map_err(|e| {
            ConvertError::Projection(format!("EPSG:{} has no geographic base: {}", epsg, e))
        })?;

        projected.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        geographic.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);

        let inverse = CoordTransform::new(&projected, &geographic).map_err(|e| {
            ConvertError::Projection(format!("cannot build inverse transform for EPSG:{}: {}", epsg, e))
        })?;
        let forward = CoordTransform::new(&geographic, &projected).map_err(|e| {
            ConvertError::Projection(format!("cannot build forward transform for EPSG:{}: {}", epsg, e))
        })?;

        let area = projected.area_of_use().map(|a| UseArea {
            west: a.west_lon_degree,
            south: a.south_lat_degree,
            east: a.east_lon_degree,
            north: a.north_lat_degree,
        });
        match &area {
            Some(area) => debug!("Projection ready: EPSG:{} -> geographic, area {:?}", epsg, area),
            None => warn!("EPSG:{} has no area of use, only global bounds are checked", epsg),
        }

        Ok(Self {
            epsg,
            area,
            inverse,
            forward,
        })
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn area(&self) -> Option<UseArea> {
        self.area
    }

    /// Inverse projection of a single `(x, y)` pair.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<GeoPoint> {
        let mut xs = [x];
        let mut ys = [y];
        self.inverse
            .transform_coords(&mut xs, &mut ys, &mut [])
            .map_err(|e| {
                ConvertError::Projection(format!("({}, {}) cannot be unprojected: {}", x, y, e))
            })?;

        let point = GeoPoint::new(xs[0], ys[0]);
        let in_area = self
            .area
            .map_or(true, |area| area.contains(&point, AREA_MARGIN_DEGREES));
        if !in_geographic_domain(&point) || !in_area {
            return Err(ConvertError::Projection(format!(
                "({}, {}) is outside the domain of EPSG:{}",
                x, y, self.epsg
            )));
        }

        Ok(point)
    }

    /// Forward projection of a geographic point, returned as `(x, y)`.
    pub fn to_projected(&self, point: GeoPoint) -> Result<(f64, f64)> {
        let mut xs = [point.lon];
        let mut ys = [point.lat];
        self.forward
            .transform_coords(&mut xs, &mut ys, &mut [])
            .map_err(|e| {
                ConvertError::Projection(format!(
                    "({}, {}) cannot be projected: {}",
                    point.lon, point.lat, e
                ))
            })?;

        if !xs[0].is_finite() || !ys[0].is_finite() {
            return Err(ConvertError::Projection(format!(
                "({}, {}) is outside the domain of EPSG:{}",
                point.lon, point.lat, self.epsg
            )));
        }

        Ok((xs[0], ys[0]))
    }

    pub fn to_waypoint(&self, record: FixRecord) -> Result<Waypoint> {
        let position = self.to_geographic(record.x, record.y).map_err(|e| {
            let message = match e {
                ConvertError::Projection(message) => message,
                other => other.to_string(),
            };
            ConvertError::RecordProjection {
                line: record.line,
                name: record.name.clone(),
                message,
            }
        })?;

        Ok(Waypoint {
            name: record.name,
            position,
            elevation: record.elevation,
            note: record.note,
        })
    }

    /// Transforms every record in order, stopping at the first failure.
    pub fn to_waypoints(&self, records: Vec<FixRecord>) -> Result<Vec<Waypoint>> {
        records
            .into_iter()
            .map(|record| self.to_waypoint(record))
            .collect()
    }
}

fn in_geographic_domain(point: &GeoPoint) -> bool {
    point.lon.is_finite()
        && point.lat.is_finite()
        && point.lon.abs() <= 180.0
        && point.lat.abs() <= 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-7;

    // Skips when the EPSG registry is not reachable from this GDAL build.
    fn transformer() -> Option<UtmTransformer> {
        match UtmTransformer::from_epsg(DEFAULT_EPSG) {
            Ok(t) => Some(t),
            Err(e) => {
                eprintln!("Skipping test: EPSG:{} unavailable ({})", DEFAULT_EPSG, e);
                None
            }
        }
    }

    fn record(name: &str, x: f64, y: f64) -> FixRecord {
        FixRecord {
            line: 7,
            name: name.to_string(),
            x,
            y,
            elevation: "1234.5".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_central_meridian_inverse() {
        let Some(t) = transformer() else { return };

        let point = t.to_geographic(500000.0, 5600000.0).unwrap();

        assert!((point.lon - -117.0).abs() < TOLERANCE, "lon = {}", point.lon);
        assert!(
            (point.lat - 50.551932383806).abs() < TOLERANCE,
            "lat = {}",
            point.lat
        );
    }

    #[test]
    fn test_off_meridian_inverse() {
        let Some(t) = transformer() else { return };

        let point = t.to_geographic(600000.0, 5600000.0).unwrap();

        assert!((point.lon - -115.588661229607).abs() < TOLERANCE, "lon = {}", point.lon);
        assert!((point.lat - 50.543379555845).abs() < TOLERANCE, "lat = {}", point.lat);
    }

    #[test]
    fn test_round_trip() {
        let Some(t) = transformer() else { return };

        let points = [
            GeoPoint::new(-117.0, 50.0),
            GeoPoint::new(-116.2345678, 51.4321),
            GeoPoint::new(-119.5, 49.1),
            GeoPoint::new(-114.75, 55.9),
        ];

        for point in points {
            let (x, y) = t.to_projected(point).unwrap();
            let back = t.to_geographic(x, y).unwrap();

            assert!(
                (back.lon - point.lon).abs() < TOLERANCE && (back.lat - point.lat).abs() < TOLERANCE,
                "{:?} came back as {:?}",
                point,
                back
            );
        }
    }

    #[test]
    fn test_waypoint_keeps_fields() {
        let Some(t) = transformer() else { return };

        let mut input = record("P2", 500000.0, 5600000.0);
        input.note = "Entrance to cave".to_string();

        let waypoint = t.to_waypoint(input).unwrap();

        assert_eq!(waypoint.name, "P2");
        assert_eq!(waypoint.elevation, "1234.5");
        assert_eq!(waypoint.note, "Entrance to cave");
        assert!((waypoint.lon() - -117.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_waypoints_keep_order() {
        let Some(t) = transformer() else { return };

        let records = vec![
            record("C", 500000.0, 5700000.0),
            record("A", 500000.0, 5600000.0),
            record("B", 500000.0, 5650000.0),
        ];

        let waypoints = t.to_waypoints(records).unwrap();

        let names: Vec<&str> = waypoints.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert!(waypoints[0].lat() > waypoints[2].lat());
        assert!(waypoints[2].lat() > waypoints[1].lat());
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let Some(t) = transformer() else { return };

        let err = t.to_waypoint(record("Bad", f64::INFINITY, 5600000.0)).unwrap_err();

        match err {
            ConvertError::RecordProjection { line, name, .. } => {
                assert_eq!(line, 7);
                assert_eq!(name, "Bad");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_far_outside_zone_is_rejected() {
        let Some(t) = transformer() else { return };
        if t.area().is_none() {
            eprintln!("Skipping test: EPSG:{} has no area of use", DEFAULT_EPSG);
            return;
        }

        let err = t.to_geographic(3000000.0, 5600000.0).unwrap_err();
        assert!(matches!(err, ConvertError::Projection(_)));

        let err = t.to_waypoint(record("Far", 3000000.0, 5600000.0)).unwrap_err();
        assert!(matches!(err, ConvertError::RecordProjection { line: 7, .. }));
    }

    #[test]
    fn test_use_area_contains() {
        let zone = UseArea {
            west: -120.0,
            south: 49.0,
            east: -114.0,
            north: 60.0,
        };

        assert!(zone.contains(&GeoPoint::new(-117.0, 50.5), 0.0));
        assert!(zone.contains(&GeoPoint::new(-120.5, 48.5), 1.0));
        assert!(!zone.contains(&GeoPoint::new(-120.5, 50.0), 0.0));
        assert!(!zone.contains(&GeoPoint::new(-90.0, 50.0), 1.0));
        assert!(!zone.contains(&GeoPoint::new(-117.0, 70.0), 1.0));
    }

    #[test]
    fn test_use_area_across_antimeridian() {
        let pacific = UseArea {
            west: 170.0,
            south: -50.0,
            east: -170.0,
            north: -30.0,
        };

        assert!(pacific.contains(&GeoPoint::new(175.0, -40.0), 0.0));
        assert!(pacific.contains(&GeoPoint::new(-175.0, -40.0), 0.0));
        assert!(!pacific.contains(&GeoPoint::new(0.0, -40.0), 0.0));
    }

    #[test]
    fn test_unknown_epsg() {
        let err = UtmTransformer::from_epsg(999_999).err().unwrap();

        assert!(matches!(err, ConvertError::Projection(_)));
    }

    #[test]
    fn test_geographic_epsg_is_rejected() {
        let err = UtmTransformer::from_epsg(4326).err().unwrap();

        assert!(matches!(err, ConvertError::Projection(_)));
    }
}
