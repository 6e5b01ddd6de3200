/// A `#fix` line after parsing, still in projected coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FixRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    pub name: String,
    /// Projected easting.
    pub x: f64,
    /// Projected northing.
    pub y: f64,
    /// Elevation token exactly as it appeared in the source.
    pub elevation: String,
    /// Free-text note, already XML-escaped. Empty when the line has none.
    pub note: String,
}

/// Geographic position in degrees. Longitude always comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A fix record after reprojection, ready for the GPX writer.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub position: GeoPoint,
    pub elevation: String,
    pub note: String,
}

impl Waypoint {
    pub fn lon(&self) -> f64 {
        self.position.lon
    }

    pub fn lat(&self) -> f64 {
        self.position.lat
    }
}
