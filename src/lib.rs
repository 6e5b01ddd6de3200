pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod transform;
pub mod writer;

pub use error::{ConvertError, Result};
pub use model::{FixRecord, GeoPoint, Waypoint};
pub use parser::{parse_srv, parse_srv_with, ElevationPolicy};
pub use pipeline::{convert, ConvertConfig, ConvertSummary};
pub use transform::UtmTransformer;
pub use writer::GpxWriter;
