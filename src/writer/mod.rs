use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::error::{ConvertError, Result};
use crate::model::Waypoint;

const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Serializes waypoints as a GPX 1.0 document.
///
/// Waypoint `name` and `elevation` are written as-is and must already be
/// safe XML text (plain identifiers and numbers). `note` is written as-is
/// because the parser escapes it. Title and creator are escaped here.
pub struct GpxWriter {
    title: String,
    creator: String,
}

impl GpxWriter {
    pub fn new(title: impl Into<String>, creator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            creator: creator.into(),
        }
    }

    /// Renders the document and writes it to `output_path`, stamped with
    /// the current UTC time. Nothing is written if rendering fails.
    pub fn write(&self, waypoints: &[Waypoint], output_path: &Path) -> Result<()> {
        let document = self.render(waypoints, Utc::now())?;

        fs::write(output_path, document).map_err(|source| ConvertError::Write {
            path: output_path.to_path_buf(),
            source,
        })?;

        info!(
            "Wrote {} waypoints to {}",
            waypoints.len(),
            output_path.display()
        );
        Ok(())
    }

    pub fn render(&self, waypoints: &[Waypoint], time: DateTime<Utc>) -> Result<String> {
        // Zero-width indentation puts every element on its own line.
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 0);

        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let root = BytesStart::new("gpx").with_attributes([
            ("version", "1.0"),
            ("creator", self.creator.as_str()),
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xmlns", GPX_NAMESPACE),
        ]);
        emit(&mut writer, Event::Start(root))?;

        let timestamp = time.format(TIME_FORMAT).to_string();
        text_element(&mut writer, "time", BytesText::new(&timestamp))?;
        text_element(&mut writer, "name", BytesText::new(&self.title))?;

        for waypoint in waypoints {
            self.write_waypoint(&mut writer, waypoint)?;
        }

        emit(&mut writer, Event::End(BytesEnd::new("gpx")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| ConvertError::Xml(e.to_string()))
    }

    fn write_waypoint(&self, writer: &mut Writer<Vec<u8>>, waypoint: &Waypoint) -> Result<()> {
        let lat = waypoint.lat().to_string();
        let lon = waypoint.lon().to_string();

        let start = BytesStart::new("wpt").with_attributes([("lat", lat.as_str()), ("lon", lon.as_str())]);
        emit(writer, Event::Start(start))?;

        text_element(writer, "ele", BytesText::from_escaped(waypoint.elevation.as_str()))?;
        text_element(writer, "name", BytesText::from_escaped(waypoint.name.as_str()))?;
        text_element(writer, "desc", BytesText::from_escaped(waypoint.note.as_str()))?;

        emit(writer, Event::End(BytesEnd::new("wpt")))
    }
}

fn text_element(writer: &mut Writer<Vec<u8>>, tag: &str, text: BytesText<'_>) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(tag)))?;
    emit(writer, Event::Text(text))?;
    emit(writer, Event::End(BytesEnd::new(tag)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ConvertError::Xml(e.to_string()))
}
