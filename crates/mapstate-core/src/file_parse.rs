// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Minimal KML/GPX readers: display name and WGS84 bounding extent.
//!
//! Only what the engine derives from file bodies is read. Styles, geometry
//! topology and extended data are out of reach here and stay with the
//! renderer.

use mapstate_geom::Extent;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::layer::FileFormat;

enum Item<'a> {
    Element(&'a BytesStart<'a>),
    Text(&'a str),
}

/// Streams `text`, handing each element (with its parent path) and each text
/// node (with the path of its enclosing element) to `visit`.
fn scan<F>(text: &str, mut visit: F) -> Result<(), quick_xml::Error>
where
    F: FnMut(&[String], Item<'_>) -> Result<(), quick_xml::Error>,
{
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                visit(&path, Item::Element(&e))?;
                let local = e.local_name();
                path.push(String::from_utf8_lossy(local.as_ref()).into_owned());
            }
            Event::Empty(e) => visit(&path, Item::Element(&e))?,
            Event::End(_) => {
                path.pop();
            }
            Event::Text(t) => {
                let content = t.unescape()?;
                visit(&path, Item::Text(&content))?;
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let content = String::from_utf8_lossy(&raw);
                visit(&path, Item::Text(&content))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Display name of a file.
///
/// KML prefers the `Document` name, GPX the `metadata` name; either falls back
/// to the first `name` element. Malformed input yields whatever was read
/// before the error.
#[must_use]
pub fn parse_name(format: FileFormat, text: &str) -> Option<String> {
    let preferred_parent = match format {
        FileFormat::Kml => "Document",
        FileFormat::Gpx => "metadata",
    };
    let mut preferred = None;
    let mut first = None;
    let result = scan(text, |path, item| {
        let Item::Text(content) = item else {
            return Ok(());
        };
        let content = content.trim();
        if content.is_empty() || path.last().map(String::as_str) != Some("name") {
            return Ok(());
        }
        let parent = path.len().checked_sub(2).and_then(|i| path.get(i));
        if preferred.is_none() && parent.map(String::as_str) == Some(preferred_parent) {
            preferred = Some(content.to_owned());
        }
        if first.is_none() {
            first = Some(content.to_owned());
        }
        Ok(())
    });
    if let Err(err) = result {
        debug!(%err, "malformed file while reading its name");
    }
    preferred.or(first)
}

/// Bounding extent (WGS84) of the geometry in `text`.
///
/// `Ok(None)` means the file is well-formed but carries no coordinate.
pub fn parse_extent(format: FileFormat, text: &str) -> Result<Option<Extent>, quick_xml::Error> {
    let mut points = Vec::new();
    match format {
        FileFormat::Kml => scan(text, |path, item| {
            if let Item::Text(content) = item {
                match path.last().map(String::as_str) {
                    Some("coordinates") => {
                        points.extend(content.split_whitespace().filter_map(kml_tuple));
                    }
                    Some("coord") => points.extend(gx_coord(content)),
                    _ => {}
                }
            }
            Ok(())
        })?,
        FileFormat::Gpx => scan(text, |_, item| {
            if let Item::Element(e) = item {
                if matches!(e.local_name().as_ref(), b"wpt" | b"trkpt" | b"rtept") {
                    points.extend(gpx_point(e)?);
                }
            }
            Ok(())
        })?,
    }
    Ok(Extent::from_points(points))
}

fn kml_tuple(tuple: &str) -> Option<(f64, f64)> {
    let mut parts = tuple.split(',');
    let lon = parts.next()?.trim().parse().ok()?;
    let lat = parts.next()?.trim().parse().ok()?;
    Some((lon, lat))
}

fn gx_coord(content: &str) -> Option<(f64, f64)> {
    let mut parts = content.split_whitespace();
    let lon = parts.next()?.parse().ok()?;
    let lat = parts.next()?.parse().ok()?;
    Some((lon, lat))
}

fn gpx_point(e: &BytesStart<'_>) -> Result<Option<(f64, f64)>, quick_xml::Error> {
    let (Some(lat), Some(lon)) = (e.try_get_attribute("lat")?, e.try_get_attribute("lon")?) else {
        return Ok(None);
    };
    let lat = lat.unescape_value()?.trim().parse::<f64>().ok();
    let lon = lon.unescape_value()?.trim().parse::<f64>().ok();
    Ok(lon.zip(lat))
}
