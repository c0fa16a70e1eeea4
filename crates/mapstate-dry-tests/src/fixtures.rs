// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sample catalog layers and file bodies.

use mapstate_core::{FileFormat, Layer, RasterProtocol, TimeConfig, TimeEntry};
use mapstate_geom::Extent;

/// Colour national map (background).
pub const NATIONAL_MAP: &str = "ch.swisstopo.pixelkarte-farbe";
/// Aerial imagery (background, linked to its 3D twin by the default config).
pub const SWISSIMAGE: &str = "ch.swisstopo.swissimage";
/// 3D aerial imagery.
pub const SWISSIMAGE_3D: &str = "ch.swisstopo.swissimage_3d";
/// Water protection zones (WMS, identifiable).
pub const WATER_PROTECTION: &str = "ch.bafu.gewaesserschutz";
/// Historical map series (time-enabled).
pub const TIME_SERIES: &str = "ch.swisstopo.zeitreihen";
/// 3D twin of the historical series.
pub const TIME_SERIES_3D: &str = "ch.swisstopo.zeitreihen_3d";

/// Rough WGS84 bounds of Switzerland.
pub fn swiss_bounds_wgs84() -> Extent {
    Extent::new(5.96, 45.82, 10.49, 47.81)
}

fn series_entries() -> Vec<TimeEntry> {
    vec![
        TimeEntry::new("20211231"),
        TimeEntry::new("20191231"),
        TimeEntry::new("19501231"),
        TimeEntry::new("18641231"),
    ]
}

/// Sample catalog with English names.
pub fn catalog() -> Vec<Layer> {
    catalog_localized("en")
}

/// Sample catalog whose names carry a `[lang]` prefix for any language but English.
pub fn catalog_localized(lang: &str) -> Vec<Layer> {
    let name = |base: &str| {
        if lang == "en" {
            base.to_owned()
        } else {
            format!("[{lang}] {base}")
        }
    };
    vec![
        Layer::raster(NATIONAL_MAP, name("National Map"), RasterProtocol::Wmts)
            .with_background(),
        Layer::raster(SWISSIMAGE, name("Aerial imagery"), RasterProtocol::Wmts)
            .with_background(),
        Layer::raster(
            SWISSIMAGE_3D,
            name("Aerial imagery 3D"),
            RasterProtocol::Wmts,
        ),
        Layer::raster(
            WATER_PROTECTION,
            name("Water protection"),
            RasterProtocol::Wms,
        )
        .with_tooltip()
        .with_extent(swiss_bounds_wgs84()),
        Layer::time_enabled(
            TIME_SERIES,
            name("Journey through time"),
            RasterProtocol::Wmts,
            TimeConfig::latest(series_entries()),
        )
        .with_tooltip()
        .with_alternate(TIME_SERIES_3D),
        Layer::time_enabled(
            TIME_SERIES_3D,
            name("Journey through time 3D"),
            RasterProtocol::Wmts,
            TimeConfig::latest(series_entries()),
        ),
    ]
}

/// External WMS layer from `base_url`.
pub fn external_wms(id: &str, base_url: &str) -> Layer {
    Layer::external(id, id, base_url, RasterProtocol::Wms)
}

/// KML file layer fetched from `url`.
pub fn kml_layer(url: &str) -> Layer {
    Layer::file(url, FileFormat::Kml, Some(url.to_owned()))
}

/// GPX file layer fetched from `url`.
pub fn gpx_layer(url: &str) -> Layer {
    Layer::file(url, FileFormat::Gpx, Some(url.to_owned()))
}

/// Named KML around Bern.
pub const KML_BERN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <name>Bern walk</name>
    <Placemark>
      <name>Federal Palace</name>
      <LineString><coordinates>7.4440,46.9465,540 7.4510,46.9480,545</coordinates></LineString>
    </Placemark>
  </Document>
</kml>"#;

/// Unnamed KML around Paris, outside the Swiss working region.
pub const KML_PARIS: &str = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark><Point><coordinates>2.3522,48.8566</coordinates></Point></Placemark>
  </Document>
</kml>"#;

/// Well-formed KML without any geometry.
pub const KML_EMPTY: &str =
    r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document></Document></kml>"#;

/// KML with mismatched tags.
pub const KML_MALFORMED: &str = "<kml><Document><Placemark></Document></kml>";

/// GPX track along Lake Geneva.
pub const GPX_LAUSANNE: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="mapstate">
  <metadata><name>Lakeside run</name></metadata>
  <trk><name>Run</name><trkseg>
    <trkpt lat="46.5070" lon="6.6260"/>
    <trkpt lat="46.5100" lon="6.6400"/>
  </trkseg></trk>
</gpx>"#;
