// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for the mapstate layer engine.

This crate provides:
- Rectangular map extents (`Extent`).
- Coordinate systems and point/extent reprojection (`CoordinateSystem`).

Design notes:
- `f64` throughout; map coordinates in metres (projected) or degrees (WGS84).
- Extents are normalized on construction, so `min <= max` always holds.
- Reprojection covers the systems the viewer ships with: WGS84 (EPSG:4326),
  Web Mercator (EPSG:3857) and Swiss LV95 (EPSG:2056).
"]

/// Rectangular extents and their set operations.
pub mod extent;
/// Coordinate systems and reprojection.
pub mod projection;

pub use extent::Extent;
pub use projection::CoordinateSystem;
