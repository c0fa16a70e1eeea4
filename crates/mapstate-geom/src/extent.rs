// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangular extent in a single coordinate system.
///
/// Invariants:
/// - `min_x <= max_x` and `min_y <= max_y` (enforced by every constructor).
/// - The coordinate system is implied by the owner; an extent carries no CRS tag.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Extent {
    /// Builds an extent from two opposite corners, in any order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Minimum x coordinate.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Minimum y coordinate.
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Maximum x coordinate.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Maximum y coordinate.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Returns `[min_x, min_y, max_x, max_y]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }

    /// The four corners, counter-clockwise from the bottom-left one.
    #[must_use]
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }

    /// Centre point of the extent.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns `true` when the extent collapses to a single point or a line.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.max_x - self.min_x <= 0.0 || self.max_y - self.min_y <= 0.0
    }

    /// Returns `true` if this extent overlaps `other` (inclusive on edges).
    ///
    /// Inclusive so that a single waypoint lying on the working region border
    /// still counts as inside.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// Returns `true` if the point lies inside the extent (inclusive on edges).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest extent covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Builds the minimal extent that contains all `points`.
    ///
    /// Returns `None` when `points` is empty or contains a non-finite value.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut out: Option<Self> = None;
        for (x, y) in points {
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            out = Some(match out {
                None => Self::new(x, y, x, y),
                Some(e) => Self {
                    min_x: e.min_x.min(x),
                    min_y: e.min_y.min(y),
                    max_x: e.max_x.max(x),
                    max_y: e.max_y.max(y),
                },
            });
        }
        out
    }
}

impl From<[f64; 4]> for Extent {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Extent> for [f64; 4] {
    fn from(e: Extent) -> Self {
        e.to_array()
    }
}
