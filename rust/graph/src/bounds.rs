// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes.

use geo::{BoundingRect, Coord, LineString, Rect};
use rstar::AABB;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `(min_x, min_y, max_x, max_y)`.
///
/// The constructor normalizes corner order, so `min <= max` holds on both
/// axes for every value of this type. Zero-area (point or segment) boxes are
/// valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates a box spanning the two corners, in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Creates a degenerate box covering a single point.
    pub fn from_point(coord: Coord<f64>) -> Self {
        Self::new(coord.x, coord.y, coord.x, coord.y)
    }

    /// Returns the bounds of a line, or `None` for an empty line.
    pub fn of_line(line: &LineString<f64>) -> Option<Self> {
        line.bounding_rect().map(Self::from)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns `true` if the boxes share at least one point (touching counts).
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains_point(&self, coord: Coord<f64>) -> bool {
        coord.x >= self.min_x && coord.x <= self.max_x && coord.y >= self.min_y && coord.y <= self.max_y
    }

    /// Returns a copy grown by `distance` on every side.
    pub fn expand_by(&self, distance: f64) -> Self {
        Self::new(
            self.min_x - distance,
            self.min_y - distance,
            self.max_x + distance,
            self.max_y + distance,
        )
    }

    /// Returns the smallest box covering both boxes.
    pub fn expand_to_include(&self, other: &BoundingBox) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn to_aabb(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl From<BoundingBox> for Rect<f64> {
    fn from(bounds: BoundingBox) -> Self {
        Rect::new(
            Coord { x: bounds.min_x, y: bounds.min_y },
            Coord { x: bounds.max_x, y: bounds.max_y },
        )
    }
}

impl From<AABB<[f64; 2]>> for BoundingBox {
    fn from(aabb: AABB<[f64; 2]>) -> Self {
        let lower = aabb.lower();
        let upper = aabb.upper();
        Self::new(lower[0], lower[1], upper[0], upper[1])
    }
}
