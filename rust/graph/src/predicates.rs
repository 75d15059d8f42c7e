// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topological line predicates and the graph queries built on them.
//!
//! Index queries only compare bounding boxes. The predicates here refine a
//! candidate set with DE-9IM relations (`geo::Relate`) so that touching
//! endpoints, crossings and shared stretches can be told apart.

use geo::{LineString, PreparedGeometry, Relate};

use crate::bounds::BoundingBox;
use crate::graph::Graph;
use crate::keys::EdgeKey;

/// Pattern for a one-dimensional intersection of interiors.
const LINEAR_INTERIOR_PATTERN: &str = "1********";

/// Returns `true` if `candidate` crosses `reference`: the interiors meet in a
/// set of lower dimension than both lines (points, for two lines).
pub fn crosses(reference: &LineString<f64>, candidate: &LineString<f64>) -> bool {
    reference.relate(candidate).is_crosses()
}

/// Returns `true` if the two lines share a stretch of positive length, as
/// opposed to touching or crossing at points.
pub fn intersects_linearly(a: &LineString<f64>, b: &LineString<f64>) -> bool {
    LinearIntersection::new(a).test(b)
}

/// Crossing test against a fixed reference line, prepared once for repeated
/// use.
pub struct CrossesLine<'a> {
    prepared: PreparedGeometry<'a>,
    bounds: Option<BoundingBox>,
}

impl<'a> CrossesLine<'a> {
    pub fn new(reference: &'a LineString<f64>) -> Self {
        Self {
            prepared: PreparedGeometry::from(reference),
            bounds: BoundingBox::of_line(reference),
        }
    }

    pub fn test(&self, candidate: &LineString<f64>) -> bool {
        let overlapping = match (self.bounds, BoundingBox::of_line(candidate)) {
            (Some(a), Some(b)) => a.intersects(&b),
            _ => false,
        };
        overlapping && self.prepared.relate(candidate).is_crosses()
    }
}

/// Linear-overlap test against a fixed reference line.
///
/// A candidate matches when the bounding boxes overlap, the prepared
/// reference intersects it, and the relation is one of overlaps, contains
/// or within.
pub struct LinearIntersection<'a> {
    prepared: PreparedGeometry<'a>,
    bounds: Option<BoundingBox>,
}

impl<'a> LinearIntersection<'a> {
    pub fn new(reference: &'a LineString<f64>) -> Self {
        Self {
            prepared: PreparedGeometry::from(reference),
            bounds: BoundingBox::of_line(reference),
        }
    }

    pub fn test(&self, candidate: &LineString<f64>) -> bool {
        let overlapping = match (self.bounds, BoundingBox::of_line(candidate)) {
            (Some(a), Some(b)) => a.intersects(&b),
            _ => false,
        };
        if !overlapping {
            return false;
        }
        let matrix = self.prepared.relate(candidate);
        matrix.is_intersects() && (matrix.is_overlaps() || matrix.is_contains() || matrix.is_within())
    }
}

impl<T> Graph<T> {
    /// Other edges sharing a stretch of positive length with `edge`.
    ///
    /// Candidates come from the edge index and are confirmed by a relate
    /// check for a one-dimensional interior intersection. Returns an empty
    /// list for a stale key.
    pub fn edges_intersecting_linearly(&self, edge: EdgeKey) -> Vec<EdgeKey> {
        let Some(query) = self.edges.get(edge) else {
            return Vec::new();
        };
        let prepared = PreparedGeometry::from(&query.line);

        let found: Vec<EdgeKey> = self
            .query_edges(&query.bounds)
            .into_iter()
            .filter(|&candidate| candidate != edge)
            .filter(|&candidate| {
                self.edges.get(candidate).is_some_and(|other| {
                    prepared
                        .relate(&other.line)
                        .matches(LINEAR_INTERIOR_PATTERN)
                        .unwrap_or(false)
                })
            })
            .collect();

        tracing::trace!(?edge, found = found.len(), "linear intersection query");
        found
    }

    /// Edges that cross `line` at points.
    pub fn edges_crossing(&self, line: &LineString<f64>) -> Vec<EdgeKey> {
        let Some(bounds) = BoundingBox::of_line(line) else {
            return Vec::new();
        };
        let test = CrossesLine::new(line);
        self.query_edges(&bounds)
            .into_iter()
            .filter(|&key| self.edges.get(key).is_some_and(|e| test.test(&e.line)))
            .collect()
    }
}
