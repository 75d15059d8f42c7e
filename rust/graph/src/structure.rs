// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural edits: splitting edges, merging pass-through nodes and
//! dissolving the whole graph into maximal lines.
//!
//! Edges are never rewired in place. Every edit adds the replacement edges
//! first and then removes the originals, so shared nodes (and their
//! properties) survive and only nodes left without edges disappear.

use geo::{Coord, LineString};

use crate::dissolve::{DissolveMode, LineDissolver};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::keys::{EdgeKey, NodeKey};

/// Closest point to `p` on segment `a`-`b`, with its distance.
fn project(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> (Coord<f64>, f64) {
    let d = b - a;
    let len2 = d.x * d.x + d.y * d.y;
    let t = if len2 > 0.0 {
        (((p.x - a.x) * d.x + (p.y - a.y) * d.y) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let q = Coord {
        x: a.x + t * d.x,
        y: a.y + t * d.y,
    };
    (q, (p.x - q.x).hypot(p.y - q.y))
}

impl<T: Clone> Graph<T> {
    /// Splits an edge at the point of its line closest to `coord`.
    ///
    /// The two halves copy the edge's payload and properties and replace the
    /// original. Fails with [`Error::SplitAtEndpoint`] when the closest point
    /// is one of the edge's end coordinates.
    pub fn split_edge(&mut self, edge: EdgeKey, coord: Coord<f64>) -> Result<(EdgeKey, EdgeKey)> {
        let original = self.edges.get(edge).ok_or(Error::EdgeNotFound(edge))?;
        let coords = &original.line.0;

        let mut best = (0, coords[0], f64::INFINITY);
        for (i, pair) in coords.windows(2).enumerate() {
            let (q, dist) = project(coord, pair[0], pair[1]);
            if dist < best.2 {
                best = (i, q, dist);
            }
        }
        let (segment, at, _) = best;
        if at == coords[0] || at == coords[coords.len() - 1] {
            return Err(Error::SplitAtEndpoint(edge));
        }

        let mut head: Vec<Coord<f64>> = coords[..=segment].to_vec();
        head.push(at);
        let mut tail = vec![at];
        tail.extend_from_slice(&coords[segment + 1..]);
        let object = original.object.clone();
        let properties = original.properties.clone();

        let first = self.add_edge_with(object.clone(), LineString::new(head), properties.clone())?;
        let second = match self.add_edge_with(object, LineString::new(tail), properties) {
            Ok(key) => key,
            Err(err) => {
                self.remove_edge(first);
                return Err(err);
            }
        };
        self.remove_edge(edge);

        tracing::debug!(?edge, ?first, ?second, x = at.x, y = at.y, "split edge");
        Ok((first, second))
    }

    /// Replaces the two edges meeting at a pass-through node with one edge.
    ///
    /// The node must have exactly two edge ends belonging to two distinct
    /// edges whose far ends differ, so the result is never a loop. The merged
    /// edge keeps the payload and properties of the edge with the lower key
    /// and runs from that edge's far end through `node`.
    pub fn merge_edges_at(&mut self, node: NodeKey) -> Result<EdgeKey> {
        let hub = self.nodes.get(node).ok_or(Error::NodeNotFound(node))?;
        let mut pair: Vec<EdgeKey> = hub.edges().collect();
        pair.sort_unstable();
        pair.dedup();
        if hub.degree() != 2 || pair.len() != 2 {
            return Err(Error::NotMergeable(node));
        }
        let (k1, k2) = (pair[0], pair[1]);
        let e1 = self.edges.get(k1).ok_or(Error::EdgeNotFound(k1))?;
        let e2 = self.edges.get(k2).ok_or(Error::EdgeNotFound(k2))?;
        if e1.opposite(node) == e2.opposite(node) {
            return Err(Error::NotMergeable(node));
        }

        let mut coords: Vec<Coord<f64>> = e1.line.0.clone();
        if e1.start == node {
            coords.reverse();
        }
        let mut rest: Vec<Coord<f64>> = e2.line.0.clone();
        if e2.end == node {
            rest.reverse();
        }
        coords.extend_from_slice(&rest[1..]);
        let object = e1.object.clone();
        let properties = e1.properties.clone();

        let merged = self.add_edge_with(object, LineString::new(coords), properties)?;
        self.remove_edge(k1);
        self.remove_edge(k2);

        tracing::debug!(?node, removed = ?[k1, k2], ?merged, "merged edges");
        Ok(merged)
    }

    /// Merges at every pass-through node. Returns the number of merges.
    pub fn merge_degree_two_nodes(&mut self) -> usize {
        let candidates: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.degree() == 2)
            .map(|(k, _)| k)
            .collect();

        let mut merged = 0;
        for node in candidates {
            if self.nodes.contains_key(node) && self.merge_edges_at(node).is_ok() {
                merged += 1;
            }
        }
        merged
    }
}

impl<T> Graph<T> {
    /// Dissolves every edge line into maximal lines. The graph itself is
    /// left unchanged.
    pub fn dissolve(&self, mode: DissolveMode) -> Result<Vec<LineString<f64>>> {
        let mut dissolver = LineDissolver::with_mode(mode);
        dissolver.add_all(self.edges.values().map(|e| &e.line));
        dissolver.dissolve()
    }
}
