// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-edge line dissolve.
//!
//! Input lines are broken into segments and stored as pairs of directed
//! half-edges. Identical segments collapse into one pair, so overlapping
//! input is deduplicated. The dissolve pass then walks maximal chains
//! between nodes (vertices whose degree is not 2) and emits one line per
//! chain. Components without any node are closed rings and come out as
//! closed lines.
//!
//! Half-edges live in a flat arena. The two halves of a segment sit at
//! indices `2k` and `2k + 1`, so the symmetric half of `e` is `e ^ 1`.

use geo::{Coord, LineString};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graph::coord_key;
use crate::ordering::{compare_coords, compare_direction_ccw};

/// Where chains may be joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DissolveMode {
    /// Join through every degree-2 vertex, merging input lines end to end.
    #[default]
    Merge,
    /// Never join across an endpoint of an input line.
    PreserveLineEnds,
}

#[derive(Debug, Clone)]
struct HalfEdge {
    origin: Coord<f64>,
    /// Next half-edge counter-clockwise around `origin`.
    next: usize,
    marked: bool,
    /// First half-edge of an input line, or the reverse of its last one.
    is_start: bool,
}

/// Merges line work into maximal lines.
///
/// # Example
///
/// ```
/// use geo::line_string;
/// use planar_graph::LineDissolver;
///
/// let mut dissolver = LineDissolver::new();
/// dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
/// dissolver.add(&line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]);
///
/// let lines = dissolver.dissolve().unwrap();
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines[0].0.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineDissolver {
    mode: DissolveMode,
    half_edges: Vec<HalfEdge>,
    /// One outgoing half-edge per vertex.
    vertices: FxHashMap<(u64, u64), usize>,
    lines_added: usize,
}

#[inline]
fn sym(e: usize) -> usize {
    e ^ 1
}

impl LineDissolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: DissolveMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> DissolveMode {
        self.mode
    }

    /// Number of distinct segments stored.
    pub fn segment_count(&self) -> usize {
        self.half_edges.len() / 2
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Adds every segment of `line`. Zero-length segments are skipped and
    /// segments already present are reused.
    pub fn add(&mut self, line: &LineString<f64>) {
        let mut first = None;
        let mut last = None;
        for pair in line.0.windows(2) {
            if let Some(e) = self.add_segment(pair[0], pair[1]) {
                if first.is_none() {
                    first = Some(e);
                }
                last = Some(e);
            }
        }
        if let (Some(first), Some(last)) = (first, last) {
            self.half_edges[first].is_start = true;
            self.half_edges[sym(last)].is_start = true;
            self.lines_added += 1;
        }
    }

    pub fn add_all<'a, I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = &'a LineString<f64>>,
    {
        for line in lines {
            self.add(line);
        }
    }

    /// Computes the dissolved lines.
    ///
    /// Chains starting at nodes come first, in half-edge insertion order,
    /// followed by closed rings. Every stored segment appears in exactly one
    /// output line.
    pub fn dissolve(&mut self) -> Result<Vec<LineString<f64>>> {
        for he in &mut self.half_edges {
            he.marked = false;
        }

        let mut result = Vec::new();
        for e in 0..self.half_edges.len() {
            if !self.half_edges[e].marked && self.is_node(e) {
                result.push(self.build_line(e)?);
            }
        }
        let chains = result.len();

        for e in 0..self.half_edges.len() {
            if !self.half_edges[e].marked {
                result.push(self.build_ring(e)?);
            }
        }

        tracing::debug!(
            lines_in = self.lines_added,
            segments = self.segment_count(),
            chains,
            rings = result.len() - chains,
            mode = ?self.mode,
            "dissolved lines"
        );
        Ok(result)
    }

    fn dest(&self, e: usize) -> Coord<f64> {
        self.half_edges[sym(e)].origin
    }

    /// Finds the half-edge `a -> b`, creating the segment if needed.
    fn add_segment(&mut self, a: Coord<f64>, b: Coord<f64>) -> Option<usize> {
        if a == b {
            return None;
        }
        if let Some(&out) = self.vertices.get(&coord_key(a)) {
            if let Some(existing) = self.ring(out).into_iter().find(|&e| self.dest(e) == b) {
                return Some(existing);
            }
        }

        let e = self.half_edges.len();
        self.half_edges.push(HalfEdge {
            origin: a,
            next: e,
            marked: false,
            is_start: false,
        });
        self.half_edges.push(HalfEdge {
            origin: b,
            next: e + 1,
            marked: false,
            is_start: false,
        });
        self.insert_into_ring(e);
        self.insert_into_ring(e + 1);
        Some(e)
    }

    /// Half-edges leaving the origin of `start`, following `next`.
    fn ring(&self, start: usize) -> Vec<usize> {
        let mut out = vec![start];
        let mut e = self.half_edges[start].next;
        while e != start && out.len() <= self.half_edges.len() {
            out.push(e);
            e = self.half_edges[e].next;
        }
        out
    }

    fn direction(&self, e: usize) -> Coord<f64> {
        self.dest(e) - self.half_edges[e].origin
    }

    fn insert_into_ring(&mut self, e: usize) {
        let key = coord_key(self.half_edges[e].origin);
        let Some(&out) = self.vertices.get(&key) else {
            self.vertices.insert(key, e);
            return;
        };

        let mut ring = self.ring(out);
        ring.push(e);
        ring.sort_by(|&a, &b| compare_direction_ccw(self.direction(a), self.direction(b)));
        for (i, &he) in ring.iter().enumerate() {
            self.half_edges[he].next = ring[(i + 1) % ring.len()];
        }
    }

    /// Whether a chain must start or end at the origin of `e`.
    fn is_node(&self, e: usize) -> bool {
        let ring = self.ring(e);
        ring.len() != 2
            || (self.mode == DissolveMode::PreserveLineEnds
                && ring.iter().any(|&out| self.half_edges[out].is_start))
    }

    fn mark(&mut self, e: usize) -> Result<()> {
        if self.half_edges[e].marked || self.half_edges[sym(e)].marked {
            return Err(Error::HalfEdgeRevisited(e));
        }
        self.half_edges[e].marked = true;
        self.half_edges[sym(e)].marked = true;
        Ok(())
    }

    /// Walks from a node through pass-through vertices to the next node.
    fn build_line(&mut self, start: usize) -> Result<LineString<f64>> {
        let mut coords = vec![self.half_edges[start].origin];
        let mut e = start;
        loop {
            self.mark(e)?;
            coords.push(self.dest(e));
            if self.is_node(sym(e)) {
                break;
            }
            // At a degree-2 vertex the continuation is the other outgoing half.
            e = self.half_edges[sym(e)].next;
        }
        Ok(LineString::new(coords))
    }

    /// Emits the closed ring containing `start`, beginning at its lowest
    /// input line end if it has one.
    fn build_ring(&mut self, start: usize) -> Result<LineString<f64>> {
        let limit = self.half_edges.len();
        let mut ring = vec![start];
        let mut e = self.half_edges[sym(start)].next;
        while e != start {
            if ring.len() >= limit {
                return Err(Error::RingNotClosed(start));
            }
            ring.push(e);
            e = self.half_edges[sym(e)].next;
        }

        let n = ring.len();
        let is_line_end = |i: usize| {
            self.half_edges[ring[i]].is_start || self.half_edges[sym(ring[(i + n - 1) % n])].is_start
        };
        let first = (0..n)
            .filter(|&i| is_line_end(i))
            .min_by(|&a, &b| {
                compare_coords(self.half_edges[ring[a]].origin, self.half_edges[ring[b]].origin)
            })
            .unwrap_or(0);
        ring.rotate_left(first);

        let mut coords = Vec::with_capacity(n + 1);
        for &he in &ring {
            self.mark(he)?;
            coords.push(self.half_edges[he].origin);
        }
        coords.push(self.half_edges[ring[0]].origin);
        Ok(LineString::new(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use std::cmp::Ordering;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn coords(line: &LineString<f64>) -> Vec<(f64, f64)> {
        line.0.iter().map(|c| (c.x, c.y)).collect()
    }

    /// Lines with orientation normalized so results compare as sets.
    fn normalized(lines: &[LineString<f64>]) -> Vec<Vec<(f64, f64)>> {
        let mut out: Vec<Vec<(f64, f64)>> = lines
            .iter()
            .map(|l| {
                let forward = coords(l);
                let mut backward = forward.clone();
                backward.reverse();
                if backward < forward {
                    backward
                } else {
                    forward
                }
            })
            .collect();
        out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        out
    }

    fn segments(lines: &[LineString<f64>]) -> usize {
        lines.iter().map(|l| l.0.len() - 1).sum()
    }

    #[test]
    fn merges_through_degree_two_vertex() {
        let mut dissolver = LineDissolver::new();
        dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]);

        let lines = dissolver.dissolve().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(coords(&lines[0]), vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    }

    #[test]
    fn merges_opposing_orientations() {
        let mut dissolver = LineDissolver::new();
        dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 2.0, y: 0.0), (x: 1.0, y: 0.0)]);

        let lines = dissolver.dissolve().unwrap();
        assert_eq!(
            normalized(&lines),
            vec![vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]]
        );
    }

    #[test]
    fn preserve_mode_keeps_line_ends() {
        let mut dissolver = LineDissolver::with_mode(DissolveMode::PreserveLineEnds);
        dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 2.0, y: 0.0), (x: 3.0, y: 0.0), (x: 4.0, y: 0.0)]);

        let lines = dissolver.dissolve().unwrap();
        assert_eq!(
            normalized(&lines),
            vec![
                vec![(0.0, 0.0), (1.0, 0.0)],
                vec![(1.0, 0.0), (2.0, 0.0)],
                vec![(2.0, 0.0), (3.0, 0.0), (4.0, 0.0)],
            ]
        );
    }

    #[test]
    fn duplicate_and_zero_length_segments() {
        let mut dissolver = LineDissolver::new();
        dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 1.0, y: 0.0), (x: 0.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 5.0, y: 5.0), (x: 5.0, y: 5.0)]);

        assert_eq!(dissolver.segment_count(), 1);
        assert_eq!(dissolver.vertex_count(), 2);
        let lines = dissolver.dissolve().unwrap();
        assert_eq!(normalized(&lines), vec![vec![(0.0, 0.0), (1.0, 0.0)]]);
    }

    #[test]
    fn t_junction_splits_into_three() {
        let mut dissolver = LineDissolver::new();
        dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 2.0)]);

        let lines = dissolver.dissolve().unwrap();
        assert_eq!(
            normalized(&lines),
            vec![
                vec![(0.0, 0.0), (1.0, 0.0)],
                vec![(1.0, 0.0), (1.0, 1.0), (1.0, 2.0)],
                vec![(1.0, 0.0), (2.0, 0.0)],
            ]
        );
    }

    #[test]
    fn ring_starts_at_lowest_line_end() {
        let mut dissolver = LineDissolver::new();
        dissolver.add(&line_string![(x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)]);
        dissolver.add(&line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]);

        let lines = dissolver.dissolve().unwrap();
        assert_eq!(lines.len(), 1);
        let ring = &lines[0];
        assert!(ring.is_closed());
        assert_eq!(ring.0.len(), 5);
        assert_eq!(ring.0[0], c(0.0, 0.0));
    }

    #[test]
    fn ring_with_one_input_line() {
        let mut dissolver = LineDissolver::new();
        dissolver.add(&line_string![
            (x: 2.0, y: 2.0),
            (x: 3.0, y: 2.0),
            (x: 3.0, y: 3.0),
            (x: 2.0, y: 2.0)
        ]);
        let lines = dissolver.dissolve().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_closed());
        assert_eq!(lines[0].0[0], c(2.0, 2.0));
        assert_eq!(segments(&lines), 3);
    }

    #[test]
    fn every_segment_emitted_once() {
        let input = vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 1.0)],
            line_string![(x: 2.0, y: 1.0), (x: 3.0, y: 1.0)],
            line_string![(x: 1.0, y: 0.0), (x: 1.0, y: -1.0)],
            line_string![(x: 5.0, y: 0.0), (x: 6.0, y: 0.0), (x: 6.0, y: 1.0), (x: 5.0, y: 0.0)],
            line_string![(x: 3.0, y: 1.0), (x: 4.0, y: 1.0)],
        ];
        let mut dissolver = LineDissolver::new();
        dissolver.add_all(&input);

        let lines = dissolver.dissolve().unwrap();
        assert_eq!(segments(&lines), dissolver.segment_count());
        assert_eq!(segments(&lines), 8);
    }

    #[test]
    fn dissolve_is_idempotent() {
        let input = vec![
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            line_string![(x: 1.0, y: 0.0), (x: 2.0, y: 0.0)],
            line_string![(x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
            line_string![(x: 2.0, y: 0.0), (x: 3.0, y: 1.0)],
        ];
        let mut first = LineDissolver::new();
        first.add_all(&input);
        let once = first.dissolve().unwrap();

        let mut second = LineDissolver::new();
        second.add_all(&once);
        let twice = second.dissolve().unwrap();

        assert_eq!(normalized(&once), normalized(&twice));
        // Running again on the same dissolver gives the same answer.
        assert_eq!(normalized(&first.dissolve().unwrap()), normalized(&once));
    }

    #[test]
    fn ring_order_is_counter_clockwise() {
        let mut dissolver = LineDissolver::new();
        for to in [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)] {
            dissolver.add(&LineString::from(vec![(0.0, 0.0), to]));
        }
        let hub = dissolver.vertices[&coord_key(c(0.0, 0.0))];
        let around: Vec<Coord<f64>> =
            dissolver.ring(hub).into_iter().map(|e| dissolver.direction(e)).collect();
        let start = around.iter().position(|&d| d == c(1.0, 0.0)).unwrap();
        let rotated: Vec<Coord<f64>> = around[start..].iter().chain(&around[..start]).copied().collect();
        assert_eq!(rotated, vec![c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0), c(0.0, -1.0)]);
        assert_eq!(dissolver.ring(hub).len(), 4);
    }
}
