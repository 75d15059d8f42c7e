// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic orderings for edges around a node and nodes around a point.
//!
//! Directions are compared by quadrant first and then by the sign of the
//! robust orientation predicate, never by subtracting `atan2` angles, so there
//! is no wrap-around at the 0/2π boundary and no rounding-induced
//! inconsistency between nearly parallel directions.

use std::cmp::Ordering;

use geo::kernels::{Kernel, Orientation, RobustKernel};
use geo::Coord;

use crate::graph::{Graph, Node};
use crate::keys::{EdgeKey, NodeKey};

/// Quadrant of a direction vector, counter-clockwise from the positive x axis.
///
/// Quadrant 0 is `[0, π/2)`, 1 is `[π/2, π]`, 2 is `(π, 3π/2)` and 3 is
/// `[3π/2, 2π)`. The zero vector falls in quadrant 0.
fn quadrant(dir: Coord<f64>) -> u8 {
    if dir.y >= 0.0 {
        if dir.x > 0.0 || (dir.x == 0.0 && dir.y == 0.0) {
            0
        } else {
            1
        }
    } else if dir.x < 0.0 {
        2
    } else {
        3
    }
}

/// Orders direction vectors by counter-clockwise angle from the positive x
/// axis, in `[0, 2π)`.
pub fn compare_direction_ccw(a: Coord<f64>, b: Coord<f64>) -> Ordering {
    let (qa, qb) = (quadrant(a), quadrant(b));
    if qa != qb {
        return qa.cmp(&qb);
    }
    let origin = Coord { x: 0.0, y: 0.0 };
    match RobustKernel::orient2d(origin, a, b) {
        // b lies counter-clockwise of a, so a has the smaller angle.
        Orientation::CounterClockwise => Ordering::Less,
        Orientation::Clockwise => Ordering::Greater,
        Orientation::Collinear => Ordering::Equal,
    }
}

/// Orders direction vectors clockwise: the reverse of
/// [`compare_direction_ccw`]. The sweep begins just below the positive x
/// axis and ends on it.
pub fn compare_direction_clockwise(a: Coord<f64>, b: Coord<f64>) -> Ordering {
    compare_direction_ccw(b, a)
}

/// Lexicographic total order on coordinates: `x`, then `y`.
pub fn compare_coords(a: Coord<f64>, b: Coord<f64>) -> Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

/// Orders the edges incident to one node by the clockwise direction in which
/// they leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeAngleComparator {
    pub node: NodeKey,
}

impl EdgeAngleComparator {
    pub fn new(node: NodeKey) -> Self {
        Self { node }
    }

    /// Edges not incident to the node compare equal to everything.
    ///
    /// A loop edge is compared by the direction leaving through its start;
    /// its end entry in the ring cannot be addressed by key alone.
    pub fn compare<T>(&self, graph: &Graph<T>, a: EdgeKey, b: EdgeKey) -> Ordering {
        match (
            graph.edge_direction_at(a, self.node),
            graph.edge_direction_at(b, self.node),
        ) {
            (Some(da), Some(db)) => compare_direction_clockwise(da, db),
            _ => Ordering::Equal,
        }
    }
}

/// Orders nodes by Euclidean distance to a reference coordinate.
///
/// Equidistant nodes fall back to [`compare_coords`], so the result is a
/// strict total order over distinct coordinates. `invert` reverses the final
/// ordering, tie-break included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDistanceComparator {
    pub reference: Coord<f64>,
    pub invert: bool,
}

impl NodeDistanceComparator {
    pub fn new(reference: Coord<f64>) -> Self {
        Self {
            reference,
            invert: false,
        }
    }

    pub fn inverted(reference: Coord<f64>) -> Self {
        Self {
            reference,
            invert: true,
        }
    }

    pub fn compare_coords(&self, a: Coord<f64>, b: Coord<f64>) -> Ordering {
        let da = (a.x - self.reference.x).hypot(a.y - self.reference.y);
        let db = (b.x - self.reference.x).hypot(b.y - self.reference.y);
        let order = da.total_cmp(&db).then_with(|| compare_coords(a, b));
        if self.invert {
            order.reverse()
        } else {
            order
        }
    }

    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        self.compare_coords(a.coord(), b.coord())
    }
}

impl<T> Graph<T> {
    /// The edge following `edge` clockwise around `node`, wrapping around.
    ///
    /// For a loop edge the end leaving through its start is used. Returns
    /// `edge` itself when it is the only edge end at the node.
    pub fn next_edge_clockwise(&self, node: NodeKey, edge: EdgeKey) -> Option<EdgeKey> {
        self.ring_neighbour(node, edge, 1)
    }

    /// The edge following `edge` counter-clockwise around `node`.
    pub fn next_edge_counterclockwise(&self, node: NodeKey, edge: EdgeKey) -> Option<EdgeKey> {
        let degree = self.nodes.get(node)?.incident.len();
        self.ring_neighbour(node, edge, degree.saturating_sub(1))
    }

    fn ring_neighbour(&self, node: NodeKey, edge: EdgeKey, step: usize) -> Option<EdgeKey> {
        let ring = &self.nodes.get(node)?.incident;
        let is_start = self.edges.get(edge)?.start == node;
        let position = ring
            .iter()
            .position(|inc| inc.edge == edge && inc.at_start == is_start)?;
        Some(ring[(position + step) % ring.len()].edge)
    }

    /// Node keys sorted by distance to `reference` (see
    /// [`NodeDistanceComparator`]).
    pub fn nodes_by_distance(&self, reference: Coord<f64>, invert: bool) -> Vec<NodeKey> {
        let comparator = NodeDistanceComparator { reference, invert };
        let mut keyed: Vec<(NodeKey, Coord<f64>)> =
            self.nodes.iter().map(|(k, n)| (k, n.coord())).collect();
        keyed.sort_by(|a, b| comparator.compare_coords(a.1, b.1));
        keyed.into_iter().map(|(k, _)| k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use geo::LineString;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn quadrants_cover_axes() {
        assert_eq!(quadrant(c(1.0, 0.0)), 0);
        assert_eq!(quadrant(c(1.0, 1.0)), 0);
        assert_eq!(quadrant(c(0.0, 1.0)), 1);
        assert_eq!(quadrant(c(-1.0, 1.0)), 1);
        assert_eq!(quadrant(c(-1.0, 0.0)), 1);
        assert_eq!(quadrant(c(-1.0, -1.0)), 2);
        assert_eq!(quadrant(c(0.0, -1.0)), 3);
        assert_eq!(quadrant(c(1.0, -1.0)), 3);
    }

    #[test]
    fn ccw_order_matches_angles() {
        let mut dirs = vec![
            c(0.0, -1.0),
            c(1.0, 1.0),
            c(-1.0, 0.0),
            c(1.0, 0.0),
            c(1.0, -1e-12),
            c(0.0, 1.0),
        ];
        dirs.sort_by(|a, b| compare_direction_ccw(*a, *b));
        assert_eq!(
            dirs,
            vec![
                c(1.0, 0.0),
                c(1.0, 1.0),
                c(0.0, 1.0),
                c(-1.0, 0.0),
                c(0.0, -1.0),
                c(1.0, -1e-12),
            ]
        );
    }

    #[test]
    fn no_wraparound_at_zero() {
        // Just above and just below the positive x axis are nearly parallel but
        // sit at opposite ends of the sweep.
        let above = c(1.0, 1e-15);
        let below = c(1.0, -1e-15);
        assert_eq!(compare_direction_ccw(above, below), Ordering::Less);
        assert_eq!(compare_direction_clockwise(above, below), Ordering::Greater);
    }

    #[test]
    fn parallel_directions_are_equal() {
        assert_eq!(compare_direction_ccw(c(2.0, 2.0), c(5.0, 5.0)), Ordering::Equal);
    }

    #[test]
    fn clockwise_is_cyclic_rotation_invariant() {
        let dirs = [c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0), c(0.0, -1.0), c(1.0, 1.0)];
        let mut sorted = dirs.to_vec();
        sorted.sort_by(|a, b| compare_direction_clockwise(*a, *b));

        // Re-sorting any rotation gives the same cyclic sequence.
        for shift in 0..dirs.len() {
            let mut rotated: Vec<Coord<f64>> =
                dirs[shift..].iter().chain(&dirs[..shift]).copied().collect();
            rotated.sort_by(|a, b| compare_direction_clockwise(*a, *b));
            assert_eq!(rotated, sorted);
        }
    }

    #[test]
    fn distance_ties_fall_back_to_coordinates() {
        let cmp = NodeDistanceComparator::new(c(0.0, 0.0));
        let a = c(1.0, 0.0);
        let b = c(0.0, 1.0);
        let d = c(-1.0, 0.0);

        assert_eq!(cmp.compare_coords(a, b), Ordering::Greater);
        assert_eq!(cmp.compare_coords(b, a), Ordering::Less);
        // Transitive among equidistant nodes: (-1,0) < (0,1) < (1,0).
        assert_eq!(cmp.compare_coords(d, b), Ordering::Less);
        assert_eq!(cmp.compare_coords(d, a), Ordering::Less);
        assert_eq!(cmp.compare_coords(a, a), Ordering::Equal);
    }

    #[test]
    fn invert_reverses_order() {
        let near = c(1.0, 0.0);
        let far = c(3.0, 0.0);
        let normal = NodeDistanceComparator::new(c(0.0, 0.0));
        let inverted = NodeDistanceComparator::inverted(c(0.0, 0.0));
        assert_eq!(normal.compare_coords(near, far), Ordering::Less);
        assert_eq!(inverted.compare_coords(near, far), Ordering::Greater);
        assert_eq!(
            inverted.compare_coords(c(0.0, 1.0), c(1.0, 0.0)),
            normal.compare_coords(c(1.0, 0.0), c(0.0, 1.0))
        );
    }

    fn star() -> (Graph, NodeKey, [EdgeKey; 3]) {
        let mut graph: Graph = Graph::new();
        let mut add = |to: (f64, f64)| {
            graph
                .add_edge(LineString::from(vec![(0.0, 0.0), to]), Dictionary::default())
                .unwrap()
        };
        let east = add((1.0, 0.0));
        let north = add((0.0, 1.0));
        let south_west = add((-1.0, -1.0));
        let hub = graph.node_at(c(0.0, 0.0)).unwrap();
        (graph, hub, [east, north, south_west])
    }

    #[test]
    fn edge_angle_comparator() {
        let (graph, hub, [east, north, south_west]) = star();
        let cmp = EdgeAngleComparator::new(hub);
        assert_eq!(cmp.compare(&graph, north, east), Ordering::Less);
        assert_eq!(cmp.compare(&graph, south_west, north), Ordering::Less);
        assert_eq!(cmp.compare(&graph, east, south_west), Ordering::Greater);
        assert_eq!(cmp.compare(&graph, east, east), Ordering::Equal);
    }

    #[test]
    fn loop_edge_compares_by_start_direction() {
        let mut graph: Graph = Graph::new();
        // Leaves north, comes back in from the east.
        let ring = graph
            .add_edge(
                LineString::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (0.0, 0.0)]),
                Dictionary::default(),
            )
            .unwrap();
        let north_east = graph
            .add_edge(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]), Dictionary::default())
            .unwrap();
        let hub = graph.node_at(c(0.0, 0.0)).unwrap();
        let cmp = EdgeAngleComparator::new(hub);
        assert_eq!(cmp.compare(&graph, ring, north_east), Ordering::Less);
        assert_eq!(cmp.compare(&graph, north_east, ring), Ordering::Greater);
    }

    #[test]
    fn next_edge_walks_the_ring() {
        let (graph, hub, [east, north, south_west]) = star();
        assert_eq!(graph.next_edge_clockwise(hub, north), Some(east));
        assert_eq!(graph.next_edge_clockwise(hub, east), Some(south_west));
        assert_eq!(graph.next_edge_clockwise(hub, south_west), Some(north));
        assert_eq!(graph.next_edge_counterclockwise(hub, east), Some(north));
        assert_eq!(graph.next_edge_counterclockwise(hub, north), Some(south_west));
    }

    #[test]
    fn nodes_sorted_by_distance() {
        let (graph, hub, _) = star();
        let order = graph.nodes_by_distance(c(0.0, 0.0), false);
        assert_eq!(order[0], hub);
        let coords: Vec<Coord<f64>> = order.iter().map(|&k| graph.node(k).unwrap().coord()).collect();
        // (0,1) and (1,0) tie at distance 1; x breaks the tie.
        assert_eq!(coords[1], c(0.0, 1.0));
        assert_eq!(coords[2], c(1.0, 0.0));
        assert_eq!(coords[3], c(-1.0, -1.0));

        let reversed = graph.nodes_by_distance(c(0.0, 0.0), true);
        assert_eq!(reversed.first(), order.last());
    }
}
