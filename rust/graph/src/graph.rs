// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar line graph with synchronized spatial indexes.
//!
//! A [`Graph`] owns its nodes and edges in slot maps. Every node sits at a
//! unique coordinate and keeps its incident edges in clockwise order of their
//! outgoing direction. Every edge is a line between two nodes and has exactly
//! one entry in the edge R-tree for as long as it is alive; node positions are
//! indexed the same way. All three structures are updated inside the same
//! mutation call, never lazily.
//!
//! ## Snapping
//!
//! With a non-zero [`GraphConfig::snap_tolerance`], a line endpoint within the
//! tolerance of an existing node resolves to that node and the line's end
//! coordinate is moved onto it.

use std::cmp::Ordering;

use geo::{Coord, LineString};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::bounds::BoundingBox;
use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::keys::{EdgeKey, GraphKey, NodeKey};
use crate::ordering::{compare_coords, compare_direction_clockwise};
use crate::spatial::SpatialIndex;
use crate::visitor::{Visit, Visitor};

/// Graph construction options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphConfig {
    /// Maximum distance at which an endpoint is merged into an existing node.
    /// `0.0` means only identical coordinates share a node.
    pub snap_tolerance: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.0,
        }
    }
}

/// One entry of a node's incident ring: an edge plus the direction in which
/// it leaves the node. A loop edge appears twice, once per end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Incidence {
    pub(crate) edge: EdgeKey,
    pub(crate) at_start: bool,
    pub(crate) direction: Coord<f64>,
}

/// A graph vertex at a unique coordinate.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) coord: Coord<f64>,
    pub(crate) incident: Vec<Incidence>,
    pub(crate) properties: Dictionary,
}

impl Node {
    pub fn coord(&self) -> Coord<f64> {
        self.coord
    }

    pub fn x(&self) -> f64 {
        self.coord.x
    }

    pub fn y(&self) -> f64 {
        self.coord.y
    }

    /// Incident edges in clockwise order. A loop edge is listed twice.
    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.incident.iter().map(|inc| inc.edge)
    }

    /// Number of edge ends at this node (a loop counts twice).
    pub fn degree(&self) -> usize {
        self.incident.len()
    }

    pub fn properties(&self) -> &Dictionary {
        &self.properties
    }

    /// Euclidean distance to a coordinate.
    pub fn distance_to(&self, coord: Coord<f64>) -> f64 {
        (self.coord.x - coord.x).hypot(self.coord.y - coord.y)
    }
}

/// A graph arc: a line between two nodes.
///
/// Endpoints are fixed at creation. Splitting or merging replaces edges
/// instead of rewiring them.
#[derive(Debug, Clone)]
pub struct Edge<T> {
    pub(crate) start: NodeKey,
    pub(crate) end: NodeKey,
    pub(crate) line: LineString<f64>,
    pub(crate) bounds: BoundingBox,
    pub(crate) from_angle: f64,
    pub(crate) to_angle: f64,
    pub(crate) object: T,
    pub(crate) properties: Dictionary,
}

impl<T> Edge<T> {
    pub fn start(&self) -> NodeKey {
        self.start
    }

    pub fn end(&self) -> NodeKey {
        self.end
    }

    pub fn line(&self) -> &LineString<f64> {
        &self.line
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Direction (radians, counter-clockwise from +x) of the first segment,
    /// leaving the start node.
    pub fn from_angle(&self) -> f64 {
        self.from_angle
    }

    /// Direction (radians) of the last segment, leaving the end node.
    pub fn to_angle(&self) -> f64 {
        self.to_angle
    }

    pub fn object(&self) -> &T {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut T {
        &mut self.object
    }

    pub fn properties(&self) -> &Dictionary {
        &self.properties
    }

    pub fn is_loop(&self) -> bool {
        self.start == self.end
    }

    /// Returns the endpoint opposite to `node`, or `None` if `node` is not an
    /// endpoint.
    pub fn opposite(&self, node: NodeKey) -> Option<NodeKey> {
        if node == self.start {
            Some(self.end)
        } else if node == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    /// Euclidean length of the line.
    pub fn length(&self) -> f64 {
        self.line.lines().map(|l| l.dx().hypot(l.dy())).sum()
    }

    pub(crate) fn from_direction(&self) -> Coord<f64> {
        let c = &self.line.0;
        c[1] - c[0]
    }

    pub(crate) fn to_direction(&self) -> Coord<f64> {
        let c = &self.line.0;
        let n = c.len();
        c[n - 2] - c[n - 1]
    }
}

/// Exact-coordinate hash key. Adding `0.0` folds `-0.0` into `+0.0`.
pub(crate) fn coord_key(coord: Coord<f64>) -> (u64, u64) {
    ((coord.x + 0.0).to_bits(), (coord.y + 0.0).to_bits())
}

/// Drops consecutive duplicate coordinates.
fn dedup_coords(line: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(line.0.len());
    for &c in &line.0 {
        if coords.last() != Some(&c) {
            coords.push(c);
        }
    }
    coords
}

/// A planar line graph.
///
/// # Example
///
/// ```
/// use geo::line_string;
/// use planar_graph::{BoundingBox, Dictionary, Graph};
///
/// let mut graph: Graph = Graph::new();
/// let a = graph
///     .add_edge(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)], Dictionary::default())
///     .unwrap();
/// graph
///     .add_edge(line_string![(x: 1.0, y: 0.0), (x: 1.0, y: 1.0)], Dictionary::default())
///     .unwrap();
///
/// assert_eq!(graph.node_count(), 3);
/// assert!(graph.query_edges(&BoundingBox::new(0.0, -0.5, 0.5, 0.5)).contains(&a));
/// ```
#[derive(Debug, Clone)]
pub struct Graph<T = ()> {
    pub(crate) config: GraphConfig,
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) edges: SlotMap<EdgeKey, Edge<T>>,
    pub(crate) node_lookup: FxHashMap<(u64, u64), NodeKey>,
    pub(crate) edge_index: SpatialIndex<EdgeKey>,
    pub(crate) node_index: SpatialIndex<NodeKey>,
}

impl<T> Graph<T> {
    /// Creates an empty graph with exact coordinate matching.
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            node_lookup: FxHashMap::default(),
            edge_index: SpatialIndex::new(),
            node_index: SpatialIndex::new(),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Returns `true` if the key refers to a live node or edge.
    pub fn contains(&self, key: impl Into<GraphKey>) -> bool {
        match key.into() {
            GraphKey::Node(k) => self.nodes.contains_key(k),
            GraphKey::Edge(k) => self.edges.contains_key(k),
        }
    }

    // --- Node operations ---

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Finds the node at `coord`, honouring the snap tolerance, without
    /// creating one.
    pub fn node_at(&self, coord: Coord<f64>) -> Option<NodeKey> {
        if let Some(&key) = self.node_lookup.get(&coord_key(coord)) {
            return Some(key);
        }
        let tolerance = self.config.snap_tolerance;
        if tolerance <= 0.0 {
            return None;
        }

        let search = BoundingBox::from_point(coord).expand_by(tolerance);
        self.node_index
            .query(&search)
            .into_iter()
            .filter_map(|key| self.nodes.get(key).map(|n| (key, n)))
            .map(|(key, n)| (key, n.distance_to(coord), n.coord))
            .filter(|&(_, dist, _)| dist <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| compare_coords(a.2, b.2)))
            .map(|(key, _, _)| key)
    }

    /// Returns the node at `coord`, creating an isolated node if none exists.
    pub fn get_node(&mut self, coord: Coord<f64>) -> NodeKey {
        if let Some(key) = self.node_at(coord) {
            return key;
        }

        let key = self.nodes.insert(Node {
            coord,
            incident: Vec::new(),
            properties: Dictionary::default(),
        });
        self.node_lookup.insert(coord_key(coord), key);
        self.node_index.insert(BoundingBox::from_point(coord), key);
        key
    }

    /// Returns the keys of all nodes whose position lies in `bounds`.
    pub fn query_nodes(&self, bounds: &BoundingBox) -> Vec<NodeKey> {
        self.node_index
            .query(bounds)
            .into_iter()
            .filter(|&key| self.nodes.contains_key(key))
            .collect()
    }

    /// Number of edge ends at a node; `0` for unknown keys.
    pub fn degree(&self, key: NodeKey) -> usize {
        self.nodes.get(key).map_or(0, Node::degree)
    }

    /// Removes a node and every edge incident to it.
    ///
    /// Returns `false` if the node does not exist.
    pub fn remove_node(&mut self, key: NodeKey) -> bool {
        let Some(node) = self.nodes.get(key) else {
            return false;
        };

        let mut incident: Vec<EdgeKey> = node.edges().collect();
        incident.sort_unstable();
        incident.dedup();
        if incident.is_empty() {
            self.drop_node(key);
            return true;
        }
        for edge in incident {
            self.remove_edge(edge);
        }
        true
    }

    fn drop_node(&mut self, key: NodeKey) {
        if let Some(node) = self.nodes.remove(key) {
            self.node_lookup.remove(&coord_key(node.coord));
            self.node_index.remove(&BoundingBox::from_point(node.coord), &key);
            tracing::debug!(?key, x = node.coord.x, y = node.coord.y, "removed node");
        }
    }

    // --- Edge operations ---

    pub fn edge(&self, key: EdgeKey) -> Option<&Edge<T>> {
        self.edges.get(key)
    }

    pub fn edge_mut(&mut self, key: EdgeKey) -> Option<&mut Edge<T>> {
        self.edges.get_mut(key)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge<T>)> {
        self.edges.iter()
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.keys().collect()
    }

    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    /// Adds an edge carrying `object`.
    ///
    /// Consecutive duplicate coordinates are dropped. Endpoint nodes are
    /// resolved (or created), the edge is linked into both nodes' rings in
    /// clockwise order and its bounds are inserted into the edge index.
    pub fn add_edge_with(
        &mut self,
        object: T,
        line: LineString<f64>,
        properties: Dictionary,
    ) -> Result<EdgeKey> {
        let mut coords = dedup_coords(&line);
        if coords.len() < 2 {
            return Err(Error::DegenerateLine(coords.len()));
        }

        // The start is resolved first so the end can snap onto a start node
        // this call creates. Both line ends take the exact node coordinates.
        let last = coords.len() - 1;
        let start_existed = self.node_at(coords[0]).is_some();
        let start = self.get_node(coords[0]);
        coords[0] = self.nodes[start].coord;
        let end = self.get_node(coords[last]);
        coords[last] = self.nodes[end].coord;

        let line = LineString::new(coords);
        let coords = dedup_coords(&line);
        if coords.len() < 2 {
            if !start_existed {
                self.drop_node(start);
            }
            return Err(Error::DegenerateLine(coords.len()));
        }
        let line = LineString::new(coords);
        let bounds = BoundingBox::of_line(&line).ok_or(Error::DegenerateLine(0))?;

        let mut edge = Edge {
            start,
            end,
            line,
            bounds,
            from_angle: 0.0,
            to_angle: 0.0,
            object,
            properties,
        };
        let from_dir = edge.from_direction();
        let to_dir = edge.to_direction();
        edge.from_angle = from_dir.y.atan2(from_dir.x);
        edge.to_angle = to_dir.y.atan2(to_dir.x);

        let key = self.edges.insert(edge);
        self.link(start, key, true, from_dir);
        self.link(end, key, false, to_dir);
        self.edge_index.insert(bounds, key);

        tracing::debug!(?key, ?start, ?end, "added edge");
        Ok(key)
    }

    /// Removes an edge, its index entry and any endpoint left without edges.
    ///
    /// Returns `false` if the edge does not exist.
    pub fn remove_edge(&mut self, key: EdgeKey) -> bool {
        let Some(edge) = self.edges.remove(key) else {
            return false;
        };

        let indexed = self.edge_index.remove(&edge.bounds, &key);
        debug_assert!(indexed, "live edge had no index entry");

        for node_key in [edge.start, edge.end] {
            let now_empty = match self.nodes.get_mut(node_key) {
                Some(node) => {
                    node.incident.retain(|inc| inc.edge != key);
                    node.incident.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.drop_node(node_key);
            }
        }

        tracing::debug!(?key, "removed edge");
        true
    }

    /// Returns the live edges whose bounds intersect `bounds`.
    pub fn query_edges(&self, bounds: &BoundingBox) -> Vec<EdgeKey> {
        self.edge_index
            .query(bounds)
            .into_iter()
            .filter(|&key| self.edges.contains_key(key))
            .collect()
    }

    /// Visits the edges whose bounds intersect `bounds` until the visitor stops.
    pub fn visit_edges<V: Visitor<EdgeKey>>(&self, bounds: &BoundingBox, visitor: &mut V) -> Visit {
        self.edge_index.visit(bounds, visitor)
    }

    /// Visits the nodes positioned inside `bounds` until the visitor stops.
    pub fn visit_nodes<V: Visitor<NodeKey>>(&self, bounds: &BoundingBox, visitor: &mut V) -> Visit {
        self.node_index.visit(bounds, visitor)
    }

    /// Returns every edge connecting `a` and `b` (in either direction).
    pub fn edges_between(&self, a: NodeKey, b: NodeKey) -> Vec<EdgeKey> {
        let Some(node) = self.nodes.get(a) else {
            return Vec::new();
        };
        let mut found: Vec<EdgeKey> = node
            .incident
            .iter()
            .filter(|inc| {
                self.edges
                    .get(inc.edge)
                    .and_then(|e| e.opposite(a))
                    .is_some_and(|other| other == b)
            })
            .map(|inc| inc.edge)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Returns the endpoint of `edge` opposite to `node`.
    pub fn opposite_node(&self, edge: EdgeKey, node: NodeKey) -> Option<NodeKey> {
        self.edges.get(edge)?.opposite(node)
    }

    /// Returns `true` if `node` is the start node of `edge`.
    pub fn is_edge_start(&self, edge: EdgeKey, node: NodeKey) -> bool {
        self.edges.get(edge).is_some_and(|e| e.start == node)
    }

    /// Direction vector in which `edge` leaves `node`.
    ///
    /// For a loop edge this is the direction leaving through its start.
    pub fn edge_direction_at(&self, edge: EdgeKey, node: NodeKey) -> Option<Coord<f64>> {
        let e = self.edges.get(edge)?;
        if e.start == node {
            Some(e.from_direction())
        } else if e.end == node {
            Some(e.to_direction())
        } else {
            None
        }
    }

    /// Inserts an edge end into a node's ring, after any ends with an equal
    /// direction so insertion order breaks ties.
    fn link(&mut self, node: NodeKey, edge: EdgeKey, at_start: bool, direction: Coord<f64>) {
        let Some(node) = self.nodes.get_mut(node) else {
            return;
        };
        let position = node
            .incident
            .iter()
            .position(|inc| compare_direction_clockwise(direction, inc.direction) == Ordering::Less)
            .unwrap_or(node.incident.len());
        node.incident.insert(
            position,
            Incidence {
                edge,
                at_start,
                direction,
            },
        );
    }

    // --- Consistency ---

    /// Verifies the node/edge/index invariants.
    ///
    /// Any error here means the graph was mutated outside its API.
    pub fn check_consistency(&self) -> Result<()> {
        for (key, edge) in &self.edges {
            for node_key in [edge.start, edge.end] {
                let node = self.nodes.get(node_key).ok_or(Error::ForeignNode {
                    edge: key,
                    node: node_key,
                })?;
                if !node.incident.iter().any(|inc| inc.edge == key) {
                    return Err(Error::ForeignNode {
                        edge: key,
                        node: node_key,
                    });
                }
            }
            if !self.edge_index.contains(&edge.bounds, &key) {
                return Err(Error::IndexOutOfSync(key));
            }
            let ends = [(edge.start, edge.line.0.first()), (edge.end, edge.line.0.last())];
            for (node_key, coord) in ends {
                let matches = match (coord, self.nodes.get(node_key)) {
                    (Some(&c), Some(node)) => coord_key(c) == coord_key(node.coord),
                    _ => false,
                };
                if !matches {
                    return Err(Error::LineEndMismatch {
                        edge: key,
                        node: node_key,
                    });
                }
            }
        }

        for (node_key, node) in &self.nodes {
            let looked_up = self.node_lookup.get(&coord_key(node.coord)) == Some(&node_key);
            if !looked_up || !self.node_index.contains(&BoundingBox::from_point(node.coord), &node_key) {
                return Err(Error::NodeIndexOutOfSync(node_key));
            }
            for inc in &node.incident {
                let incident = self
                    .edges
                    .get(inc.edge)
                    .is_some_and(|e| e.start == node_key || e.end == node_key);
                if !incident {
                    return Err(Error::DetachedEdge {
                        node: node_key,
                        edge: inc.edge,
                    });
                }
            }
        }

        if self.node_lookup.len() != self.nodes.len() {
            let stray = self.node_lookup.iter().find(|&(&coord, &key)| {
                self.nodes.get(key).map_or(true, |n| coord_key(n.coord) != coord)
            });
            if let Some((_, &key)) = stray {
                return Err(Error::NodeIndexOutOfSync(key));
            }
        }

        if self.node_index.len() != self.nodes.len() {
            let mut seen = FxHashSet::default();
            for key in self.node_index.query_all() {
                if !self.nodes.contains_key(key) || !seen.insert(key) {
                    return Err(Error::NodeIndexOutOfSync(key));
                }
            }
        }

        if self.edge_index.len() != self.edges.len() {
            let mut seen = FxHashSet::default();
            for key in self.edge_index.query_all() {
                if !self.edges.contains_key(key) || !seen.insert(key) {
                    return Err(Error::IndexOutOfSync(key));
                }
            }
        }
        Ok(())
    }
}

impl<T: Default> Graph<T> {
    /// Adds an edge with a default payload. See [`Graph::add_edge_with`].
    pub fn add_edge(&mut self, line: LineString<f64>, properties: Dictionary) -> Result<EdgeKey> {
        self.add_edge_with(T::default(), line, properties)
    }
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}
