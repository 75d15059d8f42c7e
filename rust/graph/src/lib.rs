// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Planar Graph
//!
//! Planar line graph and spatial index engine for 2D vector line work.
//!
//! Nodes and edges are stored in slot maps and addressed by generational
//! keys. Every node sits at a unique coordinate and keeps its incident edges
//! in clockwise order. Edge and node bounds live in R-trees that are updated
//! in the same call as every structural mutation, so box queries never see
//! removed edges.
//!
//! On top of the graph sit:
//!
//! - topological predicates (crossing, linear overlap) built on DE-9IM
//!   relations from `geo`,
//! - a half-edge [`LineDissolver`] that merges chains through pass-through
//!   vertices into maximal lines,
//! - structural edits ([`Graph::split_edge`], [`Graph::merge_edges_at`]),
//! - an [`IdObjectIndex`] that indexes identifiers of objects owned by an
//!   external store and resolves them on query.
//!
//! The crate does not install a `tracing` subscriber. Mutations and dissolve
//! passes emit `debug` events; dropped identifiers emit `trace` events.

pub mod bounds;
pub mod dictionary;
pub mod dissolve;
pub mod edge_pair;
pub mod error;
pub mod graph;
pub mod id_index;
pub mod keys;
pub mod ordering;
pub mod predicates;
pub mod serialization;
pub mod spatial;
pub mod structure;
pub mod visitor;

pub use bounds::BoundingBox;
pub use dictionary::{DictValue, Dictionary};
pub use dissolve::{DissolveMode, LineDissolver};
pub use edge_pair::EdgePair;
pub use error::{Error, Result};
pub use graph::{Edge, Graph, GraphConfig, Node};
pub use id_index::{IdObjectIndex, ObjectId, ObjectResolver};
pub use keys::{EdgeKey, GraphKey, NodeKey};
pub use ordering::{
    compare_coords, compare_direction_ccw, compare_direction_clockwise, EdgeAngleComparator,
    NodeDistanceComparator,
};
pub use predicates::{crosses, intersects_linearly, CrossesLine, LinearIntersection};
pub use serialization::{EdgeSnapshot, GraphSnapshot, NodeSnapshot};
pub use spatial::SpatialIndex;
pub use visitor::{CollectVisitor, FilterVisitor, Visit, Visitor};
