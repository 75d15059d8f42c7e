// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for graph operations.
//!
//! Absence is not an error: lookups and removals report it through
//! `Option`/`bool`/empty results. The variants here are either invalid
//! input or structural faults that indicate the mutation API was bypassed.

use crate::keys::{EdgeKey, NodeKey};

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation that requires an edge was given a stale or foreign key.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// An operation that requires a node was given a stale or foreign key.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// A line needs at least two distinct coordinates to become an edge.
    #[error("line has {0} distinct coordinates, at least 2 required")]
    DegenerateLine(usize),

    /// An edge references a node that is not owned by the same graph.
    #[error("edge {edge:?} references node {node:?} which is not in the graph")]
    ForeignNode { edge: EdgeKey, node: NodeKey },

    /// A node's incident ring references an edge that does not end at it.
    #[error("node {node:?} lists edge {edge:?} which is not incident to it")]
    DetachedEdge { node: NodeKey, edge: EdgeKey },

    /// An edge's line does not start or end at the coordinate of its node.
    #[error("edge {edge:?} does not end at the coordinate of node {node:?}")]
    LineEndMismatch { edge: EdgeKey, node: NodeKey },

    /// A node is missing from the coordinate lookup or the node index.
    #[error("node {0:?} has an inconsistent lookup or index entry")]
    NodeIndexOutOfSync(NodeKey),

    /// An edge is missing from the spatial index (or indexed more than once).
    #[error("edge {0:?} has an inconsistent spatial index entry")]
    IndexOutOfSync(EdgeKey),

    /// Edges can only be merged at a node with exactly two distinct edges.
    #[error("node {0:?} is not a degree-2 pass-through node")]
    NotMergeable(NodeKey),

    /// A split coordinate coincides with an edge endpoint.
    #[error("split point coincides with an endpoint of edge {0:?}")]
    SplitAtEndpoint(EdgeKey),

    /// A half-edge ring walk did not return to its start.
    #[error("half-edge ring starting at {0} does not close")]
    RingNotClosed(usize),

    /// The dissolve walk reached a half-edge it had already consumed.
    #[error("half-edge {0} visited twice during dissolve")]
    HalfEdgeRevisited(usize),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
