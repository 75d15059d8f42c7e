// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON snapshots of a graph.
//!
//! A snapshot holds node positions, edge lines and both kinds of
//! properties. Slot map keys are replaced by sequential ids. Edge payloads
//! (`T`) are not part of the format; restoring fills them with
//! `T::default()`.

use geo::{Coord, LineString};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{Error, Result};
use crate::graph::{Graph, GraphConfig};
use crate::keys::NodeKey;

/// Serializable form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Dictionary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: usize,
    pub start: usize,
    pub end: usize,
    pub coords: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Dictionary>,
}

fn non_empty(props: &Dictionary) -> Option<Dictionary> {
    (!props.is_empty()).then(|| props.clone())
}

impl<T> Graph<T> {
    /// Serializes the graph to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = self.to_snapshot();
        serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Captures nodes and edges with sequential ids.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let mut node_ids: FxHashMap<NodeKey, usize> = FxHashMap::default();
        let nodes: Vec<NodeSnapshot> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (k, n))| {
                node_ids.insert(k, i);
                NodeSnapshot {
                    id: i,
                    x: n.coord.x,
                    y: n.coord.y,
                    properties: non_empty(&n.properties),
                }
            })
            .collect();

        let edges = self
            .edges
            .values()
            .enumerate()
            .map(|(i, e)| EdgeSnapshot {
                id: i,
                start: node_ids[&e.start],
                end: node_ids[&e.end],
                coords: e.line.0.iter().map(|c| [c.x, c.y]).collect(),
                properties: non_empty(&e.properties),
            })
            .collect();

        GraphSnapshot { nodes, edges }
    }
}

impl<T: Default> Graph<T> {
    /// Deserializes a graph from a JSON string.
    pub fn from_json(json: &str, config: GraphConfig) -> Result<Self> {
        let snapshot: GraphSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Self::from_snapshot(&snapshot, config)
    }

    /// Rebuilds a graph from a snapshot.
    ///
    /// Nodes are created first so isolated nodes and node properties survive.
    /// Each edge must start and end at the coordinates of the nodes it names.
    pub fn from_snapshot(snap: &GraphSnapshot, config: GraphConfig) -> Result<Self> {
        let mut graph = Graph::with_config(config);

        let mut node_keys: Vec<NodeKey> = Vec::with_capacity(snap.nodes.len());
        for ns in &snap.nodes {
            let key = graph.get_node(Coord { x: ns.x, y: ns.y });
            if let Some(ref props) = ns.properties {
                if let Some(target) = graph.node_properties_mut(key) {
                    target.extend(props.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            node_keys.push(key);
        }

        for es in &snap.edges {
            let (Some(&start), Some(&end)) = (node_keys.get(es.start), node_keys.get(es.end)) else {
                return Err(Error::Serialization(format!(
                    "edge {} references unknown node {} or {}",
                    es.id, es.start, es.end
                )));
            };
            let line: LineString<f64> = es.coords.iter().map(|&[x, y]| Coord { x, y }).collect();
            let key = graph.add_edge(line, es.properties.clone().unwrap_or_default())?;
            if !graph.is_edge_start(key, start) || graph.opposite_node(key, start) != Some(end) {
                return Err(Error::Serialization(format!(
                    "edge {} does not run from node {} to node {}",
                    es.id, es.start, es.end
                )));
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "restored graph from snapshot"
        );
        Ok(graph)
    }
}
