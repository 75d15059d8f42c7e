// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed key-value properties carried by nodes and edges.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::keys::{EdgeKey, NodeKey};

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DictValue {
    Int(i64),
    Double(f64),
    String(String),
    Bool(bool),
    List(Vec<DictValue>),
}

impl DictValue {
    /// Numeric view: `Int` widens to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DictValue::Int(v) => Some(*v as f64),
            DictValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DictValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DictValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DictValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for DictValue {
    fn from(v: i64) -> Self {
        DictValue::Int(v)
    }
}

impl From<f64> for DictValue {
    fn from(v: f64) -> Self {
        DictValue::Double(v)
    }
}

impl From<&str> for DictValue {
    fn from(v: &str) -> Self {
        DictValue::String(v.to_string())
    }
}

impl From<String> for DictValue {
    fn from(v: String) -> Self {
        DictValue::String(v)
    }
}

impl From<bool> for DictValue {
    fn from(v: bool) -> Self {
        DictValue::Bool(v)
    }
}

/// Property bag attached to a node, an edge or one side of an edge pair.
pub type Dictionary = FxHashMap<String, DictValue>;

impl<T> Graph<T> {
    /// Returns a node's properties, or `None` for a stale key.
    pub fn node_properties(&self, key: NodeKey) -> Option<&Dictionary> {
        self.nodes.get(key).map(|n| &n.properties)
    }

    pub fn node_properties_mut(&mut self, key: NodeKey) -> Option<&mut Dictionary> {
        self.nodes.get_mut(key).map(|n| &mut n.properties)
    }

    pub fn node_property(&self, key: NodeKey, name: &str) -> Option<&DictValue> {
        self.node_properties(key)?.get(name)
    }

    /// Sets a node property, returning the previous value. Returns `None`
    /// without storing anything if the node does not exist.
    pub fn set_node_property(
        &mut self,
        key: NodeKey,
        name: impl Into<String>,
        value: impl Into<DictValue>,
    ) -> Option<DictValue> {
        self.node_properties_mut(key)?.insert(name.into(), value.into())
    }

    pub fn edge_properties_mut(&mut self, key: EdgeKey) -> Option<&mut Dictionary> {
        self.edges.get_mut(key).map(|e| &mut e.properties)
    }

    pub fn edge_property(&self, key: EdgeKey, name: &str) -> Option<&DictValue> {
        self.edges.get(key)?.properties.get(name)
    }

    /// Sets an edge property, returning the previous value.
    pub fn set_edge_property(
        &mut self,
        key: EdgeKey,
        name: impl Into<String>,
        value: impl Into<DictValue>,
    ) -> Option<DictValue> {
        self.edge_properties_mut(key)?.insert(name.into(), value.into())
    }

    pub fn remove_edge_property(&mut self, key: EdgeKey, name: &str) -> Option<DictValue> {
        self.edge_properties_mut(key)?.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, Coord};

    fn graph_with_edge() -> (Graph, EdgeKey) {
        let mut graph: Graph = Graph::new();
        let key = graph
            .add_edge(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)], Dictionary::default())
            .unwrap();
        (graph, key)
    }

    #[test]
    fn set_and_get_edge_properties() {
        let (mut graph, key) = graph_with_edge();
        graph.set_edge_property(key, "name", "origin");
        graph.set_edge_property(key, "weight", 1.5);
        graph.set_edge_property(key, "id", 42i64);

        assert_eq!(graph.edge_property(key, "name").and_then(DictValue::as_str), Some("origin"));
        assert_eq!(graph.edge_property(key, "weight"), Some(&DictValue::Double(1.5)));
        assert_eq!(graph.edge_property(key, "id").and_then(DictValue::as_i64), Some(42));

        let previous = graph.set_edge_property(key, "id", 7i64);
        assert_eq!(previous, Some(DictValue::Int(42)));
    }

    #[test]
    fn remove_edge_property() {
        let (mut graph, key) = graph_with_edge();
        graph.set_edge_property(key, "x", 1i64);
        assert_eq!(graph.remove_edge_property(key, "x"), Some(DictValue::Int(1)));
        assert!(graph.edge_property(key, "x").is_none());
    }

    #[test]
    fn node_properties() {
        let (mut graph, _) = graph_with_edge();
        let node = graph.node_at(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(graph.node_properties(node).unwrap().is_empty());

        graph.set_node_property(node, "junction", true);
        assert_eq!(graph.node_property(node, "junction").and_then(DictValue::as_bool), Some(true));
    }

    #[test]
    fn stale_keys_store_nothing() {
        let (mut graph, key) = graph_with_edge();
        graph.remove_edge(key);
        assert!(graph.set_edge_property(key, "a", 1i64).is_none());
        assert!(graph.edge_property(key, "a").is_none());
    }

    #[test]
    fn numeric_views() {
        assert_eq!(DictValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(DictValue::Double(2.5).as_f64(), Some(2.5));
        assert_eq!(DictValue::from("x").as_f64(), None);
    }

    #[test]
    fn nested_list_values() {
        let list = DictValue::List(vec![
            DictValue::Int(1),
            DictValue::Double(2.0),
            DictValue::String("three".to_string()),
            DictValue::List(vec![DictValue::Int(4)]),
        ]);

        if let DictValue::List(items) = &list {
            assert_eq!(items.len(), 4);
            assert_eq!(items[0], DictValue::Int(1));
        } else {
            panic!("expected list");
        }
    }
}
