// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Graph key types for arena-based storage.
//!
//! Nodes and edges are addressed by generational `slotmap` keys instead of
//! references. A key of a removed entity stays invalid forever, even when
//! its slot is reused, so stale handles resolve to `None` rather than to a
//! different entity.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a node (a unique coordinate in the graph).
    pub struct NodeKey;

    /// Key for an edge (a line between two nodes).
    pub struct EdgeKey;
}

/// A key that can reference either kind of graph entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKey {
    Node(NodeKey),
    Edge(EdgeKey),
}

impl From<NodeKey> for GraphKey {
    fn from(k: NodeKey) -> Self {
        GraphKey::Node(k)
    }
}

impl From<EdgeKey> for GraphKey {
    fn from(k: EdgeKey) -> Self {
        GraphKey::Edge(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn stale_key_does_not_resolve() {
        let mut map: SlotMap<EdgeKey, u32> = SlotMap::with_key();
        let first = map.insert(1);
        map.remove(first);
        let second = map.insert(2);

        assert!(map.get(first).is_none());
        assert_eq!(map.get(second), Some(&2));
    }

    #[test]
    fn graph_key_conversion() {
        let mut map: SlotMap<NodeKey, ()> = SlotMap::with_key();
        let nk = map.insert(());
        assert_eq!(GraphKey::from(nk), GraphKey::Node(nk));
    }
}
