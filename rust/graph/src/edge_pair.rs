// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unordered pairs of edges with per-side properties.

use std::hash::{Hash, Hasher};

use crate::dictionary::{DictValue, Dictionary};
use crate::keys::EdgeKey;

/// An association of two edges, e.g. two carriageways of one road.
///
/// Each side has its own property bag. Equality and hashing ignore the order
/// in which the edges were given and the properties, so `{a, b} == {b, a}`.
#[derive(Debug, Clone)]
pub struct EdgePair {
    first: EdgeKey,
    second: EdgeKey,
    first_properties: Dictionary,
    second_properties: Dictionary,
}

impl EdgePair {
    pub fn new(first: EdgeKey, second: EdgeKey) -> Self {
        Self {
            first,
            second,
            first_properties: Dictionary::default(),
            second_properties: Dictionary::default(),
        }
    }

    /// The two edges in construction order.
    pub fn edges(&self) -> (EdgeKey, EdgeKey) {
        (self.first, self.second)
    }

    pub fn contains(&self, edge: EdgeKey) -> bool {
        self.first == edge || self.second == edge
    }

    /// The partner of `edge`, or `None` if `edge` is not in the pair.
    pub fn other(&self, edge: EdgeKey) -> Option<EdgeKey> {
        if edge == self.first {
            Some(self.second)
        } else if edge == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    pub fn properties_for(&self, edge: EdgeKey) -> Option<&Dictionary> {
        if edge == self.first {
            Some(&self.first_properties)
        } else if edge == self.second {
            Some(&self.second_properties)
        } else {
            None
        }
    }

    pub fn properties_for_mut(&mut self, edge: EdgeKey) -> Option<&mut Dictionary> {
        if edge == self.first {
            Some(&mut self.first_properties)
        } else if edge == self.second {
            Some(&mut self.second_properties)
        } else {
            None
        }
    }

    /// Sets a property on `edge`'s side. Returns `false` if `edge` is not in
    /// the pair.
    pub fn set_property(&mut self, edge: EdgeKey, name: impl Into<String>, value: impl Into<DictValue>) -> bool {
        match self.properties_for_mut(edge) {
            Some(props) => {
                props.insert(name.into(), value.into());
                true
            }
            None => false,
        }
    }

    fn sorted(&self) -> (EdgeKey, EdgeKey) {
        if self.first <= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }
}

impl PartialEq for EdgePair {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl Eq for EdgePair {}

impl Hash for EdgePair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;
    use slotmap::SlotMap;

    fn keys() -> (EdgeKey, EdgeKey, EdgeKey) {
        let mut map: SlotMap<EdgeKey, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()), map.insert(()))
    }

    #[test]
    fn unordered_equality_and_hash() {
        let (a, b, c) = keys();
        assert_eq!(EdgePair::new(a, b), EdgePair::new(b, a));
        assert_ne!(EdgePair::new(a, b), EdgePair::new(a, c));

        let mut set = FxHashSet::default();
        set.insert(EdgePair::new(a, b));
        assert!(!set.insert(EdgePair::new(b, a)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn other_and_contains() {
        let (a, b, c) = keys();
        let pair = EdgePair::new(a, b);
        assert!(pair.contains(a));
        assert!(!pair.contains(c));
        assert_eq!(pair.other(a), Some(b));
        assert_eq!(pair.other(b), Some(a));
        assert_eq!(pair.other(c), None);
    }

    #[test]
    fn sides_have_independent_properties() {
        let (a, b, c) = keys();
        let mut pair = EdgePair::new(a, b);
        assert!(pair.set_property(a, "lanes", 2i64));
        assert!(pair.set_property(b, "lanes", 3i64));
        assert!(!pair.set_property(c, "lanes", 1i64));

        assert_eq!(pair.properties_for(a).unwrap().get("lanes"), Some(&DictValue::Int(2)));
        assert_eq!(pair.properties_for(b).unwrap().get("lanes"), Some(&DictValue::Int(3)));
        assert!(pair.properties_for(c).is_none());

        // Properties do not take part in equality.
        assert_eq!(pair, EdgePair::new(b, a));
    }
}
