// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding-box spatial index over opaque payloads.
//!
//! Backed by an R-tree (`rstar`). Entries are `(BoundingBox, payload)` pairs;
//! the index never owns geometry, only the box and a copyable handle such as
//! an [`EdgeKey`](crate::EdgeKey) or an object id. Queries return every entry
//! whose box intersects the query box, which is a superset of the entries
//! whose actual geometry does. Callers refine with exact predicates.

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;

use crate::bounds::BoundingBox;
use crate::visitor::{Visit, Visitor};

type Entry<T> = GeomWithData<Rectangle<[f64; 2]>, T>;

fn rectangle(bounds: &BoundingBox) -> Rectangle<[f64; 2]> {
    Rectangle::from_corners([bounds.min_x, bounds.min_y], [bounds.max_x, bounds.max_y])
}

/// An R-tree index from bounding boxes to payloads.
///
/// # Example
///
/// ```
/// use planar_graph::{BoundingBox, SpatialIndex};
///
/// let mut index = SpatialIndex::new();
/// index.insert(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 7u64);
///
/// assert_eq!(index.query(&BoundingBox::new(0.5, 0.5, 2.0, 2.0)), vec![7]);
/// assert!(index.remove(&BoundingBox::new(0.0, 0.0, 1.0, 1.0), &7));
/// assert!(index.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    tree: RTree<Entry<T>>,
}

impl<T: Clone + PartialEq> SpatialIndex<T> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Builds an index from a batch of entries in one pass.
    ///
    /// Bulk loading produces a better-balanced tree than repeated inserts.
    pub fn bulk_load(entries: Vec<(BoundingBox, T)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(bounds, item)| GeomWithData::new(rectangle(&bounds), item))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Adds an entry. Inserting the same pair twice stores it twice.
    pub fn insert(&mut self, bounds: BoundingBox, item: T) {
        self.tree.insert(GeomWithData::new(rectangle(&bounds), item));
    }

    /// Removes one entry equal to `(bounds, item)`.
    ///
    /// Matching is by equality, not overlap: returns `false` when no entry
    /// has exactly this box and payload.
    pub fn remove(&mut self, bounds: &BoundingBox, item: &T) -> bool {
        let entry = GeomWithData::new(rectangle(bounds), item.clone());
        self.tree.remove(&entry).is_some()
    }

    /// Returns the payloads of all entries whose box intersects `bounds`.
    pub fn query(&self, bounds: &BoundingBox) -> Vec<T> {
        self.tree
            .locate_in_envelope_intersecting(&bounds.to_aabb())
            .map(|entry| entry.data.clone())
            .collect()
    }

    /// Returns the payloads of every entry in the index.
    pub fn query_all(&self) -> Vec<T> {
        self.tree.iter().map(|entry| entry.data.clone()).collect()
    }

    /// Passes each payload whose box intersects `bounds` to `visitor` until it
    /// returns [`Visit::Stop`]. Returns `Visit::Stop` if traversal ended early.
    pub fn visit<V: Visitor<T>>(&self, bounds: &BoundingBox, visitor: &mut V) -> Visit {
        for entry in self.tree.locate_in_envelope_intersecting(&bounds.to_aabb()) {
            if visitor.visit(&entry.data) == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Like [`visit`](Self::visit) over every entry.
    pub fn visit_all<V: Visitor<T>>(&self, visitor: &mut V) -> Visit {
        for entry in self.tree.iter() {
            if visitor.visit(&entry.data) == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    /// Returns `true` if an entry equal to `(bounds, item)` is present.
    pub fn contains(&self, bounds: &BoundingBox, item: &T) -> bool {
        let entry = GeomWithData::new(rectangle(bounds), item.clone());
        self.tree.contains(&entry)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}

impl<T: Clone + PartialEq> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}
