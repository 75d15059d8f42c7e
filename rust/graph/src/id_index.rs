// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial index over identifiers of externally owned objects.
//!
//! [`IdObjectIndex`] keeps only `(BoundingBox, ObjectId)` entries. Queries
//! resolve identifiers back to objects through an [`ObjectResolver`], so the
//! backing store can change (or drop records) without the index owning any
//! of its data. Identifiers that no longer resolve are left out of results.

use crate::bounds::BoundingBox;
use crate::spatial::SpatialIndex;
use crate::visitor::{Visit, Visitor};

/// Opaque identifier of a record in the backing store.
pub type ObjectId = u64;

/// Bridge between the index and the store that owns the objects.
pub trait ObjectResolver<T> {
    /// Identifier of an object. Must be stable for the object's lifetime.
    fn object_id(&self, object: &T) -> ObjectId;

    /// Bounds under which the object is indexed.
    fn bounding_box(&self, object: &T) -> BoundingBox;

    /// Resolves an identifier, or `None` if the store no longer has it.
    fn get_object(&self, id: ObjectId) -> Option<T>;

    /// Resolves a batch of identifiers, skipping the ones that fail.
    fn get_objects(&self, ids: &[ObjectId]) -> Vec<T> {
        ids.iter().filter_map(|&id| self.get_object(id)).collect()
    }
}

impl<T, R: ObjectResolver<T> + ?Sized> ObjectResolver<T> for &R {
    fn object_id(&self, object: &T) -> ObjectId {
        (**self).object_id(object)
    }

    fn bounding_box(&self, object: &T) -> BoundingBox {
        (**self).bounding_box(object)
    }

    fn get_object(&self, id: ObjectId) -> Option<T> {
        (**self).get_object(id)
    }

    fn get_objects(&self, ids: &[ObjectId]) -> Vec<T> {
        (**self).get_objects(ids)
    }
}

/// Spatial index of object identifiers, resolved on query.
#[derive(Debug, Clone)]
pub struct IdObjectIndex<R> {
    resolver: R,
    index: SpatialIndex<ObjectId>,
}

impl<R> IdObjectIndex<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            index: SpatialIndex::new(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Identifiers whose bounds intersect `bounds`, unresolved.
    pub fn query_ids(&self, bounds: &BoundingBox) -> Vec<ObjectId> {
        self.index.query(bounds)
    }

    /// Drops every entry. The backing store is untouched.
    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// Replaces the resolver, keeping the indexed identifiers.
    pub fn with_resolver<S>(self, resolver: S) -> IdObjectIndex<S> {
        IdObjectIndex {
            resolver,
            index: self.index,
        }
    }
}

impl<R> IdObjectIndex<R> {
    /// Indexes an object under its identifier and bounds, handing it back.
    pub fn add<T>(&mut self, object: T) -> T
    where
        R: ObjectResolver<T>,
    {
        let id = self.resolver.object_id(&object);
        let bounds = self.resolver.bounding_box(&object);
        self.index.insert(bounds, id);
        object
    }

    /// Removes an object's entry. Returns `false` if it was not indexed under
    /// its current bounds.
    pub fn remove<T>(&mut self, object: &T) -> bool
    where
        R: ObjectResolver<T>,
    {
        let id = self.resolver.object_id(object);
        let bounds = self.resolver.bounding_box(object);
        self.index.remove(&bounds, &id)
    }

    /// Resolved objects whose bounds intersect `bounds`.
    pub fn query<T>(&self, bounds: &BoundingBox) -> Vec<T>
    where
        R: ObjectResolver<T>,
    {
        self.resolve(self.index.query(bounds))
    }

    /// Every resolvable indexed object.
    pub fn query_all<T>(&self) -> Vec<T>
    where
        R: ObjectResolver<T>,
    {
        self.resolve(self.index.query_all())
    }

    /// Visits resolved objects whose bounds intersect `bounds` until the
    /// visitor stops. Identifiers that fail to resolve are skipped.
    pub fn visit<T, V>(&self, bounds: &BoundingBox, visitor: &mut V) -> Visit
    where
        R: ObjectResolver<T>,
        V: Visitor<T>,
    {
        self.index.visit(bounds, &mut |id: &ObjectId| match self.resolver.get_object(*id) {
            Some(object) => visitor.visit(&object),
            None => {
                tracing::trace!(id = *id, "dropped unresolvable object id");
                Visit::Continue
            }
        })
    }

    fn resolve<T>(&self, ids: Vec<ObjectId>) -> Vec<T>
    where
        R: ObjectResolver<T>,
    {
        let requested = ids.len();
        let objects = self.resolver.get_objects(&ids);
        if objects.len() < requested {
            tracing::trace!(
                requested,
                resolved = objects.len(),
                "dropped unresolvable object ids"
            );
        }
        objects
    }
}
