// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal callbacks with cooperative early stop.
//!
//! Index and graph traversals hand each item to a [`Visitor`], which answers
//! [`Visit::Continue`] or [`Visit::Stop`]. Closures of the form
//! `FnMut(&T) -> Visit` are visitors, so ad-hoc traversals need no type.
//! Visitors must not mutate the structure being traversed; the borrow
//! checker enforces this for graphs and indexes owned by the caller.

/// Outcome of visiting one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}

/// A callback invoked once per traversed item.
pub trait Visitor<T> {
    fn visit(&mut self, item: &T) -> Visit;
}

impl<T, F> Visitor<T> for F
where
    F: FnMut(&T) -> Visit,
{
    fn visit(&mut self, item: &T) -> Visit {
        self(item)
    }
}

/// Accumulates every visited item in traversal order. Never stops early.
#[derive(Debug, Clone)]
pub struct CollectVisitor<T> {
    items: Vec<T>,
}

impl<T> CollectVisitor<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for CollectVisitor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Visitor<T> for CollectVisitor<T> {
    fn visit(&mut self, item: &T) -> Visit {
        self.items.push(item.clone());
        Visit::Continue
    }
}

/// Forwards to `inner` only the items accepted by `predicate`.
///
/// Rejected items do not stop traversal.
#[derive(Debug, Clone)]
pub struct FilterVisitor<P, V> {
    predicate: P,
    inner: V,
}

impl<P, V> FilterVisitor<P, V> {
    pub fn new(predicate: P, inner: V) -> Self {
        Self { predicate, inner }
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

impl<T, P, V> Visitor<T> for FilterVisitor<P, V>
where
    P: FnMut(&T) -> bool,
    V: Visitor<T>,
{
    fn visit(&mut self, item: &T) -> Visit {
        if (self.predicate)(item) {
            self.inner.visit(item)
        } else {
            Visit::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<V: Visitor<i32>>(items: &[i32], visitor: &mut V) -> Visit {
        for item in items {
            if visitor.visit(item) == Visit::Stop {
                return Visit::Stop;
            }
        }
        Visit::Continue
    }

    #[test]
    fn collect_keeps_traversal_order() {
        let mut collect = CollectVisitor::new();
        assert_eq!(run(&[3, 1, 2], &mut collect), Visit::Continue);
        assert_eq!(collect.items(), &[3, 1, 2]);
    }

    #[test]
    fn closure_can_stop() {
        let mut seen = Vec::new();
        let outcome = run(&[1, 2, 3, 4], &mut |item: &i32| {
            seen.push(*item);
            if *item == 2 {
                Visit::Stop
            } else {
                Visit::Continue
            }
        });
        assert_eq!(outcome, Visit::Stop);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn filter_forwards_matches_only() {
        let mut filter = FilterVisitor::new(|item: &i32| item % 2 == 0, CollectVisitor::new());
        run(&[1, 2, 3, 4, 5, 6], &mut filter);
        assert_eq!(filter.into_inner().into_items(), vec![2, 4, 6]);
    }
}
