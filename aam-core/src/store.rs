use std::collections::BTreeMap;
use std::sync::Arc;

use crate::address::Address;
use crate::lattice::{Counting, Lattice};

// STORE
// ================================================================================================

/// Address → lattice cell. `lookup` of an absent address reads as `⊥`; `extend` joins into the
/// existing cell (strong update is opt-in, via [`Store::strong_update`], not the default). Backed
/// by a `BTreeMap` behind an `Arc` so the whole store can be cloned cheaply and compared
/// structurally — required because AAM's `State` embeds the store directly (spec §4.5).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Store<A, V> {
    cells: Arc<BTreeMap<A, V>>,
}

impl<A: Address, V: Lattice> Store<A, V> {
    pub fn empty() -> Self {
        Self { cells: Arc::new(BTreeMap::new()) }
    }

    /// `σ(a)`, defaulting to `⊥` when `a` has never been written.
    pub fn lookup(&self, a: &A) -> V {
        self.cells.get(a).cloned().unwrap_or_else(V::bottom)
    }

    /// `σ[a ↦ σ(a) ⊔ v]` — the default, join-only write.
    pub fn extend(&self, a: A, v: V) -> Self {
        let mut cells = (*self.cells).clone();
        let joined = match cells.get(&a) {
            Some(existing) => existing.join(&v),
            None => v,
        };
        cells.insert(a, joined);
        Self { cells: Arc::new(cells) }
    }

    /// Pointwise join of two stores: `σ₁ ⊔ σ₂`.
    pub fn join(&self, other: &Self) -> Self {
        if Arc::ptr_eq(&self.cells, &other.cells) {
            return self.clone();
        }
        let mut cells = (*self.cells).clone();
        for (a, v) in other.cells.iter() {
            let joined = match cells.get(a) {
                Some(existing) => existing.join(v),
                None => v.clone(),
            };
            cells.insert(a.clone(), joined);
        }
        Self { cells: Arc::new(cells) }
    }

    /// `self ⊑ other`, addressable-wise: every cell of `self` is subsumed by the corresponding
    /// cell of `other` (spec §8 property 1, monotonicity).
    pub fn leq(&self, other: &Self) -> bool {
        self.cells.iter().all(|(a, v)| v.leq(&other.lookup(a)))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&A, &V)> {
        self.cells.iter()
    }
}

impl<A: Address, V: Lattice + Counting> Store<A, V> {
    /// Replaces rather than joins the cell at `a`. Only sound when the store's abstract-counting
    /// component certifies `a` has been allocated exactly once (or in the concrete machine, where
    /// every address is allocation-unique by construction).
    pub fn strong_update(&self, a: A, v: V) -> Self {
        let mut cells = (*self.cells).clone();
        cells.insert(a, v);
        Self { cells: Arc::new(cells) }
    }
}

impl<A: Address, V: Lattice> Default for Store<A, V> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct IntSet(std::collections::BTreeSet<i64>);

    impl Lattice for IntSet {
        fn bottom() -> Self {
            IntSet(std::collections::BTreeSet::new())
        }

        fn join(&self, other: &Self) -> Self {
            IntSet(self.0.union(&other.0).cloned().collect())
        }
    }

    #[test]
    fn lookup_of_absent_address_is_bottom() {
        let store: Store<&str, IntSet> = Store::empty();
        assert_eq!(store.lookup(&"a"), IntSet::bottom());
    }

    #[test]
    fn extend_joins_rather_than_overwrites() {
        let store = Store::<&str, IntSet>::empty().extend("a", IntSet([1].into()));
        let store = store.extend("a", IntSet([2].into()));
        assert_eq!(store.lookup(&"a"), IntSet([1, 2].into()));
    }

    #[test]
    fn join_is_pointwise() {
        let s1 = Store::<&str, IntSet>::empty().extend("a", IntSet([1].into()));
        let s2 = Store::<&str, IntSet>::empty().extend("a", IntSet([2].into())).extend(
            "b",
            IntSet([3].into()),
        );
        let joined = s1.join(&s2);
        assert_eq!(joined.lookup(&"a"), IntSet([1, 2].into()));
        assert_eq!(joined.lookup(&"b"), IntSet([3].into()));
    }

    #[test]
    fn monotonicity_holds_across_extend() {
        let s1 = Store::<&str, IntSet>::empty().extend("a", IntSet([1].into()));
        let s2 = s1.extend("a", IntSet([2].into()));
        assert!(s1.leq(&s2));
    }

    #[test]
    fn strong_update_replaces_the_cell() {
        let store = Store::<&str, IntSet>::empty().extend("a", IntSet([1].into()));
        let store = store.strong_update("a", IntSet([2].into()));
        assert_eq!(store.lookup(&"a"), IntSet([2].into()));
    }
}
