use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// CONTINUATION ADDRESSING
// ================================================================================================

/// The driver's own addressing coordinate for continuation frames: the expression about to be
/// evaluated once the frame is popped (spec §3 "frames are allocated at `KontAddress(exp)` so
/// recursive continuations coalesce"). Kept independent of [`aam_core::AddressPolicy`] — that
/// policy only mints addresses for a language's *values*, and a `Semantics` impl never hands the
/// driver one for its own frames (see `DESIGN.md`) — so every machine variant here allocates
/// continuations the same way regardless of which `AddressPolicy` the language was configured
/// with.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KontAddr<Exp>(pub Exp);

/// The top of a continuation: either the program has no more frames to return to (`Halt`, the
/// point at which a surfaced value becomes a final value) or there is one, addressed by `KontAddr`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum KontPtr<Exp> {
    Halt,
    At(KontAddr<Exp>),
}

impl<Exp> KontPtr<Exp> {
    pub fn is_halt(&self) -> bool {
        matches!(self, KontPtr::Halt)
    }
}

/// `KontAddress -> {(frame, tail)}` (spec §3): a address-keyed map of continuation cells, each
/// holding the *set* of `(frame, tail-pointer)` pairs ever pushed at that address. Two states
/// whose control-flow converges to the same expression at the same point share one cell instead
/// of growing two independent stacks — the coalescing property that bounds the reachable state
/// space for recursive programs.
///
/// Backed by a `HashMap` rather than `BTreeMap` because [`aam_core::Semantics::Exp`] is only
/// required to be `Hash`, not `Ord` — unlike [`aam_core::Store`], which can lean on
/// `aam_core::Address: Ord`. Equality/hashing of the whole store therefore has to treat each
/// cell's frame list as an unordered set explicitly, which is what the hand-written `PartialEq`/
/// `Hash` impls below do; the `join`/`insert` API below is careful to never insert the same pair
/// twice, so a plain length-plus-containment check is a sound means of set comparison.
#[derive(Clone)]
pub struct KontStore<Exp, Frame> {
    cells: Arc<HashMap<KontAddr<Exp>, Vec<(Frame, KontPtr<Exp>)>>>,
}

impl<Exp: Clone + Eq + Hash + Debug, Frame: Clone + Eq + Hash + Debug> KontStore<Exp, Frame> {
    pub fn empty() -> Self {
        KontStore { cells: Arc::new(HashMap::new()) }
    }

    /// `σ'[ak ↦ σ'(ak) ⊔ {(frame, tail)}]` — the frame-push operation every variant's `Push`
    /// handler uses to mint/extend a continuation cell.
    pub fn push(&self, addr: KontAddr<Exp>, frame: Frame, tail: KontPtr<Exp>) -> Self {
        let mut cells = (*self.cells).clone();
        let entry = cells.entry(addr).or_default();
        if !entry.iter().any(|(f, p)| f == &frame && p == &tail) {
            entry.push((frame, tail));
        }
        KontStore { cells: Arc::new(cells) }
    }

    /// Every `(frame, tail)` pair ever pushed at `addr` — the branches `step_kont` must be called
    /// against when a value surfaces with this address on top.
    pub fn lookup(&self, addr: &KontAddr<Exp>) -> &[(Frame, KontPtr<Exp>)] {
        self.cells.get(addr).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn join(&self, other: &Self) -> Self {
        if Arc::ptr_eq(&self.cells, &other.cells) {
            return self.clone();
        }
        let mut cells = (*self.cells).clone();
        for (addr, pairs) in other.cells.iter() {
            let entry = cells.entry(addr.clone()).or_default();
            for (f, p) in pairs {
                if !entry.iter().any(|(ef, ep)| ef == f && ep == p) {
                    entry.push((f.clone(), p.clone()));
                }
            }
        }
        KontStore { cells: Arc::new(cells) }
    }

    /// `self ⊑ other`: every pair at every address of `self` also appears at `other`.
    pub fn leq(&self, other: &Self) -> bool {
        self.cells.iter().all(|(addr, pairs)| {
            let other_pairs = other.lookup(addr);
            pairs.iter().all(|p| other_pairs.contains(p))
        })
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }
}

impl<Exp: Clone + Eq + Hash + Debug, Frame: Clone + Eq + Hash + Debug> Default
    for KontStore<Exp, Frame>
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<Exp: Eq + Hash, Frame: Eq + Hash> PartialEq for KontStore<Exp, Frame> {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.cells, &other.cells) {
            return true;
        }
        if self.cells.len() != other.cells.len() {
            return false;
        }
        self.cells.iter().all(|(addr, pairs)| match other.cells.get(addr) {
            Some(other_pairs) => {
                pairs.len() == other_pairs.len() && pairs.iter().all(|p| other_pairs.contains(p))
            },
            None => false,
        })
    }
}

impl<Exp: Eq + Hash, Frame: Eq + Hash> Eq for KontStore<Exp, Frame> {}

impl<Exp: Hash, Frame: Hash> Hash for KontStore<Exp, Frame> {
    /// Order-independent so it stays consistent with the set-style `PartialEq` above: each cell's
    /// contribution is the *sum* of its pairs' hashes, not a hash of the `Vec` in insertion order.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut acc: u64 = 0;
        for (addr, pairs) in self.cells.iter() {
            let mut cell_hasher = DefaultHasher::new();
            addr.hash(&mut cell_hasher);
            let mut pair_sum: u64 = 0;
            for pair in pairs {
                let mut ph = DefaultHasher::new();
                pair.hash(&mut ph);
                pair_sum = pair_sum.wrapping_add(ph.finish());
            }
            pair_sum.hash(&mut cell_hasher);
            acc = acc.wrapping_add(cell_hasher.finish());
        }
        acc.hash(state);
    }
}

impl<Exp: Debug, Frame: Debug> Debug for KontStore<Exp, Frame> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.cells.iter()).finish()
    }
}

/// Sorted snapshot used only by the DOT exporter, where deterministic iteration order matters for
/// reproducible output; not used on the hot exploration path.
pub fn sorted_addrs<Exp: Ord + Clone, Frame>(
    store: &KontStore<Exp, Frame>,
) -> BTreeMap<Exp, usize> {
    store.cells.keys().map(|a| (a.0.clone(), store.lookup(a).len())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushing_the_same_pair_twice_does_not_duplicate() {
        let store: KontStore<&str, &str> = KontStore::empty();
        let store = store.push(KontAddr("e"), "frame", KontPtr::Halt);
        let store = store.push(KontAddr("e"), "frame", KontPtr::Halt);
        assert_eq!(store.lookup(&KontAddr("e")).len(), 1);
    }

    #[test]
    fn distinct_frames_at_the_same_address_coalesce_into_one_cell() {
        let store: KontStore<&str, &str> = KontStore::empty();
        let store = store.push(KontAddr("e"), "frame-a", KontPtr::Halt);
        let store = store.push(KontAddr("e"), "frame-b", KontPtr::Halt);
        assert_eq!(store.lookup(&KontAddr("e")).len(), 2);
    }

    #[test]
    fn join_is_order_independent_for_equality_and_hashing() {
        let a = KontStore::<&str, &str>::empty()
            .push(KontAddr("e"), "f1", KontPtr::Halt)
            .push(KontAddr("e"), "f2", KontPtr::Halt);
        let b = KontStore::<&str, &str>::empty()
            .push(KontAddr("e"), "f2", KontPtr::Halt)
            .push(KontAddr("e"), "f1", KontPtr::Halt);
        assert_eq!(a, b);
        let mut ha = DefaultHasher::new();
        a.hash(&mut ha);
        let mut hb = DefaultHasher::new();
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn leq_holds_when_every_pair_is_present_in_the_other() {
        let small = KontStore::<&str, &str>::empty().push(KontAddr("e"), "f1", KontPtr::Halt);
        let big = small.clone().push(KontAddr("e"), "f2", KontPtr::Halt);
        assert!(small.leq(&big));
        assert!(!big.leq(&small));
    }
}
