use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use aam_core::{Address, Identifier, Lattice, SemanticError};

// LOCK TAGS
// ================================================================================================

/// The two possible lock states a [`crate::AbstractValue::from_lock`] injection can summarize,
/// joined as a two-bit set so a cell can represent "may be locked, may be unlocked" the same way
/// [`crate::tags::Tags`] represents "may be true, may be false" (spec §4.1).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub struct LockTags(u8);

impl LockTags {
    const LOCKED: u8 = 1 << 0;
    const UNLOCKED: u8 = 1 << 1;

    pub fn empty() -> Self {
        LockTags(0)
    }

    pub fn of(locked: bool) -> Self {
        LockTags(if locked { Self::LOCKED } else { Self::UNLOCKED })
    }

    pub fn union(self, other: Self) -> Self {
        LockTags(self.0 | other.0)
    }

    pub fn to_vec(self) -> Vec<bool> {
        let mut v = Vec::with_capacity(2);
        if self.0 & Self::LOCKED != 0 {
            v.push(true);
        }
        if self.0 & Self::UNLOCKED != 0 {
            v.push(false);
        }
        v
    }
}

// EXTRAS
// ================================================================================================

/// The components every lattice instance in this crate shares regardless of how precisely it
/// abstracts scalars: closures, primitive ops, pair/vector addresses, lock state, thread/actor ids
/// and error markers. Each lattice wraps this alongside its own scalar representation (coarse type
/// tags for [`crate::type_set::TypeSet`], exact literals for [`crate::concrete::Concrete`], a
/// clamped interval for [`crate::bounded_int::BoundedInt`]) rather than duplicating these fields
/// three times.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Extras<Addr, Closure, PrimOp, Tid, Pid> {
    pub closures: BTreeSet<Closure>,
    pub primitives: BTreeSet<PrimOp>,
    pub car: BTreeSet<Addr>,
    pub cdr: BTreeSet<Addr>,
    pub vector_elems: BTreeSet<Addr>,
    pub has_vector: bool,
    pub tids: BTreeSet<Tid>,
    pub pids: BTreeSet<Pid>,
    pub locks: LockTags,
    pub errors: BTreeSet<SemanticError>,
}

impl<Addr, Closure, PrimOp, Tid, Pid> Extras<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    pub fn empty() -> Self {
        Extras {
            closures: BTreeSet::new(),
            primitives: BTreeSet::new(),
            car: BTreeSet::new(),
            cdr: BTreeSet::new(),
            vector_elems: BTreeSet::new(),
            has_vector: false,
            tids: BTreeSet::new(),
            pids: BTreeSet::new(),
            locks: LockTags::empty(),
            errors: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
            && self.primitives.is_empty()
            && self.car.is_empty()
            && self.cdr.is_empty()
            && self.vector_elems.is_empty()
            && !self.has_vector
            && self.tids.is_empty()
            && self.pids.is_empty()
            && self.locks == LockTags::empty()
            && self.errors.is_empty()
    }

    /// Pointwise union of every component — the part of each lattice's `join` that isn't scalar.
    pub fn join(&self, other: &Self) -> Self {
        Extras {
            closures: self.closures.union(&other.closures).cloned().collect(),
            primitives: self.primitives.union(&other.primitives).cloned().collect(),
            car: self.car.union(&other.car).cloned().collect(),
            cdr: self.cdr.union(&other.cdr).cloned().collect(),
            vector_elems: self.vector_elems.union(&other.vector_elems).cloned().collect(),
            has_vector: self.has_vector || other.has_vector,
            tids: self.tids.union(&other.tids).cloned().collect(),
            pids: self.pids.union(&other.pids).cloned().collect(),
            locks: self.locks.union(other.locks),
            errors: self.errors.union(&other.errors).cloned().collect(),
        }
    }

    pub fn error(err: SemanticError) -> Self {
        let mut e = Self::empty();
        e.errors.insert(err);
        e
    }
}

/// Panics on construction of an impossible [`Lattice::bottom`] — `Extras` alone is never a
/// standalone lattice, only a component of one; kept private to this module's tests.
#[cfg(test)]
impl<Addr, Closure, PrimOp, Tid, Pid> Lattice for Extras<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    fn bottom() -> Self {
        Self::empty()
    }

    fn join(&self, other: &Self) -> Self {
        Extras::join(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_unions_every_component() {
        let a = Extras::<&str, &str, &str, &str, &str>::empty();
        let mut b = Extras::<&str, &str, &str, &str, &str>::empty();
        b.closures.insert("c1");
        b.tids.insert("t1");
        let joined = a.join(&b);
        assert!(joined.closures.contains("c1"));
        assert!(joined.tids.contains("t1"));
    }

    #[test]
    fn lock_tags_accumulate_both_states() {
        let locked = LockTags::of(true);
        let unlocked = LockTags::of(false);
        let both = locked.union(unlocked);
        let mut v = both.to_vec();
        v.sort();
        assert_eq!(v, vec![false, true]);
    }
}
