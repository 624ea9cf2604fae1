use core::fmt::Debug;
use core::hash::Hash;
use core::marker::PhantomData;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

// TIMESTAMP
// ================================================================================================

/// A context-sensitivity coordinate. `zero` is the timestamp at program entry; everything else the
/// kernel needs from a timestamp is equality, hashing and ordering for use as a store/address key.
pub trait Timestamp: Clone + Eq + Ord + Hash + Debug {
    fn zero() -> Self;
}

/// Advances a timestamp on each control step (`tick`) and, optionally, records extra calling
/// context at a `StepIn` (`tick_call`). The default `tick_call` just forwards to `tick`; k-CFA
/// overrides it to prepend the call site.
pub trait TimestampPolicy {
    type Exp: Clone + Eq + Hash + Debug;
    type Time: Timestamp;

    fn tick(&self, t: &Self::Time, e: &Self::Exp) -> Self::Time;

    fn tick_call(&self, t: &Self::Time, e: &Self::Exp, _callsite: &Self::Exp) -> Self::Time {
        self.tick(t, e)
    }
}

// K-CFA
// ================================================================================================

/// A call string of at most `k` call sites, most recent first. `tick` is a no-op (most languages'
/// evaluation steps aren't call sites); `tick_call` is the one that grows/truncates the string,
/// which is the sense in which "k-CFA retains the last k call sites" (spec §3).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallString<Exp> {
    sites: VecDeque<Exp>,
}

impl<Exp: Clone + Eq + Hash + Debug> Timestamp for CallString<Exp> {
    fn zero() -> Self {
        CallString { sites: VecDeque::new() }
    }
}

impl<Exp: Ord> Ord for CallString<Exp> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.sites.cmp(&other.sites)
    }
}

impl<Exp: Ord> PartialOrd for CallString<Exp> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// k-CFA context policy: `k = 0` collapses every call history into one timestamp (0-CFA).
#[derive(Debug, Clone, Copy)]
pub struct KCfa<Exp> {
    k: usize,
    _marker: PhantomData<fn() -> Exp>,
}

impl<Exp> KCfa<Exp> {
    pub fn new(k: usize) -> Self {
        Self { k, _marker: PhantomData }
    }
}

impl<Exp: Clone + Eq + Ord + Hash + Debug> TimestampPolicy for KCfa<Exp> {
    type Exp = Exp;
    type Time = CallString<Exp>;

    fn tick(&self, t: &Self::Time, _e: &Self::Exp) -> Self::Time {
        t.clone()
    }

    fn tick_call(&self, t: &Self::Time, _e: &Self::Exp, callsite: &Self::Exp) -> Self::Time {
        let mut sites = t.sites.clone();
        sites.push_front(callsite.clone());
        sites.truncate(self.k);
        CallString { sites }
    }
}

// CONCRETE TIMESTAMP
// ================================================================================================

/// Globally unique per step: two concrete states are never identified by a shared timestamp, which
/// is exactly what lets [`crate::lattice::Counting`]-free strong update be sound in the concrete
/// machine (spec §4.5).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ConcreteTime(u64);

impl Timestamp for ConcreteTime {
    fn zero() -> Self {
        ConcreteTime(0)
    }
}

#[derive(Debug, Default)]
pub struct ConcreteTimestampPolicy<Exp> {
    counter: AtomicU64,
    _marker: PhantomData<fn() -> Exp>,
}

impl<Exp> ConcreteTimestampPolicy<Exp> {
    pub fn new() -> Self {
        Self { counter: AtomicU64::new(1), _marker: PhantomData }
    }
}

impl<Exp: Clone + Eq + Hash + Debug> TimestampPolicy for ConcreteTimestampPolicy<Exp> {
    type Exp = Exp;
    type Time = ConcreteTime;

    fn tick(&self, _t: &Self::Time, _e: &Self::Exp) -> Self::Time {
        ConcreteTime(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cfa_collapses_all_histories() {
        let policy: KCfa<&'static str> = KCfa::new(0);
        let t0 = CallString::zero();
        let t1 = policy.tick_call(&t0, &"body", &"call-a");
        let t2 = policy.tick_call(&t1, &"body", &"call-b");
        assert_eq!(t1, CallString::zero());
        assert_eq!(t2, CallString::zero());
    }

    #[test]
    fn k_cfa_retains_last_k_call_sites() {
        let policy: KCfa<&'static str> = KCfa::new(2);
        let t0 = CallString::zero();
        let t1 = policy.tick_call(&t0, &"b1", &"c1");
        let t2 = policy.tick_call(&t1, &"b2", &"c2");
        let t3 = policy.tick_call(&t2, &"b3", &"c3");
        assert_eq!(t3.sites, VecDeque::from(vec!["c3", "c2"]));
    }

    #[test]
    fn concrete_timestamps_are_pairwise_distinct() {
        let policy: ConcreteTimestampPolicy<&'static str> = ConcreteTimestampPolicy::new();
        let t0 = ConcreteTime::zero();
        let t1 = policy.tick(&t0, &"e");
        let t2 = policy.tick(&t1, &"e");
        assert_ne!(t1, t2);
    }
}
