use std::time::Duration;

use aam_core::Lattice;

// ANALYSIS RESULT
// ================================================================================================

/// The Output contract of spec.md §6: the set of values the entry expression could reduce to, the
/// size of the explored state graph, wall-clock time spent, and whether the deadline cut
/// exploration short before it reached a fixpoint.
///
/// `final_values` is a `Vec` rather than a `BTreeSet`/`HashSet`: [`aam_core::Lattice`] values are
/// not generally `Ord`, and duplicate entries are harmless here (callers that care about set
/// semantics use [`AnalysisResult::contains_final_value`], which is a subsumption check, not an
/// equality check, and a handful of duplicate joins costs nothing at this scale).
#[derive(Debug, Clone)]
pub struct AnalysisResult<V> {
    pub final_values: Vec<V>,
    pub number_of_states: usize,
    pub time: Duration,
    pub timed_out: bool,
}

impl<V: Lattice> AnalysisResult<V> {
    pub fn empty() -> Self {
        AnalysisResult {
            final_values: Vec::new(),
            number_of_states: 0,
            time: Duration::ZERO,
            timed_out: false,
        }
    }

    fn push_final_value(&mut self, v: V) {
        if !self.final_values.iter().any(|existing| v.leq(existing)) {
            self.final_values.retain(|existing| !existing.leq(&v));
            self.final_values.push(v);
        }
    }

    pub fn record(&mut self, v: V) {
        self.push_final_value(v);
    }

    /// `true` iff some final value subsumes `v` (spec §6 `containsFinalValue`) — a soundness check
    /// ("could the program have produced a value at least as precise as `v`"), not an exact-match
    /// lookup.
    pub fn contains_final_value(&self, v: &V) -> bool {
        self.final_values.iter().any(|fv| v.leq(fv))
    }

    /// The single join of every final value, handy for tests that just want "the" abstract result.
    pub fn joined_value(&self) -> V {
        self.final_values.iter().fold(V::bottom(), |acc, v| acc.join(v))
    }
}

impl<V: Lattice> Default for AnalysisResult<V> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

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
    fn contains_final_value_is_a_subsumption_check() {
        let mut result: AnalysisResult<IntSet> = AnalysisResult::empty();
        result.record(IntSet([1, 2, 3].into()));
        assert!(result.contains_final_value(&IntSet([1, 2].into())));
        assert!(!result.contains_final_value(&IntSet([4].into())));
    }

    #[test]
    fn recording_a_subsumed_value_does_not_duplicate() {
        let mut result: AnalysisResult<IntSet> = AnalysisResult::empty();
        result.record(IntSet([1, 2].into()));
        result.record(IntSet([1].into()));
        assert_eq!(result.final_values.len(), 1);
        assert_eq!(result.final_values[0], IntSet([1, 2].into()));
    }

    #[test]
    fn recording_a_more_precise_value_replaces_the_coarser_one() {
        let mut result: AnalysisResult<IntSet> = AnalysisResult::empty();
        result.record(IntSet([1].into()));
        result.record(IntSet([1, 2].into()));
        assert_eq!(result.final_values, vec![IntSet([1, 2].into())]);
    }
}
