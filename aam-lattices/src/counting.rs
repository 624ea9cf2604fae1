use aam_core::{Counting, Lattice};

// OCCURRENCE COUNT
// ================================================================================================

/// The abstract-counting lattice named in the glossary: "exactly one value has ever flowed through
/// this cell" versus "more than one has" (spec §9, `--counting`). `Product<TypeSet<..>,
/// OccurrenceCount>` is the value type the CLI wires up when `--counting` is requested, giving a
/// coarse lattice the ability to opt into strong update at addresses that provably see a single
/// write.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum OccurrenceCount {
    #[default]
    Never,
    Once,
    Many,
}

impl Lattice for OccurrenceCount {
    fn bottom() -> Self {
        OccurrenceCount::Never
    }

    fn join(&self, other: &Self) -> Self {
        use OccurrenceCount::*;
        match (self, other) {
            (Never, x) | (x, Never) => *x,
            (Once, Once) => Once,
            _ => Many,
        }
    }
}

impl Counting for OccurrenceCount {
    /// `Once` is the only state that certifies a single write; `Never` means the cell has not been
    /// written through this component at all, which is vacuously safe to treat as countable too —
    /// a store that has never joined into a cell has nothing to lose by replacing it.
    fn counting(&self) -> bool {
        !matches!(self, OccurrenceCount::Many)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_write_counts() {
        let a = OccurrenceCount::Never.join(&OccurrenceCount::Once);
        assert_eq!(a, OccurrenceCount::Once);
        assert!(a.counting());
    }

    #[test]
    fn two_writes_stop_counting() {
        let a = OccurrenceCount::Once.join(&OccurrenceCount::Once);
        assert_eq!(a, OccurrenceCount::Many);
        assert!(!a.counting());
    }

    #[test]
    fn many_is_absorbing() {
        let a = OccurrenceCount::Many.join(&OccurrenceCount::Never);
        assert_eq!(a, OccurrenceCount::Many);
    }
}
