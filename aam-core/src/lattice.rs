use core::fmt::Debug;
use core::hash::Hash;

// LATTICE
// ================================================================================================

/// A join-semilattice with a bottom element.
///
/// `⊥ ⊑ x ⊑ x ⊔ y` for all `x, y` is the only law every implementation must satisfy; `leq` is
/// derived from `join` so instances only need to get `join` right.
pub trait Lattice: Clone + Eq + Hash + Debug {
    /// `⊥`: the empty abstraction, absent cells and fresh store locations read as this.
    fn bottom() -> Self;

    /// `⊔`: must be commutative, associative and idempotent.
    fn join(&self, other: &Self) -> Self;

    /// `⊑`, derived as `self ⊔ other == other`. Lattices with a cheaper direct test may override
    /// it, but overrides must agree with this definition.
    fn leq(&self, other: &Self) -> bool {
        &self.join(other) == other
    }
}

/// Abstract counting distinguishes "exactly one value has ever flowed through this cell" from
/// "more than one has" — the precondition for strong update. A lattice opts in by implementing
/// this trait on top of [`Lattice`]; [`Product`] propagates it only when *both* components count.
pub trait Counting: Lattice {
    /// `true` iff `self` summarizes a single concrete value (a singleton join-history), enabling a
    /// store write to replace rather than join the cell's content.
    fn counting(&self) -> bool;
}

// PRODUCT
// ================================================================================================

/// Builds a lattice out of two lattices component-wise: `⊥ = (⊥,⊥)`, join is pointwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product<X, Y>(pub X, pub Y);

impl<X: Lattice, Y: Lattice> Lattice for Product<X, Y> {
    fn bottom() -> Self {
        Product(X::bottom(), Y::bottom())
    }

    fn join(&self, other: &Self) -> Self {
        Product(self.0.join(&other.0), self.1.join(&other.1))
    }
}

impl<X: Counting, Y: Counting> Counting for Product<X, Y> {
    fn counting(&self) -> bool {
        self.0.counting() && self.1.counting()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Flag(bool);

    impl Lattice for Flag {
        fn bottom() -> Self {
            Flag(false)
        }

        fn join(&self, other: &Self) -> Self {
            Flag(self.0 || other.0)
        }
    }

    impl Counting for Flag {
        fn counting(&self) -> bool {
            !self.0
        }
    }

    #[test]
    fn product_joins_pointwise() {
        let a = Product(Flag(true), Flag(false));
        let b = Product(Flag(false), Flag(false));
        assert_eq!(a.join(&b), Product(Flag(true), Flag(false)));
        assert_eq!(Product::<Flag, Flag>::bottom(), Product(Flag(false), Flag(false)));
    }

    #[test]
    fn product_counts_only_when_both_count() {
        let both_count = Product(Flag(false), Flag(false));
        let one_doesnt = Product(Flag(true), Flag(false));
        assert!(both_count.counting());
        assert!(!one_doesnt.counting());
    }

    /// `leq` is derived from `join` (`self ⊔ other == other`) for every pair of `Flag`s — the law
    /// doc comment on `Lattice::leq` asserts, checked directly rather than for one hand-picked pair.
    #[rstest]
    #[case::bottom_below_top(Flag(false), Flag(true), true)]
    #[case::top_not_below_bottom(Flag(true), Flag(false), false)]
    #[case::bottom_below_itself(Flag(false), Flag(false), true)]
    #[case::top_below_itself(Flag(true), Flag(true), true)]
    fn leq_is_derived_from_join(#[case] a: Flag, #[case] b: Flag, #[case] expected: bool) {
        assert_eq!(a.leq(&b), expected);
    }
}
