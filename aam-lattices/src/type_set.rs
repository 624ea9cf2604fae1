use std::fmt::Debug;
use std::hash::Hash;

use aam_core::{AbstractValue, Address, BinaryOperator, Identifier, Lattice, SemanticError, UnaryOperator};

use crate::extras::Extras;
use crate::tags::Tags;

// TYPE SET
// ================================================================================================

/// A finite join-semilattice of type tags (spec §10.5): scalars are summarized down to "could be
/// an int", "could be a string", etc., joined as a bitset rather than tracked as exact values.
/// Closures, primitives, pair/vector addresses, locks, thread/actor ids and errors keep the
/// precision [`crate::extras::Extras`] always carries — only the seven scalar kinds are coarsened,
/// because those are the ones a k-CFA-style analysis is willing to conflate for termination.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeSet<Addr, Closure, PrimOp, Tid, Pid> {
    tags: Tags,
    extras: Extras<Addr, Closure, PrimOp, Tid, Pid>,
}

impl<Addr, Closure, PrimOp, Tid, Pid> TypeSet<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    fn scalar(tags: Tags) -> Self {
        TypeSet { tags, extras: Extras::empty() }
    }

    fn error(err: SemanticError) -> Self {
        TypeSet { tags: Tags::EMPTY, extras: Extras::error(err) }
    }

    /// Numeric binary ops collapse to "int or float, we don't track which" — spec's type-set
    /// lattice is intentionally flow-insensitive about int/float promotion.
    fn numeric_result(&self, other: &Self) -> Self {
        if self.tags.intersects(Tags::NUMERIC) && other.tags.intersects(Tags::NUMERIC) {
            Self::scalar(Tags::NUMERIC)
        } else {
            Self::error(SemanticError::TypeError { expected: "number", got: "non-number" })
        }
    }

    fn comparison_result(&self, other: &Self) -> Self {
        if self.tags.intersects(Tags::NUMERIC) && other.tags.intersects(Tags::NUMERIC) {
            Self::scalar(Tags::BOOL_TRUE | Tags::BOOL_FALSE)
        } else {
            Self::error(SemanticError::TypeError { expected: "number", got: "non-number" })
        }
    }
}

impl<Addr, Closure, PrimOp, Tid, Pid> Lattice for TypeSet<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    fn bottom() -> Self {
        TypeSet { tags: Tags::EMPTY, extras: Extras::empty() }
    }

    fn join(&self, other: &Self) -> Self {
        TypeSet { tags: self.tags.union(other.tags), extras: self.extras.join(&other.extras) }
    }
}

impl<Addr, Closure, PrimOp, Tid, Pid> AbstractValue for TypeSet<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    type Addr = Addr;
    type Closure = Closure;
    type PrimOp = PrimOp;
    type Tid = Tid;
    type Pid = Pid;

    fn from_bool(b: bool) -> Self {
        Self::scalar(if b { Tags::BOOL_TRUE } else { Tags::BOOL_FALSE })
    }

    fn from_int(_i: i64) -> Self {
        Self::scalar(Tags::INT)
    }

    fn from_float(_f: f64) -> Self {
        Self::scalar(Tags::FLOAT)
    }

    fn from_char(_c: char) -> Self {
        Self::scalar(Tags::CHAR)
    }

    fn from_string(_s: String) -> Self {
        Self::scalar(Tags::STR)
    }

    fn from_symbol(_s: String) -> Self {
        Self::scalar(Tags::SYM)
    }

    fn nil() -> Self {
        Self::scalar(Tags::NIL)
    }

    fn from_closure(c: Closure) -> Self {
        let mut extras = Extras::empty();
        extras.closures.insert(c);
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_primitive(p: PrimOp) -> Self {
        let mut extras = Extras::empty();
        extras.primitives.insert(p);
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_pair(car: Addr, cdr: Addr) -> Self {
        let mut extras = Extras::empty();
        extras.car.insert(car);
        extras.cdr.insert(cdr);
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_vector(elems: Vec<Addr>) -> Self {
        let mut extras = Extras::empty();
        extras.vector_elems.extend(elems);
        extras.has_vector = true;
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_lock(locked: bool) -> Self {
        let mut extras = Extras::empty();
        extras.locks = crate::extras::LockTags::of(locked);
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_thread(tid: Tid) -> Self {
        let mut extras = Extras::empty();
        extras.tids.insert(tid);
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_actor(pid: Pid) -> Self {
        let mut extras = Extras::empty();
        extras.pids.insert(pid);
        TypeSet { tags: Tags::EMPTY, extras }
    }

    fn from_error(err: SemanticError) -> Self {
        Self::error(err)
    }

    fn is_true(&self) -> bool {
        self.tags.union(Tags::BOOL_FALSE) != Tags::BOOL_FALSE || !self.extras.is_empty()
    }

    fn is_false(&self) -> bool {
        self.tags.contains(Tags::BOOL_FALSE)
    }

    fn is_error(&self) -> bool {
        !self.extras.errors.is_empty()
    }

    fn unary_op(&self, op: UnaryOperator) -> Self {
        match op {
            UnaryOperator::Not => Self::scalar(Tags::BOOL_TRUE | Tags::BOOL_FALSE),
            UnaryOperator::IsNull => Self::scalar(if self.tags.contains(Tags::NIL) {
                Tags::BOOL_TRUE | Tags::BOOL_FALSE
            } else {
                Tags::BOOL_FALSE
            }),
            UnaryOperator::IsPair => Self::scalar(if !self.extras.car.is_empty() {
                Tags::BOOL_TRUE
            } else {
                Tags::BOOL_FALSE
            }),
            UnaryOperator::IsProcedure => {
                Self::scalar(if !self.extras.closures.is_empty() || !self.extras.primitives.is_empty() {
                    Tags::BOOL_TRUE
                } else {
                    Tags::BOOL_FALSE
                })
            },
            UnaryOperator::IsNumber => Self::scalar(if self.tags.intersects(Tags::NUMERIC) {
                Tags::BOOL_TRUE
            } else {
                Tags::BOOL_FALSE
            }),
            UnaryOperator::IsString => Self::scalar(if self.tags.contains(Tags::STR) {
                Tags::BOOL_TRUE
            } else {
                Tags::BOOL_FALSE
            }),
            UnaryOperator::IsSymbol => Self::scalar(if self.tags.contains(Tags::SYM) {
                Tags::BOOL_TRUE
            } else {
                Tags::BOOL_FALSE
            }),
            UnaryOperator::IsBoolean => {
                Self::scalar(if self.tags.intersects(Tags::BOOL_TRUE | Tags::BOOL_FALSE) {
                    Tags::BOOL_TRUE
                } else {
                    Tags::BOOL_FALSE
                })
            },
            UnaryOperator::IsZero => {
                if self.tags.intersects(Tags::NUMERIC) {
                    Self::scalar(Tags::BOOL_TRUE | Tags::BOOL_FALSE)
                } else {
                    Self::error(SemanticError::TypeError { expected: "number", got: "non-number" })
                }
            },
            UnaryOperator::Neg => {
                if self.tags.intersects(Tags::NUMERIC) {
                    Self::scalar(self.tags)
                } else {
                    Self::error(SemanticError::TypeError { expected: "number", got: "non-number" })
                }
            },
        }
    }

    fn binary_op(&self, op: BinaryOperator, other: &Self) -> Self {
        match op {
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div => {
                self.numeric_result(other)
            },
            BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::NumEq => {
                self.comparison_result(other)
            },
            BinaryOperator::Eq => Self::scalar(Tags::BOOL_TRUE | Tags::BOOL_FALSE),
            BinaryOperator::Cons => {
                Self::error(SemanticError::NotSupported("cons needs allocation, use AbstractValue::from_pair"))
            },
        }
    }

    fn closures(&self) -> std::collections::BTreeSet<Closure> {
        self.extras.closures.clone()
    }

    fn primitives(&self) -> std::collections::BTreeSet<PrimOp> {
        self.extras.primitives.clone()
    }

    fn tids(&self) -> std::collections::BTreeSet<Tid> {
        self.extras.tids.clone()
    }

    fn pids(&self) -> std::collections::BTreeSet<Pid> {
        self.extras.pids.clone()
    }

    fn locks(&self) -> Vec<bool> {
        self.extras.locks.to_vec()
    }

    fn car(&self) -> std::collections::BTreeSet<Addr> {
        self.extras.car.clone()
    }

    fn cdr(&self) -> std::collections::BTreeSet<Addr> {
        self.extras.cdr.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TS = TypeSet<u32, u32, u32, u32, u32>;

    #[test]
    fn bottom_is_neither_true_nor_false() {
        let b = TS::bottom();
        assert!(!b.is_true());
        assert!(!b.is_false());
    }

    #[test]
    fn only_false_literal_is_false() {
        let t = TS::from_bool(true);
        let f = TS::from_bool(false);
        assert!(t.is_true());
        assert!(!t.is_false());
        assert!(f.is_false());
        assert!(!f.is_true());
    }

    #[test]
    fn non_boolean_values_are_always_true() {
        let n = TS::from_int(0);
        assert!(n.is_true());
        assert!(!n.is_false());
    }

    #[test]
    fn join_of_true_and_false_is_both() {
        let joined = TS::from_bool(true).join(&TS::from_bool(false));
        assert!(joined.is_true());
        assert!(joined.is_false());
    }

    #[test]
    fn add_on_non_numbers_is_an_error() {
        let result = TS::from_string("x".into()).binary_op(BinaryOperator::Add, &TS::from_int(1));
        assert!(result.is_error());
    }

    #[test]
    fn add_on_numbers_stays_numeric_and_not_error() {
        let result = TS::from_int(1).binary_op(BinaryOperator::Add, &TS::from_int(2));
        assert!(!result.is_error());
        assert!(result.unary_op(UnaryOperator::IsNumber).is_true());
    }
}
