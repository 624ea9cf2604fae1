use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use aam_core::{
    AbstractValue, Address, BinaryOperator, Counting, Identifier, Lattice, SemanticError,
    UnaryOperator,
};

use crate::extras::Extras;
use crate::scalar::{FloatBits, ScalarLit};

// CONCRETE
// ================================================================================================

/// Exact-value lattice: scalars are tracked precisely rather than coarsened to a tag (spec §4.5
/// "equivalent to AAM where ... every store cell holds a singleton"). Still a bona fide
/// join-semilattice — joining two distinct literals grows the set rather than losing one — so the
/// concrete machine's reliance on globally-fresh addresses (never two states sharing a cell) is
/// what keeps every set at this type a singleton in practice, not a restriction this type enforces
/// itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Concrete<Addr, Closure, PrimOp, Tid, Pid> {
    scalars: BTreeSet<ScalarLit>,
    extras: Extras<Addr, Closure, PrimOp, Tid, Pid>,
}

impl<Addr, Closure, PrimOp, Tid, Pid> Concrete<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    fn scalar(lit: ScalarLit) -> Self {
        let mut scalars = BTreeSet::new();
        scalars.insert(lit);
        Concrete { scalars, extras: Extras::empty() }
    }

    fn error(err: SemanticError) -> Self {
        Concrete { scalars: BTreeSet::new(), extras: Extras::error(err) }
    }

    /// Cross product of both operands' literal sets: `f` returns `None` for a type-incompatible
    /// pair, which folds into a type error rather than aborting the whole computation — other
    /// pairs in the set may still succeed (non-determinism is first-class, spec §4.4).
    fn cross(
        &self,
        other: &Self,
        expected: &'static str,
        f: impl Fn(&ScalarLit, &ScalarLit) -> Option<ScalarLit>,
    ) -> Self {
        let mut scalars = BTreeSet::new();
        let mut errors = BTreeSet::new();
        for a in &self.scalars {
            for b in &other.scalars {
                match f(a, b) {
                    Some(lit) => {
                        scalars.insert(lit);
                    },
                    None => {
                        errors.insert(SemanticError::TypeError { expected, got: a.kind_name() });
                    },
                }
            }
        }
        let mut extras = Extras::empty();
        extras.errors = errors;
        Concrete { scalars, extras }
    }
}

impl<Addr, Closure, PrimOp, Tid, Pid> Lattice for Concrete<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    fn bottom() -> Self {
        Concrete { scalars: BTreeSet::new(), extras: Extras::empty() }
    }

    fn join(&self, other: &Self) -> Self {
        Concrete {
            scalars: self.scalars.union(&other.scalars).cloned().collect(),
            extras: self.extras.join(&other.extras),
        }
    }
}

/// Always counting: the concrete machine's timestamp policy mints a globally fresh coordinate on
/// every step (spec §4.5), so no two concrete states ever write the same store cell twice — every
/// address this lattice is ever paired with is allocation-unique by construction, making strong
/// update sound unconditionally.
impl<Addr, Closure, PrimOp, Tid, Pid> Counting for Concrete<Addr, Closure, PrimOp, Tid, Pid>
where
    Addr: Address,
    Closure: Clone + Eq + Ord + Hash + Debug,
    PrimOp: Clone + Eq + Ord + Hash + Debug,
    Tid: Identifier,
    Pid: Identifier,
{
    fn counting(&self) -> bool {
        true
    }
}

impl<Addr, Closure, PrimOp, Tid, Pid> AbstractValue for Concrete<Addr, Closure, PrimOp, Tid, Pid>
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
        Self::scalar(ScalarLit::Bool(b))
    }

    fn from_int(i: i64) -> Self {
        Self::scalar(ScalarLit::Int(i))
    }

    fn from_float(f: f64) -> Self {
        Self::scalar(ScalarLit::Float(FloatBits::new(f)))
    }

    fn from_char(c: char) -> Self {
        Self::scalar(ScalarLit::Char(c))
    }

    fn from_string(s: String) -> Self {
        Self::scalar(ScalarLit::Str(s))
    }

    fn from_symbol(s: String) -> Self {
        Self::scalar(ScalarLit::Symbol(s))
    }

    fn nil() -> Self {
        Self::scalar(ScalarLit::Nil)
    }

    fn from_closure(c: Closure) -> Self {
        let mut extras = Extras::empty();
        extras.closures.insert(c);
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_primitive(p: PrimOp) -> Self {
        let mut extras = Extras::empty();
        extras.primitives.insert(p);
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_pair(car: Addr, cdr: Addr) -> Self {
        let mut extras = Extras::empty();
        extras.car.insert(car);
        extras.cdr.insert(cdr);
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_vector(elems: Vec<Addr>) -> Self {
        let mut extras = Extras::empty();
        extras.vector_elems.extend(elems);
        extras.has_vector = true;
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_lock(locked: bool) -> Self {
        let mut extras = Extras::empty();
        extras.locks = crate::extras::LockTags::of(locked);
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_thread(tid: Tid) -> Self {
        let mut extras = Extras::empty();
        extras.tids.insert(tid);
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_actor(pid: Pid) -> Self {
        let mut extras = Extras::empty();
        extras.pids.insert(pid);
        Concrete { scalars: BTreeSet::new(), extras }
    }

    fn from_error(err: SemanticError) -> Self {
        Self::error(err)
    }

    fn is_true(&self) -> bool {
        self.scalars.iter().any(|s| !matches!(s, ScalarLit::Bool(false))) || !self.extras.is_empty()
    }

    fn is_false(&self) -> bool {
        self.scalars.contains(&ScalarLit::Bool(false))
    }

    fn is_error(&self) -> bool {
        !self.extras.errors.is_empty()
    }

    fn unary_op(&self, op: UnaryOperator) -> Self {
        match op {
            UnaryOperator::Not => {
                let mut scalars = BTreeSet::new();
                for s in &self.scalars {
                    scalars.insert(ScalarLit::Bool(matches!(s, ScalarLit::Bool(false))));
                }
                Concrete { scalars, extras: Extras::empty() }
            },
            UnaryOperator::IsNull => Self::from_bool(self.scalars.contains(&ScalarLit::Nil)),
            UnaryOperator::IsPair => Self::from_bool(!self.extras.car.is_empty()),
            UnaryOperator::IsProcedure => {
                Self::from_bool(!self.extras.closures.is_empty() || !self.extras.primitives.is_empty())
            },
            UnaryOperator::IsNumber => Self::from_bool(self.scalars.iter().any(ScalarLit::is_numeric)),
            UnaryOperator::IsString => Self::from_bool(self.scalars.iter().any(|s| matches!(s, ScalarLit::Str(_)))),
            UnaryOperator::IsSymbol => {
                Self::from_bool(self.scalars.iter().any(|s| matches!(s, ScalarLit::Symbol(_))))
            },
            UnaryOperator::IsBoolean => {
                Self::from_bool(self.scalars.iter().any(|s| matches!(s, ScalarLit::Bool(_))))
            },
            UnaryOperator::IsZero => {
                let mut scalars = BTreeSet::new();
                let mut errors = BTreeSet::new();
                for s in &self.scalars {
                    match s.as_f64() {
                        Some(v) => {
                            scalars.insert(ScalarLit::Bool(v == 0.0));
                        },
                        None => {
                            errors.insert(SemanticError::TypeError { expected: "number", got: s.kind_name() });
                        },
                    }
                }
                let mut extras = Extras::empty();
                extras.errors = errors;
                Concrete { scalars, extras }
            },
            UnaryOperator::Neg => {
                let mut scalars = BTreeSet::new();
                let mut errors = BTreeSet::new();
                for s in &self.scalars {
                    match s {
                        ScalarLit::Int(i) => {
                            scalars.insert(ScalarLit::Int(-i));
                        },
                        ScalarLit::Float(f) => {
                            scalars.insert(ScalarLit::Float(FloatBits::new(-f.value())));
                        },
                        other => {
                            errors.insert(SemanticError::TypeError { expected: "number", got: other.kind_name() });
                        },
                    }
                }
                let mut extras = Extras::empty();
                extras.errors = errors;
                Concrete { scalars, extras }
            },
        }
    }

    fn binary_op(&self, op: BinaryOperator, other: &Self) -> Self {
        match op {
            BinaryOperator::Add => self.cross(other, "number", |a, b| numeric_op(a, b, |x, y| x + y, |x, y| x + y)),
            BinaryOperator::Sub => self.cross(other, "number", |a, b| numeric_op(a, b, |x, y| x - y, |x, y| x - y)),
            BinaryOperator::Mul => self.cross(other, "number", |a, b| numeric_op(a, b, |x, y| x * y, |x, y| x * y)),
            BinaryOperator::Div => self.cross(other, "number", |a, b| match (a, b) {
                (ScalarLit::Int(x), ScalarLit::Int(y)) if *y != 0 => Some(ScalarLit::Int(x / y)),
                (ScalarLit::Int(_), ScalarLit::Int(_)) => None,
                (a, b) => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) if y != 0.0 => Some(ScalarLit::Float(FloatBits::new(x / y))),
                    _ => None,
                },
            }),
            BinaryOperator::Lt => self.cross(other, "number", |a, b| {
                Some(ScalarLit::Bool(a.as_f64()? < b.as_f64()?))
            }),
            BinaryOperator::Le => self.cross(other, "number", |a, b| {
                Some(ScalarLit::Bool(a.as_f64()? <= b.as_f64()?))
            }),
            BinaryOperator::NumEq => self.cross(other, "number", |a, b| {
                Some(ScalarLit::Bool(a.as_f64()? == b.as_f64()?))
            }),
            BinaryOperator::Eq => {
                let mut scalars = BTreeSet::new();
                for a in &self.scalars {
                    for b in &other.scalars {
                        scalars.insert(ScalarLit::Bool(a == b));
                    }
                }
                Concrete { scalars, extras: Extras::empty() }
            },
            BinaryOperator::Cons => {
                Self::error(SemanticError::NotSupported("cons needs allocation, use AbstractValue::from_pair"))
            },
        }
    }

    fn closures(&self) -> BTreeSet<Closure> {
        self.extras.closures.clone()
    }

    fn primitives(&self) -> BTreeSet<PrimOp> {
        self.extras.primitives.clone()
    }

    fn tids(&self) -> BTreeSet<Tid> {
        self.extras.tids.clone()
    }

    fn pids(&self) -> BTreeSet<Pid> {
        self.extras.pids.clone()
    }

    fn locks(&self) -> Vec<bool> {
        self.extras.locks.to_vec()
    }

    fn car(&self) -> BTreeSet<Addr> {
        self.extras.car.clone()
    }

    fn cdr(&self) -> BTreeSet<Addr> {
        self.extras.cdr.clone()
    }
}

fn numeric_op(
    a: &ScalarLit,
    b: &ScalarLit,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> Option<ScalarLit> {
    match (a, b) {
        (ScalarLit::Int(x), ScalarLit::Int(y)) => Some(ScalarLit::Int(int_op(*x, *y))),
        (a, b) => Some(ScalarLit::Float(FloatBits::new(float_op(a.as_f64()?, b.as_f64()?)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type C = Concrete<u32, u32, u32, u32, u32>;

    #[test]
    fn add_computes_the_exact_sum() {
        let result = C::from_int(2).binary_op(BinaryOperator::Add, &C::from_int(3));
        assert_eq!(result, C::from_int(5));
    }

    #[test]
    fn sub_is_subtraction_not_addition() {
        let result = C::from_int(5).binary_op(BinaryOperator::Sub, &C::from_int(3));
        assert_eq!(result, C::from_int(2));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let result = C::from_int(1).binary_op(BinaryOperator::Div, &C::from_int(0));
        assert!(result.is_error());
    }

    #[test]
    fn join_of_distinct_ints_keeps_both() {
        let joined = C::from_int(1).join(&C::from_int(2));
        assert!(joined.scalars.contains(&ScalarLit::Int(1)));
        assert!(joined.scalars.contains(&ScalarLit::Int(2)));
    }

    #[test]
    fn only_false_is_falsy() {
        assert!(!C::from_bool(false).is_true());
        assert!(C::from_int(0).is_true());
    }
}
