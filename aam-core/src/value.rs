use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::address::Address;
use crate::error::SemanticError;
use crate::identifier::Identifier;
use crate::lattice::Lattice;

// OPERATORS
// ================================================================================================

/// Every unary primitive the value lattice must be able to dispatch. `Car`/`Cdr` project to
/// addresses rather than values (see [`AbstractValue::car`]/[`AbstractValue::cdr`]) and so are not
/// listed here.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum UnaryOperator {
    Not,
    IsNull,
    IsPair,
    IsProcedure,
    IsNumber,
    IsString,
    IsSymbol,
    IsBoolean,
    IsZero,
    Neg,
}

/// Every binary primitive the value lattice must be able to dispatch. `Sub` is subtraction — the
/// spec's open question flags an upstream copy-paste bug (`opMinus` implemented as addition) that
/// every lattice instance in this workspace fixes (spec §9).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    NumEq,
    Eq,
    Cons,
}

// ABSTRACT VALUE
// ================================================================================================

/// The contract every abstract-value lattice must satisfy (spec §4.1): injections for every
/// primitive kind plus closures, primitive ops, pairs/vectors (by address), locks, thread/actor
/// ids and error markers; truth/falsity projections that may both hold (encoding "may be true, may
/// be false"); operator dispatch that never panics; and content extractors for the accessors the
/// kernel needs to drive exploration (e.g. "what closures might this value be" at a call site).
pub trait AbstractValue: Lattice {
    type Addr: Address;
    type Closure: Clone + Eq + Ord + Hash + Debug;
    type PrimOp: Clone + Eq + Ord + Hash + Debug;
    type Tid: Identifier;
    type Pid: Identifier;

    fn from_bool(b: bool) -> Self;
    fn from_int(i: i64) -> Self;
    fn from_float(f: f64) -> Self;
    fn from_char(c: char) -> Self;
    fn from_string(s: String) -> Self;
    fn from_symbol(s: String) -> Self;
    fn nil() -> Self;
    fn from_closure(c: Self::Closure) -> Self;
    fn from_primitive(p: Self::PrimOp) -> Self;
    fn from_pair(car: Self::Addr, cdr: Self::Addr) -> Self;
    fn from_vector(elems: Vec<Self::Addr>) -> Self;
    fn from_lock(locked: bool) -> Self;
    fn from_thread(tid: Self::Tid) -> Self;
    fn from_actor(pid: Self::Pid) -> Self;
    fn from_error(err: SemanticError) -> Self;

    /// May this value be truthy? (Not mutually exclusive with [`Self::is_false`] — an abstraction
    /// of a boolean-typed cell is both.)
    fn is_true(&self) -> bool;
    fn is_false(&self) -> bool;
    fn is_error(&self) -> bool;

    /// Never panics: returns an error-tagged value when `op` is inapplicable.
    fn unary_op(&self, op: UnaryOperator) -> Self;
    fn binary_op(&self, op: BinaryOperator, other: &Self) -> Self;

    fn closures(&self) -> BTreeSet<Self::Closure>;
    fn primitives(&self) -> BTreeSet<Self::PrimOp>;
    fn tids(&self) -> BTreeSet<Self::Tid>;
    fn pids(&self) -> BTreeSet<Self::Pid>;
    fn locks(&self) -> Vec<bool>;
    fn car(&self) -> BTreeSet<Self::Addr>;
    fn cdr(&self) -> BTreeSet<Self::Addr>;
}
