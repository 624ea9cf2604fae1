use std::hash::{Hash, Hasher};

use aam_core::{Addr, Environment};

use crate::ast::{Exp, Ident};

// ADDRESSES AND ENVIRONMENTS
// ================================================================================================

/// This language's address shape, fixing the allocation policy's `Ident`/`Exp` coordinates and
/// leaving the timestamp generic over whichever policy the machine is configured with.
pub type LangAddr<Time> = Addr<Ident, Exp, Time>;
pub type Env<Time> = Environment<Ident, LangAddr<Time>>;

// CLOSURES AND PRIMITIVES
// ================================================================================================

/// A closed-over lambda. No value type parameter: the environment maps to addresses, never to
/// values directly, so a closure never has to name the lattice it will eventually be paired with.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Closure<Time> {
    pub params: Vec<Ident>,
    pub body: Exp,
    pub env: Env<Time>,
}

/// The primitive operations bound in the global prelude. Distinct from [`aam_core::UnaryOperator`]/
/// [`aam_core::BinaryOperator`] — those are the lattice's internal dispatch tags; this is the
/// surface name a program applies like any other procedure.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    NumEq,
    Not,
    IsZero,
    Cons,
    Car,
    Cdr,
}

impl PrimOp {
    pub fn name(self) -> &'static str {
        match self {
            PrimOp::Add => "+",
            PrimOp::Sub => "-",
            PrimOp::Mul => "*",
            PrimOp::Div => "/",
            PrimOp::Lt => "<",
            PrimOp::Le => "<=",
            PrimOp::NumEq => "=",
            PrimOp::Not => "not",
            PrimOp::IsZero => "zero?",
            PrimOp::Cons => "cons",
            PrimOp::Car => "car",
            PrimOp::Cdr => "cdr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "+" => PrimOp::Add,
            "-" => PrimOp::Sub,
            "*" => PrimOp::Mul,
            "/" => PrimOp::Div,
            "<" => PrimOp::Lt,
            "<=" => PrimOp::Le,
            "=" => PrimOp::NumEq,
            "not" => PrimOp::Not,
            "zero?" => PrimOp::IsZero,
            "cons" => PrimOp::Cons,
            "car" => PrimOp::Car,
            "cdr" => PrimOp::Cdr,
            _ => return None,
        })
    }

    pub const ALL: [PrimOp; 12] = [
        PrimOp::Add,
        PrimOp::Sub,
        PrimOp::Mul,
        PrimOp::Div,
        PrimOp::Lt,
        PrimOp::Le,
        PrimOp::NumEq,
        PrimOp::Not,
        PrimOp::IsZero,
        PrimOp::Cons,
        PrimOp::Car,
        PrimOp::Cdr,
    ];
}

// THREAD AND ACTOR IDENTITY
// ================================================================================================

/// A thread is identified by its `spawn` call site alone: threads forked at the same program point
/// across different iterations collapse into one abstract thread, which is what keeps the
/// concurrent extension's state space finite.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Tid(pub Exp);

/// An actor is identified by its `create` call site plus a bounded instance slot — the actor
/// extension's "N actors per creation site" policy (spec §4.7) is implemented by hashing distinct
/// runtime instances down into `0..n` slots at allocation time.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Pid(pub Exp, pub u8);

/// Number of distinct actor identities a single `create` site can produce; further concurrent
/// instances collapse onto one of these slots, keeping the actor extension's state space finite
/// (spec §4.7).
pub const PID_SLOTS: u8 = 8;

impl Pid {
    /// Allocates a pid for a `create` at `site`, slotted by a hash of the current timestamp so that
    /// distinct calling contexts spread across the bounded `0..PID_SLOTS` range instead of always
    /// colliding on slot zero.
    pub fn fresh(site: &Exp, t: &impl Hash) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        t.hash(&mut hasher);
        let slot = (hasher.finish() % PID_SLOTS as u64) as u8;
        Pid(site.clone(), slot)
    }
}
