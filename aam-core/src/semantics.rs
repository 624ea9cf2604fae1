use core::fmt::Debug;
use core::hash::Hash;

use crate::action::{Action, ActionSet};
use crate::env::Environment;
use crate::error::SemanticError;
use crate::frame::Frame;
use crate::store::Store;
use crate::timestamp::Timestamp;
use crate::value::AbstractValue;

/// Address type of a semantics' value lattice, spelled out once so call sites don't have to write
/// `<<S::Value as AbstractValue>::Addr>` everywhere.
pub type Addr<S> = <<S as Semantics>::Value as AbstractValue>::Addr;
pub type Env<S> = Environment<<S as Semantics>::Ident, Addr<S>>;
pub type Sto<S> = Store<Addr<S>, <S as Semantics>::Value>;

// SEMANTICS
// ================================================================================================

/// The language plug-in contract (spec §4.4): `Semantics[E, V, A, T]`. Given `(e, ρ, σ, t)`
/// produces a *set* of actions — non-determinism is first class, so every possible branch of a
/// source-language construct (e.g. `(if cond t e)` when `cond` may be both true and false in the
/// lattice) is returned as a separate action rather than chosen eagerly.
pub trait Semantics: Clone {
    type Exp: Clone + Eq + Hash + Debug;
    type Ident: Clone + Eq + Ord + Hash + Debug;
    type Value: AbstractValue;
    type Time: Timestamp;
    type Frame: Frame;

    /// "About to evaluate `e`."
    fn step_eval(&self, e: &Self::Exp, env: &Env<Self>, store: &Sto<Self>, t: &Self::Time) -> ActionSet<Self>;

    /// "Value `v` has surfaced, top frame is `frame`."
    fn step_kont(
        &self,
        v: &Self::Value,
        frame: &Self::Frame,
        store: &Sto<Self>,
        t: &Self::Time,
    ) -> ActionSet<Self>;

    /// Actor message dispatch (spec §4.4, §4.7). The default raises `MessageNotSupported`, which is
    /// the behavior the spec calls out as WIP upstream and asks implementers to complete: dispatch
    /// by message name, with an arity check against `args`.
    #[allow(unused_variables)]
    fn step_receive(
        &self,
        self_pid: &<Self::Value as AbstractValue>::Pid,
        message: &str,
        args: &[Self::Value],
        behavior: &Self::Exp,
        env: &Env<Self>,
        store: &Sto<Self>,
        t: &Self::Time,
    ) -> ActionSet<Self> {
        vec![Action::Error {
            err: SemanticError::MessageNotSupported(message.to_string()),
            effects: Vec::new(),
        }]
    }

    /// The program's entry expression, wrapped in an empty environment by the machine.
    fn initial_exp(&self, program: &Self::Exp) -> Self::Exp {
        program.clone()
    }
}
