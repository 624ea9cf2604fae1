use crate::ast::{Exp, Ident};
use crate::ids::Env;

// CONTINUATION FRAMES
// ================================================================================================

/// This language's suspended-computation frames. `V` is the abstract value type a particular
/// [`crate::semantics::LangSemantics`] instantiation is running with, `Time` its timestamp type —
/// both threaded through so a frame can hold partially-evaluated operand lists.
///
/// Kept deliberately small: the grammar's only non-atomic forms are `if`, `app`, `let`, `begin`,
/// `join` and `send`, so those are the only frames that exist. `letrec`/`spawn`/`create`/`become`
/// need no frame at all — see their `step_eval` arms in [`crate::semantics`] for why.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Frame<V, Time> {
    If {
        then: Exp,
        els: Exp,
        env: Env<Time>,
    },
    /// Operator evaluated, about to evaluate the (possibly empty) operand list.
    AppRator {
        call_exp: Exp,
        rands: Vec<Exp>,
        env: Env<Time>,
    },
    /// One more operand value arrived; `remaining` still needs evaluating before the call fires.
    AppRands {
        call_exp: Exp,
        f: V,
        evaluated: Vec<V>,
        remaining: Vec<Exp>,
        env: Env<Time>,
    },
    Let {
        var: Ident,
        body: Exp,
        env: Env<Time>,
    },
    Begin {
        remaining: Vec<Exp>,
        env: Env<Time>,
    },
    /// The value about to surface is the thread id to join on.
    Join,
    SendPid {
        message: String,
        args: Vec<Exp>,
        env: Env<Time>,
    },
    SendArgs {
        pid: V,
        message: String,
        evaluated: Vec<V>,
        remaining: Vec<Exp>,
        env: Env<Time>,
    },
}
