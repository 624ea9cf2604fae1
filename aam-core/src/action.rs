use crate::effect::Effect;
use crate::error::SemanticError;
use crate::semantics::{Addr, Env, Semantics, Sto};
use crate::value::AbstractValue;

// MESSAGE
// ================================================================================================

/// An abstract actor message: a name plus abstract argument values (spec §4.7). Mailboxes are
/// multisets of these.
pub struct Message<S: Semantics> {
    pub name: String,
    pub args: Vec<S::Value>,
}

impl<S: Semantics> Clone for Message<S> {
    fn clone(&self) -> Self {
        Message { name: self.name.clone(), args: self.args.clone() }
    }
}

impl<S: Semantics> core::fmt::Debug for Message<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Message").field("name", &self.name).field("args", &self.args).finish()
    }
}

impl<S: Semantics> PartialEq for Message<S> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args
    }
}

impl<S: Semantics> Eq for Message<S> {}

impl<S: Semantics> core::hash::Hash for Message<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.args.hash(state);
    }
}

// ACTION
// ================================================================================================

/// The effect a single step requests of the driver (spec §3). A closed tagged union: the contract
/// that "every possible step is handled by the driver" is pattern-match exhaustiveness over this
/// type (spec §9). `step_eval`/`step_kont`/`step_receive` return a *set* of these — modeled as
/// `Vec` since actions carry no total order and the driver only ever folds them, never
/// deduplicates them directly (duplicate successor states collapse at the `visited` set instead).
pub enum Action<S: Semantics> {
    ReachedValue {
        value: S::Value,
        store: Sto<S>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Push {
        frame: S::Frame,
        exp: S::Exp,
        env: Env<S>,
        store: Sto<S>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Eval {
        exp: S::Exp,
        env: Env<S>,
        store: Sto<S>,
        effects: Vec<Effect<Addr<S>>>,
    },
    StepIn {
        call_exp: S::Exp,
        closure: <S::Value as AbstractValue>::Closure,
        body: S::Exp,
        env: Env<S>,
        store: Sto<S>,
        args: Vec<S::Value>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Error {
        err: SemanticError,
        effects: Vec<Effect<Addr<S>>>,
    },
    Spawn {
        tid: <S::Value as AbstractValue>::Tid,
        exp: S::Exp,
        env: Env<S>,
        store: Sto<S>,
        continuation: Box<Action<S>>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Join {
        tid: <S::Value as AbstractValue>::Tid,
        store: Sto<S>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Send {
        pid: <S::Value as AbstractValue>::Pid,
        message: Message<S>,
        continuation: Box<Action<S>>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Create {
        pid: <S::Value as AbstractValue>::Pid,
        behavior: S::Exp,
        env: Env<S>,
        continuation: Box<Action<S>>,
        effects: Vec<Effect<Addr<S>>>,
    },
    Become {
        behavior: S::Exp,
        effects: Vec<Effect<Addr<S>>>,
    },
    Terminate {
        effects: Vec<Effect<Addr<S>>>,
    },
}

/// The set of actions a single `step_eval`/`step_kont`/`step_receive` call returns.
pub type ActionSet<S> = Vec<Action<S>>;

impl<S: Semantics> Action<S> {
    /// The effect fingerprint this action requests, used by the concurrent extension's race check
    /// (spec §4.6).
    pub fn effects(&self) -> &[Effect<Addr<S>>] {
        match self {
            Action::ReachedValue { effects, .. }
            | Action::Push { effects, .. }
            | Action::Eval { effects, .. }
            | Action::StepIn { effects, .. }
            | Action::Error { effects, .. }
            | Action::Spawn { effects, .. }
            | Action::Join { effects, .. }
            | Action::Send { effects, .. }
            | Action::Create { effects, .. }
            | Action::Become { effects, .. }
            | Action::Terminate { effects, .. } => effects,
        }
    }
}

impl<S: Semantics> Clone for Action<S> {
    fn clone(&self) -> Self {
        match self {
            Action::ReachedValue { value, store, effects } => Action::ReachedValue {
                value: value.clone(),
                store: store.clone(),
                effects: effects.clone(),
            },
            Action::Push { frame, exp, env, store, effects } => Action::Push {
                frame: frame.clone(),
                exp: exp.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: effects.clone(),
            },
            Action::Eval { exp, env, store, effects } => Action::Eval {
                exp: exp.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: effects.clone(),
            },
            Action::StepIn { call_exp, closure, body, env, store, args, effects } => {
                Action::StepIn {
                    call_exp: call_exp.clone(),
                    closure: closure.clone(),
                    body: body.clone(),
                    env: env.clone(),
                    store: store.clone(),
                    args: args.clone(),
                    effects: effects.clone(),
                }
            },
            Action::Error { err, effects } => {
                Action::Error { err: err.clone(), effects: effects.clone() }
            },
            Action::Spawn { tid, exp, env, store, continuation, effects } => Action::Spawn {
                tid: tid.clone(),
                exp: exp.clone(),
                env: env.clone(),
                store: store.clone(),
                continuation: continuation.clone(),
                effects: effects.clone(),
            },
            Action::Join { tid, store, effects } => {
                Action::Join { tid: tid.clone(), store: store.clone(), effects: effects.clone() }
            },
            Action::Send { pid, message, continuation, effects } => Action::Send {
                pid: pid.clone(),
                message: message.clone(),
                continuation: continuation.clone(),
                effects: effects.clone(),
            },
            Action::Create { pid, behavior, env, continuation, effects } => Action::Create {
                pid: pid.clone(),
                behavior: behavior.clone(),
                env: env.clone(),
                continuation: continuation.clone(),
                effects: effects.clone(),
            },
            Action::Become { behavior, effects } => {
                Action::Become { behavior: behavior.clone(), effects: effects.clone() }
            },
            Action::Terminate { effects } => Action::Terminate { effects: effects.clone() },
        }
    }
}

impl<S: Semantics> core::fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Action::ReachedValue { value, .. } => {
                f.debug_tuple("ReachedValue").field(value).finish()
            },
            Action::Push { frame, exp, .. } => {
                f.debug_tuple("Push").field(frame).field(exp).finish()
            },
            Action::Eval { exp, .. } => f.debug_tuple("Eval").field(exp).finish(),
            Action::StepIn { call_exp, .. } => f.debug_tuple("StepIn").field(call_exp).finish(),
            Action::Error { err, .. } => f.debug_tuple("Error").field(err).finish(),
            Action::Spawn { tid, .. } => f.debug_tuple("Spawn").field(tid).finish(),
            Action::Join { tid, .. } => f.debug_tuple("Join").field(tid).finish(),
            Action::Send { pid, message, .. } => {
                f.debug_tuple("Send").field(pid).field(&message.name).finish()
            },
            Action::Create { behavior, .. } => f.debug_tuple("Create").field(behavior).finish(),
            Action::Become { behavior, .. } => f.debug_tuple("Become").field(behavior).finish(),
            Action::Terminate { .. } => write!(f, "Terminate"),
        }
    }
}
