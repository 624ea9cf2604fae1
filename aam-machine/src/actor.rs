use aam_core::semantics::{Env, Sto};
use aam_core::{AbstractValue, Action, Control, Message, Semantics, TimestampPolicy};

use crate::kont::{KontPtr, KontStore};
use crate::step::{self, Components, Outcome, ThreadLocal, Tid};

// ACTOR EXTENSION
// ================================================================================================

/// An actor identity, spelled out once for the same reason `crate::step::Tid` is.
pub type Pid<S> = <<S as Semantics>::Value as AbstractValue>::Pid;

/// One actor's durable state (spec §4.7): the behavior literal it currently dispatches against, the
/// environment that behavior closes over, and its mailbox. The mailbox is a set-like lattice cell —
/// delivery is unordered and at-least-once — so `deliver` joins a message in rather than appending
/// it unconditionally; `task` is the in-flight computation for one dispatched clause body, `None`
/// while the actor is idle and eligible for the next dispatch.
#[derive(Clone)]
pub struct ActorLocal<S: Semantics> {
    pub behavior: S::Exp,
    pub env: Env<S>,
    pub mailbox: Vec<Message<S>>,
    pub task: Option<ThreadLocal<S>>,
}

impl<S: Semantics> ActorLocal<S> {
    pub fn idle(behavior: S::Exp, env: Env<S>) -> Self {
        ActorLocal { behavior, env, mailbox: Vec::new(), task: None }
    }

    pub fn deliver(&mut self, message: Message<S>) {
        if !self.mailbox.iter().any(|m| m == &message) {
            self.mailbox.push(message);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.task.is_none()
    }
}

impl<S: Semantics> PartialEq for ActorLocal<S> {
    fn eq(&self, other: &Self) -> bool {
        self.behavior == other.behavior
            && self.env == other.env
            && self.mailbox == other.mailbox
            && self.task == other.task
    }
}

impl<S: Semantics> Eq for ActorLocal<S> {}

impl<S: Semantics> core::hash::Hash for ActorLocal<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.behavior.hash(state);
        self.env.hash(state);
        self.mailbox.hash(state);
        self.task.hash(state);
    }
}

/// One `Send`/`Create`/`Become` effect the driver must apply against its actor table — folded out
/// of an [`Action`] the same way `crate::step::apply_action` folds `Push`/`Eval`/`StepIn`, except
/// these four variants are meaningless to the thread-only drivers (`crate::aam`,
/// `crate::global_store`) and so only this module interprets them.
pub enum ActorEffect<S: Semantics> {
    Send { pid: Pid<S>, message: Message<S> },
    Create { pid: Pid<S>, behavior: S::Exp, env: Env<S> },
    Become { behavior: S::Exp },
}

/// What applying one action against one running entity (a thread *or* an actor's dispatched task —
/// both are just a [`ThreadLocal`] plus shared store/kont-store/time, see `crate::step`) can
/// produce. A superset of `crate::step::Outcome` that also names the actor effects.
enum ActorStep<S: Semantics> {
    Next(Control<S::Exp, S::Value, Env<S>>, Components<S>),
    NewThread { tid: Tid<S>, control: Control<S::Exp, S::Value, Env<S>>, components: Components<S> },
    PendingJoin { tid: Tid<S>, components: Components<S> },
    Effect { effect: ActorEffect<S>, components: Components<S> },
    Terminate { components: Components<S> },
    Dead,
}

/// Applies one [`Action`] exactly like `crate::step::apply_action`, except `Send`/`Create`/
/// `Become`/`Terminate` are interpreted instead of treated as dead ends. `Send`/`Create` carry a
/// `continuation` (spec §4.7: "continue with `cont`"/"inject the PID value for the continuation"),
/// which is applied recursively the same way `crate::step::apply_action` recurses into `Spawn`'s
/// continuation.
fn apply_action<S, TP>(action: &Action<S>, comps: &Components<S>, tp: &TP) -> Vec<ActorStep<S>>
where
    S: Semantics,
    TP: TimestampPolicy<Exp = S::Exp, Time = S::Time>,
{
    match action {
        Action::Send { pid, message, continuation, .. } => {
            let mut out =
                vec![ActorStep::Effect { effect: ActorEffect::Send { pid: pid.clone(), message: message.clone() }, components: comps.clone() }];
            out.extend(apply_action(continuation, comps, tp));
            out
        },
        Action::Create { pid, behavior, env, continuation, .. } => {
            let mut out = vec![ActorStep::Effect {
                effect: ActorEffect::Create { pid: pid.clone(), behavior: behavior.clone(), env: env.clone() },
                components: comps.clone(),
            }];
            out.extend(apply_action(continuation, comps, tp));
            out
        },
        Action::Become { behavior, .. } => {
            vec![ActorStep::Effect { effect: ActorEffect::Become { behavior: behavior.clone() }, components: comps.clone() }]
        },
        Action::Terminate { .. } => vec![ActorStep::Terminate { components: comps.clone() }],
        _ => step::apply_action(action, comps, tp)
            .into_iter()
            .map(|outcome| match outcome {
                Outcome::Next(control, c) => ActorStep::Next(control, c),
                Outcome::NewThread { tid, control, components } => ActorStep::NewThread { tid, control, components },
                Outcome::PendingJoin { tid, components } => ActorStep::PendingJoin { tid, components },
                Outcome::Dead => ActorStep::Dead,
            })
            .collect(),
    }
}

/// What stepping one entity (thread or actor task) for a single driver round yields: the same shape
/// as `crate::step::ThreadOutcome`, plus an actor `Effect` and a `Terminate`. `Effect.local` is
/// `None` for `Become` (spec: "next `stepReceive` uses the new behavior" — the task that issued
/// `become` ends there) and `Some` for `Send`/`Create` (the acting entity keeps running its own
/// continuation after the effect).
pub enum EntityOutcome<S: Semantics> {
    Advance { local: ThreadLocal<S>, store: Sto<S>, konts: KontStore<S::Exp, S::Frame>, time: S::Time },
    Spawn {
        new_tid: Tid<S>,
        new_thread: ThreadLocal<S>,
        local: ThreadLocal<S>,
        store: Sto<S>,
        konts: KontStore<S::Exp, S::Frame>,
        time: S::Time,
    },
    JoinRequest {
        target: Tid<S>,
        resume_kptr: KontPtr<S::Exp>,
        store: Sto<S>,
        konts: KontStore<S::Exp, S::Frame>,
        time: S::Time,
    },
    Effect {
        effect: ActorEffect<S>,
        local: Option<ThreadLocal<S>>,
        store: Sto<S>,
        konts: KontStore<S::Exp, S::Frame>,
        time: S::Time,
    },
    Terminate { store: Sto<S>, konts: KontStore<S::Exp, S::Frame>, time: S::Time },
    Dead,
}

/// Steps one entity (a thread or an actor's dispatched task) against shared store/kont-store/time,
/// yielding one [`EntityOutcome`] per alternative action the acting `Control` can take. Used by
/// `crate::free`'s driver for both its thread pool and its actor tasks — the two have identical
/// stepping mechanics, differing only in how the driver folds the result back into `FreeState`.
pub fn step_entity<S, TP>(
    semantics: &S,
    local: &ThreadLocal<S>,
    store: &Sto<S>,
    konts: &KontStore<S::Exp, S::Frame>,
    time: &S::Time,
    tp: &TP,
) -> Vec<EntityOutcome<S>>
where
    S: Semantics,
    TP: TimestampPolicy<Exp = S::Exp, Time = S::Time>,
{
    if local.is_terminal() {
        return Vec::new();
    }
    let mut results = Vec::new();
    match &local.control {
        Control::Eval(e, env) => {
            let actions = semantics.step_eval(e, env, store, time);
            let comps =
                Components { store: store.clone(), konts: konts.clone(), kptr: local.kptr.clone(), time: time.clone() };
            for action in &actions {
                results.push(fold_entity_step(apply_action(action, &comps, tp)));
            }
        },
        Control::Kont(v) => {
            if let KontPtr::At(addr) = &local.kptr {
                for (frame, tail) in konts.lookup(addr) {
                    let actions = semantics.step_kont(v, frame, store, time);
                    let comps =
                        Components { store: store.clone(), konts: konts.clone(), kptr: tail.clone(), time: time.clone() };
                    for action in &actions {
                        results.push(fold_entity_step(apply_action(action, &comps, tp)));
                    }
                }
            }
        },
    }
    results
}

/// Dispatches an idle actor's behavior against one mailbox message (spec §4.7 "joined over all
/// mailbox elements" — the caller loops this over every message the mailbox may hold). Wraps
/// `Semantics::step_receive` the same way `step_entity` wraps `step_eval`/`step_kont`: the returned
/// action set becomes a branch per alternative, each folded the same way.
pub fn dispatch_message<S, TP>(
    semantics: &S,
    self_pid: &Pid<S>,
    message: &Message<S>,
    actor: &ActorLocal<S>,
    store: &Sto<S>,
    konts: &KontStore<S::Exp, S::Frame>,
    time: &S::Time,
    tp: &TP,
) -> Vec<EntityOutcome<S>>
where
    S: Semantics,
    TP: TimestampPolicy<Exp = S::Exp, Time = S::Time>,
{
    let actions =
        semantics.step_receive(self_pid, &message.name, &message.args, &actor.behavior, &actor.env, store, time);
    let comps = Components { store: store.clone(), konts: konts.clone(), kptr: KontPtr::Halt, time: time.clone() };
    actions.iter().map(|action| fold_entity_step(apply_action(action, &comps, tp))).collect()
}

/// Folds every [`ActorStep`] one action produced into a single [`EntityOutcome`]. A single action
/// can produce more than one `ActorStep` only for `Send`/`Create` (the effect itself, plus the
/// recursively-applied continuation) — these are parts of one combined transition, not alternative
/// branches, exactly as `crate::step::action_to_thread_outcome` assumes for `Spawn`.
fn fold_entity_step<S: Semantics>(parts: Vec<ActorStep<S>>) -> EntityOutcome<S> {
    let mut advanced = None;
    let mut spawned = None;
    let mut blocked = None;
    let mut effect = None;
    let mut terminated = false;
    let mut store = None;
    let mut konts = None;
    let mut time = None;

    for part in parts {
        match part {
            ActorStep::Next(control, c) => {
                store = Some(c.store.clone());
                konts = Some(c.konts.clone());
                time = Some(c.time.clone());
                advanced = Some(ThreadLocal { control, kptr: c.kptr });
            },
            ActorStep::NewThread { tid, control, components } => {
                store = Some(match store {
                    Some(s) => components.store.join(&s),
                    None => components.store.clone(),
                });
                konts = Some(match konts {
                    Some(k) => components.konts.join(&k),
                    None => components.konts.clone(),
                });
                spawned = Some((tid, ThreadLocal { control, kptr: components.kptr }));
            },
            ActorStep::PendingJoin { tid, components } => {
                store = Some(components.store.clone());
                konts = Some(components.konts.clone());
                time = Some(components.time.clone());
                blocked = Some((tid, components.kptr));
            },
            ActorStep::Effect { effect: e, components } => {
                store = Some(components.store.clone());
                konts = Some(components.konts.clone());
                time = Some(components.time.clone());
                effect = Some(e);
            },
            ActorStep::Terminate { components } => {
                store = Some(components.store.clone());
                konts = Some(components.konts.clone());
                time = Some(components.time.clone());
                terminated = true;
            },
            ActorStep::Dead => {},
        }
    }

    let (Some(store), Some(konts), Some(time)) = (store, konts, time) else {
        return EntityOutcome::Dead;
    };

    if terminated {
        return EntityOutcome::Terminate { store, konts, time };
    }
    if let Some((target, resume_kptr)) = blocked {
        return EntityOutcome::JoinRequest { target, resume_kptr, store, konts, time };
    }
    if let Some(effect) = effect {
        return EntityOutcome::Effect { effect, local: advanced, store, konts, time };
    }
    match (advanced, spawned) {
        (Some(local), Some((new_tid, new_thread))) => {
            EntityOutcome::Spawn { new_tid, new_thread, local, store, konts, time }
        },
        (Some(local), None) => EntityOutcome::Advance { local, store, konts, time },
        (None, _) => EntityOutcome::Dead,
    }
}
