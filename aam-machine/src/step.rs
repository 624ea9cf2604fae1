use aam_core::semantics::{Env, Sto};
use aam_core::{AbstractValue, Action, Control, Semantics, TimestampPolicy};

use crate::kont::{KontAddr, KontPtr, KontStore};

// STEP APPLICATION
// ================================================================================================

/// The thread/actor-agnostic pieces of a state besides control: the store, the continuation
/// store, the pointer to the top continuation frame, and the timestamp. Every sequential machine
/// variant in this crate threads these four together identically; what differs between variants is
/// only whether `store`/`konts` live embedded per-state ([`crate::aam`]) or lifted to a value the
/// driver owns once for the whole run ([`crate::global_store`], [`crate::free`]).
#[derive(Clone)]
pub struct Components<S: Semantics> {
    pub store: Sto<S>,
    pub konts: KontStore<S::Exp, S::Frame>,
    pub kptr: KontPtr<S::Exp>,
    pub time: S::Time,
}

impl<S: Semantics> Components<S> {
    pub fn initial(store: Sto<S>, time: S::Time) -> Self {
        Components { store, konts: KontStore::empty(), kptr: KontPtr::Halt, time }
    }
}

// Hand-written rather than derived: `#[derive(PartialEq, Eq, Hash)]` would add a blanket `S:
// PartialEq`/`Eq`/`Hash` bound on the machine parameter itself (derive only looks at which type
// parameters appear in field types, not through associated types), which `Semantics` never
// promises. Each field already carries the comparison the spec asks for (store equality, the
// kont-store's set-style equality, the kont pointer, the timestamp), so this just threads them
// through by hand.
impl<S: Semantics> PartialEq for Components<S> {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
            && self.konts == other.konts
            && self.kptr == other.kptr
            && self.time == other.time
    }
}

impl<S: Semantics> Eq for Components<S> {}

impl<S: Semantics> core::hash::Hash for Components<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.store.hash(state);
        self.konts.hash(state);
        self.kptr.hash(state);
        self.time.hash(state);
    }
}

pub type Tid<S> = <<S as Semantics>::Value as AbstractValue>::Tid;

/// What applying one [`Action`] to one set of [`Components`] produces. A single action can yield
/// more than one outcome — `Spawn`/`Send` bundle "start a new thread/deliver a message" together
/// with "the spawning/sending thread's own continuation" (spec §4.6, §4.7) — so
/// [`apply_action`] returns a `Vec`.
pub enum Outcome<S: Semantics> {
    /// An ordinary same-thread successor.
    Next(Control<S::Exp, S::Value, Env<S>>, Components<S>),
    /// `spawn` produced a new thread's root state, addressed by the `Tid` the semantics minted.
    NewThread { tid: Tid<S>, control: Control<S::Exp, S::Value, Env<S>>, components: Components<S> },
    /// `join` is blocked: no result recorded yet for `tid`. The driver parks `components` until a
    /// thread result for `tid` is recorded, then resumes with `Control::Kont(result)`.
    PendingJoin { tid: Tid<S>, components: Components<S> },
    /// A semantic error, or an actor operation this variant doesn't interpret (§4.7 is Free's
    /// extension only — see `DESIGN.md`): a dead end, no successors.
    Dead,
}

/// Applies one [`Action`] against the current [`Components`], advancing the timestamp per spec §9
/// ("a `Semantics` impl never ticks its own clock — that's the driver's job"): `Eval`/`Push` tick
/// against the expression about to be evaluated, `StepIn` ticks (and optionally extends) the call
/// string against the call site, and actions with no expression of their own (`ReachedValue`,
/// `Error`, `Join`, actor ops) leave the clock where it was.
pub fn apply_action<S, TP>(action: &Action<S>, comps: &Components<S>, tp: &TP) -> Vec<Outcome<S>>
where
    S: Semantics,
    TP: TimestampPolicy<Exp = S::Exp, Time = S::Time>,
{
    match action {
        Action::ReachedValue { value, store, .. } => {
            let next = Components { store: store.clone(), ..comps.clone() };
            vec![Outcome::Next(Control::Kont(value.clone()), next)]
        },
        Action::Push { frame, exp, env, store, .. } => {
            let addr = KontAddr(exp.clone());
            let konts = comps.konts.push(addr.clone(), frame.clone(), comps.kptr.clone());
            let time = tp.tick(&comps.time, exp);
            tracing::trace!(from = ?comps.time, to = ?time, exp = ?exp, "tick (push)");
            let next = Components { store: store.clone(), konts, kptr: KontPtr::At(addr), time };
            vec![Outcome::Next(Control::Eval(exp.clone(), env.clone()), next)]
        },
        Action::Eval { exp, env, store, .. } => {
            let time = tp.tick(&comps.time, exp);
            tracing::trace!(from = ?comps.time, to = ?time, exp = ?exp, "tick (eval)");
            let next = Components { store: store.clone(), time, ..comps.clone() };
            vec![Outcome::Next(Control::Eval(exp.clone(), env.clone()), next)]
        },
        Action::StepIn { call_exp, body, env, store, .. } => {
            let time = tp.tick_call(&comps.time, body, call_exp);
            tracing::trace!(from = ?comps.time, to = ?time, call_exp = ?call_exp, "tick (step-in)");
            let next = Components { store: store.clone(), time, ..comps.clone() };
            vec![Outcome::Next(Control::Eval(body.clone(), env.clone()), next)]
        },
        Action::Error { .. } => vec![Outcome::Dead],
        Action::Spawn { tid, exp, env, store, continuation, .. } => {
            let time = tp.tick(&comps.time, exp);
            let root_components = Components::initial(store.clone(), time);
            let mut out = vec![Outcome::NewThread {
                tid: tid.clone(),
                control: Control::Eval(exp.clone(), env.clone()),
                components: root_components,
            }];
            out.extend(apply_action(continuation, comps, tp));
            out
        },
        Action::Join { tid, store, .. } => {
            let next = Components { store: store.clone(), ..comps.clone() };
            vec![Outcome::PendingJoin { tid: tid.clone(), components: next }]
        },
        // Actor operations are Free's extension (`crate::actor`); the plain sequential variants
        // treat them as unsupported rather than silently dropping the effect.
        Action::Send { .. } | Action::Create { .. } | Action::Become { .. } | Action::Terminate { .. } => {
            vec![Outcome::Dead]
        },
    }
}

// THREAD-LOCAL CONTROL
// ================================================================================================

/// A thread's own slice of a combined state: everything that does *not* get shared with its
/// siblings. `store`/`konts`/`time` are shared by every thread in a configuration (spec §4.6 "all
/// threads in a configuration share one store"), so they live at the driver/variant level instead
/// of here — see `crate::aam`, `crate::global_store`, `crate::free` for where each variant keeps
/// them.
#[derive(Clone)]
pub struct ThreadLocal<S: Semantics> {
    pub control: Control<S::Exp, S::Value, Env<S>>,
    pub kptr: KontPtr<S::Exp>,
}

impl<S: Semantics> ThreadLocal<S> {
    pub fn root(control: Control<S::Exp, S::Value, Env<S>>) -> Self {
        ThreadLocal { control, kptr: KontPtr::Halt }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.control, Control::Kont(_)) && self.kptr.is_halt()
    }

    pub fn final_value(&self) -> Option<&S::Value> {
        match &self.control {
            Control::Kont(v) if self.kptr.is_halt() => Some(v),
            _ => None,
        }
    }
}

// Hand-written for the same reason as `Components`'s impls above: the derive macro would add a
// spurious `S: PartialEq`/`Eq`/`Hash`/`Clone` bound.
impl<S: Semantics> PartialEq for ThreadLocal<S> {
    fn eq(&self, other: &Self) -> bool {
        self.control == other.control && self.kptr == other.kptr
    }
}

impl<S: Semantics> Eq for ThreadLocal<S> {}

impl<S: Semantics> core::hash::Hash for ThreadLocal<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.control.hash(state);
        self.kptr.hash(state);
    }
}

/// Keys the thread pool by `Tid`, with `None` standing for the program's original, un-spawned
/// thread (spec §4.6 only assigns `Tid`s to `spawn`ed threads — the entry thread never gets one,
/// but it still needs a slot in the pool so the driver loop can treat every thread uniformly).
pub type TidKey<S> = Option<Tid<S>>;

/// What stepping one thread (in isolation from its siblings) can produce. A thin reshaping of
/// [`Outcome`] for the thread-pool drivers: `Advance`/`Spawn`/`Dead` mirror `Outcome::Next`/
/// `NewThread`/`Dead` one-for-one, while a `Join` is split into a request the *driver* resolves
/// (`JoinRequest`) because only the driver can see whether the target thread's pool slot is
/// halted — `step_one` only sees the acting thread.
pub enum ThreadOutcome<S: Semantics> {
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
    Dead,
}

/// Steps one thread's [`ThreadLocal`] against the store/kont-store/time a variant's driver hands
/// it, yielding one [`ThreadOutcome`] per alternative action (spec §4.4's non-determinism: each
/// element of the `ActionSet` a `Semantics` returns is an independent branch, so each becomes its
/// own successor). Every variant driver (`crate::aam`, `crate::global_store`, `crate::free`) calls
/// this the same way; they differ only in where `store`/`konts` physically live between calls.
#[tracing::instrument(level = "debug", skip_all, fields(time = ?time))]
pub fn step_one<S, TP>(
    semantics: &S,
    local: &ThreadLocal<S>,
    store: &Sto<S>,
    konts: &KontStore<S::Exp, S::Frame>,
    time: &S::Time,
    tp: &TP,
) -> Vec<ThreadOutcome<S>>
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
            tracing::trace!(exp = ?e, "step (eval)");
            let actions = semantics.step_eval(e, env, store, time);
            let comps = Components {
                store: store.clone(),
                konts: konts.clone(),
                kptr: local.kptr.clone(),
                time: time.clone(),
            };
            for action in &actions {
                results.push(action_to_thread_outcome(action, &comps, tp));
            }
        },
        Control::Kont(v) => {
            if let KontPtr::At(addr) = &local.kptr {
                tracing::trace!(addr = ?addr, "step (kont)");
                for (frame, tail) in konts.lookup(addr) {
                    let actions = semantics.step_kont(v, frame, store, time);
                    let comps = Components {
                        store: store.clone(),
                        konts: konts.clone(),
                        kptr: tail.clone(),
                        time: time.clone(),
                    };
                    for action in &actions {
                        results.push(action_to_thread_outcome(action, &comps, tp));
                    }
                }
            }
        },
    }
    tracing::debug!(successors = results.len(), "stepped");
    results
}

fn action_to_thread_outcome<S, TP>(action: &Action<S>, comps: &Components<S>, tp: &TP) -> ThreadOutcome<S>
where
    S: Semantics,
    TP: TimestampPolicy<Exp = S::Exp, Time = S::Time>,
{
    let outcomes = apply_action(action, comps, tp);
    let mut advanced = None;
    let mut spawned = None;
    let mut blocked = None;
    let mut store = comps.store.clone();
    let mut konts = comps.konts.clone();
    let mut time = comps.time.clone();

    for outcome in outcomes {
        match outcome {
            Outcome::Next(control, c) => {
                store = c.store;
                konts = c.konts;
                time = c.time.clone();
                advanced = Some(ThreadLocal { control, kptr: c.kptr });
            },
            Outcome::NewThread { tid, control, components } => {
                store = store.join(&components.store);
                konts = konts.join(&components.konts);
                spawned = Some((tid, ThreadLocal { control, kptr: components.kptr }));
            },
            Outcome::PendingJoin { tid, components } => {
                store = components.store;
                konts = components.konts;
                time = components.time;
                blocked = Some((tid, components.kptr));
            },
            Outcome::Dead => {},
        }
    }

    if let Some((target, resume_kptr)) = blocked {
        return ThreadOutcome::JoinRequest { target, resume_kptr, store, konts, time };
    }
    match (advanced, spawned) {
        (Some(local), Some((new_tid, new_thread))) => {
            ThreadOutcome::Spawn { new_tid, new_thread, local, store, konts, time }
        },
        (Some(local), None) => ThreadOutcome::Advance { local, store, konts, time },
        (None, _) => ThreadOutcome::Dead,
    }
}

#[cfg(test)]
mod tests {
    use aam_core::{ClassicalAddress, ConcreteTime, ConcreteTimestampPolicy, Store};
    use aam_lang::{exp, Env, ExpKind, Lit, LangAddr};
    use aam_lattices::Concrete;

    use super::*;

    type V = Concrete<
        LangAddr<ConcreteTime>,
        aam_lang::Closure<ConcreteTime>,
        aam_lang::PrimOp,
        aam_lang::Tid,
        aam_lang::Pid,
    >;
    type Policy = ConcreteTimestampPolicy<aam_lang::Exp>;

    #[test]
    fn eval_action_advances_time_and_preserves_store() {
        let policy = Policy::new();
        let store: Store<LangAddr<ConcreteTime>, V> = Store::empty();
        let comps = Components::<TestSemantics>::initial(store, ConcreteTime::zero());
        let target = exp(ExpKind::Lit(Lit::Nil));
        let action = Action::Eval {
            exp: target.clone(),
            env: Env::empty(),
            store: comps.store.clone(),
            effects: Vec::new(),
        };
        let outcomes = apply_action(&action, &comps, &policy);
        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            Outcome::Next(Control::Eval(e, _), next) => {
                assert_eq!(e, &target);
                assert_ne!(next.time, comps.time);
            },
            _ => panic!("expected Eval outcome"),
        }
    }

    // A minimal stand-in `Semantics` so this module's tests don't need a full language plug-in.
    #[derive(Clone)]
    struct TestSemantics;

    impl Semantics for TestSemantics {
        type Exp = aam_lang::Exp;
        type Ident = aam_lang::Ident;
        type Value = V;
        type Time = ConcreteTime;
        type Frame = aam_lang::Frame<V, ConcreteTime>;

        fn step_eval(
            &self,
            _e: &Self::Exp,
            _env: &Env<ConcreteTime>,
            _store: &aam_core::Store<LangAddr<ConcreteTime>, V>,
            _t: &Self::Time,
        ) -> aam_core::ActionSet<Self> {
            Vec::new()
        }

        fn step_kont(
            &self,
            _v: &V,
            _frame: &Self::Frame,
            _store: &aam_core::Store<LangAddr<ConcreteTime>, V>,
            _t: &Self::Time,
        ) -> aam_core::ActionSet<Self> {
            Vec::new()
        }
    }

    #[allow(dead_code)]
    fn unused_classical_address_reference() -> ClassicalAddress<aam_lang::Ident, aam_lang::Exp, ConcreteTime> {
        ClassicalAddress::new()
    }
}
