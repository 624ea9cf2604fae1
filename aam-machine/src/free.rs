use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use aam_core::semantics::{Env, Sto};
use aam_core::{AbstractValue, Control, Semantics, TimestampPolicy};

use crate::aam::RunConfig;
use crate::actor::{dispatch_message, step_entity, ActorEffect, ActorLocal, EntityOutcome, Pid};
use crate::graph;
use crate::kont::KontStore;
use crate::queue::WorkQueue;
use crate::result::AnalysisResult;
use crate::step::{ThreadLocal, TidKey};

// FREE: GLOBAL VALUE STORE + GLOBAL CONTINUATION STORE + ACTOR SYSTEM
// ================================================================================================

/// The Free machine (spec §4.5): both the value store and the continuation store are lifted out of
/// `State` entirely — unlike `crate::global_store`, which only lifts the value store and keeps the
/// continuation store embedded. A combined state is just `(threads, actors, t)`; `crate::aam::
/// RunConfig` drives it the same way every other variant is driven. Because continuations at the
/// same `KontAddr` are joined globally here, this is the variant the spec calls out as "exploring an
/// over-approximation of the call graph" (§4.5) — recursive continuations collapse to a fixed point
/// rather than growing per-state as they would under `crate::aam`.
#[derive(Clone)]
pub struct FreeState<S: Semantics> {
    pub threads: BTreeMap<TidKey<S>, ThreadLocal<S>>,
    pub actors: BTreeMap<Pid<S>, ActorLocal<S>>,
    pub time: S::Time,
}

impl<S: Semantics> PartialEq for FreeState<S> {
    fn eq(&self, other: &Self) -> bool {
        self.threads == other.threads && self.actors == other.actors && self.time == other.time
    }
}

impl<S: Semantics> Eq for FreeState<S> {}

impl<S: Semantics> core::hash::Hash for FreeState<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.threads.hash(state);
        self.actors.hash(state);
        self.time.hash(state);
    }
}

/// Which running entity a folded [`EntityOutcome`] belongs to: the original thread pool (keyed the
/// same way `crate::aam`/`crate::global_store` key it) or one actor's dispatched task, addressed by
/// its `Pid`. An idle actor about to dispatch a mailbox message is also addressed as `ActorTask`
/// (spec §4.7: "joined over all mailbox elements" — dispatching installs the clause body as that
/// actor's task, exactly like stepping an already-running one).
#[derive(Clone)]
enum Slot<S: Semantics> {
    Thread(TidKey<S>),
    ActorTask(Pid<S>),
}

/// Runs the Free variant to a fixpoint (or until `config.deadline` elapses). Follows the same
/// store-widening discipline as `crate::global_store::explore`, extended to the continuation store:
/// whenever either global structure grows beyond what a previously-visited state saw, every visited
/// state is pushed back onto the frontier (§4.5/§5 "reprocessed iff the new global store properly
/// exceeds the store seen when the state was last expanded").
pub fn explore<S, TP>(
    program: &S::Exp,
    semantics: &S,
    time_policy: &TP,
    initial_env: Env<S>,
    initial_store: Sto<S>,
    config: &RunConfig,
) -> (AnalysisResult<S::Value>, Option<graph::StateGraph>)
where
    S: Semantics,
    TP: TimestampPolicy<Exp = S::Exp, Time = S::Time>,
{
    let start = Instant::now();
    let mut result = AnalysisResult::empty();
    let mut graph = config.record_graph.then(graph::StateGraph::new);

    let mut global_store = initial_store;
    let mut global_konts: KontStore<S::Exp, S::Frame> = KontStore::empty();

    let mut threads = BTreeMap::new();
    threads.insert(None, ThreadLocal::root(Control::Eval(semantics.initial_exp(program), initial_env)));
    let initial: FreeState<S> = FreeState { threads, actors: BTreeMap::new(), time: S::Time::zero() };

    let mut work = WorkQueue::new(config.strategy);
    let mut seen: HashSet<FreeState<S>> = HashSet::new();
    let initial_id = graph::node_id(&initial);
    if let Some(g) = graph.as_mut() {
        g.label(initial_id, "initial");
    }
    work.push(initial);

    let mut timed_out = false;
    while let Some(state) = work.pop() {
        if let Some(deadline) = config.deadline {
            if start.elapsed() > deadline {
                timed_out = true;
                break;
            }
        }
        let state_id = graph::node_id(&state);
        if seen.contains(&state) {
            continue;
        }
        seen.insert(state.clone());
        result.number_of_states += 1;

        if let Some(local) = state.threads.get(&None) {
            if let Some(value) = local.final_value() {
                result.record(value.clone());
                if let Some(g) = graph.as_mut() {
                    g.mark_halted(state_id);
                }
            }
        }

        let mut widened = false;

        for (tid_key, local) in state.threads.iter() {
            if local.is_terminal() {
                continue;
            }
            for outcome in
                step_entity(semantics, local, &global_store, &global_konts, &state.time, time_policy)
            {
                let (next, grew) = apply_entity_outcome(
                    &state,
                    Slot::Thread(tid_key.clone()),
                    outcome,
                    &mut global_store,
                    &mut global_konts,
                );
                widened |= grew;
                if let Some(next) = next {
                    enqueue(&mut work, &mut graph, state_id, next);
                }
            }
        }

        for (pid, actor) in state.actors.iter() {
            if let Some(task) = &actor.task {
                if task.is_terminal() {
                    let mut next = state.clone();
                    next.actors.get_mut(pid).expect("iterating state.actors").task = None;
                    enqueue(&mut work, &mut graph, state_id, next);
                    continue;
                }
                for outcome in
                    step_entity(semantics, task, &global_store, &global_konts, &state.time, time_policy)
                {
                    let (next, grew) = apply_entity_outcome(
                        &state,
                        Slot::ActorTask(pid.clone()),
                        outcome,
                        &mut global_store,
                        &mut global_konts,
                    );
                    widened |= grew;
                    if let Some(next) = next {
                        enqueue(&mut work, &mut graph, state_id, next);
                    }
                }
            } else {
                for message in &actor.mailbox {
                    for outcome in dispatch_message(
                        semantics,
                        pid,
                        message,
                        actor,
                        &global_store,
                        &global_konts,
                        &state.time,
                        time_policy,
                    ) {
                        let (next, grew) = apply_entity_outcome(
                            &state,
                            Slot::ActorTask(pid.clone()),
                            outcome,
                            &mut global_store,
                            &mut global_konts,
                        );
                        widened |= grew;
                        if let Some(next) = next {
                            enqueue(&mut work, &mut graph, state_id, next);
                        }
                    }
                }
            }
        }

        if widened {
            let stale: Vec<FreeState<S>> = seen.drain().collect();
            tracing::debug!(
                reenqueued = stale.len(),
                "global store/kont-store widened, re-enqueuing seen states"
            );
            work.extend(stale);
        }
    }

    result.time = start.elapsed();
    result.timed_out = timed_out;
    (result, graph)
}

/// Folds one [`EntityOutcome`] into a successor [`FreeState`], joining any store/kont-store growth
/// into the two global structures the driver owns for the whole run (spec §4.5). Returns `(None,
/// grew)` when the outcome yields no successor this round — a blocked join whose target hasn't
/// finished, or a malformed `become` issued outside an actor task — while the store/kont-store
/// growth it still carries (if any) is always applied, matching `crate::global_store`'s rule that a
/// dead branch can still grow the store before dying.
fn apply_entity_outcome<S: Semantics>(
    state: &FreeState<S>,
    slot: Slot<S>,
    outcome: EntityOutcome<S>,
    global_store: &mut Sto<S>,
    global_konts: &mut KontStore<S::Exp, S::Frame>,
) -> (Option<FreeState<S>>, bool) {
    match outcome {
        EntityOutcome::Advance { local, store, konts, time } => {
            let grew = join_store(global_store, &store) | join_konts(global_konts, &konts);
            let mut next = state.clone();
            next.time = time;
            install(&mut next, &slot, local);
            (Some(next), grew)
        },
        EntityOutcome::Spawn { new_tid, new_thread, local, store, konts, time } => {
            let grew = join_store(global_store, &store) | join_konts(global_konts, &konts);
            let mut next = state.clone();
            next.time = time;
            install(&mut next, &slot, local);
            next.threads.insert(Some(new_tid), new_thread);
            (Some(next), grew)
        },
        EntityOutcome::JoinRequest { target, resume_kptr, store, konts, time } => {
            let grew = join_store(global_store, &store) | join_konts(global_konts, &konts);
            let Some(target_local) = state.threads.get(&Some(target)) else {
                return (None, grew);
            };
            let Some(value) = target_local.final_value() else {
                return (None, grew);
            };
            let mut next = state.clone();
            next.time = time;
            install(&mut next, &slot, ThreadLocal { control: Control::Kont(value.clone()), kptr: resume_kptr });
            (Some(next), grew)
        },
        EntityOutcome::Effect { effect, local, store, konts, time } => {
            let grew = join_store(global_store, &store) | join_konts(global_konts, &konts);
            let mut next = state.clone();
            next.time = time;
            apply_actor_effect(&mut next, effect);
            match local {
                Some(local) => {
                    install(&mut next, &slot, local);
                    (Some(next), grew)
                },
                None => match &slot {
                    // `become` ends the task that issued it (spec §4.7: "next `stepReceive` uses
                    // the new behavior"); the actor returns to idle, eligible for its next message.
                    Slot::ActorTask(pid) => {
                        if let Some(a) = next.actors.get_mut(pid) {
                            a.task = None;
                        }
                        (Some(next), grew)
                    },
                    // A top-level thread issuing `become` outside any actor task has nothing to
                    // resume into; the branch dies, but the store/kont growth it carried still
                    // lands in the global structures above.
                    Slot::Thread(_) => (None, grew),
                },
            }
        },
        EntityOutcome::Terminate { store, konts, time } => {
            let grew = join_store(global_store, &store) | join_konts(global_konts, &konts);
            let mut next = state.clone();
            next.time = time;
            if let Slot::ActorTask(pid) = &slot {
                next.actors.remove(pid);
            }
            (Some(next), grew)
        },
        EntityOutcome::Dead => (None, false),
    }
}

/// Installs a stepped entity's new [`ThreadLocal`] back into the slot it came from: the thread pool
/// for an ordinary thread, or the dispatched task of the actor it belongs to.
fn install<S: Semantics>(state: &mut FreeState<S>, slot: &Slot<S>, local: ThreadLocal<S>) {
    match slot {
        Slot::Thread(key) => {
            state.threads.insert(key.clone(), local);
        },
        Slot::ActorTask(pid) => {
            // The slot is only ever minted for a `pid` already present in `state.actors` — either
            // an in-flight task being re-stepped, or an idle actor about to dispatch a message — so
            // this always finds an entry to install the new task into.
            if let Some(actor) = state.actors.get_mut(pid) {
                actor.task = Some(local);
            }
        },
    }
}

/// Applies one `Send`/`Create`/`Become` effect against the actor table (spec §4.7). `Become` is
/// handled by the caller, since it needs to know which slot issued it; this covers the two effects
/// that are self-contained.
fn apply_actor_effect<S: Semantics>(state: &mut FreeState<S>, effect: ActorEffect<S>) {
    match effect {
        ActorEffect::Send { pid, message } => {
            if let Some(actor) = state.actors.get_mut(&pid) {
                actor.deliver(message);
            }
            // A send to a pid this branch has not (yet) observed a `create` for is dropped rather
            // than invented out of thin air; another interleaving that runs `create` first will
            // carry the message.
        },
        ActorEffect::Create { pid, behavior, env } => {
            // Bounded-address collisions (spec §4.7 "N actors per creation site") land here: the
            // first creation at a given slot wins the behavior/env pair, later ones only contribute
            // their effect on the pre-existing actor (a documented imprecision — see DESIGN.md).
            state.actors.entry(pid).or_insert_with(|| ActorLocal::idle(behavior, env));
        },
        ActorEffect::Become { .. } => unreachable!("Become is folded by the caller, which owns the slot"),
    }
}

fn join_store<S: Semantics>(global: &mut Sto<S>, addition: &Sto<S>) -> bool {
    if addition.leq(global) {
        return false;
    }
    *global = global.join(addition);
    true
}

fn join_konts<S: Semantics>(
    global: &mut KontStore<S::Exp, S::Frame>,
    addition: &KontStore<S::Exp, S::Frame>,
) -> bool {
    if addition.leq(global) {
        return false;
    }
    *global = global.join(addition);
    true
}

fn enqueue<S: Semantics>(
    work: &mut WorkQueue<FreeState<S>>,
    graph: &mut Option<graph::StateGraph>,
    from_id: u64,
    state: FreeState<S>,
) {
    let to_id = graph::node_id(&state);
    if let Some(g) = graph.as_mut() {
        g.label(to_id, "state");
        g.edge(from_id, to_id, "step");
    }
    work.push(state);
}

#[cfg(test)]
mod tests {
    use aam_core::ClassicalAddress;
    use aam_lang::{exp, ExpKind, Lit};
    use aam_lattices::TypeSet;

    use super::*;

    type Time = aam_core::CallString<aam_lang::Exp>;
    type Policy = aam_core::KCfa<aam_lang::Exp>;
    type V = TypeSet<
        aam_lang::LangAddr<Time>,
        aam_lang::Closure<Time>,
        aam_lang::PrimOp,
        aam_lang::Tid,
        aam_lang::Pid,
    >;
    type AP = ClassicalAddress<aam_lang::Ident, aam_lang::Exp, Time>;
    type LangSem = aam_lang::LangSemantics<V, Time, AP>;

    #[test]
    fn literal_expression_reaches_one_final_value() {
        let semantics = LangSem::new(AP::new());
        let policy = Policy::new(0);
        let (env, store) = aam_lang::initial_env_and_store::<V, Time, AP>(&AP::new());
        let program = exp(ExpKind::Lit(Lit::Int(11)));
        let config = RunConfig::default();
        let (result, _) = explore(&program, &semantics, &policy, env, store, &config);
        assert!(!result.timed_out);
        assert!(result.contains_final_value(&V::from_int(11)));
    }
}
