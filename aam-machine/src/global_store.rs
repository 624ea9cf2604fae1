use std::collections::BTreeMap;
use std::time::Instant;

use aam_core::semantics::Env;
use aam_core::{Control, Semantics, TimestampPolicy};

use crate::aam::RunConfig;
use crate::graph;
use crate::kont::KontStore;
use crate::queue::WorkQueue;
use crate::result::AnalysisResult;
use crate::step::{step_one, ThreadLocal, ThreadOutcome, TidKey};

// AAM-GLOBALSTORE: STORE LIFTED OUT OF STATE
// ================================================================================================

/// The value store is lifted out of each state and shared by the whole run (spec §4.5): a state no
/// longer embeds `σ`, only `(threads, κ, t)`, so two configurations that differ only in what the
/// *global* store has accumulated so far are the same state. The continuation store stays embedded
/// per-state, same as `crate::aam` — only the value store moves out here; `crate::free` lifts both.
#[derive(Clone)]
pub struct GlobalState<S: Semantics> {
    pub threads: BTreeMap<TidKey<S>, ThreadLocal<S>>,
    pub konts: KontStore<S::Exp, S::Frame>,
    pub time: S::Time,
}

impl<S: Semantics> PartialEq for GlobalState<S> {
    fn eq(&self, other: &Self) -> bool {
        self.threads == other.threads && self.konts == other.konts && self.time == other.time
    }
}

impl<S: Semantics> Eq for GlobalState<S> {}

impl<S: Semantics> core::hash::Hash for GlobalState<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.threads.hash(state);
        self.konts.hash(state);
        self.time.hash(state);
    }
}

/// Runs the AAM-GlobalStore variant. Follows the standard store-widening discipline (Might &
/// Shivers): whenever a successor's store extends the run's shared store beyond a join, every
/// state already marked `visited` is pushed back onto the work queue, since any of them might
/// branch differently against the bigger store. Termination still holds because the store lattice
/// is finite in every lattice this crate ships (`DESIGN.md`), so only finitely many growths can
/// happen before the loop stops re-widening and drains to a fixpoint like `crate::aam` does.
pub fn explore<S, TP>(
    program: &S::Exp,
    semantics: &S,
    time_policy: &TP,
    initial_env: Env<S>,
    initial_store: aam_core::semantics::Sto<S>,
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

    let mut threads = BTreeMap::new();
    threads.insert(None, ThreadLocal::root(Control::Eval(semantics.initial_exp(program), initial_env)));
    let initial: GlobalState<S> = GlobalState { threads, konts: KontStore::empty(), time: S::Time::zero() };

    let mut work = WorkQueue::new(config.strategy);
    let mut seen: std::collections::HashSet<GlobalState<S>> = std::collections::HashSet::new();
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
            for outcome in step_one(semantics, local, &global_store, &state.konts, &state.time, time_policy) {
                let (new_local_entry, konts, time, grown_store) = match outcome {
                    ThreadOutcome::Advance { local, store, konts, time } => {
                        (Some((tid_key.clone(), local)), konts, time, Some(store))
                    },
                    ThreadOutcome::Spawn { new_tid, new_thread, local, store, konts, time } => {
                        let mut next = state.clone();
                        next.konts = konts.clone();
                        next.time = time.clone();
                        next.threads.insert(tid_key.clone(), local);
                        next.threads.insert(Some(new_tid), new_thread);
                        widened |= join_store(&mut global_store, &store);
                        enqueue(&mut work, &mut graph, state_id, next);
                        continue;
                    },
                    ThreadOutcome::JoinRequest { target, resume_kptr, store, konts, time } => {
                        widened |= join_store(&mut global_store, &store);
                        if let Some(target_local) = state.threads.get(&Some(target)) {
                            if let Some(value) = target_local.final_value() {
                                let mut next = state.clone();
                                next.konts = konts;
                                next.time = time;
                                next.threads.insert(
                                    tid_key.clone(),
                                    ThreadLocal { control: Control::Kont(value.clone()), kptr: resume_kptr },
                                );
                                enqueue(&mut work, &mut graph, state_id, next);
                            }
                        }
                        continue;
                    },
                    ThreadOutcome::Dead => continue,
                };
                if let Some(store) = grown_store {
                    widened |= join_store(&mut global_store, &store);
                }
                if let Some((key, local)) = new_local_entry {
                    let mut next = state.clone();
                    next.konts = konts;
                    next.time = time;
                    next.threads.insert(key, local);
                    enqueue(&mut work, &mut graph, state_id, next);
                }
            }
        }
        if widened {
            // The store just grew: every state already marked seen might step differently against
            // it, so push them all back onto the frontier and start tracking "seen" afresh.
            let stale: Vec<GlobalState<S>> = seen.drain().collect();
            tracing::debug!(reenqueued = stale.len(), "global store widened, re-enqueuing seen states");
            work.extend(stale);
        }
    }

    result.time = start.elapsed();
    result.timed_out = timed_out;
    (result, graph)
}

/// Joins `addition` into `*global`, returning `true` iff the store actually grew (`global` did not
/// already subsume `addition`) — the signal that triggers re-widening.
fn join_store<S: Semantics>(global: &mut aam_core::semantics::Sto<S>, addition: &aam_core::semantics::Sto<S>) -> bool {
    if addition.leq(global) {
        return false;
    }
    *global = global.join(addition);
    true
}

fn enqueue<S: Semantics>(
    work: &mut WorkQueue<GlobalState<S>>,
    graph: &mut Option<graph::StateGraph>,
    from_id: u64,
    state: GlobalState<S>,
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
    use aam_core::{AbstractValue, ClassicalAddress};
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
        let program = exp(ExpKind::Lit(Lit::Int(7)));
        let config = RunConfig::default();
        let (result, _) = explore(&program, &semantics, &policy, env, store, &config);
        assert!(!result.timed_out);
        assert!(result.contains_final_value(&V::from_int(7)));
    }
}
