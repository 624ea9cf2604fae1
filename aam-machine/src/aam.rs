use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use aam_core::semantics::Env;
use aam_core::{Control, Semantics, TimestampPolicy};

use crate::kont::{KontPtr, KontStore};
use crate::queue::{Strategy, WorkQueue};
use crate::result::AnalysisResult;
use crate::step::{step_one, ThreadLocal, ThreadOutcome, Tid, TidKey};
use crate::{graph, AamError};

// AAM: PER-STATE STORE AND CONTINUATION STORE
// ================================================================================================

/// The classical CESK variant (spec §4.5): every reachable point in the exploration carries its
/// own store and continuation store. A combined state bundles every currently-live thread's local
/// control together with the store/kont-store/timestamp that thread pool shares — with a single
/// entry keyed `None`, this degenerates to plain sequential CESK; `spawn`/`join` (spec §4.6) fall
/// out of the same loop rather than needing a separate code path.
pub struct AamState<S: Semantics> {
    pub threads: BTreeMap<TidKey<S>, ThreadLocal<S>>,
    pub store: aam_core::semantics::Sto<S>,
    pub konts: KontStore<S::Exp, S::Frame>,
    pub time: S::Time,
}

impl<S: Semantics> Clone for AamState<S> {
    fn clone(&self) -> Self {
        AamState {
            threads: self.threads.clone(),
            store: self.store.clone(),
            konts: self.konts.clone(),
            time: self.time.clone(),
        }
    }
}

// See `crate::step::Components`/`ThreadLocal` for why these are hand-written rather than derived.
impl<S: Semantics> PartialEq for AamState<S> {
    fn eq(&self, other: &Self) -> bool {
        self.threads == other.threads
            && self.store == other.store
            && self.konts == other.konts
            && self.time == other.time
    }
}

impl<S: Semantics> Eq for AamState<S> {}

impl<S: Semantics> core::hash::Hash for AamState<S> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.threads.hash(state);
        self.store.hash(state);
        self.konts.hash(state);
        self.time.hash(state);
    }
}

/// Exploration configuration shared by every driver in this crate (spec §6 flags `-w`/`-t`/`-d`).
pub struct RunConfig {
    pub strategy: Strategy,
    pub deadline: Option<Duration>,
    pub record_graph: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { strategy: Strategy::Fifo, deadline: None, record_graph: false }
    }
}

/// Runs the AAM variant to a fixpoint (or until `config.deadline` elapses), exploring from
/// `program` under `semantics`/`time_policy`. Returns the accumulated result and, when
/// `config.record_graph` is set, the explored [`graph::StateGraph`] for `-d`/`--dotfile`.
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

    let mut threads = BTreeMap::new();
    threads.insert(None, ThreadLocal::root(Control::Eval(semantics.initial_exp(program), initial_env)));
    let initial = AamState { threads, store: initial_store, konts: KontStore::empty(), time: S::Time::zero() };

    let mut work = WorkQueue::new(config.strategy);
    let mut visited: HashSet<AamState<S>> = HashSet::new();
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
        if !visited.insert(state.clone()) {
            continue;
        }
        result.number_of_states += 1;

        if let Some(local) = state.threads.get(&None) {
            if let Some(value) = local.final_value() {
                result.record(value.clone());
                if let Some(g) = graph.as_mut() {
                    g.mark_halted(state_id);
                }
            }
        }

        for (tid_key, local) in state.threads.iter() {
            if local.is_terminal() {
                continue;
            }
            for outcome in step_one(semantics, local, &state.store, &state.konts, &state.time, time_policy) {
                if let Some(next) = apply_thread_outcome(&state, tid_key, outcome) {
                    let next_id = graph::node_id(&next);
                    if let Some(g) = graph.as_mut() {
                        g.label(next_id, "state");
                        g.edge(state_id, next_id, "step");
                    }
                    work.push(next);
                }
            }
        }
    }

    result.time = start.elapsed();
    result.timed_out = timed_out;
    (result, graph)
}

/// Builds the successor `AamState` a [`ThreadOutcome`] describes, or resolves a join request
/// in-place when the target is already halted in `state`. Returns `None` when the outcome yields
/// no successor this round (a blocked join whose target hasn't finished yet — the driver will
/// revisit it from a later combined state once that target progresses).
fn apply_thread_outcome<S: Semantics>(
    state: &AamState<S>,
    tid_key: &TidKey<S>,
    outcome: ThreadOutcome<S>,
) -> Option<AamState<S>> {
    match outcome {
        ThreadOutcome::Advance { local, store, konts, time } => {
            let mut next = state.clone();
            next.store = store;
            next.konts = konts;
            next.time = time;
            next.threads.insert(tid_key.clone(), local);
            Some(next)
        },
        ThreadOutcome::Spawn { new_tid, new_thread, local, store, konts, time } => {
            let mut next = state.clone();
            next.store = store;
            next.konts = konts;
            next.time = time;
            next.threads.insert(tid_key.clone(), local);
            next.threads.insert(Some(new_tid), new_thread);
            Some(next)
        },
        ThreadOutcome::JoinRequest { target, resume_kptr, store, konts, time } => {
            let target_local = state.threads.get(&Some(target))?;
            let value = target_local.final_value()?.clone();
            let mut next = state.clone();
            next.store = store;
            next.konts = konts;
            next.time = time;
            next.threads.insert(tid_key.clone(), ThreadLocal { control: Control::Kont(value), kptr: resume_kptr });
            Some(next)
        },
        ThreadOutcome::Dead => None,
    }
}

/// Exit code 3 (spec §6): rejects configurations this variant cannot express, surfaced before
/// exploration starts rather than failing silently partway through.
pub fn reject_unsupported_actor_ops(uses_actors: bool) -> Result<(), AamError> {
    if uses_actors {
        return Err(AamError::UnsupportedConfiguration(
            "the AAM and AAM-GlobalStore variants do not interpret actor operations (create/send/become); \
             select the Free machine for actor programs"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use aam_core::{AbstractValue, ClassicalAddress, ConcreteTime, ConcreteTimestampPolicy, Store};
    use aam_lang::{exp, ExpKind, Lit, PrimOp};
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
        let program = exp(ExpKind::Lit(Lit::Int(5)));
        let config = RunConfig::default();
        let (result, _) = explore(&program, &semantics, &policy, env, store, &config);
        assert!(!result.timed_out);
        assert_eq!(result.number_of_states, 1);
        assert!(result.contains_final_value(&V::from_int(5)));
    }

    #[allow(dead_code)]
    fn unused_reference() -> (ConcreteTime, ConcreteTimestampPolicy<aam_lang::Exp>, PrimOp) {
        (ConcreteTime::zero(), ConcreteTimestampPolicy::new(), PrimOp::Add)
    }
}
