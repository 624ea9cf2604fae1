//! The concrete machine (spec §4.5): `crate::aam::explore` instantiated with `ConcreteTime`/
//! `ConcreteTimestampPolicy` and a value lattice/address policy that mint pairwise-distinct
//! coordinates on every step. It needs no separate state layout or stepping logic of its own:
//! uniqueness of addresses makes `Store::extend`'s join degenerate to `Store::strong_update` at
//! every cell (no two writes ever land on the same address, so there is never anything to join),
//! which is exactly the "every store cell holds a singleton" guarantee spec §4.5 asks for — so this
//! module is a thin, explicitly-named wrapper rather than a fork of the AAM driver.

use aam_core::semantics::{Env, Sto};
use aam_core::{ConcreteTime, ConcreteTimestampPolicy, Semantics};

use crate::aam::{self, RunConfig};
use crate::graph;
use crate::result::AnalysisResult;

/// Runs `program` to a fixpoint — or non-termination, bounded only by `config.deadline` (spec §4.5:
/// "it may not terminate") — under the concrete machine. `time_policy` is almost always
/// `&ConcreteTimestampPolicy::new()`, taken by reference so the caller owns the one fresh-timestamp
/// counter this run consumes, same as every other variant's `explore`.
pub fn explore<S>(
    program: &S::Exp,
    semantics: &S,
    time_policy: &ConcreteTimestampPolicy<S::Exp>,
    initial_env: Env<S>,
    initial_store: Sto<S>,
    config: &RunConfig,
) -> (AnalysisResult<S::Value>, Option<graph::StateGraph>)
where
    S: Semantics<Time = ConcreteTime>,
{
    aam::explore(program, semantics, time_policy, initial_env, initial_store, config)
}

#[cfg(test)]
mod tests {
    use aam_core::{AbstractValue, ClassicalAddress};
    use aam_lang::{exp, ExpKind, Lit};
    use aam_lattices::Concrete;

    use super::*;

    type V = Concrete<
        aam_lang::LangAddr<ConcreteTime>,
        aam_lang::Closure<ConcreteTime>,
        aam_lang::PrimOp,
        aam_lang::Tid,
        aam_lang::Pid,
    >;
    type AP = ClassicalAddress<aam_lang::Ident, aam_lang::Exp, ConcreteTime>;
    type LangSem = aam_lang::LangSemantics<V, ConcreteTime, AP>;

    #[test]
    fn literal_expression_runs_to_exactly_one_value() {
        let semantics = LangSem::new(AP::new());
        let policy = ConcreteTimestampPolicy::new();
        let (env, store) = aam_lang::initial_env_and_store::<V, ConcreteTime, AP>(&AP::new());
        let program = exp(ExpKind::Lit(Lit::Int(3)));
        let config = RunConfig::default();
        let (result, _) = explore(&program, &semantics, &policy, env, store, &config);
        assert!(!result.timed_out);
        assert_eq!(result.number_of_states, 1);
        assert!(result.contains_final_value(&V::from_int(3)));
    }
}
