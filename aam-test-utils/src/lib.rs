//! Shared fixtures for the workspace's test suites: one canonical wiring per machine variant (spec
//! §8's `AAMTypeSet`/`AACTypeSet`/`FreeTypeSet`, plus a concrete-machine wiring for exact-value
//! checks) and the end-to-end scenario source strings the variant suites all run against. Kept as
//! its own crate, the way `miden-test-utils` is split out of the processor/assembler suites it
//! backs, rather than duplicated per consuming crate.

use std::time::Duration;

use aam_core::{CallString, ClassicalAddress, ConcreteTime, ConcreteTimestampPolicy, KCfa};
use aam_lang::{Closure, Exp, Ident, LangAddr, LangSemantics, ParseError, Pid, PrimOp, Tid};
use aam_lattices::{Concrete, TypeSet};
use aam_machine::{AnalysisResult, RunConfig};

pub mod programs;

// TYPESET WIRING (AAMTypeSet / AACTypeSet / FreeTypeSet)
// ================================================================================================

/// 0-CFA: call strings truncated to length zero, the context sensitivity the scenario table's
/// three named configurations assume.
pub type Time = CallString<Exp>;
pub type Policy = KCfa<Exp>;
pub type TypeSetValue = TypeSet<LangAddr<Time>, Closure<Time>, PrimOp, Tid, Pid>;
pub type TypeSetAddr = ClassicalAddress<Ident, Exp, Time>;
pub type TypeSetSemantics = LangSemantics<TypeSetValue, Time, TypeSetAddr>;

fn typeset_fixture(
    source: &str,
) -> Result<(Exp, TypeSetSemantics, Policy, aam_lang::Env<Time>, aam_core::Store<LangAddr<Time>, TypeSetValue>), ParseError>
{
    let program = aam_lang::parse(source)?;
    let addresses = TypeSetAddr::new();
    let semantics = TypeSetSemantics::new(addresses.clone());
    let policy = Policy::new(0);
    let (env, store) = aam_lang::initial_env_and_store::<TypeSetValue, Time, TypeSetAddr>(&addresses);
    Ok((program, semantics, policy, env, store))
}

/// Runs `source` under the AAM variant with the `TypeSet` lattice (spec §8's `AAMTypeSet`).
pub fn run_aam_typeset(source: &str) -> Result<AnalysisResult<TypeSetValue>, ParseError> {
    let (program, semantics, policy, env, store) = typeset_fixture(source)?;
    let (result, _) = aam_machine::aam::explore(&program, &semantics, &policy, env, store, &default_config());
    Ok(result)
}

/// Runs `source` under the AAM-GlobalStore variant with the `TypeSet` lattice (spec §8's
/// `AACTypeSet`).
pub fn run_aac_typeset(source: &str) -> Result<AnalysisResult<TypeSetValue>, ParseError> {
    let (program, semantics, policy, env, store) = typeset_fixture(source)?;
    let (result, _) = aam_machine::global_store::explore(&program, &semantics, &policy, env, store, &default_config());
    Ok(result)
}

/// Runs `source` under the Free variant with the `TypeSet` lattice (spec §8's `FreeTypeSet`) —
/// the only one of the three able to run actor-based scenarios (spec §4.6/§4.7: actors are
/// Free-only).
pub fn run_free_typeset(source: &str) -> Result<AnalysisResult<TypeSetValue>, ParseError> {
    let (program, semantics, policy, env, store) = typeset_fixture(source)?;
    let (result, _) = aam_machine::free::explore(&program, &semantics, &policy, env, store, &default_config());
    Ok(result)
}

// CONCRETE WIRING (exact-value checks, spec §8's "subsumption soundness" reference point)
// ================================================================================================

pub type ConcreteValue = Concrete<LangAddr<ConcreteTime>, Closure<ConcreteTime>, PrimOp, Tid, Pid>;
pub type ConcreteAddr = ClassicalAddress<Ident, Exp, ConcreteTime>;
pub type ConcreteSemantics = LangSemantics<ConcreteValue, ConcreteTime, ConcreteAddr>;

/// Runs `source` under the concrete machine, yielding the exact value(s) reached rather than an
/// abstract over-approximation — the reference point the `TypeSet` runs above are checked against
/// (spec §8, property 4: "subsumption soundness").
pub fn run_concrete(source: &str) -> Result<AnalysisResult<ConcreteValue>, ParseError> {
    let program = aam_lang::parse(source)?;
    let addresses = ConcreteAddr::new();
    let semantics = ConcreteSemantics::new(addresses.clone());
    let policy = ConcreteTimestampPolicy::new();
    let (env, store) = aam_lang::initial_env_and_store::<ConcreteValue, ConcreteTime, ConcreteAddr>(&addresses);
    let (result, _) =
        aam_machine::concrete::explore(&program, &semantics, &policy, env, store, &default_config());
    Ok(result)
}

/// A deadline generous enough for every scenario in `programs` to reach a fixpoint, short enough
/// that a genuine non-termination bug in a test fails fast instead of hanging a CI run.
fn default_config() -> RunConfig {
    RunConfig { deadline: Some(Duration::from_secs(10)), ..RunConfig::default() }
}

#[cfg(test)]
mod tests {
    use aam_core::AbstractValue;
    use pretty_assertions::assert_eq;

    use super::*;

    // Sanity-checks the fixture wiring itself (addresses/env/store construction), not the
    // scenarios already covered end-to-end by `aam-machine`'s `tests/scenarios.rs`.

    #[test]
    fn run_concrete_reaches_the_exact_literal() {
        let result = run_concrete("42").expect("parses");
        assert_eq!(result.final_values, vec![ConcreteValue::from_int(42)]);
    }

    #[test]
    fn run_aam_typeset_reaches_a_value_subsuming_the_literal() {
        let result = run_aam_typeset("42").expect("parses");
        assert!(result.contains_final_value(&TypeSetValue::from_int(42)));
    }
}
