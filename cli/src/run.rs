use std::time::Duration;

use aam_core::{
    AddressPolicy, CallString, ClassicalAddress, ConcreteTime, ConcreteTimestampPolicy, KCfa,
    ValueSensitiveAddress,
};
use aam_lang::{Exp, ExpKind, Ident, LangAddr, LangSemantics, LangValue, Pid};
use aam_lattices::{BoundedInt, Concrete, TypeSet};
use aam_machine::{aam, concrete, free, global_store, AamError, RunConfig, Strategy};

use crate::args::{AddressArg, Cli, LatticeArg, MachineArg};

/// `Time` for every variant but `ConcreteMachine`, which pins `ConcreteTime` itself (spec §4.5).
type Time = CallString<Exp>;

/// The handful of `BoundedInt` widths this binary monomorphizes over (spec §10.5's "threaded
/// through by monomorphizing over the handful of bounds the binary supports"). `-b` picks the
/// smallest of these at least as large as requested; a request above the largest is clamped down
/// with a warning rather than rejected, since a looser bound only costs precision, never soundness.
const SUPPORTED_BOUNDS: [i64; 4] = [10, 100, 1000, 10_000];

/// The printable result of one run: formatted final values rather than a generic `AnalysisResult`,
/// so `run::execute` can return one concrete type regardless of which lattice/machine the flags
/// selected (every branch below instantiates a different `V`; only their `Debug` text needs to
/// cross back out of this module).
pub struct Report {
    pub final_values: Vec<String>,
    pub number_of_states: usize,
    pub time: Duration,
    pub timed_out: bool,
    pub dot: Option<String>,
}

/// Parses and runs `source` under the configuration `cli` describes. Infrastructural failures
/// (parse error, unsupported flag combination) are reported before any exploration starts (spec
/// §7), mapping to exit codes 1/3 at the call site in `main`.
pub fn execute(cli: &Cli, source: &str) -> Result<Report, AamError> {
    if cli.workers == 0 {
        return Err(AamError::UnsupportedConfiguration("--workers must be >= 1".to_string()));
    }
    if cli.workers > 1 {
        tracing::warn!(
            workers = cli.workers,
            "parallel frontier expansion is not implemented by this driver (aam-lang's AST is Rc-based, \
             not Send); running single-threaded. See DESIGN.md."
        );
    }

    let program = aam_lang::parse(source).map_err(|e| AamError::Parse(e.to_string()))?;

    let (effective_machine, effective_lattice) = if cli.concrete {
        (MachineArg::ConcreteMachine, LatticeArg::Concrete)
    } else {
        (cli.machine, cli.lattice)
    };

    if matches!(effective_machine, MachineArg::ConcreteMachine)
        && !matches!(effective_lattice, LatticeArg::Concrete | LatticeArg::ConcreteNew)
    {
        return Err(AamError::UnsupportedConfiguration(
            "ConcreteMachine only runs with the Concrete lattice".to_string(),
        ));
    }
    if matches!(effective_machine, MachineArg::ConcreteMachine) && cli.counting {
        return Err(AamError::UnsupportedConfiguration(
            "--counting is meaningless for ConcreteMachine: every store cell is already a singleton"
                .to_string(),
        ));
    }
    if matches!(effective_machine, MachineArg::Aam | MachineArg::AamGlobalStore) {
        aam::reject_unsupported_actor_ops(uses_actors(&program))?;
    }
    if cli.counting && !matches!(effective_machine, MachineArg::ConcreteMachine) {
        tracing::warn!(
            "--counting is accepted but this front-end's semantics never calls Store::strong_update; \
             the flag has no observable effect yet. See DESIGN.md."
        );
    }

    let config = RunConfig {
        strategy: Strategy::Fifo,
        deadline: cli.timeout.map(Duration::from_secs_f64),
        record_graph: cli.dotfile.is_some(),
    };

    if matches!(effective_machine, MachineArg::ConcreteMachine) {
        return run_concrete_machine(&program, cli.address, &config);
    }

    let bound = resolve_bound(cli.bound);
    match cli.address {
        AddressArg::Classical => {
            dispatch_abstract::<ClassicalAddress<Ident, Exp, Time>>(effective_machine, effective_lattice, bound, &program, &config)
        },
        AddressArg::ValueSensitive => dispatch_abstract::<ValueSensitiveAddress<Ident, Exp, Time>>(
            effective_machine,
            effective_lattice,
            bound,
            &program,
            &config,
        ),
    }
}

fn resolve_bound(requested: i64) -> i64 {
    SUPPORTED_BOUNDS
        .iter()
        .copied()
        .find(|&b| b >= requested)
        .unwrap_or_else(|| {
            tracing::warn!(requested, max = SUPPORTED_BOUNDS[SUPPORTED_BOUNDS.len() - 1], "clamping bound");
            *SUPPORTED_BOUNDS.last().unwrap()
        })
}

fn dispatch_abstract<AP>(
    machine: MachineArg,
    lattice: LatticeArg,
    bound: i64,
    program: &Exp,
    config: &RunConfig,
) -> Result<Report, AamError>
where
    AP: AddressPolicy<Ident = Ident, Exp = Exp, Time = Time, Addr = LangAddr<Time>> + Clone + Default,
{
    match lattice {
        LatticeArg::TypeSet => run_abstract::<TypeSet<LangAddr<Time>, aam_lang::Closure<Time>, aam_lang::PrimOp, aam_lang::Tid, Pid>, AP>(
            machine, program, config,
        ),
        LatticeArg::Concrete | LatticeArg::ConcreteNew => run_abstract::<
            Concrete<LangAddr<Time>, aam_lang::Closure<Time>, aam_lang::PrimOp, aam_lang::Tid, Pid>,
            AP,
        >(machine, program, config),
        LatticeArg::BoundedInt => match bound {
            10 => run_abstract::<
                BoundedInt<LangAddr<Time>, aam_lang::Closure<Time>, aam_lang::PrimOp, aam_lang::Tid, Pid, 10>,
                AP,
            >(machine, program, config),
            100 => run_abstract::<
                BoundedInt<LangAddr<Time>, aam_lang::Closure<Time>, aam_lang::PrimOp, aam_lang::Tid, Pid, 100>,
                AP,
            >(machine, program, config),
            1000 => run_abstract::<
                BoundedInt<LangAddr<Time>, aam_lang::Closure<Time>, aam_lang::PrimOp, aam_lang::Tid, Pid, 1000>,
                AP,
            >(machine, program, config),
            _ => run_abstract::<
                BoundedInt<LangAddr<Time>, aam_lang::Closure<Time>, aam_lang::PrimOp, aam_lang::Tid, Pid, 10_000>,
                AP,
            >(machine, program, config),
        },
    }
}

/// Runs one of the three non-concrete variants (spec §4.5) under a fixed `V`/`AP`. `ConcreteMachine`
/// is handled separately in `run_concrete_machine`, since it pins `Time = ConcreteTime` rather than
/// the `CallString` every abstract variant shares.
fn run_abstract<V, AP>(machine: MachineArg, program: &Exp, config: &RunConfig) -> Result<Report, AamError>
where
    V: LangValue<Time>,
    AP: AddressPolicy<Ident = Ident, Exp = Exp, Time = Time, Addr = LangAddr<Time>> + Clone + Default,
{
    let addresses = AP::default();
    let semantics = LangSemantics::new(addresses.clone());
    let policy = KCfa::new(0);
    let (env, store) = aam_lang::initial_env_and_store::<V, Time, AP>(&addresses);

    let (result, graph) = match machine {
        MachineArg::Aam => aam::explore(program, &semantics, &policy, env, store, config),
        MachineArg::AamGlobalStore => global_store::explore(program, &semantics, &policy, env, store, config),
        MachineArg::Free => free::explore(program, &semantics, &policy, env, store, config),
        MachineArg::ConcreteMachine => unreachable!("handled by run_concrete_machine"),
    };

    Ok(Report {
        final_values: result.final_values.iter().map(|v| format!("{v:?}")).collect(),
        number_of_states: result.number_of_states,
        time: result.time,
        timed_out: result.timed_out,
        dot: graph.map(|g| g.to_dot("program")),
    })
}

fn run_concrete_machine(program: &Exp, address: AddressArg, config: &RunConfig) -> Result<Report, AamError> {
    match address {
        AddressArg::Classical => run_concrete_with::<ClassicalAddress<Ident, Exp, ConcreteTime>>(program, config),
        AddressArg::ValueSensitive => {
            run_concrete_with::<ValueSensitiveAddress<Ident, Exp, ConcreteTime>>(program, config)
        },
    }
}

fn run_concrete_with<AP>(program: &Exp, config: &RunConfig) -> Result<Report, AamError>
where
    AP: AddressPolicy<Ident = Ident, Exp = Exp, Time = ConcreteTime, Addr = LangAddr<ConcreteTime>>
        + Clone
        + Default,
{
    type ConcreteV = Concrete<
        LangAddr<ConcreteTime>,
        aam_lang::Closure<ConcreteTime>,
        aam_lang::PrimOp,
        aam_lang::Tid,
        Pid,
    >;

    let addresses = AP::default();
    let semantics: LangSemantics<ConcreteV, ConcreteTime, AP> = LangSemantics::new(addresses.clone());
    let policy = ConcreteTimestampPolicy::new();
    let (env, store) = aam_lang::initial_env_and_store::<ConcreteV, ConcreteTime, AP>(&addresses);
    let (result, graph) = concrete::explore(program, &semantics, &policy, env, store, config);

    Ok(Report {
        final_values: result.final_values.iter().map(|v| format!("{v:?}")).collect(),
        number_of_states: result.number_of_states,
        time: result.time,
        timed_out: result.timed_out,
        dot: graph.map(|g| g.to_dot("program")),
    })
}

/// Whether `exp` contains any actor operation (spec §4.7's `create`/`send`/`become`, or a `receive`
/// behavior literal), used to reject actor programs under the two variants that don't interpret
/// them (spec §10.4, grounded on `aam::reject_unsupported_actor_ops`).
fn uses_actors(exp: &Exp) -> bool {
    match exp.as_ref() {
        ExpKind::Lit(_) | ExpKind::Var(_) => false,
        ExpKind::Lambda { body, .. } => uses_actors(body),
        ExpKind::If { test, then, els } => uses_actors(test) || uses_actors(then) || uses_actors(els),
        ExpKind::App { rator, rands } => uses_actors(rator) || rands.iter().any(uses_actors),
        ExpKind::Let { rhs, body, .. } => uses_actors(rhs) || uses_actors(body),
        ExpKind::Letrec { bindings, body } => {
            bindings.iter().any(|(_, rhs)| uses_actors(rhs)) || uses_actors(body)
        },
        ExpKind::Begin(exps) => exps.iter().any(uses_actors),
        ExpKind::Spawn(e) | ExpKind::Join(e) => uses_actors(e),
        ExpKind::Receive(_) | ExpKind::Create(_) | ExpKind::Become(_) => true,
        ExpKind::Send { pid, args, .. } => uses_actors(pid) || args.iter().any(uses_actors),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn cli(machine: MachineArg, lattice: LatticeArg) -> Cli {
        Cli {
            machine,
            lattice,
            concrete: false,
            address: AddressArg::Classical,
            file: None,
            dotfile: None,
            timeout: Some(5.0),
            bound: 100,
            inspect: false,
            counting: false,
            workers: 1,
            verbose: 0,
        }
    }

    #[test]
    fn literal_program_under_aam_typeset_reaches_one_value() {
        let report = execute(&cli(MachineArg::Aam, LatticeArg::TypeSet), "42").unwrap();
        assert!(!report.timed_out);
        assert_eq!(report.number_of_states, 1);
        assert_eq!(report.final_values.len(), 1);
    }

    #[test]
    fn concrete_flag_overrides_machine_and_lattice() {
        let mut args = cli(MachineArg::Aam, LatticeArg::TypeSet);
        args.concrete = true;
        let report = execute(&args, "7").unwrap();
        assert_eq!(report.final_values.len(), 1);
    }

    #[test]
    fn aam_rejects_actor_programs() {
        let source = "(let ((p (create (receive (ping () 1))))) (send p ping))";
        let err = execute(&cli(MachineArg::Aam, LatticeArg::TypeSet), source).unwrap_err();
        assert!(matches!(err, AamError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn free_accepts_actor_programs() {
        let source = "(let ((p (create (receive (ping () 1))))) (send p ping 0))";
        let report = execute(&cli(MachineArg::Free, LatticeArg::TypeSet), source).unwrap();
        assert!(!report.timed_out);
    }

    #[test]
    fn concrete_machine_rejects_non_concrete_lattice() {
        let err = execute(&cli(MachineArg::ConcreteMachine, LatticeArg::TypeSet), "1").unwrap_err();
        assert!(matches!(err, AamError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let mut args = cli(MachineArg::Aam, LatticeArg::TypeSet);
        args.workers = 0;
        let err = execute(&args, "1").unwrap_err();
        assert!(matches!(err, AamError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn bound_resolution_rounds_up_to_a_supported_width() {
        assert_eq!(resolve_bound(1), 10);
        assert_eq!(resolve_bound(100), 100);
        assert_eq!(resolve_bound(250), 1000);
        assert_eq!(resolve_bound(1_000_000), 10_000);
    }
}
