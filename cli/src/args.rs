use std::path::PathBuf;

use clap::{Parser, ValueEnum};

// CLI SURFACE (spec §6)
// ================================================================================================

/// Explores the reachable states of a program under the selected abstracting-abstract-machine
/// configuration and reports the values flowing to the final continuation.
#[derive(Debug, Parser)]
#[command(name = "aam", version, about)]
pub struct Cli {
    /// Machine variant.
    #[arg(short = 'm', long = "machine", value_enum, default_value = "AAM")]
    pub machine: MachineArg,

    /// Abstract value lattice.
    #[arg(short = 'l', long = "lattice", value_enum, default_value = "TypeSet")]
    pub lattice: LatticeArg,

    /// Force concrete semantics: overrides `-m`/`-l` to `ConcreteMachine`/`Concrete` (spec §6).
    #[arg(short = 'c', long = "concrete", default_value_t = false)]
    pub concrete: bool,

    /// Address allocation policy.
    #[arg(short = 'a', long = "address", value_enum, default_value = "Classical")]
    pub address: AddressArg,

    /// Input program file; omit to read from an interactive REPL instead.
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Path to write the explored state graph as Graphviz DOT.
    #[arg(short = 'd', long = "dotfile")]
    pub dotfile: Option<PathBuf>,

    /// Wall-clock deadline in seconds; omit for no timeout.
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<f64>,

    /// Bound for the `BoundedInt` lattice (spec §6, default 100). Monomorphized over a fixed set
    /// of supported bounds — see `run::resolve_bound`.
    #[arg(short = 'b', long = "bound", default_value_t = 100)]
    pub bound: i64,

    /// Drop into an inspection REPL over the result once exploration finishes.
    #[arg(short = 'i', long = "inspect", default_value_t = false)]
    pub inspect: bool,

    /// Enable the abstract-counting lattice component (spec §9's `Product[X, OccurrenceCount]`).
    #[arg(long = "counting", default_value_t = false)]
    pub counting: bool,

    /// Number of parallel driver workers. Accepted and validated (`>= 1`); see `DESIGN.md` for why
    /// this reference driver does not yet spawn OS threads to honor it.
    #[arg(short = 'w', long = "workers", default_value_t = 1)]
    pub workers: usize,

    /// Increase log verbosity (`-v` debug, `-vv` trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineArg {
    #[value(name = "AAM")]
    Aam,
    #[value(name = "AAMGlobalStore")]
    AamGlobalStore,
    #[value(name = "Free")]
    Free,
    #[value(name = "ConcreteMachine")]
    ConcreteMachine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LatticeArg {
    #[value(name = "Concrete")]
    Concrete,
    /// Accepted as a second spelling of `Concrete` (spec §6 lists both names for one lattice
    /// instance; there is only one concrete-value lattice in this workspace).
    #[value(name = "ConcreteNew")]
    ConcreteNew,
    #[value(name = "TypeSet")]
    TypeSet,
    #[value(name = "BoundedInt")]
    BoundedInt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddressArg {
    #[value(name = "Classical")]
    Classical,
    #[value(name = "ValueSensitive")]
    ValueSensitive,
}
