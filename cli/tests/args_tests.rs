//! Exercises the flag surface of spec §6 through `clap::Parser::try_parse_from`, the same way
//! `neo-cli`'s `tests/args_tests.rs` tests its own `CliArgs` — no process spawning, just parsing.

use aam::args::{AddressArg, Cli, LatticeArg, MachineArg};
use clap::Parser;

#[test]
fn defaults_match_the_documented_flag_table() {
    let cli = Cli::try_parse_from(["aam"]).unwrap();
    assert_eq!(cli.machine, MachineArg::Aam);
    assert_eq!(cli.lattice, LatticeArg::TypeSet);
    assert_eq!(cli.address, AddressArg::Classical);
    assert!(!cli.concrete);
    assert_eq!(cli.file, None);
    assert_eq!(cli.dotfile, None);
    assert_eq!(cli.timeout, None);
    assert_eq!(cli.bound, 100);
    assert!(!cli.inspect);
    assert!(!cli.counting);
    assert_eq!(cli.workers, 1);
    assert_eq!(cli.verbose, 0);
}

#[test]
fn machine_accepts_every_documented_spelling() {
    for (flag, expected) in [
        ("AAM", MachineArg::Aam),
        ("AAMGlobalStore", MachineArg::AamGlobalStore),
        ("Free", MachineArg::Free),
        ("ConcreteMachine", MachineArg::ConcreteMachine),
    ] {
        let cli = Cli::try_parse_from(["aam", "-m", flag]).unwrap();
        assert_eq!(cli.machine, expected, "flag {flag}");
    }
}

#[test]
fn lattice_accepts_both_spellings_of_the_concrete_instance() {
    let a = Cli::try_parse_from(["aam", "-l", "Concrete"]).unwrap();
    let b = Cli::try_parse_from(["aam", "-l", "ConcreteNew"]).unwrap();
    assert_eq!(a.lattice, LatticeArg::Concrete);
    assert_eq!(b.lattice, LatticeArg::ConcreteNew);
}

#[test]
fn address_accepts_classical_and_value_sensitive() {
    let a = Cli::try_parse_from(["aam", "-a", "Classical"]).unwrap();
    let b = Cli::try_parse_from(["aam", "-a", "ValueSensitive"]).unwrap();
    assert_eq!(a.address, AddressArg::Classical);
    assert_eq!(b.address, AddressArg::ValueSensitive);
}

#[test]
fn unknown_value_enum_spelling_is_rejected() {
    assert!(Cli::try_parse_from(["aam", "-m", "aam"]).is_err());
    assert!(Cli::try_parse_from(["aam", "-l", "typeset"]).is_err());
}

#[test]
fn short_and_long_forms_agree() {
    let short = Cli::try_parse_from(["aam", "-f", "prog.aam", "-b", "1000", "-t", "2.5"]).unwrap();
    let long =
        Cli::try_parse_from(["aam", "--file", "prog.aam", "--bound", "1000", "--timeout", "2.5"])
            .unwrap();
    assert_eq!(short.file, long.file);
    assert_eq!(short.bound, long.bound);
    assert_eq!(short.timeout, long.timeout);
}

#[test]
fn verbose_flag_counts_repetitions() {
    let cli = Cli::try_parse_from(["aam", "-vvv"]).unwrap();
    assert_eq!(cli.verbose, 3);
}

#[test]
fn counting_and_inspect_and_concrete_are_plain_switches() {
    let cli = Cli::try_parse_from(["aam", "--counting", "-i", "-c"]).unwrap();
    assert!(cli.counting);
    assert!(cli.inspect);
    assert!(cli.concrete);
}
