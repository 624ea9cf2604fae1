//! CLI entry point (spec §6): parses the flag surface, wires the selected machine/lattice/address
//! policy together, and runs either a single file or an interactive REPL.

use std::process::ExitCode;

use aam::args::Cli;
use aam::{repl, run};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(file) = &cli.file else {
        return match repl::start(&cli) {
            Ok(()) => ExitCode::from(0),
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            },
        };
    };

    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: failed to read `{}`: {e}", file.display());
            return ExitCode::from(1);
        },
    };

    match run::execute(&cli, &source) {
        Ok(report) => {
            repl::print_report(&report);
            if let (Some(path), Some(dot)) = (&cli.dotfile, &report.dot) {
                if let Err(e) = std::fs::write(path, dot) {
                    eprintln!("error: failed to write dotfile `{}`: {e}", path.display());
                    return ExitCode::from(1);
                }
            }
            if cli.inspect {
                repl::inspect(&report);
            }
            if report.timed_out {
                ExitCode::from(2)
            } else {
                ExitCode::from(0)
            }
        },
        Err(e @ aam_machine::AamError::Parse(_)) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        },
        Err(e @ aam_machine::AamError::Io(_)) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        },
        Err(e @ aam_machine::AamError::UnsupportedConfiguration(_)) => {
            eprintln!("error: {e}");
            ExitCode::from(3)
        },
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
