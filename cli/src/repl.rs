//! The two interactive loops the CLI supports: a plain REPL (no `-f`, spec §6 "otherwise read
//! REPL") that parses and runs one program per line, and an inspection REPL (`-i`/`--inspect`)
//! that lets a user poke at one already-computed `Report` after exploration finishes.

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use crate::args::Cli;
use crate::run::{self, Report};

/// No `-f` file given: read and run one program per line until EOF/Ctrl-D, printing each result
/// the way a one-shot `-f` run would.
pub fn start(cli: &Cli) -> Result<(), String> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> =
        Editor::with_config(config).map_err(|e| e.to_string())?;

    println!("aam REPL — enter a program, or 'quit' to exit.");
    loop {
        match rl.readline("aam> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "quit" || trimmed == "exit" {
                    break;
                }
                match run::execute(cli, trimmed) {
                    Ok(report) => {
                        print_report(&report);
                        if cli.inspect {
                            inspect(&report);
                        }
                    },
                    Err(e) => eprintln!("error: {e}"),
                }
            },
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            },
        }
    }
    Ok(())
}

pub fn print_report(report: &Report) {
    println!("states explored: {}", report.number_of_states);
    println!("time: {:?}", report.time);
    if report.timed_out {
        println!("(timed out before reaching a fixpoint)");
    }
    println!("final values:");
    for v in &report.final_values {
        println!("  {v}");
    }
}

/// `-i`/`--inspect`: a read-only shell over the already-finished `Report` — `values`, `states`,
/// `dot` and `quit` are the only commands, since there is nothing left to step once exploration has
/// finished (this is not a debugger; the state graph itself is not retained in `Report`).
pub fn inspect(report: &Report) {
    let config = Config::builder().auto_add_history(true).build();
    let Ok(mut rl) = Editor::<(), DefaultHistory>::with_config(config) else {
        return;
    };
    println!("inspecting result — commands: values, states, dot, quit");
    loop {
        match rl.readline("inspect> ") {
            Ok(line) => match line.trim() {
                "" => continue,
                "quit" | "exit" => break,
                "values" => report.final_values.iter().for_each(|v| println!("  {v}")),
                "states" => println!("  {}", report.number_of_states),
                "dot" => match &report.dot {
                    Some(dot) => println!("{dot}"),
                    None => println!("(no graph recorded — pass -d/--dotfile to record one)"),
                },
                other => println!("unknown command: {other}"),
            },
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            },
        }
    }
}
