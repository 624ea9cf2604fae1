//! Library half of the `aam` binary, split out so `tests/` can exercise flag parsing and the
//! dispatch logic in `run` directly rather than spawning the compiled binary (spec §6's CLI
//! surface, tested the way `neo-cli`'s `lib.rs` + `tests/args_tests.rs` pair tests theirs).

pub mod args;
pub mod repl;
pub mod run;
