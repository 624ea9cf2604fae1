//! Driver crate for the abstracting abstract machine kernel: the fixed-point exploration loop and
//! the variants built on it (spec §4.5), plus the concurrent thread-pool and actor extensions
//! (spec §4.6, §4.7) shared by every variant that supports them.
//!
//! A variant module (`aam`, `global_store`, `free`, `concrete`) owns exactly one `State` layout and
//! one `explore` function; `step`/`kont`/`actor` hold the pieces every variant assembles the same
//! way. See `DESIGN.md` for why the state layouts differ and why the variant drivers are kept as
//! separate near-duplicates rather than one generic driver parameterized over "what's global".

pub mod aam;
pub mod actor;
pub mod concrete;
pub mod error;
pub mod free;
pub mod global_store;
pub mod graph;
pub mod kont;
pub mod queue;
pub mod result;
pub mod step;

pub use aam::RunConfig;
pub use error::AamError;
pub use queue::Strategy;
pub use result::AnalysisResult;
