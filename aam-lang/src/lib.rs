//! A small Scheme-like front-end: the `Exp`/AST grammar, a recursive-descent parser, the
//! continuation frames a direct-style evaluator needs, and the [`Semantics`](aam_core::Semantics)
//! plug-in that drives every machine variant in `aam-machine` over this grammar.

pub mod ast;
pub mod frame;
pub mod ids;
pub mod parser;
pub mod prelude;
pub mod semantics;

pub use ast::{exp, Exp, ExpKind, FloatBits, Ident, Lit, ReceiveClause};
pub use frame::Frame;
pub use ids::{Closure, Env, LangAddr, Pid, PrimOp, Tid};
pub use parser::{parse, ParseError};
pub use prelude::initial_env_and_store;
pub use semantics::{LangSemantics, LangValue};
