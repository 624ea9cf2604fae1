//! Algebraic contracts for the abstracting abstract machine kernel.
//!
//! This crate is the leaf-and-carrier layer of the tower described in the design: lattices,
//! address/timestamp policies, environments, stores, actions, effects and the semantics plug-in
//! trait that a source language implements once to drive every machine variant in `aam-machine`.

pub mod action;
pub mod address;
pub mod control;
pub mod effect;
pub mod env;
pub mod error;
pub mod frame;
pub mod identifier;
pub mod lattice;
pub mod semantics;
pub mod store;
pub mod timestamp;
pub mod value;

pub use action::{Action, ActionSet, Message};
pub use address::{Address, Addr, AddressPolicy, ClassicalAddress, ValueSensitiveAddress};
pub use control::Control;
pub use effect::{sets_conflict, Effect, EffectKind};
pub use env::Environment;
pub use error::{MayFail, SemanticError, SourcePos};
pub use frame::Frame;
pub use identifier::{FreshCounter, Identifier};
pub use lattice::{Counting, Lattice, Product};
pub use semantics::Semantics;
pub use store::Store;
pub use timestamp::{CallString, ConcreteTime, ConcreteTimestampPolicy, KCfa, Timestamp, TimestampPolicy};
pub use value::{AbstractValue, BinaryOperator, UnaryOperator};
