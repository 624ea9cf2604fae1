use core::fmt::Debug;
use core::hash::Hash;

// FRAME
// ================================================================================================

/// One suspended continuation frame. Opaque to the kernel — a language's [`crate::semantics::Semantics`]
/// defines its own frame enum (e.g. "evaluate the operands of this application next") and the
/// kernel only ever clones, compares, hashes and addresses it.
pub trait Frame: Clone + Eq + Hash + Debug {}

impl<T> Frame for T where T: Clone + Eq + Hash + Debug {}
