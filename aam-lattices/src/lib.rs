//! Named abstract-value lattice instances for the AAM kernel (spec §4.1, §10.5): [`Concrete`] for
//! the concrete machine, [`TypeSet`] and [`BoundedInt`] for abstract analyses, built from a shared
//! [`Extras`] component so closures/primitives/pairs/tids/pids/locks/errors aren't reimplemented
//! three times. Generic over the address/closure/primitive/thread-id/actor-id types a front-end
//! collaborator supplies, so this crate depends on nothing but `aam-core`.

pub mod bounded_int;
pub mod concrete;
pub mod counting;
pub mod extras;
pub mod scalar;
pub mod tags;
pub mod type_set;

pub use bounded_int::BoundedInt;
pub use concrete::Concrete;
pub use counting::OccurrenceCount;
pub use extras::{Extras, LockTags};
pub use scalar::{FloatBits, ScalarLit};
pub use tags::Tags;
pub use type_set::TypeSet;
