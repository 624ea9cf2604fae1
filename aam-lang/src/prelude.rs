use std::rc::Rc;

use aam_core::{AddressPolicy, Store, Timestamp};

use crate::ast::{Exp, Ident};
use crate::ids::{Env, LangAddr, PrimOp};
use crate::semantics::LangValue;

// PRELUDE
// ================================================================================================

/// Builds the initial environment and store: every [`PrimOp`] bound in the global scope under its
/// surface name. A program's top-level expression runs against this environment extended with
/// nothing else — there is no implicit `self`/`receive` binding outside an actor's message handler.
pub fn initial_env_and_store<V, Time, AP>(addresses: &AP) -> (Env<Time>, Store<LangAddr<Time>, V>)
where
    V: LangValue<Time>,
    Time: Timestamp,
    AP: AddressPolicy<Ident = Ident, Exp = Exp, Time = Time, Addr = LangAddr<Time>>,
{
    let mut env = Env::empty();
    let mut store = Store::empty();
    for prim in PrimOp::ALL {
        let ident: Ident = Rc::from(prim.name());
        let addr = addresses.primitive(prim.name());
        env = env.extend(ident, addr.clone());
        store = store.extend(addr, V::from_primitive(prim));
    }
    (env, store)
}
