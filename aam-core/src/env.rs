use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::address::Address;

// ENVIRONMENT
// ================================================================================================

/// Variable name → address. Immutable once constructed: `extend` returns a new environment sharing
/// the old one's backing map via `Arc`, so a chain of single-variable extensions stays cheap
/// without needing a persistent-map crate.
#[derive(Clone)]
pub struct Environment<Ident, A> {
    bindings: Arc<BTreeMap<Ident, A>>,
}

impl<Ident: Ord + Clone, A: Address> Environment<Ident, A> {
    pub fn empty() -> Self {
        Self { bindings: Arc::new(BTreeMap::new()) }
    }

    /// Returns `None` when `id` is unbound — the caller turns this into
    /// [`crate::error::SemanticError::UnboundVariable`].
    pub fn lookup(&self, id: &Ident) -> Option<&A> {
        self.bindings.get(id)
    }

    /// Returns a new environment with `id ↦ addr`, shadowing any previous binding of `id`.
    pub fn extend(&self, id: Ident, addr: A) -> Self {
        let mut bindings = (*self.bindings).clone();
        bindings.insert(id, addr);
        Self { bindings: Arc::new(bindings) }
    }

    /// Multi-extend from a list of `(name, address)` bindings, as needed when entering a closure
    /// body with several parameters bound at once.
    pub fn extend_many(&self, pairs: impl IntoIterator<Item = (Ident, A)>) -> Self {
        let mut bindings = (*self.bindings).clone();
        bindings.extend(pairs);
        Self { bindings: Arc::new(bindings) }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<Ident: Ord + Clone, A: Address> Default for Environment<Ident, A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Ident: Ord + Debug, A: Address> Debug for Environment<Ident, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.bindings.iter()).finish()
    }
}

impl<Ident: Ord, A: Address> PartialEq for Environment<Ident, A> {
    fn eq(&self, other: &Self) -> bool {
        self.bindings == other.bindings
    }
}

impl<Ident: Ord, A: Address> Eq for Environment<Ident, A> {}

impl<Ident: Ord + Hash, A: Address> Hash for Environment<Ident, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (k, v) in self.bindings.iter() {
            k.hash(state);
            v.hash(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_are_none() {
        let env: Environment<&str, u32> = Environment::empty();
        assert!(env.lookup(&"x").is_none());
    }

    #[test]
    fn extend_does_not_mutate_the_original() {
        let env = Environment::<&str, u32>::empty();
        let env2 = env.extend("x", 1);
        assert!(env.lookup(&"x").is_none());
        assert_eq!(env2.lookup(&"x"), Some(&1));
    }

    #[test]
    fn extend_shadows_previous_binding() {
        let env = Environment::<&str, u32>::empty().extend("x", 1);
        let env2 = env.extend("x", 2);
        assert_eq!(env2.lookup(&"x"), Some(&2));
    }
}
