use core::fmt::Debug;
use core::hash::Hash;
use core::marker::PhantomData;

// ADDRESS
// ================================================================================================

/// An abstract allocation handle. The kernel only ever hashes, compares and orders addresses — it
/// never inspects their internal shape, which is entirely up to the [`AddressPolicy`] that minted
/// them.
pub trait Address: Clone + Eq + Ord + Hash + Debug {}

impl<T> Address for T where T: Clone + Eq + Ord + Hash + Debug {}

/// Produces addresses from the coordinates named in the data model: variables are allocated from
/// `(identifier, value, timestamp)`, continuations/primitives/cells from `(expression, timestamp)`
/// or a bare name. Two policy coordinates that compare equal must mint equal addresses; distinct
/// coordinates must mint distinct ones (round-trip property, spec §8 property 6).
///
/// `variable` takes the value by reference and is generic over any `Hash` type — the
/// value-sensitive policy folds a content hash of it into the address rather than the value
/// itself. This sidesteps a self-referential type (the lattice `V` would otherwise have to name
/// `Addr<.., V>` in its own definition, since closures carry environments that carry addresses)
/// while keeping the "distinct values ⇒ distinct addresses" guarantee for any reasonable lattice.
pub trait AddressPolicy {
    type Ident: Clone + Eq + Hash + Debug;
    type Exp: Clone + Eq + Hash + Debug;
    type Time: Clone + Eq + Hash + Debug;
    type Addr: Address;

    fn variable(&self, id: &Self::Ident, value: &impl Hash, t: &Self::Time) -> Self::Addr;
    fn primitive(&self, name: &str) -> Self::Addr;
    fn cell(&self, e: &Self::Exp, t: &Self::Time) -> Self::Addr;
    fn kont(&self, e: &Self::Exp) -> Self::Addr;
}

fn fingerprint(value: &impl Hash) -> u64 {
    use core::hash::Hasher;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// The address shape shared by the classical and value-sensitive policies: every variant but
/// `VarVal` ignores the abstract value entirely, so one enum serves both policies without
/// duplicating the cell/primitive/continuation cases.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Addr<Ident, Exp, Time> {
    /// Classical allocation: name ⊗ timestamp.
    Var(Ident, Time),
    /// Value-sensitive allocation: name ⊗ content-hash-of-value ⊗ timestamp.
    VarVal(Ident, u64, Time),
    Prim(String),
    Cell(Exp, Time),
    Kont(Exp),
}

// CLASSICAL POLICY
// ================================================================================================

/// Name ⊗ timestamp. The abstract value at the binding site is ignored, so distinct values bound
/// to the same name at the same timestamp collapse into one store cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalAddress<Ident, Exp, Time> {
    _marker: PhantomData<fn() -> (Ident, Exp, Time)>,
}

impl<Ident, Exp, Time> ClassicalAddress<Ident, Exp, Time> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<Ident, Exp, Time> AddressPolicy for ClassicalAddress<Ident, Exp, Time>
where
    Ident: Clone + Eq + Hash + Debug,
    Exp: Clone + Eq + Hash + Debug,
    Time: Clone + Eq + Hash + Debug,
{
    type Ident = Ident;
    type Exp = Exp;
    type Time = Time;
    type Addr = Addr<Ident, Exp, Time>;

    fn variable(&self, id: &Ident, _value: &impl Hash, t: &Time) -> Self::Addr {
        Addr::Var(id.clone(), t.clone())
    }

    fn primitive(&self, name: &str) -> Self::Addr {
        Addr::Prim(name.into())
    }

    fn cell(&self, e: &Exp, t: &Time) -> Self::Addr {
        Addr::Cell(e.clone(), t.clone())
    }

    fn kont(&self, e: &Exp) -> Self::Addr {
        Addr::Kont(e.clone())
    }
}

// VALUE-SENSITIVE POLICY
// ================================================================================================

/// Name ⊗ value ⊗ timestamp. Folding the value into the address gives one cell per distinct value
/// ever bound to a name, trading store size for precision (and, with a singleton value, recovering
/// strong update without an explicit counting analysis).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSensitiveAddress<Ident, Exp, Time> {
    _marker: PhantomData<fn() -> (Ident, Exp, Time)>,
}

impl<Ident, Exp, Time> ValueSensitiveAddress<Ident, Exp, Time> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<Ident, Exp, Time> AddressPolicy for ValueSensitiveAddress<Ident, Exp, Time>
where
    Ident: Clone + Eq + Hash + Debug,
    Exp: Clone + Eq + Hash + Debug,
    Time: Clone + Eq + Hash + Debug,
{
    type Ident = Ident;
    type Exp = Exp;
    type Time = Time;
    type Addr = Addr<Ident, Exp, Time>;

    fn variable(&self, id: &Ident, value: &impl Hash, t: &Time) -> Self::Addr {
        Addr::VarVal(id.clone(), fingerprint(value), t.clone())
    }

    fn primitive(&self, name: &str) -> Self::Addr {
        Addr::Prim(name.into())
    }

    fn cell(&self, e: &Exp, t: &Time) -> Self::Addr {
        Addr::Cell(e.clone(), t.clone())
    }

    fn kont(&self, e: &Exp) -> Self::Addr {
        Addr::Kont(e.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classical_ignores_value_coordinate() {
        let policy = ClassicalAddress::<&'static str, &'static str, u32>::new();
        let a1 = policy.variable(&"x", &1, &0);
        let a2 = policy.variable(&"x", &2, &0);
        assert_eq!(a1, a2);
    }

    #[test]
    fn value_sensitive_distinguishes_values() {
        let policy = ValueSensitiveAddress::<&'static str, &'static str, u32>::new();
        let a1 = policy.variable(&"x", &1, &0);
        let a2 = policy.variable(&"x", &2, &0);
        assert_ne!(a1, a2);
    }

    #[test]
    fn distinct_timestamps_yield_distinct_addresses() {
        let policy = ClassicalAddress::<&'static str, &'static str, u32>::new();
        let a1 = policy.variable(&"x", &1, &0);
        let a2 = policy.variable(&"x", &1, &1);
        assert_ne!(a1, a2);
    }

    #[test]
    fn kont_address_keyed_by_expression_only() {
        let policy = ClassicalAddress::<&'static str, &'static str, u32>::new();
        assert_eq!(policy.kont(&"e"), policy.kont(&"e"));
        assert_ne!(policy.kont(&"e1"), policy.kont(&"e2"));
    }
}
