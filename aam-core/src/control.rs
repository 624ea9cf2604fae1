// CONTROL
// ================================================================================================

/// Where a machine step is looking: about to evaluate an expression, or returning a value to the
/// topmost continuation frame (spec §3).
#[derive(Clone, Debug)]
pub enum Control<Exp, Value, Env> {
    Eval(Exp, Env),
    Kont(Value),
}

impl<Exp: PartialEq, Value: PartialEq, Env: PartialEq> PartialEq for Control<Exp, Value, Env> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Control::Eval(e1, r1), Control::Eval(e2, r2)) => e1 == e2 && r1 == r2,
            (Control::Kont(v1), Control::Kont(v2)) => v1 == v2,
            _ => false,
        }
    }
}

impl<Exp: Eq, Value: Eq, Env: Eq> Eq for Control<Exp, Value, Env> {}

impl<Exp: std::hash::Hash, Value: std::hash::Hash, Env: std::hash::Hash> std::hash::Hash
    for Control<Exp, Value, Env>
{
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Control::Eval(e, r) => {
                e.hash(state);
                r.hash(state);
            },
            Control::Kont(v) => v.hash(state),
        }
    }
}
