// SCALAR LITERAL
// ================================================================================================

/// Bit-pattern wrapper so float literals can sit in a `BTreeSet` like every other exact scalar
/// (mirrors `aam_lang::ast::FloatBits` — this crate keeps its own copy rather than depending on a
/// front-end collaborator it must stay usable without).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FloatBits(u64);

impl FloatBits {
    pub fn new(f: f64) -> Self {
        Self(f.to_bits())
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

/// An exact scalar value, the unit [`crate::concrete::Concrete`] tracks sets of (normally
/// singleton sets, since the concrete machine allocates every address uniquely — see spec §4.5).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarLit {
    Int(i64),
    Float(FloatBits),
    Bool(bool),
    Char(char),
    Str(String),
    Symbol(String),
    Nil,
}

impl ScalarLit {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ScalarLit::Int(_) => "integer",
            ScalarLit::Float(_) => "float",
            ScalarLit::Bool(_) => "boolean",
            ScalarLit::Char(_) => "char",
            ScalarLit::Str(_) => "string",
            ScalarLit::Symbol(_) => "symbol",
            ScalarLit::Nil => "nil",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarLit::Int(i) => Some(*i as f64),
            ScalarLit::Float(f) => Some(f.value()),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarLit::Int(_) | ScalarLit::Float(_))
    }
}
