// SEMANTIC ERROR
// ================================================================================================

/// A structured semantic failure. Carried to output as a dead end on the state graph; never
/// thrown to abort exploration (spec §7) — sibling non-deterministic branches keep running.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum SemanticError {
    #[error("operator is not applicable to the given operands")]
    OperatorNotApplicable,
    #[error("arity error: expected {expected} argument(s), got {got}")]
    ArityError { expected: usize, got: usize },
    #[error("variadic arity error: expected at least {min} argument(s), got {got}")]
    VariadicArityError { min: usize, got: usize },
    #[error("type error: expected {expected}, got {got}")]
    TypeError { expected: &'static str, got: &'static str },
    #[error("user error at {0}")]
    UserError(SourcePos),
    #[error("unbound variable `{0}`")]
    UnboundVariable(String),
    #[error("unbound address")]
    UnboundAddress,
    #[error("message `{0}` not supported by this behavior")]
    MessageNotSupported(String),
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),
}

/// A source position, attached to [`SemanticError::UserError`] when the front-end recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for SourcePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// MAYFAIL
// ================================================================================================

/// The internal effect used inside one semantics step to thread recoverable errors through
/// combinators (spec §7, §9): a pure pair of successes and errors, with append as its monoid
/// operation. Lowered to action successes/errors once it reaches the driver.
#[derive(Debug, Clone)]
pub struct MayFail<T> {
    pub successes: Vec<T>,
    pub errors: Vec<SemanticError>,
}

impl<T> MayFail<T> {
    pub fn ok(value: T) -> Self {
        MayFail { successes: vec![value], errors: Vec::new() }
    }

    pub fn err(error: SemanticError) -> Self {
        MayFail { successes: Vec::new(), errors: vec![error] }
    }

    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.errors.is_empty()
    }

    /// Monoid append: successes and errors from both sides simply accumulate.
    pub fn combine(mut self, other: Self) -> Self {
        self.successes.extend(other.successes);
        self.errors.extend(other.errors);
        self
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> MayFail<U> {
        MayFail { successes: self.successes.into_iter().map(f).collect(), errors: self.errors }
    }
}

impl<T> Default for MayFail<T> {
    fn default() -> Self {
        MayFail { successes: Vec::new(), errors: Vec::new() }
    }
}

impl<T> FromIterator<MayFail<T>> for MayFail<T> {
    fn from_iter<I: IntoIterator<Item = MayFail<T>>>(iter: I) -> Self {
        iter.into_iter().fold(MayFail::default(), MayFail::combine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_appends_both_sides() {
        let a = MayFail::ok(1).combine(MayFail::err(SemanticError::UnboundAddress));
        let b = MayFail::ok(2);
        let c = a.combine(b);
        assert_eq!(c.successes, vec![1, 2]);
        assert_eq!(c.errors.len(), 1);
    }

    #[test]
    fn from_iter_is_the_fold_of_combine() {
        let combined: MayFail<i32> =
            vec![MayFail::ok(1), MayFail::ok(2), MayFail::err(SemanticError::UnboundAddress)]
                .into_iter()
                .collect();
        assert_eq!(combined.successes, vec![1, 2]);
        assert_eq!(combined.errors.len(), 1);
    }
}
