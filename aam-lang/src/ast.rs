use std::rc::Rc;

// IDENTIFIERS AND EXPRESSIONS
// ================================================================================================

/// A variable name. `Rc<str>` so closures and environments can clone a binding without copying the
/// text, while still comparing and ordering structurally.
pub type Ident = Rc<str>;

/// An expression node. `Rc`-wrapped so cloning an expression (which the kernel does constantly —
/// every `Action::Eval`/`Action::Push` carries one) is a refcount bump, not a tree copy.
pub type Exp = Rc<ExpKind>;

pub fn exp(kind: ExpKind) -> Exp {
    Rc::new(kind)
}

/// Bit-pattern wrapper so float literals can derive `Eq`/`Ord`/`Hash` like every other AST node.
/// NaN compares equal to itself here, which is wrong for arithmetic but irrelevant for a literal
/// that the parser only ever constructs from text that already parsed as a finite float.
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

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lit {
    Int(i64),
    Float(FloatBits),
    Bool(bool),
    Char(char),
    Str(String),
    Symbol(String),
    Nil,
}

/// A behavior clause: `(message-name (params...) body)`, matched by `step_receive`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReceiveClause {
    pub message: String,
    pub params: Vec<Ident>,
    pub body: Exp,
}

/// The program grammar. Deliberately small and direct-style (not literally ANF — see the front-end
/// note in the crate docs) so the driver exercises genuine nested continuations: `if`/`app`/`let`
/// all need a suspended frame, which is what a CESK machine is for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExpKind {
    Lit(Lit),
    Var(Ident),
    Lambda {
        params: Vec<Ident>,
        body: Exp,
    },
    If {
        test: Exp,
        then: Exp,
        els: Exp,
    },
    App {
        rator: Exp,
        rands: Vec<Exp>,
    },
    Let {
        var: Ident,
        rhs: Exp,
        body: Exp,
    },
    /// Mutually recursive bindings. Every `rhs` must be a `Lambda` (enforced by the parser) so that
    /// evaluating a binding never observes another binding's not-yet-populated store cell.
    Letrec {
        bindings: Vec<(Ident, Exp)>,
        body: Exp,
    },
    Begin(Vec<Exp>),
    /// Forks a new thread of control evaluating `.0` from the current environment and store.
    Spawn(Exp),
    /// Blocks on the thread identified by the value `.0` evaluates to.
    Join(Exp),
    /// A behavior literal: the message-dispatch table passed to `create`/`become` and matched by
    /// `step_receive`.
    Receive(Vec<ReceiveClause>),
    /// Allocates a fresh actor running `behavior`, mailbox empty, idle until a message arrives.
    Create(Exp),
    Send {
        pid: Exp,
        message: String,
        args: Vec<Exp>,
    },
    /// Replaces the running actor's behavior for subsequent messages.
    Become(Exp),
}
