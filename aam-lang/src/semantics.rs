use std::rc::Rc;

use aam_core::{
    AbstractValue, Action, ActionSet, AddressPolicy, BinaryOperator as Bop, Effect, Message,
    SemanticError, Semantics, Store, Timestamp, UnaryOperator as Uop,
};

use crate::ast::{Exp, ExpKind, Ident, Lit};
use crate::frame::Frame;
use crate::ids::{Closure, Env, LangAddr, Pid, PrimOp, Tid};

type Sto<V, Time> = Store<LangAddr<Time>, V>;

// SEMANTICS
// ================================================================================================

/// The language plug-in for this crate's small Scheme-like grammar. Generic over the abstract value
/// lattice `V`, the timestamp type `Time` and the address-allocation policy `AP` — a machine wires
/// these three together (e.g. `TypeSet` + `CallString<Exp>` + `ValueSensitiveAddress`) and gets a
/// complete [`aam_core::Semantics`] implementation for free.
///
/// `t` arrives already advanced for the current step — this type never ticks a timestamp itself,
/// only feeds it to [`AddressPolicy`] as an allocation coordinate. Advancing `t` between states is
/// the driver's job (`aam-machine`), since [`aam_core::Action`] carries no timestamp field of its
/// own.
pub struct LangSemantics<V, Time, AP> {
    addresses: AP,
    _marker: std::marker::PhantomData<fn() -> (V, Time)>,
}

impl<V, Time, AP> LangSemantics<V, Time, AP> {
    pub fn new(addresses: AP) -> Self {
        Self { addresses, _marker: std::marker::PhantomData }
    }
}

impl<V, Time, AP: Clone> Clone for LangSemantics<V, Time, AP> {
    fn clone(&self) -> Self {
        Self { addresses: self.addresses.clone(), _marker: std::marker::PhantomData }
    }
}

/// Bound alias for "a lattice this front-end can run on": every injection/extractor
/// [`LangSemantics`] needs, with the address/closure/primitive/identity shapes pinned to this
/// crate's concrete types.
pub trait LangValue<Time>:
    AbstractValue<Addr = LangAddr<Time>, Closure = Closure<Time>, PrimOp = PrimOp, Tid = Tid, Pid = Pid>
{
}

impl<V, Time> LangValue<Time> for V where
    V: AbstractValue<Addr = LangAddr<Time>, Closure = Closure<Time>, PrimOp = PrimOp, Tid = Tid, Pid = Pid>
{
}

impl<V, Time, AP> LangSemantics<V, Time, AP>
where
    V: LangValue<Time>,
    Time: Timestamp,
    AP: AddressPolicy<Ident = Ident, Exp = Exp, Time = Time, Addr = LangAddr<Time>> + Clone,
{
    fn lit_value(&self, lit: &Lit) -> V {
        match lit {
            Lit::Int(i) => V::from_int(*i),
            Lit::Float(f) => V::from_float(f.value()),
            Lit::Bool(b) => V::from_bool(*b),
            Lit::Char(c) => V::from_char(*c),
            Lit::Str(s) => V::from_string(s.clone()),
            Lit::Symbol(s) => V::from_symbol(s.clone()),
            Lit::Nil => V::nil(),
        }
    }

    fn apply_closure(
        &self,
        call_exp: &Exp,
        closure: &Closure<Time>,
        args: &[V],
        store: &Sto<V, Time>,
        t: &Time,
    ) -> Action<Self> {
        if closure.params.len() != args.len() {
            return Action::Error {
                err: SemanticError::ArityError { expected: closure.params.len(), got: args.len() },
                effects: Vec::new(),
            };
        }
        let mut env = closure.env.clone();
        let mut store = store.clone();
        let mut effects = Vec::new();
        for (param, arg) in closure.params.iter().zip(args.iter()) {
            let addr = self.addresses.variable(param, arg, t);
            env = env.extend(param.clone(), addr.clone());
            store = store.extend(addr.clone(), arg.clone());
            effects.push(Effect::WriteVar(addr));
        }
        Action::StepIn {
            call_exp: call_exp.clone(),
            closure: closure.clone(),
            body: closure.body.clone(),
            env,
            store,
            args: args.to_vec(),
            effects,
        }
    }

    fn apply_primitive(
        &self,
        call_exp: &Exp,
        prim: PrimOp,
        args: &[V],
        store: &Sto<V, Time>,
        t: &Time,
    ) -> Action<Self> {
        let arity_error = |expected: usize| Action::Error {
            err: SemanticError::ArityError { expected, got: args.len() },
            effects: Vec::new(),
        };
        match prim {
            PrimOp::Add | PrimOp::Sub | PrimOp::Mul | PrimOp::Div | PrimOp::Lt | PrimOp::Le
            | PrimOp::NumEq => {
                if args.len() != 2 {
                    return arity_error(2);
                }
                let op = match prim {
                    PrimOp::Add => Bop::Add,
                    PrimOp::Sub => Bop::Sub,
                    PrimOp::Mul => Bop::Mul,
                    PrimOp::Div => Bop::Div,
                    PrimOp::Lt => Bop::Lt,
                    PrimOp::Le => Bop::Le,
                    PrimOp::NumEq => Bop::NumEq,
                    _ => unreachable!(),
                };
                Action::ReachedValue {
                    value: args[0].binary_op(op, &args[1]),
                    store: store.clone(),
                    effects: Vec::new(),
                }
            },
            PrimOp::Not | PrimOp::IsZero => {
                if args.len() != 1 {
                    return arity_error(1);
                }
                let op = match prim {
                    PrimOp::Not => Uop::Not,
                    PrimOp::IsZero => Uop::IsZero,
                    _ => unreachable!(),
                };
                Action::ReachedValue { value: args[0].unary_op(op), store: store.clone(), effects: Vec::new() }
            },
            PrimOp::Cons => {
                if args.len() != 2 {
                    return arity_error(2);
                }
                let car_addr = self.addresses.cell(call_exp, t);
                let cdr_ident: Ident = Rc::from("%cdr-cell");
                let cdr_addr = self.addresses.variable(&cdr_ident, call_exp, t);
                let store = store
                    .extend(car_addr.clone(), args[0].clone())
                    .extend(cdr_addr.clone(), args[1].clone());
                Action::ReachedValue {
                    value: V::from_pair(car_addr.clone(), cdr_addr.clone()),
                    store,
                    effects: vec![Effect::WriteCar(car_addr), Effect::WriteCdr(cdr_addr)],
                }
            },
            PrimOp::Car | PrimOp::Cdr => {
                if args.len() != 1 {
                    return arity_error(1);
                }
                let addrs = if matches!(prim, PrimOp::Car) { args[0].car() } else { args[0].cdr() };
                if addrs.is_empty() {
                    return Action::Error {
                        err: SemanticError::TypeError { expected: "pair", got: "non-pair" },
                        effects: Vec::new(),
                    };
                }
                let mut value = V::bottom();
                let mut effects = Vec::new();
                for a in &addrs {
                    value = value.join(&store.lookup(a));
                    effects.push(if matches!(prim, PrimOp::Car) {
                        Effect::ReadCar(a.clone())
                    } else {
                        Effect::ReadCdr(a.clone())
                    });
                }
                Action::ReachedValue { value, store: store.clone(), effects }
            },
        }
    }

    fn apply(
        &self,
        call_exp: &Exp,
        f: &V,
        args: &[V],
        store: &Sto<V, Time>,
        t: &Time,
    ) -> ActionSet<Self> {
        let mut actions: Vec<Action<Self>> = Vec::new();
        for closure in f.closures() {
            actions.push(self.apply_closure(call_exp, &closure, args, store, t));
        }
        for prim in f.primitives() {
            actions.push(self.apply_primitive(call_exp, prim, args, store, t));
        }
        if actions.is_empty() {
            actions.push(Action::Error { err: SemanticError::OperatorNotApplicable, effects: Vec::new() });
        }
        actions
    }

    fn finish_send(
        &self,
        pid_value: &V,
        message: &str,
        args: &[V],
        store: &Sto<V, Time>,
    ) -> ActionSet<Self> {
        let pids = pid_value.pids();
        if pids.is_empty() {
            return vec![Action::Error {
                err: SemanticError::TypeError { expected: "actor-id", got: "non-actor" },
                effects: Vec::new(),
            }];
        }
        pids.into_iter()
            .map(|pid| Action::Send {
                pid,
                message: Message { name: message.to_string(), args: args.to_vec() },
                continuation: Box::new(Action::ReachedValue {
                    value: V::nil(),
                    store: store.clone(),
                    effects: Vec::new(),
                }),
                effects: Vec::new(),
            })
            .collect()
    }
}

impl<V, Time, AP> Semantics for LangSemantics<V, Time, AP>
where
    V: LangValue<Time>,
    Time: Timestamp,
    AP: AddressPolicy<Ident = Ident, Exp = Exp, Time = Time, Addr = LangAddr<Time>> + Clone,
{
    type Exp = Exp;
    type Ident = Ident;
    type Value = V;
    type Time = Time;
    type Frame = Frame<V, Time>;

    fn step_eval(&self, e: &Exp, env: &Env<Time>, store: &Sto<V, Time>, t: &Time) -> ActionSet<Self> {
        match &**e {
            ExpKind::Lit(lit) => {
                vec![Action::ReachedValue { value: self.lit_value(lit), store: store.clone(), effects: Vec::new() }]
            },
            ExpKind::Var(id) => match env.lookup(id) {
                Some(addr) => vec![Action::ReachedValue {
                    value: store.lookup(addr),
                    store: store.clone(),
                    effects: vec![Effect::ReadVar(addr.clone())],
                }],
                None => {
                    vec![Action::Error { err: SemanticError::UnboundVariable(id.to_string()), effects: Vec::new() }]
                },
            },
            ExpKind::Lambda { params, body } => vec![Action::ReachedValue {
                value: V::from_closure(Closure { params: params.clone(), body: body.clone(), env: env.clone() }),
                store: store.clone(),
                effects: Vec::new(),
            }],
            ExpKind::If { test, then, els } => vec![Action::Push {
                frame: Frame::If { then: then.clone(), els: els.clone(), env: env.clone() },
                exp: test.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: Vec::new(),
            }],
            ExpKind::App { rator, rands } => vec![Action::Push {
                frame: Frame::AppRator { call_exp: e.clone(), rands: rands.clone(), env: env.clone() },
                exp: rator.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: Vec::new(),
            }],
            ExpKind::Let { var, rhs, body } => vec![Action::Push {
                frame: Frame::Let { var: var.clone(), body: body.clone(), env: env.clone() },
                exp: rhs.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: Vec::new(),
            }],
            ExpKind::Letrec { bindings, body } => {
                let addrs: Vec<_> =
                    bindings.iter().map(|(id, _)| self.addresses.variable(id, id, t)).collect();
                let env2 = env.extend_many(
                    bindings.iter().zip(addrs.iter()).map(|((id, _), a)| (id.clone(), a.clone())),
                );
                let mut store2 = store.clone();
                let mut effects = Vec::new();
                for ((_, rhs), addr) in bindings.iter().zip(addrs.iter()) {
                    let value = match &**rhs {
                        ExpKind::Lambda { params, body } => V::from_closure(Closure {
                            params: params.clone(),
                            body: body.clone(),
                            env: env2.clone(),
                        }),
                        _ => {
                            return vec![Action::Error {
                                err: SemanticError::NotSupported(
                                    "letrec bindings must be lambda expressions",
                                ),
                                effects: Vec::new(),
                            }]
                        },
                    };
                    store2 = store2.extend(addr.clone(), value);
                    effects.push(Effect::WriteVar(addr.clone()));
                }
                vec![Action::Eval { exp: body.clone(), env: env2, store: store2, effects }]
            },
            ExpKind::Begin(exprs) => {
                if exprs.is_empty() {
                    vec![Action::ReachedValue { value: V::nil(), store: store.clone(), effects: Vec::new() }]
                } else if exprs.len() == 1 {
                    vec![Action::Eval {
                        exp: exprs[0].clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                } else {
                    vec![Action::Push {
                        frame: Frame::Begin { remaining: exprs[1..].to_vec(), env: env.clone() },
                        exp: exprs[0].clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                }
            },
            ExpKind::Spawn(inner) => {
                let tid = Tid(inner.clone());
                vec![Action::Spawn {
                    tid: tid.clone(),
                    exp: inner.clone(),
                    env: env.clone(),
                    store: store.clone(),
                    continuation: Box::new(Action::ReachedValue {
                        value: V::from_thread(tid),
                        store: store.clone(),
                        effects: Vec::new(),
                    }),
                    effects: Vec::new(),
                }]
            },
            ExpKind::Join(inner) => vec![Action::Push {
                frame: Frame::Join,
                exp: inner.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: Vec::new(),
            }],
            ExpKind::Receive(_) => vec![Action::Error {
                err: SemanticError::NotSupported("a receive expression is not a value"),
                effects: Vec::new(),
            }],
            ExpKind::Create(behavior) => {
                if !matches!(&**behavior, ExpKind::Receive(_)) {
                    return vec![Action::Error {
                        err: SemanticError::NotSupported("create expects a literal receive expression"),
                        effects: Vec::new(),
                    }];
                }
                let pid = Pid::fresh(e, t);
                vec![Action::Create {
                    pid: pid.clone(),
                    behavior: behavior.clone(),
                    env: env.clone(),
                    continuation: Box::new(Action::ReachedValue {
                        value: V::from_actor(pid),
                        store: store.clone(),
                        effects: Vec::new(),
                    }),
                    effects: Vec::new(),
                }]
            },
            ExpKind::Send { pid, message, args } => vec![Action::Push {
                frame: Frame::SendPid { message: message.clone(), args: args.clone(), env: env.clone() },
                exp: pid.clone(),
                env: env.clone(),
                store: store.clone(),
                effects: Vec::new(),
            }],
            ExpKind::Become(behavior) => {
                if !matches!(&**behavior, ExpKind::Receive(_)) {
                    return vec![Action::Error {
                        err: SemanticError::NotSupported("become expects a literal receive expression"),
                        effects: Vec::new(),
                    }];
                }
                vec![Action::Become { behavior: behavior.clone(), effects: Vec::new() }]
            },
        }
    }

    fn step_kont(&self, v: &V, frame: &Self::Frame, store: &Sto<V, Time>, t: &Time) -> ActionSet<Self> {
        match frame {
            Frame::If { then, els, env } => {
                let mut actions = Vec::new();
                if v.is_true() {
                    actions.push(Action::Eval {
                        exp: then.clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    });
                }
                if v.is_false() {
                    actions.push(Action::Eval {
                        exp: els.clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    });
                }
                if actions.is_empty() {
                    actions.push(Action::Error {
                        err: SemanticError::TypeError { expected: "boolean-like", got: "neither true nor false" },
                        effects: Vec::new(),
                    });
                }
                actions
            },
            Frame::AppRator { call_exp, rands, env } => {
                if rands.is_empty() {
                    self.apply(call_exp, v, &[], store, t)
                } else {
                    let (first, rest) = rands.split_first().expect("checked non-empty above");
                    vec![Action::Push {
                        frame: Frame::AppRands {
                            call_exp: call_exp.clone(),
                            f: v.clone(),
                            evaluated: Vec::new(),
                            remaining: rest.to_vec(),
                            env: env.clone(),
                        },
                        exp: first.clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                }
            },
            Frame::AppRands { call_exp, f, evaluated, remaining, env } => {
                let mut evaluated = evaluated.clone();
                evaluated.push(v.clone());
                if remaining.is_empty() {
                    self.apply(call_exp, f, &evaluated, store, t)
                } else {
                    let (first, rest) = remaining.split_first().expect("checked non-empty above");
                    vec![Action::Push {
                        frame: Frame::AppRands {
                            call_exp: call_exp.clone(),
                            f: f.clone(),
                            evaluated,
                            remaining: rest.to_vec(),
                            env: env.clone(),
                        },
                        exp: first.clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                }
            },
            Frame::Let { var, body, env } => {
                let addr = self.addresses.variable(var, v, t);
                let store2 = store.extend(addr.clone(), v.clone());
                let env2 = env.extend(var.clone(), addr.clone());
                vec![Action::Eval {
                    exp: body.clone(),
                    env: env2,
                    store: store2,
                    effects: vec![Effect::WriteVar(addr)],
                }]
            },
            Frame::Begin { remaining, env } => {
                if remaining.is_empty() {
                    vec![Action::ReachedValue { value: v.clone(), store: store.clone(), effects: Vec::new() }]
                } else if remaining.len() == 1 {
                    vec![Action::Eval {
                        exp: remaining[0].clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                } else {
                    vec![Action::Push {
                        frame: Frame::Begin { remaining: remaining[1..].to_vec(), env: env.clone() },
                        exp: remaining[0].clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                }
            },
            Frame::Join => {
                let tids = v.tids();
                if tids.is_empty() {
                    vec![Action::Error {
                        err: SemanticError::TypeError { expected: "thread-id", got: "non-thread" },
                        effects: Vec::new(),
                    }]
                } else {
                    tids.into_iter()
                        .map(|tid| Action::Join { tid, store: store.clone(), effects: Vec::new() })
                        .collect()
                }
            },
            Frame::SendPid { message, args, env } => {
                if args.is_empty() {
                    self.finish_send(v, message, &[], store)
                } else {
                    let (first, rest) = args.split_first().expect("checked non-empty above");
                    vec![Action::Push {
                        frame: Frame::SendArgs {
                            pid: v.clone(),
                            message: message.clone(),
                            evaluated: Vec::new(),
                            remaining: rest.to_vec(),
                            env: env.clone(),
                        },
                        exp: first.clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                }
            },
            Frame::SendArgs { pid, message, evaluated, remaining, env } => {
                let mut evaluated = evaluated.clone();
                evaluated.push(v.clone());
                if remaining.is_empty() {
                    self.finish_send(pid, message, &evaluated, store)
                } else {
                    let (first, rest) = remaining.split_first().expect("checked non-empty above");
                    vec![Action::Push {
                        frame: Frame::SendArgs {
                            pid: pid.clone(),
                            message: message.clone(),
                            evaluated,
                            remaining: rest.to_vec(),
                            env: env.clone(),
                        },
                        exp: first.clone(),
                        env: env.clone(),
                        store: store.clone(),
                        effects: Vec::new(),
                    }]
                }
            },
        }
    }

    fn step_receive(
        &self,
        self_pid: &Pid,
        message: &str,
        args: &[V],
        behavior: &Exp,
        env: &Env<Time>,
        store: &Sto<V, Time>,
        t: &Time,
    ) -> ActionSet<Self> {
        let clauses = match &**behavior {
            ExpKind::Receive(clauses) => clauses,
            _ => {
                return vec![Action::Error {
                    err: SemanticError::NotSupported("behavior is not a receive expression"),
                    effects: Vec::new(),
                }]
            },
        };
        let Some(clause) = clauses.iter().find(|c| c.message == message) else {
            return vec![Action::Error {
                err: SemanticError::MessageNotSupported(message.to_string()),
                effects: Vec::new(),
            }];
        };
        if clause.params.len() != args.len() {
            return vec![Action::Error {
                err: SemanticError::ArityError { expected: clause.params.len(), got: args.len() },
                effects: Vec::new(),
            }];
        }
        let self_ident: Ident = Rc::from("self");
        let self_addr = self.addresses.variable(&self_ident, self_pid, t);
        let mut env2 = env.extend(self_ident, self_addr.clone());
        let mut store2 = store.extend(self_addr.clone(), V::from_actor(self_pid.clone()));
        let mut effects = vec![Effect::WriteVar(self_addr)];
        for (param, arg) in clause.params.iter().zip(args.iter()) {
            let addr = self.addresses.variable(param, arg, t);
            env2 = env2.extend(param.clone(), addr.clone());
            store2 = store2.extend(addr.clone(), arg.clone());
            effects.push(Effect::WriteVar(addr));
        }
        vec![Action::Eval { exp: clause.body.clone(), env: env2, store: store2, effects }]
    }
}
