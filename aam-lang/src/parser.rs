use std::rc::Rc;

use aam_core::SourcePos;

use crate::ast::{exp, Exp, ExpKind, FloatBits, Lit, ReceiveClause};

// PARSE ERROR
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected token `{found}` at {at}")]
    UnexpectedToken { found: String, at: SourcePos },
    #[error("malformed `{form}` at {at}")]
    MalformedForm { form: &'static str, at: SourcePos },
}

// TOKENIZER
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Atom(String),
    Str(String),
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    fn here(&self) -> SourcePos {
        SourcePos { line: self.line, column: self.column }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.src[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                },
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                },
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<(Token, SourcePos)>, ParseError> {
        self.skip_whitespace_and_comments();
        let at = self.here();
        match self.peek() {
            None => Ok(None),
            Some('(') => {
                self.advance();
                Ok(Some((Token::LParen, at)))
            },
            Some(')') => {
                self.advance();
                Ok(Some((Token::RParen, at)))
            },
            Some('"') => {
                self.advance();
                let mut s = String::new();
                loop {
                    match self.advance() {
                        None => return Err(ParseError::UnexpectedEof),
                        Some('"') => break,
                        Some('\\') => match self.advance() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(c) => s.push(c),
                            None => return Err(ParseError::UnexpectedEof),
                        },
                        Some(c) => s.push(c),
                    }
                }
                Ok(Some((Token::Str(s), at)))
            },
            Some(_) => {
                let mut s = String::new();
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == ';' {
                        break;
                    }
                    s.push(c);
                    self.advance();
                }
                Ok(Some((Token::Atom(s), at)))
            },
        }
    }
}

// S-EXPRESSION TREE
// ================================================================================================

enum Sexp {
    Atom(String, SourcePos),
    Str(String, SourcePos),
    List(Vec<Sexp>, SourcePos),
}

fn read_all(src: &str) -> Result<Vec<Sexp>, ParseError> {
    let mut lexer = Lexer::new(src);
    let mut forms = Vec::new();
    while let Some(form) = read_one(&mut lexer)? {
        forms.push(form);
    }
    Ok(forms)
}

fn read_one(lexer: &mut Lexer<'_>) -> Result<Option<Sexp>, ParseError> {
    let Some((tok, at)) = lexer.next_token()? else { return Ok(None) };
    Ok(Some(read_from(lexer, tok, at)?))
}

fn read_from(lexer: &mut Lexer<'_>, tok: Token, at: SourcePos) -> Result<Sexp, ParseError> {
    match tok {
        Token::Atom(s) => Ok(Sexp::Atom(s, at)),
        Token::Str(s) => Ok(Sexp::Str(s, at)),
        Token::RParen => Err(ParseError::UnexpectedToken { found: ")".to_string(), at }),
        Token::LParen => {
            let mut items = Vec::new();
            loop {
                let Some((tok, at2)) = lexer.next_token()? else { return Err(ParseError::UnexpectedEof) };
                if tok == Token::RParen {
                    break;
                }
                items.push(read_from(lexer, tok, at2)?);
            }
            Ok(Sexp::List(items, at))
        },
    }
}

impl Sexp {
    fn pos(&self) -> SourcePos {
        match self {
            Sexp::Atom(_, p) | Sexp::Str(_, p) | Sexp::List(_, p) => *p,
        }
    }
}

// PARSER: S-EXPRESSION -> AST
// ================================================================================================

/// Parses a whole program: every top-level form is folded into one `begin`, so `(define ...)`-style
/// scripts with several top-level expressions behave the way a REPL session would.
pub fn parse(source: &str) -> Result<Exp, ParseError> {
    let forms = read_all(source)?;
    let exprs = forms.iter().map(parse_exp).collect::<Result<Vec<_>, _>>()?;
    Ok(match exprs.len() {
        1 => exprs.into_iter().next().unwrap(),
        _ => exp(ExpKind::Begin(exprs)),
    })
}

fn ident_of(s: &str) -> Rc<str> {
    Rc::from(s)
}

fn parse_exp(sexp: &Sexp) -> Result<Exp, ParseError> {
    match sexp {
        Sexp::Str(s, _) => Ok(exp(ExpKind::Lit(Lit::Str(s.clone())))),
        Sexp::Atom(s, at) => parse_atom(s, *at),
        Sexp::List(items, at) => parse_list(items, *at),
    }
}

fn parse_atom(s: &str, at: SourcePos) -> Result<Exp, ParseError> {
    if s == "#t" {
        return Ok(exp(ExpKind::Lit(Lit::Bool(true))));
    }
    if s == "#f" {
        return Ok(exp(ExpKind::Lit(Lit::Bool(false))));
    }
    if s == "nil" {
        return Ok(exp(ExpKind::Lit(Lit::Nil)));
    }
    if let Ok(i) = s.parse::<i64>() {
        return Ok(exp(ExpKind::Lit(Lit::Int(i))));
    }
    if let Ok(f) = s.parse::<f64>() {
        return Ok(exp(ExpKind::Lit(Lit::Float(FloatBits::new(f)))));
    }
    if let Some(sym) = s.strip_prefix('\'') {
        return Ok(exp(ExpKind::Lit(Lit::Symbol(sym.to_string()))));
    }
    if s.len() == 3 && s.starts_with("#\\") {
        return Ok(exp(ExpKind::Lit(Lit::Char(s.chars().nth(2).unwrap()))));
    }
    let _ = at;
    Ok(exp(ExpKind::Var(ident_of(s))))
}

fn parse_ident(sexp: &Sexp) -> Result<Rc<str>, ParseError> {
    match sexp {
        Sexp::Atom(s, _) => Ok(ident_of(s)),
        other => Err(ParseError::UnexpectedToken { found: "non-identifier".to_string(), at: other.pos() }),
    }
}

fn parse_params(sexp: &Sexp) -> Result<Vec<Rc<str>>, ParseError> {
    match sexp {
        Sexp::List(items, _) => items.iter().map(parse_ident).collect(),
        other => Err(ParseError::UnexpectedToken { found: "non-parameter-list".to_string(), at: other.pos() }),
    }
}

fn head_keyword(items: &[Sexp]) -> Option<&str> {
    match items.first() {
        Some(Sexp::Atom(s, _)) => Some(s.as_str()),
        _ => None,
    }
}

fn parse_list(items: &[Sexp], at: SourcePos) -> Result<Exp, ParseError> {
    if items.is_empty() {
        return Ok(exp(ExpKind::Lit(Lit::Nil)));
    }
    match head_keyword(items) {
        Some("lambda") => {
            if items.len() != 3 {
                return Err(ParseError::MalformedForm { form: "lambda", at });
            }
            let params = parse_params(&items[1])?;
            let body = parse_exp(&items[2])?;
            Ok(exp(ExpKind::Lambda { params, body }))
        },
        Some("if") => {
            if items.len() != 4 {
                return Err(ParseError::MalformedForm { form: "if", at });
            }
            Ok(exp(ExpKind::If {
                test: parse_exp(&items[1])?,
                then: parse_exp(&items[2])?,
                els: parse_exp(&items[3])?,
            }))
        },
        Some("let") => {
            if items.len() != 3 {
                return Err(ParseError::MalformedForm { form: "let", at });
            }
            let Sexp::List(bindings, bindings_at) = &items[1] else {
                return Err(ParseError::MalformedForm { form: "let", at: items[1].pos() });
            };
            if bindings.len() != 1 {
                return Err(ParseError::MalformedForm { form: "let", at: *bindings_at });
            }
            let Sexp::List(binding, bind_at) = &bindings[0] else {
                return Err(ParseError::MalformedForm { form: "let", at: bindings[0].pos() });
            };
            if binding.len() != 2 {
                return Err(ParseError::MalformedForm { form: "let", at: *bind_at });
            }
            let var = parse_ident(&binding[0])?;
            let rhs = parse_exp(&binding[1])?;
            let body = parse_exp(&items[2])?;
            Ok(exp(ExpKind::Let { var, rhs, body }))
        },
        Some("letrec") => {
            if items.len() != 3 {
                return Err(ParseError::MalformedForm { form: "letrec", at });
            }
            let Sexp::List(raw_bindings, _) = &items[1] else {
                return Err(ParseError::MalformedForm { form: "letrec", at: items[1].pos() });
            };
            let mut bindings = Vec::with_capacity(raw_bindings.len());
            for b in raw_bindings {
                let Sexp::List(pair, pair_at) = b else {
                    return Err(ParseError::MalformedForm { form: "letrec", at: b.pos() });
                };
                if pair.len() != 2 {
                    return Err(ParseError::MalformedForm { form: "letrec", at: *pair_at });
                }
                let var = parse_ident(&pair[0])?;
                let rhs = parse_exp(&pair[1])?;
                if !matches!(&*rhs, ExpKind::Lambda { .. }) {
                    return Err(ParseError::MalformedForm { form: "letrec", at: *pair_at });
                }
                bindings.push((var, rhs));
            }
            let body = parse_exp(&items[2])?;
            Ok(exp(ExpKind::Letrec { bindings, body }))
        },
        Some("begin") => {
            let exprs = items[1..].iter().map(parse_exp).collect::<Result<Vec<_>, _>>()?;
            Ok(exp(ExpKind::Begin(exprs)))
        },
        Some("spawn") => {
            if items.len() != 2 {
                return Err(ParseError::MalformedForm { form: "spawn", at });
            }
            Ok(exp(ExpKind::Spawn(parse_exp(&items[1])?)))
        },
        Some("join") => {
            if items.len() != 2 {
                return Err(ParseError::MalformedForm { form: "join", at });
            }
            Ok(exp(ExpKind::Join(parse_exp(&items[1])?)))
        },
        Some("receive") => {
            let mut clauses = Vec::with_capacity(items.len() - 1);
            for c in &items[1..] {
                let Sexp::List(parts, c_at) = c else {
                    return Err(ParseError::MalformedForm { form: "receive", at: c.pos() });
                };
                if parts.len() != 3 {
                    return Err(ParseError::MalformedForm { form: "receive", at: *c_at });
                }
                let message = match &parts[0] {
                    Sexp::Atom(s, _) => s.clone(),
                    other => return Err(ParseError::MalformedForm { form: "receive", at: other.pos() }),
                };
                let params = parse_params(&parts[1])?;
                let body = parse_exp(&parts[2])?;
                clauses.push(ReceiveClause { message, params, body });
            }
            Ok(exp(ExpKind::Receive(clauses)))
        },
        Some("create") => {
            if items.len() != 2 {
                return Err(ParseError::MalformedForm { form: "create", at });
            }
            Ok(exp(ExpKind::Create(parse_exp(&items[1])?)))
        },
        Some("become") => {
            if items.len() != 2 {
                return Err(ParseError::MalformedForm { form: "become", at });
            }
            Ok(exp(ExpKind::Become(parse_exp(&items[1])?)))
        },
        Some("send") => {
            if items.len() < 3 {
                return Err(ParseError::MalformedForm { form: "send", at });
            }
            let pid = parse_exp(&items[1])?;
            let message = match &items[2] {
                Sexp::Atom(s, _) => s.clone(),
                other => return Err(ParseError::MalformedForm { form: "send", at: other.pos() }),
            };
            let args = items[3..].iter().map(parse_exp).collect::<Result<Vec<_>, _>>()?;
            Ok(exp(ExpKind::Send { pid, message, args }))
        },
        _ => {
            let rator = parse_exp(&items[0])?;
            let rands = items[1..].iter().map(parse_exp).collect::<Result<Vec<_>, _>>()?;
            Ok(exp(ExpKind::App { rator, rands }))
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_arithmetic_application() {
        let e = parse("(+ 1 2)").unwrap();
        match &*e {
            ExpKind::App { rands, .. } => assert_eq!(rands.len(), 2),
            other => panic!("expected App, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_let_and_if() {
        let e = parse("(let ((x 1)) (if x 2 3))").unwrap();
        match &*e {
            ExpKind::Let { var, .. } => assert_eq!(&**var, "x"),
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn rejects_letrec_with_non_lambda_binding() {
        let err = parse("(letrec ((x 1)) x)").unwrap_err();
        assert!(matches!(err, ParseError::MalformedForm { form: "letrec", .. }));
    }

    #[test]
    fn parses_multiple_top_level_forms_as_begin() {
        let e = parse("1 2 3").unwrap();
        match &*e {
            ExpKind::Begin(exprs) => assert_eq!(exprs.len(), 3),
            other => panic!("expected Begin, got {other:?}"),
        }
    }

    #[test]
    fn parses_receive_and_create() {
        let e = parse("(create (receive (\"ping\" (x) x)))").unwrap();
        match &*e {
            ExpKind::Create(behavior) => assert!(matches!(&**behavior, ExpKind::Receive(_))),
            other => panic!("expected Create, got {other:?}"),
        }
    }

    /// Every fixed-arity actor form (`spawn`/`join`/`create`/`become`/`send`) rejects the wrong
    /// number of arguments with a `MalformedForm` naming the offending form, not just one of them.
    #[rstest]
    #[case::spawn_wrong_arity("(spawn)", "spawn")]
    #[case::join_wrong_arity("(join 1 2)", "join")]
    #[case::create_wrong_arity("(create)", "create")]
    #[case::become_wrong_arity("(become 1 2)", "become")]
    #[case::send_too_few_args("(send)", "send")]
    fn rejects_malformed_fixed_arity_forms(#[case] source: &str, #[case] form: &str) {
        let err = parse(source).unwrap_err();
        match err {
            ParseError::MalformedForm { form: got, .. } => assert_eq!(got, form),
            other => panic!("expected MalformedForm({form}), got {other:?}"),
        }
    }
}
