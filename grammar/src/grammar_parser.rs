//! Reader for the textual rule language.
//!
//! The hand-written lexer feeds the LR parser generated from
//! `grammar.lalrpop`; the resulting records are then lowered into a
//! [`Grammar`], interning symbols in order of appearance.

pub mod lex;
pub mod ast;

use lalrpop_util::{lalrpop_mod, ParseError};
use thiserror::Error;
use lex::{Lexer, Token};
use ast::{Document, Expr};
use crate::{Grammar, RegexTree};

lalrpop_mod!(pub grammar, "/grammar_parser/grammar.rs");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarErrorKind {
  InvalidChar,
  UnclosedString,
  SyntaxError,
  DuplicateRule,
}

#[derive(Debug, Clone, Error)]
#[error("{message} at {}..{}", .span.0, .span.1)]
pub struct GrammarError {
  pub kind: GrammarErrorKind,
  pub span: (usize, usize),
  pub message: String,
}

impl GrammarError {
  fn syntax(message: String, start: usize, end: usize) -> Self {
    Self {
      kind: GrammarErrorKind::SyntaxError,
      span: (start, end),
      message,
    }
  }
}

impl<'a> From<ParseError<usize, Token<'a>, GrammarError>> for GrammarError {
  fn from(err: ParseError<usize, Token<'a>, GrammarError>) -> Self {
    match err {
      ParseError::InvalidToken { location } => {
        GrammarError::syntax("invalid token".to_owned(), location, location)
      }
      ParseError::UnrecognizedEof { location, expected } => {
        GrammarError::syntax(
          format!("expected {}, found EOF", expected.join(", ")),
          location,
          location)
      }
      ParseError::UnrecognizedToken { token, expected } => {
        GrammarError::syntax(
          format!("expected {}, found {}", expected.join(", "), token.1),
          token.0,
          token.2)
      }
      ParseError::ExtraToken { token } => {
        GrammarError::syntax(
          format!("unexpected {}", token.1),
          token.0,
          token.2)
      }
      ParseError::User { error } => error,
    }
  }
}

pub fn parse(input: &str) -> Result<Grammar, GrammarError> {
  let lexer = Lexer::new(input);
  let document = grammar::DocumentParser::new().parse(input, lexer)?;
  lower(document)
}

fn lower(document: Document) -> Result<Grammar, GrammarError> {
  let mut grammar = Grammar::new();

  for record in document {
    let nt = grammar.nonterminal(&record.name.1);

    if grammar.has_rule(nt) {
      return Err(GrammarError {
        kind: GrammarErrorKind::DuplicateRule,
        span: record.name.0,
        message: format!("duplicate rule {}", record.name.1),
      });
    }

    let tree = lower_expr(&mut grammar, record.body);
    grammar.set_rule(nt, tree);
  }

  Ok(grammar)
}

fn lower_expr(grammar: &mut Grammar, expr: Expr) -> RegexTree {
  match expr {
    Expr::Terminal(name) => RegexTree::Terminal(grammar.terminal(&name)),
    Expr::Nonterminal(name) => RegexTree::nonterminal(grammar.nonterminal(&name)),
    Expr::Semantic(name) => RegexTree::Semantic(grammar.semantic(&name)),
    Expr::Open(name) => {
      grammar.macros.insert(&name);
      RegexTree::open(grammar.nonterminal(&name))
    }
    Expr::Epsilon => RegexTree::epsilon(),
    Expr::Optional(e) => RegexTree::alt(RegexTree::epsilon(), lower_expr(grammar, *e)),
    Expr::Sequence(l, r) => {
      let l = lower_expr(grammar, *l);
      RegexTree::seq(l, lower_expr(grammar, *r))
    }
    Expr::Alternative(l, r) => {
      let l = lower_expr(grammar, *l);
      RegexTree::alt(l, lower_expr(grammar, *r))
    }
    Expr::Iteration(l, r) => {
      let l = lower_expr(grammar, *l);
      RegexTree::iteration(l, lower_expr(grammar, *r))
    }
  }
}

/// Strip the quotes of a string literal and resolve backslash escapes.
pub(crate) fn unquote(text: &str) -> String {
  let inner = &text[1..text.len() - 1];
  let mut buf = String::with_capacity(inner.len());
  let mut chars = inner.chars();

  while let Some(c) = chars.next() {
    if c == '\\' {
      if let Some(escaped) = chars.next() {
        buf.push(escaped);
      }
    } else {
      buf.push(c);
    }
  }

  buf
}
