//! Deterministic transition tables and their conversion to a regex-tree by
//! state elimination.

use thiserror::Error;
use crate::grammar_parser::unquote;
use crate::grammar_parser::lex::{Lexer, TokenKind};

pub use table::TransitionTable;
pub use reduce::{ArcGraph, to_regex};

mod table;
mod reduce;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
  #[error("invalid transition symbol {0:?}")]
  InvalidSymbol(String),
}

/// What a transition symbol stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SymbolKind {
  Epsilon,
  Terminal(String),
  Nonterminal(String),
}

/// `""` is an epsilon move, a quoted string a terminal, a bare identifier a
/// nonterminal. Anything else must lex as exactly one such token.
pub(crate) fn classify(symbol: &str) -> Result<SymbolKind, AutomatonError> {
  if symbol.is_empty() {
    return Ok(SymbolKind::Epsilon);
  }

  let mut tokens = Lexer::new(symbol);
  let token = match (tokens.next(), tokens.next()) {
    (Some(Ok((0, token, end))), None) if end == symbol.len() => token,
    _ => return Err(AutomatonError::InvalidSymbol(symbol.to_owned())),
  };

  match token.kind {
    TokenKind::String => {
      let name = unquote(token.text);
      Ok(if name.is_empty() {
        SymbolKind::Epsilon
      } else {
        SymbolKind::Terminal(name)
      })
    }
    TokenKind::Ident => Ok(SymbolKind::Nonterminal(token.text.to_owned())),
    _ => Err(AutomatonError::InvalidSymbol(symbol.to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn classify_symbols() {
    assert_eq!(classify(""), Ok(SymbolKind::Epsilon));
    assert_eq!(classify("''"), Ok(SymbolKind::Epsilon));
    assert_eq!(classify("'x'"), Ok(SymbolKind::Terminal("x".to_owned())));
    assert_eq!(classify(r#""it's""#), Ok(SymbolKind::Terminal("it's".to_owned())));
    assert_eq!(classify("Expr_1"), Ok(SymbolKind::Nonterminal("Expr_1".to_owned())));
    assert_eq!(classify("'x"), Err(AutomatonError::InvalidSymbol("'x".to_owned())));
    assert_eq!(classify("a-b"), Err(AutomatonError::InvalidSymbol("a-b".to_owned())));
  }

  #[test]
  fn malformed_quotes_are_rejected() {
    for symbol in [r"'\'", "'a'b'", "'a' ", " x", "@", "EOGram!"] {
      assert_eq!(
        classify(symbol),
        Err(AutomatonError::InvalidSymbol(symbol.to_owned())),
        "{:?}",
        symbol);
    }

    assert_eq!(classify(r"'a\'b'"), Ok(SymbolKind::Terminal("a'b".to_owned())));
  }
}
