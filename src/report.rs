use std::fmt::Write;
use std::path::Path;
use itertools::Itertools;
use grammar::{Grammar, GrammarError, GrammarErrorKind};
use ll::{Ffn, LlTable};

pub fn report_grammar_error(
  path: impl AsRef<Path>,
  input: impl AsRef<str>,
  err: &GrammarError
) -> String {
  let input = input.as_ref();
  let start = err.span.0.min(input.len());
  let lines = input[..start].split('\n').collect::<Vec<_>>();
  let line = lines.len();
  let col = lines.last().map_or(0, |last| last.chars().count()) + 1;
  let error = match err.kind {
    GrammarErrorKind::InvalidChar => "invalid character",
    GrammarErrorKind::UnclosedString => "unclosed string",
    GrammarErrorKind::SyntaxError => "syntax error",
    GrammarErrorKind::DuplicateRule => "duplicate rule",
  };

  let mut buf = String::new();
  writeln!(&mut buf,
    "{} at {}:{}:{}",
    error,
    path.as_ref().display(),
    line,
    col
  ).unwrap();
  writeln!(&mut buf,
    "message: {}", err.message
  ).unwrap();

  buf
}

/// NULLABLE, FIRST and FOLLOW of every nonterminal with a rule.
pub fn first_follow(grammar: &Grammar, ffn: &Ffn) -> String {
  let mut buf = String::new();

  for (nt, _) in grammar.rules() {
    writeln!(&mut buf,
      "{}{}\n  FIRST:  {{{}}}\n  FOLLOW: {{{}}}",
      grammar.nonterminal_name(nt),
      if ffn.nullable(nt) { " (nullable)" } else { "" },
      ffn.first(nt).names(grammar).join(", "),
      ffn.follow(nt).names(grammar).join(", "),
    ).unwrap();
  }

  buf
}

pub fn conflicts(table: &LlTable) -> String {
  if table.is_ll1() {
    return "grammar is LL(1)\n".to_owned();
  }

  let mut buf = String::new();

  writeln!(&mut buf,
    "grammar is not LL(1), {} conflict(s):\n",
    table.conflicts().len()
  ).unwrap();

  writeln!(&mut buf,
    "{}",
    table.conflicts().iter().map(|conflict| format!("  {}", conflict)).join("\n")
  ).unwrap();

  buf
}
