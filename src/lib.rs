//! Load a grammar from rule text, rewrite it towards LL(1) and report on
//! the result.

use std::str::FromStr;
use log::info;
use thiserror::Error;
use grammar::{Grammar, GrammarError};
use ll::LlTable;

pub mod report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
  LeftRecursion,
  Factorize,
  Useless,
}

impl Transform {
  /// The order `all` expands to.
  pub const ALL: [Transform; 3] = [
    Transform::LeftRecursion,
    Transform::Factorize,
    Transform::Useless,
  ];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transform {0:?}, expected left-recursion, factorize, useless or all")]
pub struct UnknownTransform(pub String);

impl FromStr for Transform {
  type Err = UnknownTransform;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "left-recursion" | "lr" => Ok(Transform::LeftRecursion),
      "factorize" | "lf" => Ok(Transform::Factorize),
      "useless" => Ok(Transform::Useless),
      _ => Err(UnknownTransform(s.to_owned())),
    }
  }
}

/// Parse the values of repeated `--transform` options, expanding `all`.
pub fn parse_transforms<S: AsRef<str>>(names: &[S]) -> Result<Vec<Transform>, UnknownTransform> {
  let mut transforms = vec![];

  for name in names {
    let name = name.as_ref();
    if name.eq_ignore_ascii_case("all") {
      transforms.extend_from_slice(&Transform::ALL);
    } else {
      transforms.push(name.parse()?);
    }
  }

  Ok(transforms)
}

#[derive(Debug, Clone, Default)]
pub struct Config {
  pub transforms: Vec<Transform>,
  /// Print the LL(1) table.
  pub table: bool,
  /// Print NULLABLE/FIRST/FOLLOW.
  pub first_follow: bool,
}

pub struct Output {
  pub grammar: Grammar,
  pub table: LlTable,
  pub report: String,
}

pub fn apply(grammar: &mut Grammar, transform: Transform) {
  match transform {
    Transform::LeftRecursion => {
      let tails = ll::eliminate_all_left_recursion(grammar);
      info!("left recursion: {} rules rewritten", tails.len());
    }
    Transform::Factorize => {
      let created = ll::factorize_all(grammar);
      info!("factorization: {} rules created", created);
    }
    Transform::Useless => {
      let removed = ll::remove_useless(grammar);
      info!("useless symbols: {} rules removed", removed.len());
    }
  }
}

/// Build the grammar in `input`, apply the configured transforms in order
/// and collect the requested reports plus the LL(1) conflicts.
pub fn run(input: &str, config: &Config) -> Result<Output, GrammarError> {
  let mut grammar = grammar::build(input)?;

  for &transform in &config.transforms {
    apply(&mut grammar, transform);
  }

  let ffn = ll::ffn::compute(&grammar);
  let table = LlTable::with_ffn(&grammar, &ffn);

  let mut report = String::new();
  if config.first_follow {
    report.push_str(&report::first_follow(&grammar, &ffn));
  }
  if config.table {
    report.push_str(&table.display(&grammar));
  }
  report.push_str(&report::conflicts(&table));

  Ok(Output {
    grammar,
    table,
    report,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn transform_names() {
    assert_eq!(
      parse_transforms(&["lr", "useless"]),
      Ok(vec![Transform::LeftRecursion, Transform::Useless]));
    assert_eq!(parse_transforms(&["ALL"]), Ok(Transform::ALL.to_vec()));
    assert_eq!(
      parse_transforms(&["factorise"]),
      Err(UnknownTransform("factorise".to_owned())));
  }
}
