//! Property tests for the grammar rewrites over small random grammars.
//!
//! Grammars use the nonterminals `S`, `A`, `B`, `C`, `D` and the terminals
//! `'a'` and `'b'`; languages are compared on every word up to length 4.

use proptest::prelude::*;
use grammar::recognize::accepts;
use grammar::{Grammar, TerminalId};
use ll::{
  eliminate_all_left_recursion,
  factorize_all,
  has_direct_left_recursion,
  remove_useless,
  LlTable,
  Lookahead,
};

const NONTERMINALS: [&str; 5] = ["S", "A", "B", "C", "D"];

fn atom() -> impl Strategy<Value = String> {
  prop_oneof![
    Just("'a'".to_owned()),
    Just("'b'".to_owned()),
    Just("@".to_owned()),
    (0..NONTERMINALS.len()).prop_map(|i| NONTERMINALS[i].to_owned()),
  ]
}

fn alternative() -> impl Strategy<Value = String> {
  prop::collection::vec(atom(), 1..4).prop_map(|atoms| atoms.join(" , "))
}

fn rule() -> impl Strategy<Value = Option<String>> {
  prop::option::of(
    prop::collection::vec(alternative(), 1..4).prop_map(|alts| alts.join(" ; ")))
}

fn grammar_text() -> impl Strategy<Value = String> {
  prop::collection::vec(rule(), NONTERMINALS.len()).prop_map(|rules| {
    NONTERMINALS.iter()
      .zip(rules)
      .filter_map(|(name, rule)| rule.map(|rule| format!("{} : {} .\n", name, rule)))
      .collect()
  })
}

/// Rules whose alternatives are plain strings of `'a'` and `'b'`.
fn terminal_grammar_text() -> impl Strategy<Value = String> {
  let terminal = prop_oneof![Just("'a'"), Just("'b'")];
  let alternative = prop::collection::vec(terminal, 1..4).prop_map(|atoms| atoms.join(" , "));
  let rule = prop::collection::vec(alternative, 1..5).prop_map(|alts| alts.join(" ; "));

  prop::collection::vec(rule, 1..3).prop_map(|rules| {
    rules.iter()
      .zip(NONTERMINALS.iter())
      .map(|(rule, name)| format!("{} : {} .\n", name, rule))
      .collect()
  })
}

fn words(grammar: &Grammar, max_len: usize) -> Vec<Vec<TerminalId>> {
  let alphabet = ["a", "b"].iter()
    .filter_map(|name| grammar.terminals.id(name))
    .collect::<Vec<_>>();

  let mut words = vec![vec![]];
  let mut last = vec![vec![]];
  for _ in 0..max_len {
    last = last.iter()
      .flat_map(|word: &Vec<TerminalId>| {
        alphabet.iter().map(move |&t| {
          let mut word = word.clone();
          word.push(t);
          word
        })
      })
      .collect();
    words.extend(last.iter().cloned());
  }

  words
}

fn same_language(before: &Grammar, after: &Grammar) -> Result<(), TestCaseError> {
  let start = match before.start() {
    Some(start) => start,
    None => return Ok(()),
  };

  for word in words(before, 4) {
    prop_assert_eq!(
      accepts(before, start, &word),
      accepts(after, start, &word),
      "word {:?}\nbefore:\n{}after:\n{}",
      word,
      before.to_text(),
      after.to_text());
  }

  Ok(())
}

proptest! {
  #[test]
  fn useless_removal_is_idempotent(text in grammar_text()) {
    let mut grammar = grammar::build(&text).unwrap();
    remove_useless(&mut grammar);
    let once = grammar.to_text();

    prop_assert!(remove_useless(&mut grammar).is_empty());
    prop_assert_eq!(grammar.to_text(), once);
  }

  #[test]
  fn useless_removal_keeps_start_language(text in grammar_text()) {
    let before = grammar::build(&text).unwrap();
    let mut after = before.clone();
    remove_useless(&mut after);

    // the root of the reachability pass is the first productive rule
    if let Some(start) = before.start() {
      if after.has_rule(start) {
        same_language(&before, &after)?;
      }
    }
  }

  #[test]
  fn left_recursion_elimination(text in grammar_text()) {
    let before = grammar::build(&text).unwrap();
    let mut after = before.clone();

    for (nt, tail) in eliminate_all_left_recursion(&mut after) {
      prop_assert!(!has_direct_left_recursion(&after, nt));
      prop_assert!(!has_direct_left_recursion(&after, tail));
    }

    same_language(&before, &after)?;
  }

  #[test]
  fn factorization_keeps_language(text in grammar_text()) {
    let before = grammar::build(&text).unwrap();
    let mut after = before.clone();
    factorize_all(&mut after);

    same_language(&before, &after)?;
  }

  #[test]
  fn factorization_separates_first_sets(text in terminal_grammar_text()) {
    let mut grammar = grammar::build(&text).unwrap();
    factorize_all(&mut grammar);
    let ffn = ll::ffn::compute(&grammar);

    for (_, rule) in grammar.rules() {
      let firsts = rule.alternatives()
        .into_iter()
        .map(|alt| ffn.first_of(alt))
        .collect::<Vec<_>>();

      for (i, first) in firsts.iter().enumerate() {
        for other in &firsts[i + 1..] {
          prop_assert!(first.is_disjoint(other), "{}", grammar.to_text());
        }
      }
    }

    prop_assert!(LlTable::build(&grammar).is_ll1(), "{}", grammar.to_text());
  }

  #[test]
  fn first_covers_derivations(text in grammar_text()) {
    let grammar = grammar::build(&text).unwrap();
    let ffn = ll::ffn::compute(&grammar);

    for (nt, _) in grammar.rules() {
      for word in words(&grammar, 3) {
        if !accepts(&grammar, nt, &word) {
          continue;
        }

        match word.first() {
          Some(&t) => prop_assert!(ffn.first(nt).contains(Lookahead::Terminal(t))),
          None => prop_assert!(ffn.nullable(nt)),
        }
      }
    }
  }
}
