//! Left factorization.
//!
//! Alternatives whose sequences start with the same elements are merged
//! into `prefix , R_fac` with `R_fac` holding the alternation of the
//! remaining suffixes. Elements are compared by their rendered text, so
//! `('a' ; 'b')` and `('b' ; 'a')` count as different.

use log::debug;
use grammar::{Grammar, NonterminalId, RegexTree, Selection};
use crate::Map;

/// Passes over one rule before giving up on it.
pub const MAX_PASSES: usize = 10;

struct Alternative {
  keys: Vec<String>,
  elements: Vec<RegexTree>,
}

/// Factorize the rule of `nt` and the rules it spawns. Returns the number
/// of fresh nonterminals created.
pub fn factorize(grammar: &mut Grammar, nt: NonterminalId) -> usize {
  let mut pending = vec![nt];
  let mut created = 0;

  while let Some(nt) = pending.pop() {
    for pass in 0.. {
      if pass == MAX_PASSES {
        debug!(
          "factorization of {} stopped after {} passes",
          grammar.nonterminal_name(nt),
          MAX_PASSES);
        break;
      }

      let fresh = factorize_pass(grammar, nt);
      if fresh.is_empty() {
        break;
      }

      created += fresh.len();
      pending.extend(fresh);
    }
  }

  created
}

/// Factorize every rule in declaration order.
pub fn factorize_all(grammar: &mut Grammar) -> usize {
  let nts = grammar.nonterminals.ids().collect::<Vec<_>>();
  nts.into_iter().map(|nt| factorize(grammar, nt)).sum()
}

/// One pass: group alternatives by their first element, pull the longest
/// common prefix out of each group with two or more members.
fn factorize_pass(grammar: &mut Grammar, nt: NonterminalId) -> Vec<NonterminalId> {
  let rule = match grammar.rule(nt) {
    Some(rule) => rule,
    None => return vec![],
  };

  let total = rule.alternatives().len();
  let mut alts = Vec::<Alternative>::new();
  for alt in rule.alternatives() {
    let elements = alt.sequence();
    let keys = elements.iter()
      .map(|element| element.render(grammar, Selection::NONE, false))
      .collect::<Vec<_>>();

    // identical alternatives add nothing to the language
    if alts.iter().all(|other| other.keys != keys) {
      alts.push(Alternative {
        keys,
        elements: elements.into_iter().cloned().collect(),
      });
    }
  }

  let mut groups = Map::<String, Vec<usize>>::new();
  for (i, alt) in alts.iter().enumerate() {
    groups.entry(alt.keys[0].clone()).or_default().push(i);
  }

  if groups.values().all(|members| members.len() == 1) {
    if alts.len() < total {
      let deduped = alts.into_iter().filter_map(|alt| RegexTree::concatenation(alt.elements));
      if let Some(tree) = RegexTree::alternation(deduped) {
        grammar.set_rule(nt, tree);
      }
    }
    return vec![];
  }

  let name = grammar.nonterminal_name(nt).to_owned();
  let mut fresh = vec![];
  let mut new_alts = vec![];

  for members in groups.values() {
    if let [single] = members[..] {
      new_alts.extend(RegexTree::concatenation(alts[single].elements.iter().cloned()));
      continue;
    }

    let prefix_len = common_prefix_len(members.iter().map(|&i| alts[i].keys.as_slice()));
    let suffixes = members.iter()
      .map(|&i| {
        RegexTree::concatenation(alts[i].elements[prefix_len..].iter().cloned())
          .unwrap_or_else(RegexTree::epsilon)
      });

    let suffix_nt = grammar.fresh_nonterminal(&format!("{}_fac", name));
    debug!(
      "factorizing {} alternatives of {} sharing {} element(s) into {}",
      members.len(),
      name,
      prefix_len,
      grammar.nonterminal_name(suffix_nt));

    if let Some(tree) = RegexTree::alternation(suffixes) {
      grammar.set_rule(suffix_nt, tree);
    }

    let prefix = alts[members[0]].elements[..prefix_len].iter().cloned();
    new_alts.extend(RegexTree::concatenation(prefix)
      .map(|prefix| RegexTree::join(prefix, RegexTree::nonterminal(suffix_nt))));
    fresh.push(suffix_nt);
  }

  if let Some(tree) = RegexTree::alternation(new_alts) {
    grammar.set_rule(nt, tree);
  }

  fresh
}

fn common_prefix_len<'a>(mut keys: impl Iterator<Item=&'a [String]>) -> usize {
  let first = match keys.next() {
    Some(first) => first,
    None => return 0,
  };

  keys.fold(first.len(), |len, other| {
    first.iter()
      .zip(other)
      .take(len)
      .take_while(|(a, b)| a == b)
      .count()
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::LlTable;
  use grammar::recognize::accepts;
  use grammar::TerminalId;
  use pretty_assertions::assert_eq;
  use insta::assert_snapshot;

  fn word(grammar: &Grammar, text: &str) -> Vec<TerminalId> {
    text.chars()
      .map(|c| grammar.terminals.id(&c.to_string()).unwrap())
      .collect()
  }

  #[test]
  fn shared_terminal_prefix() {
    let mut grammar = grammar::build("S : 'a' , 'b' ; 'a' , 'c' .").unwrap();
    let s = grammar.start().unwrap();
    assert!(!LlTable::build(&grammar).is_ll1());

    assert_eq!(factorize(&mut grammar, s), 1);

    assert!(LlTable::build(&grammar).is_ll1());
    assert_snapshot!(grammar.to_text(), @r###"
    S : 'a' , S_fac .
    S_fac : 'b' ; 'c' .
    EOGram!
    "###);
  }

  #[test]
  fn nested_prefixes() {
    let mut grammar = grammar::build(
      "S : 'a' , 'b' , 'c' ; 'f' ; 'a' , 'b' , 'd' ; 'a' , 'e' .").unwrap();
    let before = grammar.clone();
    let s = grammar.start().unwrap();

    assert_eq!(factorize(&mut grammar, s), 2);
    assert!(LlTable::build(&grammar).is_ll1());
    assert_snapshot!(grammar.to_text(), @r###"
    S : 'a' , S_fac ; 'f' .
    S_fac : 'b' , S_fac_fac ; 'e' .
    S_fac_fac : 'c' ; 'd' .
    EOGram!
    "###);

    for text in ["abc", "abd", "ae", "f", "ab", "a", "abe", ""] {
      assert_eq!(
        accepts(&before, s, &word(&before, text)),
        accepts(&grammar, s, &word(&grammar, text)),
        "{:?}", text);
    }
  }

  #[test]
  fn whole_alternative_as_prefix() {
    let mut grammar = grammar::build("S : 'a' ; 'a' , 'b' , 'c' ; 'a' , 'b' .").unwrap();
    let s = grammar.start().unwrap();

    assert_eq!(factorize(&mut grammar, s), 2);
    assert_snapshot!(grammar.to_text(), @r###"
    S : 'a' , S_fac .
    S_fac : @ ; 'b' , S_fac_fac .
    S_fac_fac : 'c' ; @ .
    EOGram!
    "###);
  }

  #[test]
  fn duplicates_collapse() {
    let mut grammar = grammar::build("S : 'a' , B ; 'x' ; 'a' , B . B : 'b' .").unwrap();
    let s = grammar.start().unwrap();

    assert_eq!(factorize(&mut grammar, s), 0);
    assert_eq!(grammar.to_text(), "S : 'a' , B ; 'x' .\nB : 'b' .\nEOGram!\n");
  }

  #[test]
  fn compares_rendered_text() {
    let mut grammar = grammar::build(
      "S : ('a' ; 'b') , 'x' ; ('b' ; 'a') , 'y' .").unwrap();
    let before = grammar.to_text();

    assert_eq!(factorize_all(&mut grammar), 0);
    assert_eq!(grammar.to_text(), before);
  }

  #[test]
  fn missing_rule() {
    let mut grammar = grammar::build("S : A .").unwrap();
    let a = grammar.nonterminals.id("A").unwrap();

    assert_eq!(factorize(&mut grammar, a), 0);
  }
}
