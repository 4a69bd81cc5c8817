//! Useless-symbol removal: unproductive rules first, then unreachable ones.

use bitvec::prelude::*;
use log::debug;
use grammar::{Grammar, NonterminalId, RegexTree, SymbolId};
use crate::fixed_point;

fn is_set(flags: &BitSlice, nt: NonterminalId) -> bool {
  nt.index() < flags.len() && flags[nt.index()]
}

fn tree_productive(tree: &RegexTree, productive: &BitSlice) -> bool {
  match tree {
    RegexTree::Terminal(_) | RegexTree::Semantic(_) => true,
    RegexTree::NonTerminal { id, .. } => is_set(productive, *id),
    RegexTree::Alternative(l, r) => {
      tree_productive(l, productive) || tree_productive(r, productive)
    }
    RegexTree::Sequence(l, r) => {
      tree_productive(l, productive) && tree_productive(r, productive)
    }
    RegexTree::Iteration(..) => true,
  }
}

/// Nonterminals that derive some string of terminals, by id.
pub fn productive(grammar: &Grammar) -> BitVec {
  let mut productive = bitvec![0; grammar.nonterminals.len()];

  fixed_point("productive", || {
    let mut changed = false;

    for (nt, rule) in grammar.rules() {
      if !productive[nt.index()] && tree_productive(rule, &productive) {
        productive.set(nt.index(), true);
        changed = true;
      }
    }

    changed
  });

  productive
}

/// Productive nonterminals reachable from the first productive rule, by id.
pub fn reachable(grammar: &Grammar, productive: &BitSlice) -> BitVec {
  let mut reached = bitvec![0; grammar.nonterminals.len()];

  let start = grammar.rules()
    .map(|(nt, _)| nt)
    .find(|&nt| is_set(productive, nt));

  let mut worklist = vec![];
  if let Some(start) = start {
    reached.set(start.index(), true);
    worklist.push(start);
  }

  while let Some(nt) = worklist.pop() {
    let rule = match grammar.rule(nt) {
      Some(rule) => rule,
      None => continue,
    };

    for next in rule.nonterminals() {
      if is_set(productive, next) && !reached[next.index()] {
        reached.set(next.index(), true);
        worklist.push(next);
      }
    }
  }

  reached
}

/// Clear the rules of unproductive, then of unreachable nonterminals.
/// Returns the cleared nonterminals in that order.
pub fn remove_useless(grammar: &mut Grammar) -> Vec<NonterminalId> {
  let productive = productive(grammar);
  let mut removed = clear_unmarked(grammar, &productive);

  let reached = reachable(grammar, &productive);
  removed.extend(clear_unmarked(grammar, &reached));

  debug!("removed {} useless rules", removed.len());
  removed
}

fn clear_unmarked(grammar: &mut Grammar, keep: &BitSlice) -> Vec<NonterminalId> {
  let doomed = grammar.rules()
    .map(|(nt, _)| nt)
    .filter(|&nt| !is_set(keep, nt))
    .collect::<Vec<_>>();

  for &nt in &doomed {
    debug!("clearing rule of {}", grammar.nonterminal_name(nt));
    grammar.take_rule(nt);
  }

  doomed
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn names(grammar: &Grammar, nts: &[NonterminalId]) -> Vec<String> {
    nts.iter().map(|&nt| grammar.nonterminal_name(nt).to_owned()).collect()
  }

  #[test]
  fn unreachable_rule() {
    let mut grammar = grammar::build("S : A . A : 'a' . B : 'b' .").unwrap();
    let removed = remove_useless(&mut grammar);

    assert_eq!(names(&grammar, &removed), vec!["B"]);
    assert_eq!(grammar.to_text(), "S : A .\nA : 'a' .\nEOGram!\n");
  }

  #[test]
  fn unproductive_before_unreachable() {
    // C is only reachable through the unproductive D
    let mut grammar = grammar::build(
      "S : 'x' ; D . D : D , C . C : 'c' . E : @ .").unwrap();
    let removed = remove_useless(&mut grammar);

    assert_eq!(names(&grammar, &removed), vec!["D", "C", "E"]);
    assert_eq!(grammar.to_text(), "S : 'x' ; D .\nEOGram!\n");
  }

  #[test]
  fn first_surviving_rule_is_the_root() {
    let mut grammar = grammar::build("S : S , 'a' . T : U . U : 'u' .").unwrap();
    let removed = remove_useless(&mut grammar);

    assert_eq!(names(&grammar, &removed), vec!["S"]);
    assert_eq!(grammar.to_text(), "T : U .\nU : 'u' .\nEOGram!\n");
  }

  #[test]
  fn iteration_and_semantics_are_productive() {
    let grammar = grammar::build("S : X # 'a' . T : $act . X : X .").unwrap();
    let flags = productive(&grammar);
    let flag = |name| is_set(&flags, grammar.nonterminals.id(name).unwrap());

    assert!(flag("S"));
    assert!(flag("T"));
    assert!(!flag("X"));
  }

  #[test]
  fn second_run_removes_nothing() {
    let mut grammar = grammar::build("S : A ; B . A : A . B : 'b' . C : 'c' .").unwrap();
    let first = remove_useless(&mut grammar);
    let text = grammar.to_text();

    assert_eq!(names(&grammar, &first), vec!["A", "C"]);
    assert!(remove_useless(&mut grammar).is_empty());
    assert_eq!(grammar.to_text(), text);
  }
}
