//! Bounded membership check for a word against a grammar.
//!
//! Works on any grammar, left-recursive or ambiguous ones included: for each
//! nonterminal and start position it saturates the set of end positions the
//! nonterminal can derive to. Semantic actions match the empty string. Meant
//! for checking that a transform keeps the language on short words.

use std::collections::BTreeSet;
use crate::{Grammar, RegexTree, NonterminalId, TerminalId, SymbolId};

type Ends = BTreeSet<usize>;

struct Chart<'a> {
  grammar: &'a Grammar,
  word: &'a [TerminalId],
  /// `ends[nt][start]`
  ends: Vec<Vec<Ends>>,
}

impl<'a> Chart<'a> {
  fn new(grammar: &'a Grammar, word: &'a [TerminalId]) -> Self {
    Self {
      grammar,
      word,
      ends: vec![vec![Ends::new(); word.len() + 1]; grammar.nonterminals.len()],
    }
  }

  fn saturate(&mut self) {
    let grammar = self.grammar;

    loop {
      let mut changed = false;

      for (nt, rule) in grammar.rules() {
        for start in 0..=self.word.len() {
          let found = self.match_tree(rule, start);
          let slot = &mut self.ends[nt.index()][start];
          for end in found {
            changed |= slot.insert(end);
          }
        }
      }

      if !changed {
        break;
      }
    }
  }

  fn match_tree(&self, tree: &RegexTree, start: usize) -> Ends {
    match tree {
      RegexTree::Terminal(t) if t.is_epsilon() => Some(start).into_iter().collect(),
      RegexTree::Terminal(t) => {
        if self.word.get(start) == Some(t) {
          Some(start + 1).into_iter().collect()
        } else {
          Ends::new()
        }
      }
      RegexTree::Semantic(_) => Some(start).into_iter().collect(),
      RegexTree::NonTerminal { id, .. } => {
        self.ends.get(id.index())
          .map(|row| row[start].clone())
          .unwrap_or_default()
      }
      RegexTree::Sequence(l, r) => {
        self.match_tree(l, start)
          .into_iter()
          .flat_map(|mid| self.match_tree(r, mid))
          .collect()
      }
      RegexTree::Alternative(l, r) => {
        let mut ends = self.match_tree(l, start);
        ends.extend(self.match_tree(r, start));
        ends
      }
      RegexTree::Iteration(l, r) => {
        let mut ends = self.match_tree(l, start);
        let mut frontier = ends.iter().copied().collect::<Vec<_>>();

        while let Some(mid) = frontier.pop() {
          for after_r in self.match_tree(r, mid) {
            for end in self.match_tree(l, after_r) {
              if ends.insert(end) {
                frontier.push(end);
              }
            }
          }
        }

        ends
      }
    }
  }
}

/// Does `tree`, with nonterminals resolved against `grammar`, derive `word`?
pub fn recognizes(grammar: &Grammar, tree: &RegexTree, word: &[TerminalId]) -> bool {
  let mut chart = Chart::new(grammar, word);
  chart.saturate();
  chart.match_tree(tree, 0).contains(&word.len())
}

/// Does `nt` derive `word`? A nonterminal without a rule derives nothing.
pub fn accepts(grammar: &Grammar, nt: NonterminalId, word: &[TerminalId]) -> bool {
  recognizes(grammar, &RegexTree::nonterminal(nt), word)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn word(grammar: &Grammar, text: &str) -> Vec<TerminalId> {
    text.chars()
      .map(|c| grammar.terminals.id(&c.to_string()).unwrap())
      .collect()
  }

  #[test]
  fn left_recursive_grammar() {
    let grammar = crate::build("E : E , '+' , T ; T . T : 'x' ; '(' , E , ')' .").unwrap();
    let e = grammar.start().unwrap();

    assert!(accepts(&grammar, e, &word(&grammar, "x")));
    assert!(accepts(&grammar, e, &word(&grammar, "x+x+x")));
    assert!(accepts(&grammar, e, &word(&grammar, "(x+x)+x")));
    assert!(!accepts(&grammar, e, &word(&grammar, "x+")));
    assert!(!accepts(&grammar, e, &word(&grammar, "")));
  }

  #[test]
  fn iteration_repeats_separator() {
    let grammar = crate::build("L : 'a' # ',' .").unwrap();
    let l = grammar.start().unwrap();

    assert!(accepts(&grammar, l, &word(&grammar, "a")));
    assert!(accepts(&grammar, l, &word(&grammar, "a,a,a")));
    assert!(!accepts(&grammar, l, &word(&grammar, "a,")));
    assert!(!accepts(&grammar, l, &word(&grammar, "aa")));
  }

  #[test]
  fn epsilon_and_semantics_match_nothing() {
    let grammar = crate::build("S : $act , [ 'a' ] . U : U .").unwrap();

    assert!(accepts(&grammar, grammar.start().unwrap(), &[]));
    assert!(!accepts(&grammar, grammar.nonterminals.id("U").unwrap(), &[]));
  }
}
