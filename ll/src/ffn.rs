//! compute NULLABLE, FIRST, and FOLLOW sets.
//!
//! All three are fixed points over the macro-expanded rules of every
//! nonterminal. A semantic action derives the empty string; an iteration
//! `l # r` counts as nullable and takes its FIRST set from `l` alone.

use std::fmt;
use bit_set::BitSet;
use bitvec::prelude::*;
use grammar::{Grammar, NonterminalId, RegexTree, Selection, SymbolId, TerminalId};
use crate::fixed_point;

/// A lookahead symbol: a real terminal or the end of input (`$`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookahead {
  End,
  Terminal(TerminalId),
}

impl Lookahead {
  fn slot(self) -> usize {
    match self {
      Lookahead::End => 0,
      Lookahead::Terminal(t) => t.index() + 1,
    }
  }

  fn from_slot(slot: usize) -> Self {
    match slot {
      0 => Lookahead::End,
      _ => Lookahead::Terminal(TerminalId::from_index(slot - 1)),
    }
  }

  /// `$` or the quoted terminal name.
  pub fn name(self, grammar: &Grammar) -> String {
    match self {
      Lookahead::End => "$".to_owned(),
      Lookahead::Terminal(t) => RegexTree::Terminal(t).render(grammar, Selection::NONE, false),
    }
  }
}

/// Set of lookaheads, one bit per terminal plus slot 0 for `$`.
#[derive(Clone, Default)]
pub struct LookaheadSet(BitSet);

impl LookaheadSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, lookahead: Lookahead) -> bool {
    self.0.insert(lookahead.slot())
  }

  pub fn contains(&self, lookahead: Lookahead) -> bool {
    self.0.contains(lookahead.slot())
  }

  /// Add every member of `other`; true if anything was new.
  pub fn union_with(&mut self, other: &LookaheadSet) -> bool {
    let before = self.0.len();
    self.0.union_with(&other.0);
    self.0.len() != before
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_disjoint(&self, other: &LookaheadSet) -> bool {
    self.0.is_disjoint(&other.0)
  }

  /// Members in id order, `$` first.
  pub fn iter(&self) -> impl Iterator<Item=Lookahead> + '_ {
    self.0.iter().map(Lookahead::from_slot)
  }

  pub fn names(&self, grammar: &Grammar) -> Vec<String> {
    self.iter().map(|lookahead| lookahead.name(grammar)).collect()
  }
}

impl PartialEq for LookaheadSet {
  fn eq(&self, other: &Self) -> bool {
    self.iter().eq(other.iter())
  }
}

impl Eq for LookaheadSet {}

impl fmt::Debug for LookaheadSet {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

impl FromIterator<Lookahead> for LookaheadSet {
  fn from_iter<T: IntoIterator<Item=Lookahead>>(iter: T) -> Self {
    let mut set = LookaheadSet::new();
    for lookahead in iter {
      set.insert(lookahead);
    }
    set
  }
}

/// NULLABLE, FIRST and FOLLOW of every nonterminal, indexed by id.
#[derive(Debug, Clone)]
pub struct Ffn {
  nullable: BitVec,
  first: Vec<LookaheadSet>,
  follow: Vec<LookaheadSet>,
  empty: LookaheadSet,
}

pub fn compute(grammar: &Grammar) -> Ffn {
  let rules = grammar.nonterminals.ids()
    .filter_map(|nt| grammar.expanded_rule(nt).map(|rule| (nt, rule)))
    .collect::<Vec<_>>();
  let count = grammar.nonterminals.len();

  let nullable = compute_nullable(&rules, count);
  let first = compute_first(&rules, &nullable, count);
  let follow = compute_follow(grammar.start(), &rules, &nullable, &first, count);

  Ffn {
    nullable,
    first,
    follow,
    empty: LookaheadSet::new(),
  }
}

impl Ffn {
  pub fn nullable(&self, nt: NonterminalId) -> bool {
    is_set(&self.nullable, nt)
  }

  pub fn first(&self, nt: NonterminalId) -> &LookaheadSet {
    self.first.get(nt.index()).unwrap_or(&self.empty)
  }

  pub fn follow(&self, nt: NonterminalId) -> &LookaheadSet {
    self.follow.get(nt.index()).unwrap_or(&self.empty)
  }

  /// NULLABLE of an arbitrary tree, using the converged nonterminal sets.
  pub fn is_nullable(&self, tree: &RegexTree) -> bool {
    tree_nullable(tree, &self.nullable)
  }

  /// FIRST of an arbitrary tree, using the converged nonterminal sets.
  pub fn first_of(&self, tree: &RegexTree) -> LookaheadSet {
    let mut set = LookaheadSet::new();
    tree_first(tree, &self.nullable, &self.first, &mut set);
    set
  }
}

fn is_set(flags: &BitSlice, nt: NonterminalId) -> bool {
  nt.index() < flags.len() && flags[nt.index()]
}

fn tree_nullable(tree: &RegexTree, nullable: &BitSlice) -> bool {
  match tree {
    RegexTree::Terminal(t) => t.is_epsilon(),
    RegexTree::Semantic(_) => true,
    RegexTree::NonTerminal { id, .. } => is_set(nullable, *id),
    RegexTree::Sequence(l, r) => tree_nullable(l, nullable) && tree_nullable(r, nullable),
    RegexTree::Alternative(l, r) => tree_nullable(l, nullable) || tree_nullable(r, nullable),
    RegexTree::Iteration(..) => true,
  }
}

fn tree_first(
  tree: &RegexTree,
  nullable: &BitSlice,
  first: &[LookaheadSet],
  out: &mut LookaheadSet,
) {
  match tree {
    RegexTree::Terminal(t) => {
      if !t.is_epsilon() {
        out.insert(Lookahead::Terminal(*t));
      }
    }
    RegexTree::Semantic(_) => {}
    RegexTree::NonTerminal { id, .. } => {
      if let Some(nt_first) = first.get(id.index()) {
        out.union_with(nt_first);
      }
    }
    RegexTree::Sequence(l, r) => {
      tree_first(l, nullable, first, out);
      if tree_nullable(l, nullable) {
        tree_first(r, nullable, first, out);
      }
    }
    RegexTree::Alternative(l, r) => {
      tree_first(l, nullable, first, out);
      tree_first(r, nullable, first, out);
    }
    RegexTree::Iteration(l, _) => {
      tree_first(l, nullable, first, out);
    }
  }
}

fn compute_nullable(rules: &[(NonterminalId, RegexTree)], count: usize) -> BitVec {
  let mut nullable = bitvec![0; count];

  fixed_point("NULLABLE", || {
    let mut changed = false;

    for (nt, rule) in rules {
      if !nullable[nt.index()] && tree_nullable(rule, &nullable) {
        nullable.set(nt.index(), true);
        changed = true;
      }
    }

    changed
  });

  nullable
}

fn compute_first(
  rules: &[(NonterminalId, RegexTree)],
  nullable: &BitSlice,
  count: usize,
) -> Vec<LookaheadSet> {
  let mut first = vec![LookaheadSet::new(); count];

  fixed_point("FIRST", || {
    let mut changed = false;

    for (nt, rule) in rules {
      let mut nt_first = LookaheadSet::new();
      tree_first(rule, nullable, &first, &mut nt_first);
      changed |= first[nt.index()].union_with(&nt_first);
    }

    changed
  });

  first
}

fn compute_follow(
  start: Option<NonterminalId>,
  rules: &[(NonterminalId, RegexTree)],
  nullable: &BitSlice,
  first: &[LookaheadSet],
  count: usize,
) -> Vec<LookaheadSet> {
  let mut follow = vec![LookaheadSet::new(); count];

  if let Some(start) = start {
    follow[start.index()].insert(Lookahead::End);
  }

  let walker = FollowWalk { nullable, first };

  fixed_point("FOLLOW", || {
    let mut changed = false;

    for (nt, rule) in rules {
      let context = follow[nt.index()].clone();
      changed |= walker.walk(rule, &context, &mut follow);
    }

    changed
  });

  follow
}

/// Pushes "what may follow this subtree" down to every nonterminal leaf.
struct FollowWalk<'a> {
  nullable: &'a BitSlice,
  first: &'a [LookaheadSet],
}

impl<'a> FollowWalk<'a> {
  fn first_of(&self, tree: &RegexTree) -> LookaheadSet {
    let mut set = LookaheadSet::new();
    tree_first(tree, self.nullable, self.first, &mut set);
    set
  }

  fn walk(&self, tree: &RegexTree, context: &LookaheadSet, follow: &mut [LookaheadSet]) -> bool {
    match tree {
      RegexTree::Terminal(_) | RegexTree::Semantic(_) => false,
      RegexTree::NonTerminal { id, .. } => {
        match follow.get_mut(id.index()) {
          Some(nt_follow) => nt_follow.union_with(context),
          None => false,
        }
      }
      RegexTree::Alternative(l, r) => {
        self.walk(l, context, follow) | self.walk(r, context, follow)
      }
      RegexTree::Sequence(l, r) => {
        let mut left_context = self.first_of(r);
        if tree_nullable(r, self.nullable) {
          left_context.union_with(context);
        }

        self.walk(l, &left_context, follow) | self.walk(r, context, follow)
      }
      RegexTree::Iteration(l, r) => {
        let first_l = self.first_of(l);
        let first_r = self.first_of(r);

        // l is followed by the exit, or by r and then l again
        let mut left_context = context.clone();
        left_context.union_with(&first_r);
        if tree_nullable(r, self.nullable) {
          left_context.union_with(&first_l);
        }

        // r is always followed by another l
        let mut right_context = first_l;
        if tree_nullable(l, self.nullable) {
          right_context.union_with(context);
          right_context.union_with(&first_r);
        }

        self.walk(l, &left_context, follow) | self.walk(r, &right_context, follow)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn names(grammar: &Grammar, set: &LookaheadSet) -> Vec<String> {
    set.names(grammar)
  }

  fn nt(grammar: &Grammar, name: &str) -> NonterminalId {
    grammar.nonterminals.id(name).unwrap()
  }

  #[test]
  fn nullable_prefix_exposes_next_terminal() {
    let grammar = grammar::build("S : A , 'b' . A : @ .").unwrap();
    let ffn = compute(&grammar);
    let b = grammar.terminals.id("b").unwrap();

    assert!(ffn.nullable(nt(&grammar, "A")));
    assert!(!ffn.nullable(nt(&grammar, "S")));
    assert!(ffn.first(nt(&grammar, "S")).contains(Lookahead::Terminal(b)));
    assert!(ffn.first(nt(&grammar, "A")).is_empty());
    assert_eq!(names(&grammar, ffn.follow(nt(&grammar, "A"))), vec!["'b'"]);
  }

  #[test]
  fn expression_grammar() {
    let grammar = grammar::build(r#"
S : E .
E : T , E1 .
E1 : '+' , T , E1 ; @ .
T : F , T1 .
T1 : '*' , F , T1 ; @ .
F : 'n' ; '(' , E , ')' .
    "#).unwrap();
    let ffn = compute(&grammar);

    let first = |name| names(&grammar, ffn.first(nt(&grammar, name)));
    let follow = |name| names(&grammar, ffn.follow(nt(&grammar, name)));

    assert_eq!(first("E"), vec!["'n'", "'('"]);
    assert_eq!(first("E1"), vec!["'+'"]);
    assert_eq!(first("T1"), vec!["'*'"]);
    assert_eq!(follow("E"), vec!["$", "')'"]);
    assert_eq!(follow("E1"), vec!["$", "')'"]);
    assert_eq!(follow("T"), vec!["$", "'+'", "')'"]);
    assert_eq!(follow("F"), vec!["$", "'+'", "'*'", "')'"]);
  }

  #[test]
  fn semantic_actions_are_transparent() {
    let grammar = grammar::build("S : $enter , A , $leave , 'x' . A : 'a' ; $none .").unwrap();
    let ffn = compute(&grammar);

    assert!(ffn.nullable(nt(&grammar, "A")));
    assert_eq!(names(&grammar, ffn.first(nt(&grammar, "S"))), vec!["'x'", "'a'"]);
    assert_eq!(names(&grammar, ffn.follow(nt(&grammar, "A"))), vec!["'x'"]);
  }

  #[test]
  fn iteration_contexts() {
    let grammar = grammar::build("S : A # B , 'z' . A : 'a' . B : 'b' .").unwrap();
    let ffn = compute(&grammar);

    // the iteration itself counts as nullable, so 'z' is a first symbol too
    assert_eq!(names(&grammar, ffn.first(nt(&grammar, "S"))), vec!["'z'", "'a'"]);
    assert_eq!(names(&grammar, ffn.follow(nt(&grammar, "A"))), vec!["'z'", "'b'"]);
    assert_eq!(names(&grammar, ffn.follow(nt(&grammar, "B"))), vec!["'a'"]);
  }

  #[test]
  fn open_references_are_inlined() {
    let grammar = grammar::build("S : %M , 'y' . M : N . N : 'n' .").unwrap();
    let ffn = compute(&grammar);

    assert_eq!(names(&grammar, ffn.first(nt(&grammar, "S"))), vec!["'n'"]);
    assert_eq!(names(&grammar, ffn.follow(nt(&grammar, "N"))), vec!["'y'"]);
    assert!(ffn.follow(nt(&grammar, "M")).is_empty());
  }

  #[test]
  fn left_recursion_converges() {
    let grammar = grammar::build("E : E , '+' , 'n' ; 'n' .").unwrap();
    let ffn = compute(&grammar);

    assert_eq!(names(&grammar, ffn.first(nt(&grammar, "E"))), vec!["'n'"]);
    assert_eq!(names(&grammar, ffn.follow(nt(&grammar, "E"))), vec!["$", "'+'"]);
  }

  #[test]
  fn first_of_subtree() {
    let grammar = grammar::build("S : [ 'a' ] , 'b' ; 'c' .").unwrap();
    let ffn = compute(&grammar);
    let rule = grammar.rule(nt(&grammar, "S")).unwrap();
    let alts = rule.alternatives();

    assert_eq!(names(&grammar, &ffn.first_of(alts[0])), vec!["'a'", "'b'"]);
    assert!(!ffn.is_nullable(alts[0]));
    assert_eq!(
      ffn.first_of(alts[1]).iter().collect::<Vec<_>>(),
      vec![Lookahead::Terminal(grammar.terminals.id("c").unwrap())]);
  }
}
