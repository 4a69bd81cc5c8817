//! Rule trees: sequence / alternative / iteration over terminal, nonterminal
//! and semantic atoms.

use std::fmt;
use std::ops::BitOr;
use crate::{Grammar, Set};
use crate::symbols::*;

/// The right-hand side of one grammar rule.
///
/// `Iteration(l, r)` is written `l # r` and denotes `l (r l)*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegexTree {
  Terminal(TerminalId),
  Semantic(SemanticId),
  /// A reference to a nonterminal. When `open` is set the reference is a
  /// macro use and analyses see the referenced rule inlined.
  NonTerminal { id: NonterminalId, open: bool },
  Sequence(Box<RegexTree>, Box<RegexTree>),
  Alternative(Box<RegexTree>, Box<RegexTree>),
  Iteration(Box<RegexTree>, Box<RegexTree>),
}

/// Leaf kinds to highlight when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection(u8);

impl Selection {
  pub const NONE: Selection = Selection(0);
  pub const TERMINALS: Selection = Selection(1);
  pub const NONTERMINALS: Selection = Selection(2);
  pub const SEMANTICS: Selection = Selection(4);

  pub fn contains(&self, other: Selection) -> bool {
    self.0 & other.0 == other.0 && other.0 != 0
  }
}

impl BitOr for Selection {
  type Output = Selection;

  fn bitor(self, rhs: Selection) -> Selection {
    Selection(self.0 | rhs.0)
  }
}

const PREC_ALTERNATIVE: u8 = 0;
const PREC_SEQUENCE: u8 = 1;
const PREC_ITERATION: u8 = 2;
const PREC_ATOM: u8 = 3;

impl RegexTree {
  pub fn epsilon() -> Self {
    Self::Terminal(TerminalId::EPSILON)
  }

  pub fn nonterminal(id: NonterminalId) -> Self {
    Self::NonTerminal { id, open: false }
  }

  pub fn open(id: NonterminalId) -> Self {
    Self::NonTerminal { id, open: true }
  }

  pub fn seq(left: RegexTree, right: RegexTree) -> Self {
    Self::Sequence(Box::new(left), Box::new(right))
  }

  pub fn alt(left: RegexTree, right: RegexTree) -> Self {
    Self::Alternative(Box::new(left), Box::new(right))
  }

  pub fn iteration(left: RegexTree, right: RegexTree) -> Self {
    Self::Iteration(Box::new(left), Box::new(right))
  }

  /// Sequence of `left` and `right`, dropping an epsilon operand.
  pub fn join(left: RegexTree, right: RegexTree) -> Self {
    if left.is_epsilon() {
      right
    } else if right.is_epsilon() {
      left
    } else {
      Self::seq(left, right)
    }
  }

  /// Left-nested alternation of `trees`; `None` when empty.
  pub fn alternation(trees: impl IntoIterator<Item=RegexTree>) -> Option<Self> {
    trees.into_iter().reduce(Self::alt)
  }

  /// Left-nested sequence of `trees`; `None` when empty.
  pub fn concatenation(trees: impl IntoIterator<Item=RegexTree>) -> Option<Self> {
    trees.into_iter().reduce(Self::seq)
  }

  pub fn is_epsilon(&self) -> bool {
    matches!(self, Self::Terminal(t) if t.is_epsilon())
  }

  /// Cost metric: one per leaf.
  pub fn size(&self) -> usize {
    match self {
      Self::Terminal(_) | Self::Semantic(_) | Self::NonTerminal { .. } => 1,
      Self::Sequence(l, r) | Self::Alternative(l, r) | Self::Iteration(l, r) => {
        l.size() + r.size()
      }
    }
  }

  /// Top-level alternatives, left to right.
  pub fn alternatives(&self) -> Vec<&RegexTree> {
    let mut alts = vec![];
    self.collect_chain(&mut alts, &|tree| match tree {
      Self::Alternative(l, r) => Some((&**l, &**r)),
      _ => None,
    });
    alts
  }

  /// Top-level sequence elements, left to right.
  pub fn sequence(&self) -> Vec<&RegexTree> {
    let mut items = vec![];
    self.collect_chain(&mut items, &|tree| match tree {
      Self::Sequence(l, r) => Some((&**l, &**r)),
      _ => None,
    });
    items
  }

  fn collect_chain<'a, F>(&'a self, out: &mut Vec<&'a RegexTree>, split: &F)
    where F: Fn(&'a RegexTree) -> Option<(&'a RegexTree, &'a RegexTree)>
  {
    match split(self) {
      Some((l, r)) => {
        l.collect_chain(out, split);
        r.collect_chain(out, split);
      }
      None => out.push(self),
    }
  }

  /// Every nonterminal referenced by the tree, open or not, in order of
  /// first appearance.
  pub fn nonterminals(&self) -> Set<NonterminalId> {
    let mut set = Set::new();
    self.collect_nonterminals(&mut set);
    set
  }

  fn collect_nonterminals(&self, set: &mut Set<NonterminalId>) {
    match self {
      Self::NonTerminal { id, .. } => {
        set.insert(*id);
      }
      Self::Terminal(_) | Self::Semantic(_) => {}
      Self::Sequence(l, r) | Self::Alternative(l, r) | Self::Iteration(l, r) => {
        l.collect_nonterminals(set);
        r.collect_nonterminals(set);
      }
    }
  }

  /// Whether every nonterminal reference can be inlined: each one is open
  /// and its rule is itself fully openable.
  pub fn all_references_opened(&self, grammar: &Grammar) -> bool {
    self.check_opened(grammar, &mut vec![])
  }

  fn check_opened(&self, grammar: &Grammar, visiting: &mut Vec<NonterminalId>) -> bool {
    match self {
      Self::Terminal(_) | Self::Semantic(_) => true,
      Self::NonTerminal { open: false, .. } => false,
      Self::NonTerminal { id, open: true } => {
        if visiting.contains(id) {
          return true;
        }

        match grammar.rule(*id) {
          Some(rule) => {
            visiting.push(*id);
            let opened = rule.check_opened(grammar, visiting);
            visiting.pop();
            opened
          }
          None => false,
        }
      }
      Self::Sequence(l, r) | Self::Alternative(l, r) | Self::Iteration(l, r) => {
        l.check_opened(grammar, visiting) && r.check_opened(grammar, visiting)
      }
    }
  }

  /// Copy of the tree with every open reference replaced by the referenced
  /// rule. A reference reached again while its own rule is being inlined,
  /// or whose rule is absent, stays as a plain reference.
  pub fn expand_macros(&self, grammar: &Grammar) -> RegexTree {
    self.expand_with(grammar, &mut vec![])
  }

  fn expand_with(&self, grammar: &Grammar, stack: &mut Vec<NonterminalId>) -> RegexTree {
    match self {
      Self::NonTerminal { id, open: true } => {
        match grammar.rule(*id) {
          Some(rule) if !stack.contains(id) => {
            stack.push(*id);
            let tree = rule.expand_with(grammar, stack);
            stack.pop();
            tree
          }
          _ => Self::nonterminal(*id),
        }
      }
      Self::Terminal(_) | Self::Semantic(_) | Self::NonTerminal { .. } => self.clone(),
      Self::Sequence(l, r) => {
        Self::seq(l.expand_with(grammar, stack), r.expand_with(grammar, stack))
      }
      Self::Alternative(l, r) => {
        Self::alt(l.expand_with(grammar, stack), r.expand_with(grammar, stack))
      }
      Self::Iteration(l, r) => {
        Self::iteration(l.expand_with(grammar, stack), r.expand_with(grammar, stack))
      }
    }
  }

  fn precedence(&self) -> u8 {
    match self {
      Self::Alternative(..) => PREC_ALTERNATIVE,
      Self::Sequence(..) => PREC_SEQUENCE,
      Self::Iteration(..) => PREC_ITERATION,
      _ => PREC_ATOM,
    }
  }

  /// Concrete rule syntax. Leaves whose kind is in `selection` are wrapped
  /// in braces; `reverse` prints the children of every binary node right
  /// to left.
  pub fn render(&self, grammar: &Grammar, selection: Selection, reverse: bool) -> String {
    let mut buf = String::new();
    self.render_into(&mut buf, grammar, selection, reverse);
    buf
  }

  fn render_into(
    &self,
    buf: &mut String,
    grammar: &Grammar,
    selection: Selection,
    reverse: bool,
  ) {
    let (l, r, op, min_prec) = match self {
      Self::Terminal(t) => {
        return render_leaf(buf, selection.contains(Selection::TERMINALS), |buf| {
          render_terminal(buf, grammar, *t)
        });
      }
      Self::Semantic(s) => {
        return render_leaf(buf, selection.contains(Selection::SEMANTICS), |buf| {
          buf.push('$');
          buf.push_str(grammar.semantic_name(*s));
        });
      }
      Self::NonTerminal { id, open } => {
        return render_leaf(buf, selection.contains(Selection::NONTERMINALS), |buf| {
          if *open {
            buf.push('%');
          }
          buf.push_str(grammar.nonterminal_name(*id));
        });
      }
      Self::Alternative(l, r) => (l, r, " ; ", PREC_ALTERNATIVE),
      Self::Sequence(l, r) => (l, r, " , ", PREC_SEQUENCE),
      Self::Iteration(l, r) => (l, r, " # ", PREC_ATOM),
    };

    let (first, second) = if reverse { (r, l) } else { (l, r) };

    first.render_child(buf, grammar, selection, reverse, min_prec);
    buf.push_str(op);
    second.render_child(buf, grammar, selection, reverse, min_prec);
  }

  fn render_child(
    &self,
    buf: &mut String,
    grammar: &Grammar,
    selection: Selection,
    reverse: bool,
    min_prec: u8,
  ) {
    if self.precedence() < min_prec {
      buf.push('(');
      self.render_into(buf, grammar, selection, reverse);
      buf.push(')');
    } else {
      self.render_into(buf, grammar, selection, reverse);
    }
  }

  pub fn display<'a>(&'a self, grammar: &'a Grammar) -> TreeDisplay<'a> {
    TreeDisplay {
      tree: self,
      grammar,
    }
  }
}

fn render_leaf(buf: &mut String, selected: bool, f: impl FnOnce(&mut String)) {
  if selected {
    buf.push('{');
    f(buf);
    buf.push('}');
  } else {
    f(buf);
  }
}

fn render_terminal(buf: &mut String, grammar: &Grammar, t: TerminalId) {
  if t.is_epsilon() {
    buf.push('@');
    return;
  }

  let name = grammar.terminal_name(t);
  let quote = if name.contains('\'') && !name.contains('"') {
    '"'
  } else {
    '\''
  };

  buf.push(quote);
  for c in name.chars() {
    if c == quote || c == '\\' {
      buf.push('\\');
    }
    buf.push(c);
  }
  buf.push(quote);
}

pub struct TreeDisplay<'a> {
  tree: &'a RegexTree,
  grammar: &'a Grammar,
}

impl<'a> fmt::Display for TreeDisplay<'a> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(&self.tree.render(self.grammar, Selection::NONE, false))
  }
}
