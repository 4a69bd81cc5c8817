//! State elimination.
//!
//! Every intermediate state is removed in turn, rerouting each pair of
//! in/out arcs around it and folding its self-loop into an iteration
//! (Arden's lemma: `X = A X ; B` gives `X = A* B`). The order of removal
//! only changes the size of the result, so states are picked by a cost
//! estimate of the arcs their removal creates.

use std::mem;
use indexmap::map::Entry;
use log::{debug, trace};
use crate::{Grammar, Map, RegexTree};
use super::{classify, AutomatonError, SymbolKind, TransitionTable};

const START: usize = 0;
const FINAL: usize = 1;

#[derive(Debug, Clone, PartialEq)]
struct Arc {
  from: usize,
  to: usize,
  tree: RegexTree,
}

/// Multigraph of states whose arcs carry regex-trees.
///
/// State 0 is the start and state 1 the final state; neither is ever
/// eliminated. Table states are shifted by two.
#[derive(Debug, Clone)]
pub struct ArcGraph {
  states: Vec<usize>,
  arcs: Vec<Arc>,
}

#[derive(Debug, PartialEq, Eq)]
enum Pick {
  Eliminate(usize),
  Restart,
}

/// In/out figures of one candidate state, self-loop excluded.
#[derive(Debug, Default)]
struct Degree {
  in_count: usize,
  out_count: usize,
  in_size: usize,
  out_size: usize,
  loop_size: usize,
}

impl Degree {
  fn is_trivial(&self) -> bool {
    self.in_count <= 1 && self.out_count <= 1
  }

  fn cost(&self) -> usize {
    self.in_size * self.out_count.saturating_sub(1)
      + self.out_size * self.in_count.saturating_sub(1)
      + self.in_count * self.out_count * self.loop_size
  }
}

impl ArcGraph {
  /// Build the graph for `table`, entering terminal and nonterminal symbols
  /// into `grammar`'s tables.
  pub fn from_table(table: &TransitionTable, grammar: &mut Grammar) -> Result<Self, AutomatonError> {
    let mut states = vec![START, FINAL];
    states.extend((0..table.state_count()).map(|state| state + 2));

    let mut arcs = vec![Arc {
      from: START,
      to: TransitionTable::START + 2,
      tree: RegexTree::epsilon(),
    }];

    for state in table.finals() {
      arcs.push(Arc {
        from: state + 2,
        to: FINAL,
        tree: RegexTree::epsilon(),
      });
    }

    for (from, symbol, to) in table.transitions() {
      let tree = match classify(symbol)? {
        SymbolKind::Epsilon => RegexTree::epsilon(),
        SymbolKind::Terminal(name) => RegexTree::Terminal(grammar.terminal(&name)),
        SymbolKind::Nonterminal(name) => RegexTree::nonterminal(grammar.nonterminal(&name)),
      };

      arcs.push(Arc {
        from: from + 2,
        to: to + 2,
        tree,
      });
    }

    Ok(Self { states, arcs })
  }

  pub fn state_count(&self) -> usize {
    self.states.len()
  }

  pub fn arc_count(&self) -> usize {
    self.arcs.len()
  }

  /// Eliminate every intermediate state and return the tree on the
  /// remaining start→final arc, or epsilon if there is none.
  pub fn reduce(mut self) -> RegexTree {
    while self.states.len() > 2 {
      self.merge_parallel_arcs();

      match self.pick() {
        Pick::Eliminate(state) => self.eliminate(state),
        Pick::Restart => continue,
      }
    }

    self.merge_parallel_arcs();

    let result = self.arcs.into_iter()
      .find(|arc| arc.from == START && arc.to == FINAL)
      .map(|arc| arc.tree)
      .unwrap_or_else(RegexTree::epsilon);

    debug!("state elimination produced a tree of size {}", result.size());
    result
  }

  /// Collapse arcs sharing the same endpoints into one alternation, in arc
  /// order.
  fn merge_parallel_arcs(&mut self) {
    let mut merged = Map::<(usize, usize), RegexTree>::new();

    for arc in self.arcs.drain(..) {
      match merged.entry((arc.from, arc.to)) {
        Entry::Occupied(mut entry) => {
          let tree = mem::replace(entry.get_mut(), RegexTree::epsilon());
          *entry.get_mut() = RegexTree::alt(tree, arc.tree);
        }
        Entry::Vacant(entry) => {
          entry.insert(arc.tree);
        }
      }
    }

    self.arcs = merged.into_iter()
      .map(|((from, to), tree)| Arc { from, to, tree })
      .collect();
  }

  fn degree(&self, state: usize) -> Degree {
    let mut degree = Degree::default();

    for arc in &self.arcs {
      if arc.from == state && arc.to == state {
        degree.loop_size = arc.tree.size();
      } else if arc.to == state {
        degree.in_count += 1;
        degree.in_size += arc.tree.size();
      } else if arc.from == state {
        degree.out_count += 1;
        degree.out_size += arc.tree.size();
      }
    }

    degree
  }

  /// Scan candidates from the highest state down; a trivial state is taken
  /// at once, otherwise the cheapest wins and ties go to the higher state.
  fn pick(&mut self) -> Pick {
    let mut candidates = self.states.iter()
      .copied()
      .filter(|&state| state != START && state != FINAL)
      .collect::<Vec<_>>();
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    let mut best: Option<(usize, usize)> = None;

    for state in candidates {
      let degree = self.degree(state);

      if degree.is_trivial() {
        trace!("eliminating trivial state {}", state);
        return Pick::Eliminate(state);
      }

      if self.fold_binary_iteration(state, &degree) {
        return Pick::Restart;
      }

      let cost = degree.cost();
      if best.map_or(true, |(_, best_cost)| cost < best_cost) {
        best = Some((state, cost));
      }
    }

    match best {
      Some((state, cost)) => {
        trace!("eliminating state {} at cost {}", state, cost);
        Pick::Eliminate(state)
      }
      None => Pick::Restart,
    }
  }

  /// `X -a-> S -b-> X` where `a` is the only way into `S` and the only way
  /// out of `X`, and `S` has no self-loop: the arc into `S` becomes `a # b`
  /// and the arc back to `X` goes away.
  fn fold_binary_iteration(&mut self, state: usize, degree: &Degree) -> bool {
    if degree.in_count != 1 || degree.loop_size != 0 {
      return false;
    }

    let in_ix = match self.arcs.iter().position(|arc| arc.to == state && arc.from != state) {
      Some(ix) => ix,
      None => return false,
    };
    let x = self.arcs[in_ix].from;

    let x_has_other_out = self.arcs.iter()
      .any(|arc| arc.from == x && arc.to != state);
    if x_has_other_out {
      return false;
    }

    let back_ix = match self.arcs.iter().position(|arc| arc.from == state && arc.to == x) {
      Some(ix) => ix,
      None => return false,
    };

    trace!("folding loop {} <-> {} into an iteration", x, state);

    let back = self.arcs.remove(back_ix);
    let in_ix = if back_ix < in_ix { in_ix - 1 } else { in_ix };
    let tree = mem::replace(&mut self.arcs[in_ix].tree, RegexTree::epsilon());
    self.arcs[in_ix].tree = RegexTree::iteration(tree, back.tree);

    true
  }

  fn eliminate(&mut self, state: usize) {
    let (touching, rest): (Vec<Arc>, Vec<Arc>) = self.arcs
      .drain(..)
      .partition(|arc| arc.from == state || arc.to == state);

    let self_loop = touching.iter()
      .find(|arc| arc.from == state && arc.to == state)
      .map(|arc| RegexTree::iteration(RegexTree::epsilon(), arc.tree.clone()))
      .unwrap_or_else(RegexTree::epsilon);

    let ins = touching.iter().filter(|arc| arc.to == state && arc.from != state);
    let mut new_arcs = vec![];

    for in_arc in ins {
      for out_arc in touching.iter().filter(|arc| arc.from == state && arc.to != state) {
        let tree = RegexTree::join(
          RegexTree::join(in_arc.tree.clone(), self_loop.clone()),
          out_arc.tree.clone());

        new_arcs.push(Arc {
          from: in_arc.from,
          to: out_arc.to,
          tree,
        });
      }
    }

    self.arcs = rest;
    self.arcs.extend(new_arcs);
    self.states.retain(|&s| s != state);
  }
}

/// Convert a deterministic transition table into one equivalent regex-tree.
pub fn to_regex(table: &TransitionTable, grammar: &mut Grammar) -> Result<RegexTree, AutomatonError> {
  let graph = ArcGraph::from_table(table, grammar)?;
  debug!(
    "reducing arc graph with {} states and {} arcs",
    graph.state_count(),
    graph.arc_count());
  Ok(graph.reduce())
}
