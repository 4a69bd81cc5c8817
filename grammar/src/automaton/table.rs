use std::collections::BTreeSet;
use itertools::Itertools;
use crate::{Map, Set};
use super::{classify, AutomatonError, SymbolKind};

/// Explicit `(state, symbol) -> destinations` table.
///
/// State 0 is the start state and state 1 the (default) final state.
/// Symbols are kept verbatim: `'x'` / `"x"` name a terminal, a bare
/// identifier a nonterminal and `""` an epsilon move.
#[derive(Debug, Clone)]
pub struct TransitionTable {
  state_count: usize,
  finals: BTreeSet<usize>,
  symbols: Set<String>,
  transitions: Map<(usize, usize), BTreeSet<usize>>,
}

impl TransitionTable {
  pub const START: usize = 0;
  pub const FINAL: usize = 1;

  pub fn new() -> Self {
    Self {
      state_count: 2,
      finals: Some(Self::FINAL).into_iter().collect(),
      symbols: Set::new(),
      transitions: Map::new(),
    }
  }

  pub fn add_state(&mut self) -> usize {
    self.state_count += 1;
    self.state_count - 1
  }

  pub fn state_count(&self) -> usize {
    self.state_count
  }

  pub fn mark_final(&mut self, state: usize) {
    self.grow(state);
    self.finals.insert(state);
  }

  pub fn is_final(&self, state: usize) -> bool {
    self.finals.contains(&state)
  }

  pub fn finals(&self) -> impl Iterator<Item=usize> + '_ {
    self.finals.iter().copied()
  }

  fn grow(&mut self, state: usize) {
    self.state_count = self.state_count.max(state + 1);
  }

  /// Add a transition `from --symbol--> to`, creating states as needed.
  pub fn link_states(&mut self, from: usize, to: usize, symbol: &str) -> Result<(), AutomatonError> {
    classify(symbol)?;
    self.grow(from.max(to));

    let (index, _) = self.symbols.insert_full(symbol.to_owned());
    self.transitions.entry((from, index)).or_default().insert(to);
    Ok(())
  }

  pub fn symbols(&self) -> impl Iterator<Item=&str> {
    self.symbols.iter().map(|s| s.as_str())
  }

  /// Every transition as `(from, symbol, to)`, row by row in state order
  /// and column by column in symbol order.
  pub fn transitions(&self) -> impl Iterator<Item=(usize, &str, usize)> + '_ {
    (0..self.state_count)
      .cartesian_product(0..self.symbols.len())
      .filter_map(move |(state, index)| {
        self.transitions.get(&(state, index))
          .map(|dests| (state, index, dests))
      })
      .flat_map(move |(state, index, dests)| {
        let symbol = self.symbols[index].as_str();
        dests.iter().map(move |&to| (state, symbol, to))
      })
  }

  /// Simulate the table on a word of symbols, following epsilon moves.
  pub fn accepts(&self, word: &[&str]) -> bool {
    let mut current = self.epsilon_closure(Some(Self::START).into_iter().collect());

    for symbol in word {
      let index = match self.symbols.get_index_of(*symbol) {
        Some(index) => index,
        None => return false,
      };

      let next = current.iter()
        .filter_map(|&state| self.transitions.get(&(state, index)))
        .flatten()
        .copied()
        .collect();
      current = self.epsilon_closure(next);
    }

    current.iter().any(|state| self.finals.contains(state))
  }

  fn epsilon_closure(&self, mut states: BTreeSet<usize>) -> BTreeSet<usize> {
    let epsilons = self.symbols.iter()
      .enumerate()
      .filter(|(_, symbol)| classify(symbol) == Ok(SymbolKind::Epsilon))
      .map(|(index, _)| index)
      .collect::<Vec<_>>();

    let mut stack = states.iter().copied().collect::<Vec<_>>();
    while let Some(state) = stack.pop() {
      for &index in &epsilons {
        for &to in self.transitions.get(&(state, index)).into_iter().flatten() {
          if states.insert(to) {
            stack.push(to);
          }
        }
      }
    }

    states
  }

  /// Debug dump: one row per state, one column per symbol, each cell the
  /// destination set. Final states are marked with `*`, epsilon moves are
  /// listed under `ε`.
  pub fn dump(&self) -> String {
    let mut rows = vec![];

    let mut header = vec!["state".to_owned()];
    header.extend(self.symbols.iter().map(|symbol| {
      if classify(symbol) == Ok(SymbolKind::Epsilon) {
        "ε".to_owned()
      } else {
        symbol.clone()
      }
    }));
    rows.push(header);

    for state in 0..self.state_count {
      let mut row = vec![if self.is_final(state) {
        format!("*{}", state)
      } else {
        state.to_string()
      }];

      row.extend((0..self.symbols.len()).map(|index| {
        match self.transitions.get(&(state, index)) {
          Some(dests) => format!("{{{}}}", dests.iter().join(",")),
          None => String::new(),
        }
      }));
      rows.push(row);
    }

    let widths = (0..rows[0].len())
      .map(|col| rows.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
      .collect::<Vec<_>>();

    rows.iter()
      .map(|row| {
        row.iter()
          .zip(&widths)
          .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
          .join(" | ")
          .trim_end()
          .to_owned()
      })
      .join("\n")
  }
}

impl Default for TransitionTable {
  fn default() -> Self {
    Self::new()
  }
}
