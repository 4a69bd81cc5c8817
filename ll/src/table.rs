//! LL(1) prediction table.

use std::fmt::Write;
use fnv::FnvHashMap;
use itertools::Itertools;
use log::debug;
use grammar::{Grammar, NonterminalId, RegexTree, Selection, SymbolId};
use crate::ffn::{self, Ffn, Lookahead, LookaheadSet};

/// `(nonterminal, lookahead) -> alternative` table.
///
/// Alternatives are the top-level alternatives of each macro-expanded rule,
/// numbered from 0 in source order.
#[derive(Debug, Clone)]
pub struct LlTable {
  cells: FnvHashMap<(NonterminalId, Lookahead), usize>,
  alternatives: Vec<Vec<RegexTree>>,
  lookaheads: LookaheadSet,
  conflicts: Vec<String>,
}

impl LlTable {
  pub fn build(grammar: &Grammar) -> Self {
    let ffn = ffn::compute(grammar);
    Self::with_ffn(grammar, &ffn)
  }

  /// Build from already computed NULLABLE/FIRST/FOLLOW sets.
  pub fn with_ffn(grammar: &Grammar, ffn: &Ffn) -> Self {
    let mut table = LlTable {
      cells: FnvHashMap::default(),
      alternatives: vec![vec![]; grammar.nonterminals.len()],
      lookaheads: LookaheadSet::new(),
      conflicts: vec![],
    };

    for nt in grammar.nonterminals.ids() {
      let rule = match grammar.expanded_rule(nt) {
        Some(rule) => rule,
        None => continue,
      };
      let alts = rule
        .alternatives()
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

      for (i, alt) in alts.iter().enumerate() {
        let mut predict = ffn.first_of(alt);
        if ffn.is_nullable(alt) {
          predict.union_with(ffn.follow(nt));
        }

        for lookahead in predict.iter() {
          table.insert(grammar, nt, lookahead, i, &alts);
        }
      }

      table.alternatives[nt.index()] = alts;
    }

    debug!(
      "LL(1) table: {} cells, {} conflicts",
      table.cells.len(),
      table.conflicts.len());

    table
  }

  fn insert(
    &mut self,
    grammar: &Grammar,
    nt: NonterminalId,
    lookahead: Lookahead,
    alt: usize,
    alts: &[RegexTree],
  ) {
    self.lookaheads.insert(lookahead);

    if let Some(prev) = self.cells.insert((nt, lookahead), alt) {
      if prev != alt {
        self.conflicts.push(format!(
          "conflict in {} on {}: alternative {} `{}` and alternative {} `{}`",
          grammar.nonterminal_name(nt),
          lookahead.name(grammar),
          prev,
          alts[prev].display(grammar),
          alt,
          alts[alt].display(grammar)));
      }
    }
  }

  /// The alternative predicted for `nt` on `lookahead`.
  pub fn get(&self, nt: NonterminalId, lookahead: Lookahead) -> Option<usize> {
    self.cells.get(&(nt, lookahead)).copied()
  }

  /// The tree of the alternative predicted for `nt` on `lookahead`.
  pub fn production(&self, nt: NonterminalId, lookahead: Lookahead) -> Option<&RegexTree> {
    let alt = self.get(nt, lookahead)?;
    self.alternatives.get(nt.index())?.get(alt)
  }

  pub fn has_rule(&self, nt: NonterminalId) -> bool {
    self.alternatives.get(nt.index()).map_or(false, |alts| !alts.is_empty())
  }

  pub fn alternatives(&self, nt: NonterminalId) -> &[RegexTree] {
    self.alternatives.get(nt.index()).map(|alts| alts.as_slice()).unwrap_or(&[])
  }

  /// Conflicts in the order they were found.
  pub fn conflicts(&self) -> &[String] {
    &self.conflicts
  }

  pub fn is_ll1(&self) -> bool {
    self.conflicts.is_empty()
  }

  /// Printable table: one row per nonterminal with a rule, one column per
  /// lookahead used by some cell (`$` last), followed by the numbered
  /// alternatives.
  pub fn display(&self, grammar: &Grammar) -> String {
    let columns = self.lookaheads.iter()
      .filter(|&lookahead| lookahead != Lookahead::End)
      .chain(Some(Lookahead::End).filter(|&end| self.lookaheads.contains(end)))
      .collect::<Vec<_>>();

    let rows = grammar.nonterminals.ids()
      .filter(|&nt| self.has_rule(nt))
      .collect::<Vec<_>>();

    let mut cells = vec![];
    let mut header = vec!["rule".to_owned()];
    header.extend(columns.iter().map(|lookahead| lookahead.name(grammar)));
    cells.push(header);

    for &nt in &rows {
      let mut row = vec![grammar.nonterminal_name(nt).to_owned()];
      row.extend(columns.iter().map(|&lookahead| {
        self.get(nt, lookahead)
          .map_or(String::new(), |alt| alt.to_string())
      }));
      cells.push(row);
    }

    let widths = (0..cells[0].len())
      .map(|col| cells.iter().map(|row| row[col].chars().count()).max().unwrap_or(0))
      .collect::<Vec<_>>();

    let mut buf = cells.iter()
      .map(|row| {
        row.iter()
          .zip(&widths)
          .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
          .join(" | ")
          .trim_end()
          .to_owned()
      })
      .join("\n");
    buf.push('\n');

    for &nt in &rows {
      for (i, alt) in self.alternatives(nt).iter().enumerate() {
        writeln!(&mut buf,
          "{}.{} : {}",
          grammar.nonterminal_name(nt),
          i,
          alt.render(grammar, Selection::NONE, false),
        ).unwrap();
      }
    }

    buf
  }
}
