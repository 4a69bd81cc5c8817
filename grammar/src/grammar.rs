use std::fmt::Write;
use super::symbols::*;
use super::regex_tree::{RegexTree, Selection};

/// Terminator of the persisted rule-text format.
pub const END_OF_GRAMMAR: &str = "EOGram!";

/// A grammar: four symbol tables and one optional rule per nonterminal.
///
/// The start symbol is the first declared nonterminal.
#[derive(Debug, Clone)]
pub struct Grammar {
  pub terminals: SymbolTable<TerminalId>,
  pub nonterminals: SymbolTable<NonterminalId>,
  pub semantics: SymbolTable<SemanticId>,
  pub macros: SymbolTable<MacroId>,
  rules: Vec<Option<RegexTree>>,
}

impl Grammar {
  pub fn new() -> Self {
    let mut terminals = SymbolTable::<TerminalId>::new();
    let epsilon = terminals.insert("");
    debug_assert!(epsilon.is_epsilon());

    Self {
      terminals,
      nonterminals: SymbolTable::new(),
      semantics: SymbolTable::new(),
      macros: SymbolTable::new(),
      rules: vec![],
    }
  }

  pub fn terminal(&mut self, name: &str) -> TerminalId {
    self.terminals.insert(name)
  }

  pub fn nonterminal(&mut self, name: &str) -> NonterminalId {
    let nt = self.nonterminals.insert(name);
    if self.rules.len() < self.nonterminals.len() {
      self.rules.resize(self.nonterminals.len(), None);
    }
    nt
  }

  pub fn semantic(&mut self, name: &str) -> SemanticId {
    self.semantics.insert(name)
  }

  /// Declare a fresh nonterminal whose name is derived from `base`.
  pub fn fresh_nonterminal(&mut self, base: &str) -> NonterminalId {
    let name = self.nonterminals.fresh_name(base);
    self.nonterminal(&name)
  }

  pub fn start(&self) -> Option<NonterminalId> {
    self.nonterminals.ids().next()
  }

  pub fn rule(&self, nt: NonterminalId) -> Option<&RegexTree> {
    self.rules.get(nt.index()).and_then(|rule| rule.as_ref())
  }

  pub fn has_rule(&self, nt: NonterminalId) -> bool {
    self.rule(nt).is_some()
  }

  /// Replace the whole rule of `nt`, returning the old tree.
  pub fn set_rule(&mut self, nt: NonterminalId, tree: RegexTree) -> Option<RegexTree> {
    if nt.index() >= self.rules.len() {
      self.rules.resize(nt.index() + 1, None);
    }
    self.rules[nt.index()].replace(tree)
  }

  pub fn take_rule(&mut self, nt: NonterminalId) -> Option<RegexTree> {
    self.rules.get_mut(nt.index()).and_then(|rule| rule.take())
  }

  /// Nonterminals that currently own a rule, in declaration order.
  pub fn rules(&self) -> impl Iterator<Item=(NonterminalId, &RegexTree)> + '_ {
    self.nonterminals.ids()
      .filter_map(move |nt| self.rule(nt).map(|rule| (nt, rule)))
  }

  /// The rule of `nt` with all open references inlined.
  pub fn expanded_rule(&self, nt: NonterminalId) -> Option<RegexTree> {
    self.rule(nt).map(|rule| rule.expand_macros(self))
  }

  pub fn terminal_name(&self, id: TerminalId) -> &str {
    self.terminals.name(id).unwrap_or("?")
  }

  pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
    self.nonterminals.name(id).unwrap_or("?")
  }

  pub fn semantic_name(&self, id: SemanticId) -> &str {
    self.semantics.name(id).unwrap_or("?")
  }

  /// Render the grammar as rule text, one `name : rule .` record per line.
  pub fn to_text(&self) -> String {
    let mut buf = String::new();

    for (nt, rule) in self.rules() {
      writeln!(&mut buf,
        "{} : {} .",
        self.nonterminal_name(nt),
        rule.render(self, Selection::NONE, false),
      ).unwrap();
    }

    buf.push_str(END_OF_GRAMMAR);
    buf.push('\n');
    buf
  }
}

impl Default for Grammar {
  fn default() -> Self {
    Self::new()
  }
}
