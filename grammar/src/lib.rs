mod grammar_parser;

pub mod symbols;
pub mod grammar;
pub mod regex_tree;
pub mod automaton;
pub mod recognize;

pub use self::grammar::*;
pub use symbols::*;
pub use regex_tree::{RegexTree, Selection};
pub use automaton::{TransitionTable, AutomatonError};
pub use grammar_parser::{GrammarError, GrammarErrorKind};

pub type Map<K, V> = indexmap::IndexMap<K, V>;

pub type Set<K> = indexmap::IndexSet<K>;

pub type BiMap<K, V> = bimap::BiHashMap<K, V>;

/// Read a grammar from rule text.
///
/// The text is a list of `name : rule .` records, optionally terminated by
/// `EOGram!`.
pub fn build(input: &str) -> Result<Grammar, GrammarError> {
  grammar_parser::parse(input)
}
