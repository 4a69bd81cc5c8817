use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use crate::BiMap;

pub trait SymbolId: Copy + Eq + Hash + fmt::Debug {
  fn from_index(index: usize) -> Self;
  fn id(&self) -> u32;

  fn index(&self) -> usize {
    self.id() as usize
  }
}

macro_rules! symbol_id {
  ($($(#[$attr:meta])* $name:ident;)*) => {
    $(
      $(#[$attr])*
      #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
      pub struct $name(u32);

      impl SymbolId for $name {
        fn from_index(index: usize) -> Self {
          Self(index as u32)
        }

        fn id(&self) -> u32 {
          self.0
        }
      }
    )*
  };
}

symbol_id! {
  /// Terminal id. `TerminalId::EPSILON` (id 0) is the empty string.
  TerminalId;
  NonterminalId;
  SemanticId;
  MacroId;
}

impl TerminalId {
  pub const EPSILON: TerminalId = TerminalId(0);

  pub fn is_epsilon(&self) -> bool {
    *self == Self::EPSILON
  }
}

/// Append-only bijection between names and dense ids.
///
/// Ids are handed out in insertion order, so iterating `0..len` visits the
/// symbols in declaration order.
#[derive(Clone)]
pub struct SymbolTable<I: SymbolId> {
  names: BiMap<u32, String>,
  _marker: PhantomData<I>,
}

impl<I: SymbolId> SymbolTable<I> {
  pub fn new() -> Self {
    Self {
      names: BiMap::new(),
      _marker: PhantomData,
    }
  }

  /// Insert `name`, returning the existing id if the name is already known.
  pub fn insert(&mut self, name: &str) -> I {
    if let Some(id) = self.id(name) {
      return id;
    }

    let id = self.names.len() as u32;
    self.names.insert(id, name.to_owned());
    I::from_index(id as usize)
  }

  pub fn id(&self, name: &str) -> Option<I> {
    self.names.get_by_right(name).map(|&id| I::from_index(id as usize))
  }

  pub fn name(&self, id: I) -> Option<&str> {
    self.names.get_by_left(&id.id()).map(|s| s.as_str())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.names.contains_right(name)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  pub fn ids(&self) -> impl Iterator<Item=I> {
    (0..self.names.len()).map(I::from_index)
  }

  /// Iterate `(id, name)` pairs in insertion order.
  pub fn iter(&self) -> impl Iterator<Item=(I, &str)> + '_ {
    self.ids().map(move |id| (id, self.name(id).unwrap_or_default()))
  }

  /// A name derived from `base` that is not in the table yet: `base` itself
  /// if it is free, otherwise `base` followed by the first unused number.
  pub fn fresh_name(&self, base: &str) -> String {
    if !self.contains(base) {
      return base.to_owned();
    }

    (1..)
      .map(|n| format!("{}{}", base, n))
      .find(|name| !self.contains(name))
      .unwrap_or_default()
  }
}

impl<I: SymbolId> Default for SymbolTable<I> {
  fn default() -> Self {
    Self::new()
  }
}

impl<I: SymbolId> fmt::Debug for SymbolTable<I> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_map().entries(self.iter().map(|(id, name)| (id.id(), name))).finish()
  }
}
