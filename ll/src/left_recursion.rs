//! Direct left-recursion elimination.
//!
//! `R : R , a1 ; … ; b1 ; …` becomes
//!
//! ```text
//! R     : b1 , R_rec ; … .
//! R_rec : a1 , R_rec ; … ; @ .
//! ```
//!
//! Only a rule that starts one of its own top-level alternatives with
//! itself is handled. Recursion through another nonterminal (`R : S , x .
//! S : R , y .`) is left as it is.

use log::debug;
use grammar::{Grammar, NonterminalId, RegexTree};

fn leads_with(alt: &RegexTree, nt: NonterminalId) -> bool {
  matches!(alt.sequence().first(), Some(RegexTree::NonTerminal { id, .. }) if *id == nt)
}

pub fn has_direct_left_recursion(grammar: &Grammar, nt: NonterminalId) -> bool {
  grammar.rule(nt).map_or(false, |rule| {
    rule.alternatives().iter().any(|alt| leads_with(alt, nt))
  })
}

/// Rewrite the rule of `nt` so that it is no longer directly left-recursive
/// and return the fresh tail nonterminal.
///
/// Returns `None` and leaves the grammar untouched when `nt` has no rule, is
/// not left-recursive or has no alternative that does not start with `nt`.
/// An alternative consisting of `nt` alone derives nothing new and is
/// dropped; if those were the only recursive ones the rule loses them and
/// no tail is made.
pub fn eliminate_left_recursion(grammar: &mut Grammar, nt: NonterminalId) -> Option<NonterminalId> {
  let rule = grammar.rule(nt)?;

  let mut alphas = vec![];
  let mut betas = vec![];
  let mut recursive = false;

  for alt in rule.alternatives() {
    if leads_with(alt, nt) {
      recursive = true;
      let tail = alt.sequence().into_iter().skip(1).cloned();
      alphas.extend(RegexTree::concatenation(tail));
    } else {
      betas.push(alt.clone());
    }
  }

  if !recursive || betas.is_empty() {
    return None;
  }

  let name = grammar.nonterminal_name(nt).to_owned();

  if alphas.is_empty() {
    debug!("dropping trivial self-derivation of {}", name);
    grammar.set_rule(nt, RegexTree::alternation(betas)?);
    return None;
  }

  let tail = grammar.fresh_nonterminal(&format!("{}_rec", name));
  debug!(
    "eliminating left recursion of {}: {} recursive, {} other alternatives, tail {}",
    name,
    alphas.len(),
    betas.len(),
    grammar.nonterminal_name(tail));

  let head = RegexTree::alternation(
    betas.into_iter().map(|beta| RegexTree::join(beta, RegexTree::nonterminal(tail))))?;
  let rest = RegexTree::alternation(
    alphas.into_iter()
      .map(|alpha| RegexTree::seq(alpha, RegexTree::nonterminal(tail)))
      .chain(Some(RegexTree::epsilon())))?;

  grammar.set_rule(nt, head);
  grammar.set_rule(tail, rest);

  Some(tail)
}

/// Eliminate direct left recursion from every rule, returning
/// `(nonterminal, tail)` pairs in declaration order.
pub fn eliminate_all_left_recursion(grammar: &mut Grammar) -> Vec<(NonterminalId, NonterminalId)> {
  let nts = grammar.nonterminals.ids().collect::<Vec<_>>();
  let mut tails = vec![];

  for nt in nts {
    if !has_direct_left_recursion(grammar, nt) {
      continue;
    }

    if let Some(tail) = eliminate_left_recursion(grammar, nt) {
      tails.push((nt, tail));
    }
  }

  tails
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::recognize::accepts;
  use grammar::TerminalId;
  use insta::assert_snapshot;
  use pretty_assertions::assert_eq;

  fn word(grammar: &Grammar, text: &str) -> Vec<TerminalId> {
    text.chars()
      .map(|c| grammar.terminals.id(&c.to_string()).unwrap())
      .collect()
  }

  #[test]
  fn expression() {
    let mut grammar = grammar::build("E : E , '+' , T ; T . T : 'x' .").unwrap();
    let e = grammar.start().unwrap();

    assert!(has_direct_left_recursion(&grammar, e));
    let tail = eliminate_left_recursion(&mut grammar, e).unwrap();

    assert!(!has_direct_left_recursion(&grammar, e));
    assert!(!has_direct_left_recursion(&grammar, tail));
    assert_eq!(grammar.nonterminal_name(tail), "E_rec");
    assert_snapshot!(grammar.to_text(), @r###"
    E : T , E_rec .
    T : 'x' .
    E_rec : '+' , T , E_rec ; @ .
    EOGram!
    "###);
  }

  #[test]
  fn keeps_language() {
    let source = "L : L , ',' , 'a' ; L , ';' ; 'a' ; 'b' , 'a' .";
    let before = grammar::build(source).unwrap();
    let mut after = grammar::build(source).unwrap();
    let l = after.start().unwrap();
    eliminate_left_recursion(&mut after, l).unwrap();

    for text in ["a", "ba", "a,a", "a;", "a;,a;", "ba,a,a", ",a", "aa", ""] {
      assert_eq!(
        accepts(&before, l, &word(&before, text)),
        accepts(&after, l, &word(&after, text)),
        "{:?}", text);
    }
    assert!(accepts(&after, l, &word(&after, "ba;,a")));
  }

  #[test]
  fn no_base_case_is_noop() {
    let mut grammar = grammar::build("S : S , 'a' .").unwrap();
    let s = grammar.start().unwrap();
    let before = grammar.to_text();

    assert_eq!(eliminate_left_recursion(&mut grammar, s), None);
    assert_eq!(grammar.to_text(), before);
    assert!(has_direct_left_recursion(&grammar, s));
  }

  #[test]
  fn indirect_recursion_is_untouched() {
    let mut grammar = grammar::build("A : B , 'x' ; 'y' . B : A , 'z' .").unwrap();
    let before = grammar.to_text();

    assert!(eliminate_all_left_recursion(&mut grammar).is_empty());
    assert_eq!(grammar.to_text(), before);
  }

  #[test]
  fn trivial_self_alternative_dropped() {
    let mut grammar = grammar::build("S : S ; 'a' .").unwrap();
    let s = grammar.start().unwrap();

    assert_eq!(eliminate_left_recursion(&mut grammar, s), None);
    assert_eq!(grammar.to_text(), "S : 'a' .\nEOGram!\n");
  }

  #[test]
  fn fresh_names_do_not_clash() {
    let mut grammar = grammar::build("A : A , 'a' ; 'b' . A_rec : 'c' .").unwrap();
    let all = eliminate_all_left_recursion(&mut grammar);

    assert_eq!(all.len(), 1);
    assert_eq!(grammar.nonterminal_name(all[0].1), "A_rec1");
  }
}
