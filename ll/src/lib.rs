//! LL(1) analysis of regex-tree grammars and the rewrites that prepare a
//! grammar for a predictive parser.

use log::{debug, warn};

pub mod ffn;
pub mod table;
pub mod left_recursion;
pub mod factorize;
pub mod useless;

pub use ffn::{Ffn, Lookahead, LookaheadSet};
pub use table::LlTable;
pub use left_recursion::{
  has_direct_left_recursion,
  eliminate_left_recursion,
  eliminate_all_left_recursion,
};
pub use factorize::{factorize, factorize_all};
pub use useless::{productive, reachable, remove_useless};

type Map<K, V> = indexmap::IndexMap<K, V>;

/// Upper bound on whole-grammar passes of a fixed-point loop.
pub const MAX_ITERATIONS: usize = 1000;

/// Run `pass` until it reports no change or `MAX_ITERATIONS` is reached.
///
/// Returns `false` when the cap was hit; the caller's sets may then be
/// under-approximated.
fn fixed_point(what: &str, mut pass: impl FnMut() -> bool) -> bool {
  for iteration in 0..MAX_ITERATIONS {
    if !pass() {
      debug!("{} converged after {} passes", what, iteration + 1);
      return true;
    }
  }

  warn!("{} did not converge within {} passes", what, MAX_ITERATIONS);
  false
}
