
pub type Document = Vec<Record>;

#[derive(Debug, Clone)]
pub struct Record {
  pub name: Spanned<String>,
  pub body: Expr,
}

#[derive(Debug, Clone)]
pub enum Expr {
  /// Unquoted terminal name; the empty name is epsilon.
  Terminal(String),
  Nonterminal(String),
  Semantic(String),
  /// `%name`
  Open(String),
  Epsilon,
  /// `[e]`
  Optional(Box<Expr>),
  Sequence(Box<Expr>, Box<Expr>),
  Alternative(Box<Expr>, Box<Expr>),
  Iteration(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Spanned<T>(pub (usize, usize), pub T);
