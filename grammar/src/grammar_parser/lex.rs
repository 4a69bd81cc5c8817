use std::str::CharIndices;
use std::iter::Peekable;
use std::fmt::Display;
use std::fmt;
use super::{GrammarError, GrammarErrorKind};

pub type Spanned<Tok, Loc, Error> = Result<(Loc, Tok, Loc), Error>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
  Ident,
  String,

  Dollar,
  Percent,
  Colon,
  Dot,
  Comma,
  Semicolon,
  /// `#` or `*`
  Iterate,
  LParen,
  RParen,
  LBracket,
  RBracket,
  /// `@` or `&`
  Epsilon,
  /// `EOGram!`
  End,
}

#[derive(Clone, Debug)]
pub struct Token<'a> {
  pub kind: TokenKind,
  pub text: &'a str
}

pub struct Lexer<'a> {
  input: &'a str,
  chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
  pub fn new(input: &'a str) -> Self {
    Self {
      input,
      chars: input.char_indices().peekable(),
    }
  }

  fn advance(&mut self) -> Option<(usize, char)> {
    self.chars.next()
  }

  fn token(&self, kind: TokenKind, start: usize, end: usize)
    -> Spanned<Token<'a>, usize, GrammarError>
  {
    let token = Token {
      kind,
      text: &self.input[start..end],
    };
    Ok((start, token, end))
  }

  fn error(&self, kind: GrammarErrorKind, message: &str, start: usize, end: usize)
    -> Spanned<Token<'a>, usize, GrammarError>
  {
    Err(GrammarError {
      kind,
      span: (start, end),
      message: message.to_owned(),
    })
  }

  fn lex_quoted(&mut self, start: usize, quote: char)
    -> Spanned<Token<'a>, usize, GrammarError>
  {
    let mut escaped = false;
    loop {
      match self.advance() {
        Some((_, '\\')) if !escaped => {
          escaped = true;
        }
        Some((k, c)) if c == quote && !escaped => {
          break self.token(TokenKind::String, start, k + 1);
        }
        Some((k, '\n')) => {
          break self.error(GrammarErrorKind::UnclosedString, "unclosed string", start, k);
        }
        None => {
          let end = self.input.len();
          break self.error(GrammarErrorKind::UnclosedString, "unclosed string", start, end);
        }
        Some(_) => {
          escaped = false;
        }
      }
    }
  }

  fn skip_whitespace_and_comments(&mut self) {
    loop {
      while let Some(&(_, c)) = self.chars.peek() {
        if !c.is_whitespace() {
          break;
        }
        self.advance();
      }

      match self.chars.peek() {
        Some(&(j, '/')) if self.input[j..].starts_with("//") => {
          while let Some(&(_, c)) = self.chars.peek() {
            if c == '\n' {
              break;
            }
            self.advance();
          }
        }
        _ => break,
      }
    }
  }
}

impl<'a> Iterator for Lexer<'a> {
  type Item = Spanned<Token<'a>, usize, GrammarError>;

  fn next(&mut self) -> Option<Self::Item> {
    self.skip_whitespace_and_comments();

    let (j, c) = self.advance()?;

    let single = |kind| Some(self.token(kind, j, j + 1));

    match c {
      '\'' | '"' => Some(self.lex_quoted(j, c)),
      '$' => single(TokenKind::Dollar),
      '%' => single(TokenKind::Percent),
      ':' => single(TokenKind::Colon),
      '.' => single(TokenKind::Dot),
      ',' => single(TokenKind::Comma),
      ';' => single(TokenKind::Semicolon),
      '#' | '*' => single(TokenKind::Iterate),
      '(' => single(TokenKind::LParen),
      ')' => single(TokenKind::RParen),
      '[' => single(TokenKind::LBracket),
      ']' => single(TokenKind::RBracket),
      '@' | '&' => single(TokenKind::Epsilon),
      _ if c.is_alphabetic() || c == '_' => {
        let mut end = j + c.len_utf8();
        while let Some(&(i, c)) = self.chars.peek() {
          if !(c.is_alphanumeric() || c == '_') {
            break;
          }
          end = i + c.len_utf8();
          self.advance();
        }

        if &self.input[j..end] == "EOGram" {
          if let Some(&(i, '!')) = self.chars.peek() {
            self.advance();
            return Some(self.token(TokenKind::End, j, i + 1));
          }
        }

        Some(self.token(TokenKind::Ident, j, end))
      }
      _ => {
        Some(self.error(GrammarErrorKind::InvalidChar,
          &format!("invalid character {:?}", c),
          j,
          j + c.len_utf8()))
      }
    }
  }
}

impl<'a> Display for Token<'a> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "<{:?}: {:?}>", self.kind, self.text)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
      .map(|t| t.unwrap().1.kind)
      .collect()
  }

  #[test]
  fn tokens() {
    use TokenKind::*;

    assert_eq!(
      kinds("expr : term # '+' , $add ; [ @ ] & (x*y) . // trailing\nEOGram!"),
      vec![
        Ident, Colon, Ident, Iterate, String, Comma, Dollar, Ident, Semicolon,
        LBracket, Epsilon, RBracket, Epsilon, LParen, Ident, Iterate, Ident,
        RParen, Dot, End,
      ]);
  }

  #[test]
  fn quoted_text_keeps_escapes() {
    let tokens = Lexer::new(r#"'it\'s' "x""#)
      .map(|t| t.unwrap())
      .map(|(start, token, end)| (start, token.text, end))
      .collect::<Vec<_>>();

    assert_eq!(tokens, vec![(0, r"'it\'s'", 7), (8, r#""x""#, 11)]);
  }

  #[test]
  fn unclosed_string() {
    let err = Lexer::new("a : 'abc\n").find_map(|t| t.err()).unwrap();

    assert_eq!(err.kind, GrammarErrorKind::UnclosedString);
    assert_eq!(err.span, (4, 8));
  }

  #[test]
  fn invalid_char() {
    let err = Lexer::new("a : ?").find_map(|t| t.err()).unwrap();

    assert_eq!(err.kind, GrammarErrorKind::InvalidChar);
    assert_eq!(err.span, (4, 5));
  }
}
