//! Compiles a path expression into a flat list of [`Token`]s.
//!
//! Scanning is lenient: characters without a rule are dropped and an
//! unterminated bracket swallows the rest of the input. [`tokenize_strict`]
//! runs the same scanner and reports the first such problem instead.

use itertools::Itertools;
use tracing::debug;

use crate::errors::{QueryError, Result};
use crate::parser::Parser;
use crate::token::Token;

/// Tokenizes `expression`, silently skipping anything malformed.
pub fn tokenize(expression: &str) -> Vec<Token> {
    Scanner::new(expression).run().0
}

/// Tokenizes `expression`, failing on the first character, bracket or slice
/// bound the lenient scanner would have skipped. Successful output is
/// identical to [`tokenize`].
pub fn tokenize_strict(expression: &str) -> Result<Vec<Token>> {
    match Scanner::new(expression).run() {
        (tokens, None) => Ok(tokens),
        (_, Some(err)) => {
            debug!(expression, error = %err, "strict tokenize rejected expression");
            Err(err)
        }
    }
}

struct Scanner<'a> {
    cursor: Parser<'a>,
    tokens: Vec<Token>,
    first_error: Option<QueryError>,
}

impl<'a> Scanner<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            cursor: Parser::new(expression),
            tokens: Vec::new(),
            first_error: None,
        }
    }

    fn run(mut self) -> (Vec<Token>, Option<QueryError>) {
        while let Some(c) = self.cursor.peek_char() {
            let position = self.cursor.pos();
            match c {
                '$' => {
                    self.cursor.bump();
                    self.tokens.push(Token::Root);
                }
                // The current-node marker only means something inside filters.
                '@' => {
                    self.cursor.bump();
                }
                '.' => {
                    if self.cursor.consume_str("..") {
                        self.tokens.push(Token::RecursiveDescent);
                    } else {
                        self.cursor.bump();
                        self.tokens.push(Token::Dot);
                    }
                }
                // Dotted wildcard, as in `$.store.*` or `$..*`.
                '*' => {
                    self.cursor.bump();
                    self.tokens.push(Token::Wildcard);
                }
                '[' => self.bracket(position),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let key = self.cursor.take_path_identifier();
                    self.tokens.push(Token::identifier(key));
                }
                c if c.is_whitespace() => {
                    self.cursor.bump();
                }
                ch => {
                    self.cursor.bump();
                    self.report(QueryError::UnexpectedChar { ch, position });
                }
            }
        }
        (self.tokens, self.first_error)
    }

    fn bracket(&mut self, open: usize) {
        let source = self.cursor.source();
        let body_start = open + 1;
        let content = match find_closing_bracket(source, open) {
            Some(close) => {
                self.cursor.seek(close + 1);
                &source[body_start..close]
            }
            None => {
                self.report(QueryError::UnterminatedBracket { position: open });
                self.cursor.seek(source.len());
                &source[body_start..]
            }
        };
        let token = classify_bracket(content, &mut |err| self.report(err));
        self.tokens.push(token);
    }

    fn report(&mut self, err: QueryError) {
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }
}

/// Byte offset of the `]` matching the `[` at `open`. Brackets inside quoted
/// runs do not count; a quote preceded by a backslash does not close its run.
fn find_closing_bracket(source: &str, open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    for (offset, c) in source[open + 1..].char_indices() {
        match quote {
            Some(q) => {
                if c == q && prev != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + 1 + offset);
                    }
                }
                _ => {}
            },
        }
        prev = Some(c);
    }
    None
}

/// Turns the text between `[` and `]` into a single token. The checks run in
/// a fixed order: a filter containing `,` is still a filter.
fn classify_bracket(content: &str, report: &mut dyn FnMut(QueryError)) -> Token {
    let trimmed = content.trim();

    if trimmed.is_empty() || trimmed == "*" {
        return Token::Wildcard;
    }

    if let Some(rest) = trimmed.strip_prefix("?(") {
        return Token::Filter {
            expr: drop_last_char(rest).to_string(),
        };
    }

    if trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')') {
        return Token::Script {
            expr: trimmed[1..trimmed.len() - 1].to_string(),
        };
    }

    if trimmed.contains(',') {
        let items = trimmed
            .split(',')
            .map(|item| {
                let item = item.trim();
                strip_quotes(item).unwrap_or(item).to_string()
            })
            .collect_vec();
        return Token::Union { items };
    }

    if trimmed.contains(':') {
        let parts = trimmed.split(':').collect_vec();
        if parts.len() > 3 {
            report(QueryError::InvalidSliceBound(trimmed.to_string()));
        }
        let mut bound = |idx: usize| -> Option<i64> {
            let part = parts.get(idx)?.trim();
            if part.is_empty() {
                return None;
            }
            match part.parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    report(QueryError::InvalidSliceBound(part.to_string()));
                    None
                }
            }
        };
        let (start, end, step) = (bound(0), bound(1), bound(2));
        return Token::Slice { start, end, step };
    }

    if let Some(key) = strip_quotes(trimmed) {
        return Token::identifier(key);
    }

    if let Ok(index) = trimmed.parse::<i64>() {
        return Token::Index { index };
    }

    Token::identifier(trimmed)
}

/// Inner text of a string wrapped in one matching pair of `'` or `"`.
fn strip_quotes(s: &str) -> Option<&str> {
    let first = s.chars().next()?;
    if first != '\'' && first != '"' {
        return None;
    }
    if s.len() == 1 {
        return Some("");
    }
    if s.ends_with(first) {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

fn drop_last_char(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(key: &str) -> Token {
        Token::identifier(key)
    }

    #[test]
    fn dotted_path() {
        assert_eq!(
            tokenize("$.store.book[*].author"),
            vec![
                Token::Root,
                Token::Dot,
                ident("store"),
                Token::Dot,
                ident("book"),
                Token::Wildcard,
                Token::Dot,
                ident("author"),
            ]
        );
    }

    #[test]
    fn recursive_descent_and_dotted_wildcard() {
        assert_eq!(
            tokenize("$..price"),
            vec![Token::Root, Token::RecursiveDescent, ident("price")]
        );
        assert_eq!(
            tokenize("$.store.*"),
            vec![Token::Root, Token::Dot, ident("store"), Token::Dot, Token::Wildcard]
        );
    }

    #[test]
    fn bracket_classification() {
        assert_eq!(tokenize("[]"), vec![Token::Wildcard]);
        assert_eq!(tokenize("[ * ]"), vec![Token::Wildcard]);
        assert_eq!(
            tokenize("[?(@.price < 10)]"),
            vec![Token::Filter { expr: "@.price < 10".into() }]
        );
        assert_eq!(
            tokenize("[(@.length-1)]"),
            vec![Token::Script { expr: "@.length-1".into() }]
        );
        assert_eq!(
            tokenize("[0, 'a' ,\"b\",0]"),
            vec![Token::Union { items: vec!["0".into(), "a".into(), "b".into(), "0".into()] }]
        );
        assert_eq!(
            tokenize("[1:-1:2]"),
            vec![Token::Slice { start: Some(1), end: Some(-1), step: Some(2) }]
        );
        assert_eq!(
            tokenize("[::-1]"),
            vec![Token::Slice { start: None, end: None, step: Some(-1) }]
        );
        assert_eq!(tokenize("['a b']"), vec![ident("a b")]);
        assert_eq!(tokenize("[\"x\"]"), vec![ident("x")]);
        assert_eq!(tokenize("[-1]"), vec![Token::Index { index: -1 }]);
        assert_eq!(tokenize("[name]"), vec![ident("name")]);
    }

    #[test]
    fn filter_wins_over_union_and_slice() {
        assert_eq!(
            tokenize("[?(@.a == 'x,y:z')]"),
            vec![Token::Filter { expr: "@.a == 'x,y:z'".into() }]
        );
    }

    #[test]
    fn quoted_brackets_do_not_close() {
        assert_eq!(tokenize("['a]b']"), vec![ident("a]b")]);
        assert_eq!(tokenize(r"['a\']b']"), vec![ident(r"a\']b")]);
        assert_eq!(
            tokenize("[?(@.tags[0] == 'x')].y"),
            vec![
                Token::Filter { expr: "@.tags[0] == 'x'".into() },
                Token::Dot,
                ident("y"),
            ]
        );
    }

    #[test]
    fn union_keeps_unmatched_quotes() {
        assert_eq!(
            tokenize("['a,b\"]"),
            vec![Token::Union { items: vec!["'a".into(), "b\"".into()] }]
        );
    }

    #[test]
    fn lenient_mode_skips_garbage() {
        assert_eq!(tokenize("$.a#%b"), vec![Token::Root, Token::Dot, ident("a"), ident("b")]);
        assert_eq!(tokenize("@.x"), vec![Token::Dot, ident("x")]);
        assert_eq!(
            tokenize("$[1:x]"),
            vec![Token::Root, Token::Slice { start: Some(1), end: None, step: None }]
        );
        assert_eq!(tokenize("$.a[0"), vec![Token::Root, Token::Dot, ident("a"), Token::Index { index: 0 }]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("%%").is_empty());
    }

    #[test]
    fn identifiers_keep_inner_dollar() {
        assert_eq!(tokenize("$.a$b"), vec![Token::Root, Token::Dot, ident("a$b")]);
    }

    #[test]
    fn strict_mode_reports_first_problem() {
        assert!(matches!(
            tokenize_strict("$.a#"),
            Err(QueryError::UnexpectedChar { ch: '#', position: 3 })
        ));
        assert!(matches!(
            tokenize_strict("$.a[0"),
            Err(QueryError::UnterminatedBracket { position: 3 })
        ));
        assert!(matches!(
            tokenize_strict("$[1:x]"),
            Err(QueryError::InvalidSliceBound(s)) if s == "x"
        ));
        assert!(matches!(
            tokenize_strict("$[1:2:3:4]"),
            Err(QueryError::InvalidSliceBound(_))
        ));
    }

    #[test]
    fn strict_mode_agrees_with_lenient_on_valid_input() {
        for expr in [
            "$.store.book[*].author",
            "$..price",
            "$.store.book[?(@.price < 10)].title",
            "$['a','b'][0:2]",
        ] {
            assert_eq!(tokenize_strict(expr).unwrap(), tokenize(expr));
        }
    }
}
