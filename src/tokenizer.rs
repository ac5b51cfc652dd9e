// ABOUTME: Tokenizer converting UTF-8 source text into a flat, positioned token stream

use crate::error::EvalError;
use std::fmt;

/// Largest integer magnitude an f64 represents exactly; integer literals
/// beyond it become BigNumber tokens.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

const SYMBOL_SPECIALS: &str = "+-*/<>=!?$%&_.";

/// 1-based source location. Columns advance by one code point; lines reset
/// the column on `\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Placeholder for nodes synthesized at runtime (reified values)
    pub fn synthetic() -> Self {
        Position { line: 0, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Quote,
    Quasiquote,
    Unquote,
    Number,
    BigNumber,
    Str,
    Bool,
    Keyword,
    Symbol,
    Nil,
}

/// A single lexeme with its source position. For strings the lexeme is the
/// unescaped content; for keywords the leading `:` is already stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            pos,
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SYMBOL_SPECIALS.contains(c)
}

/// Tokenize a source string, failing at the first malformed lexeme.
///
/// `,` is treated as whitespace and `~` emits UNQUOTE, so `~x` is the
/// unquote spelling inside quasiquoted forms.
pub fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    Tokenizer::new(source).run()
}

struct Tokenizer {
    chars: Vec<char>,
    index: usize,
    line: u32,
    column: u32,
}

impl Tokenizer {
    fn new(source: &str) -> Self {
        Tokenizer {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let pos = self.position();
            match c {
                ' ' | '\t' | '\r' | '\n' | ',' => {
                    self.advance();
                }
                ';' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '(' => tokens.push(self.single(TokenKind::LParen, pos)),
                ')' => tokens.push(self.single(TokenKind::RParen, pos)),
                '[' => tokens.push(self.single(TokenKind::LBracket, pos)),
                ']' => tokens.push(self.single(TokenKind::RBracket, pos)),
                '{' => tokens.push(self.single(TokenKind::LBrace, pos)),
                '}' => tokens.push(self.single(TokenKind::RBrace, pos)),
                '\'' => tokens.push(self.single(TokenKind::Quote, pos)),
                '`' => tokens.push(self.single(TokenKind::Quasiquote, pos)),
                '~' => tokens.push(self.single(TokenKind::Unquote, pos)),
                '"' => tokens.push(self.string(pos)?),
                ':' => tokens.push(self.keyword(pos)?),
                c if c.is_ascii_digit() => tokens.push(self.number(pos)?),
                '+' | '-' if self.peek_ahead(1).is_some_and(|n| n.is_ascii_digit()) => {
                    tokens.push(self.number(pos)?)
                }
                c if is_symbol_char(c) => tokens.push(self.symbol(pos)),
                other => {
                    return Err(EvalError::token_error(
                        format!("unexpected character '{}'", other),
                        pos,
                    ));
                }
            }
        }

        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind, pos: Position) -> Token {
        let c = self.advance().unwrap_or_default();
        Token::new(kind, c.to_string(), pos)
    }

    fn string(&mut self, pos: Position) -> Result<Token, EvalError> {
        self.advance(); // opening quote
        let mut content = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(EvalError::token_error("unterminated string literal", pos));
                }
                Some('"') => break,
                Some('\\') => {
                    let escape_pos = self.position();
                    match self.advance() {
                        Some('\\') => content.push('\\'),
                        Some('"') => content.push('"'),
                        Some('n') => content.push('\n'),
                        Some('t') => content.push('\t'),
                        Some('r') => content.push('\r'),
                        Some('0') => content.push('\0'),
                        Some(other) => {
                            return Err(EvalError::token_error(
                                format!("unknown escape sequence '\\{}'", other),
                                escape_pos,
                            ));
                        }
                        None => {
                            return Err(EvalError::token_error(
                                "unterminated string literal",
                                pos,
                            ));
                        }
                    }
                }
                Some(c) => content.push(c),
            }
        }

        Ok(Token::new(TokenKind::Str, content, pos))
    }

    fn keyword(&mut self, pos: Position) -> Result<Token, EvalError> {
        self.advance(); // ':'
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_symbol_char(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        if name.is_empty() {
            return Err(EvalError::token_error("bare ':' is not a keyword", pos));
        }
        Ok(Token::new(TokenKind::Keyword, name, pos))
    }

    fn number(&mut self, pos: Position) -> Result<Token, EvalError> {
        let mut lexeme = String::new();
        if matches!(self.peek(), Some('+') | Some('-')) {
            if let Some(sign) = self.advance() {
                lexeme.push(sign);
            }
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-') {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let digits = lexeme.strip_prefix(['+', '-']).unwrap_or(&lexeme);
        let integral = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());

        if integral {
            match lexeme.parse::<i64>() {
                Ok(n) if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n) => {
                    Ok(Token::new(TokenKind::Number, lexeme, pos))
                }
                _ => Ok(Token::new(TokenKind::BigNumber, lexeme, pos)),
            }
        } else {
            match lexeme.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Token::new(TokenKind::Number, lexeme, pos)),
                _ => Err(EvalError::token_error(
                    format!("malformed number literal '{}'", lexeme),
                    pos,
                )),
            }
        }
    }

    fn symbol(&mut self, pos: Position) -> Token {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_symbol_char(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        match name.as_str() {
            "true" | "false" => Token::new(TokenKind::Bool, name, pos),
            "nil" => Token::new(TokenKind::Nil, name, pos),
            _ => Token::new(TokenKind::Symbol, name, pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_delimiters_and_quotes() {
        assert_eq!(
            kinds("()[]{}'`~"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Quote,
                TokenKind::Quasiquote,
                TokenKind::Unquote,
            ]
        );
    }

    #[test]
    fn test_comma_is_whitespace() {
        let tokens = tokenize("(1, 2, 3)").expect("tokenize failed");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].lexeme, "1");
        assert_eq!(tokens[2].lexeme, "2");
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("(a\n  b)").expect("tokenize failed");
        assert_eq!(tokens[0].pos, Position::new(1, 1));
        assert_eq!(tokens[1].pos, Position::new(1, 2));
        assert_eq!(tokens[2].pos, Position::new(2, 3));
        assert_eq!(tokens[3].pos, Position::new(2, 4));
    }

    #[test]
    fn test_comments_consumed_to_newline() {
        let tokens = tokenize("; ignore me\n42 ; trailing").expect("tokenize failed");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].pos, Position::new(2, 1));
    }

    #[test]
    fn test_number_classification() {
        let tokens = tokenize("42 -7.5 1e3 9007199254740991").expect("tokenize failed");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Number));

        let tokens = tokenize("9007199254740992 -12345678901234567890").expect("tokenize failed");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::BigNumber));
        assert_eq!(tokens[1].lexeme, "-12345678901234567890");
    }

    #[test]
    fn test_signed_numbers_vs_symbols() {
        let tokens = tokenize("-5 - -x +3").expect("tokenize failed");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[1].kind, TokenKind::Symbol);
        assert_eq!(tokens[2].kind, TokenKind::Symbol);
        assert_eq!(tokens[2].lexeme, "-x");
        assert_eq!(tokens[3].kind, TokenKind::Number);
    }

    #[test]
    fn test_malformed_number_is_error() {
        assert!(matches!(
            tokenize("1.2.3"),
            Err(EvalError::Token { .. })
        ));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\nb\t\"c\"\\""#).expect("tokenize failed");
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lexeme, "a\nb\t\"c\"\\");
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\"open").expect_err("expected token error");
        assert!(matches!(err, EvalError::Token { .. }));
        assert_eq!(err.position(), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_unknown_escape_is_error() {
        assert!(tokenize(r#""\q""#).is_err());
    }

    #[test]
    fn test_keyword_strips_colon() {
        let tokens = tokenize(":name :a-b?").expect("tokenize failed");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].lexeme, "name");
        assert_eq!(tokens[1].lexeme, "a-b?");
    }

    #[test]
    fn test_bare_colon_is_error() {
        assert!(tokenize(": foo").is_err());
    }

    #[test]
    fn test_boolean_and_nil_literals() {
        let tokens = tokenize("true false nil trueish").expect("tokenize failed");
        assert_eq!(tokens[0].kind, TokenKind::Bool);
        assert_eq!(tokens[1].kind, TokenKind::Bool);
        assert_eq!(tokens[2].kind, TokenKind::Nil);
        assert_eq!(tokens[3].kind, TokenKind::Symbol);
    }

    #[test]
    fn test_operator_symbols() {
        let tokens = tokenize("+ <= >= set! even? str.cat $var %").expect("tokenize failed");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Symbol));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("(a @ b)").expect_err("expected token error");
        assert_eq!(err.position(), Some(Position::new(1, 4)));
    }

    #[test]
    fn test_unicode_column_counting() {
        // Position advances by code points, not bytes
        let tokens = tokenize("\"héllo\" x").expect("tokenize failed");
        assert_eq!(tokens[1].pos, Position::new(1, 9));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").expect("tokenize failed").is_empty());
        assert!(tokenize("  ; just a comment").expect("tokenize failed").is_empty());
    }
}
