// ABOUTME: Parser folding the positioned token stream into expression trees

use crate::error::EvalError;
use crate::expr::{Expr, ExprKind};
use crate::tokenizer::{tokenize, Position, Token, TokenKind};
use num_bigint::BigInt;

/// Parse a whole token stream into its top-level expressions. Empty input
/// yields an empty vector, not an error; the REPL evaluates the results one
/// at a time and the file runner evaluates them in order.
pub fn parse_program(tokens: &[Token]) -> Result<Vec<Expr>, EvalError> {
    let mut parser = Parser { tokens, index: 0 };
    let mut exprs = Vec::new();
    while parser.peek().is_some() {
        exprs.push(parser.expr()?);
    }
    Ok(exprs)
}

/// Tokenize and parse a source string in one step
pub fn parse_source(source: &str) -> Result<Vec<Expr>, EvalError> {
    parse_program(&tokenize(source)?)
}

struct Parser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        Some(token)
    }

    fn end_position(&self) -> Position {
        self.tokens
            .last()
            .map(|t| t.pos)
            .unwrap_or_else(|| Position::new(1, 1))
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let token = match self.advance() {
            Some(t) => t,
            None => {
                return Err(EvalError::parse_error(
                    "unexpected end of input",
                    self.end_position(),
                ));
            }
        };

        let kind = match token.kind {
            TokenKind::Number => {
                let n: f64 = token.lexeme.parse().map_err(|_| {
                    EvalError::parse_error(
                        format!("invalid number literal '{}'", token.lexeme),
                        token.pos,
                    )
                })?;
                ExprKind::Number(n)
            }
            TokenKind::BigNumber => {
                let b: BigInt = token.lexeme.parse().map_err(|_| {
                    EvalError::parse_error(
                        format!("invalid integer literal '{}'", token.lexeme),
                        token.pos,
                    )
                })?;
                ExprKind::BigNumber(b)
            }
            TokenKind::Str => ExprKind::Str(token.lexeme.clone()),
            TokenKind::Bool => ExprKind::Bool(token.lexeme == "true"),
            TokenKind::Keyword => ExprKind::Keyword(token.lexeme.clone()),
            TokenKind::Nil => ExprKind::Nil,
            TokenKind::Symbol => ExprKind::Symbol(token.lexeme.clone()),
            TokenKind::Quote => ExprKind::Quote(Box::new(self.quoted(token, "quote")?)),
            TokenKind::Quasiquote => {
                ExprKind::Quasiquote(Box::new(self.quoted(token, "quasiquote")?))
            }
            TokenKind::Unquote => ExprKind::Unquote(Box::new(self.quoted(token, "unquote")?)),
            TokenKind::LParen => ExprKind::List(self.sequence(token, TokenKind::RParen)?),
            TokenKind::LBracket => ExprKind::Bracket(self.sequence(token, TokenKind::RBracket)?),
            TokenKind::LBrace => {
                let children = self.sequence(token, TokenKind::RBrace)?;
                if children.len() % 2 != 0 {
                    return Err(EvalError::parse_error(
                        "hash-map literal requires an even number of forms",
                        token.pos,
                    ));
                }
                ExprKind::Brace(children)
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                return Err(EvalError::parse_error(
                    format!("unexpected '{}'", token.lexeme),
                    token.pos,
                ));
            }
        };

        Ok(Expr::new(kind, token.pos))
    }

    fn quoted(&mut self, token: &Token, name: &str) -> Result<Expr, EvalError> {
        if self.peek().is_none() {
            return Err(EvalError::parse_error(
                format!("{} requires a following expression", name),
                token.pos,
            ));
        }
        self.expr()
    }

    fn sequence(&mut self, open: &Token, close: TokenKind) -> Result<Vec<Expr>, EvalError> {
        let mut children = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(EvalError::parse_error(
                        format!("unclosed '{}'", open.lexeme),
                        open.pos,
                    ));
                }
                Some(t) if t.kind == close => {
                    self.advance();
                    return Ok(children);
                }
                Some(t)
                    if matches!(
                        t.kind,
                        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
                    ) =>
                {
                    return Err(EvalError::parse_error(
                        format!("'{}' closed by '{}'", open.lexeme, t.lexeme),
                        open.pos,
                    ));
                }
                _ => children.push(self.expr()?),
            }
        }
    }
}
