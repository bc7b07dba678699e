//! Expression parsing implementation
//!
//! Precedence chain, lowest to highest:
//!
//! ```text
//! expression     ::= equality
//! equality       ::= comparison (('==' | '!=') comparison)*
//! comparison     ::= additive (('<' | '<=' | '>' | '>=') additive)*
//! additive       ::= multiplicative (('+' | '-') multiplicative)*
//! multiplicative ::= unary (('*' | '/') unary)*
//! unary          ::= ('-' | '*' | '&') unary | primary
//! primary        ::= INT | STRING | IDENT | call | '(' expression ')'
//! ```
//!
//! Binary operators fold left-associatively, one method per level. All
//! parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::{AstNode, BinOp, UnOp};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl<'a> Parser<'a> {
    /// Parse an expression (top-level entry point).
    pub(crate) fn parse_expression(&mut self) -> Option<AstNode> {
        self.parse_equality()
    }

    /// Parse equality (`==` `!=`).
    fn parse_equality(&mut self) -> Option<AstNode> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = if self.check(TokenKind::EqEq) {
                BinOp::Eq
            } else if self.check(TokenKind::NotEq) {
                BinOp::Ne
            } else {
                break;
            };
            let op_token = self.consume();
            let right = self.parse_comparison()?;
            left = AstNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: op_token.location(),
            };
        }

        Some(left)
    }

    /// Parse comparison (`<` `<=` `>` `>=`).
    fn parse_comparison(&mut self) -> Option<AstNode> {
        let mut left = self.parse_additive()?;

        loop {
            let op = if self.check(TokenKind::Lt) {
                BinOp::Lt
            } else if self.check(TokenKind::Le) {
                BinOp::Le
            } else if self.check(TokenKind::Gt) {
                BinOp::Gt
            } else if self.check(TokenKind::Ge) {
                BinOp::Ge
            } else {
                break;
            };
            let op_token = self.consume();
            let right = self.parse_additive()?;
            left = AstNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: op_token.location(),
            };
        }

        Some(left)
    }

    /// Parse additive (`+` `-`).
    fn parse_additive(&mut self) -> Option<AstNode> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = if self.check(TokenKind::Plus) {
                BinOp::Add
            } else if self.check(TokenKind::Minus) {
                BinOp::Sub
            } else {
                break;
            };
            let op_token = self.consume();
            let right = self.parse_multiplicative()?;
            left = AstNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: op_token.location(),
            };
        }

        Some(left)
    }

    /// Parse multiplicative (`*` `/`).
    fn parse_multiplicative(&mut self) -> Option<AstNode> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.check(TokenKind::Star) {
                BinOp::Mul
            } else if self.check(TokenKind::Slash) {
                BinOp::Div
            } else {
                break;
            };
            let op_token = self.consume();
            let right = self.parse_unary()?;
            left = AstNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                location: op_token.location(),
            };
        }

        Some(left)
    }

    /// Parse unary (`-` `*` `&`), right-recursive.
    fn parse_unary(&mut self) -> Option<AstNode> {
        let op = if self.check(TokenKind::Minus) {
            Some(UnOp::Neg)
        } else if self.check(TokenKind::Star) {
            Some(UnOp::Deref)
        } else if self.check(TokenKind::Amp) {
            Some(UnOp::AddrOf)
        } else {
            None
        };

        if let Some(op) = op {
            let op_token = self.consume();
            let operand = self.parse_unary()?;
            return Some(AstNode::Unary {
                op,
                operand: Box::new(operand),
                location: op_token.location(),
            });
        }

        self.parse_primary()
    }

    /// Parse a primary expression.
    fn parse_primary(&mut self) -> Option<AstNode> {
        let location = self.current_location();

        match self.peek(0).kind {
            TokenKind::IntLiteral => {
                let token = self.consume();
                match token.lexeme.parse::<i64>() {
                    Ok(value) => Some(AstNode::IntLiteral(value, location)),
                    Err(_) => {
                        self.sink.error_at(
                            location,
                            format!("Integer literal out of range: {}", token.lexeme),
                        );
                        Some(AstNode::IntLiteral(0, location))
                    }
                }
            }
            TokenKind::StringLiteral => {
                let token = self.consume();
                Some(AstNode::StringLiteral(token.lexeme, location))
            }
            TokenKind::Identifier => {
                if self.peek(1).kind == TokenKind::LParen {
                    self.parse_call()
                } else {
                    let token = self.consume();
                    Some(AstNode::Identifier(token.lexeme, location))
                }
            }
            TokenKind::LParen => {
                self.consume();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "Expected ')' after expression");
                Some(expr)
            }
            _ => {
                self.sink.error_at(
                    location,
                    format!("Unexpected {} in expression position", self.peek(0)),
                );
                self.consume();
                None
            }
        }
    }

    /// Parse a function call: `name(args)`. Shared between expression and
    /// statement positions.
    pub(crate) fn parse_call(&mut self) -> Option<AstNode> {
        let name_token = self.expect(TokenKind::Identifier, "Expected a function name");
        if name_token.kind == TokenKind::Unknown {
            return None;
        }
        let location = name_token.location();

        self.expect(TokenKind::LParen, "Expected '(' after function name");

        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_end() {
            let before = self.position;
            match self.parse_expression() {
                Some(arg) => args.push(arg),
                None => {
                    if self.position == before && !self.at_end() {
                        self.consume();
                    }
                }
            }

            if self.check(TokenKind::Comma) {
                self.consume();
            } else if !self.check(TokenKind::RParen) {
                let location = self.current_location();
                self.sink.error_at(
                    location,
                    format!(
                        "Expected ',' or ')' in call arguments, found {}",
                        self.peek(0)
                    ),
                );
                if !self.at_end() {
                    self.consume();
                }
            }
        }

        self.expect(TokenKind::RParen, "Expected ')' after call arguments");

        Some(AstNode::Call {
            name: name_token.lexeme,
            args,
            location,
        })
    }
}
