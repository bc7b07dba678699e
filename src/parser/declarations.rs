//! Declaration parsing implementation
//!
//! Top-level declarations for the C subset:
//!
//! - Function declarations: `type name(params) { ... }`
//! - Variable declarations: `int x = 42;` (also used for locals and
//!   for-loop initializers)
//! - Pointer types: a `*` directly after the base type extends the type
//!   name (`int*`, `int**`)
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::{AstNode, Param};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl<'a> Parser<'a> {
    /// Parse a function declaration: `type name(params) block`.
    ///
    /// The caller has already classified the lookahead; the current token is
    /// the return-type keyword.
    pub(crate) fn parse_function_declaration(&mut self) -> Option<AstNode> {
        let type_token = self.consume(); // 'int' or 'void'
        let mut return_type = type_token.lexeme;
        while self.match_kind(TokenKind::Star) {
            return_type.push('*');
        }

        let name_token = self.expect(TokenKind::Identifier, "Expected a function name");
        if name_token.kind == TokenKind::Unknown {
            return None;
        }
        let location = name_token.location();

        self.expect(TokenKind::LParen, "Expected '(' after function name");
        let params = self.parse_parameter_list();
        self.expect(TokenKind::RParen, "Expected ')' after parameter list");

        let body = self.parse_block()?;

        Some(AstNode::FunctionDecl {
            name: name_token.lexeme,
            return_type,
            params,
            body: Box::new(body),
            location,
        })
    }

    /// Parse a parameter list up to (not including) the closing `)`.
    ///
    /// Malformed parameters are reported and skipped one token at a time so
    /// a single bad parameter cannot derail the whole declaration.
    fn parse_parameter_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();

        // C-style `(void)` means no parameters
        if self.check(TokenKind::Void) && self.peek(1).kind == TokenKind::RParen {
            self.consume();
            return params;
        }

        while !self.check(TokenKind::RParen) && !self.at_end() {
            if self.check(TokenKind::Int) {
                let type_token = self.consume();
                let mut type_name = type_token.lexeme;
                while self.match_kind(TokenKind::Star) {
                    type_name.push('*');
                }

                let name_token = self.expect(TokenKind::Identifier, "Expected a parameter name");
                if name_token.kind != TokenKind::Unknown {
                    params.push(Param {
                        type_name,
                        name: name_token.lexeme,
                    });
                }

                if self.check(TokenKind::Comma) {
                    self.consume();
                } else if !self.check(TokenKind::RParen) {
                    let location = self.current_location();
                    self.sink.error_at(
                        location,
                        format!("Expected ',' or ')' after parameter, found {}", self.peek(0)),
                    );
                    // a type keyword can start the next parameter; skip
                    // anything else
                    if !self.check(TokenKind::Int) && !self.at_end() {
                        self.consume();
                    }
                }
            } else {
                let location = self.current_location();
                self.sink.error_at(
                    location,
                    format!("Expected a parameter type, found {}", self.peek(0)),
                );
                if !self.at_end() {
                    self.consume();
                }
            }
        }

        params
    }

    /// Parse a variable declaration: `int '*'* name [= expr] ;`.
    ///
    /// Used for globals, locals, and for-loop initializers; the trailing
    /// semicolon is consumed here in every context.
    pub(crate) fn parse_declaration_statement(&mut self) -> Option<AstNode> {
        let type_token = self.expect(TokenKind::Int, "Expected 'int' in variable declaration");
        if type_token.kind == TokenKind::Unknown {
            return None;
        }
        let mut type_name = type_token.lexeme;
        while self.match_kind(TokenKind::Star) {
            type_name.push('*');
        }

        let name_token = self.expect(TokenKind::Identifier, "Expected a variable name");
        if name_token.kind == TokenKind::Unknown {
            return None;
        }
        let location = name_token.location();

        let init = if self.match_kind(TokenKind::Assign) {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        self.expect(
            TokenKind::Semicolon,
            "Expected ';' after variable declaration",
        );

        Some(AstNode::VarDecl {
            type_name,
            name: name_token.lexeme,
            init,
            location,
        })
    }
}
