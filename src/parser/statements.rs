//! Statement parsing implementation
//!
//! Statements of the C subset:
//!
//! ```text
//! statement ::= assignment ';' | call ';' | if | for
//!             | return ';' | printf ';' | block
//! block     ::= '{' (declaration | statement)* '}'
//! ```
//!
//! `if`/`for` bodies accept either a single statement or a block. The
//! for-loop header accepts a declaration, an assignment, or a bare `;` as
//! its initializer; condition and increment are independently optional, and
//! the increment accepts assignment or call forms.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::AstNode;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl<'a> Parser<'a> {
    /// Parse a braced block.
    ///
    /// Recovery: a failed inner parse that consumed nothing forfeits one
    /// token, so malformed statements cannot stall the loop or cascade.
    pub(crate) fn parse_block(&mut self) -> Option<AstNode> {
        let brace = self.expect(TokenKind::LBrace, "Expected '{' to open a block");
        if brace.kind == TokenKind::Unknown {
            return None;
        }
        let location = brace.location();

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            let before = self.position;
            let parsed = if self.check(TokenKind::Int) {
                self.parse_declaration_statement()
            } else {
                self.parse_statement()
            };

            match parsed {
                Some(stmt) => statements.push(stmt),
                None => {
                    if self.position == before && !self.at_end() {
                        self.consume();
                    }
                }
            }
        }

        self.expect(TokenKind::RBrace, "Expected '}' to close the block");

        Some(AstNode::Block {
            statements,
            location,
        })
    }

    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<AstNode> {
        match self.peek(0).kind {
            TokenKind::Identifier => {
                if self.peek(1).kind == TokenKind::Assign {
                    let assign = self.parse_assignment()?;
                    self.expect(TokenKind::Semicolon, "Expected ';' after assignment");
                    Some(assign)
                } else if self.peek(1).kind == TokenKind::LParen {
                    let call = self.parse_call()?;
                    self.expect(TokenKind::Semicolon, "Expected ';' after function call");
                    Some(call)
                } else {
                    let location = self.current_location();
                    self.sink.error_at(
                        location,
                        format!(
                            "Expected '=' or '(' after {} in statement position",
                            self.peek(0)
                        ),
                    );
                    self.consume();
                    None
                }
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => {
                let ret = self.parse_return_statement()?;
                self.expect(TokenKind::Semicolon, "Expected ';' after return statement");
                Some(ret)
            }
            TokenKind::Printf => {
                let print = self.parse_print_statement()?;
                self.expect(TokenKind::Semicolon, "Expected ';' after printf");
                Some(print)
            }
            TokenKind::LBrace => self.parse_block(),
            _ => {
                let location = self.current_location();
                self.sink.error_at(
                    location,
                    format!("Unexpected {} in statement position", self.peek(0)),
                );
                self.consume();
                None
            }
        }
    }

    /// Parse `name = expression` without the trailing semicolon (shared by
    /// statements and the for-loop header).
    pub(crate) fn parse_assignment(&mut self) -> Option<AstNode> {
        let name_token = self.expect(TokenKind::Identifier, "Expected a variable name");
        if name_token.kind == TokenKind::Unknown {
            return None;
        }
        let location = name_token.location();

        let assign = self.expect(TokenKind::Assign, "Expected '=' in assignment");
        if assign.kind == TokenKind::Unknown {
            return None;
        }

        let value = self.parse_expression()?;

        Some(AstNode::Assignment {
            name: name_token.lexeme,
            value: Box::new(value),
            location,
        })
    }

    /// Parse `if (cond) stmt [else stmt]`.
    fn parse_if_statement(&mut self) -> Option<AstNode> {
        let keyword = self.consume(); // 'if'
        let location = keyword.location();

        self.expect(TokenKind::LParen, "Expected '(' after 'if'");
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "Expected ')' after if condition");

        let then_branch = self.parse_statement()?;

        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Some(AstNode::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            location,
        })
    }

    /// Parse `for (init; cond; inc) stmt`.
    fn parse_for_statement(&mut self) -> Option<AstNode> {
        let keyword = self.consume(); // 'for'
        let location = keyword.location();

        self.expect(TokenKind::LParen, "Expected '(' after 'for'");

        // Initializer: declaration, assignment, or empty
        let init = if self.check(TokenKind::Semicolon) {
            self.consume();
            None
        } else if self.check(TokenKind::Int) {
            // the declaration consumes its own ';'
            Some(Box::new(self.parse_declaration_statement()?))
        } else if self.check(TokenKind::Identifier) && self.peek(1).kind == TokenKind::Assign {
            let assign = self.parse_assignment()?;
            self.expect(
                TokenKind::Semicolon,
                "Expected ';' after for-loop initializer",
            );
            Some(Box::new(assign))
        } else {
            self.expect(
                TokenKind::Semicolon,
                "Expected a declaration, assignment, or ';' in for-loop initializer",
            );
            None
        };

        // Condition (optional)
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        self.expect(TokenKind::Semicolon, "Expected ';' after for-loop condition");

        // Increment (optional): assignment or call form
        let increment = if self.check(TokenKind::RParen) {
            None
        } else if self.check(TokenKind::Identifier) && self.peek(1).kind == TokenKind::Assign {
            Some(Box::new(self.parse_assignment()?))
        } else if self.check(TokenKind::Identifier) && self.peek(1).kind == TokenKind::LParen {
            Some(Box::new(self.parse_call()?))
        } else {
            let location = self.current_location();
            self.sink.error_at(
                location,
                format!(
                    "Expected an assignment or call in for-loop increment, found {}",
                    self.peek(0)
                ),
            );
            self.consume();
            return None;
        };

        self.expect(TokenKind::RParen, "Expected ')' after for-loop header");

        let body = self.parse_statement()?;

        Some(AstNode::For {
            init,
            condition,
            increment,
            body: Box::new(body),
            location,
        })
    }

    /// Parse `return [expression]` without the trailing semicolon.
    fn parse_return_statement(&mut self) -> Option<AstNode> {
        let keyword = self.consume(); // 'return'
        let location = keyword.location();

        let value = if self.check(TokenKind::Semicolon) || self.check(TokenKind::RBrace) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };

        Some(AstNode::Return { value, location })
    }

    /// Parse `printf(format, args...)` without the trailing semicolon.
    fn parse_print_statement(&mut self) -> Option<AstNode> {
        let keyword = self.consume(); // 'printf'
        let location = keyword.location();

        self.expect(TokenKind::LParen, "Expected '(' after 'printf'");

        let format_token = self.expect(
            TokenKind::StringLiteral,
            "Expected a format string in printf",
        );
        if format_token.kind == TokenKind::Unknown {
            return None;
        }

        let mut args = Vec::new();
        while self.match_kind(TokenKind::Comma) {
            let before = self.position;
            match self.parse_expression() {
                Some(arg) => args.push(arg),
                None => {
                    if self.position == before && !self.check(TokenKind::RParen) && !self.at_end()
                    {
                        self.consume();
                    }
                }
            }
        }

        self.expect(TokenKind::RParen, "Expected ')' after printf arguments");

        Some(AstNode::Print {
            format: format_token.lexeme,
            args,
            location,
        })
    }
}
