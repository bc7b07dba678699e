//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure: the token cursor, the `expect`/`match_kind` helpers, and
//! the top-level `parse` entry point.
//!
//! # Parser Architecture
//!
//! Recursive descent with one token of lookahead (two past a type keyword to
//! tell functions from global variables). Parser methods are split across
//! multiple files using `impl Parser` blocks:
//! - This module: Parser struct, helpers, and the program rule
//! - `declarations`: function and variable declarations
//! - `statements`: statements and blocks
//! - `expressions`: the precedence chain
//!
//! # Error Recovery
//!
//! The parser never panics and never returns `Err`. Failures are reported
//! into the shared [`DiagnosticSink`] and surface as `None` from sub-parses,
//! which callers check without dereferencing; [`Parser::expect`] yields an
//! `Unknown` sentinel token on mismatch. On an unexpected token the parser
//! reports at that token's exact position and consumes exactly one token,
//! bounding the cascade to one spurious diagnostic per invalid token. The
//! returned `Program` is always valid-shaped; callers decide whether to
//! proceed by consulting the sink, not the return value.

use crate::diagnostics::DiagnosticSink;
use crate::parser::ast::{AstNode, SourceLocation};
use crate::parser::lexer::{Token, TokenKind};

/// Recursive descent parser for the C subset
pub struct Parser<'a> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) sink: &'a mut DiagnosticSink,
}

impl<'a> Parser<'a> {
    /// Create a parser over a token stream.
    ///
    /// The lexer guarantees an `Eof`-terminated stream; an empty stream is
    /// tolerated by appending one so the cursor always has a token to show.
    pub fn new(mut tokens: Vec<Token>, sink: &'a mut DiagnosticSink) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", 1, 1));
        }
        Self {
            tokens,
            position: 0,
            sink,
        }
    }

    /// Parse the entire program.
    ///
    /// Always returns a valid-shaped `Program`, possibly alongside
    /// accumulated diagnostics.
    pub fn parse(mut self) -> AstNode {
        let mut functions = Vec::new();
        let mut statements = Vec::new();

        while !self.at_end() {
            let before = self.position;

            match self.peek(0).kind {
                TokenKind::Int | TokenKind::Void => {
                    if self.looks_like_function() {
                        if let Some(func) = self.parse_function_declaration() {
                            functions.push(func);
                        }
                    } else if let Some(decl) = self.parse_declaration_statement() {
                        statements.push(decl);
                    }
                }
                _ => {
                    let token = self.peek(0).clone();
                    self.sink.error_at(
                        token.location(),
                        format!(
                            "Expected a function or global variable declaration, found {}",
                            token
                        ),
                    );
                    self.consume();
                }
            }

            // A failed sub-parse must not stall the loop
            if self.position == before && !self.at_end() {
                self.consume();
            }
        }

        AstNode::Program {
            functions,
            statements,
        }
    }

    /// `type '*'* IDENT '('` means a function declaration; `type '*'* IDENT`
    /// otherwise means a global variable. Pointer stars extend the type, so
    /// the two decisive tokens are the ones past the extended type keyword.
    fn looks_like_function(&self) -> bool {
        let mut k = 1;
        while self.peek(k).kind == TokenKind::Star {
            k += 1;
        }
        self.peek(k).kind == TokenKind::Identifier && self.peek(k + 1).kind == TokenKind::LParen
    }

    // ===== Cursor helpers =====

    /// Look at the token `offset` positions ahead without consuming.
    /// Clamps to the final `Eof` token past the end.
    pub(crate) fn peek(&self, offset: usize) -> &Token {
        let index = (self.position + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Consume the current token and advance. At `Eof` the cursor stays put.
    pub(crate) fn consume(&mut self) -> Token {
        let token = self.tokens[self.position.min(self.tokens.len() - 1)].clone();
        if !self.at_end() {
            self.position += 1;
        }
        token
    }

    /// True if the current token has the given kind.
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.peek(0).kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind, or report `message` at the current
    /// position and return an `Unknown` sentinel token so the caller can
    /// short-circuit just its own subtree.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> Token {
        if self.check(kind) {
            self.consume()
        } else {
            let location = self.current_location();
            self.sink
                .error_at(location, format!("{}, found {}", message, self.peek(0)));
            Token::unknown(location)
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.peek(0).kind == TokenKind::Eof
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek(0).location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::BinOp;
    use crate::parser::lexer::Lexer;

    fn parse(source: &str) -> (AstNode, DiagnosticSink) {
        let mut sink = DiagnosticSink::new();
        let tokens = Lexer::new(source, &mut sink).tokenize();
        let program = Parser::new(tokens, &mut sink).parse();
        (program, sink)
    }

    #[test]
    fn test_parse_simple_function_shape() {
        let (program, sink) = parse("int main(){int a=1;int b=2;return a+b;}");
        assert!(!sink.has_errors());

        let AstNode::Program {
            functions,
            statements,
        } = &program
        else {
            panic!("Expected program root");
        };
        assert_eq!(functions.len(), 1);
        assert!(statements.is_empty());

        let AstNode::FunctionDecl {
            name,
            return_type,
            params,
            body,
            ..
        } = &functions[0]
        else {
            panic!("Expected function declaration");
        };
        assert_eq!(name, "main");
        assert_eq!(return_type, "int");
        assert!(params.is_empty());

        let AstNode::Block { statements, .. } = body.as_ref() else {
            panic!("Expected block body");
        };
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0], AstNode::VarDecl { .. }));
        assert!(matches!(statements[1], AstNode::VarDecl { .. }));
        let AstNode::Return {
            value: Some(value), ..
        } = &statements[2]
        else {
            panic!("Expected return with a value");
        };
        assert!(matches!(
            value.as_ref(),
            AstNode::Binary { op: BinOp::Add, .. }
        ));
    }

    #[test]
    fn test_global_vs_function_classification() {
        let (program, sink) = parse("int g = 3; int main() { return g; }");
        assert!(!sink.has_errors());

        let AstNode::Program {
            functions,
            statements,
        } = &program
        else {
            panic!("Expected program root");
        };
        assert_eq!(functions.len(), 1);
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], AstNode::VarDecl { .. }));
    }

    #[test]
    fn test_pointer_return_type_still_classifies_as_function() {
        let (program, sink) = parse("int* head() { return 0; }");
        assert!(!sink.has_errors());

        let AstNode::Program { functions, .. } = &program else {
            panic!("Expected program root");
        };
        let AstNode::FunctionDecl { return_type, .. } = &functions[0] else {
            panic!("Expected function declaration");
        };
        assert_eq!(return_type, "int*");
    }

    #[test]
    fn test_error_recovery_keeps_later_declarations() {
        // The stray '@' is one lexical error; the parser then reports one
        // statement-position error and keeps going.
        let (program, sink) = parse("@ int main() { return 0; }");
        assert!(sink.has_errors());

        let AstNode::Program { functions, .. } = &program else {
            panic!("Expected program root");
        };
        assert_eq!(functions.len(), 1);
    }

    #[test]
    fn test_empty_input_parses_to_empty_program() {
        let (program, sink) = parse("");
        assert!(!sink.has_errors());
        let AstNode::Program {
            functions,
            statements,
        } = &program
        else {
            panic!("Expected program root");
        };
        assert!(functions.is_empty());
        assert!(statements.is_empty());
    }

    #[test]
    fn test_missing_semicolon_reports_position() {
        let (_, sink) = parse("int main() { int a = 1 }");
        assert!(sink.has_errors());
        let msg = sink.messages()[0].to_string();
        assert!(msg.contains("Expected ';'"), "got: {}", msg);
        assert!(sink.messages()[0].location.is_some());
    }
}
