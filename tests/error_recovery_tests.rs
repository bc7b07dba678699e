// Tests for syntactic error recovery: one bad token must not take down
// the rest of the parse, and every error carries a precise position.

use cviz::diagnostics::DiagnosticSink;
use cviz::parser::ast::AstNode;
use cviz::parser::lexer::Lexer;
use cviz::parser::parse::Parser;

fn parse(source: &str) -> (AstNode, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let tokens = Lexer::new(source, &mut sink).tokenize();
    let program = Parser::new(tokens, &mut sink).parse();
    (program, sink)
}

fn functions(program: &AstNode) -> &[AstNode] {
    let AstNode::Program { functions, .. } = program else {
        panic!("Expected program root");
    };
    functions
}

#[test]
fn test_missing_semicolon_is_one_error_and_body_survives() {
    let (program, sink) = parse("int main() { int a = 1 int b = 2; return a; }");
    assert_eq!(sink.error_count(), 1);

    let AstNode::FunctionDecl { body, .. } = &functions(&program)[0] else {
        panic!("Expected function declaration");
    };
    let AstNode::Block { statements, .. } = body.as_ref() else {
        panic!("Expected block body");
    };
    // both declarations and the return made it through
    assert_eq!(statements.len(), 3);
}

#[test]
fn test_missing_closing_brace_at_eof_terminates() {
    let (program, sink) = parse("int main() { return 0;");
    assert_eq!(sink.error_count(), 1);
    assert!(sink.messages()[0].message.contains("Expected '}'"));
    assert_eq!(functions(&program).len(), 1);
}

#[test]
fn test_later_function_survives_earlier_garbage() {
    let (program, sink) = parse("int () { } int fine() { return 1; }");
    assert!(sink.has_errors());

    let names: Vec<&str> = functions(&program)
        .iter()
        .filter_map(|f| match f {
            AstNode::FunctionDecl { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert!(names.contains(&"fine"));
}

#[test]
fn test_error_positions_point_at_the_offending_token() {
    let (_, sink) = parse("int main() {\n    int a = ;\n}");
    assert_eq!(sink.error_count(), 1);
    let location = sink.messages()[0].location.expect("position known");
    assert_eq!(location.line, 2);
}

#[test]
fn test_unclosed_condition_still_yields_if_body() {
    let (program, sink) = parse("int main() { if (1 == 1 { return 1; } return 0; }");
    assert!(sink.has_errors());

    let AstNode::FunctionDecl { body, .. } = &functions(&program)[0] else {
        panic!("Expected function declaration");
    };
    let AstNode::Block { statements, .. } = body.as_ref() else {
        panic!("Expected block body");
    };
    assert!(statements.iter().any(|s| matches!(s, AstNode::If { .. })));
    assert!(statements
        .iter()
        .any(|s| matches!(s, AstNode::Return { .. })));
}

#[test]
fn test_bad_for_increment_recovers_at_statement_boundary() {
    let (program, sink) = parse("int main() { for (int i = 0; i < 3; 42) { } return 0; }");
    assert!(sink.has_errors());

    // the for loop is dropped, the trailing return survives
    let AstNode::FunctionDecl { body, .. } = &functions(&program)[0] else {
        panic!("Expected function declaration");
    };
    let AstNode::Block { statements, .. } = body.as_ref() else {
        panic!("Expected block body");
    };
    assert!(statements
        .iter()
        .any(|s| matches!(s, AstNode::Return { .. })));
}

#[test]
fn test_every_reported_error_has_a_position() {
    let (_, sink) = parse("int main() { int = 5; ! return 0; }");
    assert!(sink.has_errors());
    for message in sink.messages() {
        assert!(message.location.is_some(), "missing position: {}", message);
    }
}
