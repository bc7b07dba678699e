// Integration tests for the full compilation pipeline

use cviz::codegen::generator::CodeGenerator;
use cviz::diagnostics::DiagnosticSink;
use cviz::parser::ast::AstNode;
use cviz::parser::lexer::Lexer;
use cviz::parser::parse::Parser;
use cviz::semantics::analyzer::SemanticAnalyzer;

/// Run the whole pipeline. The stages themselves never gate on errors;
/// callers decide what the accumulated diagnostics mean.
fn compile(source: &str) -> (String, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let tokens = Lexer::new(source, &mut sink).tokenize();
    let program = Parser::new(tokens, &mut sink).parse();
    SemanticAnalyzer::new(&mut sink).analyze(&program);
    let code = CodeGenerator::new(&mut sink).generate(&program);
    (code, sink)
}

#[test]
fn test_full_pipeline_on_comprehensive_program() {
    let source = r#"
        // running total demo
        int limit = 10;

        int add(int a, int b) {
            return a + b;
        }

        int clamp(int v) {
            if (v > limit) {
                return limit;
            }
            return v;
        }

        void report(int value) {
            printf("value=%d", value);
        }

        int main() {
            int total = 0;
            for (int i = 0; i < 3; i = i + 1) {
                total = add(total, i);
            }
            int capped = clamp(total);
            report(capped);
            int x = 5;
            int* p = &x;
            return *p;
        }
    "#;

    let (code, sink) = compile(source);
    assert!(!sink.has_errors(), "{:?}", sink.messages());

    // ordinary functions are emitted as functions
    assert!(code.contains("int add(int a, int b) {"));
    assert!(code.contains("int clamp(int v) {"));
    assert!(code.contains("void report(int value) {"));

    // main is inlined into the driver, not emitted as a function
    assert!(code.contains("void viz_run_program() {"));
    assert!(!code.contains("int main("));

    // the global is a plain declaration
    assert!(code.contains("int limit = 10;"));

    // narration categories show up
    assert!(code.contains("\"declaration\""));
    assert!(code.contains("\"assignment\""));
    assert!(code.contains("\"control-flow\""));
    assert!(code.contains("\"call\""));
    assert!(code.contains("\"return\""));
    assert!(code.contains("\"print\""));

    // pointer declaration snapshots the pointee
    assert!(code.contains("viz_set_heap_entry(viz_show_addr(p), viz_show(*p));"));
}

#[test]
fn test_push_pop_balance_across_whole_program() {
    let source = r#"
        int sign(int v) {
            if (v < 0) {
                return -1;
            } else {
                if (v == 0) {
                    return 0;
                }
            }
            return 1;
        }

        int main() {
            int s = 0;
            for (int i = -2; i < 3; i = i + 1) {
                s = s + sign(i);
            }
            return s;
        }
    "#;

    let (code, sink) = compile(source);
    assert!(!sink.has_errors(), "{:?}", sink.messages());

    let pushes = code.matches("viz_push_scope()").count();
    let pops = code.matches("viz_pop_scope()").count();
    assert_eq!(pushes, pops);
    assert!(pushes > 0);
}

#[test]
fn test_diagnostics_come_out_in_production_order() {
    let (_, sink) = compile("int main(){int a=1;int a=2;return x;}");
    assert_eq!(sink.error_count(), 2);
    assert!(sink.messages()[0].message.contains("Redeclaration"));
    assert!(sink.messages()[1].message.contains("undeclared identifier"));
}

#[test]
fn test_unterminated_string_single_diagnostic_end_to_end() {
    let mut sink = DiagnosticSink::new();
    let tokens = Lexer::new("int main() { printf(\"oops); }", &mut sink).tokenize();

    // the token stream is complete and EOF-terminated
    assert_eq!(
        tokens.last().unwrap().kind,
        cviz::parser::lexer::TokenKind::Eof
    );
    let string_errors = sink
        .messages()
        .iter()
        .filter(|m| m.message.contains("Unterminated string"))
        .count();
    assert_eq!(string_errors, 1);
}

#[test]
fn test_lexical_errors_never_block_parsing() {
    // the stray '@' degrades to an Unknown token; the parser still builds
    // the function around the damage
    let (_, sink) = {
        let mut sink = DiagnosticSink::new();
        let tokens = Lexer::new("@ int twice(int n) { return n + n; }", &mut sink).tokenize();
        let program = Parser::new(tokens, &mut sink).parse();

        let AstNode::Program { functions, .. } = &program else {
            panic!("Expected program root");
        };
        assert_eq!(functions.len(), 1);
        (program, sink)
    };
    assert!(sink.has_errors());
}

#[test]
fn test_program_without_main_still_generates_driver() {
    let (code, sink) = compile("int answer = 42;");
    assert!(!sink.has_errors(), "{:?}", sink.messages());
    assert!(code.contains("void viz_run_program() {"));
    assert!(code.contains("Declaring: int answer = 42"));
}

#[test]
fn test_mutually_recursive_functions_compile() {
    let source = r#"
        int is_even(int n) {
            if (n == 0) {
                return 1;
            }
            return is_odd(n - 1);
        }

        int is_odd(int n) {
            if (n == 0) {
                return 0;
            }
            return is_even(n - 1);
        }

        int main() {
            return is_even(10);
        }
    "#;

    let (code, sink) = compile(source);
    assert!(!sink.has_errors(), "{:?}", sink.messages());
    assert!(code.contains("int is_even(int n) {"));
    assert!(code.contains("int is_odd(int n) {"));
}

#[test]
fn test_each_compilation_gets_independent_state() {
    // compiling a bad program must leave no trace in a later compilation
    let (_, bad_sink) = compile("int main(){return x;}");
    assert!(bad_sink.has_errors());

    let (_, good_sink) = compile("int main(){return 0;}");
    assert!(!good_sink.has_errors(), "{:?}", good_sink.messages());
}
