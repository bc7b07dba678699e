// cviz: C-subset to self-narrating program transpiler

mod codegen;
mod diagnostics;
mod parser;
mod semantics;

use std::fs;
use std::path::Path;
use std::process;

use codegen::generator::CodeGenerator;
use diagnostics::DiagnosticSink;
use parser::lexer::Lexer;
use parser::parse::Parser;
use semantics::analyzer::SemanticAnalyzer;

const OUTPUT_FILE: &str = "output_viz.cpp";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        let program_name = args.first().map(|s| s.as_str()).unwrap_or("cviz");
        eprintln!("Error: No input file provided");
        eprintln!();
        eprintln!("Usage: {} <file.c>", program_name);
        eprintln!();
        eprintln!("Compiles the source file and writes the instrumented program");
        eprintln!("to {} for the visualization runtime to build and replay.", OUTPUT_FILE);
        process::exit(1);
    }

    let input_path = &args[1];
    let mut sink = DiagnosticSink::new();

    if !Path::new(input_path).exists() {
        eprintln!("Error: File '{}' not found", input_path);
        process::exit(1);
    }

    let source = match fs::read_to_string(input_path) {
        Ok(source) => source,
        Err(err) => {
            sink.error(format!("Could not read input file '{}': {}", input_path, err));
            report_and_exit(&sink);
        }
    };

    // Lexing never blocks parsing: lexical errors degrade to tokens the
    // parser diagnoses precisely
    eprintln!("Parsing {}...", input_path);
    let tokens = Lexer::new(&source, &mut sink).tokenize();
    let program = Parser::new(tokens, &mut sink).parse();

    if sink.has_errors() {
        report_and_exit(&sink);
    }
    if let parser::ast::AstNode::Program {
        functions,
        statements,
    } = &program
    {
        eprintln!(
            "Parsed successfully. Found {} function(s) and {} global declaration(s).",
            functions.len(),
            statements.len()
        );
    }

    eprintln!("Analyzing...");
    SemanticAnalyzer::new(&mut sink).analyze(&program);
    if sink.has_errors() {
        report_and_exit(&sink);
    }

    eprintln!("Generating instrumented program...");
    let code = CodeGenerator::new(&mut sink).generate(&program);
    if sink.has_errors() {
        report_and_exit(&sink);
    }

    if let Err(err) = fs::write(OUTPUT_FILE, &code) {
        sink.error(format!("Could not write output file '{}': {}", OUTPUT_FILE, err));
        report_and_exit(&sink);
    }

    // warnings still surface on success, in production order
    for message in sink.messages() {
        eprintln!("{}", message);
    }
    println!("Wrote instrumented program to {}", OUTPUT_FILE);
}

/// Print every accumulated diagnostic in production order and exit non-zero.
fn report_and_exit(sink: &DiagnosticSink) -> ! {
    for message in sink.messages() {
        eprintln!("{}", message);
    }
    eprintln!(
        "Compilation failed with {} error{}",
        sink.error_count(),
        if sink.error_count() == 1 { "" } else { "s" }
    );
    process::exit(1);
}
