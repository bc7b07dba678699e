//! # Introduction
//!
//! cviz compiles a minimal C subset into an instrumented C++-flavored
//! program whose execution narrates its own state (declarations,
//! assignments, control flow, function entry/exit, stack and heap
//! snapshots) to an external visualization runtime.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Semantic Analyzer → Code Generator → Target text
//! ```
//!
//! 1. [`parser`] — tokenises the source and builds an AST, recovering
//!    locally from syntax errors.
//! 2. [`semantics`] — checks the AST against a scope-stack symbol table
//!    and reports every violation found.
//! 3. [`codegen`] — emits the target program, pairing each statement with
//!    calls into the instrumentation sink API.
//! 4. [`diagnostics`] — the shared accumulating sink every stage reports
//!    into; no stage throws or aborts.
//!
//! Each stage fully consumes its input before the next starts. The caller
//! checks the sink between stages; the stages themselves never refuse to
//! run. One `DiagnosticSink` (and one of each pipeline struct) belongs to
//! exactly one compilation.
//!
//! ## Supported C subset
//!
//! Types: `int`, `void` (returns only), pointer spellings (`int*`).
//! Statements: declarations, assignments, `if`/`else`, `for`, `return`,
//! `printf`, bare blocks. Expressions: `+ - * /`, comparisons, equality,
//! unary `-` `*` `&`, function calls.

pub mod codegen;
pub mod diagnostics;
pub mod parser;
pub mod semantics;
