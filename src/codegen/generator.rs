//! AST-to-text code generation
//!
//! Walks a semantically valid AST and emits the target program: every
//! statement is rendered as the equivalent target-language statement
//! decorated with instrumentation calls narrating what is happening (see
//! [`crate::codegen::emitter`] for the call shapes).
//!
//! Two contexts exist. Ordinary functions are emitted as ordinary target
//! functions. `main` is not: its body is inlined into a
//! `void viz_run_program()` driver that the sink runtime calls exactly once
//! to pre-compute the whole run, letting the renderer replay history
//! instead of live-stepping. When a program has no `main`, its top-level
//! statements form the driver body instead.
//!
//! Every scope construct emits exactly one `viz_push_scope` and one
//! `viz_pop_scope` in the generated text, so push/pop counts balance
//! structurally for any input; the pop after a trailing `return` is
//! statically emitted, runtime-dead text. Expressions are rendered by a
//! pure function and never carry instrumentation of their own.

use crate::codegen::emitter::{InstrumentationEmitter, StepCategory};
use crate::diagnostics::DiagnosticSink;
use crate::parser::ast::{AstNode, Param};

/// Code generator for one compilation unit.
pub struct CodeGenerator<'a> {
    emitter: InstrumentationEmitter,
    current_function: Option<String>,
    in_driver: bool,
    sink: &'a mut DiagnosticSink,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(sink: &'a mut DiagnosticSink) -> Self {
        Self {
            emitter: InstrumentationEmitter::new(),
            current_function: None,
            in_driver: false,
            sink,
        }
    }

    /// Generate the complete target program text.
    pub fn generate(&mut self, program: &AstNode) -> String {
        let AstNode::Program {
            functions,
            statements,
        } = program
        else {
            self.sink.error(format!(
                "Internal: generation started on a {} instead of a program",
                program.kind_name()
            ));
            return String::new();
        };

        let mut out = String::new();
        out.push_str(&self.emitter.prologue());

        let main = functions.iter().find_map(|f| match f {
            AstNode::FunctionDecl { name, .. } if name == "main" => Some(f),
            _ => None,
        });

        // Top-level declarations become plain globals when a main exists;
        // without one they run inside the driver instead
        if main.is_some() {
            for stmt in statements {
                out.push_str(&self.generate_global(stmt));
            }
        }

        for func in functions {
            match func {
                AstNode::FunctionDecl { name, .. } if name == "main" => {}
                AstNode::FunctionDecl {
                    name,
                    return_type,
                    params,
                    body,
                    ..
                } => out.push_str(&self.generate_function(name, return_type, params, body)),
                other => {
                    self.sink.error_at(
                        other.location(),
                        format!(
                            "Internal: unexpected {} among function declarations",
                            other.kind_name()
                        ),
                    );
                }
            }
        }

        out.push_str(&self.generate_driver(main, statements));
        out
    }

    /// A global variable declaration, emitted uninstrumented: nothing has
    /// started running when file scope is initialized.
    fn generate_global(&mut self, stmt: &AstNode) -> String {
        match stmt {
            AstNode::VarDecl {
                type_name,
                name,
                init,
                ..
            } => {
                let decl = match init {
                    Some(init) => format!(
                        "{} {} = {};",
                        type_name,
                        name,
                        generate_expression(init)
                    ),
                    None => format!("{} {};", type_name, name),
                };
                self.emitter.line(&decl)
            }
            other => {
                self.sink.error_at(
                    other.location(),
                    format!("Internal: unexpected {} at file scope", other.kind_name()),
                );
                String::new()
            }
        }
    }

    /// An ordinary (non-`main`) function.
    fn generate_function(
        &mut self,
        name: &str,
        return_type: &str,
        params: &[Param],
        body: &AstNode,
    ) -> String {
        self.current_function = Some(name.to_string());

        let param_list = params
            .iter()
            .map(|p| format!("{} {}", p.type_name, p.name))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::from("\n");
        out.push_str(
            &self
                .emitter
                .line(&format!("{} {}({}) {{", return_type, name, param_list)),
        );
        self.emitter.increase_indent();

        out.push_str(&self.emitter.push_scope());
        out.push_str(&self.emitter.record_step(
            &format!("Entering function: {}({})", name, param_list),
            StepCategory::Call,
        ));
        for param in params {
            out.push_str(&self.emitter.set_variable(&param.name, &param.name));
        }

        out.push_str(&self.generate_body_statements(body));

        out.push_str(&self.emitter.record_step(
            &format!("Leaving function: {}", name),
            StepCategory::Return,
        ));
        out.push_str(&self.emitter.pop_scope());

        self.emitter.decrease_indent();
        out.push_str(&self.emitter.line("}"));

        self.current_function = None;
        out
    }

    /// The driver routine the sink runtime calls once: `main`'s body
    /// inlined, or the top-level statements when no `main` exists.
    fn generate_driver(&mut self, main: Option<&AstNode>, statements: &[AstNode]) -> String {
        self.in_driver = true;
        self.current_function = Some("main".to_string());

        let mut out = String::from("\n");
        out.push_str(&self.emitter.line("void viz_run_program() {"));
        self.emitter.increase_indent();
        out.push_str(&self.emitter.push_scope());

        match main {
            Some(AstNode::FunctionDecl { params, body, .. }) => {
                out.push_str(
                    &self
                        .emitter
                        .record_step("Entering function: main()", StepCategory::Call),
                );
                // main's parameters have no caller inside the driver; give
                // them zero-initialized slots so the body still compiles
                for param in params {
                    out.push_str(
                        &self
                            .emitter
                            .line(&format!("{} {} = 0;", param.type_name, param.name)),
                    );
                    out.push_str(&self.emitter.set_variable(&param.name, &param.name));
                }
                out.push_str(&self.generate_body_statements(body));
                out.push_str(
                    &self
                        .emitter
                        .record_step("Leaving function: main", StepCategory::Return),
                );
            }
            _ => {
                out.push_str(
                    &self
                        .emitter
                        .record_step("Starting program run", StepCategory::ControlFlow),
                );
                for stmt in statements {
                    out.push_str(&self.generate_statement(stmt));
                }
                out.push_str(
                    &self
                        .emitter
                        .record_step("Program run finished", StepCategory::Return),
                );
            }
        }

        out.push_str(&self.emitter.pop_scope());
        self.emitter.decrease_indent();
        out.push_str(&self.emitter.line("}"));

        self.current_function = None;
        self.in_driver = false;
        out
    }

    /// The statements of a function body block. The function's own
    /// scope-push covers the body, so no extra braces or push/pop here.
    fn generate_body_statements(&mut self, body: &AstNode) -> String {
        match body {
            AstNode::Block { statements, .. } => {
                let mut out = String::new();
                for stmt in statements {
                    out.push_str(&self.generate_statement(stmt));
                }
                out
            }
            other => {
                self.sink.error_at(
                    other.location(),
                    format!(
                        "Internal: function body is a {} instead of a block",
                        other.kind_name()
                    ),
                );
                String::new()
            }
        }
    }

    /// One statement plus its instrumentation. Unknown node kinds report an
    /// internal diagnostic and degrade to an empty fragment.
    fn generate_statement(&mut self, node: &AstNode) -> String {
        match node {
            AstNode::VarDecl {
                type_name,
                name,
                init,
                ..
            } => {
                let mut out = String::new();
                match init {
                    Some(init) => {
                        let init_text = generate_expression(init);
                        out.push_str(&self.emitter.record_step(
                            &format!("Declaring: {} {} = {}", type_name, name, init_text),
                            StepCategory::Declaration,
                        ));
                        out.push_str(
                            &self
                                .emitter
                                .line(&format!("{} {} = {};", type_name, name, init_text)),
                        );
                        out.push_str(&self.emitter.set_variable(name, name));
                        if type_name.ends_with('*') {
                            out.push_str(
                                &self.emitter.set_heap_entry(name, &format!("*{}", name)),
                            );
                        }
                    }
                    None => {
                        out.push_str(&self.emitter.record_step(
                            &format!("Declaring: {} {}", type_name, name),
                            StepCategory::Declaration,
                        ));
                        out.push_str(&self.emitter.line(&format!("{} {};", type_name, name)));
                        // no snapshot: the value is indeterminate until
                        // assigned
                    }
                }
                out
            }
            AstNode::Assignment { name, value, .. } => {
                let value_text = generate_expression(value);
                let mut out = String::new();
                out.push_str(&self.emitter.record_step(
                    &format!("Assigning to {}: {}", name, value_text),
                    StepCategory::Assignment,
                ));
                out.push_str(&self.emitter.line(&format!("{} = {};", name, value_text)));
                out.push_str(&self.emitter.set_variable(name, name));
                out
            }
            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let cond_text = generate_expression(condition);
                let mut out = String::new();
                out.push_str(&self.emitter.record_step(
                    &format!("Evaluating if: {}", cond_text),
                    StepCategory::ControlFlow,
                ));
                out.push_str(&self.emitter.line(&format!("if ({}) {{", cond_text)));
                self.emitter.increase_indent();
                out.push_str(&self.emitter.push_scope());
                out.push_str(&self.generate_branch(then_branch));
                out.push_str(&self.emitter.pop_scope());
                self.emitter.decrease_indent();

                if let Some(else_branch) = else_branch {
                    out.push_str(&self.emitter.line("} else {"));
                    self.emitter.increase_indent();
                    out.push_str(&self.emitter.push_scope());
                    out.push_str(
                        &self
                            .emitter
                            .record_step("Entering else branch", StepCategory::ControlFlow),
                    );
                    out.push_str(&self.generate_branch(else_branch));
                    out.push_str(&self.emitter.pop_scope());
                    self.emitter.decrease_indent();
                }

                out.push_str(&self.emitter.line("}"));
                out
            }
            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                let init_text = init.as_deref().map(for_init_text).unwrap_or_default();
                let cond_text = condition
                    .as_deref()
                    .map(generate_expression)
                    .unwrap_or_default();
                let inc_text = increment
                    .as_deref()
                    .map(for_clause_text)
                    .unwrap_or_default();

                let mut out = String::new();
                out.push_str(&self.emitter.record_step(
                    &format!(
                        "Starting for loop: ({}; {}; {})",
                        init_text, cond_text, inc_text
                    ),
                    StepCategory::ControlFlow,
                ));
                out.push_str(&self.emitter.line(&format!(
                    "for ({}; {}; {}) {{",
                    init_text, cond_text, inc_text
                )));
                self.emitter.increase_indent();
                out.push_str(&self.emitter.push_scope());
                out.push_str(&self.generate_branch(body));
                out.push_str(&self.emitter.pop_scope());
                self.emitter.decrease_indent();
                out.push_str(&self.emitter.line("}"));
                out
            }
            AstNode::Return { value, .. } => {
                let function = self
                    .current_function
                    .clone()
                    .unwrap_or_else(|| "<top level>".to_string());
                let mut out = String::new();
                match value {
                    Some(value) => {
                        let value_text = generate_expression(value);
                        out.push_str(&self.emitter.record_step(
                            &format!("Returning from {}: {}", function, value_text),
                            StepCategory::Return,
                        ));
                        if self.in_driver {
                            // the driver is void; the value is narrated only
                            out.push_str(&self.emitter.line("return;"));
                        } else {
                            out.push_str(
                                &self.emitter.line(&format!("return {};", value_text)),
                            );
                        }
                    }
                    None => {
                        out.push_str(&self.emitter.record_step(
                            &format!("Returning from {}", function),
                            StepCategory::Return,
                        ));
                        out.push_str(&self.emitter.line("return;"));
                    }
                }
                out
            }
            AstNode::Call { name, args, .. } => {
                let args_text = args
                    .iter()
                    .map(generate_expression)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut out = String::new();
                out.push_str(&self.emitter.record_step(
                    &format!("Calling function: {}({})", name, args_text),
                    StepCategory::Call,
                ));
                out.push_str(&self.emitter.line(&format!("{}({});", name, args_text)));
                out
            }
            AstNode::Print { format, args, .. } => {
                // the narration is the print: the format string and each
                // argument value are streamed into one recorded step
                let mut out = String::new();
                out.push_str(&self.emitter.line("{"));
                self.emitter.increase_indent();
                out.push_str(&self.emitter.line("std::ostringstream viz_out;"));

                let mut stream = format!("viz_out << \"{}\"", target_escape(format));
                for arg in args {
                    stream.push_str(&format!(" << ({})", generate_expression(arg)));
                }
                stream.push(';');
                out.push_str(&self.emitter.line(&stream));

                out.push_str(&self.emitter.line(
                    "viz_record_step(std::string(\"printf: \") + viz_out.str(), \"print\");",
                ));
                self.emitter.decrease_indent();
                out.push_str(&self.emitter.line("}"));
                out
            }
            AstNode::Block { statements, .. } => {
                let mut out = String::new();
                out.push_str(&self.emitter.line("{"));
                self.emitter.increase_indent();
                out.push_str(&self.emitter.push_scope());
                for stmt in statements {
                    out.push_str(&self.generate_statement(stmt));
                }
                out.push_str(&self.emitter.pop_scope());
                self.emitter.decrease_indent();
                out.push_str(&self.emitter.line("}"));
                out
            }
            other => {
                self.sink.error_at(
                    other.location(),
                    format!(
                        "Internal: unexpected {} in statement position during generation",
                        other.kind_name()
                    ),
                );
                String::new()
            }
        }
    }

    /// An if/for body: the statements of a block, or a single statement.
    /// The caller owns the braces and the scope push/pop.
    fn generate_branch(&mut self, node: &AstNode) -> String {
        match node {
            AstNode::Block { statements, .. } => {
                let mut out = String::new();
                for stmt in statements {
                    out.push_str(&self.generate_statement(stmt));
                }
                out
            }
            single => self.generate_statement(single),
        }
    }
}

/// Render an expression as parenthesized target text. Pure: expressions
/// never emit instrumentation, only statements do. Statement-shaped nodes
/// in expression position render as an empty fragment (the statement
/// dispatcher reports those).
pub fn generate_expression(node: &AstNode) -> String {
    match node {
        AstNode::IntLiteral(value, _) => value.to_string(),
        AstNode::StringLiteral(text, _) => format!("\"{}\"", target_escape(text)),
        AstNode::Identifier(name, _) => name.clone(),
        AstNode::Binary {
            op, left, right, ..
        } => format!(
            "({} {} {})",
            generate_expression(left),
            op.symbol(),
            generate_expression(right)
        ),
        AstNode::Unary { op, operand, .. } => {
            format!("({}{})", op.symbol(), generate_expression(operand))
        }
        AstNode::Call { name, args, .. } => {
            let args_text = args
                .iter()
                .map(generate_expression)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({})", name, args_text)
        }
        _ => String::new(),
    }
}

/// A for-loop initializer as header text (no trailing semicolon).
fn for_init_text(node: &AstNode) -> String {
    match node {
        AstNode::VarDecl {
            type_name,
            name,
            init,
            ..
        } => match init {
            Some(init) => format!("{} {} = {}", type_name, name, generate_expression(init)),
            None => format!("{} {}", type_name, name),
        },
        other => for_clause_text(other),
    }
}

/// A for-loop increment (assignment or call) as header text.
fn for_clause_text(node: &AstNode) -> String {
    match node {
        AstNode::Assignment { name, value, .. } => {
            format!("{} = {}", name, generate_expression(value))
        }
        other => generate_expression(other),
    }
}

/// Escape raw text for a double-quoted target literal.
fn target_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}
