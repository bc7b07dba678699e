//! Scope-aware semantic analysis
//!
//! Walks the AST, populating and consulting the [`SymbolTable`], and
//! reports undeclared identifiers, redeclarations, arity and type
//! mismatches into the shared diagnostic sink. Nothing here is fatal:
//! the whole tree is always visited and every violation found is
//! reported, so one error cannot hide the next.
//!
//! Functions are handled in two passes. The first registers every
//! function's signature in the global scope, so forward and mutually
//! recursive calls resolve; the second visits each body in its own pushed
//! scope with the parameters pre-registered. A body-level declaration
//! that collides with a parameter is a redeclaration; an inner block may
//! shadow anything.
//!
//! The int-only type system treats `"string"` as a literal-only type for
//! printf formatting, and `"unknown"` as "already diagnosed, do not flag
//! again" so one undeclared identifier does not cascade into a chain of
//! type errors.

use crate::diagnostics::DiagnosticSink;
use crate::parser::ast::{AstNode, Param, SourceLocation, UnOp};
use crate::semantics::symbol_table::{Symbol, SymbolKind, SymbolTable};

struct FunctionContext {
    name: String,
    return_type: String,
}

/// Semantic analyzer for one compilation unit.
///
/// Owns a fresh [`SymbolTable`] per instance; independent inputs must use
/// independent analyzers.
pub struct SemanticAnalyzer<'a> {
    table: SymbolTable,
    sink: &'a mut DiagnosticSink,
    current_function: Option<FunctionContext>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(sink: &'a mut DiagnosticSink) -> Self {
        Self {
            table: SymbolTable::new(),
            sink,
            current_function: None,
        }
    }

    /// Analyze a whole program. Diagnostics accumulate in the sink; the
    /// caller decides afterwards whether to continue the pipeline.
    pub fn analyze(&mut self, program: &AstNode) {
        let AstNode::Program {
            functions,
            statements,
        } = program
        else {
            self.sink.error(format!(
                "Internal: analysis started on a {} instead of a program",
                program.kind_name()
            ));
            return;
        };

        // Pass 1: register every function signature in the global scope
        for func in functions {
            if let AstNode::FunctionDecl {
                name,
                return_type,
                params,
                location,
                ..
            } = func
            {
                let symbol = Symbol::function(name.clone(), return_type.clone(), params.clone());
                if !self.table.add_symbol(symbol) {
                    self.sink
                        .error_at(*location, format!("Redefinition of function '{}'", name));
                }
            } else {
                self.sink.error_at(
                    func.location(),
                    format!(
                        "Internal: unexpected {} among function declarations",
                        func.kind_name()
                    ),
                );
            }
        }

        // Top-level declarations land in the global scope before any body
        // is visited, so function bodies can refer to globals
        for stmt in statements {
            self.visit_statement(stmt);
        }

        // Pass 2: visit every function body
        for func in functions {
            if let AstNode::FunctionDecl {
                name,
                return_type,
                params,
                body,
                location,
            } = func
            {
                self.visit_function(name, return_type, params, body, *location);
            }
        }
    }

    fn visit_function(
        &mut self,
        name: &str,
        return_type: &str,
        params: &[Param],
        body: &AstNode,
        location: SourceLocation,
    ) {
        self.current_function = Some(FunctionContext {
            name: name.to_string(),
            return_type: return_type.to_string(),
        });

        self.table.enter_scope();
        for param in params {
            let symbol = Symbol::variable(param.name.clone(), param.type_name.clone());
            if !self.table.add_symbol(symbol) {
                self.sink.error_at(
                    location,
                    format!(
                        "Redeclaration of parameter '{}' in function '{}'",
                        param.name, name
                    ),
                );
            }
        }

        // Body statements share the parameter scope, so a top-level body
        // declaration colliding with a parameter is a redeclaration
        if let AstNode::Block { statements, .. } = body {
            for stmt in statements {
                self.visit_statement(stmt);
            }
        } else {
            self.sink.error_at(
                body.location(),
                format!(
                    "Internal: function '{}' has a {} for a body",
                    name,
                    body.kind_name()
                ),
            );
        }

        self.table.exit_scope();
        self.current_function = None;
    }

    fn visit_statement(&mut self, node: &AstNode) {
        match node {
            AstNode::VarDecl {
                type_name,
                name,
                init,
                location,
            } => {
                if self.table.lookup_in_current_scope(name).is_some() {
                    self.sink
                        .error_at(*location, format!("Redeclaration of variable '{}'", name));
                } else {
                    self.table
                        .add_symbol(Symbol::variable(name.clone(), type_name.clone()));
                }

                if let Some(init) = init {
                    self.visit_expression(init);
                    let init_type = self.infer_type(init);
                    if init_type != *type_name && init_type != "unknown" {
                        self.sink.error_at(
                            *location,
                            format!(
                                "Type mismatch in initialization of '{}': expected '{}', got '{}'",
                                name, type_name, init_type
                            ),
                        );
                    }
                }
            }
            AstNode::Assignment {
                name,
                value,
                location,
            } => {
                let target_type = match self.table.lookup(name) {
                    None => {
                        self.sink.error_at(
                            *location,
                            format!("Assignment to undeclared identifier '{}'", name),
                        );
                        None
                    }
                    Some(symbol) if symbol.kind != SymbolKind::Variable => {
                        self.sink
                            .error_at(*location, format!("'{}' is not a variable", name));
                        None
                    }
                    Some(symbol) => Some(symbol.data_type.clone()),
                };

                self.visit_expression(value);
                if let Some(target_type) = target_type {
                    let value_type = self.infer_type(value);
                    if value_type != target_type && value_type != "unknown" {
                        self.sink.error_at(
                            *location,
                            format!(
                                "Type mismatch in assignment to '{}': expected '{}', got '{}'",
                                name, target_type, value_type
                            ),
                        );
                    }
                }
            }
            AstNode::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.visit_expression(condition);
                let cond_type = self.infer_type(condition);
                if cond_type != "int" && cond_type != "unknown" {
                    self.sink.warning_at(
                        condition.location(),
                        format!("'if' condition is not of type 'int' (got '{}')", cond_type),
                    );
                }

                self.visit_branch(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_branch(else_branch);
                }
            }
            AstNode::For {
                init,
                condition,
                increment,
                body,
                ..
            } => {
                // the for header gets its own scope for loop variables
                self.table.enter_scope();
                if let Some(init) = init {
                    self.visit_statement(init);
                }
                if let Some(condition) = condition {
                    self.visit_expression(condition);
                    let cond_type = self.infer_type(condition);
                    if cond_type != "int" && cond_type != "unknown" {
                        self.sink.warning_at(
                            condition.location(),
                            format!("'for' condition is not of type 'int' (got '{}')", cond_type),
                        );
                    }
                }
                if let Some(increment) = increment {
                    self.visit_statement(increment);
                }
                self.visit_branch(body);
                self.table.exit_scope();
            }
            AstNode::Return { value, location } => {
                match &self.current_function {
                    Some(ctx) => match value {
                        None if ctx.return_type != "void" => {
                            self.sink.error_at(
                                *location,
                                format!(
                                    "Return without a value in non-void function '{}'",
                                    ctx.name
                                ),
                            );
                        }
                        Some(_) if ctx.return_type == "void" => {
                            self.sink.error_at(
                                *location,
                                format!("Return with a value in void function '{}'", ctx.name),
                            );
                        }
                        _ => {}
                    },
                    None => {
                        self.sink
                            .error_at(*location, "'return' outside of a function");
                    }
                }
                if let Some(value) = value {
                    self.visit_expression(value);
                }
            }
            AstNode::Print { format, args, location } => {
                if format.is_empty() {
                    self.sink
                        .warning_at(*location, "Empty format string in printf");
                }
                for arg in args {
                    self.visit_expression(arg);
                }
            }
            AstNode::Block { statements, .. } => {
                self.table.enter_scope();
                for stmt in statements {
                    self.visit_statement(stmt);
                }
                self.table.exit_scope();
            }
            // a call in statement position is checked like any call
            AstNode::Call { .. } => self.visit_expression(node),
            other => {
                self.sink.error_at(
                    other.location(),
                    format!(
                        "Internal: unexpected {} in statement position during analysis",
                        other.kind_name()
                    ),
                );
            }
        }
    }

    /// Visit an if/for body. A block manages its own scope; a single
    /// statement gets one of its own, keeping push/pop strictly paired per
    /// construct.
    fn visit_branch(&mut self, node: &AstNode) {
        if matches!(node, AstNode::Block { .. }) {
            self.visit_statement(node);
        } else {
            self.table.enter_scope();
            self.visit_statement(node);
            self.table.exit_scope();
        }
    }

    fn visit_expression(&mut self, node: &AstNode) {
        match node {
            AstNode::IntLiteral(..) | AstNode::StringLiteral(..) => {}
            AstNode::Identifier(name, location) => {
                if self.table.lookup(name).is_none() {
                    self.sink.error_at(
                        *location,
                        format!("Use of undeclared identifier '{}'", name),
                    );
                }
            }
            AstNode::Binary {
                op,
                left,
                right,
                location,
            } => {
                self.visit_expression(left);
                self.visit_expression(right);

                let left_type = self.infer_type(left);
                let right_type = self.infer_type(right);
                let left_bad = left_type != "int" && left_type != "unknown";
                let right_bad = right_type != "int" && right_type != "unknown";
                if left_bad || right_bad {
                    self.sink.error_at(
                        *location,
                        format!(
                            "Binary '{}' applied to incompatible types '{}' and '{}'",
                            op.symbol(),
                            left_type,
                            right_type
                        ),
                    );
                }
            }
            AstNode::Unary {
                op,
                operand,
                location,
            } => {
                self.visit_expression(operand);
                let operand_type = self.infer_type(operand);
                match op {
                    UnOp::Neg => {
                        if operand_type != "int" && operand_type != "unknown" {
                            self.sink.error_at(
                                *location,
                                format!("Cannot negate a value of type '{}'", operand_type),
                            );
                        }
                    }
                    UnOp::Deref => {
                        if !operand_type.ends_with('*') && operand_type != "unknown" {
                            self.sink.error_at(
                                *location,
                                format!(
                                    "Cannot dereference a value of type '{}'",
                                    operand_type
                                ),
                            );
                        }
                    }
                    UnOp::AddrOf => {}
                }
            }
            AstNode::Call {
                name,
                args,
                location,
            } => {
                let callee = self.table.lookup(name).cloned();
                match callee {
                    None => {
                        self.sink.error_at(
                            *location,
                            format!("Call to undeclared function '{}'", name),
                        );
                        for arg in args {
                            self.visit_expression(arg);
                        }
                    }
                    Some(symbol) if symbol.kind != SymbolKind::Function => {
                        self.sink
                            .error_at(*location, format!("'{}' is not a function", name));
                        for arg in args {
                            self.visit_expression(arg);
                        }
                    }
                    Some(symbol) => {
                        if args.len() != symbol.params.len() {
                            self.sink.error_at(
                                *location,
                                format!(
                                    "Function '{}' expects {} argument{}, got {}",
                                    name,
                                    symbol.params.len(),
                                    if symbol.params.len() == 1 { "" } else { "s" },
                                    args.len()
                                ),
                            );
                        }

                        for (index, arg) in args.iter().enumerate() {
                            self.visit_expression(arg);
                            if let Some(param) = symbol.params.get(index) {
                                let arg_type = self.infer_type(arg);
                                if arg_type != param.type_name && arg_type != "unknown" {
                                    self.sink.error_at(
                                        arg.location(),
                                        format!(
                                            "Type mismatch for argument {} of '{}': expected '{}', got '{}'",
                                            index + 1,
                                            name,
                                            param.type_name,
                                            arg_type
                                        ),
                                    );
                                }
                            }
                        }
                    }
                }
            }
            other => {
                self.sink.error_at(
                    other.location(),
                    format!(
                        "Internal: unexpected {} in expression position during analysis",
                        other.kind_name()
                    ),
                );
            }
        }
    }

    /// Pure type inference over expressions. `"unknown"` marks a value
    /// whose type could not be established (usually because an error was
    /// already reported for it) and suppresses further complaints.
    fn infer_type(&self, node: &AstNode) -> String {
        match node {
            AstNode::IntLiteral(..) => "int".to_string(),
            AstNode::StringLiteral(..) => "string".to_string(),
            AstNode::Identifier(name, _) => match self.table.lookup(name) {
                Some(symbol) => symbol.data_type.clone(),
                None => "unknown".to_string(),
            },
            AstNode::Binary { left, right, .. } => {
                if self.infer_type(left) == "int" && self.infer_type(right) == "int" {
                    "int".to_string()
                } else {
                    "unknown".to_string()
                }
            }
            AstNode::Call { name, .. } => match self.table.lookup(name) {
                Some(symbol) if symbol.kind == SymbolKind::Function => symbol.data_type.clone(),
                _ => "unknown".to_string(),
            },
            AstNode::Unary { op, operand, .. } => {
                let operand_type = self.infer_type(operand);
                match op {
                    UnOp::Neg => {
                        if operand_type == "int" {
                            "int".to_string()
                        } else {
                            "unknown".to_string()
                        }
                    }
                    UnOp::Deref => {
                        if let Some(pointee) = operand_type.strip_suffix('*') {
                            pointee.to_string()
                        } else {
                            "unknown".to_string()
                        }
                    }
                    UnOp::AddrOf => {
                        if operand_type == "unknown" {
                            "unknown".to_string()
                        } else {
                            format!("{}*", operand_type)
                        }
                    }
                }
            }
            _ => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::Parser;

    fn analyze(source: &str) -> DiagnosticSink {
        let mut sink = DiagnosticSink::new();
        let tokens = Lexer::new(source, &mut sink).tokenize();
        let program = Parser::new(tokens, &mut sink).parse();
        assert!(!sink.has_errors(), "parse failed: {:?}", sink.messages());

        SemanticAnalyzer::new(&mut sink).analyze(&program);
        sink
    }

    #[test]
    fn test_shadowing_in_inner_block_is_legal() {
        let sink = analyze("int main(){int a=1;{int a=2;}}");
        assert_eq!(sink.error_count(), 0, "{:?}", sink.messages());
    }

    #[test]
    fn test_same_scope_redeclaration_is_one_error() {
        let sink = analyze("int main(){int a=1;int a=2;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("Redeclaration"));
    }

    #[test]
    fn test_undeclared_identifier_is_one_error() {
        let sink = analyze("int main(){return x;}");
        assert_eq!(sink.error_count(), 1);
        let msg = &sink.messages()[0].message;
        assert!(msg.contains("undeclared identifier"), "got: {}", msg);
        assert!(msg.contains("'x'"));
    }

    #[test]
    fn test_arity_mismatch_reports_once_and_continues() {
        let sink = analyze("int f(int a){return a;} int main(){f(); return 0;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("expects 1 argument"));
    }

    #[test]
    fn test_forward_call_resolves() {
        let sink = analyze("int main(){return later(1);} int later(int n){return n;}");
        assert_eq!(sink.error_count(), 0, "{:?}", sink.messages());
    }

    #[test]
    fn test_function_redefinition() {
        let sink = analyze("int f(){return 0;} int f(){return 1;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("Redefinition of function"));
    }

    #[test]
    fn test_parameter_collision_with_body_declaration() {
        let sink = analyze("int f(int a){int a = 2; return a;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("Redeclaration"));
    }

    #[test]
    fn test_string_initializer_for_int_is_type_error() {
        let sink = analyze(r#"int main(){int x = "hello"; return 0;}"#);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("Type mismatch"));
    }

    #[test]
    fn test_undeclared_operand_does_not_cascade() {
        // 'y' is undeclared: exactly one error, not an extra binary-type
        // complaint on top
        let sink = analyze("int main(){int x = y + 1; return x;}");
        assert_eq!(sink.error_count(), 1, "{:?}", sink.messages());
    }

    #[test]
    fn test_assignment_to_function_name() {
        let sink = analyze("int f(){return 0;} int main(){f = 3; return 0;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("not a variable"));
    }

    #[test]
    fn test_return_without_value_in_int_function() {
        let sink = analyze("int main(){return;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0]
            .message
            .contains("Return without a value"));
    }

    #[test]
    fn test_return_with_value_in_void_function() {
        let sink = analyze("void run(){return 1;} int main(){run(); return 0;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("Return with a value"));
    }

    #[test]
    fn test_argument_type_mismatch() {
        let sink = analyze(r#"int f(int a){return a;} int main(){return f("nope");}"#);
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0]
            .message
            .contains("Type mismatch for argument 1"));
    }

    #[test]
    fn test_globals_visible_in_function_bodies() {
        let sink = analyze("int counter = 0; int main(){counter = counter + 1; return counter;}");
        assert_eq!(sink.error_count(), 0, "{:?}", sink.messages());
    }

    #[test]
    fn test_pointer_declaration_and_deref() {
        let sink = analyze("int main(){int x = 4; int* p = &x; return *p;}");
        assert_eq!(sink.error_count(), 0, "{:?}", sink.messages());
    }

    #[test]
    fn test_deref_of_non_pointer() {
        let sink = analyze("int main(){int x = 4; return *x;}");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("dereference"));
    }

    #[test]
    fn test_string_condition_is_warning_not_error() {
        let sink = analyze(r#"int main(){if ("always") { return 1; } return 0;}"#);
        assert_eq!(sink.error_count(), 0, "{:?}", sink.messages());
        assert!(sink
            .messages()
            .iter()
            .any(|m| m.message.contains("condition")));
    }

    #[test]
    fn test_for_loop_variable_scoped_to_loop() {
        let sink = analyze(
            "int main(){for (int i = 0; i < 3; i = i + 1) { } return i;}",
        );
        // 'i' is out of scope in the return
        assert_eq!(sink.error_count(), 1);
        assert!(sink.messages()[0].message.contains("'i'"));
    }

    #[test]
    fn test_analysis_reports_all_violations() {
        let sink = analyze("int main(){int a=1;int a=2;return x;}");
        assert_eq!(sink.error_count(), 2);
    }
}
