//! Scope-stack symbol table
//!
//! A stack of name→symbol maps searched innermost-first. The global scope
//! is pushed at construction and can never be popped; every other scope's
//! lifetime is exactly the lexical construct that pushed it (function body,
//! if branch, for loop, bare block). Keeping push/pop strictly paired is
//! the walker's responsibility, not the table's.

use crate::parser::ast::Param;
use rustc_hash::FxHashMap;

/// What a recorded declaration is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// A recorded declaration: a variable (or parameter) with its declared
/// type, or a function with its return type and parameter list.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type for variables, return type for functions.
    pub data_type: String,
    /// Ordered (type, name) pairs; populated only for functions.
    pub params: Vec<Param>,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            data_type: data_type.into(),
            params: Vec::new(),
        }
    }

    pub fn function(
        name: impl Into<String>,
        return_type: impl Into<String>,
        params: Vec<Param>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
            data_type: return_type.into(),
            params,
        }
    }
}

type Scope = FxHashMap<String, Symbol>;

/// Stack of lexical scopes.
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Create a table with the global scope already in place.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Push a fresh innermost scope.
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Pop the innermost scope and every symbol in it. The global scope
    /// stays.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Add a symbol to the innermost scope. Returns false iff the name is
    /// already present in that scope (outer-scope shadowing is fine).
    pub fn add_symbol(&mut self, symbol: Symbol) -> bool {
        let scope = self.scopes.last_mut().expect("global scope always exists");
        if scope.contains_key(&symbol.name) {
            return false;
        }
        scope.insert(symbol.name.clone(), symbol);
        true
    }

    /// Find a symbol, searching innermost to outermost.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Find a symbol in the innermost scope only.
    pub fn lookup_in_current_scope(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    /// Current nesting depth (1 = global only).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
