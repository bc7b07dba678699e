//! Semantic analysis for the C subset
//!
//! - [`symbol_table`]: the scope stack mapping names to declarations
//! - [`analyzer`]: the two-pass checker that walks the AST and reports
//!   every violation into the shared diagnostic sink
//!
//! The table is rebuilt from scratch per compilation unit and passed
//! nowhere else; code generation never consults it.

pub mod analyzer;
pub mod symbol_table;
