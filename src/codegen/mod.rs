//! Code generation: validated AST → instrumented target text
//!
//! - [`emitter`]: renders individual instrumentation-call lines against
//!   the sink API and owns the indent level
//! - [`generator`]: walks the AST and emits each statement alongside its
//!   narration, inlining `main` into the driver routine the sink runtime
//!   replays
//!
//! Generation assumes a semantically valid tree; malformed shapes degrade
//! to internal-error diagnostics and empty fragments rather than panics.

pub mod emitter;
pub mod generator;
