//! Middle-end of the Flint compiler.
//!
//! The crate's job is the lowering pass: it takes the typed AST produced by
//! the semantic analyzer ([`ast::Program`]) and flattens it into a jump-based
//! intermediate representation over pure expression trees ([`ir::Program`]),
//! reporting label and loop-structure problems along the way.
//!
//! ```no_run
//! # fn analyzed_program() -> flintc::ast::Program { unimplemented!() }
//! let mut program = analyzed_program();
//! let mut sink = flintc::ErrorSink::new();
//! match flintc::lower::run(&mut program, &mut sink) {
//!     Ok(_ir) => { /* hand the IR to the code generator */ }
//!     Err(_) => { /* every diagnostic is in `sink` */ }
//! }
//! ```

#[macro_use]
mod util_macros;

pub use error::{Diagnostic, ErrorReported, ErrorSink};
#[macro_use]
pub mod error;

pub use pos::{Files, Span, Sp};
pub mod pos;

pub use ident::{Ident, ParseIdentError};
mod ident;

pub mod types;

pub mod entity;

pub mod consts;

pub mod ast;

pub mod ir;

pub mod lower;
