//! minic-util - Shared foundation types for the minic compiler.
//!
//! This crate holds the pieces every stage needs: source location spans and
//! the diagnostic types used for error collection. It has no knowledge of
//! tokens, AST nodes, or any other stage-specific data.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use span::Span;
