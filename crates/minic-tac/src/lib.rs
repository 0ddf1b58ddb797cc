//! minic-tac - Intermediate code generation (stage 4).
//!
//! Lowers a validated AST into a flat list of three-address-code
//! instructions. Temporaries (`t0, t1, …`) and labels (`L0, L1, …`) come
//! from two monotonic counters owned by the generator, so every name is
//! unique within one compilation. Lowering never fails: the semantic stage
//! has already rejected any program this walk cannot handle.

mod lower;
mod tac;

pub use lower::{lower, TacGenerator};
pub use tac::Instruction;
