//! minic-gen - Target code generation (stage 5).
//!
//! Translates the TAC list into a symbolic assembly listing over a fictional
//! RISC-like ISA: general registers `R0, R1, …`, the `RAX` return register,
//! and `BP`/`SP` frame pointers. Register assignment is first-use monotonic;
//! no spilling, no lifetimes. A final peephole pass removes redundant
//! register-to-register moves.
//!
//! Generation is a total function over well-formed TAC; there are no error
//! paths in this stage.

mod asm;
mod peephole;

pub use asm::AsmGenerator;
pub use peephole::eliminate_redundant_moves;
