//! Instruction selection and register assignment.

use minic_par::{BinOp, UnOp};
use minic_tac::Instruction;
use rustc_hash::FxHashMap;

use crate::peephole;

/// First-use monotonic register file.
///
/// The first reference to a non-literal TAC name claims the next free
/// `R<n>`; every later reference reuses the same register. Literals never
/// get registers.
struct RegisterFile {
    map: FxHashMap<String, String>,
    counter: usize,
}

impl RegisterFile {
    fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            counter: 0,
        }
    }

    fn get_or_assign(&mut self, name: &str) -> String {
        if let Some(reg) = self.map.get(name) {
            return reg.clone();
        }

        let reg = format!("R{}", self.counter);
        self.counter += 1;
        self.map.insert(name.to_string(), reg.clone());
        reg
    }
}

/// Assembly generator. One instance generates one listing.
pub struct AsmGenerator {
    lines: Vec<String>,
    registers: RegisterFile,
}

impl AsmGenerator {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            registers: RegisterFile::new(),
        }
    }

    /// Generate the full listing for a TAC instruction list.
    ///
    /// The listing starts with a banner comment. Instructions carry a
    /// four-space indent; labels have none.
    pub fn generate(&mut self, tac: &[Instruction]) {
        self.lines.push("; Generated Assembly Code".to_string());
        self.lines
            .push("; Simplified RISC-style instructions".to_string());
        self.lines.push(String::new());

        for instruction in tac {
            self.generate_instruction(instruction);
        }
    }

    /// Run the peephole pass over the emitted lines and report how many
    /// redundant instructions were eliminated.
    pub fn optimize(&mut self) -> usize {
        peephole::eliminate_redundant_moves(&mut self.lines)
    }

    /// The emitted assembly lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Register allocation for user-declared variables (names not starting
    /// with `t`), sorted by variable name.
    pub fn register_table(&self) -> Vec<(String, String)> {
        let mut table: Vec<(String, String)> = self
            .registers
            .map
            .iter()
            .filter(|(name, _)| !name.starts_with('t'))
            .map(|(name, reg)| (name.clone(), reg.clone()))
            .collect();
        table.sort();
        table
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn emit_op(&mut self, text: String) {
        self.lines.push(format!("    {}", text));
    }

    /// Operand location: literals inline as `#<lit>`, everything else in
    /// its register.
    fn location(&mut self, name: &str) -> String {
        if is_constant(name) {
            format!("#{}", name)
        } else {
            self.registers.get_or_assign(name)
        }
    }

    fn generate_instruction(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::FunctionBegin(name) => {
                self.emit(String::new());
                self.emit(format!("; Function: {}", name));
                self.emit(format!("{}:", name));
                self.emit_op("PUSH BP".to_string());
                self.emit_op("MOV BP, SP".to_string());
            }

            Instruction::FunctionEnd(name) => {
                self.emit_op("MOV SP, BP".to_string());
                self.emit_op("POP BP".to_string());
                self.emit_op("RET".to_string());
                self.emit(format!("; End of {}", name));
            }

            Instruction::Copy { dest, src } => {
                let dest_reg = self.registers.get_or_assign(dest);
                if is_constant(src) {
                    self.emit_op(format!("LOAD {}, #{}", dest_reg, src));
                } else {
                    let src_reg = self.registers.get_or_assign(src);
                    self.emit_op(format!("MOV {}, {}", dest_reg, src_reg));
                }
            }

            Instruction::Binary { dest, op, lhs, rhs } => {
                let dest_reg = self.registers.get_or_assign(dest);

                // A literal left operand is loaded into the destination so
                // the two-operand form can accumulate in place.
                let lhs_loc = if is_constant(lhs) {
                    self.emit_op(format!("LOAD {}, #{}", dest_reg, lhs));
                    dest_reg.clone()
                } else {
                    self.registers.get_or_assign(lhs)
                };

                let rhs_loc = self.location(rhs);

                if op.is_comparison() {
                    // Flags from CMP are materialized into the destination
                    // register by the CMP_xx instruction.
                    self.emit_op(format!("CMP {}, {}", lhs_loc, rhs_loc));
                    self.emit_op(format!("{} {}", mnemonic(*op), dest_reg));
                } else {
                    if lhs_loc != dest_reg {
                        self.emit_op(format!("MOV {}, {}", dest_reg, lhs_loc));
                    }
                    self.emit_op(format!("{} {}, {}", mnemonic(*op), dest_reg, rhs_loc));
                }
            }

            Instruction::Unary { dest, op, operand } => {
                let dest_reg = self.registers.get_or_assign(dest);
                let operand_loc = self.location(operand);
                match op {
                    UnOp::Neg => self.emit_op(format!("NEG {}, {}", dest_reg, operand_loc)),
                    UnOp::Not => self.emit_op(format!("NOT {}, {}", dest_reg, operand_loc)),
                }
            }

            Instruction::Label(label) => {
                self.emit(format!("{}:", label));
            }

            Instruction::Goto(label) => {
                self.emit_op(format!("JMP {}", label));
            }

            Instruction::IfGoto { cond, target } => {
                let cond_loc = self.location(cond);
                self.emit_op(format!("CMP {}, #0", cond_loc));
                self.emit_op(format!("JNE {}", target));
            }

            Instruction::IfFalseGoto { cond, target } => {
                let cond_loc = self.location(cond);
                self.emit_op(format!("CMP {}, #0", cond_loc));
                self.emit_op(format!("JE {}", target));
            }

            Instruction::Param(arg) => {
                let loc = self.location(arg);
                self.emit_op(format!("PUSH {}", loc));
            }

            Instruction::Call {
                dest,
                func,
                arg_count,
            } => {
                self.emit_op(format!("CALL {}", func));
                if *arg_count > 0 {
                    self.emit_op(format!("ADD SP, #{}", arg_count * 4));
                }
                if let Some(dest) = dest {
                    let dest_reg = self.registers.get_or_assign(dest);
                    self.emit_op(format!("MOV {}, RAX", dest_reg));
                }
            }

            Instruction::Return(value) => {
                if let Some(value) = value {
                    if is_constant(value) {
                        self.emit_op(format!("LOAD RAX, #{}", value));
                    } else {
                        let reg = self.registers.get_or_assign(value);
                        self.emit_op(format!("MOV RAX, {}", reg));
                    }
                }
            }
        }
    }
}

impl Default for AsmGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// A TAC operand is a constant if it parses as a number or is a quoted
/// string.
fn is_constant(value: &str) -> bool {
    if value.parse::<f64>().is_ok() {
        return true;
    }
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// Assembly mnemonic for a binary operator.
fn mnemonic(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "ADD",
        BinOp::Sub => "SUB",
        BinOp::Mul => "MUL",
        BinOp::Div => "DIV",
        BinOp::Mod => "MOD",
        BinOp::And => "AND",
        BinOp::Or => "OR",
        BinOp::Eq => "CMP_EQ",
        BinOp::Ne => "CMP_NE",
        BinOp::Lt => "CMP_LT",
        BinOp::Gt => "CMP_GT",
        BinOp::Le => "CMP_LE",
        BinOp::Ge => "CMP_GE",
    }
}
