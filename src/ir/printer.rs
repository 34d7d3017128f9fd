//! Textual IR pretty-printing (§6). Diagnostic only -- there is no promise
//! of a parser to read this format back in (textual round-trip is an
//! explicit non-goal).

use super::cfg::Cfg;
use super::instr::Instruction;
use super::operator::Operator;
use std::fmt::Write;

/// Renders every block as `Bk:` followed by its indented instructions.
pub fn print_cfg(cfg: &Cfg) -> String {
    let mut out = String::new();
    for block in &cfg.blocks {
        let _ = writeln!(out, "B{}:", block.id.0);
        for instr in &block.instructions {
            let _ = writeln!(out, "    {}", print_instruction(instr));
        }
    }
    out
}

/// Renders a single instruction per the op-keyed table in §6.
pub fn print_instruction(instr: &Instruction) -> String {
    match instr.op {
        Operator::Move => format!("{} = {}", instr.result, instr.arg1),
        Operator::Label => format!("{}:", instr.arg1),
        Operator::If => format!(
            "if {} goto {} else {}",
            instr.arg1, instr.arg2, instr.result
        ),
        Operator::Goto => format!("goto {}", instr.result),
        Operator::Convert | Operator::Plus | Operator::Minus | Operator::Not => {
            format!("{} = {} {}", instr.result, instr.op, instr.arg1)
        }
        Operator::Print => format!("print {}", instr.arg1),
        Operator::Read => format!("read {}", instr.result),
        Operator::Phi => format!("{} = {}", instr.result, instr.arg1),
        Operator::Alloca => format!("{} = alloca {}", instr.result, instr.arg1),
        Operator::Store => format!("store {} -> {}", instr.arg1, instr.result),
        Operator::Load => format!("{} = load {}", instr.result, instr.arg1),
        _ => format!("{} = {} {} {}", instr.result, instr.arg1, instr.op, instr.arg2),
    }
}
