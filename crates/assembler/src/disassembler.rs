//! Disassembler: program → canonical listing.
//!
//! One instruction per line, `<MNEMONIC> <l> <m>`. OPR and SYS lines carry
//! the sub-operation name as a trailing comment. Opcodes outside the
//! instruction set are written as raw numbers so the listing still
//! reassembles to the same program.

use pl0vm_common::{Instruction, Opcode, Opr, Program, Sys};

/// Disassemble a program into a canonical listing.
///
/// `assemble(disassemble(program)) == program` for every program free of
/// the `-1` sentinel opcode, which covers everything `assemble` and
/// `Program::decode` produce. A sentinel instruction ends the listing when
/// reassembled.
pub fn disassemble(program: &Program) -> String {
    program
        .instructions
        .iter()
        .map(|instr| format!("{}\n", line(instr)))
        .collect()
}

fn line(instr: &Instruction) -> String {
    let Ok(opcode) = Opcode::try_from(instr.opcode) else {
        return format!("{} {} {}", instr.opcode, instr.l, instr.m);
    };
    let text = format!("{} {} {}", opcode.mnemonic(), instr.l, instr.m);
    let note = match opcode {
        Opcode::Opr => Opr::try_from(instr.m).ok().map(Opr::mnemonic),
        Opcode::Sys => Sys::try_from(instr.m).ok().map(Sys::mnemonic),
        _ => None,
    };
    match note {
        Some(name) => format!("{text:<12}; {name}"),
        None => text,
    }
}
