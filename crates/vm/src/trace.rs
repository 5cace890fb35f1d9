//! Per-instruction execution traces.

use std::io::{self, Write};

use crate::machine::Registers;

/// Snapshot emitted after each executed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord<'a> {
    /// Line of the executed instruction (`PC / 3` before fetch).
    pub line: i32,
    /// Opcode name, or the OPR sub-operation name.
    pub name: &'static str,
    pub l: i32,
    pub m: i32,
    /// Registers after the instruction.
    pub registers: Registers,
    /// Global data `[GP, DP]`, ascending.
    pub globals: &'a [i32],
    /// Live stack `[SP, capacity)`, ascending by address.
    pub stack: &'a [i32],
}

/// Receiver of trace events.
pub trait TraceSink {
    /// Called once before the first instruction.
    fn begin(&mut self, initial: &Registers) -> io::Result<()>;

    /// Called after every instruction that completed without a fault.
    fn step(&mut self, record: &TraceRecord<'_>) -> io::Result<()>;
}

/// Tab-separated text trace.
///
/// Globals are printed in ascending address order; the stack is printed
/// from the top of the address space down to `SP`.
pub struct TextTrace<W> {
    out: W,
}

impl<W: Write> TextTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for TextTrace<W> {
    fn begin(&mut self, initial: &Registers) -> io::Result<()> {
        writeln!(self.out, "\t\t\t\tPC\tBP\tSP\tDP\tdata")?;
        writeln!(
            self.out,
            "Initial values:\t\t\t{}\t{}\t{}\t{}",
            initial.pc, initial.bp, initial.sp, initial.dp
        )
    }

    fn step(&mut self, record: &TraceRecord<'_>) -> io::Result<()> {
        let r = &record.registers;
        write!(
            self.out,
            "{:2}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t",
            record.line, record.name, record.l, record.m, r.pc, r.bp, r.sp, r.dp
        )?;
        for value in record.globals {
            write!(self.out, "{value} ")?;
        }
        write!(self.out, "\n\tstack : ")?;
        for value in record.stack.iter().rev() {
            write!(self.out, "{value} ")?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}
