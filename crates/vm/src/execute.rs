//! Fetch-decode-execute loop and opcode dispatch.

use pl0vm_common::{Instruction, Op, Opr, Sys, CELLS_PER_INSTRUCTION};
use tracing::{debug, trace, warn};

use crate::error::Fault;
use crate::machine::Vm;
use crate::trace::TraceRecord;

const WIDTH: i32 = CELLS_PER_INSTRUCTION as i32;

/// Outcome of one successfully executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted,
}

impl<'io> Vm<'io> {
    /// Execute until `SYS 0 3` or a fault. Returns the number of
    /// instructions executed.
    pub fn run(&mut self) -> Result<u64, Fault> {
        if self.steps == 0 {
            let initial = self.regs;
            if let Some(sink) = self.trace.as_mut() {
                sink.begin(&initial).map_err(|e| Fault::Output {
                    at: 0,
                    reason: e.to_string(),
                })?;
            }
        }

        loop {
            if let Some(limit) = self.config.step_limit {
                if self.steps >= limit {
                    return Err(Fault::MissingHalt { limit });
                }
            }
            if self.step()? == Step::Halted {
                debug!(steps = self.steps, "halted");
                return Ok(self.steps);
            }
        }
    }

    /// Fetch, decode and execute one instruction, then emit its trace record.
    pub fn step(&mut self) -> Result<Step, Fault> {
        let pc = self.regs.pc;
        self.line = pc / WIDTH;
        let instr = self.fetch(pc)?;
        self.regs.pc = pc.wrapping_add(WIDTH);

        let outcome = match instr.decode() {
            Ok(op) => self.execute(&instr, op)?,
            Err(e) if self.config.is_hardened() => {
                debug!(line = self.line, error = %e, "undecodable instruction");
                return Err(self.invalid(&instr));
            }
            Err(e) => {
                warn!(line = self.line, error = %e, "skipping undecodable instruction");
                Step::Continue
            }
        };

        self.check_collision(self.regs.sp, self.regs.dp)?;
        self.steps += 1;
        self.emit_trace(&instr)?;
        Ok(outcome)
    }

    fn fetch(&self, pc: i32) -> Result<Instruction, Fault> {
        if self.config.is_hardened() && (pc < 0 || pc >= self.regs.gp || pc % WIDTH != 0) {
            return Err(Fault::PcOutOfText { at: self.line, pc });
        }
        Ok(Instruction::new(
            self.load(pc)?,
            self.load(pc.wrapping_add(1))?,
            self.load(pc.wrapping_add(2))?,
        ))
    }

    fn invalid(&self, instr: &Instruction) -> Fault {
        Fault::InvalidInstruction {
            at: self.line,
            opcode: instr.opcode,
            l: instr.l,
            m: instr.m,
        }
    }

    fn emit_trace(&mut self, instr: &Instruction) -> Result<(), Fault> {
        let Some(sink) = self.trace.take() else {
            return Ok(());
        };
        let record = TraceRecord {
            line: self.line,
            name: instr.name(),
            l: instr.l,
            m: instr.m,
            registers: self.regs,
            globals: self.globals(),
            stack: self.stack(),
        };
        let written = sink.step(&record);
        self.trace = Some(sink);
        written.map_err(|e| Fault::Output {
            at: self.line,
            reason: e.to_string(),
        })
    }

    fn execute(&mut self, instr: &Instruction, op: Op) -> Result<Step, Fault> {
        match op {
            Op::Lit(m) => self.push(m)?,
            Op::Opr(Opr::Rtn) => self.exec_rtn()?,
            Op::Opr(opr) if opr.is_binary() => self.exec_binary(opr)?,
            Op::Opr(opr) => self.exec_unary(opr)?,
            Op::Lod { l, m } => {
                let value = self.load_variable(instr, l, m)?;
                self.push(value)?;
            }
            Op::Sto { l, m } => self.exec_sto(instr, l, m)?,
            Op::Cal { l, m } => self.exec_cal(instr, l, m)?,
            Op::Inc(m) => {
                // Reserved cells hold variables, so temporaries start past them.
                if self.in_global_scope() {
                    self.regs.dp = self.regs.dp.wrapping_add(m);
                    self.floor = self.regs.dp;
                } else {
                    self.regs.sp = self.regs.sp.wrapping_sub(m);
                    self.floor = self.regs.sp;
                }
            }
            Op::Jmp(m) => self.regs.pc = m,
            Op::Jpc(m) => {
                if self.pop()? == 0 {
                    self.regs.pc = m;
                }
            }
            Op::Sys(Sys::Write) => {
                let value = self.peek(0)?;
                self.console.write_value(value).map_err(|e| Fault::Output {
                    at: self.line,
                    reason: e.to_string(),
                })?;
                self.drop_top()?;
            }
            Op::Sys(Sys::Read) => {
                // No prompt and no input consumed if the value has nowhere to go.
                self.push_address()?;
                let value = self.console.read_value().map_err(|e| Fault::Input {
                    at: self.line,
                    reason: e.to_string(),
                })?;
                self.push(value)?;
            }
            Op::Sys(Sys::Halt) => return Ok(Step::Halted),
        }
        Ok(Step::Continue)
    }

    // ---- Arithmetic ----

    fn exec_unary(&mut self, opr: Opr) -> Result<(), Fault> {
        let value = self.peek(0)?;
        let result = match opr {
            Opr::Neg => value.wrapping_neg(),
            Opr::Odd => value.wrapping_rem(2),
            _ => unreachable!("{opr:?} is not a unary operation"),
        };
        self.set_top(result)
    }

    /// Combine the second value (`a`) with the top (`b`) and replace both
    /// with the result. Nothing is written when the operation faults.
    fn exec_binary(&mut self, opr: Opr) -> Result<(), Fault> {
        let b = self.peek(0)?;
        let a = self.peek(1)?;
        let at = self.line;

        let result = match opr {
            Opr::Add => a.wrapping_add(b),
            Opr::Sub => a.wrapping_sub(b),
            Opr::Mul => a.wrapping_mul(b),
            Opr::Div | Opr::Mod if b == 0 => return Err(Fault::DivisionByZero { at }),
            Opr::Div => a.wrapping_div(b),
            Opr::Mod => a.wrapping_rem(b),
            Opr::Eql => i32::from(a == b),
            Opr::Neq => i32::from(a != b),
            Opr::Lss => i32::from(a < b),
            Opr::Leq => i32::from(a <= b),
            Opr::Gtr => i32::from(a > b),
            Opr::Geq => i32::from(a >= b),
            Opr::Rtn | Opr::Neg | Opr::Odd => {
                unreachable!("{opr:?} is not a binary operation")
            }
        };

        self.drop_top()?;
        self.set_top(result)
    }

    // ---- Variables ----

    /// Resolve the address of variable `(l, m)`. In the global scope `l` is
    /// ignored and the variable is always a global.
    fn variable(&self, instr: &Instruction, l: i32, m: i32) -> Result<i32, Fault> {
        if self.in_global_scope() {
            return self.variable_address(self.regs.gp, m);
        }
        if self.config.is_hardened() && l < 0 {
            return Err(self.invalid(instr));
        }
        let base = self.resolve_base(l)?;
        self.variable_address(base, m)
    }

    fn load_variable(&self, instr: &Instruction, l: i32, m: i32) -> Result<i32, Fault> {
        let addr = self.variable(instr, l, m)?;
        self.load(addr)
    }

    fn exec_sto(&mut self, instr: &Instruction, l: i32, m: i32) -> Result<(), Fault> {
        let addr = self.variable(instr, l, m)?;
        let value = self.peek(0)?;
        self.store(addr, value)?;
        self.drop_top()
    }

    // ---- Procedures ----

    /// Stamp a frame header below `SP` and enter the callee at `m`.
    ///
    /// The static link is resolved against the caller's `BP`.
    fn exec_cal(&mut self, instr: &Instruction, l: i32, m: i32) -> Result<(), Fault> {
        if self.config.is_hardened() && l < 0 {
            return Err(self.invalid(instr));
        }
        let static_link = self.resolve_base(l)?;
        let sp = self.regs.sp;
        self.check_collision(sp.wrapping_sub(3), self.regs.dp)?;

        self.store(sp.wrapping_sub(1), static_link)?;
        self.store(sp.wrapping_sub(2), self.regs.bp)?;
        self.store(sp.wrapping_sub(3), self.regs.pc)?;
        self.regs.bp = sp.wrapping_sub(1);
        self.regs.pc = m;
        self.saved_floors.push(self.floor);
        self.floor = sp.wrapping_sub(3);

        trace!(target = m, bp = self.regs.bp, static_link, "call");
        Ok(())
    }

    /// Tear down the current frame, restoring the caller's `SP`, `BP` and `PC`.
    fn exec_rtn(&mut self) -> Result<(), Fault> {
        let at = self.line;
        let bp = self.regs.bp;
        if self.config.is_hardened() && self.in_global_scope() {
            return Err(Fault::ReturnFromGlobalScope { at });
        }

        let sp = bp.wrapping_add(1);
        let dynamic_link = self.load(sp.wrapping_sub(2))?;
        let return_address = self.load(sp.wrapping_sub(3))?;
        if self.config.is_hardened()
            && dynamic_link != self.regs.gp
            && !(dynamic_link > bp && dynamic_link < self.capacity())
        {
            return Err(Fault::MalformedLink {
                at,
                address: sp.wrapping_sub(2),
                link: dynamic_link,
            });
        }

        self.regs.sp = sp;
        self.regs.bp = dynamic_link;
        self.regs.pc = return_address;
        if let Some(floor) = self.saved_floors.pop() {
            self.floor = floor;
        }

        trace!(return_address, bp = dynamic_link, "return");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use crate::io::ScriptedConsole;
    use pl0vm_common::{Opcode, Program};

    fn lit(m: i32) -> Instruction {
        Instruction::lit(m)
    }

    fn opr(op: Opr) -> Instruction {
        Instruction::opr(op)
    }

    fn halt() -> Instruction {
        Instruction::sys(Sys::Halt)
    }

    #[test]
    fn step_advances_pc_before_execution() {
        let program = Program::new(vec![lit(1), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(vm.step(), Ok(Step::Continue));
        assert_eq!(vm.registers().pc, 3);
        assert_eq!(vm.step(), Ok(Step::Halted));
        assert_eq!(vm.registers().pc, 6);
        assert_eq!(vm.steps(), 2);
    }

    #[test]
    fn binary_uses_second_as_left_operand() {
        let program = Program::new(vec![lit(10), lit(3), opr(Opr::Sub), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        vm.run().unwrap();
        assert_eq!(vm.globals(), &[7]);
    }

    #[test]
    fn division_by_zero_leaves_operands() {
        let program = Program::new(vec![lit(4), lit(0), opr(Opr::Div), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(vm.run(), Err(Fault::DivisionByZero { at: 2 }));
        assert_eq!(vm.globals(), &[4, 0]);
    }

    #[test]
    fn odd_keeps_dividend_sign() {
        let program = Program::new(vec![lit(-3), opr(Opr::Odd), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        vm.run().unwrap();
        assert_eq!(vm.globals(), &[-1]);
    }

    #[test]
    fn hardened_rejects_unknown_opcode() {
        let program = Program::new(vec![Instruction::new(42, 0, 0), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(
            vm.run(),
            Err(Fault::InvalidInstruction { at: 0, opcode: 42, l: 0, m: 0 })
        );
    }

    #[test]
    fn compatibility_skips_unknown_opcode() {
        let program = Program::new(vec![Instruction::new(42, 0, 0), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::compatibility(), &mut console).unwrap();
        assert_eq!(vm.run(), Ok(2));
    }

    #[test]
    fn hardened_rejects_return_in_global_scope() {
        let program = Program::new(vec![opr(Opr::Rtn), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(vm.run(), Err(Fault::ReturnFromGlobalScope { at: 0 }));
    }

    #[test]
    fn hardened_rejects_falling_off_text() {
        let program = Program::new(vec![lit(1)]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(vm.run(), Err(Fault::PcOutOfText { at: 1, pc: 3 }));
    }

    #[test]
    fn hardened_rejects_misaligned_jump() {
        let program = Program::new(vec![Instruction::op(Opcode::Jmp, 0, 4), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(vm.run(), Err(Fault::PcOutOfText { at: 1, pc: 4 }));
    }

    #[test]
    fn hardened_rejects_negative_level() {
        let instr = Instruction::op(Opcode::Cal, -1, 0);
        let program = Program::new(vec![instr, halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(
            vm.run(),
            Err(Fault::InvalidInstruction { at: 0, opcode: 5, l: -1, m: 0 })
        );
    }

    #[test]
    fn step_limit_reports_missing_halt() {
        let program = Program::new(vec![Instruction::op(Opcode::Jmp, 0, 0)]);
        let mut console = ScriptedConsole::default();
        let config = VmConfig::default().with_step_limit(25);
        let mut vm = Vm::new(&program, config, &mut console).unwrap();
        assert_eq!(vm.run(), Err(Fault::MissingHalt { limit: 25 }));
        assert_eq!(vm.steps(), 25);
    }

    #[test]
    fn inc_in_global_scope_reserves_globals() {
        let program = Program::new(vec![Instruction::op(Opcode::Inc, 0, 3), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        vm.run().unwrap();
        assert_eq!(vm.globals(), &[0, 0, 0]);
        assert_eq!(vm.registers().sp, 500);
    }

    #[test]
    fn hardened_inc_into_stack_collides() {
        let program = Program::new(vec![Instruction::op(Opcode::Inc, 0, 600), halt()]);
        let mut console = ScriptedConsole::default();
        let mut vm = Vm::new(&program, VmConfig::default(), &mut console).unwrap();
        assert_eq!(
            vm.run(),
            Err(Fault::RegionCollision { at: 0, sp: 500, dp: 605 })
        );
    }
}
