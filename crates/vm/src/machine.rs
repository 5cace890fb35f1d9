//! Machine state: the process address space, registers and the helpers every
//! data-touching opcode shares.
//!
//! The address space (PAS) is one array of cells:
//! ```text
//! [0, GP)          text: the loaded program, 3 cells per instruction
//! [GP, DP]         global data, growing upward
//! [FREE, ...)      heap reserve, never touched
//! [SP, capacity)   stack, growing downward
//! ```
//! Whether an opcode works on global data or on the stack depends only on
//! whether `BP == GP`.

use pl0vm_common::Program;
use tracing::debug;

use crate::config::VmConfig;
use crate::error::Fault;
use crate::io::Console;
use crate::scope::{self, ScopeError};
use crate::trace::TraceSink;

/// The register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Address of the next instruction.
    pub pc: i32,
    /// `GP` in the global scope, otherwise the base of the active frame.
    pub bp: i32,
    /// Lowest occupied stack cell.
    pub sp: i32,
    /// Highest occupied global-data cell.
    pub dp: i32,
    /// First global-data cell; equals the size of the text region.
    pub gp: i32,
    /// First heap-reserve cell.
    pub free: i32,
}

/// The PL/0 virtual machine.
pub struct Vm<'io> {
    pub(crate) pas: Vec<i32>,
    pub(crate) regs: Registers,
    pub(crate) config: VmConfig,
    pub(crate) console: &'io mut dyn Console,
    pub(crate) trace: Option<&'io mut dyn TraceSink>,
    /// Instructions executed so far.
    pub(crate) steps: u64,
    /// Line of the instruction being executed, for fault reports.
    pub(crate) line: i32,
    /// Edge of the current expression area. Global temporaries sit above
    /// it, frame temporaries below it. Moved by INC and CAL.
    pub(crate) floor: i32,
    /// Floors of the callers, restored by RTN.
    pub(crate) saved_floors: Vec<i32>,
}

impl<'io> Vm<'io> {
    /// Load `program` into the text region and set up the registers.
    pub fn new(
        program: &Program,
        config: VmConfig,
        console: &'io mut dyn Console,
    ) -> Result<Self, Fault> {
        let cells = program.cells();
        let capacity = config.capacity;
        let too_large = Fault::ProgramTooLarge {
            cells: cells.len(),
            capacity,
        };
        let (Ok(cap), Ok(ic)) = (i32::try_from(capacity), i32::try_from(cells.len())) else {
            return Err(too_large);
        };
        if cells.len() > capacity {
            return Err(too_large);
        }

        let mut pas = vec![0; capacity];
        pas[..cells.len()].copy_from_slice(&cells);

        let heap_reserve = i32::try_from(config.heap_reserve).unwrap_or(i32::MAX);
        let regs = Registers {
            pc: 0,
            bp: ic,
            sp: cap,
            dp: ic - 1,
            gp: ic,
            free: ic.saturating_add(heap_reserve),
        };

        debug!(
            instructions = program.len(),
            gp = regs.gp,
            free = regs.free,
            capacity,
            mode = ?config.mode,
            "program loaded"
        );

        Ok(Self {
            pas,
            regs,
            config,
            console,
            trace: None,
            steps: 0,
            line: 0,
            floor: regs.dp,
            saved_floors: Vec::new(),
        })
    }

    /// Attach a trace sink.
    pub fn with_trace(mut self, sink: &'io mut dyn TraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    pub fn registers(&self) -> Registers {
        self.regs
    }

    /// The whole address space.
    pub fn pas(&self) -> &[i32] {
        &self.pas
    }

    /// Global data `[GP, DP]`.
    pub fn globals(&self) -> &[i32] {
        self.region(self.regs.gp, self.regs.dp.saturating_add(1))
    }

    /// Live stack `[SP, capacity)`, ascending by address.
    pub fn stack(&self) -> &[i32] {
        self.region(self.regs.sp, self.capacity())
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Frame base `l` static links above the current `BP`.
    pub fn resolve_base(&self, l: i32) -> Result<i32, Fault> {
        let at = self.line;
        let walked = if self.config.is_hardened() {
            scope::base_checked(&self.pas, self.regs.bp, l, self.regs.gp)
        } else {
            scope::base(&self.pas, self.regs.bp, l)
        };
        walked.map_err(|e| match e {
            ScopeError::OutOfBounds { address } => Fault::OutOfBounds {
                at,
                address: address.into(),
            },
            ScopeError::MalformedLink { address, link } => {
                Fault::MalformedLink { at, address, link }
            }
        })
    }

    // ---- Arena access ----

    pub(crate) fn capacity(&self) -> i32 {
        i32::try_from(self.pas.len()).unwrap_or(i32::MAX)
    }

    /// Clamp `[lo, hi)` to the arena and borrow it.
    fn region(&self, lo: i32, hi: i32) -> &[i32] {
        let clamp = |v: i32| usize::try_from(v.max(0)).unwrap_or(0).min(self.pas.len());
        let (lo, hi) = (clamp(lo), clamp(hi));
        if lo >= hi {
            &[]
        } else {
            &self.pas[lo..hi]
        }
    }

    fn index(&self, address: i32) -> Result<usize, Fault> {
        usize::try_from(address)
            .ok()
            .filter(|&idx| idx < self.pas.len())
            .ok_or(Fault::OutOfBounds {
                at: self.line,
                address: address.into(),
            })
    }

    pub(crate) fn load(&self, address: i32) -> Result<i32, Fault> {
        Ok(self.pas[self.index(address)?])
    }

    pub(crate) fn store(&mut self, address: i32, value: i32) -> Result<(), Fault> {
        let idx = self.index(address)?;
        self.pas[idx] = value;
        Ok(())
    }

    // ---- Dual addressing ----

    /// True while executing in the outermost scope.
    pub(crate) fn in_global_scope(&self) -> bool {
        self.regs.bp == self.regs.gp
    }

    /// Address of the value `depth` slots below the top of the current
    /// expression area.
    ///
    /// Hardened mode never lets a pop reach declared variables or a frame
    /// header: only cells past the floor hold temporaries.
    fn slot(&self, depth: i32) -> Result<i32, Fault> {
        let underflow = Fault::StackUnderflow { at: self.line };
        if self.in_global_scope() {
            let addr = self.regs.dp.wrapping_sub(depth);
            if self.config.is_hardened() && (addr <= self.floor || addr < self.regs.gp) {
                return Err(underflow);
            }
            Ok(addr)
        } else {
            let addr = self.regs.sp.wrapping_add(depth);
            if self.config.is_hardened() && (addr >= self.floor || addr > self.regs.bp) {
                return Err(underflow);
            }
            Ok(addr)
        }
    }

    pub(crate) fn peek(&self, depth: i32) -> Result<i32, Fault> {
        self.load(self.slot(depth)?)
    }

    pub(crate) fn set_top(&mut self, value: i32) -> Result<(), Fault> {
        let addr = self.slot(0)?;
        self.store(addr, value)
    }

    /// Discard the top value.
    pub(crate) fn drop_top(&mut self) -> Result<(), Fault> {
        self.slot(0)?;
        if self.in_global_scope() {
            self.regs.dp = self.regs.dp.wrapping_sub(1);
        } else {
            self.regs.sp = self.regs.sp.wrapping_add(1);
        }
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<i32, Fault> {
        let value = self.peek(0)?;
        self.drop_top()?;
        Ok(value)
    }

    /// Address the next push will write, checked for collision and bounds
    /// without touching any state.
    pub(crate) fn push_address(&self) -> Result<i32, Fault> {
        let Registers { sp, dp, .. } = self.regs;
        let addr = if self.in_global_scope() {
            let addr = dp.wrapping_add(1);
            self.check_collision(sp, addr)?;
            addr
        } else {
            let addr = sp.wrapping_sub(1);
            self.check_collision(addr, dp)?;
            addr
        };
        self.index(addr)?;
        Ok(addr)
    }

    pub(crate) fn push(&mut self, value: i32) -> Result<(), Fault> {
        let addr = self.push_address()?;
        self.store(addr, value)?;
        if self.in_global_scope() {
            self.regs.dp = addr;
        } else {
            self.regs.sp = addr;
        }
        Ok(())
    }

    /// Hardened mode requires every stack cell to sit strictly above every
    /// global-data cell.
    pub(crate) fn check_collision(&self, sp: i32, dp: i32) -> Result<(), Fault> {
        if self.config.is_hardened() && sp <= dp {
            return Err(Fault::RegionCollision {
                at: self.line,
                sp,
                dp,
            });
        }
        Ok(())
    }

    /// Address of variable `m` in the scope whose base is `base`.
    ///
    /// Globals sit at `GP + m`, growing upward; frame locals sit at
    /// `base - m`, growing downward.
    pub(crate) fn variable_address(&self, base: i32, m: i32) -> Result<i32, Fault> {
        let Registers { gp, sp, dp, .. } = self.regs;
        let (addr, allowed) = if base == gp {
            let addr = gp.wrapping_add(m);
            (addr, addr >= gp && addr <= dp)
        } else {
            let addr = base.wrapping_sub(m);
            (addr, addr >= sp && addr < self.capacity())
        };
        if self.config.is_hardened() && !allowed {
            return Err(Fault::OutOfBounds {
                at: self.line,
                address: addr.into(),
            });
        }
        Ok(addr)
    }
}
