//! Machine configuration.

/// Size of the process address space, in cells.
pub const DEFAULT_CAPACITY: usize = 500;

/// Gap between the start of global data and the first heap-reserve cell.
pub const DEFAULT_HEAP_RESERVE: usize = 40;

/// Error policy for conditions the instruction set leaves undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Every undefined condition becomes a [`Fault`](crate::Fault).
    #[default]
    Hardened,
    /// Only conditions the host cannot execute at all (out-of-range memory
    /// access, division by zero) fault. Unknown instructions are skipped
    /// and region/link invariants are not enforced.
    Compatibility,
}

/// Settings for one machine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub capacity: usize,
    pub heap_reserve: usize,
    pub mode: Mode,
    /// Ceiling on executed instructions; `None` runs until halt.
    pub step_limit: Option<u64>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            heap_reserve: DEFAULT_HEAP_RESERVE,
            mode: Mode::Hardened,
            step_limit: None,
        }
    }
}

impl VmConfig {
    /// Defaults with the compatibility policy.
    pub fn compatibility() -> Self {
        Self::default().with_mode(Mode::Compatibility)
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_heap_reserve(mut self, heap_reserve: usize) -> Self {
        self.heap_reserve = heap_reserve;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn is_hardened(&self) -> bool {
        self.mode == Mode::Hardened
    }
}
