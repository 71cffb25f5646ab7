//! Simulated BRISC register file

use core::ptr::NonNull;

use crate::port::brisc::{Register, RegisterFrame, REGISTER_COUNT, RESTORE_ORDER, SAVE_ORDER};
use crate::port::{Machine, Mode};
use crate::types::{StackType, Word};

/// A BRISC core reduced to its register file
///
/// Task code is played by the test itself: it reads and writes registers
/// between port calls, and a context switch swaps the whole file.
pub struct SimCpu {
    regs: [Word; REGISTER_COUNT],
    mode: Mode,
    in_trap: bool,
    saves: u32,
    restores: u32,
}

impl SimCpu {
    /// Environment pointer reported to new tasks
    pub const ENVIRONMENT: Word = 0x0000_4000;

    pub const fn new() -> Self {
        SimCpu {
            regs: [0; REGISTER_COUNT],
            mode: Mode::Privileged,
            in_trap: false,
            saves: 0,
            restores: 0,
        }
    }

    /// Read a live register
    #[inline]
    pub fn register(&self, reg: Register) -> Word {
        self.regs[reg.index()]
    }

    /// Write a live register
    #[inline]
    pub fn set_register(&mut self, reg: Register, value: Word) {
        self.regs[reg.index()] = value;
    }

    /// The whole register file, in frame order
    pub fn registers(&self) -> &[Word; REGISTER_COUNT] {
        &self.regs
    }

    /// Number of `saveregs` executed
    pub fn save_count(&self) -> u32 {
        self.saves
    }

    /// Number of `restoreregs` executed
    pub fn restore_count(&self) -> u32 {
        self.restores
    }
}

impl Default for SimCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for SimCpu {
    unsafe fn save_registers(&mut self, frame: NonNull<RegisterFrame>) {
        let frame = unsafe { &mut *frame.as_ptr() };
        for reg in SAVE_ORDER {
            frame.set(reg, self.regs[reg.index()]);
        }
        self.saves += 1;
    }

    unsafe fn restore_registers(&mut self, frame: NonNull<RegisterFrame>) {
        let frame = unsafe { &*frame.as_ptr() };
        for reg in RESTORE_ORDER {
            self.regs[reg.index()] = frame.get(reg);
        }
        self.restores += 1;
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn environment_pointer(&self) -> Word {
        Self::ENVIRONMENT
    }

    // Host memory carries no object tags; callers hand in the base.
    fn object_base(&self, addr: *mut StackType) -> *mut StackType {
        addr
    }

    fn enter_trap(&mut self) {
        debug_assert!(!self.in_trap, "nested trap");
        self.in_trap = true;
        self.mode = Mode::Privileged;
    }

    fn leave_trap(&mut self) {
        self.in_trap = false;
    }

    fn in_trap(&self) -> bool {
        self.in_trap
    }
}
