//! BRISC register context frame
//!
//! `saveregs`/`restoreregs` move the whole register file to and from memory
//! in one fixed order. The frame below mirrors that order field for field;
//! the task stack holds one reserved word followed by the frame.
//!
//! ```text
//!  base + 0    reserved (callee bookkeeping)
//!  base + 1    r0   <- task argument on first resume
//!  ...
//!  base + 10   r9
//!  base + 11   pc
//!  base + 12   ep
//!  base + 13   wp
//!  base + 14   sr
//! ```

use crate::types::Word;

/// Number of general-purpose registers
pub const GPR_COUNT: usize = 10;

/// Number of registers in a frame
pub const REGISTER_COUNT: usize = GPR_COUNT + 4;

/// Words between the resume point and the frame
pub const FRAME_OFFSET: usize = 1;

/// Words a task stack needs for the reserved word and the frame
pub const STACK_IMAGE_WORDS: usize = FRAME_OFFSET + REGISTER_COUNT;

/// A saved register, numbered by its slot in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
    R8 = 8,
    R9 = 9,
    /// Program counter
    Pc = 10,
    /// Environment pointer (globals base)
    Ep = 11,
    /// Window pointer (stack object base)
    Wp = 12,
    /// Status register
    Sr = 13,
}

impl Register {
    /// Every register, in frame order
    pub const ALL: [Register; REGISTER_COUNT] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
        Register::R8,
        Register::R9,
        Register::Pc,
        Register::Ep,
        Register::Wp,
        Register::Sr,
    ];

    /// Register carrying the task argument
    pub const ARG: Register = Register::R0;

    /// Slot of this register in the frame
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// General-purpose register `rN`
    pub const fn gpr(n: usize) -> Option<Register> {
        if n < GPR_COUNT {
            Some(Register::ALL[n])
        } else {
            None
        }
    }
}

/// Order in which `saveregs` writes the frame
pub const SAVE_ORDER: [Register; REGISTER_COUNT] = Register::ALL;

/// Order in which `restoreregs` reads the frame; must equal [`SAVE_ORDER`]
pub const RESTORE_ORDER: [Register; REGISTER_COUNT] = SAVE_ORDER;

/// Saved machine state of one suspended task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct RegisterFrame {
    pub gpr: [Word; GPR_COUNT],
    pub pc: Word,
    pub ep: Word,
    pub wp: Word,
    pub sr: Word,
}

impl RegisterFrame {
    /// All-zero frame
    pub const fn zeroed() -> Self {
        RegisterFrame {
            gpr: [0; GPR_COUNT],
            pc: 0,
            ep: 0,
            wp: 0,
            sr: 0,
        }
    }

    /// Frame of a task that has never run
    pub const fn initial(entry: Word, arg: Word, ep: Word, wp: Word, sr: Word) -> Self {
        let mut frame = Self::zeroed();
        frame.gpr[Register::ARG.index()] = arg;
        frame.pc = entry;
        frame.ep = ep;
        frame.wp = wp;
        frame.sr = sr;
        frame
    }

    /// Read one saved register
    #[inline]
    pub fn get(&self, reg: Register) -> Word {
        match reg {
            Register::Pc => self.pc,
            Register::Ep => self.ep,
            Register::Wp => self.wp,
            Register::Sr => self.sr,
            gpr => self.gpr[gpr.index()],
        }
    }

    /// Overwrite one saved register
    #[inline]
    pub fn set(&mut self, reg: Register, value: Word) {
        match reg {
            Register::Pc => self.pc = value,
            Register::Ep => self.ep = value,
            Register::Wp => self.wp = value,
            Register::Sr => self.sr = value,
            gpr => self.gpr[gpr.index()] = value,
        }
    }
}
