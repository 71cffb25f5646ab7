//! Core type definitions for the BRISC port
//!
//! These types provide strong typing for port primitives.

/// Machine word
pub type Word = usize;

/// Stack element type
pub type StackType = Word;

/// Task entry point; the argument arrives in r0
pub type TaskFn = fn(*mut ()) -> !;

/// System calls raised with `ecallui`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Syscall {
    /// Voluntary context switch
    TaskYield = 0x10,
}

/// Interrupt sources, doubling as indices into the io table
///
/// Each device block reports its own reason number in its type word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum InterruptReason {
    /// Interrupt configuration block
    Icfg = 0,
    /// Timer 0
    Tmr0 = 1,
}

impl InterruptReason {
    /// Number of io table entries
    pub const COUNT: usize = 2;

    /// Device type word expected at offset 0 of this device's block
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Bit for this source in the per-source enable mask
    #[inline]
    pub const fn enable_bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Slot in the io table
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decode a raw reason number
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(InterruptReason::Icfg),
            1 => Some(InterruptReason::Tmr0),
            _ => None,
        }
    }
}
