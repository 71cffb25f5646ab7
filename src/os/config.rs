//! Compile-time configuration for the BRISC port
//!
//! Board constants live here; change them to match the memory map of the
//! target system.

use crate::types::{InterruptReason, Word};

/// Preemption timer period, in timer counts (one count per instruction)
pub const CFG_TICK_INTERVAL: u32 = 1000;

/// Base address of the interrupt configuration block
pub const CFG_ICFG_BASE: usize = 0xFFFF_0000;

/// Base address of the TMR0 timer block
pub const CFG_TMR0_BASE: usize = 0xFFFF_0100;

/// Device base addresses, indexed by [`InterruptReason`]
pub const CFG_IO_TABLE: [usize; InterruptReason::COUNT] = [CFG_ICFG_BASE, CFG_TMR0_BASE];

/// Status word a new task starts with
pub const CFG_TASK_STATUS: Word = 0x40;

/// Alignment of every object handed out by the object allocator
pub const CFG_OBJECT_ALIGN: usize = 8;
