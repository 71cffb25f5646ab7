//! Port layer - CPU-specific implementations
//!
//! [`Machine`] is the narrow boundary around the processor: the only code
//! allowed to read or write raw registers lives behind it. Everything else in
//! the crate manipulates saved frames in memory.

pub mod brisc;

// Host simulator (for testing)
#[cfg(not(target_os = "none"))]
pub mod sim;

use core::ptr::NonNull;

use crate::types::{StackType, Syscall, Word};
use brisc::RegisterFrame;

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Mode {
    /// Trap handlers and the bootstrap
    Privileged = 0,
    /// Tasks; interrupts are taken
    Normal = 1,
}

/// Why the processor entered trap context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrapCause {
    /// `ecallui` from task code
    Syscall(Syscall),
    /// Device interrupt, by raw reason number
    Interrupt(u32),
}

/// Register-level access to the processor
pub trait Machine {
    /// Store every live register into `frame`, in
    /// [`SAVE_ORDER`](brisc::SAVE_ORDER)
    ///
    /// # Safety
    /// `frame` must point to a frame owned by the running task, and
    /// interrupts must be masked.
    unsafe fn save_registers(&mut self, frame: NonNull<RegisterFrame>);

    /// Load every register from `frame`, in
    /// [`RESTORE_ORDER`](brisc::RESTORE_ORDER)
    ///
    /// # Safety
    /// `frame` must hold a valid, resumable frame, and interrupts must be
    /// masked.
    unsafe fn restore_registers(&mut self, frame: NonNull<RegisterFrame>);

    /// Switch execution mode
    fn set_mode(&mut self, mode: Mode);

    /// Current execution mode
    fn mode(&self) -> Mode;

    /// Environment pointer new tasks start with
    fn environment_pointer(&self) -> Word;

    /// Base of the memory object containing `addr`
    fn object_base(&self, addr: *mut StackType) -> *mut StackType;

    /// Enter trap context; interrupts are not taken until [`Machine::leave_trap`]
    fn enter_trap(&mut self);

    /// Return from trap context
    fn leave_trap(&mut self);

    /// Check if currently executing in trap context
    fn in_trap(&self) -> bool;
}
