//! Kernel core interface
//!
//! The port never decides which task runs. It consumes three things from the
//! kernel core: a [`TaskControl`] at the head of every TCB, a [`CurrentTask`]
//! slot naming the running task, and a selection hook that moves that slot.

mod tcb;

pub use tcb::TaskControl;

use core::ptr::NonNull;

use crate::critical::Masked;
use crate::os::cs_cell::MaskedCell;

/// The running task
///
/// Owned by the kernel core, read by the switch engine after every
/// selection. Reads and writes both require interrupts to be masked.
pub struct CurrentTask(MaskedCell<Option<NonNull<TaskControl>>>);

impl CurrentTask {
    /// An empty slot
    pub const fn new() -> Self {
        CurrentTask(MaskedCell::new(None))
    }

    /// Task currently designated to run
    #[inline]
    pub fn get(&self, masked: &Masked) -> Option<NonNull<TaskControl>> {
        self.0.read(masked)
    }

    /// Designate the task to run next
    #[inline]
    pub fn set(&self, masked: &Masked, task: Option<NonNull<TaskControl>>) {
        self.0.write(masked, task)
    }
}

impl Default for CurrentTask {
    fn default() -> Self {
        Self::new()
    }
}

/// Hooks supplied by the kernel core
pub trait Kernel {
    /// The slot naming the running task
    fn current_task(&self) -> &CurrentTask;

    /// Pick the next task and store it in [`Kernel::current_task`]
    ///
    /// Called from the middle of a context switch, after the outgoing task's
    /// registers are saved. Must not switch context itself.
    fn select_next_task(&mut self, masked: &Masked);

    /// Timer tick, delivered just before the preemptive switch
    fn tick(&mut self, _masked: &Masked) {}
}
