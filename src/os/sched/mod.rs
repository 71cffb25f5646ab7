//! Context switch engine
//!
//! Every switch is save, select, restore. The first task of the system is
//! only restored: nothing ran before it, so there is nothing to save.
//!
//! Both routines run with interrupts masked and leave the processor in
//! [`Mode::Normal`] with the incoming task's registers loaded. From the
//! outgoing task's point of view the switch is a call that returns later,
//! possibly much later, once the kernel selects it again.

use core::ptr::NonNull;

use crate::critical::Masked;
use crate::error::{fatal, PortFault, PortResult};
use crate::port::brisc::RegisterFrame;
use crate::port::{Machine, Mode};
use crate::task::{Kernel, TaskControl};

/// Resolve the current task and its frame
fn current_frame<K: Kernel + ?Sized>(
    kernel: &K,
    masked: &Masked,
) -> PortResult<(NonNull<TaskControl>, NonNull<RegisterFrame>)> {
    let task = kernel
        .current_task()
        .get(masked)
        .ok_or(PortFault::NoCurrentTask)?;
    let frame = unsafe { task.as_ref() }
        .frame()
        .ok_or(PortFault::FrameInvalid)?;
    Ok((task, frame))
}

/// Switch from the current task to whichever task the kernel selects
///
/// 1. Save all registers into the current task's frame
/// 2. Let the kernel move its current-task slot
/// 3. Restore all registers from the new current task's frame
/// 4. Drop to normal mode
///
/// Returns the task now running.
///
/// # Safety
/// Must run in trap context. The current task's frame must belong to the
/// task whose registers are live on the processor.
pub unsafe fn switch_context<M, K>(cpu: &mut M, kernel: &mut K, masked: &Masked) -> NonNull<TaskControl>
where
    M: Machine + ?Sized,
    K: Kernel + ?Sized,
{
    let (outgoing, frame) = current_frame(kernel, masked).unwrap_or_else(|fault| fatal(fault));
    unsafe { cpu.save_registers(frame) };

    kernel.select_next_task(masked);

    let (incoming, frame) = current_frame(kernel, masked).unwrap_or_else(|fault| fatal(fault));
    unsafe { cpu.restore_registers(frame) };
    cpu.set_mode(Mode::Normal);

    crate::trace!(
        "switch {:#x} -> {:#x}",
        outgoing.as_ptr() as usize,
        incoming.as_ptr() as usize
    );

    incoming
}

/// Resume the task the kernel marked current, without saving anything
///
/// # Safety
/// Must run in trap context, before any task has run.
pub unsafe fn start_first_task<M, K>(cpu: &mut M, kernel: &K, masked: &Masked) -> NonNull<TaskControl>
where
    M: Machine + ?Sized,
    K: Kernel + ?Sized,
{
    let (first, frame) = current_frame(kernel, masked).unwrap_or_else(|fault| fatal(fault));
    unsafe { cpu.restore_registers(frame) };
    cpu.set_mode(Mode::Normal);

    first
}
