//! BRISC port layer for a preemptive real-time kernel
//!
//! The architecture-specific half of the scheduler:
//! - Per-task register frames and the stack initializer that builds them
//! - Interrupt masking for critical sections
//! - Interrupt controller and preemption timer programming
//! - The context switch engine, driven by yields and timer ticks
//!
//! Task selection, ready lists and every other kernel service live in the
//! kernel core, which plugs in through [`Kernel`].

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

// ============ Critical Section ============

#[cfg(feature = "critical-section-impl")]
mod cs_impl {
    use critical_section::{set_impl, Impl, RawRestoreState};

    use crate::critical::{acquire_with, release_with};
    use crate::port::brisc::Devices;

    struct BriscCriticalSection;
    set_impl!(BriscCriticalSection);

    unsafe impl Impl for BriscCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let devices = unsafe { Devices::from_io_table(&crate::config::CFG_IO_TABLE) };
            acquire_with(&devices)
        }

        unsafe fn release(was_enabled: RawRestoreState) {
            let devices = unsafe { Devices::from_io_table(&crate::config::CFG_IO_TABLE) };
            release_with(&devices, was_enabled)
        }
    }
}

// ============ Modules ============

pub mod log;
mod lang_items;

pub mod os;
pub mod port;

// ============ Re-exports ============

pub use os::config;
pub use os::config::*;
pub use os::critical;
pub use os::critical::{CriticalSection, Masked};
pub use os::error;
pub use os::error::{fatal, PortFault, PortResult};
pub use os::kernel;
pub use os::kernel::{Handoff, Port};
pub use os::types;
pub use os::types::*;
pub use os::task;
pub use os::task::{CurrentTask, Kernel, TaskControl};
pub use os::sched;
pub use os::time;

pub use port::{Machine, Mode, TrapCause};
pub use port::brisc::{allocate, release, init_task_stack, Devices, ObjectHeap, ObjectMemory, RegisterFrame};

#[cfg(feature = "log")]
#[doc(hidden)]
pub use ::log as __log;
