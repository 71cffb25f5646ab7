//! Port state, bootstrap and trap dispatch
//!
//! [`Port`] ties together the processor, the kernel core's hooks and the two
//! device blocks. On the target one instance lives for the whole program;
//! the trap vector and the tick interrupt both land in [`Port::trap`].

use core::ptr::NonNull;

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::CFG_TICK_INTERVAL;
use crate::critical::{self, CriticalSection, Masked};
use crate::error::{fatal, PortFault};
use crate::port::brisc::{self, setup_preemption_timer, Devices};
use crate::port::{Machine, TrapCause};
use crate::sched;
use crate::task::{Kernel, TaskControl};
use crate::types::{InterruptReason, StackType, Syscall, TaskFn};

// ============ Port State ============

/// Atomic port flags
pub struct PortFlags {
    running: AtomicBool,
    tick_counter: AtomicU32,
    switch_counter: AtomicU32,
}

impl PortFlags {
    const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            tick_counter: AtomicU32::new(0),
            switch_counter: AtomicU32::new(0),
        }
    }

    /// Check if the scheduler is running
    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Get current tick count
    #[inline(always)]
    pub fn tick_get(&self) -> u32 {
        self.tick_counter.load(Ordering::Relaxed)
    }

    /// Get number of completed context switches
    #[inline(always)]
    pub fn switch_get(&self) -> u32 {
        self.switch_counter.load(Ordering::Relaxed)
    }

    /// Increment and return tick count
    #[inline(always)]
    pub(crate) fn tick_increment(&self) -> u32 {
        self.tick_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    #[inline(always)]
    pub(crate) fn switch_increment(&self) {
        self.switch_counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Set running flag
    #[inline(always)]
    pub(crate) fn set_running(&self, val: bool) {
        self.running.store(val, Ordering::SeqCst);
    }
}

/// Marker returned by [`Port::start_scheduler`]
///
/// BRISC traps behave like calls, so the bootstrap's caller sees a return.
/// It means the first task has been handed the processor, not that the
/// scheduler stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handoff;

/// The port instance
pub struct Port<'d, M: Machine, K: Kernel> {
    pub(crate) cpu: M,
    pub(crate) kernel: K,
    pub(crate) devices: Devices<'d>,
    pub(crate) flags: PortFlags,
    /// Task whose frame was most recently restored
    resumed: Option<NonNull<TaskControl>>,
    tick_interval: u32,
}

impl<'d, M: Machine, K: Kernel> Port<'d, M, K> {
    /// Assemble a port with the default tick interval
    pub fn new(cpu: M, kernel: K, devices: Devices<'d>) -> Self {
        Port {
            cpu,
            kernel,
            devices,
            flags: PortFlags::new(),
            resumed: None,
            tick_interval: CFG_TICK_INTERVAL,
        }
    }

    /// Override the preemption period, in timer counts
    pub fn with_tick_interval(mut self, interval: u32) -> Self {
        self.tick_interval = interval;
        self
    }

    // ============ Accessors ============

    pub fn cpu(&self) -> &M {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut M {
        &mut self.cpu
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    pub fn devices(&self) -> &Devices<'d> {
        &self.devices
    }

    pub fn flags(&self) -> &PortFlags {
        &self.flags
    }

    /// Check if the scheduler is running
    #[inline]
    pub fn is_running(&self) -> bool {
        self.flags.is_running()
    }

    /// Ticks serviced since start
    #[inline]
    pub fn tick_count(&self) -> u32 {
        self.flags.tick_get()
    }

    /// Context switches performed since start
    #[inline]
    pub fn switch_count(&self) -> u32 {
        self.flags.switch_get()
    }

    /// Task whose registers were most recently restored
    #[inline]
    pub fn running_task(&self) -> Option<NonNull<TaskControl>> {
        self.resumed
    }

    // ============ Kernel-facing API ============

    /// Build a new task's initial frame; see [`brisc::init_task_stack`]
    ///
    /// # Safety
    /// Same contract as [`brisc::init_task_stack`].
    pub unsafe fn init_task_stack(
        &self,
        top_of_stack: *mut StackType,
        entry: TaskFn,
        arg: *mut (),
    ) -> *mut StackType {
        unsafe { brisc::init_task_stack(&self.cpu, top_of_stack, entry, arg) }
    }

    /// Mask interrupts; does not nest
    #[inline]
    pub fn enter_critical(&self) {
        critical::enter_critical(&self.devices);
    }

    /// Unmask interrupts, however many times [`Port::enter_critical`] ran
    #[inline]
    pub fn exit_critical(&self) {
        critical::exit_critical(&self.devices);
    }

    /// Run `f` with interrupts masked
    #[inline]
    pub fn critical<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CriticalSection<'d>) -> R,
    {
        critical::critical_section(&self.devices, f)
    }

    /// Give up the processor to whichever task the kernel selects
    ///
    /// Task context only. Returns once the calling task is selected again.
    pub fn yield_now(&mut self) {
        if self.cpu.in_trap() {
            fatal(PortFault::YieldIsr);
        }
        self.trap(TrapCause::Syscall(Syscall::TaskYield));
    }

    /// Trap entry: system calls and device interrupts
    pub fn trap(&mut self, cause: TrapCause) {
        self.cpu.enter_trap();
        // Trap context does not take interrupts.
        let masked = unsafe { Masked::assume() };

        if !self.is_running() {
            fatal(PortFault::SchedNotRunning);
        }

        match cause {
            TrapCause::Syscall(Syscall::TaskYield) => self.switch(&masked),
            TrapCause::Interrupt(raw) => match InterruptReason::from_u32(raw) {
                Some(InterruptReason::Tmr0) => self.timer_interrupt(&masked),
                _ => {
                    crate::error!("unexpected interrupt reason {}", raw);
                    fatal(PortFault::InterruptUnknown)
                }
            },
        }

        self.cpu.leave_trap();
    }

    /// Arm preemption and hand the processor to the kernel's current task
    pub fn start_scheduler(&mut self) -> Handoff {
        if self.is_running() {
            fatal(PortFault::SchedRunning);
        }

        // Start the timer that generates the preemption call
        setup_preemption_timer(&self.devices, self.tick_interval);
        self.flags.set_running(true);

        self.cpu.enter_trap();
        let masked = unsafe { Masked::assume() };
        let first = unsafe { sched::start_first_task(&mut self.cpu, &self.kernel, &masked) };
        self.resumed = Some(first);
        self.cpu.leave_trap();

        crate::info!("scheduler started, first task {:#x}", first.as_ptr() as usize);
        Handoff
    }

    /// Stopping the scheduler is not supported on this target
    pub fn stop_scheduler(&self) -> ! {
        fatal(PortFault::SchedStopUnsupported)
    }

    /// Save, select, restore
    pub(crate) fn switch(&mut self, masked: &Masked) {
        let next = unsafe { sched::switch_context(&mut self.cpu, &mut self.kernel, masked) };
        self.resumed = Some(next);
        self.flags.switch_increment();
    }
}
