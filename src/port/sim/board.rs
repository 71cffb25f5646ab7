//! Simulated board: CPU, devices and interrupt delivery

use core::ops::{Deref, DerefMut};

use crate::kernel::Port;
use crate::port::{Machine, TrapCause};
use crate::task::Kernel;
use crate::types::InterruptReason;

use super::{SimCpu, SimDevices};

/// A port running on [`SimCpu`] and [`SimDevices`]
///
/// Plays the hardware's part: advances the timer one count at a time and
/// takes a latched timer interrupt whenever the core would, meaning outside
/// trap context, with the global enable set and TMR0 enabled.
pub struct Board<'d, K: Kernel> {
    port: Port<'d, SimCpu, K>,
}

impl<'d, K: Kernel> Board<'d, K> {
    pub fn new(hw: &'d SimDevices, kernel: K) -> Self {
        Board {
            port: Port::new(SimCpu::new(), kernel, hw.devices()),
        }
    }

    /// Override the preemption period, in timer counts
    pub fn with_tick_interval(self, interval: u32) -> Self {
        Board {
            port: self.port.with_tick_interval(interval),
        }
    }

    pub fn port(&self) -> &Port<'d, SimCpu, K> {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut Port<'d, SimCpu, K> {
        &mut self.port
    }

    /// Check whether a timer interrupt is latched
    pub fn interrupt_pending(&self) -> bool {
        self.port.devices().timer_expired()
    }

    /// Take a latched timer interrupt if the core would accept it now
    ///
    /// Returns `true` if the interrupt was serviced.
    pub fn service_interrupts(&mut self) -> bool {
        let devices = *self.port.devices();
        if !devices.timer_expired()
            || !devices.interrupts_enabled()
            || !devices.source_enabled(InterruptReason::Tmr0)
            || self.port.cpu().in_trap()
        {
            return false;
        }

        self.port.trap(TrapCause::Interrupt(InterruptReason::Tmr0.as_u32()));
        true
    }

    /// Advance the timer one count and deliver any interrupt
    ///
    /// Returns `true` if the count ended in a preemptive switch.
    pub fn tick(&mut self) -> bool {
        self.port.devices().step_timer();
        self.service_interrupts()
    }

    /// Advance the timer `counts` times; returns the number of switches
    pub fn run(&mut self, counts: u32) -> u32 {
        (0..counts).filter(|_| self.tick()).count() as u32
    }

    /// Unmask interrupts and take anything latched while masked
    pub fn exit_critical(&mut self) -> bool {
        self.port.exit_critical();
        self.service_interrupts()
    }
}

impl<'d, K: Kernel> Deref for Board<'d, K> {
    type Target = Port<'d, SimCpu, K>;

    fn deref(&self) -> &Self::Target {
        &self.port
    }
}

impl<K: Kernel> DerefMut for Board<'_, K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.port
    }
}
