//! BRISC interrupt configuration and timer devices
//!
//! Both are memory-mapped blocks whose first word reports the device type.
//! The io table maps each [`InterruptReason`] to its block's base address.

use tock_registers::{
    interfaces::{ReadWriteable, Readable, Writeable},
    register_bitfields, register_structs,
    registers::{ReadOnly, ReadWrite},
};

use crate::error::{fatal, PortFault, PortResult};
use crate::types::InterruptReason;

register_bitfields![u32,
    pub TIMER_STATUS [
        // Counter runs
        ENABLE OFFSET(0) NUMBITS(1) [],
        // Raise an interrupt when the counter wraps
        INTERRUPT OFFSET(1) NUMBITS(1) [],
        // Latched by hardware on wrap, cleared to acknowledge
        EXPIRED OFFSET(2) NUMBITS(1) []
    ]
];

register_structs! {
    /// Interrupt configuration block
    pub InterruptConfigRegisters {
        (0x00 => kind: ReadOnly<u32>),
        (0x04 => global: ReadWrite<u32>),
        (0x08 => enbdev: ReadWrite<u32>),
        (0x0C => @END),
    },

    /// Timer block
    pub TimerRegisters {
        (0x00 => kind: ReadOnly<u32>),
        (0x04 => status: ReadWrite<u32, TIMER_STATUS::Register>),
        (0x08 => curcnt: ReadWrite<u32>),
        (0x0C => reload: ReadWrite<u32>),
        (0x10 => @END),
    }
}

/// Enable every interrupt source
const ALL_SOURCES: u32 = 0xFFFF_FFFF;

/// The two device blocks the port drives
#[derive(Clone, Copy)]
pub struct Devices<'d> {
    icfg: &'d InterruptConfigRegisters,
    timer: &'d TimerRegisters,
}

impl<'d> Devices<'d> {
    /// Wrap already-mapped device blocks
    pub fn new(icfg: &'d InterruptConfigRegisters, timer: &'d TimerRegisters) -> Self {
        Devices { icfg, timer }
    }

    /// Resolve the device blocks through an io table
    ///
    /// # Safety
    /// Every entry must be the address of a mapped device block of the
    /// layout its [`InterruptReason`] implies, valid for the program's life.
    pub unsafe fn from_io_table(io: &[usize; InterruptReason::COUNT]) -> Devices<'static> {
        unsafe {
            Devices {
                icfg: &*(io[InterruptReason::Icfg.index()] as *const InterruptConfigRegisters),
                timer: &*(io[InterruptReason::Tmr0.index()] as *const TimerRegisters),
            }
        }
    }

    /// Verify that both blocks report the expected device type
    pub fn check(&self) -> PortResult<()> {
        if self.icfg.kind.get() != InterruptReason::Icfg.as_u32() {
            return Err(PortFault::IcfgTypeMismatch);
        }
        if self.timer.kind.get() != InterruptReason::Tmr0.as_u32() {
            return Err(PortFault::TimerTypeMismatch);
        }
        Ok(())
    }

    // ============ Interrupt configuration ============

    /// Check whether the global enable bit is set
    #[inline]
    pub fn interrupts_enabled(&self) -> bool {
        self.icfg.global.get() != 0
    }

    #[inline]
    pub(crate) fn set_global_enable(&self, enabled: bool) {
        self.icfg.global.set(enabled as u32);
    }

    /// Per-source enable mask
    #[inline]
    pub fn enabled_sources(&self) -> u32 {
        self.icfg.enbdev.get()
    }

    /// Check whether `reason` may interrupt
    #[inline]
    pub fn source_enabled(&self, reason: InterruptReason) -> bool {
        self.enabled_sources() & reason.enable_bit() != 0
    }

    // ============ Timer ============

    /// Program periodic preemption every `interval` counts
    pub fn program_timer(&self, interval: u32) -> PortResult<()> {
        self.check()?;
        if interval == 0 {
            return Err(PortFault::TimerIntervalInvalid);
        }

        // Globally enable interrupts
        self.icfg.global.set(1);
        // Enable individual interrupts
        self.icfg.enbdev.set(ALL_SOURCES);

        self.timer.curcnt.set(0);
        self.timer.reload.set(interval - 1);
        self.timer
            .status
            .write(TIMER_STATUS::ENABLE::SET + TIMER_STATUS::INTERRUPT::SET);

        Ok(())
    }

    /// Check whether the timer has wrapped since the last acknowledge
    #[inline]
    pub fn timer_expired(&self) -> bool {
        self.timer.status.is_set(TIMER_STATUS::EXPIRED)
    }

    /// Clear the timer's expiry latch
    #[inline]
    pub fn acknowledge_timer(&self) {
        self.timer.status.modify(TIMER_STATUS::EXPIRED::CLEAR);
    }

    /// Raw timer status word
    #[inline]
    pub fn timer_status(&self) -> u32 {
        self.timer.status.get()
    }

    /// Running timer count
    #[inline]
    pub fn timer_count(&self) -> u32 {
        self.timer.curcnt.get()
    }

    /// Timer reload value
    #[inline]
    pub fn timer_reload(&self) -> u32 {
        self.timer.reload.get()
    }

    /// Advance the timer by one count, as the hardware does
    ///
    /// Returns `true` when the count wrapped and the expiry was latched.
    #[cfg(not(target_os = "none"))]
    pub(crate) fn step_timer(&self) -> bool {
        if !self.timer.status.is_set(TIMER_STATUS::ENABLE) {
            return false;
        }

        let count = self.timer.curcnt.get();
        if count < self.timer.reload.get() {
            self.timer.curcnt.set(count + 1);
            return false;
        }

        self.timer.curcnt.set(0);
        if self.timer.status.is_set(TIMER_STATUS::INTERRUPT) {
            self.timer.status.modify(TIMER_STATUS::EXPIRED::SET);
            return true;
        }
        false
    }
}

/// Arm the preemption timer
///
/// Enables interrupts globally and from every source, then starts TMR0
/// firing every `interval` counts. A device type mismatch or a zero interval
/// is fatal: continuing would silently lose preemption.
pub fn setup_preemption_timer(devices: &Devices<'_>, interval: u32) {
    if let Err(fault) = devices.program_timer(interval) {
        fatal(fault);
    }

    crate::info!("preemption timer armed: every {} counts", interval);
}
