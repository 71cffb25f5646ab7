//! Critical section handling for the BRISC port
//!
//! A critical section is nothing more than the global interrupt-enable bit
//! in the interrupt configuration block being clear. The primitive does not
//! nest: one [`exit_critical`] re-enables interrupts no matter how many
//! [`enter_critical`] calls preceded it. Nesting, where needed, is layered on
//! top by the `critical-section` provider, which restores the previous state.

use core::marker::PhantomData;
use core::ops::Deref;

use crate::port::brisc::Devices;

/// Proof that interrupts are masked
///
/// Either a [`CriticalSection`] is alive or the code runs in trap context.
/// Data shared with the switch engine is only reachable through one.
pub struct Masked {
    _not_send: PhantomData<*const ()>,
}

impl Masked {
    /// Assert that interrupts are masked without touching the hardware
    ///
    /// # Safety
    /// The caller runs in trap context, or otherwise guarantees that no
    /// interrupt can be taken for as long as the token lives.
    #[inline(always)]
    pub unsafe fn assume() -> Self {
        Masked { _not_send: PhantomData }
    }
}

/// RAII guard for critical sections
///
/// When this guard is created, interrupts are disabled.
/// When it is dropped, interrupts are enabled again.
pub struct CriticalSection<'d> {
    devices: Devices<'d>,
    masked: Masked,
}

impl<'d> CriticalSection<'d> {
    /// Enter a critical section by clearing the global enable bit.
    #[inline(always)]
    pub fn enter(devices: &Devices<'d>) -> Self {
        enter_critical(devices);
        CriticalSection {
            devices: *devices,
            masked: Masked { _not_send: PhantomData },
        }
    }

    /// Check if interrupts are currently masked
    #[inline(always)]
    pub fn is_active(devices: &Devices<'_>) -> bool {
        !devices.interrupts_enabled()
    }
}

impl Deref for CriticalSection<'_> {
    type Target = Masked;

    #[inline(always)]
    fn deref(&self) -> &Masked {
        &self.masked
    }
}

impl Drop for CriticalSection<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        exit_critical(&self.devices);
    }
}

/// Disable interrupts globally
#[inline]
pub fn enter_critical(devices: &Devices<'_>) {
    devices.set_global_enable(false);
}

/// Enable interrupts globally
#[inline]
pub fn exit_critical(devices: &Devices<'_>) {
    devices.set_global_enable(true);
}

/// Execute a closure with interrupts disabled
///
/// The closure receives the guard, which dereferences to the [`Masked`]
/// proof needed by [`MaskedCell`](crate::os::cs_cell::MaskedCell).
#[inline]
pub fn critical_section<'d, F, R>(devices: &Devices<'d>, f: F) -> R
where
    F: FnOnce(&CriticalSection<'d>) -> R,
{
    let cs = CriticalSection::enter(devices);
    f(&cs)
}

/// Nesting-aware acquire: mask interrupts and report whether they were on
#[inline]
pub fn acquire_with(devices: &Devices<'_>) -> bool {
    let was_enabled = devices.interrupts_enabled();
    enter_critical(devices);
    was_enabled
}

/// Nesting-aware release: re-enable only if the matching acquire found
/// interrupts enabled
#[inline]
pub fn release_with(devices: &Devices<'_>, was_enabled: bool) {
    if was_enabled {
        exit_critical(devices);
    }
}
