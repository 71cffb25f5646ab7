//! Interrupt-masked cell
//!
//! Zero-overhead wrapper for data that must only be accessed with interrupts
//! masked.

use core::cell::UnsafeCell;

use crate::critical::Masked;

/// A cell that can only be accessed while interrupts are masked.
pub struct MaskedCell<T>(UnsafeCell<T>);

// Single core: masking interrupts excludes every other accessor.
unsafe impl<T> Sync for MaskedCell<T> {}

impl<T> MaskedCell<T> {
    /// Create a new MaskedCell
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    /// Get a mutable reference to the inner value
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub fn get<'a>(&'a self, _masked: &'a Masked) -> &'a mut T {
        unsafe { &mut *self.0.get() }
    }
}

impl<T: Copy> MaskedCell<T> {
    /// Copy the value out
    #[inline(always)]
    pub fn read(&self, _masked: &Masked) -> T {
        unsafe { *self.0.get() }
    }

    /// Overwrite the value
    #[inline(always)]
    pub fn write(&self, _masked: &Masked, value: T) {
        unsafe { *self.0.get() = value }
    }
}
