//! RAM-backed device blocks and object memory

use core::cell::UnsafeCell;
use core::ptr::NonNull;

use portable_atomic::{AtomicUsize, Ordering};

use crate::config::CFG_OBJECT_ALIGN;
use crate::port::brisc::{Devices, InterruptConfigRegisters, ObjectMemory, TimerRegisters};
use crate::types::InterruptReason;

#[repr(C, align(8))]
struct Block<const N: usize>(UnsafeCell<[u32; N]>);

impl<const N: usize> Block<N> {
    fn with_kind(kind: u32) -> Self {
        let mut words = [0; N];
        words[0] = kind;
        Block(UnsafeCell::new(words))
    }
}

/// Interrupt configuration and timer blocks in ordinary memory
///
/// The timer only advances when the harness steps it; see
/// [`Board::tick`](super::Board::tick).
pub struct SimDevices {
    icfg: Block<3>,
    timer: Block<4>,
}

impl SimDevices {
    /// Blocks reporting the expected device types
    pub fn new() -> Self {
        Self::with_kinds(InterruptReason::Icfg.as_u32(), InterruptReason::Tmr0.as_u32())
    }

    /// Blocks reporting arbitrary device types
    pub fn with_kinds(icfg_kind: u32, timer_kind: u32) -> Self {
        SimDevices {
            icfg: Block::with_kind(icfg_kind),
            timer: Block::with_kind(timer_kind),
        }
    }

    /// Io table pointing at these blocks
    pub fn io_table(&self) -> [usize; InterruptReason::COUNT] {
        let mut io = [0; InterruptReason::COUNT];
        io[InterruptReason::Icfg.index()] = self.icfg.0.get() as usize;
        io[InterruptReason::Tmr0.index()] = self.timer.0.get() as usize;
        io
    }

    /// Register-level view of the blocks
    pub fn devices(&self) -> Devices<'_> {
        // Both blocks match the register layouts word for word.
        unsafe {
            Devices::new(
                &*(self.icfg.0.get() as *const InterruptConfigRegisters),
                &*(self.timer.0.get() as *const TimerRegisters),
            )
        }
    }
}

impl Default for SimDevices {
    fn default() -> Self {
        Self::new()
    }
}

#[repr(C, align(8))]
struct Arena<const N: usize>(UnsafeCell<[u8; N]>);

/// Bump allocator standing in for hardware object memory
///
/// Objects are never reused, which is what a no-op release implies when no
/// hardware collector runs behind it.
pub struct SimObjectMemory<const N: usize> {
    arena: Arena<N>,
    next: AtomicUsize,
}

unsafe impl<const N: usize> Sync for SimObjectMemory<N> {}

impl<const N: usize> SimObjectMemory<N> {
    pub const fn new() -> Self {
        SimObjectMemory {
            arena: Arena(UnsafeCell::new([0; N])),
            next: AtomicUsize::new(0),
        }
    }

    /// Bytes handed out so far
    pub fn used(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    /// Check whether `ptr` points into the arena
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.arena.0.get() as usize;
        (base..base + N).contains(&(ptr as usize))
    }
}

impl<const N: usize> Default for SimObjectMemory<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ObjectMemory for SimObjectMemory<N> {
    fn new_object(&self, size: usize) -> Option<NonNull<u8>> {
        let rounded = size.max(1).checked_next_multiple_of(CFG_OBJECT_ALIGN)?;
        // A failed request leaves the bump pointer where it was.
        let start = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |start| {
                start.checked_add(rounded).filter(|&end| end <= N)
            })
            .ok()?;
        let base = self.arena.0.get() as *mut u8;
        NonNull::new(unsafe { base.add(start) })
    }
}
