//! Object memory
//!
//! BRISC allocates memory as hardware-tracked objects (`newm8`) and reclaims
//! them on its own once no register or object refers to them. Generic kernel
//! code still expects a malloc/free pair, so [`release`] exists but does
//! nothing: dropping the caller's pointer is all the hardware needs.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;

use crate::config::CFG_OBJECT_ALIGN;

/// Hardware object allocator
pub trait ObjectMemory {
    /// Allocate a fresh object of at least `size` bytes, aligned to
    /// [`CFG_OBJECT_ALIGN`]
    ///
    /// Returns `None` only when the backing store is exhausted, which the
    /// hardware allocator never reports.
    fn new_object(&self, size: usize) -> Option<NonNull<u8>>;
}

/// Allocate `size` bytes of object memory
///
/// Returns null only if the backing store is exhausted.
#[inline]
pub fn allocate<A: ObjectMemory + ?Sized>(memory: &A, size: usize) -> *mut u8 {
    memory
        .new_object(size)
        .map_or(core::ptr::null_mut(), NonNull::as_ptr)
}

/// Release object memory
///
/// Intentionally a no-op: the hardware reclaims the object once it becomes
/// unreachable. The region's contents are left untouched.
#[inline]
pub fn release(_region: *mut u8) {}

/// [`GlobalAlloc`] over object memory
///
/// Lets `alloc`-based kernel code run on the hardware allocator.
pub struct ObjectHeap<A> {
    memory: A,
}

impl<A: ObjectMemory> ObjectHeap<A> {
    pub const fn new(memory: A) -> Self {
        ObjectHeap { memory }
    }

    /// Backing allocator
    pub fn memory(&self) -> &A {
        &self.memory
    }
}

unsafe impl<A: ObjectMemory> GlobalAlloc for ObjectHeap<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() <= CFG_OBJECT_ALIGN {
            return allocate(&self.memory, layout.size());
        }

        // Over-allocate and align inside the object.
        let padded = layout.size() + layout.align() - CFG_OBJECT_ALIGN;
        let raw = allocate(&self.memory, padded);
        if raw.is_null() {
            return raw;
        }
        let offset = raw.align_offset(layout.align());
        unsafe { raw.add(offset) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        release(ptr);
    }
}
