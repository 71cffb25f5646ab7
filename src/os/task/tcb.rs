//! Port-visible prefix of the kernel's Task Control Block

use core::ptr::NonNull;

use crate::port::brisc::{RegisterFrame, FRAME_OFFSET};
use crate::types::StackType;

/// Port-visible part of a Task Control Block
///
/// The kernel core embeds this as the first field of its own TCB. The port
/// reads nothing else from a task.
#[repr(C)]
pub struct TaskControl {
    /// Resume point returned by [`init_task_stack`](crate::init_task_stack)
    top_of_stack: *mut StackType,
}

impl TaskControl {
    /// A control block with no stack attached yet
    pub const fn new() -> Self {
        TaskControl {
            top_of_stack: core::ptr::null_mut(),
        }
    }

    /// Resume point of this task
    #[inline]
    pub fn top_of_stack(&self) -> *mut StackType {
        self.top_of_stack
    }

    /// Record the resume point produced by the stack initializer
    #[inline]
    pub fn set_top_of_stack(&mut self, top: *mut StackType) {
        self.top_of_stack = top;
    }

    /// Locate the saved register frame, one word past the resume point
    #[inline]
    pub fn frame(&self) -> Option<NonNull<RegisterFrame>> {
        if self.top_of_stack.is_null() {
            return None;
        }
        // The stack object was sized by the kernel core to hold the frame.
        let frame = unsafe { self.top_of_stack.add(FRAME_OFFSET) };
        NonNull::new(frame.cast::<RegisterFrame>())
    }
}

impl Default for TaskControl {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for TaskControl {}
unsafe impl Sync for TaskControl {}
