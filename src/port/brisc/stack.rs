//! Task stack initialization

use crate::config::CFG_TASK_STATUS;
use crate::port::Machine;
use crate::types::{StackType, TaskFn, Word};

use super::frame::{RegisterFrame, FRAME_OFFSET};

/// Build the initial register frame of a new task
///
/// The frame is laid out so that the first restore starts `entry` with `arg`
/// in r0, exactly as if the task had run once and yielded.
///
/// # Arguments
/// * `top_of_stack` - Any pointer into the task's stack object
/// * `entry` - Task entry point
/// * `arg` - Argument passed in r0
///
/// # Returns
/// The stack object base, to be stored as the task's resume point.
///
/// # Safety
/// The stack object must be at least
/// [`STACK_IMAGE_WORDS`](super::STACK_IMAGE_WORDS) words long and must not
/// belong to a task that can currently be resumed.
pub unsafe fn init_task_stack<M: Machine>(
    cpu: &M,
    top_of_stack: *mut StackType,
    entry: TaskFn,
    arg: *mut (),
) -> *mut StackType {
    // Stacks grow up from the object base; recover it whatever we were given.
    let base = cpu.object_base(top_of_stack);

    let frame = RegisterFrame::initial(
        entry as usize,
        arg as Word,
        cpu.environment_pointer(),
        base as Word,
        CFG_TASK_STATUS,
    );

    unsafe {
        base.write(0);
        base.add(FRAME_OFFSET).cast::<RegisterFrame>().write(frame);
    }

    crate::debug!(
        "stack init: base {:#x} entry {:#x} arg {:#x}",
        base as usize,
        frame.pc,
        frame.gpr[0]
    );

    base
}
