//! BRISC (BeyondRISC) port
//!
//! Register frame layout, task stack initialization, the interrupt
//! configuration and timer device blocks, and object memory.

mod device;
mod frame;
mod heap;
mod stack;

pub use device::{
    setup_preemption_timer, Devices, InterruptConfigRegisters, TimerRegisters, TIMER_STATUS,
};
pub use frame::{
    Register, RegisterFrame, FRAME_OFFSET, GPR_COUNT, REGISTER_COUNT, RESTORE_ORDER, SAVE_ORDER,
    STACK_IMAGE_WORDS,
};
pub use heap::{allocate, release, ObjectHeap, ObjectMemory};
pub use stack::init_task_stack;
