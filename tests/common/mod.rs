//! Minimal kernel core for driving the port on the simulator

#![allow(dead_code)]

use std::ptr::NonNull;

use brisc_port::port::sim::Board;
use brisc_port::{CriticalSection, CurrentTask, Kernel, Masked, StackType, TaskControl, TaskFn};

pub const STACK_WORDS: usize = 32;

/// Kernel TCB with the port-visible prefix first
#[repr(C)]
pub struct TestTask {
    pub control: TaskControl,
    pub stack: [StackType; STACK_WORDS],
}

/// Round-robin task selection over every spawned task
pub struct RoundRobin {
    tasks: Vec<NonNull<TestTask>>,
    index: usize,
    current: CurrentTask,
    pub selections: u32,
    pub ticks: u32,
}

impl RoundRobin {
    pub fn new() -> Self {
        RoundRobin {
            tasks: Vec::new(),
            index: 0,
            current: CurrentTask::new(),
            selections: 0,
            ticks: 0,
        }
    }

    pub fn task(&self, index: usize) -> NonNull<TaskControl> {
        self.tasks[index].cast()
    }

    pub fn task_ref(&self, index: usize) -> &TestTask {
        unsafe { self.tasks[index].as_ref() }
    }

    pub fn make_current(&mut self, masked: &Masked, index: usize) {
        self.index = index;
        self.current.set(masked, Some(self.task(index)));
    }
}

impl Drop for RoundRobin {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            drop(unsafe { Box::from_raw(task.as_ptr()) });
        }
    }
}

impl Kernel for RoundRobin {
    fn current_task(&self) -> &CurrentTask {
        &self.current
    }

    fn select_next_task(&mut self, masked: &Masked) {
        self.selections += 1;
        let next = (self.index + 1) % self.tasks.len();
        self.make_current(masked, next);
    }

    fn tick(&mut self, _masked: &Masked) {
        self.ticks += 1;
    }
}

/// Create a task and build its initial frame
pub fn spawn(board: &mut Board<'_, RoundRobin>, entry: TaskFn, arg: usize) -> NonNull<TaskControl> {
    let task = Box::into_raw(Box::new(TestTask {
        control: TaskControl::new(),
        stack: [0xDEAD_BEEF; STACK_WORDS],
    }));

    unsafe {
        let top = board.init_task_stack((*task).stack.as_mut_ptr(), entry, arg as *mut ());
        (*task).control.set_top_of_stack(top);
    }

    let task = NonNull::new(task).unwrap();
    board.kernel_mut().tasks.push(task);
    task.cast()
}

/// Mark task `index` current before the scheduler starts
pub fn make_current(board: &mut Board<'_, RoundRobin>, index: usize) {
    let devices = *board.devices();
    let cs = CriticalSection::enter(&devices);
    board.kernel_mut().make_current(&cs, index);
}

/// The kernel's current-task slot, sampled with interrupts masked
pub fn current(board: &Board<'_, RoundRobin>) -> Option<NonNull<TaskControl>> {
    let was_enabled = board.devices().interrupts_enabled();
    let value = board.critical(|cs| board.kernel().current_task().get(cs));
    if !was_enabled {
        board.enter_critical();
    }
    value
}

pub fn task_a(_: *mut ()) -> ! {
    loop {
        std::hint::spin_loop();
    }
}

pub fn task_b(_: *mut ()) -> ! {
    loop {
        std::hint::spin_loop();
    }
}

pub fn task_c(_: *mut ()) -> ! {
    loop {
        std::hint::spin_loop();
    }
}

pub fn entry_addr(entry: TaskFn) -> usize {
    entry as usize
}
