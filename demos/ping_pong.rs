//! Ping-pong: two tasks sharing the simulated BRISC core
//!
//! The host plays both tasks. Each one counts in r3 and either yields or
//! waits to be preempted by the timer; the register file follows whichever
//! task the kernel hands the core to.

use std::ptr::NonNull;

use brisc_port::port::brisc::Register;
use brisc_port::port::sim::{Board, SimDevices};
use brisc_port::{CriticalSection, CurrentTask, Kernel, Masked, StackType, TaskControl};

// ============ Task Storage ============

const STACK_WORDS: usize = 64;

#[repr(C)]
struct Task {
    control: TaskControl,
    stack: [StackType; STACK_WORDS],
}

// ============ Kernel ============

/// Alternates between two tasks
struct PingPong {
    tasks: [NonNull<Task>; 2],
    index: usize,
    current: CurrentTask,
}

impl PingPong {
    fn select(&mut self, masked: &Masked, index: usize) {
        self.index = index;
        self.current.set(masked, Some(self.tasks[index].cast()));
    }
}

impl Kernel for PingPong {
    fn current_task(&self) -> &CurrentTask {
        &self.current
    }

    fn select_next_task(&mut self, masked: &Masked) {
        self.select(masked, self.index ^ 1);
    }
}

// ============ Tasks ============

fn ping(_: *mut ()) -> ! {
    loop {
        std::hint::spin_loop();
    }
}

fn pong(_: *mut ()) -> ! {
    loop {
        std::hint::spin_loop();
    }
}

fn name(arg: usize) -> &'static str {
    if arg == 1 { "ping" } else { "pong" }
}

// ============ Main ============

fn main() {
    let hw = SimDevices::new();

    let tasks = [(); 2].map(|_| {
        let task = Box::leak(Box::new(Task {
            control: TaskControl::new(),
            stack: [0; STACK_WORDS],
        }));
        NonNull::from(task)
    });
    let kernel = PingPong {
        tasks,
        index: 0,
        current: CurrentTask::new(),
    };
    let mut board = Board::new(&hw, kernel).with_tick_interval(100);

    for (i, entry) in [ping, pong].into_iter().enumerate() {
        let task = unsafe { &mut *tasks[i].as_ptr() };
        let top = unsafe { board.init_task_stack(task.stack.as_mut_ptr(), entry, (i + 1) as *mut ()) };
        task.control.set_top_of_stack(top);
    }

    {
        let devices = *board.devices();
        let cs = CriticalSection::enter(&devices);
        board.kernel_mut().select(&cs, 0);
    }

    board.start_scheduler();

    // Cooperative rounds
    for _ in 0..4 {
        let arg = board.cpu().register(Register::R0);
        let count = board.cpu().register(Register::R3) + 1;
        board.cpu_mut().set_register(Register::R3, count);
        println!("{} #{} yields", name(arg), count);
        board.yield_now();
    }

    // Preemptive rounds
    for _ in 0..4 {
        let arg = board.cpu().register(Register::R0);
        let count = board.cpu().register(Register::R3) + 1;
        board.cpu_mut().set_register(Register::R3, count);
        let counts = board.run(100);
        println!("{} #{} preempted after 100 counts ({} switch)", name(arg), count, counts);
    }

    println!(
        "{} ticks, {} switches",
        board.tick_count(),
        board.switch_count()
    );
}
