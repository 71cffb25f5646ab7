//! Unit tests for the port building blocks
//!
//! These tests run on the host against the simulated register file and
//! RAM-backed device blocks.

#[cfg(test)]
mod frame_tests {
    use brisc_port::port::brisc::{
        Register, FRAME_OFFSET, GPR_COUNT, REGISTER_COUNT, RESTORE_ORDER, SAVE_ORDER,
        STACK_IMAGE_WORDS,
    };
    use brisc_port::port::sim::SimCpu;
    use brisc_port::{Machine, RegisterFrame, Word};
    use core::mem::{offset_of, size_of};
    use core::ptr::NonNull;

    #[test]
    fn test_register_indices_follow_frame_order() {
        for (slot, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.index(), slot);
        }
        assert_eq!(Register::gpr(0), Some(Register::R0));
        assert_eq!(Register::gpr(9), Some(Register::R9));
        assert_eq!(Register::gpr(GPR_COUNT), None);
        assert_eq!(Register::ARG, Register::R0);
    }

    #[test]
    fn test_save_and_restore_orders_match() {
        assert_eq!(SAVE_ORDER, RESTORE_ORDER);

        let mut seen = [false; REGISTER_COUNT];
        for reg in SAVE_ORDER {
            assert!(!seen[reg.index()], "{:?} saved twice", reg);
            seen[reg.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_frame_layout() {
        let word = size_of::<Word>();
        assert_eq!(size_of::<RegisterFrame>(), REGISTER_COUNT * word);
        assert_eq!(offset_of!(RegisterFrame, gpr), 0);
        assert_eq!(offset_of!(RegisterFrame, pc), Register::Pc.index() * word);
        assert_eq!(offset_of!(RegisterFrame, ep), Register::Ep.index() * word);
        assert_eq!(offset_of!(RegisterFrame, wp), Register::Wp.index() * word);
        assert_eq!(offset_of!(RegisterFrame, sr), Register::Sr.index() * word);
        assert_eq!(FRAME_OFFSET, 1);
        assert_eq!(STACK_IMAGE_WORDS, 15);
    }

    #[test]
    fn test_initial_frame() {
        let frame = RegisterFrame::initial(0x100, 0xA1, 0x200, 0x300, 0x40);

        assert_eq!(frame.get(Register::Pc), 0x100);
        assert_eq!(frame.get(Register::R0), 0xA1);
        assert_eq!(frame.get(Register::Ep), 0x200);
        assert_eq!(frame.get(Register::Wp), 0x300);
        assert_eq!(frame.get(Register::Sr), 0x40);
        for n in 1..GPR_COUNT {
            assert_eq!(frame.gpr[n], 0);
        }
    }

    #[test]
    fn test_save_writes_every_slot() {
        let mut cpu = SimCpu::new();
        for reg in Register::ALL {
            cpu.set_register(reg, 0x1000 + reg.index());
        }

        let mut frame = RegisterFrame::zeroed();
        unsafe { cpu.save_registers(NonNull::from(&mut frame)) };

        for reg in Register::ALL {
            assert_eq!(frame.get(reg), 0x1000 + reg.index());
        }
        assert_eq!(cpu.save_count(), 1);
    }

    #[test]
    fn test_restore_reads_every_slot() {
        let mut frame = RegisterFrame::zeroed();
        for reg in Register::ALL {
            frame.set(reg, 0x2000 + reg.index());
        }

        let mut cpu = SimCpu::new();
        unsafe { cpu.restore_registers(NonNull::from(&mut frame)) };

        for reg in Register::ALL {
            assert_eq!(cpu.register(reg), 0x2000 + reg.index());
        }
        assert_eq!(cpu.restore_count(), 1);
    }
}

#[cfg(test)]
mod stack_tests {
    use brisc_port::port::brisc::{Register, FRAME_OFFSET, STACK_IMAGE_WORDS};
    use brisc_port::port::sim::SimCpu;
    use brisc_port::{init_task_stack, StackType, TaskControl, CFG_TASK_STATUS};

    const FILL: StackType = 0xDEAD_BEEF;

    fn entry(_: *mut ()) -> ! {
        loop {
            std::hint::spin_loop();
        }
    }

    #[test]
    fn test_initial_image() {
        let cpu = SimCpu::new();
        let mut stack = [FILL; 32];
        let base = stack.as_mut_ptr();

        let top = unsafe { init_task_stack(&cpu, base, entry, 0xA1 as *mut ()) };
        assert_eq!(top, base);

        let reg = |r: Register| stack[FRAME_OFFSET + r.index()];
        assert_eq!(stack[0], 0);
        assert_eq!(reg(Register::R0), 0xA1);
        assert_eq!(reg(Register::Pc), entry as usize);
        assert_eq!(reg(Register::Ep), SimCpu::ENVIRONMENT);
        assert_eq!(reg(Register::Wp), base as usize);
        assert_eq!(reg(Register::Sr), CFG_TASK_STATUS);
        for n in 1..10 {
            assert_eq!(stack[FRAME_OFFSET + n], 0);
        }
    }

    #[test]
    fn test_words_past_image_untouched() {
        let cpu = SimCpu::new();
        let mut stack = [FILL; 32];

        unsafe { init_task_stack(&cpu, stack.as_mut_ptr(), entry, core::ptr::null_mut()) };

        assert!(stack[STACK_IMAGE_WORDS..].iter().all(|&w| w == FILL));
    }

    #[test]
    fn test_null_argument() {
        let cpu = SimCpu::new();
        let mut stack = [FILL; 16];

        unsafe { init_task_stack(&cpu, stack.as_mut_ptr(), entry, core::ptr::null_mut()) };

        assert_eq!(stack[FRAME_OFFSET + Register::R0.index()], 0);
    }

    #[test]
    fn test_control_block_locates_frame() {
        let cpu = SimCpu::new();
        let mut stack = [FILL; 16];
        let mut tcb = TaskControl::new();
        assert!(tcb.frame().is_none());

        let top = unsafe { init_task_stack(&cpu, stack.as_mut_ptr(), entry, 0x55 as *mut ()) };
        tcb.set_top_of_stack(top);

        let frame = tcb.frame().unwrap();
        assert_eq!(frame.as_ptr() as usize, unsafe { top.add(FRAME_OFFSET) } as usize);
        assert_eq!(unsafe { frame.as_ref() }.get(Register::R0), 0x55);
    }
}

#[cfg(test)]
mod critical_tests {
    use brisc_port::critical::{
        acquire_with, critical_section, enter_critical, exit_critical, release_with,
    };
    use brisc_port::os::cs_cell::MaskedCell;
    use brisc_port::port::sim::SimDevices;
    use brisc_port::CriticalSection;

    #[test]
    fn test_enter_exit() {
        let hw = SimDevices::new();
        let devices = hw.devices();
        exit_critical(&devices);
        assert!(devices.interrupts_enabled());

        enter_critical(&devices);
        assert!(!devices.interrupts_enabled());
        assert!(CriticalSection::is_active(&devices));

        exit_critical(&devices);
        assert!(devices.interrupts_enabled());
    }

    #[test]
    fn test_does_not_nest() {
        let hw = SimDevices::new();
        let devices = hw.devices();

        enter_critical(&devices);
        enter_critical(&devices);
        exit_critical(&devices);

        assert!(devices.interrupts_enabled());
    }

    #[test]
    fn test_guard_unmasks_on_drop() {
        let hw = SimDevices::new();
        let devices = hw.devices();

        {
            let _cs = CriticalSection::enter(&devices);
            assert!(!devices.interrupts_enabled());
        }
        assert!(devices.interrupts_enabled());
    }

    #[test]
    fn test_acquire_release_restores_state() {
        let hw = SimDevices::new();
        let devices = hw.devices();
        exit_critical(&devices);

        let outer = acquire_with(&devices);
        let inner = acquire_with(&devices);
        assert!(outer);
        assert!(!inner);

        release_with(&devices, inner);
        assert!(!devices.interrupts_enabled());

        release_with(&devices, outer);
        assert!(devices.interrupts_enabled());
    }

    #[test]
    fn test_masked_cell() {
        let hw = SimDevices::new();
        let devices = hw.devices();
        let cell = MaskedCell::new(3u32);

        let value = critical_section(&devices, |cs| {
            *cell.get(cs) += 4;
            cell.write(cs, cell.read(cs) * 2);
            cell.read(cs)
        });

        assert_eq!(value, 14);
        assert!(devices.interrupts_enabled());
    }
}

#[cfg(test)]
mod device_tests {
    use brisc_port::kernel::Port;
    use brisc_port::port::brisc::setup_preemption_timer;
    use brisc_port::port::sim::{SimCpu, SimDevices};
    use brisc_port::task::{CurrentTask, Kernel};
    use brisc_port::types::InterruptReason;
    use brisc_port::{Devices, Masked, PortFault};

    #[test]
    fn test_check_accepts_expected_types() {
        let hw = SimDevices::new();
        assert_eq!(hw.devices().check(), Ok(()));
    }

    #[test]
    fn test_check_rejects_wrong_types() {
        let hw = SimDevices::with_kinds(7, InterruptReason::Tmr0.as_u32());
        assert_eq!(hw.devices().check(), Err(PortFault::IcfgTypeMismatch));

        let hw = SimDevices::with_kinds(InterruptReason::Icfg.as_u32(), 7);
        assert_eq!(hw.devices().check(), Err(PortFault::TimerTypeMismatch));
    }

    #[test]
    fn test_program_timer() {
        let hw = SimDevices::new();
        let devices = hw.devices();

        devices.program_timer(1000).unwrap();

        assert!(devices.interrupts_enabled());
        assert_eq!(devices.enabled_sources(), 0xFFFF_FFFF);
        assert!(devices.source_enabled(InterruptReason::Tmr0));
        assert_eq!(devices.timer_count(), 0);
        assert_eq!(devices.timer_reload(), 999);
        assert_eq!(devices.timer_status(), 0x3);
        assert!(!devices.timer_expired());
    }

    #[test]
    fn test_interval_of_one() {
        let hw = SimDevices::new();
        let devices = hw.devices();

        devices.program_timer(1).unwrap();

        assert_eq!(devices.timer_reload(), 0);
    }

    #[test]
    fn test_program_timer_rejects_zero_interval() {
        let hw = SimDevices::new();
        let devices = hw.devices();

        assert_eq!(devices.program_timer(0), Err(PortFault::TimerIntervalInvalid));
        assert_eq!(devices.timer_status(), 0);
    }

    #[test]
    fn test_program_timer_checks_types_first() {
        let hw = SimDevices::with_kinds(InterruptReason::Icfg.as_u32(), 9);
        let devices = hw.devices();

        assert_eq!(devices.program_timer(10), Err(PortFault::TimerTypeMismatch));
        assert!(!devices.interrupts_enabled());
    }

    #[test]
    fn test_io_table_resolves_same_blocks() {
        let hw = SimDevices::new();
        let io = hw.io_table();
        let devices: Devices<'_> = unsafe { Devices::from_io_table(&io) };

        devices.program_timer(50).unwrap();

        assert_eq!(hw.devices().timer_reload(), 49);
        assert!(hw.devices().interrupts_enabled());
    }

    #[test]
    #[should_panic(expected = "interrupt configuration device type mismatch")]
    fn test_setup_fatal_on_wrong_type() {
        let hw = SimDevices::with_kinds(5, InterruptReason::Tmr0.as_u32());
        setup_preemption_timer(&hw.devices(), 100);
    }

    #[test]
    #[should_panic(expected = "at least one count")]
    fn test_setup_fatal_on_zero_interval() {
        let hw = SimDevices::new();
        setup_preemption_timer(&hw.devices(), 0);
    }

    struct Idle(CurrentTask);

    impl Kernel for Idle {
        fn current_task(&self) -> &CurrentTask {
            &self.0
        }

        fn select_next_task(&mut self, _masked: &Masked) {}
    }

    #[test]
    #[should_panic(expected = "at least one count")]
    fn test_start_with_zero_interval() {
        let hw = SimDevices::new();
        let mut port = Port::new(SimCpu::new(), Idle(CurrentTask::new()), hw.devices())
            .with_tick_interval(0);
        port.start_scheduler();
    }

    #[test]
    fn test_timer_expiry_and_acknowledge() {
        use brisc_port::critical::enter_critical;
        use brisc_port::port::sim::Board;

        let hw = SimDevices::new();
        let devices = hw.devices();
        let mut board = Board::new(&hw, Idle(CurrentTask::new()));
        devices.program_timer(3).unwrap();
        // Keep the expiry latched instead of delivered.
        enter_critical(&devices);

        board.tick();
        board.tick();
        assert!(!board.interrupt_pending());
        board.tick();
        assert!(board.interrupt_pending());
        assert_eq!(devices.timer_count(), 0);

        devices.acknowledge_timer();
        assert!(!board.interrupt_pending());
        assert_eq!(devices.timer_status(), 0x3);
    }
}

#[cfg(test)]
mod heap_tests {
    use brisc_port::port::sim::SimObjectMemory;
    use brisc_port::{allocate, release, ObjectHeap, CFG_OBJECT_ALIGN};
    use core::alloc::{GlobalAlloc, Layout};

    #[test]
    fn test_allocations_are_aligned_and_distinct() {
        let memory = SimObjectMemory::<256>::new();

        let a = allocate(&memory, 3);
        let b = allocate(&memory, 17);
        let c = allocate(&memory, 0);

        for p in [a, b, c] {
            assert!(!p.is_null());
            assert_eq!(p as usize % CFG_OBJECT_ALIGN, 0);
            assert!(memory.contains(p));
        }
        assert!(b as usize >= a as usize + 3);
        assert!(c as usize >= b as usize + 17);
    }

    #[test]
    fn test_release_leaves_contents() {
        let memory = SimObjectMemory::<64>::new();
        let p = allocate(&memory, 8);
        unsafe { p.write_bytes(0xAB, 8) };

        release(p);

        let bytes = unsafe { core::slice::from_raw_parts(p, 8) };
        assert!(bytes.iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_release_null_is_harmless() {
        release(core::ptr::null_mut());
    }

    #[test]
    fn test_exhaustion_returns_null() {
        let memory = SimObjectMemory::<32>::new();

        assert!(!allocate(&memory, 24).is_null());
        assert!(allocate(&memory, 16).is_null());
        assert!(allocate(&memory, usize::MAX).is_null());
    }

    #[test]
    fn test_failed_request_does_not_consume_memory() {
        let memory = SimObjectMemory::<64>::new();

        let first = allocate(&memory, 24);
        assert!(!first.is_null());
        let used = memory.used();

        assert!(allocate(&memory, usize::MAX - 23).is_null());
        assert!(allocate(&memory, 128).is_null());
        assert_eq!(memory.used(), used);

        let second = allocate(&memory, 8);
        assert!(!second.is_null());
        assert!(second as usize >= first as usize + 24);

        // The rest of the arena is still available.
        assert!(!allocate(&memory, 32).is_null());
    }

    #[test]
    fn test_global_alloc_over_object_memory() {
        let heap = ObjectHeap::new(SimObjectMemory::<512>::new());

        let small = Layout::from_size_align(24, 4).unwrap();
        let wide = Layout::from_size_align(32, 64).unwrap();

        let p = unsafe { heap.alloc(small) };
        let q = unsafe { heap.alloc(wide) };
        assert!(!p.is_null());
        assert!(!q.is_null());
        assert_eq!(q as usize % 64, 0);
        assert!(heap.memory().contains(q));

        let used = heap.memory().used();
        unsafe {
            heap.dealloc(p, small);
            heap.dealloc(q, wide);
        }
        assert_eq!(heap.memory().used(), used);
    }
}

#[cfg(test)]
mod error_tests {
    use brisc_port::error::FaultKind;
    use brisc_port::PortFault;

    #[test]
    fn test_codes() {
        assert_eq!(PortFault::IcfgTypeMismatch.code(), 1001);
        assert_eq!(PortFault::TimerIntervalInvalid.code(), 1003);
        assert_eq!(PortFault::NoCurrentTask.code(), 2001);
        assert_eq!(PortFault::InterruptUnknown.code(), 2006);
        assert_eq!(PortFault::SchedStopUnsupported.code(), 3001);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(PortFault::TimerTypeMismatch.kind(), FaultKind::Configuration);
        assert_eq!(PortFault::YieldIsr.kind(), FaultKind::Precondition);
        assert_eq!(PortFault::SchedRunning.kind(), FaultKind::Precondition);
        assert_eq!(PortFault::SchedStopUnsupported.kind(), FaultKind::Unsupported);
    }

    #[test]
    fn test_kind_matches_code_band() {
        let all = [
            PortFault::IcfgTypeMismatch,
            PortFault::TimerTypeMismatch,
            PortFault::TimerIntervalInvalid,
            PortFault::NoCurrentTask,
            PortFault::FrameInvalid,
            PortFault::YieldIsr,
            PortFault::SchedNotRunning,
            PortFault::SchedRunning,
            PortFault::InterruptUnknown,
            PortFault::SchedStopUnsupported,
        ];
        for fault in all {
            let band = match fault.kind() {
                FaultKind::Configuration => 1,
                FaultKind::Precondition => 2,
                FaultKind::Unsupported => 3,
            };
            assert_eq!(fault.code() / 1000, band, "{:?}", fault);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            format!("{}", PortFault::NoCurrentTask),
            "no current task (E2001)"
        );
        assert_eq!(
            format!("{}", PortFault::SchedStopUnsupported),
            "scheduler cannot be stopped (E3001)"
        );
    }
}

#[cfg(test)]
mod config_tests {
    use brisc_port::config::*;
    use brisc_port::types::{InterruptReason, Syscall};

    #[test]
    fn test_config_values() {
        assert!(CFG_TICK_INTERVAL >= 1);
        assert_eq!(CFG_TASK_STATUS, 0x40);
        assert!(CFG_OBJECT_ALIGN.is_power_of_two());
        assert_eq!(CFG_IO_TABLE[InterruptReason::Icfg.index()], CFG_ICFG_BASE);
        assert_eq!(CFG_IO_TABLE[InterruptReason::Tmr0.index()], CFG_TMR0_BASE);
    }

    #[test]
    fn test_reason_numbers() {
        assert_eq!(InterruptReason::COUNT, 2);
        assert_eq!(InterruptReason::from_u32(1), Some(InterruptReason::Tmr0));
        assert_eq!(InterruptReason::from_u32(2), None);
        assert_eq!(InterruptReason::Tmr0.enable_bit(), 0b10);
        assert_eq!(Syscall::TaskYield as u32, 0x10);
    }
}
