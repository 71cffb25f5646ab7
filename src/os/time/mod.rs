//! Timer interrupt service
//!
//! TMR0 wraps every tick interval and latches its expiry flag. The service
//! acknowledges it, lets the kernel account for the tick, and preempts the
//! running task.

use crate::critical::Masked;
use crate::kernel::Port;
use crate::port::Machine;
use crate::task::Kernel;

impl<M: Machine, K: Kernel> Port<'_, M, K> {
    /// Service a TMR0 interrupt
    ///
    /// Runs in trap context.
    pub(crate) fn timer_interrupt(&mut self, masked: &Masked) {
        self.devices.acknowledge_timer();

        let tick = self.flags.tick_increment();
        crate::trace!("tick {}", tick);

        self.kernel.tick(masked);
        self.switch(masked);
    }
}
