//! Fault taxonomy for the port layer
//!
//! Nothing in the port is recoverable: a fault either means the board was
//! configured wrongly, the kernel core broke a precondition, or an
//! unsupported operation was requested. Internal checks return
//! [`PortResult`]; the public surface turns any fault into [`fatal`].

use core::fmt;

/// Port fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum PortFault {
    // ============ Configuration errors ============
    /// Interrupt configuration block reports the wrong device type
    IcfgTypeMismatch = 1001,
    /// Timer block reports the wrong device type
    TimerTypeMismatch = 1002,
    /// Preemption interval of zero counts
    TimerIntervalInvalid = 1003,

    // ============ Precondition violations ============
    /// No task is marked current
    NoCurrentTask = 2001,
    /// Current task has no stack
    FrameInvalid = 2002,
    /// Yield requested from trap context
    YieldIsr = 2003,
    /// Yield or tick before the scheduler started
    SchedNotRunning = 2004,
    /// Scheduler started twice
    SchedRunning = 2005,
    /// Trap for an interrupt source the port does not service
    InterruptUnknown = 2006,

    // ============ Unsupported operations ============
    /// The scheduler cannot be stopped on this target
    SchedStopUnsupported = 3001,
}

/// Fault category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Board or device misconfiguration
    Configuration,
    /// Caller broke a documented precondition
    Precondition,
    /// Operation not supported by this port
    Unsupported,
}

/// Result type alias for port checks
pub type PortResult<T> = Result<T, PortFault>;

impl PortFault {
    /// Numeric fault code
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Which class of fault this is
    pub fn kind(self) -> FaultKind {
        use PortFault::*;
        match self {
            IcfgTypeMismatch | TimerTypeMismatch | TimerIntervalInvalid => {
                FaultKind::Configuration
            }
            NoCurrentTask | FrameInvalid | YieldIsr | SchedNotRunning | SchedRunning
            | InterruptUnknown => FaultKind::Precondition,
            SchedStopUnsupported => FaultKind::Unsupported,
        }
    }
}

impl fmt::Display for PortFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PortFault::IcfgTypeMismatch => "interrupt configuration device type mismatch",
            PortFault::TimerTypeMismatch => "timer device type mismatch",
            PortFault::TimerIntervalInvalid => "preemption interval must be at least one count",
            PortFault::NoCurrentTask => "no current task",
            PortFault::FrameInvalid => "current task has no register frame",
            PortFault::YieldIsr => "yield from trap context",
            PortFault::SchedNotRunning => "scheduler not running",
            PortFault::SchedRunning => "scheduler already running",
            PortFault::InterruptUnknown => "unexpected interrupt source",
            PortFault::SchedStopUnsupported => "scheduler cannot be stopped",
        };
        write!(f, "{} (E{})", msg, self.code())
    }
}

/// Halt on an unrecoverable fault
///
/// Logs the fault and panics; the bare-metal panic handler stops the core.
#[cold]
#[inline(never)]
pub fn fatal(fault: PortFault) -> ! {
    crate::error!("fatal port fault E{}", fault.code());
    panic!("{}", fault)
}
