//! Host simulator for the BRISC port
//!
//! There is no Rust target for BRISC, so the port is exercised on the host
//! against a simulated register file and RAM-backed device blocks. A context
//! switch becomes a coroutine handoff: the register file is swapped and the
//! caller carries on as whichever task now owns it.

mod board;
mod cpu;
mod hw;

pub use board::Board;
pub use cpu::SimCpu;
pub use hw::{SimDevices, SimObjectMemory};
