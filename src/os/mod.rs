//! Architecture-independent half of the port
//!
//! Contains the port instance, the context switch engine, the timer service
//! and the hooks the kernel core implements.

pub mod config;
pub mod critical;
pub mod cs_cell;
pub mod error;
pub mod kernel;
pub mod types;
pub mod task;
pub mod sched;
pub mod time;
