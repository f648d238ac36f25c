//! Time and timer primitives
//!
//! The simulator never reads the wall clock. Time is a virtual millisecond
//! counter advanced by the caller, and periodic work is registered with a
//! [`scheduler::Scheduler`] keyed to that counter.

pub mod scheduler;
pub mod time;
