//! Deterministic, pure logic shared by the interpreter.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! definitions and the scratch store and return deterministic outputs suitable
//! for tests.

pub mod defs;
pub mod error;
pub mod ids;
pub mod invariants;
pub mod model;
pub mod pockets;
pub mod spot;
pub mod tack;
