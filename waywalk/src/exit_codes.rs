//! Stable exit codes for waywalk CLI commands.

/// Command succeeded or the walk completed.
pub const OK: i32 = 0;
/// Invalid workspace, definitions, arguments or other I/O errors.
pub const INVALID: i32 = 1;
/// A walk stopped on a fatal error.
pub const FAILED: i32 = 2;
/// `waywalk run` found the cursor not marked running.
pub const IDLE: i32 = 3;
