//! Output utilities for shell commands with BrokenPipe handling.
//!
//! When the shell's stdout is piped into something like `head` that exits
//! early, printing stops quietly instead of failing the command.

/// Print with newline, handling BrokenPipe gracefully.
///
/// Returns `Ok(())` from the enclosing function on BrokenPipe.
/// Propagates other IO errors.
macro_rules! print_line {
    ($($arg:tt)*) => {{
        use std::io::Write;
        match writeln!(std::io::stdout(), $($arg)*) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }};
}

/// Write raw bytes, handling BrokenPipe gracefully.
macro_rules! print_bytes {
    ($bytes:expr) => {{
        use std::io::Write;
        let mut stdout = std::io::stdout();
        match stdout.write_all($bytes).and_then(|()| stdout.flush()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }};
}

pub(crate) use print_bytes;
pub(crate) use print_line;
