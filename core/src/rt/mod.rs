pub mod builtins;
pub mod console;
pub mod runtime;

#[cfg(test)]
mod runtime_test;

pub use console::{BufferConsole, ConsoleSink, LogConsole};
pub use runtime::{CallFrame, CallKind, Runtime};
