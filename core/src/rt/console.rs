//! Console sink: the runtime's only outward surface.
//!
//! Reporting primitives emit ordered `(text, line_complete)` fragments and
//! nothing else. Hosts bring their own sink; the defaults route to tracing
//! or collect lines in memory.

use std::sync::{Arc, Mutex};

use tracing::info;

pub trait ConsoleSink {
    fn emit(&mut self, text: &str, line_complete: bool);
}

/// Routes completed lines to `tracing` under the `console` target.
#[derive(Debug, Default)]
pub struct LogConsole {
    partial: String,
}

impl ConsoleSink for LogConsole {
    fn emit(&mut self, text: &str, line_complete: bool) {
        self.partial.push_str(text);
        if line_complete {
            info!(target: "console", "{}", self.partial);
            self.partial.clear();
        }
    }
}

#[derive(Debug, Default)]
struct BufferInner {
    lines: Vec<String>,
    partial: String,
}

/// Collects completed lines behind a shared handle, so a host (or a test)
/// can keep a clone and read back what the runtime printed.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
    inner: Arc<Mutex<BufferInner>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.inner.lock().unwrap().lines.clone()
    }
}

impl ConsoleSink for BufferConsole {
    fn emit(&mut self, text: &str, line_complete: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.partial.push_str(text);
        if line_complete {
            let line = std::mem::take(&mut inner.partial);
            inner.lines.push(line);
        }
    }
}
