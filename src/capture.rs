//! Run-wide capture of the standard output and standard error channels.
//!
//! The process-wide channel pair is modeled as a crate-global slot. Test
//! bodies obtain their output channels through [`stdout`] and [`stderr`];
//! while a capture is active those writers append to in-memory buffers, and
//! otherwise they pass through to the real process channels. Restoration is
//! tied to the [`OutputCapture`] guard's `Drop`, so it happens on every exit
//! path, including a panic inside the captured run.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static ACTIVE: Mutex<Option<Channels>> = Mutex::new(None);

/// A capture must survive a panicked test run, so a poisoned slot is usable.
fn active() -> MutexGuard<'static, Option<Channels>> {
    ACTIVE.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Channels {
    out: Buffer,
    err: Buffer,
}

/// The text captured from both channels over one run.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Guard over an active capture of the standard output/error channels.
///
/// Created by [`OutputCapture::begin`]; the previous channels are retained
/// and restored when the guard is dropped or explicitly ended.
#[derive(Debug)]
pub struct OutputCapture {
    channels: Channels,
    previous: Option<Channels>,
    restored: bool,
}

impl OutputCapture {
    /// Swaps the process-wide channels for fresh in-memory buffers.
    pub fn begin() -> Self {
        let channels = Channels::default();
        let previous = active().replace(channels.clone());
        OutputCapture {
            channels,
            previous,
            restored: false,
        }
    }

    /// Snapshot of everything captured so far.
    pub fn contents(&self) -> CapturedOutput {
        CapturedOutput {
            stdout: self.channels.out.contents(),
            stderr: self.channels.err.contents(),
        }
    }

    /// Restores the previous channels and returns the captured output.
    pub fn end(mut self) -> CapturedOutput {
        let captured = self.contents();
        self.restore();
        captured
    }

    fn restore(&mut self) {
        if !self.restored {
            *active() = self.previous.take();
            self.restored = true;
        }
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        self.restore();
    }
}

enum Sink {
    Buffer(Buffer),
    Stdout,
    Stderr,
}

/// Writer handed to test bodies in place of a raw standard channel.
pub struct OutputStream(Sink);

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.0 {
            Sink::Buffer(buffer) => buffer.write(buf),
            Sink::Stdout => io::stdout().write(buf),
            Sink::Stderr => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.0 {
            Sink::Buffer(buffer) => buffer.flush(),
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
        }
    }
}

/// The standard output channel as currently routed: the active capture
/// buffer, or the real process stdout when no capture is active.
pub fn stdout() -> OutputStream {
    match active().as_ref() {
        Some(channels) => OutputStream(Sink::Buffer(channels.out.clone())),
        None => OutputStream(Sink::Stdout),
    }
}

/// The standard error channel as currently routed.
pub fn stderr() -> OutputStream {
    match active().as_ref() {
        Some(channels) => OutputStream(Sink::Buffer(channels.err.clone())),
        None => OutputStream(Sink::Stderr),
    }
}

#[cfg(test)]
fn is_active() -> bool {
    active().is_some()
}

/// Capture routes through a process-global slot, so tests that touch it
/// serialize on this lock to keep `cargo test`'s parallel threads apart.
#[cfg(test)]
pub(crate) fn serial_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_capture_collects_writes() {
        let _guard = serial_lock();

        let capture = OutputCapture::begin();
        write!(stdout(), "hello").unwrap();
        write!(stderr(), "oops").unwrap();

        let captured = capture.end();
        assert_eq!(captured.stdout, "hello");
        assert_eq!(captured.stderr, "oops");
        assert!(!is_active());
    }

    #[test]
    fn test_end_restores_previous_channels() {
        let _guard = serial_lock();

        let outer = OutputCapture::begin();
        {
            let inner = OutputCapture::begin();
            write!(stdout(), "inner").unwrap();
            assert_eq!(inner.end().stdout, "inner");
        }

        // The outer capture is active again after the inner one ends.
        write!(stdout(), "outer").unwrap();
        assert_eq!(outer.end().stdout, "outer");
        assert!(!is_active());
    }

    #[test]
    fn test_drop_restores_on_panic() {
        let _guard = serial_lock();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _capture = OutputCapture::begin();
            panic!("captured run blew up");
        }));

        assert!(result.is_err());
        assert!(!is_active());
    }

    #[test]
    fn test_contents_is_a_snapshot() {
        let _guard = serial_lock();

        let capture = OutputCapture::begin();
        write!(stdout(), "first").unwrap();
        let snapshot = capture.contents();
        write!(stdout(), " second").unwrap();

        assert_eq!(snapshot.stdout, "first");
        assert_eq!(capture.end().stdout, "first second");
    }
}
