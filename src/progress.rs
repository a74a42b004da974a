//! Shared progress and logging helpers to keep progress bars pinned.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

pub fn add_progress_bar(len: u64) -> ProgressBar {
    multi_progress().add(ProgressBar::new(len))
}

/// Emit one log line above the progress bars. A hidden draw target (stderr
/// is not a terminal) would drop the line, so it goes to stderr directly.
fn emit_line(line: &str) {
    let mp = multi_progress();
    if mp.is_hidden() {
        let _ = writeln!(io::stderr(), "{}", line);
    } else {
        let _ = mp.println(line);
    }
}

/// `MakeWriter` for the tracing fmt layer that routes through `emit_line`
#[derive(Default, Clone)]
pub struct LogWriterFactory;

pub struct LogWriter {
    buffer: String,
    emit: fn(&str),
}

impl LogWriter {
    fn new() -> Self {
        Self::with_sink(emit_line)
    }

    fn with_sink(emit: fn(&str)) -> Self {
        Self {
            buffer: String::new(),
            emit,
        }
    }

    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        (self.emit)(self.buffer.trim_end_matches('\n').trim_end_matches('\r'));
        self.buffer.clear();
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.push_str(&String::from_utf8_lossy(buf));

        while let Some(idx) = self.buffer.find('\n') {
            (self.emit)(self.buffer[..idx].trim_end_matches('\r'));
            self.buffer.drain(..idx + 1);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer();
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    fn capture(line: &str) {
        CAPTURED.with(|lines| lines.borrow_mut().push(line.to_string()));
    }

    fn captured() -> Vec<String> {
        CAPTURED.with(|lines| lines.borrow().clone())
    }

    #[test]
    fn test_writer_splits_lines_and_keeps_partial_tail() {
        let mut writer = LogWriter::with_sink(capture);
        writer.write_all(b"first line\nsecond ").unwrap();
        assert_eq!(writer.buffer, "second ");
        assert_eq!(captured(), vec!["first line"]);

        writer.write_all(b"half\r\n").unwrap();
        assert!(writer.buffer.is_empty());

        writer.write_all(b"tail").unwrap();
        writer.flush().unwrap();
        assert!(writer.buffer.is_empty());
        assert_eq!(captured(), vec!["first line", "second half", "tail"]);
    }

    #[test]
    fn test_drop_flushes_partial_line() {
        {
            let mut writer = LogWriter::with_sink(capture);
            writer.write_all(b"unterminated").unwrap();
        }
        assert_eq!(captured(), vec!["unterminated"]);
    }
}
