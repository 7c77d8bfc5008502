use std::io;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, writing to the browser console.
///
/// Calling this twice is harmless; the second call is ignored.
pub(crate) fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ConsoleWriter)
        .with_ansi(false)
        // No wall clock behind `SystemTime` on wasm32-unknown-unknown.
        .without_time()
        .with_target(false)
        .try_init();

    if let Err(e) = result {
        web_sys::console::warn_1(&format!("logger already installed: {e}").into());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConsoleLevel {
    Log,
    Warn,
    Error,
}

impl ConsoleLevel {
    fn for_line(line: &str) -> Self {
        let head = line.trim_start();
        if head.starts_with("ERROR") {
            Self::Error
        } else if head.starts_with("WARN") {
            Self::Warn
        } else {
            Self::Log
        }
    }
}

#[derive(Clone, Copy, Default)]
struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::default()
    }
}

/// Buffers one formatted event and hands it to the console on drop.
#[derive(Default)]
struct ConsoleLine {
    buf: Vec<u8>,
}

impl io::Write for ConsoleLine {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();
        let msg = wasm_bindgen::JsValue::from_str(line);
        match ConsoleLevel::for_line(line) {
            ConsoleLevel::Error => web_sys::console::error_1(&msg),
            ConsoleLevel::Warn => web_sys::console::warn_1(&msg),
            ConsoleLevel::Log => web_sys::console::log_1(&msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level_from_formatted_line() {
        assert_eq!(ConsoleLevel::for_line("ERROR create failed"), ConsoleLevel::Error);
        assert_eq!(ConsoleLevel::for_line(" WARN stream cancelled"), ConsoleLevel::Warn);
        assert_eq!(ConsoleLevel::for_line(" INFO subscribed"), ConsoleLevel::Log);
        assert_eq!(ConsoleLevel::for_line("DEBUG snapshot"), ConsoleLevel::Log);
    }
}
