use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::encode::sink::CommandSink;
use crate::foundation::error::{SegError, SegResult};

pub const DEFAULT_PROMPT: &str = "> ";
const DEFAULT_ATTEMPTS: usize = 3;
/// Bytes read while looking for the prompt before giving up on the current attempt.
const SCAN_LIMIT: usize = 4096;
pub const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(1);
/// Sleep between reads while a non-blocking port has nothing to offer.
const IDLE_POLL: Duration = Duration::from_millis(5);

/// Open a serial device for [`SerialSink`].
///
/// The descriptor is switched to non-blocking mode, and a tty is put in raw mode so a prompt
/// without a line ending is delivered at all.
pub fn open_port(path: &Path) -> SegResult<File> {
    let port = File::options().read(true).write(true).open(path)?;
    #[cfg(unix)]
    {
        use rustix::fs::{OFlags, fcntl_getfl, fcntl_setfl};
        use rustix::termios::{self, OptionalActions};

        if termios::isatty(&port) {
            let mut attrs = termios::tcgetattr(&port).map_err(std::io::Error::from)?;
            attrs.make_raw();
            termios::tcsetattr(&port, OptionalActions::Now, &attrs)
                .map_err(std::io::Error::from)?;
        }
        let flags = fcntl_getfl(&port).map_err(std::io::Error::from)?;
        fcntl_setfl(&port, flags | OFlags::NONBLOCK).map_err(std::io::Error::from)?;
    }
    debug!(device = %path.display(), "serial device opened");
    Ok(port)
}

/// Line-oriented control-board protocol: wait for the prompt, then `print:<cmd>\r\n`.
///
/// When the prompt does not show up the sink sends a bare line ending to make the board
/// print it again, a bounded number of times. Each attempt waits at most the prompt timeout,
/// which needs a port that reports `WouldBlock` or `TimedOut` (see [`open_port`]).
pub struct SerialSink<T> {
    port: T,
    prompt: Vec<u8>,
    attempts: usize,
    timeout: Duration,
}

impl<T: Read + Write + Send> SerialSink<T> {
    pub fn new(port: T) -> Self {
        Self {
            port,
            prompt: DEFAULT_PROMPT.as_bytes().to_vec(),
            attempts: DEFAULT_ATTEMPTS,
            timeout: DEFAULT_PROMPT_TIMEOUT,
        }
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.prompt = prompt.as_bytes().to_vec();
        self
    }

    /// Resynchronization attempts per command.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// How long one attempt waits for the prompt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn into_inner(self) -> T {
        self.port
    }

    /// Read until the prompt arrives. `false` when the port ran dry or timed out first.
    fn wait_prompt(&mut self) -> SegResult<bool> {
        let mut seen: Vec<u8> = Vec::with_capacity(self.prompt.len() * 2);
        let mut byte = [0u8; 1];
        let deadline = Instant::now() + self.timeout;
        while seen.len() < SCAN_LIMIT {
            match self.port.read(&mut byte) {
                Ok(0) => return Ok(false),
                Ok(_) => {
                    seen.push(byte[0]);
                    if seen.ends_with(&self.prompt) {
                        return Ok(true);
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Ok(false);
                    }
                    thread::sleep(IDLE_POLL);
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(false),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(false)
    }
}

impl<T: Read + Write + Send> CommandSink for SerialSink<T> {
    fn send(&mut self, cmd: &str) -> SegResult<()> {
        for attempt in 0..=self.attempts {
            if self.wait_prompt()? {
                write!(self.port, "print:{cmd}\r\n")?;
                self.port.flush()?;
                debug!(cmd, "sent to control board");
                return Ok(());
            }
            if attempt < self.attempts {
                warn!(attempt = attempt + 1, "control board prompt lost, resynchronizing");
                self.port.write_all(b"\r\n")?;
                self.port.flush()?;
            }
        }
        Err(SegError::sink(format!(
            "control board did not show its prompt after {} attempts",
            self.attempts + 1
        )))
    }
}
