//! PTY Streams
//!
//! Bridges the blocking PTY master to a session: a reader thread forwards
//! output chunks over a channel, and input is written straight to the master.

use std::io::{self, Read, Write};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Outcome of a single read from the output channel
#[derive(Debug, PartialEq, Eq)]
pub enum StreamRead {
    /// A chunk of output
    Data(Vec<u8>),
    /// Nothing arrived before the timeout
    Empty,
    /// The reader reached end-of-stream
    Closed,
}

/// PTY I/O streams wrapper
pub struct PtyStreams {
    /// Receiver for output bytes from the PTY (stdout/stderr combined)
    output_rx: Receiver<Vec<u8>>,
    /// Writer for input bytes to the PTY (stdin)
    writer: Box<dyn Write + Send>,
}

impl PtyStreams {
    /// Create new PTY streams from an output channel and an input writer
    pub fn from_parts(output_rx: Receiver<Vec<u8>>, writer: Box<dyn Write + Send>) -> Self {
        Self { output_rx, writer }
    }

    /// Start a reader thread over `reader` and wrap it together with `writer`
    pub fn spawn(
        name: String,
        mut reader: Box<dyn Read + Send>,
        writer: Box<dyn Write + Send>,
    ) -> io::Result<Self> {
        let (tx, rx) = channel::<Vec<u8>>();

        thread::Builder::new().name(name).spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        debug!("PTY read EOF - process terminated");
                        break;
                    }
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            debug!("PTY read: receiver dropped, stopping reader thread");
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        // Linux reports EIO on the master once every slave fd is closed
                        debug!("PTY read ended ({}): {}", e.kind(), e);
                        break;
                    }
                }
            }
            debug!("PTY reader thread exiting");
        })?;

        Ok(Self::from_parts(rx, writer))
    }

    /// Write a line of input followed by `\n`
    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    /// Wait up to `timeout` for the next chunk of output
    pub fn read_with_timeout(&mut self, timeout: Duration) -> StreamRead {
        match self.output_rx.recv_timeout(timeout) {
            Ok(bytes) => StreamRead::Data(bytes),
            Err(RecvTimeoutError::Timeout) => StreamRead::Empty,
            Err(RecvTimeoutError::Disconnected) => StreamRead::Closed,
        }
    }

    /// Block until the next chunk of output or end-of-stream
    pub fn read_blocking(&mut self) -> StreamRead {
        match self.output_rx.recv() {
            Ok(bytes) => StreamRead::Data(bytes),
            Err(_) => StreamRead::Closed,
        }
    }
}
