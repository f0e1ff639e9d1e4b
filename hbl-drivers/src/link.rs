//! UART-backed controller link
//!
//! [`SerialCommandLink`] puts commands on the wire with the controller's
//! carriage-return terminator. [`SerialReplyReader`] assembles the
//! controller's output into lines and parses them as replies.

use hbl_core::traits::CommandLink;
use hbl_hal::{UartConfig, UartRx, UartTx};
use hbl_protocol::{LineAssembler, Reply, ReplyError, TERMINATOR};

/// Bytes pulled from the receiver per read call
const READ_CHUNK: usize = 32;

/// Command link writing to a UART transmitter
#[derive(Debug)]
pub struct SerialCommandLink<T> {
    tx: T,
}

impl<T: UartTx> SerialCommandLink<T> {
    pub fn new(tx: T) -> Self {
        Self { tx }
    }

    /// Port settings the controller expects out of the box
    pub fn port_config() -> UartConfig {
        UartConfig::default()
    }

    pub fn into_inner(self) -> T {
        self.tx
    }
}

impl<T: UartTx> CommandLink for SerialCommandLink<T> {
    type Error = T::Error;

    fn transmit(&mut self, command: &str) -> Result<(), Self::Error> {
        let mut terminator = [0u8; 1];
        self.tx.write(command.as_bytes())?;
        self.tx.write(TERMINATOR.encode_utf8(&mut terminator).as_bytes())
    }
}

/// Reply reader on a UART receiver
#[derive(Debug)]
pub struct SerialReplyReader<R> {
    rx: R,
    assembler: LineAssembler,
}

impl<R: UartRx> SerialReplyReader<R> {
    pub fn new(rx: R) -> Self {
        Self {
            rx,
            assembler: LineAssembler::new(),
        }
    }

    /// Drain the receiver and hand every completed line to `on_line`
    ///
    /// Lines the assembler had to abandon (overlong or non-ASCII) are
    /// reported as [`ReplyError::Malformed`] so the caller still sees
    /// the traffic. Returns the number of lines reported.
    pub fn poll<F>(&mut self, mut on_line: F) -> Result<usize, R::Error>
    where
        F: FnMut(Result<Reply, ReplyError>),
    {
        let mut chunk = [0u8; READ_CHUNK];
        let mut lines = 0;

        loop {
            let count = self.rx.read(&mut chunk)?;
            for &byte in &chunk[..count] {
                match self.assembler.feed(byte) {
                    Ok(Some(line)) => {
                        lines += 1;
                        on_line(Reply::parse(&line));
                    }
                    Ok(None) => {}
                    Err(_) => {
                        lines += 1;
                        on_line(Err(ReplyError::Malformed));
                    }
                }
            }
            if count < chunk.len() {
                return Ok(lines);
            }
        }
    }

    /// Drop a partially received line, e.g. after reopening the port
    pub fn reset(&mut self) {
        self.assembler.reset();
    }
}
