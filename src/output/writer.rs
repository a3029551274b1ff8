//! JSON lines message writer

use crate::engine::{Message, MessageSink};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Writes each message as one JSON line and flushes it
pub struct MessageWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> MessageWriter<W> {
    /// Wrap an output
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Messages written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> MessageSink for MessageWriter<W> {
    fn emit(&mut self, message: Message) -> Result<()> {
        write_json_line(&mut self.out, &message)?;
        self.written += 1;
        self.out.flush()?;
        Ok(())
    }
}

/// Serialize a value on a single line followed by `\n`
pub fn write_json_line<W: Write + ?Sized, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    out.write_all(b"\n")?;
    Ok(())
}
