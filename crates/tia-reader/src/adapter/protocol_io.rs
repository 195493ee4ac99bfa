//! MCP stdio framing IO.
//! - read_message: next non-empty line
//! - write_message: emit one line
//! - write_protocol_log: optional transcript logging

use std::io::{self, BufRead, BufWriter, Write};
use std::sync::Arc;

use parking_lot::Mutex;

pub(super) fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader.read_line(&mut line)?;
        if bytes == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if !trimmed.trim().is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}

pub(super) fn write_message<W: Write>(writer: &mut W, payload: &str) -> io::Result<()> {
    if payload.contains('\n') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "payload contains a newline",
        ));
    }
    writer.write_all(payload.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

pub(super) fn write_protocol_log(
    logger: &Arc<Mutex<BufWriter<std::fs::File>>>,
    direction: &str,
    payload: &str,
) -> io::Result<()> {
    let mut logger = logger.lock();
    writeln!(logger, "{direction} {payload}")?;
    logger.flush()
}
