//! Module `reader`
//!
//! Length-capped line reading. A line longer than the cap is consumed up to
//! its terminator and discarded without being buffered, so a client cannot
//! make the server hold an arbitrarily long line in memory.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Bytes allowed past the cap for the `\r\n` terminator.
const TERMINATOR_ALLOWANCE: usize = 2;

/// Result of one capped line read.
#[derive(Debug, PartialEq)]
pub enum LineRead {
    /// The peer closed the stream before sending anything.
    Eof,
    /// A complete line, terminator included when one was sent.
    Line(String),
    /// A line longer than the cap; carries the number of bytes discarded.
    TooLong(usize),
}

/// Reads the next line, keeping at most `max_len` bytes of content.
///
/// An unterminated final line before EOF is returned as a line. Content that
/// is not valid UTF-8 yields an `InvalidData` error.
pub async fn read_capped_line<R>(reader: &mut R, max_len: usize) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let cap = max_len.saturating_add(TERMINATOR_ALLOWANCE);
    let mut line = Vec::new();
    let mut discarded = 0usize;

    loop {
        let (used, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                break;
            }
            let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..=i], true),
                None => (available, false),
            };

            if discarded > 0 {
                discarded += chunk.len();
            } else if line.len() + chunk.len() > cap {
                discarded = line.len() + chunk.len();
                line = Vec::new();
            } else {
                line.extend_from_slice(chunk);
            }
            (chunk.len(), done)
        };
        reader.consume(used);

        if done {
            break;
        }
    }

    if discarded > 0 {
        return Ok(LineRead::TooLong(discarded));
    }
    if line.is_empty() {
        return Ok(LineRead::Eof);
    }

    String::from_utf8(line)
        .map(LineRead::Line)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
