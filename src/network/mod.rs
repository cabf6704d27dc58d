//! Line-oriented socket helpers shared by the auth gate and sessions.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Longest accepted input line in bytes, not counting the `\n`.
pub const MAX_LINE: usize = 4096;

/// Write half shared by a connection's writer task and its reader (which
/// only uses it for the empty-line prompt).
pub type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Read one input line. `\n` and `\r\n` endings are stripped; `Ok(None)`
/// means the peer closed the connection. Invalid UTF-8 and lines longer
/// than [`MAX_LINE`] are errors.
pub async fn read_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(MAX_LINE as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "line too long"));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write `text` verbatim and flush.
pub async fn write_text<W>(writer: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(text.as_bytes()).await?;
    writer.flush().await
}

/// Tokenise a command line on ASCII whitespace.
pub fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}
