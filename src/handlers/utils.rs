//! Shared line and block IO for the command handlers.

use crate::prelude::*;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Write a single response line.
pub async fn write_simple<W: AsyncWrite + Unpin>(writer: &mut W, response: &str) -> Result<()> {
    writer.write_all(response.as_bytes()).await?;
    Ok(())
}

/// Send a post body with dot-stuffing applied.
pub async fn send_body<W: AsyncWrite + Unpin>(writer: &mut W, body: &str) -> Result<()> {
    for line in body.lines() {
        let stuffed = if line.starts_with('.') {
            format!(".{line}\r\n")
        } else {
            format!("{line}\r\n")
        };
        writer.write_all(stuffed.as_bytes()).await?;
    }
    Ok(())
}

/// Read a dot-terminated block from the reader, undoing dot-stuffing.
pub async fn read_block<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut block = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(anyhow::anyhow!("connection closed mid-block"));
        }
        if line == ".\r\n" || line == ".\n" {
            break;
        }
        if line.starts_with("..") {
            block.push_str(&line[1..]);
        } else {
            block.push_str(&line);
        }
    }
    Ok(block)
}
