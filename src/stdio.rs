//! Line-delimited stdio transport
//!
//! One JSON message per line. Requests are handled strictly one after the
//! other; a bad line is logged and skipped.

use {
    super::logging::{log_parse_error, log_response_sent},
    super::shared::McpProtocolEngine,
    std::io,
    tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    tracing::info,
};

/// Serve the protocol over any line reader / writer pair until EOF.
///
/// At most `max_message_size + 1` bytes of a line are buffered; longer lines
/// are drained from the reader and skipped.
pub async fn serve_lines<R, W>(engine: &McpProtocolEngine, mut reader: R, mut writer: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let limit = engine.max_message_size();
    let read_cap = (limit as u64).saturating_add(1);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if (&mut reader).take(read_cap).read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if buf.len() > limit && !buf.ends_with(b"\n") {
            discard_line(&mut reader).await?;
            log_parse_error(&format!("line exceeds {limit} bytes"), "<discarded>");
            continue;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                log_parse_error(&e.to_string(), "<invalid utf-8>");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match engine.handle_text(line).await {
            Ok(Some(response)) => {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                log_response_sent(response.len());
            }
            Ok(None) => {}
            Err(e) => log_parse_error(&e.to_string(), line),
        }
    }
    Ok(())
}

// Consume the remainder of an overlong line without buffering it.
async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|b| *b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

/// Serve the protocol on the process's standard input and output.
pub async fn serve_stdio(engine: &McpProtocolEngine) -> io::Result<()> {
    info!("Serving MCP over stdio");
    serve_lines(engine, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("stdin closed, stopping");
    Ok(())
}
