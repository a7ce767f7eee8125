//! MCP stdio transport layer
//!
//! Newline-delimited JSON over stdin/stdout. Each request is handled on its
//! own task; a single writer task serializes responses back onto the stream.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, error_codes};
use crate::mcp::server::{Dispatch, McpServer};
use crate::{Error, Result};

/// Read the next non-empty line. Returns `None` at EOF.
pub async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>> {
    loop {
        let mut line = String::new();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| Error::Transport(format!("Failed to read MCP message: {}", e)))?;

        if bytes_read == 0 {
            return Ok(None);
        }

        let line = line.trim();
        if !line.is_empty() {
            return Ok(Some(line.to_string()));
        }
    }
}

/// Parse one line into a request, or the parse-error response to send back.
pub fn parse_message(line: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    serde_json::from_str(line).map_err(|e| {
        JsonRpcResponse::error(
            None,
            error_codes::PARSE_ERROR,
            format!("Parse error: {}", e),
        )
    })
}

/// Write a JSON-RPC response followed by a newline
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut json = serde_json::to_vec(response)?;
    json.push(b'\n');

    writer
        .write_all(&json)
        .await
        .map_err(|e| Error::Transport(format!("Failed to write MCP response: {}", e)))?;

    writer
        .flush()
        .await
        .map_err(|e| Error::Transport(format!("Failed to flush MCP response: {}", e)))?;

    Ok(())
}

/// Serve MCP over the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: Arc<McpServer>) -> Result<()> {
    serve_lines(
        server,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Serve MCP over any line-oriented reader/writer pair.
///
/// Returns once the reader hits EOF and every in-flight request has been
/// answered.
pub async fn serve_lines<R, W>(server: Arc<McpServer>, mut reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

    let writer_task = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            write_message(&mut writer, &response).await?;
        }
        Ok::<(), Error>(())
    });

    while let Some(line) = read_message(&mut reader).await? {
        let request = match parse_message(&line) {
            Ok(request) => request,
            Err(response) => {
                warn!("Discarding unparseable MCP message");
                let _ = tx.send(response);
                continue;
            }
        };

        let server = Arc::clone(&server);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = match server.dispatch(request).await {
                Dispatch::Reply(response) => response,
                Dispatch::Accepted => return,
                Dispatch::Crashed { id } => JsonRpcResponse::internal_error(id),
            };
            // The receiver only goes away if the writer already failed
            let _ = tx.send(response);
        });
    }

    debug!("MCP stdin closed, draining responses");
    drop(tx);

    writer_task
        .await
        .map_err(|e| Error::Transport(format!("MCP writer task failed: {}", e)))?
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_read_message() {
        let input = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#.to_string() + "\n";
        let mut reader = Cursor::new(input.into_bytes());
        let line = read_message(&mut reader).await.unwrap().unwrap();
        let req = parse_message(&line).unwrap();
        assert_eq!(req.method, "tools/list");
    }

    #[tokio::test]
    async fn test_read_message_skips_blank_lines() {
        let mut reader = Cursor::new(b"\n\n  \n{\"a\":1}\n".to_vec());
        let line = read_message(&mut reader).await.unwrap();
        assert_eq!(line.as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_read_message_eof() {
        let mut reader = Cursor::new(Vec::new());
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let response = parse_message("not json").unwrap_err();
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_write_message() {
        let response = JsonRpcResponse::success(Some(1.into()), serde_json::json!({}));
        let mut output = Vec::new();
        write_message(&mut output, &response).await.unwrap();
        let written = String::from_utf8(output).unwrap();
        assert!(written.contains("\"jsonrpc\":\"2.0\""));
        assert!(written.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_serve_lines_answers_requests_only() {
        let server = Arc::new(McpServer::new("test", "1.0.0"));
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        );
        let (writer, mut output) = tokio::io::duplex(64 * 1024);

        serve_lines(server, Cursor::new(input.as_bytes().to_vec()), writer)
            .await
            .unwrap();

        let mut written = String::new();
        output.read_to_string(&mut written).await.unwrap();
        let responses: Vec<JsonRpcResponse> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        let mut ids: Vec<_> = responses
            .iter()
            .filter_map(|r| r.id.as_ref().and_then(|v| v.as_i64()))
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert!(
            responses
                .iter()
                .any(|r| r.error.as_ref().map(|e| e.code) == Some(error_codes::PARSE_ERROR))
        );
    }
}
