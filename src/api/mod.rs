//! API Module
//!
//! Newline-delimited JSON front end for the prediction service.
//!
//! # Protocol
//! - Request: `{"key": "<cache key>"}` per line
//! - Response: `{"key": "<cache key>", "ttl": <seconds>}` per line
//! - Errors: `{"error": "<message>"}` per line; the stream keeps going

pub mod handlers;

pub use handlers::handle_line;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::service::PredictionService;

/// Serves request lines from `reader` until end of input.
///
/// Each response is flushed as soon as it is written. Returns the number of
/// responses written.
pub async fn serve_lines<R, W>(
    service: &PredictionService,
    reader: R,
    mut writer: W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut served = 0;

    while let Some(line) = lines.next_line().await? {
        if let Some(response) = handle_line(service, &line) {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            served += 1;
        }
    }

    Ok(served)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_serve_lines_mixed_input() {
        let service = PredictionService::from_config(&Config::default());
        let input = b"{\"key\":\"a\"}\n\n{\"key\":\"b\"}\nbroken\n";
        let mut output = Vec::new();

        let served = serve_lines(&service, &input[..], &mut output).await.unwrap();

        assert_eq!(served, 3);
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], r#"{"key":"a","ttl":30}"#);
        assert_eq!(lines[1], r#"{"key":"b","ttl":30}"#);
        assert!(lines[2].contains("error"));
    }

    #[test]
    fn test_serve_lines_with_chunked_reader() {
        let service = PredictionService::from_config(&Config::default());
        let mut output = Vec::new();

        let served = tokio_test::block_on(async {
            // Request split across reads
            let reader = tokio_test::io::Builder::new()
                .read(b"{\"key\":")
                .read(b"\"chunked\"}\n")
                .build();
            serve_lines(&service, BufReader::new(reader), &mut output).await
        })
        .unwrap();

        assert_eq!(served, 1);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "{\"key\":\"chunked\",\"ttl\":30}\n"
        );
    }
}
