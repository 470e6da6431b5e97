//! Keyboard move source.

use strictly_chess::{MoveSource, Prompt, SessionError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, instrument};

/// Reads one move per line, showing the prompt first.
pub struct LineMoveSource<R, W> {
    lines: Lines<R>,
    out: W,
}

impl LineMoveSource<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Move source over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineMoveSource<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a move source over `reader`, writing prompts to `out`.
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }
}

fn input_error(message: impl std::fmt::Display) -> SessionError {
    SessionError::Input {
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl<R, W> MoveSource for LineMoveSource<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    #[instrument(skip_all)]
    async fn request_move(&mut self, prompt: &Prompt) -> Result<String, SessionError> {
        self.out
            .write_all(prompt.to_string().as_bytes())
            .await
            .map_err(input_error)?;
        self.out.flush().await.map_err(input_error)?;

        let line = self
            .lines
            .next_line()
            .await
            .map_err(input_error)?
            .ok_or_else(|| input_error("Input closed"))?;
        debug!(%line, "Move entered");
        Ok(line.trim().to_string())
    }
}
