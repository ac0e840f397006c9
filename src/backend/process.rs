//! Local `ollama` executable as a fallback transport.

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs the backend as a child process with the prompt on stdin.
///
/// The child is spawned with `kill_on_drop`, so when the gateway's timeout drops the pending
/// attempt the process is killed rather than left running.
pub struct OllamaProcessTransport {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl OllamaProcessTransport {
    /// `{program} run {model}`.
    pub fn new(program: String, model: String, timeout: Duration) -> Self {
        Self::with_args(program, vec!["run".into(), model], timeout)
    }

    /// Arbitrary program and arguments; stdin still carries the prompt.
    pub fn with_args(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }
}

#[async_trait]
impl Transport for OllamaProcessTransport {
    fn name(&self) -> &'static str {
        "process"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| {
                TransportError::Unreachable(format!("failed to spawn {}: {error}", self.program))
            })?;

        // Feed stdin while collecting output; a child that echoes as it reads would otherwise
        // fill the stdout pipe and stall before the prompt is fully written.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes()).await?;
                // Closing stdin signals end of prompt.
                drop(stdin);
            }
            Ok::<(), std::io::Error>(())
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|error| {
            TransportError::Unreachable(format!("failed to wait for {}: {error}", self.program))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Rejected(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        written.map_err(|error| {
            TransportError::Unreachable(format!("failed to write prompt to stdin: {error}"))
        })?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stdout_is_trimmed_on_success() {
        let transport =
            OllamaProcessTransport::with_args("cat".into(), Vec::new(), Duration::from_secs(5));
        let text = transport
            .generate("  echoed prompt \n")
            .await
            .expect("cat succeeds");
        assert_eq!(text, "echoed prompt");
    }

    #[tokio::test]
    async fn prompt_larger_than_pipe_buffer_round_trips() {
        let transport =
            OllamaProcessTransport::with_args("cat".into(), Vec::new(), Duration::from_secs(10));
        let prompt = "Clause 7: the tenant shall pay rent monthly.\n".repeat(12_000);
        assert!(prompt.len() > 512 * 1024);

        let text = transport.generate(&prompt).await.expect("cat echoes the prompt");
        assert_eq!(text, prompt.trim());
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let transport =
            OllamaProcessTransport::with_args("false".into(), Vec::new(), Duration::from_secs(5));
        assert!(transport.generate("prompt").await.is_err());
    }

    #[tokio::test]
    async fn missing_program_is_unreachable() {
        let transport = OllamaProcessTransport::new(
            "lawease-no-such-binary".into(),
            "qwen2.5:1.5b".into(),
            Duration::from_secs(5),
        );
        let error = transport.generate("prompt").await.expect_err("missing");
        assert!(matches!(error, TransportError::Unreachable(_)));
    }
}
