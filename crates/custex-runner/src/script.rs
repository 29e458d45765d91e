//! Script runner — spawns the external script and parses its stdout.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use custex_core::{LabelSchema, Sample, parse_line};

use crate::error::{RunError, RunResult};

/// Longest output line accepted, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Something the poller can pull one batch of samples from per cycle.
pub trait SampleSource: Send + Sync {
    fn collect(&self) -> impl Future<Output = RunResult<Vec<Sample>>> + Send;
}

/// Runs one script invocation per `run()` call.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    script: PathBuf,
    schema: LabelSchema,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(script: impl Into<PathBuf>, schema: LabelSchema) -> Self {
        Self {
            script: script.into(),
            schema,
            timeout: None,
        }
    }

    /// Kill the script and fail the cycle if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Execute the script and parse every line it prints.
    ///
    /// Any spawn, read, or parse failure discards everything collected so
    /// far. An empty output is a successful, empty batch.
    pub async fn run(&self) -> RunResult<Vec<Sample>> {
        match self.timeout {
            // Dropping the timed-out future drops the child, which kills it.
            Some(limit) => tokio::time::timeout(limit, self.execute())
                .await
                .map_err(|_| RunError::Timeout(limit))?,
            None => self.execute().await,
        }
    }

    async fn execute(&self) -> RunResult<Vec<Sample>> {
        let mut child = Command::new(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                script: self.script.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            RunError::Read(std::io::Error::other("script stdout was not captured"))
        })?;

        let mut reader = BufReader::new(stdout);
        let mut samples = Vec::new();
        let mut line_no = 0;

        while let Some(line) = read_line_bounded(&mut reader).await.map_err(RunError::Read)? {
            line_no += 1;
            let sample = parse_line(&line, &self.schema).map_err(|source| RunError::Format {
                line: line_no,
                source,
            })?;
            samples.push(sample);
        }

        // Output already ended cleanly; the exit status does not decide the cycle.
        let status = child.wait().await.map_err(RunError::Wait)?;
        if !status.success() {
            warn!(script = %self.script.display(), %status, "script exited unsuccessfully");
        }

        debug!(script = %self.script.display(), samples = samples.len(), "script finished");
        Ok(samples)
    }
}

/// Read one line, stripping `\n` / `\r\n`. `None` at end of stream.
///
/// Lines longer than `MAX_LINE_BYTES` fail with `InvalidData` instead of
/// being buffered whole.
async fn read_line_bounded<R>(reader: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    // One extra byte for the newline.
    let limit = (MAX_LINE_BYTES + 1) as u64;
    let read = reader.take(limit).read_until(b'\n', &mut buf).await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("output line exceeds {MAX_LINE_BYTES} bytes"),
        ));
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl SampleSource for ScriptRunner {
    fn collect(&self) -> impl Future<Output = RunResult<Vec<Sample>>> + Send {
        self.run()
    }
}
