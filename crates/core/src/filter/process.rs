//! Filter runner that executes external programs.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, trace};

use super::error::FilterError;
use super::traits::FilterRunner;
use super::types::FilterSpec;
use crate::cancel::CancelToken;
use crate::protocol::{decode, encode, Record};

/// Only the tail of a filter's stderr is kept in errors and logs.
const STDERR_EXCERPT_BYTES: usize = 4096;

/// Returns the last `STDERR_EXCERPT_BYTES` of `stderr`, decoded lossily.
fn stderr_excerpt(stderr: &[u8]) -> String {
    let mut start = stderr.len().saturating_sub(STDERR_EXCERPT_BYTES);
    // Skip UTF-8 continuation bytes so the cut lands on a char boundary.
    while start < stderr.len() && stderr[start] & 0b1100_0000 == 0b1000_0000 {
        start += 1;
    }
    String::from_utf8_lossy(&stderr[start..]).into_owned()
}

/// Runs each filter as a child process speaking the line protocol.
///
/// The child is spawned with `kill_on_drop`, so every early return (timeout,
/// cancellation, a dropped future) terminates it.
#[derive(Debug, Clone, Default)]
pub struct ProcessFilter {
    _private: (),
}

impl ProcessFilter {
    /// Creates a new process runner.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FilterRunner for ProcessFilter {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        spec: &FilterSpec,
        input: &Record,
        cancel: &CancelToken,
    ) -> Result<Option<Record>, FilterError> {
        let payload = encode(input, spec.protocol)?;

        if cancel.is_cancelled() {
            return Err(FilterError::Cancelled);
        }

        let start = Instant::now();
        let mut child = Command::new(&spec.executable)
            .args(&spec.arguments)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FilterError::SpawnFailed {
                path: spec.executable.display().to_string(),
                reason: e.to_string(),
            })?;

        trace!(filter = %spec.display_name(), pid = ?child.id(), "Spawned filter");

        let stdin = child.stdin.take();
        let invocation = async move {
            let feed = async move {
                if let Some(mut stdin) = stdin {
                    match stdin.write_all(&payload).await {
                        // The filter may exit without reading its input.
                        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                        result => result?,
                    }
                    // Filters read to EOF, so close stdin explicitly.
                    drop(stdin);
                }
                Ok::<(), std::io::Error>(())
            };

            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            let output = output?;
            fed?;
            Ok::<std::process::Output, std::io::Error>(output)
        };

        let output = tokio::select! {
            result = timeout(spec.timeout, invocation) => match result {
                Ok(output) => output?,
                Err(_) => {
                    return Err(FilterError::Timeout {
                        timeout_ms: spec.timeout.as_millis() as u64,
                    });
                }
            },
            _ = cancel.cancelled() => return Err(FilterError::Cancelled),
        };

        let stderr = stderr_excerpt(&output.stderr);
        debug!(
            filter = %spec.display_name(),
            protocol = %spec.protocol,
            status = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Filter finished"
        );

        if !output.status.success() {
            return Err(FilterError::process_failed(output.status.code(), stderr));
        }

        if !stderr.is_empty() {
            debug!(filter = %spec.display_name(), stderr = %stderr.trim_end(), "Filter wrote to stderr");
        }

        if output.stdout.is_empty() {
            return Ok(None);
        }

        Ok(Some(decode(&output.stdout, spec.protocol, input)?))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cancel::CancelHandle;
    use crate::protocol::ProtocolVersion;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    async fn run(spec: &FilterSpec, input: &Record) -> Result<Option<Record>, FilterError> {
        ProcessFilter::new()
            .run(spec, input, &CancelToken::never())
            .await
    }

    #[tokio::test]
    async fn test_transforming_filter() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            dir.path(),
            "filter.sh",
            "read artist\nread title\nread album\necho \"Artist=$artist\"\necho \"Title=$title\"\necho \"Album=$album\"\n",
        );

        let output = run(&FilterSpec::new(script), &Record::new("lorem", "ipsum", "dolor"))
            .await
            .unwrap();
        assert_eq!(
            output,
            Some(Record::new("Artist=lorem", "Title=ipsum", "Album=dolor"))
        );
    }

    #[tokio::test]
    async fn test_empty_output_drops() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "drop.sh", "cat > /dev/null\n");
        let output = run(&FilterSpec::new(script), &Record::new("a", "t", "b"))
            .await
            .unwrap();
        assert_eq!(output, None);
    }

    #[tokio::test]
    async fn test_filter_not_reading_stdin() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "true.sh", "true\n");
        let output = run(&FilterSpec::new(script), &Record::new("a", "t", "b"))
            .await
            .unwrap();
        assert_eq!(output, None);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "fail.sh", "cat > /dev/null\necho nope >&2\nexit 3\n");
        let err = run(&FilterSpec::new(script), &Record::new("a", "t", "b"))
            .await
            .unwrap_err();
        assert_eq!(err, FilterError::process_failed(Some(3), "nope\n"));
    }

    #[tokio::test]
    async fn test_failure_keeps_stderr_tail() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            dir.path(),
            "noisy.sh",
            "cat > /dev/null\nhead -c 20000 /dev/zero | tr '\\0' x >&2\necho last-line >&2\nexit 1\n",
        );
        let err = run(&FilterSpec::new(script), &Record::new("a", "t", "b"))
            .await
            .unwrap_err();

        let FilterError::ProcessFailed { code, stderr } = err else {
            panic!("expected ProcessFailed, got {:?}", err);
        };
        assert_eq!(code, Some(1));
        assert_eq!(stderr.len(), STDERR_EXCERPT_BYTES);
        assert!(stderr.ends_with("last-line\n"));
    }

    #[test]
    fn test_stderr_excerpt_cuts_on_char_boundary() {
        assert_eq!(stderr_excerpt(b"short"), "short");

        // A two-byte char straddling the cut is skipped, not mangled.
        let mut bytes = "é".repeat(STDERR_EXCERPT_BYTES).into_bytes();
        bytes.push(b'!');
        let excerpt = stderr_excerpt(&bytes);
        assert!(!excerpt.contains('\u{FFFD}'));
        assert!(excerpt.ends_with('!'));
        assert!(excerpt.len() <= STDERR_EXCERPT_BYTES);
    }

    #[tokio::test]
    async fn test_short_output_is_protocol_violation() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "short.sh", "cat > /dev/null\necho only-one-line\n");
        let err = run(&FilterSpec::new(script), &Record::new("a", "t", "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, FilterError::ProtocolViolation { .. }));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let err = run(
            &FilterSpec::new("/nonexistent/trackfilter-filter"),
            &Record::new("a", "t", "b"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FilterError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_encoding_error_before_spawn() {
        let err = run(
            &FilterSpec::new("/nonexistent/trackfilter-filter"),
            &Record::new("a", "multi\nline", "b"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FilterError::Encoding { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_filter() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "slow.sh", "exec sleep 30\n");
        let spec = FilterSpec::new(script).with_timeout(Duration::from_millis(200));

        let start = Instant::now();
        let err = run(&spec, &Record::new("a", "t", "b")).await.unwrap_err();
        assert_eq!(err, FilterError::Timeout { timeout_ms: 200 });
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancel_stops_filter() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "slow.sh", "exec sleep 30\n");
        let spec = FilterSpec::new(script);

        let handle = CancelHandle::new();
        let token = handle.token();
        let input = Record::new("a", "t", "b");
        let task = tokio::spawn(async move { ProcessFilter::new().run(&spec, &input, &token).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();

        let err = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("cancelled filter should return promptly")
            .unwrap()
            .unwrap_err();
        assert_eq!(err, FilterError::Cancelled);
    }

    #[tokio::test]
    async fn test_genre4_filter_sees_genres() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            dir.path(),
            "genres.sh",
            "read artist\nread title\nread album\nread genres\nprintf '%s\\n%s\\n%s\\n%s,extra\\n' \"$artist\" \"$title\" \"$album\" \"$genres\"\n",
        );
        let spec = FilterSpec::new(script).with_protocol(ProtocolVersion::Genre4);
        let input = Record::new("a", "t", "b").with_genres(["rock", "pop"]);

        let output = run(&spec, &input).await.unwrap().unwrap();
        assert_eq!(output.genres, vec!["rock", "pop", "extra"]);
    }
}
