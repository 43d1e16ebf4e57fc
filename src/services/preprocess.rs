use crate::models::TEMPLATE_MARKER;
use camino::{Utf8Path, Utf8PathBuf};
use encoding_rs::Encoding;
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

/// Hard ceiling on a single preprocess invocation; a command that runs
/// longer is treated as failed.
pub const PREPROCESS_TIMEOUT: Duration = Duration::from_secs(30);

/// External preprocess command failed, timed out, or could not be started.
/// Fatal for the whole run.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("preprocess command for {path} timed out after {timeout:?}")]
    Timeout {
        path: Utf8PathBuf,
        timeout: Duration,
    },

    #[error("failed to run preprocess command for {path}: {source}")]
    Spawn {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("preprocess command for {path} exited with {status}: {stderr}")]
    Failed {
        path: Utf8PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

/// Pipe one top-level module input through the external command template.
///
/// The template's `%s` is substituted with the input path exactly once and
/// the resulting line runs through the platform shell. Captured stdout
/// becomes the input's text for the next pipeline stage. Diagnostic text on
/// stderr is logged but only a non-zero exit (or timeout) fails the build.
pub async fn run(
    command_template: &str,
    input: &Utf8Path,
    charset: &'static Encoding,
    timeout_duration: Duration,
) -> Result<String, PreprocessError> {
    let command_line = command_template.replacen(TEMPLATE_MARKER, input.as_str(), 1);
    tracing::debug!("preprocessing {} with: {}", input, command_line);

    let start = Instant::now();

    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", &command_line]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", &command_line]);
        c
    };

    let output = timeout(timeout_duration, command.output())
        .await
        .map_err(|_| PreprocessError::Timeout {
            path: input.to_owned(),
            timeout: timeout_duration,
        })?
        .map_err(|source| PreprocessError::Spawn {
            path: input.to_owned(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(PreprocessError::Failed {
            path: input.to_owned(),
            status: output.status,
            stderr,
        });
    }

    if !stderr.is_empty() {
        tracing::warn!("preprocess diagnostics for {}: {}", input, stderr);
    }

    tracing::debug!(
        "preprocessed {} in {:.2}s",
        input,
        start.elapsed().as_secs_f32()
    );

    let (stdout, _, _) = charset.decode(&output.stdout);
    Ok(stdout.into_owned())
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use tempfile::TempDir;

    fn temp_input(content: &str) -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf())
            .unwrap()
            .join("input.css");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn stdout_becomes_the_input_text() {
        let (_dir, input) = temp_input("a{}");
        let result = run("cat %s", &input, UTF_8, PREPROCESS_TIMEOUT).await.unwrap();
        assert_eq!(result, "a{}");
    }

    #[tokio::test]
    async fn path_marker_is_substituted_once() {
        let (_dir, input) = temp_input("");
        // The second %s must survive untouched.
        let result = run("echo %s %s", &input, UTF_8, PREPROCESS_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result, format!("{} %s\n", input));
    }

    #[tokio::test]
    async fn failing_command_reports_stderr_and_path() {
        let (_dir, input) = temp_input("");
        let err = run("echo broken >&2; exit 3", &input, UTF_8, PREPROCESS_TIMEOUT)
            .await
            .unwrap_err();
        match err {
            PreprocessError::Failed { path, stderr, .. } => {
                assert_eq!(path, input);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let (_dir, input) = temp_input("");
        let err = run("sleep 5", &input, UTF_8, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, PreprocessError::Timeout { .. }));
    }

    #[tokio::test]
    async fn stderr_chatter_does_not_fail_a_successful_command() {
        let (_dir, input) = temp_input("");
        let result = run("echo note >&2; echo ok", &input, UTF_8, PREPROCESS_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(result, "ok\n");
    }
}
