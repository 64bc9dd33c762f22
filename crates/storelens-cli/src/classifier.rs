//! Subprocess-backed [`FeatureClassifier`].
//!
//! The configured program receives the rendered prompt on stdin and must
//! print the model response on stdout. Vendor wire formats live in that
//! program, not here.

use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use storelens_core::constants::DEFAULT_TIMEOUT_MS;
use storelens_core::traits::{ClassifierRequest, FeatureClassifier};

/// Environment passed to the child alongside the inherited one.
pub const ENV_VENDOR: &str = "STORELENS_VENDOR";
pub const ENV_MODEL: &str = "STORELENS_MODEL";
pub const ENV_APP_KEY: &str = "STORELENS_APP_KEY";
pub const ENV_TAXONOMY: &str = "STORELENS_TAXONOMY";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct CommandClassifier {
    vendor: String,
    model: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandClassifier {
    pub fn new(
        vendor: impl Into<String>,
        model: impl Into<String>,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            model: model.into(),
            program: program.into(),
            args,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Per-call budget; the child is killed when it runs over.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn drain<R: Read + Send + 'static>(mut source: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|b| String::from_utf8_lossy(&b).trim().to_string())
        .unwrap_or_default()
}

/// `None` when the deadline passed first.
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

impl FeatureClassifier for CommandClassifier {
    fn vendor(&self) -> &str {
        &self.vendor
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn classify(&self, request: &ClassifierRequest<'_>) -> Result<String, String> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(ENV_VENDOR, &self.vendor)
            .env(ENV_MODEL, &self.model)
            .env(ENV_APP_KEY, request.app_key.as_str())
            .env(ENV_TAXONOMY, request.taxonomy.join(","))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("spawn {}: {e}", self.program))?;

        let stdout = child.stdout.take().map(drain::<ChildStdout>);
        let stderr = child.stderr.take().map(drain::<ChildStderr>);
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = request.text.to_string();
            thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let status = match wait_until(&mut child, deadline) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!(
                    "{} timed out after {}ms",
                    self.program,
                    self.timeout.as_millis()
                ));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("wait {}: {e}", self.program));
            }
        };

        let written = writer.map(|h| h.join());
        let text = collect(stdout);
        if !status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                status.code().unwrap_or(-1),
                collect(stderr)
            ));
        }
        match written {
            Some(Ok(Err(e))) if text.is_empty() => return Err(format!("write prompt: {e}")),
            Some(Err(_)) => return Err("prompt writer panicked".to_string()),
            _ => {}
        }
        if text.is_empty() {
            return Err(format!("{} produced no output", self.program));
        }
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use storelens_core::types::AppKey;

    fn request<'a>(key: &'a AppKey, taxonomy: &'a [String]) -> ClassifierRequest<'a> {
        ClassifierRequest {
            app_key: key,
            title: "Focus",
            text: "prompt body",
            taxonomy,
        }
    }

    #[test]
    fn test_stdout_is_the_response() {
        let key = AppKey::new("play:a");
        let taxonomy = vec!["timer".to_string()];
        let c = CommandClassifier::new("local", "echo", "sh", vec!["-c".into(), "cat".into()]);
        assert_eq!(c.classify(&request(&key, &taxonomy)).unwrap(), "prompt body");
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let key = AppKey::new("play:a");
        let c = CommandClassifier::new(
            "local",
            "fail",
            "sh",
            vec!["-c".into(), "cat >/dev/null; echo boom >&2; exit 3".into()],
        );
        let err = c.classify(&request(&key, &[])).unwrap_err();
        assert!(err.contains("exited with 3"));
        assert!(err.contains("boom"));
    }

    #[test]
    fn test_hung_child_is_killed_at_the_deadline() {
        let key = AppKey::new("play:a");
        let c = CommandClassifier::new(
            "local",
            "hang",
            "sh",
            vec!["-c".into(), "cat >/dev/null; exec sleep 30".into()],
        )
        .with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = c.classify(&request(&key, &[])).unwrap_err();
        assert!(err.contains("timed out after 200ms"), "{err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
