//! Readiness monitor: waits for a running server to report every model ready.
//!
//! Two signals are combined. `/models/status` is polled with a growing
//! interval and is authoritative. Optionally a server log file is tailed for
//! the `"<capability> ready"` lines the loader emits; once both are seen the
//! monitor confirms once over HTTP instead of waiting for the next poll.
//!
//! Once ready, the monitor can fetch a lecture transcript through the
//! server's `/fetch-transcript` endpoint and save it as a single-line text
//! file.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use learning_common::{Capability, ModelsStatus, TranscriptRequest, TranscriptResponse};
use reqwest::Client;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::watch;
use tokio::time::Instant;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const TAIL_POLL: Duration = Duration::from_millis(200);
const TRANSCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Timed out after {0:?} waiting for models to become ready")]
    Timeout(Duration),

    #[error("Status request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Status endpoint returned {0}")]
    UnexpectedStatus(u16),

    #[error("Server returned an empty transcript for {0}")]
    EmptyTranscript(String),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub status_url: String,
    /// Total time to wait before giving up.
    pub timeout: Duration,
    /// Delay before the second poll; grows from here.
    pub poll_interval: Duration,
    /// Upper bound for the poll delay.
    pub max_interval: Duration,
    pub log_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_url: "http://localhost:5000/models/status".to_string(),
            timeout: Duration::from_secs(3600),
            poll_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(5),
            log_path: None,
        }
    }
}

/// A transcript to fetch once the models are ready.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptJob {
    /// Video URL or bare id, sent to the server as-is.
    pub video: String,
    pub fetch_url: String,
    pub out_dir: PathBuf,
}

impl TranscriptJob {
    pub fn new(video: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            fetch_url: "http://localhost:5000/fetch-transcript".to_string(),
            out_dir: PathBuf::from("transcripts"),
        }
    }
}

/// Collapse line breaks to spaces and trim.
pub fn normalize_transcript(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// Write a normalized transcript to `out_dir/transcript_<id>_<unix secs>.txt`,
/// creating the directory if needed.
pub async fn save_transcript(
    out_dir: &Path,
    video_id: &str,
    transcript: &str,
) -> Result<PathBuf, MonitorError> {
    tokio::fs::create_dir_all(out_dir).await?;
    let file_name = format!(
        "transcript_{}_{}.txt",
        video_id,
        chrono::Utc::now().timestamp()
    );
    let path = out_dir.join(file_name);
    tokio::fs::write(&path, normalize_transcript(transcript)).await?;
    tracing::info!("Transcript saved to {}", path.display());
    Ok(path)
}

/// Readiness lines seen in the log so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSignals {
    pub summarizer: bool,
    pub generator: bool,
}

impl LogSignals {
    fn observe(&mut self, capability: Capability) {
        match capability {
            Capability::Summarizer => self.summarizer = true,
            Capability::Generator => self.generator = true,
        }
    }

    pub fn all_ready(&self) -> bool {
        self.summarizer && self.generator
    }
}

/// The capability a log line announces as ready, if any.
pub fn scan_line(line: &str) -> Option<Capability> {
    let lower = line.to_lowercase();
    Capability::ALL
        .into_iter()
        .find(|c| lower.contains(&format!("{} ready", c.as_str())))
}

/// The delay after `current`: ×1.5, capped at `max`.
pub fn next_interval(current: Duration, max: Duration) -> Duration {
    current.mul_f64(1.5).min(max)
}

/// Follow `path` from `start`, publishing readiness lines to `signals`.
///
/// Runs until the file disappears, a read fails, or every receiver is gone.
/// A missing file is not an error: the caller falls back to polling.
pub async fn tail_log(
    path: &Path,
    start: SeekFrom,
    signals: watch::Sender<LogSignals>,
) -> Result<(), MonitorError> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                "Log file {} not found, relying on status polling",
                path.display()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    file.seek(start).await?;

    let mut reader = BufReader::new(file);
    let mut line = String::new();
    while !signals.is_closed() {
        if reader.read_line(&mut line).await? == 0 {
            tokio::time::sleep(TAIL_POLL).await;
            continue;
        }
        // Partial line; wait for the writer to finish it.
        if !line.ends_with('\n') {
            continue;
        }

        tracing::trace!("log: {}", line.trim_end());
        if let Some(capability) = scan_line(&line) {
            tracing::info!("Detected {} ready in logs", capability);
            signals.send_modify(|s| s.observe(capability));
        }
        line.clear();
    }

    Ok(())
}

/// Polls a learning server until its models are ready.
pub struct ReadinessMonitor {
    client: Client,
    config: MonitorConfig,
}

impl ReadinessMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self { client, config }
    }

    pub async fn fetch_status(&self) -> Result<ModelsStatus, MonitorError> {
        let response = self.client.get(&self.config.status_url).send().await?;
        if !response.status().is_success() {
            return Err(MonitorError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Ask the server for the transcript of `video`.
    pub async fn fetch_transcript(
        &self,
        fetch_url: &str,
        video: &str,
    ) -> Result<TranscriptResponse, MonitorError> {
        tracing::info!("Requesting transcript for {} from {}", video, fetch_url);
        let request = TranscriptRequest {
            url: Some(video.to_string()),
        };
        let response = self
            .client
            .post(fetch_url)
            .timeout(TRANSCRIPT_TIMEOUT)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MonitorError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Fetch the job's transcript and save it under the job's directory.
    pub async fn fetch_and_save(&self, job: &TranscriptJob) -> Result<PathBuf, MonitorError> {
        let video_id = crate::transcript::extract_video_id(&job.video);
        let response = self.fetch_transcript(&job.fetch_url, &job.video).await?;
        if response.transcript.trim().is_empty() {
            return Err(MonitorError::EmptyTranscript(video_id));
        }
        tracing::info!(
            source = %response.source,
            chars = response.transcript.len(),
            "Fetched transcript for {}",
            video_id
        );
        save_transcript(&job.out_dir, &video_id, &response.transcript).await
    }

    /// Wait until the server reports every capability ready.
    ///
    /// Unreachable servers and error responses are retried until the timeout.
    pub async fn wait_until_ready(&self) -> Result<ModelsStatus, MonitorError> {
        let deadline = Instant::now() + self.config.timeout;

        let (tx, mut log_signals) = watch::channel(LogSignals::default());
        let tail = self.config.log_path.clone().map(|path| {
            tokio::spawn(async move {
                if let Err(e) = tail_log(&path, SeekFrom::End(0), tx).await {
                    tracing::warn!("Stopped tailing {}: {}", path.display(), e);
                }
            })
        });

        let result = self.poll_loop(deadline, &mut log_signals).await;

        if let Some(tail) = tail {
            tail.abort();
        }
        result
    }

    async fn poll_loop(
        &self,
        deadline: Instant,
        log_signals: &mut watch::Receiver<LogSignals>,
    ) -> Result<ModelsStatus, MonitorError> {
        let mut interval = self.config.poll_interval;
        let mut attempt: u32 = 0;
        let mut log_confirmed = false;

        loop {
            attempt += 1;
            let from_log = !log_confirmed && log_signals.borrow().all_ready();
            if from_log {
                tracing::info!("Both models reported ready in logs, confirming via HTTP");
                log_confirmed = true;
            }

            match self.fetch_status().await {
                Ok(status) => {
                    tracing::info!(
                        attempt,
                        available = status.available,
                        summarizer_ready = status.summarizer_ready,
                        generator_ready = status.generator_ready,
                        "Polled model status"
                    );
                    if status.all_ready() {
                        return Ok(status);
                    }
                    if from_log {
                        tracing::warn!("Logs report ready but the status endpoint does not yet");
                    }
                }
                Err(e) => tracing::warn!(attempt, "Failed to reach {}: {}", self.config.status_url, e),
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::error!("Timed out waiting for models to be ready");
                return Err(MonitorError::Timeout(self.config.timeout));
            }

            let delay = interval.min(deadline - now);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                // A fresh log signal cuts the wait short.
                Ok(()) = log_signals.changed(), if !log_confirmed => {}
            }
            interval = next_interval(interval, self.config.max_interval);
        }
    }
}
