//! Background parse session: spawn the exporter, decode its stream,
//! deliver one outcome.
//!
//! The session is a single tokio task. It owns every piece of mutable
//! state (decoder, tables, trees, summary) exclusively, so no locking is
//! involved anywhere. The task body is a plain read loop: whenever bytes
//! arrive on the exporter's stdout they are fed to the decoder, which is
//! polled until it reports no progress, draining every complete frame
//! already buffered before the next read.
//!
//! Publication is all-or-nothing. The results bundle is delivered exactly
//! once, and only when the exporter exited successfully and the decoder
//! never failed; any environment, process, or protocol error delivers the
//! error instead, with no partial results.

use std::path::PathBuf;
use std::process::Stdio;

use log::{debug, info};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::oneshot;

use crate::analysis::{ProfileCollector, ProfileResults};
use crate::domain::SessionError;
use crate::preflight;
use crate::protocol::StreamDecoder;

/// What to parse and with which exporter.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Recorded perf data file handed to the exporter.
    pub input: PathBuf,
    /// Explicit exporter binary; auto-discovered when absent.
    pub exporter: Option<PathBuf>,
}

/// Handle to a running parse session.
pub struct ParseSession {
    outcome: oneshot::Receiver<Result<ProfileResults, SessionError>>,
}

impl ParseSession {
    /// Start parsing in the background and return immediately.
    #[must_use]
    pub fn spawn(config: ParseConfig) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = parse_stream(&config).await;
            // the caller may have lost interest; nothing to do then
            let _ = tx.send(result);
        });
        Self { outcome: rx }
    }

    /// Wait for the session's single outcome.
    pub async fn wait(self) -> Result<ProfileResults, SessionError> {
        match self.outcome.await {
            Ok(result) => result,
            Err(_) => Err(SessionError::SessionAborted),
        }
    }
}

async fn parse_stream(config: &ParseConfig) -> Result<ProfileResults, SessionError> {
    preflight::check_input_file(&config.input)?;

    let exporter = match &config.exporter {
        Some(path) => path.clone(),
        None => preflight::find_exporter_binary()?,
    };
    let binary = exporter
        .file_name()
        .map_or_else(|| preflight::EXPORTER_BINARY.to_string(), |n| n.to_string_lossy().into_owned());

    info!("launching {} for {}", exporter.display(), config.input.display());
    let mut child = Command::new(&exporter)
        .arg("--input")
        .arg(&config.input)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SessionError::ExporterStart { binary: binary.clone(), source })?;

    let Some(mut stdout) = child.stdout.take() else {
        return Err(SessionError::ExporterStart {
            binary,
            source: std::io::Error::other("stdout was not captured"),
        });
    };

    let mut decoder = StreamDecoder::new();
    let mut collector = ProfileCollector::new();
    let mut chunk = vec![0u8; 16 * 1024];

    loop {
        let n = stdout.read(&mut chunk).await?;
        if n == 0 {
            break; // exporter closed its end
        }
        decoder.feed(&chunk[..n]);
        // drain every complete frame before waiting for more bytes
        while let Some(record) = decoder.poll()? {
            collector.handle_record(record)?;
        }
    }

    let status = child.wait().await?;
    if !status.success() {
        return Err(SessionError::ExporterExit { binary, code: status.code().unwrap_or(-1) });
    }

    debug!("exporter finished, building derived views");
    Ok(collector.finalize())
}
