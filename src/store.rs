//! Append-only CSV log of captured links.
//!
//! The file is created once with a fixed header and only ever grown by one
//! row per capture. It is read back in full at startup to rebuild the
//! seen-pair ledger.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CSV_HEADER: [&str; 8] = [
    "captured_at_utc",
    "guild_id",
    "channel_id",
    "message_id",
    "author_id",
    "author_name",
    "url",
    "content_snippet",
];

/// One row per (message, url) pair the first time it is seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub captured_at_utc: NaiveDateTime,
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
    pub author_id: String,
    pub author_name: String,
    pub url: String,
    pub content_snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("capture log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture log CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("capture log task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Destination for newly captured records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&self, record: &CaptureRecord) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the log with its header row if it does not exist yet. An
    /// existing log whose last line was cut short gets its newline back so the
    /// next row starts on a line of its own.
    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            debug!("Capture log: {} already present", self.path.display());
            self.terminate_last_line()?;
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;

        info!("Capture log: created {}", self.path.display());
        Ok(())
    }

    fn terminate_last_line(&self) -> Result<(), StoreError> {
        let mut file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(());
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] == b'\n' {
            return Ok(());
        }

        warn!(
            "Capture log: {} ends mid-line, terminating it",
            self.path.display()
        );
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }

    /// Reads every parsable row. Malformed rows are skipped.
    pub fn read_all(&self) -> Result<Vec<CaptureRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for (row_idx, result) in reader.deserialize::<CaptureRecord>().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "Capture log: skipping malformed row {} in {}: {}",
                    row_idx + 1,
                    self.path.display(),
                    e
                ),
            }
        }

        Ok(records)
    }

    /// Appends exactly one row to the end of the log.
    pub fn append_blocking(&self, record: &CaptureRecord) -> Result<(), StoreError> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    pub async fn run_blocking<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(RecordStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store)).await?
    }
}

#[async_trait]
impl RecordSink for RecordStore {
    async fn append(&self, record: &CaptureRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.run_blocking(move |store| store.append_blocking(&record))
            .await
    }
}
