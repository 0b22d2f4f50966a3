//! Link capture pipeline
//!
//! Filters messages down to the scan channel, extracts candidate URLs from the
//! text and attachments, drops pairs already in the ledger and persists what
//! is left, one CSV row per new (message, url) pair.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::ledger::SeenPairs;
use crate::links::{dedup_preserving_order, extract_urls, normalize_url};
use crate::message::IncomingMessage;
use crate::store::{CaptureRecord, RecordSink};

/// Max characters of message text kept alongside each capture.
pub const SNIPPET_CHARS: usize = 200;

/// Text URLs followed by attachment URLs, normalized and deduplicated.
pub fn candidate_urls(message: &IncomingMessage) -> Vec<String> {
    let text_urls = extract_urls(&message.content);
    let attachment_urls = message.attachments.iter().map(|url| normalize_url(url));
    dedup_preserving_order(text_urls.into_iter().chain(attachment_urls))
}

pub fn content_snippet(content: &str) -> String {
    content
        .chars()
        .take(SNIPPET_CHARS)
        .collect::<String>()
        .replace('\n', " ")
}

/// Works out which records a message would produce without touching any state.
pub fn plan_captures<L: SeenPairs + ?Sized>(
    message: &IncomingMessage,
    scan_channel_id: u64,
    ledger: &L,
    now: NaiveDateTime,
) -> Vec<CaptureRecord> {
    if message.channel_id != scan_channel_id || message.author.is_bot {
        return Vec::new();
    }

    let candidates = candidate_urls(message);
    if candidates.is_empty() {
        return Vec::new();
    }

    let message_id = message.id.to_string();
    let snippet = content_snippet(&message.content);

    candidates
        .into_iter()
        .filter(|url| !ledger.contains(&message_id, url))
        .map(|url| CaptureRecord {
            captured_at_utc: now,
            guild_id: message.guild_id.map(|id| id.to_string()).unwrap_or_default(),
            channel_id: message.channel_id.to_string(),
            message_id: message_id.clone(),
            author_id: message.author.id.to_string(),
            author_name: message.author.name.clone(),
            url,
            content_snippet: snippet.clone(),
        })
        .collect()
}

/// Owns the ledger and the record sink for the lifetime of the bot.
pub struct CaptureService<L, S> {
    scan_channel_id: u64,
    ledger: Mutex<L>,
    sink: S,
}

impl<L, S> CaptureService<L, S>
where
    L: SeenPairs,
    S: RecordSink,
{
    pub fn new(scan_channel_id: u64, ledger: L, sink: S) -> Self {
        Self {
            scan_channel_id,
            ledger: Mutex::new(ledger),
            sink,
        }
    }

    pub fn scan_channel_id(&self) -> u64 {
        self.scan_channel_id
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Whether a message is eligible for capture at all.
    pub fn accepts(&self, message: &IncomingMessage) -> bool {
        message.channel_id == self.scan_channel_id && !message.author.is_bot
    }

    /// Number of (message, url) pairs recorded so far, including those loaded
    /// at startup.
    pub async fn seen_count(&self) -> usize {
        self.ledger.lock().await.len()
    }

    /// Runs the pipeline for a newly posted or edited message and returns the
    /// records that were captured and persisted by this call.
    ///
    /// A pair whose append fails stays in the ledger, so it is not retried
    /// for the rest of the session.
    pub async fn handle(&self, message: &IncomingMessage, is_edit: bool) -> Vec<CaptureRecord> {
        if !self.accepts(message) {
            return Vec::new();
        }

        // Held across the appends so an edit racing the original post sees
        // every pair the first call recorded. Only scan-channel traffic gets
        // this far, so other channels never wait on a CSV write.
        let mut ledger = self.ledger.lock().await;

        let planned = plan_captures(
            message,
            self.scan_channel_id,
            &*ledger,
            Utc::now().naive_utc().trunc_subsecs(6),
        );
        if planned.is_empty() {
            debug!(
                "Capture: nothing new in message {} (edit: {})",
                message.id, is_edit
            );
            return planned;
        }

        let mut captured = Vec::with_capacity(planned.len());
        for record in planned {
            if !ledger.insert(&record.message_id, &record.url) {
                continue;
            }

            if let Err(e) = self.sink.append(&record).await {
                error!(
                    "Capture: failed to persist {} from message {}: {}",
                    record.url, record.message_id, e
                );
                continue;
            }

            info!(
                "[{}] Saved URL: {} (msg {}, edit: {})",
                record.captured_at_utc, record.url, record.message_id, is_edit
            );
            captured.push(record);
        }

        captured
    }
}
