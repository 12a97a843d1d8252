//! Announcement sinks.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncWriteExt, Stdout};

use crate::error::Result;
use crate::traits::TagSink;
use crate::types::Announcement;

/// Writes each announced tag on its own line to standard output.
///
/// Only the anonymized text is written, the way a keyboard-emulating reader
/// types it.
#[derive(Debug)]
pub struct StdoutSink {
    out: Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TagSink for StdoutSink {
    async fn emit(&mut self, announcement: Announcement) -> Result<()> {
        self.out.write_all(announcement.tag.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}

/// Keeps announcements in memory.
///
/// Clones share the same list, so one clone can be handed to the driver and
/// another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    announcements: Arc<Mutex<Vec<Announcement>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far.
    pub fn announcements(&self) -> Vec<Announcement> {
        self.lock().clone()
    }

    /// Anonymized tag texts emitted so far.
    pub fn tags(&self) -> Vec<String> {
        self.lock().iter().map(|a| a.tag.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Announcement>> {
        // A poisoned list is still a valid list.
        self.announcements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TagSink for CollectingSink {
    async fn emit(&mut self, announcement: Announcement) -> Result<()> {
        self.lock().push(announcement);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collecting_sink_shares_state() {
        let sink = CollectingSink::new();
        let mut writer = sink.clone();

        writer.emit(Announcement::now("001")).await.unwrap();
        writer.emit(Announcement::now("002")).await.unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.tags(), vec!["001", "002"]);
    }

    #[tokio::test]
    async fn test_stdout_sink_writes() {
        let mut sink = StdoutSink::new();
        sink.emit(Announcement::now("226000052")).await.unwrap();
    }
}
