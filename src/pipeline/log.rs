//! Dispatch log: append-only, in-memory record of every dispatch.

use tokio::sync::RwLock;
use tracing::debug;

use super::types::LogEntry;

/// Ordered dispatch log owned by one `Dispatcher`.
#[derive(Default)]
pub struct DispatchLog {
    entries: RwLock<Vec<LogEntry>>,
}

impl DispatchLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries are never removed.
    pub async fn append(&self, entry: LogEntry) {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        debug!(total = entries.len(), "Dispatch logged");
    }

    /// Snapshot of all entries, oldest first.
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Most recent entry, if any.
    pub async fn last(&self) -> Option<LogEntry> {
        self.entries.read().await.last().cloned()
    }

    /// Render all entries as JSON lines.
    pub async fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let entries = self.entries.read().await;
        let mut out = String::new();
        for entry in entries.iter() {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::pipeline::types::IntentLabel;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            message: message.into(),
            customer_name: "Customer".into(),
            intent_label: IntentLabel::Query,
            handler_name: "Query Handler".into(),
            response: "ok".into(),
            used_external_service: false,
            logged_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let log = DispatchLog::new();
        assert!(log.is_empty().await);

        log.append(entry("first")).await;
        log.append(entry("second")).await;

        let entries = log.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].message, "second");
        assert_eq!(log.last().await.unwrap().message, "second");
    }

    #[tokio::test]
    async fn snapshot_is_detached() {
        let log = DispatchLog::new();
        log.append(entry("one")).await;

        let mut snapshot = log.entries().await;
        snapshot.clear();
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn json_lines_one_per_entry() {
        let log = DispatchLog::new();
        log.append(entry("a")).await;
        log.append(entry("b")).await;

        let out = log.to_json_lines().await.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: LogEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.message, "b");
        assert_eq!(parsed.intent_label, IntentLabel::Query);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let log = std::sync::Arc::new(DispatchLog::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.append(entry(&format!("msg-{i}"))).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(log.len().await, 16);
    }
}
