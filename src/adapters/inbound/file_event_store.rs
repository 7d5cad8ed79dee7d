use crate::common::{EventEnvelope, EventStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

/// Event store keeping one JSON-lines file per patrol path.
///
/// Appends are serialized inside the process and checked against the
/// expected stream length, so two writers optimizing the same path cannot
/// both succeed.
pub struct FileEventStore {
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileEventStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn stream_path(&self, aggregate_id: &str) -> PathBuf {
        // keep ids from escaping the store directory
        let file_name: String = aggregate_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.jsonl", file_name))
    }

    async fn ensure_base_dir(&self) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("Failed to create event store directory: {}", e))
    }

    async fn read_stream(path: &Path) -> Result<Vec<EventEnvelope>, String> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(path)
            .await
            .map_err(|e| format!("Failed to open event file {}: {}", path.display(), e))?;

        let mut lines = BufReader::new(file).lines();
        let mut events = Vec::new();
        let mut line_number = 0usize;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read line: {}", e))?
        {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event: EventEnvelope = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to deserialize {} line {}: {}", path.display(), line_number, e)
            })?;
            events.push(event);
        }
        Ok(events)
    }
}

#[async_trait]
impl EventStore for FileEventStore {
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;
        self.ensure_base_dir().await?;

        let file_path = self.stream_path(aggregate_id);
        let current_version = Self::read_stream(&file_path).await?.len() as u64;
        if current_version != expected_version {
            return Err(format!(
                "Version mismatch for {}: expected {}, got {}",
                aggregate_id, expected_version, current_version
            ));
        }

        let mut payload = String::new();
        for event in &events {
            let json_line = serde_json::to_string(event)
                .map_err(|e| format!("Failed to serialize event: {}", e))?;
            payload.push_str(&json_line);
            payload.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .map_err(|e| format!("Failed to open event file {}: {}", file_path.display(), e))?;
        // single write so a batch lands together
        file.write_all(payload.as_bytes())
            .await
            .map_err(|e| format!("Failed to write events: {}", e))?;
        file.flush()
            .await
            .map_err(|e| format!("Failed to flush file: {}", e))?;
        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        from_version: u64,
    ) -> Result<Vec<EventEnvelope>, String> {
        let events = Self::read_stream(&self.stream_path(aggregate_id)).await?;
        Ok(events.into_iter().skip(from_version as usize).collect())
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String> {
        self.ensure_base_dir().await?;

        let mut matching = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(|e| format!("Failed to read directory: {}", e))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read directory entry: {}", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
                continue;
            }
            matching.extend(Self::read_stream(&path).await?.into_iter().filter(|e| {
                e.event_type == event_type && from_timestamp.map_or(true, |from| e.occurred_at >= from)
            }));
        }

        matching.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(matching)
    }
}
