use super::{TickerItem, TickerSnapshot};
use crate::json_file::{read_json, JsonFileError};
use serde::Deserialize;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::watch;

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Supplies rotations with the current schedule.
#[derive(Debug, Clone)]
pub struct ScheduleSource {
    sender: Arc<watch::Sender<TickerSnapshot>>,
}

impl ScheduleSource {
    pub fn new(initial: TickerSnapshot) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publishes a new list; running rotations restart from its first item.
    pub fn replace(&self, items: Vec<TickerItem>, current_id: Option<String>) {
        self.sender
            .send_replace(TickerSnapshot::new(items, current_id));
    }

    pub fn subscribe(&self) -> watch::Receiver<TickerSnapshot> {
        self.sender.subscribe()
    }

    pub fn snapshot(&self) -> TickerSnapshot {
        self.sender.borrow().clone()
    }
}

/// Content of the schedule file:
/// `{"currentId": "...", "items": [{"id", "title", "date", "startTime"}]}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub current_id: Option<String>,
    #[serde(default)]
    pub items: Vec<TickerItem>,
}

#[derive(Debug)]
pub struct ScheduleFile {
    path: PathBuf,
    last_seen: Option<Schedule>,
}

impl ScheduleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_seen: None,
        }
    }

    pub async fn read(&self) -> Result<Schedule, JsonFileError> {
        read_json(&self.path).await
    }

    /// Reads the file once and hands it to `source` if it changed.
    /// Returns whether the source got a new list.
    async fn refresh(&mut self, source: &ScheduleSource) -> bool {
        match self.read().await {
            Ok(schedule) if self.last_seen.as_ref() == Some(&schedule) => {
                log::trace!("Schedule {:?} unchanged", self.path);
                false
            }
            Ok(schedule) => {
                log::info!(
                    "Loaded {} scheduled streams from {:?}",
                    schedule.items.len(),
                    self.path
                );
                source.replace(schedule.items.clone(), schedule.current_id.clone());
                self.last_seen = Some(schedule);
                true
            }
            Err(err) => {
                log::warn!("Keeping the previous schedule: {}", err);
                false
            }
        }
    }

    /// Polls the file forever.
    pub async fn watch(mut self, poll_interval: Duration, source: ScheduleSource) {
        let mut interval = tokio::time::interval(poll_interval.max(MIN_POLL_INTERVAL));
        loop {
            interval.tick().await;
            self.refresh(&source).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{json_file::testing::TempFile, ticker::item::item};

    const SCHEDULE: &str = r#"{
        "currentId": "b",
        "items": [
            {"id": "a", "title": "Stream a", "date": "Monday", "startTime": "18:00"},
            {"id": "b", "title": "Stream b", "date": "Monday", "startTime": "18:00"}
        ]
    }"#;

    #[test]
    fn replacing_changes_identity() {
        let source = ScheduleSource::new(TickerSnapshot::default());
        let receiver = source.subscribe();
        let before = source.snapshot();
        source.replace(vec![item("a")], None);
        assert!(!before.same_source(&source.snapshot()));
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow().items, vec![item("a")]);
    }

    #[tokio::test]
    async fn reading_schedule_file() {
        let file = TempFile::with_content(SCHEDULE);
        let schedule = ScheduleFile::new(file.path()).read().await.unwrap();
        assert_eq!(schedule.current_id.as_deref(), Some("b"));
        assert_eq!(schedule.items, vec![item("a"), item("b")]);
    }

    #[tokio::test]
    async fn missing_fields_default_to_empty() {
        let file = TempFile::with_content("{}");
        let schedule = ScheduleFile::new(file.path()).read().await.unwrap();
        assert_eq!(schedule, Schedule::default());
    }

    #[tokio::test]
    async fn refreshing_replaces_only_on_change() {
        let file = TempFile::with_content(SCHEDULE);
        let source = ScheduleSource::new(TickerSnapshot::default());
        let mut schedule_file = ScheduleFile::new(file.path());

        assert!(schedule_file.refresh(&source).await);
        let loaded = source.snapshot();
        assert_eq!(loaded.current_id.as_deref(), Some("b"));

        assert!(!schedule_file.refresh(&source).await);
        assert!(loaded.same_source(&source.snapshot()));

        file.write(r#"{"items": [{"id": "c", "title": "Stream c", "date": "Monday", "startTime": "18:00"}]}"#);
        assert!(schedule_file.refresh(&source).await);
        assert_eq!(*source.snapshot().items, vec![item("c")]);
    }

    #[tokio::test]
    async fn broken_file_keeps_previous_schedule() {
        let file = TempFile::with_content(SCHEDULE);
        let source = ScheduleSource::new(TickerSnapshot::default());
        let mut schedule_file = ScheduleFile::new(file.path());
        assert!(schedule_file.refresh(&source).await);
        let loaded = source.snapshot();

        file.write("{ not json");
        assert!(!schedule_file.refresh(&source).await);
        assert!(loaded.same_source(&source.snapshot()));
    }
}
