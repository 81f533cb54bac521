use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An upcoming stream as listed in the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerItem {
    pub id: String,
    pub title: String,
    pub date: String,
    pub start_time: String,
}

/// The schedule as a rotation sees it. Two snapshots are the same source only
/// if they share the item list allocation and name the same current id.
#[derive(Debug, Clone, Default)]
pub struct TickerSnapshot {
    pub items: Arc<Vec<TickerItem>>,
    pub current_id: Option<String>,
}

impl TickerSnapshot {
    pub fn new(items: Vec<TickerItem>, current_id: Option<String>) -> Self {
        Self {
            items: Arc::new(items),
            current_id,
        }
    }

    pub fn same_source(&self, other: &TickerSnapshot) -> bool {
        Arc::ptr_eq(&self.items, &other.items) && self.current_id == other.current_id
    }

    /// Every item except the one currently live.
    pub fn upcoming(&self) -> Vec<TickerItem> {
        self.items
            .iter()
            .filter(|item| self.current_id.as_deref() != Some(item.id.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub fn item(id: &str) -> TickerItem {
    TickerItem {
        id: id.to_owned(),
        title: format!("Stream {}", id),
        date: "Monday".to_owned(),
        start_time: "18:00".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_the_list_allocation() {
        let snapshot = TickerSnapshot::new(vec![item("a")], None);
        assert!(snapshot.same_source(&snapshot.clone()));
        let equal_content = TickerSnapshot::new(vec![item("a")], None);
        assert!(!snapshot.same_source(&equal_content));
        let other_current = TickerSnapshot {
            current_id: Some("a".to_owned()),
            ..snapshot.clone()
        };
        assert!(!snapshot.same_source(&other_current));
    }

    #[test]
    fn upcoming_skips_the_live_item() {
        let snapshot = TickerSnapshot::new(
            vec![item("a"), item("b"), item("c")],
            Some("b".to_owned()),
        );
        assert_eq!(snapshot.upcoming(), vec![item("a"), item("c")]);
        let snapshot = TickerSnapshot::new(vec![item("a")], None);
        assert_eq!(snapshot.upcoming(), vec![item("a")]);
    }

    #[test]
    fn serializing_with_camel_case_keys() {
        let json = serde_json::to_value(item("a")).unwrap();
        assert_eq!(json["startTime"], "18:00");
        assert_eq!(json["title"], "Stream a");
    }
}
