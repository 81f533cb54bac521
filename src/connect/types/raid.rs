use serde::Serialize;

/// A channel redirected its audience into ours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaidEvent {
    pub username: String,
    pub viewers: u64,
}
