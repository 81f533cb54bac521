mod publisher;
mod topic;

pub use publisher::{EventPublisher, Subscription};
pub use topic::{OverlayEvent, Topic};
