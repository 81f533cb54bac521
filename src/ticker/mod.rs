mod item;
mod rotation;
mod source;

pub use item::{TickerItem, TickerSnapshot};
pub use rotation::{Rotation, RotationScheduler, RotationTimings};
pub use source::{ScheduleFile, ScheduleSource};
