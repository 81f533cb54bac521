use super::{TickerItem, TickerSnapshot};
use crate::app_config::AppConfig;
use futures::Stream;
use std::{
    future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep_until, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationTimings {
    pub visible: Duration,
    pub hidden: Duration,
}

impl Default for RotationTimings {
    fn default() -> Self {
        Self {
            visible: Duration::from_secs(10),
            hidden: Duration::from_secs(1),
        }
    }
}

impl From<&AppConfig> for RotationTimings {
    fn from(app_config: &AppConfig) -> Self {
        Self {
            visible: app_config.ticker_visible,
            hidden: app_config.ticker_hidden,
        }
    }
}

/// Where a rotation stands. `index` always points into `filtered`, or is 0
/// while `filtered` is empty.
#[derive(Debug)]
struct RotationState {
    source: TickerSnapshot,
    filtered: Vec<TickerItem>,
    index: usize,
    phase: Phase,
}

impl RotationState {
    fn new(source: TickerSnapshot) -> Self {
        Self {
            filtered: source.upcoming(),
            source,
            index: 0,
            phase: Phase::Visible,
        }
    }

    fn load(&mut self, source: TickerSnapshot) {
        *self = Self::new(source);
    }

    fn is_idle(&self) -> bool {
        self.filtered.is_empty()
    }

    fn frame(&self) -> Option<TickerItem> {
        match self.phase {
            Phase::Visible => self.filtered.get(self.index).cloned(),
            Phase::Hidden => None,
        }
    }

    fn hold(&self, timings: &RotationTimings) -> Duration {
        match self.phase {
            Phase::Visible => timings.visible,
            Phase::Hidden => timings.hidden,
        }
    }

    fn step(&mut self) {
        match self.phase {
            Phase::Visible => self.phase = Phase::Hidden,
            Phase::Hidden => {
                self.index = (self.index + 1) % self.filtered.len().max(1);
                self.phase = Phase::Visible;
            }
        }
    }
}

enum Wake {
    Expired,
    SourceChanged(TickerSnapshot),
    Released,
}

struct RotationTask {
    source: watch::Receiver<TickerSnapshot>,
    source_open: bool,
    output: mpsc::UnboundedSender<Option<TickerItem>>,
    timings: RotationTimings,
}

impl RotationTask {
    async fn run(mut self) {
        let mut state = RotationState::new(self.source.borrow_and_update().clone());
        loop {
            let deadline = if state.is_idle() {
                None
            } else {
                if self.output.send(state.frame()).is_err() {
                    break;
                }
                Some(Instant::now() + state.hold(&self.timings))
            };
            match self.wait(deadline, &state.source).await {
                Wake::Expired => state.step(),
                Wake::SourceChanged(snapshot) => {
                    log::debug!(
                        "Ticker source changed, restarting with {} items",
                        snapshot.items.len()
                    );
                    state.load(snapshot);
                }
                Wake::Released => break,
            }
        }
        log::debug!("Rotation stopped");
    }

    /// Waits for the deadline (forever without one), a new source or the
    /// consumer going away, whichever comes first.
    async fn wait(&mut self, deadline: Option<Instant>, current: &TickerSnapshot) -> Wake {
        let expiry = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => future::pending().await,
            }
        };
        tokio::pin!(expiry);
        loop {
            tokio::select! {
                _ = &mut expiry => return Wake::Expired,
                changed = self.source.changed(), if self.source_open => match changed {
                    Ok(()) => {
                        let snapshot = self.source.borrow_and_update().clone();
                        if !snapshot.same_source(current) {
                            return Wake::SourceChanged(snapshot);
                        }
                    }
                    Err(_) => {
                        log::debug!("Ticker source closed, keeping the last list");
                        self.source_open = false;
                    }
                },
                _ = self.output.closed() => return Wake::Released,
            }
        }
    }
}

/// Starts rotations over a schedule source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationScheduler {
    timings: RotationTimings,
}

impl RotationScheduler {
    pub fn new(timings: RotationTimings) -> Self {
        Self { timings }
    }

    /// Spawns a rotation task. It yields `Some(item)` when an item becomes
    /// visible and `None` when it is hidden again, and stops once the returned
    /// stream is dropped.
    pub fn spawn(&self, source: watch::Receiver<TickerSnapshot>) -> Rotation {
        let (output, frames) = mpsc::unbounded_channel();
        let task = RotationTask {
            source,
            source_open: true,
            output,
            timings: self.timings,
        };
        Rotation {
            frames,
            task: tokio::spawn(task.run()),
        }
    }
}

#[derive(Debug)]
pub struct Rotation {
    frames: mpsc::UnboundedReceiver<Option<TickerItem>>,
    task: JoinHandle<()>,
}

impl Stream for Rotation {
    type Item = Option<TickerItem>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.frames.poll_recv(cx)
    }
}

impl Drop for Rotation {
    fn drop(&mut self) {
        self.task.abort();
    }
}
