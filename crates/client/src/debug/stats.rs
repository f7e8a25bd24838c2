use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: usize = 60;

/// Rolling rate over the last `WINDOW` events.
#[derive(Debug, Default)]
struct RateWindow {
    stamps: VecDeque<Instant>,
}

impl RateWindow {
    fn record(&mut self, now: Instant) {
        if self.stamps.len() >= WINDOW {
            self.stamps.pop_front();
        }
        self.stamps.push_back(now);
    }

    fn rate(&self) -> f32 {
        let (Some(first), Some(last)) = (self.stamps.front(), self.stamps.back()) else {
            return 0.0;
        };
        let elapsed = last.duration_since(*first).as_secs_f32();
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.stamps.len() - 1) as f32 / elapsed
    }

    fn last(&self) -> Option<Instant> {
        self.stamps.back().copied()
    }
}

/// Frame and snapshot rates for the status line.
#[derive(Debug, Default)]
pub struct DebugStats {
    frames: RateWindow,
    snapshots: RateWindow,
    intents_sent: u64,
}

impl DebugStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self) {
        self.record_frame_at(Instant::now());
    }

    pub fn record_snapshot(&mut self) {
        self.record_snapshot_at(Instant::now());
    }

    pub fn record_frame_at(&mut self, now: Instant) {
        self.frames.record(now);
    }

    pub fn record_snapshot_at(&mut self, now: Instant) {
        self.snapshots.record(now);
    }

    pub fn record_intent(&mut self) {
        self.intents_sent += 1;
    }

    pub fn fps(&self) -> f32 {
        self.frames.rate()
    }

    pub fn snapshot_rate(&self) -> f32 {
        self.snapshots.rate()
    }

    pub fn intents_sent(&self) -> u64 {
        self.intents_sent
    }

    /// Time since the last snapshot, if any arrived.
    pub fn snapshot_age(&self, now: Instant) -> Option<Duration> {
        self.snapshots.last().map(|last| now.duration_since(last))
    }
}
