//! Elapsed-time ticker for an active recording

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration as TokioDuration, Instant, MissedTickBehavior};

use crate::domain::recording::ElapsedTime;

/// Tick period. Coarser than fragment emission; it only drives a `mm:ss` clock.
pub const TICK_INTERVAL: TokioDuration = TokioDuration::from_secs(1);

/// Callback invoked on every tick with the elapsed time
pub type TickCallback = Arc<dyn Fn(ElapsedTime) + Send + Sync>;

/// Reports elapsed time since a reference instant, once per second.
#[derive(Debug, Default)]
pub struct RecordingTimer {
    started_at: Option<Instant>,
    ticker: Option<JoinHandle<()>>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking from `started_at`. A running ticker is replaced.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, started_at: Instant, on_tick: Option<TickCallback>) {
        self.stop();
        self.started_at = Some(started_at);

        if let Some(on_tick) = on_tick {
            self.ticker = Some(tokio::spawn(async move {
                let mut ticks = interval_at(started_at + TICK_INTERVAL, TICK_INTERVAL);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticks.tick().await;
                    on_tick(ElapsedTime::from_std(started_at.elapsed()));
                }
            }));
        }
    }

    /// Cancel the periodic tick. Idempotent.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Stop and forget the reference instant
    pub fn clear(&mut self) {
        self.stop();
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Elapsed time since the reference instant, zero if never started
    pub fn elapsed(&self) -> ElapsedTime {
        self.started_at
            .map(|start| ElapsedTime::from_std(start.elapsed()))
            .unwrap_or_default()
    }
}

impl Drop for RecordingTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collecting() -> (TickCallback, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb: TickCallback = Arc::new(move |elapsed| {
            sink.lock().unwrap().push(elapsed.to_string());
        });
        (cb, seen)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second() {
        let (cb, seen) = collecting();
        let mut timer = RecordingTimer::new();
        timer.start(Instant::now(), Some(cb));

        tokio::time::sleep(TokioDuration::from_millis(3_500)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["00:01", "00:02", "00:03"]);
        assert_eq!(timer.elapsed().to_string(), "00:03");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_ticks_and_is_idempotent() {
        let (cb, seen) = collecting();
        let mut timer = RecordingTimer::new();
        timer.start(Instant::now(), Some(cb));

        tokio::time::sleep(TokioDuration::from_millis(1_500)).await;
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());

        tokio::time::sleep(TokioDuration::from_secs(5)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_without_callback() {
        let mut timer = RecordingTimer::new();
        assert_eq!(timer.elapsed().to_string(), "00:00");

        timer.start(Instant::now(), None);
        assert!(!timer.is_running());
        tokio::time::sleep(TokioDuration::from_secs(61)).await;
        assert_eq!(timer.elapsed().to_string(), "01:01");

        timer.clear();
        assert!(timer.started_at().is_none());
        assert_eq!(timer.elapsed().as_millis(), 0);
    }
}
