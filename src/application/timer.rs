//! Elapsed recording time
//!
//! A repeating task republishes the elapsed time while the timer runs. Each
//! tick recomputes the value from a fixed reference instant instead of
//! incrementing, so scheduling jitter never accumulates.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// How often the published value is refreshed
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Default)]
struct Published {
    /// Bumped on every freeze/reset so a late tick from a cancelled run is ignored
    epoch: u64,
    elapsed_ms: u64,
}

/// Start/freeze/reset stopwatch backed by a scheduled tick.
pub struct ElapsedTimer {
    published: Arc<Mutex<Published>>,
    reference: Option<Instant>,
    ticker: Option<JoinHandle<()>>,
    tick_interval: Duration,
}

impl ElapsedTimer {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            published: Arc::new(Mutex::new(Published::default())),
            reference: None,
            ticker: None,
            tick_interval,
        }
    }

    /// Last published elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        lock(&self.published).elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start ticking, continuing from the currently published value.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        let (epoch, frozen) = {
            let published = lock(&self.published);
            (published.epoch, Duration::from_millis(published.elapsed_ms))
        };
        let now = Instant::now();
        let reference = now.checked_sub(frozen).unwrap_or(now);
        self.reference = Some(reference);

        let published = Arc::clone(&self.published);
        let period = self.tick_interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                publish(&published, epoch, reference);
            }
        }));
    }

    /// Stop ticking and hold the exact elapsed time at this instant
    pub fn freeze(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        let mut published = lock(&self.published);
        if let Some(reference) = self.reference.take() {
            let ms = millis_since(reference);
            published.elapsed_ms = published.elapsed_ms.max(ms);
        }
        published.epoch += 1;
    }

    /// Stop ticking and go back to zero
    pub fn reset(&mut self) {
        self.freeze();
        lock(&self.published).elapsed_ms = 0;
    }
}

impl Default for ElapsedTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Drop for ElapsedTimer {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn publish(published: &Mutex<Published>, epoch: u64, reference: Instant) {
    let ms = millis_since(reference);
    let mut published = lock(published);
    if published.epoch == epoch {
        published.elapsed_ms = published.elapsed_ms.max(ms);
    }
}

fn millis_since(reference: Instant) -> u64 {
    u64::try_from(reference.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn lock(published: &Mutex<Published>) -> std::sync::MutexGuard<'_, Published> {
    published.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn advances_while_running() {
        let mut timer = ElapsedTimer::default();
        timer.run();
        sleep(Duration::from_millis(1000)).await;

        let published = timer.elapsed_ms();
        assert!((800..=1000).contains(&published), "got {published}");

        timer.freeze();
        assert_eq!(timer.elapsed_ms(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn frozen_value_is_constant() {
        let mut timer = ElapsedTimer::default();
        timer.run();
        sleep(Duration::from_millis(1500)).await;
        timer.freeze();

        sleep(Duration::from_secs(10)).await;
        assert_eq!(timer.elapsed_ms(), 1500);
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn resumes_from_frozen_value() {
        let mut timer = ElapsedTimer::default();
        timer.run();
        sleep(Duration::from_millis(1000)).await;
        timer.freeze();
        sleep(Duration::from_secs(3)).await;

        timer.run();
        sleep(Duration::from_millis(500)).await;
        timer.freeze();
        assert_eq!(timer.elapsed_ms(), 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn published_value_never_decreases() {
        let mut timer = ElapsedTimer::new(Duration::from_millis(50));
        timer.run();
        let mut last = 0;
        for _ in 0..20 {
            sleep(Duration::from_millis(37)).await;
            let now = timer.elapsed_ms();
            assert!(now >= last);
            last = now;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_zero() {
        let mut timer = ElapsedTimer::default();
        timer.run();
        sleep(Duration::from_secs(2)).await;
        timer.reset();
        assert_eq!(timer.elapsed_ms(), 0);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(timer.elapsed_ms(), 0);
    }
}
