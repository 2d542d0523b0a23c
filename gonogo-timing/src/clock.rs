use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Millisecond clock that drives trial timing
pub trait Clock: Clone + Send + Sync {
    /// Monotonic milliseconds since the clock's origin.
    fn now_ms(&self) -> u64;
    /// Wall-clock milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> u64;
    fn sleep(&self, d: Duration);

    fn elapsed_ms(&self, since_ms: u64) -> u64 {
        self.now_ms().saturating_sub(since_ms)
    }

    /// Blocks until `deadline_ms`; returns at once if it already passed.
    fn sleep_until(&self, deadline_ms: u64) {
        let now = self.now_ms();
        if deadline_ms > now {
            self.sleep(Duration::from_millis(deadline_ms - now));
        }
    }
}

/// Real clock: `Instant` for ordering, with the epoch sampled once at
/// construction so wall-clock stamps never run backwards within a session.
#[derive(Debug, Clone)]
pub struct HighPrecisionClock {
    start: Instant,
    epoch_origin_ms: u64,
}

impl Clock for HighPrecisionClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_origin_ms + self.now_ms()
    }

    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionClock {
    pub fn new() -> Self {
        let epoch_origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            start: Instant::now(),
            epoch_origin_ms,
        }
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        self.portable_sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR};

        let mut req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };
        let mut rem = timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        loop {
            let rc = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &req, &mut rem) };
            if rc != EINTR {
                break;
            }
            req = rem;
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn portable_sleep(&self, duration: Duration) {
        // OS sleep for the bulk, spin the last millisecond
        let deadline = Instant::now() + duration;
        if duration > Duration::from_millis(2) {
            std::thread::sleep(duration - Duration::from_millis(1));
        }
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

impl Default for HighPrecisionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and advance the clock a sequencer reads from.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
    epoch_origin_ms: u64,
}

impl ManualClock {
    pub fn new(epoch_origin_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(0)),
            epoch_origin_ms,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_origin_ms + self.now_ms()
    }

    /// Sleeping just moves time forward.
    fn sleep(&self, d: Duration) {
        self.advance(d.as_millis() as u64);
    }
}
