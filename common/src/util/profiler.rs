use log::Level;
use std::time::{Duration, Instant};

/// Logs how long a scope took when dropped.
pub struct ScopedTimer {
    name: String,
    level: Level,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_level(name, Level::Info)
    }

    /// For timers that fire too often for `info`, e.g. once per net.
    pub fn with_level(name: impl Into<String>, level: Level) -> Self {
        Self {
            name: name.into(),
            level,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::log!(self.level, "{} took {:?}", self.name, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_monotonic() {
        let timer = ScopedTimer::with_level("test", Level::Trace);
        let first = timer.elapsed();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed() > first);
    }
}
