use std::time::SystemTime;

/// Wall-clock timer for one practice attempt.
///
/// Elapsed time is always recomputed as `now - started_at`, never an
/// accumulating counter, so the display tick cadence cannot introduce drift.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    started_at: Option<SystemTime>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started_at = Some(SystemTime::now());
    }

    pub fn clear(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whole seconds since `start()`, 0 when not started.
    pub fn elapsed_secs(&self) -> u64 {
        match self.started_at {
            Some(started) => started.elapsed().map(|d| d.as_secs()).unwrap_or(0),
            None => 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, secs: u64) {
        self.started_at = SystemTime::now().checked_sub(std::time::Duration::from_secs(secs));
    }
}
