use std::time::{Duration, Instant};

/// Periodic refresh for views that poll their data.
///
/// Nothing runs in the background: the owner calls [`poll`](Self::poll) from
/// its tick handler and reloads when it returns `true`. A stopped schedule
/// never fires.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Starts counting from `now`; the first refresh is one interval later.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Whether a refresh is due at `now`. Firing schedules the next one a full
    /// interval later.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(30));
        schedule.start(start);

        assert!(!schedule.poll(start + Duration::from_secs(29)));
        assert!(schedule.poll(start + Duration::from_secs(30)));
        assert!(!schedule.poll(start + Duration::from_secs(31)));
        assert!(schedule.poll(start + Duration::from_secs(61)));
    }

    #[test]
    fn stopped_schedule_never_fires() {
        let start = Instant::now();
        let mut schedule = RefreshSchedule::default();
        assert!(!schedule.poll(start + Duration::from_secs(300)));

        schedule.start(start);
        schedule.stop();
        assert!(!schedule.is_running());
        assert!(!schedule.poll(start + Duration::from_secs(300)));
    }
}
