use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

/// How cycles are paced. Both policies appear in practice: polling once a
/// second, or spinning as fast as frames and inference allow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulePolicy {
    FixedInterval(Duration),
    Continuous,
}

/// Paces the detection loop according to a `SchedulePolicy`.
///
/// The fixed-interval ticker holds at most one pending trigger: ticks that
/// fire while a cycle is still running are dropped, never queued, so a slow
/// cycle can not build up a backlog of inferences.
pub struct Scheduler {
    ticker: Option<Receiver<Instant>>,
}

impl Scheduler {
    pub fn new(policy: SchedulePolicy) -> Self {
        let ticker = match policy {
            SchedulePolicy::FixedInterval(interval) => Some(crossbeam_channel::tick(interval)),
            SchedulePolicy::Continuous => None,
        };
        Self { ticker }
    }

    /// Block until the next cycle may start. Immediate under `Continuous`.
    pub fn wait(&self) {
        if let Some(rx) = &self.ticker {
            // Only errors if the ticker is disconnected, which tick() never is.
            let _ = rx.recv();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_wait_is_immediate() {
        let scheduler = Scheduler::new(SchedulePolicy::Continuous);
        let start = Instant::now();
        for _ in 0..100 {
            scheduler.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_fixed_interval_paces_cycles() {
        let scheduler = Scheduler::new(SchedulePolicy::FixedInterval(Duration::from_millis(10)));
        let start = Instant::now();
        scheduler.wait();
        scheduler.wait();
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn test_missed_ticks_coalesce_to_one_pending_trigger() {
        let scheduler = Scheduler::new(SchedulePolicy::FixedInterval(Duration::from_millis(20)));

        // Simulate a cycle that runs for several intervals.
        std::thread::sleep(Duration::from_millis(110));

        // Exactly one trigger is pending: the first wait returns at once...
        let t = Instant::now();
        scheduler.wait();
        assert!(t.elapsed() < Duration::from_millis(10));

        // ...and the next one has to wait for a fresh tick.
        let t = Instant::now();
        scheduler.wait();
        assert!(t.elapsed() >= Duration::from_millis(5));
    }
}
