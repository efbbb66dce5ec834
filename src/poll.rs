//! Fixed-interval refresh driver
//!
//! The loop owns no thread or timer. The view calls [`PollLoop::poll`] on every
//! frame and asks [`PollLoop::time_until_next`] when to wake up again, so all
//! reads and toggle writes happen on the UI thread.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::binding::{BindingError, BlinkPhase, FieldId};
use crate::config::ConfigStore;

/// Something that owns bindings refreshed on every tick
pub trait PollTarget {
    fn refresh_from(&mut self, store: &ConfigStore, phase: BlinkPhase) -> RefreshReport;
}

/// Result of refreshing every binding of a target once
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub changed: usize,
    pub errors: Vec<BindingError>,
}

impl RefreshReport {
    /// Fold one binding's refresh result into the report
    pub fn record(&mut self, result: Result<bool, BindingError>) {
        match result {
            Ok(true) => self.changed += 1,
            Ok(false) => {}
            Err(e) => self.errors.push(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// File loaded; `failed` bindings kept their previous value
    Refreshed { changed: usize, failed: usize },
    /// File could not be loaded; nothing was refreshed
    Skipped,
}

pub struct PollLoop {
    period: Duration,
    next_due: Option<Instant>,
    state: LoopState,
    load_failing: bool,
    failing_fields: HashSet<FieldId>,
    ticks: u64,
}

impl PollLoop {
    /// A new loop is due immediately
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
            state: LoopState::Idle,
            load_failing: false,
            failing_fields: HashSet::new(),
            ticks: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.state() == LoopState::Idle && self.next_due.is_none_or(|due| now >= due)
    }

    /// Time left until the next tick, `None` once cancelled
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if self.state == LoopState::Cancelled {
            return None;
        }
        Some(
            self.next_due
                .map_or(Duration::ZERO, |due| due.saturating_duration_since(now)),
        )
    }

    /// Stop scheduling; later calls to [`poll`](Self::poll) never tick again
    pub fn cancel(&mut self) {
        if self.state != LoopState::Cancelled {
            info!(ticks = self.ticks, "Poll loop cancelled");
        }
        self.state = LoopState::Cancelled;
    }

    /// Run one tick if it is due
    pub fn poll<T: PollTarget>(
        &mut self,
        now: Instant,
        store: &mut ConfigStore,
        target: &mut T,
    ) -> Option<TickOutcome> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.tick(now, store, target, BlinkPhase::now()))
    }

    fn tick<T: PollTarget>(
        &mut self,
        now: Instant,
        store: &mut ConfigStore,
        target: &mut T,
        phase: BlinkPhase,
    ) -> TickOutcome {
        self.next_due = Some(now + self.period);
        self.ticks += 1;

        if let Err(e) = store.load() {
            if self.load_failing {
                debug!(error = %e, "Config still unavailable, keeping last values");
            } else if e.is_not_found() {
                warn!(path = %store.path().display(), "Config file missing, keeping last values");
            } else {
                warn!(error = %e, "Config unavailable, keeping last values");
            }
            self.load_failing = true;
            return TickOutcome::Skipped;
        }
        if self.load_failing {
            info!(path = %store.path().display(), "Config readable again");
            self.load_failing = false;
        }

        let report = target.refresh_from(store, phase);
        self.note_field_errors(&report.errors);

        let outcome = TickOutcome::Refreshed {
            changed: report.changed,
            failed: report.errors.len(),
        };
        trace!(?outcome, "Poll tick");
        outcome
    }

    fn note_field_errors(&mut self, errors: &[BindingError]) {
        let mut failing = HashSet::with_capacity(errors.len());

        for error in errors {
            let Some(field) = error.field() else {
                warn!(error = %error, "Refresh failed");
                continue;
            };
            if self.failing_fields.contains(field) {
                debug!(field = %field, error = %error, "Still keeping last value");
            } else {
                warn!(field = %field, error = %error, "Keeping last value");
            }
            failing.insert(field.clone());
        }

        for field in self.failing_fields.difference(&failing) {
            info!(field = %field, "Field no longer failing");
        }
        self.failing_fields = failing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::FieldBinding;
    use std::fs;

    struct Fields(Vec<FieldBinding>);

    impl PollTarget for Fields {
        fn refresh_from(&mut self, store: &ConfigStore, phase: BlinkPhase) -> RefreshReport {
            let mut report = RefreshReport::default();
            for field in &mut self.0 {
                report.record(field.refresh_at(store, phase));
            }
            report
        }
    }

    fn fields() -> Fields {
        Fields(vec![
            FieldBinding::integer("Character1", "hp_level", 0),
            FieldBinding::flag("Character1", "auto_aim_state", false),
        ])
    }

    fn setup(contents: &str) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, contents).unwrap();
        let store = ConfigStore::new(&path);
        (dir, store)
    }

    #[test]
    fn test_first_poll_is_immediate_then_waits_a_period() {
        let (_dir, mut store) = setup("[Character1]\nhp_level=50\nauto_aim_state=1\n");
        let mut target = fields();
        let mut poll = PollLoop::new(Duration::from_millis(100));
        let start = Instant::now();

        assert_eq!(
            poll.poll(start, &mut store, &mut target),
            Some(TickOutcome::Refreshed { changed: 2, failed: 0 })
        );
        assert_eq!(target.0[0].as_integer(), Some(50));

        assert_eq!(poll.poll(start + Duration::from_millis(50), &mut store, &mut target), None);
        assert_eq!(
            poll.time_until_next(start + Duration::from_millis(50)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(
            poll.poll(start + Duration::from_millis(100), &mut store, &mut target),
            Some(TickOutcome::Refreshed { changed: 0, failed: 0 })
        );
        assert_eq!(poll.ticks(), 2);
    }

    #[test]
    fn test_external_change_picked_up_on_next_tick() {
        let (dir, mut store) = setup("[Character1]\nhp_level=50\n");
        let mut target = fields();
        let mut poll = PollLoop::new(Duration::from_millis(100));
        let start = Instant::now();
        poll.poll(start, &mut store, &mut target);

        fs::write(dir.path().join("config.ini"), "[Character1]\nhp_level=12\n").unwrap();
        poll.poll(start + Duration::from_millis(100), &mut store, &mut target);

        assert_eq!(target.0[0].as_integer(), Some(12));
    }

    #[test]
    fn test_missing_file_keeps_values_and_loop_continues() {
        let (dir, mut store) = setup("[Character1]\nhp_level=50\nauto_aim_state=1\n");
        let path = dir.path().join("config.ini");
        let mut target = fields();
        let mut poll = PollLoop::new(Duration::from_millis(100));
        let start = Instant::now();
        poll.poll(start, &mut store, &mut target);

        fs::remove_file(&path).unwrap();
        for i in 1..=3 {
            let outcome = poll.poll(start + Duration::from_millis(100 * i), &mut store, &mut target);
            assert_eq!(outcome, Some(TickOutcome::Skipped));
        }
        assert_eq!(target.0[0].as_integer(), Some(50));
        assert_eq!(target.0[1].as_flag(), Some(true));
        assert_eq!(poll.state(), LoopState::Idle);

        fs::write(&path, "[Character1]\nhp_level=49\nauto_aim_state=1\n").unwrap();
        let outcome = poll.poll(start + Duration::from_millis(400), &mut store, &mut target);
        assert_eq!(outcome, Some(TickOutcome::Refreshed { changed: 1, failed: 0 }));
    }

    #[test]
    fn test_malformed_field_is_contained() {
        let (_dir, mut store) = setup("[Character1]\nhp_level=oops\nauto_aim_state=1\n");
        let mut target = fields();
        target.0[0] = FieldBinding::integer("Character1", "hp_level", 77);
        let mut poll = PollLoop::new(Duration::from_millis(100));

        let outcome = poll.poll(Instant::now(), &mut store, &mut target);

        assert_eq!(outcome, Some(TickOutcome::Refreshed { changed: 1, failed: 1 }));
        assert_eq!(target.0[0].as_integer(), Some(77));
        assert_eq!(target.0[1].as_flag(), Some(true));
    }

    #[test]
    fn test_cancelled_loop_never_ticks() {
        let (_dir, mut store) = setup("[Character1]\nhp_level=50\n");
        let mut target = fields();
        let mut poll = PollLoop::new(Duration::from_millis(100));
        let start = Instant::now();
        poll.poll(start, &mut store, &mut target);

        poll.cancel();

        assert_eq!(poll.state(), LoopState::Cancelled);
        assert_eq!(poll.time_until_next(start), None);
        assert_eq!(
            poll.poll(start + Duration::from_secs(10), &mut store, &mut target),
            None
        );
        assert_eq!(poll.ticks(), 1);
    }

    #[test]
    fn test_tick_passes_blink_phase() {
        let (_dir, mut store) = setup("[Character1]\nhp_level=5\n");
        let mut target = Fields(vec![
            FieldBinding::integer("Character1", "hp_level", 0).with_low_threshold(20),
        ]);
        let mut poll = PollLoop::new(Duration::from_millis(100));
        let theme = crate::binding::Theme::MONITOR;

        poll.tick(Instant::now(), &mut store, &mut target, BlinkPhase::Off);
        assert_eq!(
            target.0[0].display(&theme).style,
            crate::binding::DisplayStyle::Color(theme.background)
        );

        poll.tick(Instant::now(), &mut store, &mut target, BlinkPhase::On);
        assert_eq!(
            target.0[0].display(&theme).style,
            crate::binding::DisplayStyle::Color(theme.low)
        );
    }
}
