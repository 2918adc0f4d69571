use chrono::NaiveDateTime;

use crate::WeeklySlot;

/// Turns a stream of wall-clock readings into minute ticks.
///
/// Callers may poll as often as they like; each minute is reported once,
/// on the first reading that falls inside it.
#[derive(Debug, Clone)]
pub struct MinuteClock {
    last: Option<WeeklySlot>,
    tick_counter: u64,
    running: bool,
}

impl Default for MinuteClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MinuteClock {
    pub const fn new() -> Self {
        Self {
            last: None,
            tick_counter: 0,
            running: true,
        }
    }

    /// Returns the new slot when `now` has entered a minute not yet reported.
    pub fn advance(&mut self, now: NaiveDateTime) -> Option<WeeklySlot> {
        if !self.running {
            return None;
        }

        let slot = WeeklySlot::at(now);
        if self.last == Some(slot) {
            return None;
        }

        log::trace!("minute tick {slot}");
        self.last = Some(slot);
        self.tick_counter += 1;
        Some(slot)
    }

    pub const fn current_tick(&self) -> u64 {
        self.tick_counter
    }

    pub const fn last_slot(&self) -> Option<WeeklySlot> {
        self.last
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Forgets the last reported minute, so the current one fires again.
    pub fn reset(&mut self) {
        self.last = None;
        self.tick_counter = 0;
    }
}
