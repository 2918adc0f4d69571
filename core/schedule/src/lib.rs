//! Weekly schedule vocabulary shared by the panel and the appliance loop.

pub mod clock;
pub mod slot;
pub mod time_of_day;
pub mod weekday;

pub use clock::MinuteClock;
pub use slot::{Scheduled, WeeklySlot, due_at, sort_weekly};
pub use time_of_day::TimeOfDay;
pub use weekday::Weekday;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown day '{0}'")]
    UnknownDay(String),

    #[error("time '{0}' is not in HH:MM format")]
    BadTimeFormat(String),

    #[error("time '{0}' is out of range")]
    TimeOutOfRange(String),

    #[error("slot '{0}' must look like '<day> HH:MM'")]
    BadSlot(String),
}
