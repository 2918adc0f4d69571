use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{ParseError, TimeOfDay, Weekday};

/// A recurring minute in the week. Orders by day (Sunday first), then time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub day: Weekday,
    pub time: TimeOfDay,
}

impl WeeklySlot {
    pub const fn new(day: Weekday, time: TimeOfDay) -> Self {
        Self { day, time }
    }

    /// The slot a local timestamp falls in.
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            day: now.weekday().into(),
            time: TimeOfDay::of(&now),
        }
    }
}

impl FromStr for WeeklySlot {
    type Err = ParseError;

    /// Parses `"<day> HH:MM"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, time) = s
            .trim()
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| ParseError::BadSlot(s.to_owned()))?;
        Ok(Self {
            day: day.parse()?,
            time: time.parse()?,
        })
    }
}

impl fmt::Display for WeeklySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.time)
    }
}

/// Anything that recurs at a weekly slot.
pub trait Scheduled {
    fn slot(&self) -> WeeklySlot;
}

impl Scheduled for WeeklySlot {
    fn slot(&self) -> WeeklySlot {
        *self
    }
}

impl<T: Scheduled + ?Sized> Scheduled for &T {
    fn slot(&self) -> WeeklySlot {
        (**self).slot()
    }
}

/// Sorts into week order. Stable: items sharing a slot keep their input order.
pub fn sort_weekly<T: Scheduled>(items: &mut [T]) {
    items.sort_by_key(Scheduled::slot);
}

/// Items that fall due at exactly `slot`.
pub fn due_at<T: Scheduled>(items: &[T], slot: WeeklySlot) -> Vec<&T> {
    items.iter().filter(|item| item.slot() == slot).collect()
}

#[cfg(test)]
mod slot_tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, PartialEq)]
    struct Bell {
        name: &'static str,
        slot: WeeklySlot,
    }

    impl Scheduled for Bell {
        fn slot(&self) -> WeeklySlot {
            self.slot
        }
    }

    fn slot(s: &str) -> WeeklySlot {
        s.parse().unwrap()
    }

    fn bell(name: &'static str, at: &str) -> Bell {
        Bell { name, slot: slot(at) }
    }

    #[test]
    fn parses_day_and_time() {
        let parsed = slot("Monday 08:15");
        assert_eq!(parsed.day, Weekday::Monday);
        assert_eq!(parsed.time, TimeOfDay::new(8, 15).unwrap());
        assert_eq!(slot("שני 08:15"), parsed);
        assert_eq!(parsed.to_string(), "Monday 08:15");
    }

    #[test]
    fn rejects_incomplete_slots() {
        assert!(matches!(
            "Monday".parse::<WeeklySlot>(),
            Err(ParseError::BadSlot(_))
        ));
        assert!(matches!(
            "Mooday 08:15".parse::<WeeklySlot>(),
            Err(ParseError::UnknownDay(_))
        ));
        assert!(matches!(
            "Monday 8:15".parse::<WeeklySlot>(),
            Err(ParseError::BadTimeFormat(_))
        ));
    }

    #[test]
    fn slot_of_a_timestamp() {
        // 2024-06-02 was a Sunday.
        let now = NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(10, 30, 42)
            .unwrap();
        assert_eq!(WeeklySlot::at(now), slot("Sunday 10:30"));
    }

    #[test]
    fn sorts_sunday_first_then_by_time() {
        let mut bells = vec![
            bell("sat", "Saturday 07:00"),
            bell("mon-late", "Monday 12:00"),
            bell("sun", "Sunday 23:59"),
            bell("mon-early", "Monday 08:00"),
        ];
        sort_weekly(&mut bells);
        let names: Vec<_> = bells.iter().map(|b| b.name).collect();
        assert_eq!(names, ["sun", "mon-early", "mon-late", "sat"]);
    }

    #[test]
    fn sort_keeps_ties_in_input_order() {
        let mut bells = vec![bell("b", "Tuesday 09:00"), bell("a", "Tuesday 09:00")];
        sort_weekly(&mut bells);
        assert_eq!(bells[0].name, "b");
    }

    #[test]
    fn due_matches_exact_slot_only() {
        let bells = vec![
            bell("first", "Wednesday 10:00"),
            bell("other-day", "Thursday 10:00"),
            bell("other-minute", "Wednesday 10:01"),
            bell("second", "Wednesday 10:00"),
        ];
        let due = due_at(&bells, slot("Wednesday 10:00"));
        let names: Vec<_> = due.iter().map(|b| b.name).collect();
        assert_eq!(names, ["first", "second"]);
        assert!(due_at(&bells, slot("Friday 10:00")).is_empty());
    }

    #[test]
    fn sorts_borrowed_views() {
        let bells = [bell("late", "Friday 16:00"), bell("early", "Friday 08:00")];
        let mut views: Vec<&Bell> = bells.iter().collect();
        sort_weekly(&mut views);
        assert_eq!(views[0].name, "early");
    }
}
