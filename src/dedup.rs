use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::info;

/// Outcome of showing a title to the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Fresh,
    AlreadySeen,
    NotToday,
}

/// Titles already encountered on the current day. Volatile: lost on restart.
#[derive(Debug, Clone)]
pub struct DedupMemory {
    current_day: NaiveDate,
    seen: HashSet<String>,
}

impl DedupMemory {
    pub fn new(today: NaiveDate) -> Self {
        DedupMemory {
            current_day: today,
            seen: HashSet::new(),
        }
    }

    pub fn current_day(&self) -> NaiveDate {
        self.current_day
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, title: &str) -> bool {
        self.seen.contains(title)
    }

    /// Advance to `today`, forgetting every title if the day changed.
    /// Returns whether a rollover happened.
    pub fn roll_to(&mut self, today: NaiveDate) -> bool {
        if today == self.current_day {
            return false;
        }
        info!(
            from = %self.current_day,
            to = %today,
            forgotten = self.seen.len(),
            "day rolled over, clearing seen titles"
        );
        self.current_day = today;
        self.seen.clear();
        true
    }

    /// Record `title` and decide whether it may be announced.
    ///
    /// The title is remembered even when the entry is not from today, so an
    /// entry is only ever considered once per day.
    pub fn observe(&mut self, title: &str, date_added: NaiveDate) -> Verdict {
        let first_time = self.seen.insert(title.to_string());
        if date_added != self.current_day {
            Verdict::NotToday
        } else if !first_time {
            Verdict::AlreadySeen
        } else {
            Verdict::Fresh
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn first_sighting_today_is_fresh() {
        let mut mem = DedupMemory::new(day("2024-05-01"));
        assert_eq!(mem.observe("Tomb", day("2024-05-01")), Verdict::Fresh);
        assert_eq!(mem.observe("Tomb", day("2024-05-01")), Verdict::AlreadySeen);
    }

    #[test]
    fn old_entries_are_remembered_but_not_today() {
        let mut mem = DedupMemory::new(day("2024-05-01"));
        assert_eq!(mem.observe("Old", day("2024-04-30")), Verdict::NotToday);
        assert!(mem.contains("Old"));
        assert_eq!(mem.len(), 1);
    }

    #[test]
    fn rollover_clears() {
        let mut mem = DedupMemory::new(day("2024-05-01"));
        mem.observe("Tomb", day("2024-05-01"));
        assert!(!mem.roll_to(day("2024-05-01")));
        assert_eq!(mem.len(), 1);

        assert!(mem.roll_to(day("2024-05-02")));
        assert_eq!(mem.len(), 0);
        assert_eq!(mem.current_day(), day("2024-05-02"));
        assert_eq!(mem.observe("Tomb", day("2024-05-02")), Verdict::Fresh);
    }
}
