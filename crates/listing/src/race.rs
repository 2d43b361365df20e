//! Dialect racing: feed each incoming line to every raced dialect at once,
//! track per-dialect cumulative error counts, and lock in a winner once
//! its lead over the runner-up is decisive.

use crate::dialect::{DIALECTS, ParseOutcome};
use crate::file_info::FileSet;

/// Once the second-best parser's error count exceeds
/// `(best + 1) * DIALECT_LOCK_MARGIN`, the race is decided: the rest of
/// the listing is parsed with the leading dialect alone.
const DIALECT_LOCK_MARGIN: u32 = 16;

/// A line-at-a-time racer across all raced dialects. One `feed_line` call
/// per scheduler step keeps long listings from blocking the event loop.
pub struct DialectRace {
    errors: [u32; DIALECTS.len()],
    sets: Vec<FileSet>,
    locked: Option<usize>,
    tz: time::UtcOffset,
}

impl DialectRace {
    #[must_use]
    pub fn new(tz: time::UtcOffset) -> Self {
        Self {
            errors: [0; DIALECTS.len()],
            sets: (0..DIALECTS.len()).map(|_| FileSet::new()).collect(),
            locked: None,
            tz,
        }
    }

    /// Feeds one more line of listing output to whichever dialects are
    /// still in the race.
    pub fn feed_line(&mut self, line: &str) {
        if let Some(winner) = self.locked {
            match (DIALECTS[winner].parse)(line, self.tz) {
                ParseOutcome::Entry(info) => self.sets[winner].add(info),
                ParseOutcome::Skip | ParseOutcome::Error => {}
            }
            return;
        }

        for (i, dialect) in DIALECTS.iter().enumerate() {
            match (dialect.parse)(line, self.tz) {
                ParseOutcome::Entry(info) => self.sets[i].add(info),
                ParseOutcome::Skip => {}
                ParseOutcome::Error => self.errors[i] += 1,
            }
        }

        self.try_lock_in();
    }

    fn try_lock_in(&mut self) {
        let mut best = 0usize;
        let mut second = 0usize;
        for i in 1..self.errors.len() {
            if self.errors[i] < self.errors[best] {
                second = best;
                best = i;
            } else if self.errors[i] < self.errors[second] || second == best {
                second = i;
            }
        }
        if best == second {
            return;
        }
        let best_err = self.errors[best];
        let second_err = self.errors[second];
        if second_err > (best_err + 1) * DIALECT_LOCK_MARGIN {
            self.locked = Some(best);
        }
    }

    /// Finalizes the race: if no dialect locked in outright, the one with
    /// the fewest accumulated errors wins.
    #[must_use]
    pub fn finish(mut self) -> (FileSet, &'static str) {
        let winner = self.locked.unwrap_or_else(|| {
            (0..self.errors.len())
                .min_by_key(|&i| self.errors[i])
                .expect("DIALECTS is non-empty")
        });
        (std::mem::take(&mut self.sets[winner]), DIALECTS[winner].name)
    }

    /// Name of the dialect currently leading, for diagnostics.
    #[must_use]
    pub fn leader(&self) -> &'static str {
        if let Some(i) = self.locked {
            return DIALECTS[i].name;
        }
        let best = (0..self.errors.len())
            .min_by_key(|&i| self.errors[i])
            .expect("DIALECTS is non-empty");
        DIALECTS[best].name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_lines_win_against_dos_formatted_input() {
        let mut race = DialectRace::new(time::UtcOffset::UTC);
        for line in [
            "-rwxr-xr-x   1 lav      root         4771 Sep 12  1996 install-sh",
            "drwxr-xr-x   4 lav      root         1024 Feb 22 15:32 lib",
            "-rw-r--r--   1 lav      root          100 Jan  1  2001 readme",
        ] {
            race.feed_line(line);
        }
        assert_eq!(race.leader(), "unix");
        let (set, name) = race.finish();
        assert_eq!(name, "unix");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn dos_lines_win_against_unix_formatted_input() {
        let mut race = DialectRace::new(time::UtcOffset::UTC);
        for line in [
            "07-13-98  09:06PM       <DIR>          aix",
            "03-18-98  06:01AM              2109440 nlxb318e.tar",
        ] {
            race.feed_line(line);
        }
        let (set, name) = race.finish();
        assert_eq!(name, "dos");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn a_decisive_lead_locks_in_before_the_listing_ends() {
        let mut race = DialectRace::new(time::UtcOffset::UTC);
        for _ in 0..40 {
            race.feed_line("-rw-r--r--   1 lav      root          100 Jan  1  2001 readme");
        }
        assert!(race.locked.is_some());
    }
}
