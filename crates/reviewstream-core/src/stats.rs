//! Per-genre running statistics.
//!
//! The table never stores individual scores: each genre keeps a running
//! total and a count, and the average is derived on demand.

use enum_map::EnumMap;

use crate::event::{Genre, ReviewEvent};

/// Running total and count for one genre.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenreStats {
    pub total_score: u64,
    pub message_count: u64,
}

impl GenreStats {
    /// Mean score, or `0.0` before the first message.
    pub fn average(&self) -> f64 {
        if self.message_count == 0 {
            0.0
        } else {
            self.total_score as f64 / self.message_count as f64
        }
    }

    fn record(&mut self, score: u32) {
        self.total_score += u64::from(score);
        self.message_count += 1;
    }
}

/// Genre → [`GenreStats`], plus the order in which genres were first seen.
///
/// Entries are created lazily on a genre's first event and never removed.
/// The sum of all `message_count`s always equals [`StatsTable::total_messages`].
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    entries: EnumMap<Genre, Option<GenreStats>>,
    discovery_order: Vec<Genre>,
    total_messages: u64,
    dropped: u64,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into its genre's totals.
    pub fn ingest(&mut self, event: ReviewEvent) {
        let slot = &mut self.entries[event.genre];
        if slot.is_none() {
            self.discovery_order.push(event.genre);
        }
        slot.get_or_insert_with(GenreStats::default)
            .record(event.score);
        self.total_messages += 1;
    }

    /// Counts a message that was rejected before reaching [`Self::ingest`].
    pub fn record_drop(&mut self) {
        self.dropped += 1;
    }

    pub fn get(&self, genre: Genre) -> Option<&GenreStats> {
        self.entries[genre].as_ref()
    }

    /// Genres with their stats, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (Genre, &GenreStats)> + '_ {
        self.discovery_order
            .iter()
            .filter_map(|&genre| self.get(genre).map(|stats| (genre, stats)))
    }

    /// Successfully ingested events.
    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    /// Messages rejected as malformed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn genre_count(&self) -> usize {
        self.discovery_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discovery_order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn ingest_all(table: &mut StatsTable, events: &[(Genre, u32)]) {
        for &(genre, score) in events {
            table.ingest(ReviewEvent::new(genre, score));
        }
    }

    #[test]
    fn test_running_average_for_one_genre() {
        let mut table = StatsTable::new();
        ingest_all(&mut table, &[(Genre::Rpg, 80), (Genre::Rpg, 90)]);

        let rpg = table.get(Genre::Rpg).unwrap();
        assert_eq!(rpg.total_score, 170);
        assert_eq!(rpg.message_count, 2);
        assert!((rpg.average() - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_entries_are_created_lazily() {
        let mut table = StatsTable::new();
        assert!(table.is_empty());
        assert!(table.get(Genre::Mobile).is_none());

        table.ingest(ReviewEvent::new(Genre::Mobile, 0));

        assert_eq!(table.genre_count(), 1);
        assert_eq!(
            table.get(Genre::Mobile),
            Some(&GenreStats {
                total_score: 0,
                message_count: 1
            })
        );
        assert!(table.get(Genre::Horror).is_none());
    }

    #[test]
    fn test_iter_follows_discovery_order() {
        let mut table = StatsTable::new();
        ingest_all(
            &mut table,
            &[
                (Genre::Strategy, 60),
                (Genre::Action, 70),
                (Genre::Strategy, 80),
                (Genre::Horror, 50),
            ],
        );

        let order: Vec<Genre> = table.iter().map(|(genre, _)| genre).collect();
        assert_eq!(order, vec![Genre::Strategy, Genre::Action, Genre::Horror]);
    }

    #[test]
    fn test_invariants_hold_for_random_streams() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut table = StatsTable::new();
        let mut expected: EnumMap<Genre, (u64, u64)> = EnumMap::default();

        for step in 1..=500u64 {
            let genre = Genre::ALL[rng.gen_range(0..Genre::ALL.len())];
            let score = rng.gen_range(0..=100);
            table.ingest(ReviewEvent::new(genre, score));
            expected[genre].0 += u64::from(score);
            expected[genre].1 += 1;

            let counted: u64 = table.iter().map(|(_, s)| s.message_count).sum();
            assert_eq!(counted, step);
            assert_eq!(table.total_messages(), step);
        }

        for (genre, stats) in table.iter() {
            let (total, count) = expected[genre];
            assert_eq!(stats.total_score, total);
            assert_eq!(stats.message_count, count);
            assert!((stats.average() - total as f64 / count as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_drops_do_not_touch_genre_totals() {
        let mut table = StatsTable::new();
        table.ingest(ReviewEvent::new(Genre::Rpg, 40));
        table.record_drop();
        table.record_drop();

        assert_eq!(table.dropped(), 2);
        assert_eq!(table.total_messages(), 1);
        assert_eq!(table.get(Genre::Rpg).unwrap().message_count, 1);
    }

    #[test]
    fn test_average_of_empty_stats_is_zero() {
        assert!(GenreStats::default().average().abs() < f64::EPSILON);
    }
}
