//! Chart data derived from a [`StatsTable`].
//!
//! Both dashboards draw from this snapshot, so the numbers on screen and in
//! the plain table are computed in one place.

use crate::event::Genre;
use crate::stats::StatsTable;

/// One bar: a genre's average score.
#[derive(Debug, Clone, PartialEq)]
pub struct BarDatum {
    pub genre: Genre,
    pub average: f64,
}

/// One pie slice: a genre's share of all ingested messages.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceDatum {
    pub genre: Genre,
    pub count: u64,
    /// Fraction of the total, `0.0..=1.0`.
    pub share: f64,
}

/// Snapshot of everything the dashboards show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub bars: Vec<BarDatum>,
    pub slices: Vec<SliceDatum>,
    pub total: u64,
    pub dropped: u64,
}

impl ChartData {
    /// Computes bars and slices in the table's discovery order.
    ///
    /// Genres without messages are skipped. Pure: the same table always
    /// yields the same data.
    pub fn from_table(table: &StatsTable) -> Self {
        let total = table.total_messages();
        let mut bars = Vec::with_capacity(table.genre_count());
        let mut slices = Vec::with_capacity(table.genre_count());

        for (genre, stats) in table.iter().filter(|(_, s)| s.message_count > 0) {
            bars.push(BarDatum {
                genre,
                average: stats.average(),
            });
            slices.push(SliceDatum {
                genre,
                count: stats.message_count,
                share: stats.message_count as f64 / total as f64,
            });
        }

        Self {
            bars,
            slices,
            total,
            dropped: table.dropped(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ReviewEvent;

    #[test]
    fn test_equal_counts_give_equal_slices() {
        let mut table = StatsTable::new();
        table.ingest(ReviewEvent::new(Genre::Rpg, 100));
        table.ingest(ReviewEvent::new(Genre::Shooter, 50));

        let chart = ChartData::from_table(&table);

        assert_eq!(chart.total, 2);
        assert_eq!(chart.slices.len(), 2);
        assert!((chart.slices[0].share - 0.5).abs() < f64::EPSILON);
        assert!((chart.slices[1].share - 0.5).abs() < f64::EPSILON);
        assert_eq!(chart.bars[0].genre, Genre::Rpg);
        assert!((chart.bars[0].average - 100.0).abs() < f64::EPSILON);
        assert_eq!(chart.bars[1].genre, Genre::Shooter);
        assert!((chart.bars[1].average - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_is_stable_without_new_events() {
        let mut table = StatsTable::new();
        table.ingest(ReviewEvent::new(Genre::Sports, 61));
        table.ingest(ReviewEvent::new(Genre::Fps, 73));
        table.record_drop();

        let first = ChartData::from_table(&table);
        let second = ChartData::from_table(&table);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shares_sum_to_one() {
        let mut table = StatsTable::new();
        for (i, genre) in Genre::ALL.into_iter().enumerate() {
            for _ in 0..=i {
                table.ingest(ReviewEvent::new(genre, 70));
            }
        }

        let chart = ChartData::from_table(&table);
        let sum: f64 = chart.slices.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(chart.slices.last().unwrap().count, Genre::ALL.len() as u64);
    }

    #[test]
    fn test_empty_table_has_no_bars() {
        let chart = ChartData::from_table(&StatsTable::new());
        assert!(chart.is_empty());
        assert_eq!(chart.total, 0);
    }
}
