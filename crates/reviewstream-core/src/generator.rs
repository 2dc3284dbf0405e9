//! Synthetic review generator.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::event::{Genre, ReviewEvent, SCORE_MAX, UnknownGenre};

/// Rejected generator settings. Raised at construction, never while
/// generating.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("score range {min}..={max} must lie within 0..=100 with min <= max")]
    InvalidScoreRange { min: u32, max: u32 },
    #[error("invalid genre weight: {0}")]
    UnknownWeightedGenre(#[from] UnknownGenre),
    #[error("genre weights must include at least one positive weight")]
    NoPositiveWeight,
    #[error("genre weights add up to more than 4294967295")]
    WeightTotalOverflow,
}

#[derive(Debug, Clone)]
enum GenrePicker {
    Uniform,
    Weighted {
        genres: Vec<Genre>,
        index: WeightedIndex<u32>,
    },
}

/// Produces an unbounded stream of random [`ReviewEvent`]s.
#[derive(Debug, Clone)]
pub struct Generator<R = StdRng> {
    rng: R,
    picker: GenrePicker,
    min_score: u32,
    max_score: u32,
}

impl Generator<StdRng> {
    /// Builds a generator from config, seeded from `config.seed` or entropy.
    ///
    /// # Errors
    /// Returns a [`GeneratorError`] if the score range or weights are invalid.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::with_rng(rng, config)
    }
}

impl<R: Rng> Generator<R> {
    /// Builds a generator drawing from `rng`.
    ///
    /// # Errors
    /// Returns a [`GeneratorError`] if the score range or weights are invalid.
    pub fn with_rng(rng: R, config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let (min, max) = (config.min_score, config.max_score);
        if min > max || max > SCORE_MAX {
            return Err(GeneratorError::InvalidScoreRange { min, max });
        }

        let picker = if config.weights.is_empty() {
            GenrePicker::Uniform
        } else {
            let mut genres = Vec::with_capacity(config.weights.len());
            let mut weights = Vec::with_capacity(config.weights.len());
            for (label, &weight) in &config.weights {
                genres.push(label.parse::<Genre>()?);
                weights.push(weight);
            }
            weights
                .iter()
                .try_fold(0u32, |total, &weight| total.checked_add(weight))
                .ok_or(GeneratorError::WeightTotalOverflow)?;
            let index =
                WeightedIndex::new(&weights).map_err(|_invalid| GeneratorError::NoPositiveWeight)?;
            GenrePicker::Weighted { genres, index }
        };

        Ok(Self {
            rng,
            picker,
            min_score: min,
            max_score: max,
        })
    }

    /// Draws the next event.
    pub fn next_event(&mut self) -> ReviewEvent {
        let genre = match &self.picker {
            GenrePicker::Uniform => Genre::ALL[self.rng.gen_range(0..Genre::ALL.len())],
            GenrePicker::Weighted { genres, index } => genres[index.sample(&mut self.rng)],
        };
        let score = self.rng.gen_range(self.min_score..=self.max_score);
        ReviewEvent { genre, score }
    }
}

impl<R: Rng> Iterator for Generator<R> {
    type Item = ReviewEvent;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_event())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use super::*;

    fn seeded(config: &GeneratorConfig) -> Generator {
        Generator::with_rng(StdRng::seed_from_u64(7), config).unwrap()
    }

    #[test]
    fn test_scores_stay_within_configured_range() {
        let config = GeneratorConfig::default();
        for event in seeded(&config).take(2_000) {
            assert!((50..=99).contains(&event.score), "{event:?}");
        }
    }

    #[test]
    fn test_uniform_picker_reaches_every_genre() {
        let seen: HashSet<Genre> = seeded(&GeneratorConfig::default())
            .take(2_000)
            .map(|event| event.genre)
            .collect();
        assert_eq!(seen.len(), Genre::ALL.len());
    }

    #[test]
    fn test_same_seed_gives_same_stream() {
        let config = GeneratorConfig {
            seed: Some(99),
            ..GeneratorConfig::default()
        };
        let first: Vec<_> = Generator::from_config(&config).unwrap().take(50).collect();
        let second: Vec<_> = Generator::from_config(&config).unwrap().take(50).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_weighted_picker_only_uses_listed_genres() {
        let config = GeneratorConfig {
            weights: BTreeMap::from([
                ("RPG".to_string(), 3),
                ("Shooter".to_string(), 1),
                ("MMO".to_string(), 0),
            ]),
            ..GeneratorConfig::default()
        };

        let events: Vec<_> = seeded(&config).take(4_000).collect();
        let rpg = events.iter().filter(|e| e.genre == Genre::Rpg).count();
        let shooter = events.iter().filter(|e| e.genre == Genre::Shooter).count();

        assert_eq!(rpg + shooter, events.len());
        assert!(rpg > shooter * 2, "rpg={rpg} shooter={shooter}");
    }

    #[test]
    fn test_single_score_range_is_allowed() {
        let config = GeneratorConfig {
            min_score: 100,
            max_score: 100,
            ..GeneratorConfig::default()
        };
        assert!(seeded(&config).take(10).all(|e| e.score == 100));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let inverted = GeneratorConfig {
            min_score: 80,
            max_score: 20,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Generator::from_config(&inverted).unwrap_err(),
            GeneratorError::InvalidScoreRange { min: 80, max: 20 }
        ));

        let too_high = GeneratorConfig {
            max_score: 101,
            ..GeneratorConfig::default()
        };
        assert!(Generator::from_config(&too_high).is_err());

        let unknown = GeneratorConfig {
            weights: BTreeMap::from([("Puzzle".to_string(), 1)]),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Generator::from_config(&unknown).unwrap_err(),
            GeneratorError::UnknownWeightedGenre(_)
        ));

        let all_zero = GeneratorConfig {
            weights: BTreeMap::from([("RPG".to_string(), 0)]),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Generator::from_config(&all_zero).unwrap_err(),
            GeneratorError::NoPositiveWeight
        ));

        let overflowing = GeneratorConfig {
            weights: BTreeMap::from([("RPG".to_string(), u32::MAX), ("Shooter".to_string(), 1)]),
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            Generator::from_config(&overflowing).unwrap_err(),
            GeneratorError::WeightTotalOverflow
        ));
    }
}
