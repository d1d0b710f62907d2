// Player list validation and the fixed turn sequence.

use std::collections::HashSet;

use barrage_core::record::MAX_PLAYERS;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Seating order for a session. Fixed once built; every player appears
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSequence {
    players: Vec<String>,
}

impl TurnSequence {
    /// Validate `names` and keep them in the given order.
    ///
    /// Names are trimmed. Fails on an empty name, a duplicate, or a player
    /// count outside `1..=MAX_PLAYERS`.
    pub fn new<I, S>(names: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let players: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .collect();

        if players.is_empty() || players.len() > MAX_PLAYERS {
            return Err(ConfigurationError::PlayerCount {
                count: players.len(),
                max: MAX_PLAYERS,
            });
        }

        let mut seen = HashSet::new();
        for (index, name) in players.iter().enumerate() {
            if name.is_empty() {
                return Err(ConfigurationError::EmptyPlayerName { index });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigurationError::DuplicatePlayerName { name: name.clone() });
            }
        }

        Ok(TurnSequence { players })
    }

    /// Validate `names` and shuffle them once into a random seating order.
    pub fn shuffled<I, S, R>(names: I, rng: &mut R) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let mut sequence = Self::new(names)?;
        sequence.players.shuffle(rng);
        Ok(sequence)
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Seat index of `name`, if seated.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p == name)
    }

    /// The sequence back to front.
    pub fn reversed(&self) -> Vec<String> {
        self.players.iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_trims_and_keeps_order() {
        let seq = TurnSequence::new([" Ann", "Bo ", "Cy"]).unwrap();
        assert_eq!(seq.players(), &["Ann", "Bo", "Cy"]);
        assert_eq!(seq.position("Bo"), Some(1));
        assert_eq!(seq.reversed(), vec!["Cy", "Bo", "Ann"]);
    }

    #[test]
    fn rejects_empty_list_and_too_many_players() {
        let none: [&str; 0] = [];
        assert_eq!(
            TurnSequence::new(none).unwrap_err(),
            ConfigurationError::PlayerCount { count: 0, max: 5 }
        );
        assert!(matches!(
            TurnSequence::new(["a", "b", "c", "d", "e", "f"]),
            Err(ConfigurationError::PlayerCount { count: 6, .. })
        ));
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(
            TurnSequence::new(["Ann", "  "]).unwrap_err(),
            ConfigurationError::EmptyPlayerName { index: 1 }
        );
    }

    #[test]
    fn rejects_duplicates_after_trim() {
        assert_eq!(
            TurnSequence::new(["Ann", " Ann"]).unwrap_err(),
            ConfigurationError::DuplicatePlayerName { name: "Ann".into() }
        );
    }

    #[test]
    fn shuffled_is_a_permutation_with_matching_length() {
        let names = ["Ann", "Bo", "Cy", "Di", "Ed"];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let seq = TurnSequence::shuffled(names, &mut rng).unwrap();
            assert_eq!(seq.len(), names.len());
            let mut sorted = seq.players().to_vec();
            sorted.sort();
            assert_eq!(sorted, names);
        }
    }

    #[test]
    fn shuffled_is_deterministic_for_a_seed() {
        let names = ["Ann", "Bo", "Cy", "Di"];
        let a = TurnSequence::shuffled(names, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = TurnSequence::shuffled(names, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
