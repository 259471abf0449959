//! Canonical 6-number combinations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lowest number that can be drawn.
pub const MIN_NUMBER: u8 = 1;

/// Highest number that can be drawn.
pub const MAX_NUMBER: u8 = 60;

/// How many numbers make up one draw.
pub const NUMBERS_PER_DRAW: usize = 6;

/// Separator used by the canonical key.
const KEY_SEPARATOR: char = '-';

/// Why a set of numbers is not a valid combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinationError {
    #[error("expected 6 numbers, got {0}")]
    WrongCount(usize),

    #[error("number {0} is outside 1..=60")]
    OutOfRange(u8),

    #[error("number {0} appears more than once")]
    Duplicate(u8),

    #[error("cannot parse '{0}' as a number")]
    Unparseable(String),
}

/// Six distinct numbers in 1..=60, stored sorted ascending.
///
/// Two combinations built from any permutation of the same numbers are equal,
/// hash identically and share the same canonical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Combination([u8; NUMBERS_PER_DRAW]);

impl Combination {
    /// Validate and canonicalize a set of numbers.
    pub fn new(numbers: &[u8]) -> Result<Self, CombinationError> {
        if numbers.len() != NUMBERS_PER_DRAW {
            return Err(CombinationError::WrongCount(numbers.len()));
        }

        let mut sorted = [0u8; NUMBERS_PER_DRAW];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();

        for (i, &n) in sorted.iter().enumerate() {
            if !is_valid_number(n) {
                return Err(CombinationError::OutOfRange(n));
            }
            if i > 0 && sorted[i - 1] == n {
                return Err(CombinationError::Duplicate(n));
            }
        }

        Ok(Self(sorted))
    }

    /// The numbers in ascending order.
    pub fn numbers(&self) -> &[u8; NUMBERS_PER_DRAW] {
        &self.0
    }

    /// Whether `n` is part of this combination.
    pub fn contains(&self, n: u8) -> bool {
        self.0.binary_search(&n).is_ok()
    }

    /// Sorted, zero-padded, dash-joined key, e.g. `04-08-15-16-23-42`.
    pub fn canonical_key(&self) -> String {
        self.join(&KEY_SEPARATOR.to_string())
    }

    /// Spaced variant of the key for terminal output, e.g. `04 - 08 - 15 - 16 - 23 - 42`.
    pub fn display_key(&self) -> String {
        self.join(" - ")
    }

    fn join(&self, sep: &str) -> String {
        self.0
            .iter()
            .map(|n| format_number(*n))
            .collect::<Vec<_>>()
            .join(sep)
    }
}

/// Whether `n` can appear in a draw.
pub fn is_valid_number(n: u8) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&n)
}

/// Two-digit zero-padded rendering of a number.
pub fn format_number(n: u8) -> String {
    format!("{:02}", n)
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_key())
    }
}

impl FromStr for Combination {
    type Err = CombinationError;

    /// Accepts the canonical key as well as space- or comma-separated lists in any order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numbers = s
            .split(|c: char| c == KEY_SEPARATOR || c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>()
                    .map_err(|_| CombinationError::Unparseable(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(&numbers)
    }
}

impl TryFrom<&[u8]> for Combination {
    type Error = CombinationError;

    fn try_from(numbers: &[u8]) -> Result<Self, Self::Error> {
        Self::new(numbers)
    }
}

impl Serialize for Combination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical_key())
    }
}

impl<'de> Deserialize<'de> for Combination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_combination_sorts_numbers() {
        let c = Combination::new(&[42, 23, 16, 15, 8, 4]).unwrap();
        assert_eq!(c.numbers(), &[4, 8, 15, 16, 23, 42]);
    }

    #[test]
    fn test_canonical_key_is_zero_padded() {
        let c = Combination::new(&[5, 1, 30, 12, 45, 9]).unwrap();
        assert_eq!(c.canonical_key(), "01-05-09-12-30-45");
        assert_eq!(c.display_key(), "01 - 05 - 09 - 12 - 30 - 45");
    }

    #[test]
    fn test_combination_rejects_wrong_count() {
        assert_eq!(
            Combination::new(&[1, 2, 3, 4, 5]),
            Err(CombinationError::WrongCount(5))
        );
        assert_eq!(
            Combination::new(&[1, 2, 3, 4, 5, 6, 7]),
            Err(CombinationError::WrongCount(7))
        );
    }

    #[test]
    fn test_combination_rejects_out_of_range() {
        assert_eq!(
            Combination::new(&[0, 2, 3, 4, 5, 6]),
            Err(CombinationError::OutOfRange(0))
        );
        assert_eq!(
            Combination::new(&[1, 2, 3, 4, 5, 61]),
            Err(CombinationError::OutOfRange(61))
        );
    }

    #[test]
    fn test_combination_rejects_duplicates() {
        assert_eq!(
            Combination::new(&[7, 2, 3, 7, 5, 6]),
            Err(CombinationError::Duplicate(7))
        );
    }

    #[test]
    fn test_from_str_accepts_several_formats() {
        let expected = Combination::new(&[4, 8, 15, 16, 23, 42]).unwrap();
        assert_eq!("04-08-15-16-23-42".parse::<Combination>().unwrap(), expected);
        assert_eq!("42 23 16 15 8 4".parse::<Combination>().unwrap(), expected);
        assert_eq!("4,8, 15,16 ,23,42".parse::<Combination>().unwrap(), expected);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!(matches!(
            "04-08-xx-16-23-42".parse::<Combination>(),
            Err(CombinationError::Unparseable(_))
        ));
        assert!("".parse::<Combination>().is_err());
    }

    #[test]
    fn test_contains() {
        let c = Combination::new(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert!(c.contains(3));
        assert!(!c.contains(60));
    }

    #[test]
    fn test_serializes_as_canonical_key() {
        let c = Combination::new(&[6, 5, 4, 3, 2, 1]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"01-02-03-04-05-06\"");

        let parsed: Combination = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    fn six_distinct() -> impl Strategy<Value = Vec<u8>> {
        proptest::sample::subsequence((MIN_NUMBER..=MAX_NUMBER).collect::<Vec<_>>(), 6)
    }

    proptest! {
        #[test]
        fn canonical_key_ignores_order(numbers in six_distinct(), seed in any::<u64>()) {
            use rand::seq::SliceRandom;
            use rand::SeedableRng;

            let mut shuffled = numbers.clone();
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            shuffled.shuffle(&mut rng);

            let a = Combination::new(&numbers).unwrap();
            let b = Combination::new(&shuffled).unwrap();
            prop_assert_eq!(a.canonical_key(), b.canonical_key());
            prop_assert_eq!(a, b);
        }
    }
}
