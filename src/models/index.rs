//! Combination index for repeat detection.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Combination, CombinationError, ContestId};

/// A combination drawn in more than one contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedCombination {
    pub combination: Combination,
    pub contests: Vec<ContestId>,
}

/// Canonical combination → contests that drew it, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CombinationIndex {
    entries: BTreeMap<Combination, Vec<ContestId>>,
}

impl CombinationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `contest` drew `combination`.
    pub fn insert(&mut self, combination: Combination, contest: ContestId) {
        self.entries.entry(combination).or_default().push(contest);
    }

    /// Contests that drew `combination`; empty if never drawn.
    pub fn lookup(&self, combination: &Combination) -> &[ContestId] {
        self.entries
            .get(combination)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parse `key` (any order, see [`Combination`]'s `FromStr`) and look it up.
    pub fn lookup_key(&self, key: &str) -> Result<&[ContestId], CombinationError> {
        let combination: Combination = key.parse()?;
        Ok(self.lookup(&combination))
    }

    /// Each occurrence past the first counts as one repeat.
    pub fn total_repeats(&self) -> usize {
        self.entries
            .values()
            .filter(|contests| contests.len() > 1)
            .map(|contests| contests.len() - 1)
            .sum()
    }

    /// Combinations drawn more than once, in canonical order.
    pub fn repeats(&self) -> Vec<RepeatedCombination> {
        self.entries
            .iter()
            .filter(|(_, contests)| contests.len() > 1)
            .map(|(combination, contests)| RepeatedCombination {
                combination: *combination,
                contests: contests.clone(),
            })
            .collect()
    }

    /// Number of distinct combinations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Combination, &[ContestId])> {
        self.entries.iter().map(|(c, ids)| (c, ids.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contest(n: u32) -> ContestId {
        ContestId::new(n).unwrap()
    }

    fn combo(numbers: &[u8]) -> Combination {
        Combination::new(numbers).unwrap()
    }

    #[test]
    fn test_lookup_missing_is_empty() {
        let index = CombinationIndex::new();
        assert!(index.lookup(&combo(&[1, 2, 3, 4, 5, 6])).is_empty());
        assert_eq!(index.total_repeats(), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_total_repeats_counts_extra_occurrences() {
        let mut index = CombinationIndex::new();
        let a = combo(&[1, 2, 3, 4, 5, 6]);
        let b = combo(&[7, 8, 9, 10, 11, 12]);
        index.insert(a, contest(1));
        index.insert(a, contest(5));
        index.insert(a, contest(9));
        index.insert(b, contest(2));

        assert_eq!(index.total_repeats(), 2);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup(&a), &[contest(1), contest(5), contest(9)]);

        let repeats = index.repeats();
        assert_eq!(repeats.len(), 1);
        assert_eq!(repeats[0].combination, a);
    }

    #[test]
    fn test_lookup_key_any_order() {
        let mut index = CombinationIndex::new();
        index.insert(combo(&[4, 8, 15, 16, 23, 42]), contest(1));

        assert_eq!(index.lookup_key("42 4 16 8 23 15").unwrap(), &[contest(1)]);
        assert!(index.lookup_key("1-2-3").is_err());
    }

    #[test]
    fn test_index_serializes_with_canonical_keys() {
        let mut index = CombinationIndex::new();
        index.insert(combo(&[6, 5, 4, 3, 2, 1]), contest(3));

        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["01-02-03-04-05-06"][0], 3);
    }
}
