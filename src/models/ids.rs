//! Contest identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single draw (the "concurso" number).
///
/// Always positive; the normalizer rejects records that don't carry one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestId(u32);

impl ContestId {
    /// Create a contest id, rejecting zero.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Get the numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContestId({})", self.0)
    }
}

impl TryFrom<u32> for ContestId {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contest_id_rejects_zero() {
        assert!(ContestId::new(0).is_none());
        assert_eq!(ContestId::new(2700).map(|c| c.get()), Some(2700));
    }

    #[test]
    fn test_contest_id_ordering() {
        let a = ContestId::new(1).unwrap();
        let b = ContestId::new(3).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_contest_id_display() {
        assert_eq!(ContestId::new(42).unwrap().to_string(), "42");
    }

    #[test]
    fn test_contest_id_serializes_as_number() {
        let id = ContestId::new(17).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");

        let parsed: ContestId = serde_json::from_str("17").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_contest_id_try_from() {
        assert!(ContestId::try_from(0).is_err());
        assert!(ContestId::try_from(5).is_ok());
    }
}
