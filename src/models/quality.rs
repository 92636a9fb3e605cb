//! Recall quality rating given by the learner after attempting a card.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualityError {
    #[error("quality must be between 0 and 5, got {0}")]
    OutOfRange(i64),
}

/// Integer rating in 0..=5. Anything below 3 counts as a failed recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    pub const FORGOT: Quality = Quality(1);
    pub const HARD: Quality = Quality(3);
    pub const GOOD: Quality = Quality(4);
    pub const EASY: Quality = Quality(5);

    pub fn new(value: i64) -> Result<Self, QualityError> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(QualityError::OutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<i64> for Quality {
    type Error = QualityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_range() {
        for value in 0..=5 {
            assert_eq!(Quality::new(value).unwrap().value() as i64, value);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(Quality::new(6), Err(QualityError::OutOfRange(6)));
        assert_eq!(Quality::new(-1), Err(QualityError::OutOfRange(-1)));
    }

    #[test]
    fn test_pass_threshold() {
        assert!(!Quality::new(2).unwrap().is_pass());
        assert!(Quality::new(3).unwrap().is_pass());
        assert!(!Quality::FORGOT.is_pass());
        assert!(Quality::HARD.is_pass());
    }

    #[test]
    fn test_deserialize_validates() {
        let quality: Quality = serde_json::from_str("4").unwrap();
        assert_eq!(quality, Quality::GOOD);
        assert!(serde_json::from_str::<Quality>("9").is_err());
    }
}
