use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CardId = i64;

pub const DEFAULT_INTERVAL_DAYS: u32 = 1;
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Review state of a single flashcard. All timestamps are UTC.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub id: CardId,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub review_count: u32,
}

impl ReviewCard {
    /// State of a freshly generated card: due immediately, never reviewed.
    pub fn new(id: CardId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            interval_days: DEFAULT_INTERVAL_DAYS,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review_at: now,
            last_reviewed_at: None,
            review_count: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_new_card_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let card = ReviewCard::new(7, now);

        assert_eq!(card.id, 7);
        assert_eq!(card.interval_days, 1);
        assert_eq!(card.ease_factor, 2.5);
        assert_eq!(card.next_review_at, now);
        assert_eq!(card.last_reviewed_at, None);
        assert_eq!(card.review_count, 0);
        assert!(card.is_due(now));
    }

    #[test]
    fn test_not_due_before_next_review() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut card = ReviewCard::new(1, now);
        card.next_review_at = now + Duration::days(1);

        assert!(!card.is_due(now));
        assert!(card.is_due(now + Duration::days(1)));
    }
}
