//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The scheduler only looks at the current interval and ease factor of a card:
//! - Quality grades 0-2: interval goes back to 1 day, whatever the history
//! - Quality grades 3-5: interval grows 0 → 1 day, 1 → 6 days, then multiplied by the ease factor
//! - Ease factor is adjusted after every review from its previous value and never falls below 1.3
//!
//! Nothing here touches storage. Callers persist the returned values.

use super::{Quality, ReviewCard};
use chrono::{DateTime, Duration, SubsecRound, Utc};

pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Upper bound for a scheduled interval, about a hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Interval reached on the second successful review.
const SECOND_INTERVAL_DAYS: u32 = 6;

/// Informal stage of a card, always derived from its interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    New,
    Learning,
    Review,
}

impl Phase {
    pub fn of(interval_days: u32) -> Self {
        match interval_days {
            0 => Phase::New,
            1..=SECOND_INTERVAL_DAYS => Phase::Learning,
            _ => Phase::Review,
        }
    }
}

/// Computes the next interval (days) and ease factor for a rated card.
/// `current_interval_days == 0` means the card was never reviewed.
pub fn compute_next_review(
    quality: Quality,
    current_interval_days: u32,
    current_ease_factor: f64,
) -> (u32, f64) {
    let new_interval = if !quality.is_pass() {
        1
    } else {
        match current_interval_days {
            0 => 1,
            1 => SECOND_INTERVAL_DAYS,
            _ => ((current_interval_days as f64 * current_ease_factor)
                .round()
                .min(MAX_INTERVAL_DAYS as f64) as u32)
                .max(1),
        }
    };

    let q = quality.value() as f64;
    let new_ef = current_ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));

    (new_interval, new_ef.max(MIN_EASE_FACTOR))
}

/// Adds whole days to `now`, saturating at the latest representable second.
pub fn compute_next_review_timestamp(interval_days: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(interval_days as i64))
        .unwrap_or_else(|| DateTime::<Utc>::MAX_UTC.trunc_subsecs(0))
}

/// Applies one rating to a card and returns its new state.
pub fn review_card(card: &ReviewCard, quality: Quality, now: DateTime<Utc>) -> ReviewCard {
    let (interval_days, ease_factor) =
        compute_next_review(quality, card.interval_days, card.ease_factor);

    ReviewCard {
        id: card.id,
        interval_days,
        ease_factor,
        next_review_at: compute_next_review_timestamp(interval_days, now),
        last_reviewed_at: Some(now),
        review_count: card.review_count + 1,
    }
}
