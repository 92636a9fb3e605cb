//! Review submission boundary.
//! Validates incoming ratings, runs them through the card store and shapes the
//! JSON the client sees.

use crate::database::{CardStore, StoreError};
use crate::models::{CardId, Flashcard, Phase, Quality, QualityError, ReviewCard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Invalid quality: {0}")]
    InvalidQuality(#[from] QualityError),

    #[error("Card not found: {0}")]
    NotFound(CardId),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ReviewError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CardNotFound(id) => ReviewError::NotFound(id),
            other => ReviewError::Store(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub card_id: CardId,
    pub quality: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub success: bool,
    pub next_interval: u32,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
}

/// Flashcard content together with its review state, as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSnapshot {
    pub id: CardId,
    pub article_slug: String,
    pub front: String,
    pub back: String,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub review_count: u32,
}

impl CardSnapshot {
    pub fn phase(&self) -> Phase {
        Phase::of(self.interval_days)
    }
}

impl From<(Flashcard, ReviewCard)> for CardSnapshot {
    fn from((flashcard, card): (Flashcard, ReviewCard)) -> Self {
        Self {
            id: card.id,
            article_slug: flashcard.article_slug,
            front: flashcard.front,
            back: flashcard.back,
            interval_days: card.interval_days,
            ease_factor: card.ease_factor,
            next_review_at: card.next_review_at,
            last_reviewed_at: card.last_reviewed_at,
            review_count: card.review_count,
        }
    }
}

/// Rates a card at the store's current time.
///
/// Quality outside 0..=5 is rejected before the store is touched.
pub fn submit_review(
    store: &mut CardStore,
    request: &ReviewRequest,
) -> Result<ReviewResponse, ReviewError> {
    let quality = Quality::new(request.quality)?;
    let now = store.now()?;
    let card = store.record_review(request.card_id, quality, now)?;

    Ok(ReviewResponse {
        success: true,
        next_interval: card.interval_days,
        ease_factor: card.ease_factor,
        next_review_at: card.next_review_at,
    })
}

/// Cards due at the store's current time, oldest first
pub fn due_cards(store: &CardStore) -> Result<Vec<CardSnapshot>, ReviewError> {
    let now = store.now()?;
    Ok(store
        .due_cards(now)?
        .into_iter()
        .map(CardSnapshot::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_review_success() {
        let mut store = CardStore::open_in_memory().unwrap();
        let id = store.add_card("intro", "front", "back").unwrap();

        let request: ReviewRequest =
            serde_json::from_str(&format!(r#"{{"cardId": {id}, "quality": 4}}"#)).unwrap();
        let response = submit_review(&mut store, &request).unwrap();

        assert!(response.success);
        assert_eq!(response.next_interval, 6);
        assert_eq!(response.ease_factor, store.get_card(id).unwrap().unwrap().1.ease_factor);
    }

    #[test]
    fn test_submit_review_not_found() {
        let mut store = CardStore::open_in_memory().unwrap();
        let request = ReviewRequest {
            card_id: 404,
            quality: 3,
        };

        let err = submit_review(&mut store, &request).unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(404)));
    }

    #[test]
    fn test_submit_review_rejects_quality_without_writing() {
        let mut store = CardStore::open_in_memory().unwrap();
        let id = store.add_card("intro", "front", "back").unwrap();

        for quality in [-1, 6, 100] {
            let request = ReviewRequest {
                card_id: id,
                quality,
            };
            let err = submit_review(&mut store, &request).unwrap_err();
            assert!(matches!(err, ReviewError::InvalidQuality(_)));
        }

        let (_, card) = store.get_card(id).unwrap().unwrap();
        assert_eq!(card.review_count, 0);
    }

    #[test]
    fn test_due_cards_leave_after_review() {
        let mut store = CardStore::open_in_memory().unwrap();
        let first = store.add_card("intro", "one", "1").unwrap();
        store.add_card("intro", "two", "2").unwrap();
        assert_eq!(due_cards(&store).unwrap().len(), 2);

        let request = ReviewRequest {
            card_id: first,
            quality: 5,
        };
        submit_review(&mut store, &request).unwrap();

        let due = due_cards(&store).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].front, "two");

        // failed cards come back the next day
        let request = ReviewRequest {
            card_id: due[0].id,
            quality: 1,
        };
        submit_review(&mut store, &request).unwrap();
        assert!(due_cards(&store).unwrap().is_empty());
        store.advance_day().unwrap();
        assert_eq!(due_cards(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_response_json_shape() {
        let mut store = CardStore::open_in_memory().unwrap();
        let id = store.add_card("intro", "front", "back").unwrap();
        let response = submit_review(
            &mut store,
            &ReviewRequest {
                card_id: id,
                quality: 5,
            },
        )
        .unwrap();

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["nextInterval"], 6);
        assert!(value.get("nextReviewAt").is_some());
    }

    #[test]
    fn test_snapshot_phase() {
        let mut store = CardStore::open_in_memory().unwrap();
        store.add_card("intro", "front", "back").unwrap();
        let snapshot = &due_cards(&store).unwrap()[0];
        assert_eq!(snapshot.phase(), Phase::Learning);
        assert_eq!(snapshot.article_slug, "intro");
    }
}
