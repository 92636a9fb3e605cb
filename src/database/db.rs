//! Card store for the review scheduler
//!
//! Keeps flashcards and their SM-2 review state in SQLite, answers the
//! "due now" query and writes review results back atomically. All timestamps
//! are stored as UTC unix seconds.

use crate::models::{CardId, Flashcard, FlashcardSet, Quality, ReviewCard, sm2};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Card {0} was modified by another review")]
    Conflict(CardId),

    #[error("Corrupt store clock: {0}")]
    CorruptClock(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

const CARD_COLUMNS: &str = "id, article_slug, front, back, interval_days, ease_factor, \
                            next_review_at, last_reviewed_at, review_count";

pub struct CardStore {
    conn: Connection,
}

impl CardStore {
    /// Opens (or creates) a database file and switches it to WAL journaling
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!("Opened {} (journal_mode={})", path.display(), mode);
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_slug TEXT NOT NULL,
                front TEXT NOT NULL,
                back TEXT NOT NULL,
                interval_days INTEGER NOT NULL DEFAULT 1,
                ease_factor REAL NOT NULL DEFAULT 2.5,
                next_review_at INTEGER NOT NULL,
                last_reviewed_at INTEGER,
                review_count INTEGER NOT NULL DEFAULT 0,
                UNIQUE(article_slug, front)
            );
            CREATE INDEX IF NOT EXISTS idx_flashcards_next_review
                ON flashcards(next_review_at);
            CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            INSERT OR IGNORE INTO app_state (key, value) VALUES ('day_offset', '0');",
        )?;

        Ok(Self { conn })
    }

    /// Current time on the store clock: wall clock plus the simulated day offset
    pub fn now(&self) -> Result<DateTime<Utc>> {
        let offset = self.day_offset()?;
        Duration::try_days(offset)
            .and_then(|days| Utc::now().trunc_subsecs(0).checked_add_signed(days))
            .ok_or_else(|| StoreError::CorruptClock(format!("day offset {} out of range", offset)))
    }

    fn day_offset(&self) -> Result<i64> {
        let value: String = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'day_offset'",
            [],
            |row| row.get(0),
        )?;

        value
            .parse::<i64>()
            .map_err(|_| StoreError::CorruptClock(format!("day offset '{}' is not a number", value)))
    }

    /// Moves the store clock forward by 24 hours (for trying out spaced repetition)
    pub fn advance_day(&self) -> Result<DateTime<Utc>> {
        let offset = self.day_offset()? + 1;
        self.conn.execute(
            "UPDATE app_state SET value = ?1 WHERE key = 'day_offset'",
            params![offset.to_string()],
        )?;
        info!("Store clock advanced to day offset {}", offset);
        self.now()
    }

    /// Adds a flashcard with fresh review state, due immediately.
    ///
    /// If a card with the same article and front already exists it is left
    /// untouched and its id is returned.
    pub fn add_card(&self, article_slug: &str, front: &str, back: &str) -> Result<CardId> {
        let flashcard = Flashcard {
            article_slug: article_slug.to_string(),
            front: front.to_string(),
            back: back.to_string(),
        };
        let (id, _) = insert_card(&self.conn, &flashcard, self.now()?)?;
        Ok(id)
    }

    /// Inserts every card of a set in one transaction. Returns how many were new.
    pub fn import_set(&mut self, set: &FlashcardSet) -> Result<usize> {
        let now = self.now()?;
        let tx = self.conn.transaction()?;

        let mut inserted = 0;
        for flashcard in set.flashcards() {
            if insert_card(&tx, &flashcard, now)?.1 {
                inserted += 1;
            }
        }

        tx.commit()?;
        info!(
            "Imported '{}': {} new of {} cards",
            set.article_slug,
            inserted,
            set.cards.len()
        );
        Ok(inserted)
    }

    pub fn get_card(&self, id: CardId) -> Result<Option<(Flashcard, ReviewCard)>> {
        load_card(&self.conn, id)
    }

    pub fn all_cards(&self) -> Result<Vec<(Flashcard, ReviewCard)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CARD_COLUMNS} FROM flashcards ORDER BY id"))?;
        let cards = stmt
            .query_map([], row_to_card)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    pub fn cards_for_article(&self, article_slug: &str) -> Result<Vec<(Flashcard, ReviewCard)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM flashcards WHERE article_slug = ?1 ORDER BY id"
        ))?;
        let cards = stmt
            .query_map(params![article_slug], row_to_card)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Retrieves cards whose next review time is at or before `now`,
    /// oldest first.
    pub fn due_cards(&self, now: DateTime<Utc>) -> Result<Vec<(Flashcard, ReviewCard)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM flashcards
             WHERE next_review_at <= ?1
             ORDER BY next_review_at ASC, id ASC"
        ))?;
        let cards = stmt
            .query_map(params![now.timestamp()], row_to_card)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    pub fn due_count(&self, now: DateTime<Utc>) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM flashcards WHERE next_review_at <= ?1",
            params![now.timestamp()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Rates a card and persists the scheduler's result.
    ///
    /// Read, schedule and write run in a single IMMEDIATE transaction, and the
    /// write only applies if `review_count` still matches what was read.
    pub fn record_review(
        &mut self,
        id: CardId,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<ReviewCard> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (_, current) = load_card(&tx, id)?.ok_or(StoreError::CardNotFound(id))?;
        let updated = sm2::review_card(&current, quality, now);
        write_review(&tx, &updated, current.review_count)?;
        tx.commit()?;

        info!(
            "Card {} rated {}: interval {} -> {} days, ease {:.2} -> {:.2}",
            id,
            quality,
            current.interval_days,
            updated.interval_days,
            current.ease_factor,
            updated.ease_factor
        );
        Ok(updated)
    }

    /// Writes review state computed outside the store. `expected_review_count`
    /// is the count the caller read; a mismatch means someone else rated the
    /// card in between.
    pub fn save_review(&self, card: &ReviewCard, expected_review_count: u32) -> Result<()> {
        write_review(&self.conn, card, expected_review_count)
    }

    pub fn delete_card(&self, id: CardId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
        if deleted > 0 {
            info!("Card {} deleted", id);
        }
        Ok(deleted > 0)
    }
}

/// Returns the card id and whether a new row was created
fn insert_card(
    conn: &Connection,
    flashcard: &Flashcard,
    now: DateTime<Utc>,
) -> Result<(CardId, bool)> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO flashcards
            (article_slug, front, back, interval_days, ease_factor, next_review_at, review_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            flashcard.article_slug,
            flashcard.front,
            flashcard.back,
            crate::models::review_card::DEFAULT_INTERVAL_DAYS,
            crate::models::review_card::DEFAULT_EASE_FACTOR,
            now.timestamp()
        ],
    )? > 0;

    let id: CardId = conn.query_row(
        "SELECT id FROM flashcards WHERE article_slug = ?1 AND front = ?2",
        params![flashcard.article_slug, flashcard.front],
        |row| row.get(0),
    )?;

    if !inserted {
        debug!(
            "Card '{}' already exists in '{}' as {}",
            flashcard.front, flashcard.article_slug, id
        );
    }
    Ok((id, inserted))
}

fn load_card(conn: &Connection, id: CardId) -> Result<Option<(Flashcard, ReviewCard)>> {
    let card = conn
        .query_row(
            &format!("SELECT {CARD_COLUMNS} FROM flashcards WHERE id = ?1"),
            params![id],
            row_to_card,
        )
        .optional()?;
    Ok(card)
}

fn write_review(conn: &Connection, card: &ReviewCard, expected_review_count: u32) -> Result<()> {
    let updated = conn.execute(
        "UPDATE flashcards
         SET interval_days = ?1, ease_factor = ?2, next_review_at = ?3,
             last_reviewed_at = ?4, review_count = ?5
         WHERE id = ?6 AND review_count = ?7",
        params![
            card.interval_days,
            card.ease_factor,
            card.next_review_at.timestamp(),
            card.last_reviewed_at.map(|t| t.timestamp()),
            card.review_count,
            card.id,
            expected_review_count
        ],
    )?;

    if updated == 0 {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM flashcards WHERE id = ?1)",
            params![card.id],
            |row| row.get(0),
        )?;
        return if exists {
            warn!("Stale review write for card {}", card.id);
            Err(StoreError::Conflict(card.id))
        } else {
            Err(StoreError::CardNotFound(card.id))
        };
    }
    Ok(())
}

fn timestamp_from_secs(secs: i64, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(column, secs))
}

fn row_to_card(row: &Row<'_>) -> rusqlite::Result<(Flashcard, ReviewCard)> {
    let id: CardId = row.get(0)?;
    let last_reviewed_at = match row.get::<_, Option<i64>>(7)? {
        Some(secs) => Some(timestamp_from_secs(secs, 7)?),
        None => None,
    };

    Ok((
        Flashcard {
            article_slug: row.get(1)?,
            front: row.get(2)?,
            back: row.get(3)?,
        },
        ReviewCard {
            id,
            interval_days: row.get(4)?,
            ease_factor: row.get(5)?,
            next_review_at: timestamp_from_secs(row.get(6)?, 6)?,
            last_reviewed_at,
            review_count: row.get(8)?,
        },
    ))
}
