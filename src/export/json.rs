//! JSON import/export module for flashcards.
//! Reads the per-article flashcard set files and writes card snapshots with their review state.

use crate::models::FlashcardSet;
use crate::review::CardSnapshot;
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid flashcard set: {0}")]
    Invalid(String),
}

/// Writes card snapshots as pretty JSON.
pub fn export_cards_to_path(
    cards: &[CardSnapshot],
    path: impl AsRef<Path>,
) -> Result<(), ImportError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, cards)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!("Exported {} cards to '{}'", cards.len(), path.display());
    Ok(())
}

/// Reads a `{ articleSlug, cards: [{ front, back }] }` file.
/// Returns an error if the file is missing, is not valid JSON or has an empty slug or front.
pub fn import_flashcard_set(path: impl AsRef<Path>) -> Result<FlashcardSet, ImportError> {
    let path = path.as_ref();
    let set: FlashcardSet = serde_json::from_reader(BufReader::new(File::open(path)?))?;

    if set.article_slug.trim().is_empty() {
        return Err(ImportError::Invalid("articleSlug is empty".to_string()));
    }
    if let Some(pos) = set.cards.iter().position(|c| c.front.trim().is_empty()) {
        return Err(ImportError::Invalid(format!("card {} has an empty front", pos)));
    }

    info!(
        "Read {} cards for '{}' from '{}'",
        set.cards.len(),
        set.article_slug,
        path.display()
    );
    Ok(set)
}
