//! Flashcard is a pair <front, back> generated from an article. Only text is used on both sides
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub article_slug: String,
    pub front: String,
    pub back: String,
}

/// One side-pair inside a flashcard set file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardContent {
    pub front: String,
    pub back: String,
}

/// All flashcards generated for one article, as stored in `<slug>.json` files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    pub article_slug: String,
    pub cards: Vec<CardContent>,
}

impl FlashcardSet {
    pub fn flashcards(&self) -> impl Iterator<Item = Flashcard> + '_ {
        self.cards.iter().map(|card| Flashcard {
            article_slug: self.article_slug.clone(),
            front: card.front.clone(),
            back: card.back.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard {
            article_slug: "03-constants-variables".to_string(),
            front: "What keyword declares a constant?".to_string(),
            back: "`let`".to_string(),
        };

        assert_eq!(card.article_slug, "03-constants-variables");
        assert_eq!(card.front, "What keyword declares a constant?");
        assert_eq!(card.back, "`let`");
    }

    #[test]
    fn test_set_expands_to_flashcards() {
        let set = FlashcardSet {
            article_slug: "01-optionals".to_string(),
            cards: vec![
                CardContent {
                    front: "What does `?` mean after a type?".to_string(),
                    back: "The value is optional".to_string(),
                },
                CardContent {
                    front: "How do you unwrap safely?".to_string(),
                    back: "`if let` or `guard let`".to_string(),
                },
            ],
        };

        let cards: Vec<Flashcard> = set.flashcards().collect();
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.article_slug == "01-optionals"));
        assert_eq!(cards[1].back, "`if let` or `guard let`");
    }

    #[test]
    fn test_set_uses_camel_case_keys() {
        let json = r#"{"articleSlug":"a","cards":[{"front":"f","back":"b"}]}"#;
        let set: FlashcardSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.article_slug, "a");
        assert_eq!(set.cards[0].front, "f");
    }
}
