pub mod config;
pub mod database;
pub mod export;
pub mod models;
pub mod review;

pub use database::CardStore;
pub use models::{CardId, Flashcard, FlashcardSet, Quality, ReviewCard};
pub use review::{CardSnapshot, ReviewRequest, ReviewResponse};
