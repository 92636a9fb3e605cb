pub mod flashcard;
pub mod quality;
pub mod review_card;
pub mod sm2;

pub use flashcard::{CardContent, Flashcard, FlashcardSet};
pub use quality::{Quality, QualityError};
pub use review_card::{CardId, ReviewCard};
pub use sm2::Phase;
