//! Card representation and seeded deck shuffling.

pub mod card;
pub mod deck;
pub mod rank;
pub mod suit;

pub use card::Card;
pub use deck::Deck;
pub use rank::Rank;
pub use suit::Suit;
