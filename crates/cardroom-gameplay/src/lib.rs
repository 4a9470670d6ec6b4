//! Hold'em rules engine: round state machine, betting action processing,
//! money ledger, seat rotation, and pot settlement.
//!
//! Everything here is synchronous and single-threaded per game; the
//! cardroom-gameroom crate wraps a [`HoldemGame`] in its concurrency gate.

pub mod action;
pub mod error;
pub mod game;
pub mod message;
pub mod phase;
pub mod player;
pub mod players;
pub mod pot;
pub mod rank;
pub mod record;
pub mod settings;
pub mod settle;
pub mod stack;
pub mod state;

pub use action::Action;
pub use action::ActionKind;
pub use error::GameError;
pub use game::Dealt;
pub use game::HoldemGame;
pub use game::RoundEngine;
pub use message::Address;
pub use message::Messenger;
pub use message::TableMessage;
pub use phase::Phase;
pub use player::Player;
pub use players::Players;
pub use pot::Pots;
pub use pot::SidePot;
pub use pot::StreetPot;
pub use rank::HandRank;
pub use rank::RankCategory;
pub use rank::RankEvaluator;
pub use record::HistorySink;
pub use record::RoundRecord;
pub use settings::Format;
pub use settings::Settings;
pub use settings::SettingsChange;
pub use settings::ShufflePolicy;
pub use settle::settle;
pub use settle::Settlement;
pub use stack::Stack;
pub use stack::Stats;
pub use state::Blind;
pub use state::SitIntent;
pub use state::State;
