use std::time::Duration;

use serde::Serialize;

use cardroom_cards::Card;
use cardroom_core::Chips;
use cardroom_core::Round;

use crate::state::Blind;

/// Where a message is going: everyone at the table, or one session's
/// private channel. Hole cards and blind prompts are always private.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address {
    All,
    Session(String),
}

/// Messages sent from the table to clients.
///
/// Table snapshots carry a pre-serialized view so the transport never
/// needs the engine types; everything else is a small typed event.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableMessage {
    /// Full table snapshot after any accepted change.
    Update { table: serde_json::Value },
    /// A player's hole cards for this round.
    HoleCards { round: Round, cards: Vec<String> },
    /// This session owes a forced bet before acting.
    BlindDue { blind: Blind, value: Chips },
    /// The blinds for the new round, by handle.
    BlindsDue { small: String, big: String },
    /// Free-text table banner.
    Status { text: String },
    /// A player showed their cards.
    Reveal {
        handle: String,
        cards: Vec<String>,
        winner: bool,
        note: String,
    },
    /// The game is over; final pots and standings follow in the snapshot.
    GameOver { table: serde_json::Value },
    /// Current table configuration.
    Settings { settings: serde_json::Value },
}

impl TableMessage {
    pub fn update<T: Serialize>(table: &T) -> Self {
        Self::Update {
            table: serde_json::to_value(table).unwrap_or_default(),
        }
    }
    pub fn hole_cards(round: Round, cards: &[Card]) -> Self {
        Self::HoleCards {
            round,
            cards: cards.iter().map(|c| c.to_string()).collect(),
        }
    }
    pub fn blind_due(blind: Blind, value: Chips) -> Self {
        Self::BlindDue { blind, value }
    }
    pub fn blinds_due(small: &str, big: &str) -> Self {
        Self::BlindsDue {
            small: small.to_string(),
            big: big.to_string(),
        }
    }
    pub fn status(text: &str) -> Self {
        Self::Status {
            text: text.to_string(),
        }
    }
    pub fn reveal(handle: &str, cards: &[Card], winner: bool, note: &str) -> Self {
        Self::Reveal {
            handle: handle.to_string(),
            cards: cards.iter().map(|c| c.to_string()).collect(),
            winner,
            note: note.to_string(),
        }
    }
    pub fn game_over<T: Serialize>(table: &T) -> Self {
        Self::GameOver {
            table: serde_json::to_value(table).unwrap_or_default(),
        }
    }
    pub fn settings<T: Serialize>(settings: &T) -> Self {
        Self::Settings {
            settings: serde_json::to_value(settings).unwrap_or_default(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize table message")
    }
}

/// Outbound delivery, implemented by the hosting layer. The engine only
/// ever queues; sends must not block rule processing, and a delay lets
/// reveals and status banners land after the snapshot they follow.
pub trait Messenger: Send {
    fn send(&self, to: Address, message: TableMessage, delay: Duration);

    fn broadcast(&self, message: TableMessage) {
        self.send(Address::All, message, Duration::ZERO);
    }
    fn whisper(&self, session: &str, message: TableMessage) {
        self.send(Address::Session(session.to_string()), message, Duration::ZERO);
    }
}
