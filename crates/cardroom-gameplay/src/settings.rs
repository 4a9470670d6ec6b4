use std::time::Duration;
use std::time::Instant;

use serde::Serialize;

use cardroom_core::Chips;
use cardroom_core::Round;

use crate::error::GameError;

/// Cash tables let players re-buy from their wallet; tournaments play a
/// fixed prize fund down to a ranked finish.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Cash,
    #[default]
    Tournament,
}

/// Whether the deck is re-shuffled every round or only for the opener.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShufflePolicy {
    #[default]
    Always,
    Once,
}

/// Table configuration, fixed at creation apart from a small allow-list
/// of fields that may change while rounds are being played.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub format: Format,
    pub buy_in: Chips,
    pub opening_stack: Chips,
    /// Small blind; the big blind is always double.
    pub ante: Chips,
    pub enforce_min_raise: bool,
    pub buy_in_during_game: bool,
    pub shuffle: ShufflePolicy,
    #[serde(skip)]
    pub action_timeout: Option<Duration>,
    #[serde(skip)]
    pub blind_interval: Option<Duration>,
    /// Percentage of the prize fund per finishing place, best first.
    pub prize_split: Vec<u8>,
    /// Last round a new tournament entrant may still join.
    pub max_entry_round: Round,
    #[serde(skip)]
    pub started_at: Option<Instant>,
    #[serde(skip)]
    pub completed_at: Option<Instant>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: Format::Tournament,
            buy_in: 1_000,
            opening_stack: 10_000,
            ante: 10,
            enforce_min_raise: true,
            buy_in_during_game: false,
            shuffle: ShufflePolicy::Always,
            action_timeout: None,
            blind_interval: None,
            prize_split: Vec::new(),
            max_entry_round: 1,
            started_at: None,
            completed_at: None,
        }
    }
}

impl Settings {
    pub fn big_blind(&self) -> Chips {
        self.ante * 2
    }

    pub fn tournament(&self) -> bool {
        self.format == Format::Tournament
    }

    /// Reject configurations no round could be played under.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.ante <= 0 {
            return Err(GameError::InvalidSettings("ante must be positive".into()));
        }
        let opening = match self.format {
            Format::Cash => self.buy_in,
            Format::Tournament => self.opening_stack,
        };
        if opening < self.big_blind() {
            return Err(GameError::InvalidSettings(
                "opening stack cannot cover the big blind".into(),
            ));
        }
        if !self.prize_split.is_empty()
            && self.prize_split.iter().map(|p| *p as u32).sum::<u32>() != 100
        {
            return Err(GameError::InvalidSettings(
                "prize split must total 100 percent".into(),
            ));
        }
        Ok(())
    }

    /// Double the blinds, capped at half the stake everyone started
    /// with. Returns false once the cap is hit, which stops the blind
    /// clock for good.
    pub fn increase_blinds(&mut self) -> bool {
        let cap = match self.format {
            Format::Cash => self.buy_in,
            Format::Tournament => self.opening_stack,
        } / 2;
        if self.ante * 2 > cap {
            return false;
        }
        self.ante *= 2;
        true
    }

    /// Apply a requested change. Once play has started only the timing
    /// and betting-discipline fields remain open; everything that shapes
    /// money already on the table is locked.
    pub fn apply(&mut self, change: SettingsChange, in_game: bool) -> Result<(), GameError> {
        match change {
            SettingsChange::ActionTimeout(timeout) => {
                self.action_timeout = timeout;
                Ok(())
            }
            SettingsChange::EnforceMinRaise(enforce) => {
                self.enforce_min_raise = enforce;
                Ok(())
            }
            SettingsChange::BuyInDuringGame(allowed) => {
                self.buy_in_during_game = allowed;
                Ok(())
            }
            locked if in_game => Err(GameError::SettingLocked(locked.name().to_string())),
            SettingsChange::Ante(ante) => {
                self.ante = ante;
                self.validate()
            }
            SettingsChange::Shuffle(policy) => {
                self.shuffle = policy;
                Ok(())
            }
            SettingsChange::PrizeSplit(split) => {
                self.prize_split = split;
                self.validate()
            }
        }
    }

    pub fn mark_started(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }
    pub fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }
    pub fn game_length(&self) -> Option<Duration> {
        Some(self.completed_at? - self.started_at?)
    }
}

/// A single mutable field and its requested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    ActionTimeout(Option<Duration>),
    EnforceMinRaise(bool),
    BuyInDuringGame(bool),
    Ante(Chips),
    Shuffle(ShufflePolicy),
    PrizeSplit(Vec<u8>),
}

impl SettingsChange {
    fn name(&self) -> &'static str {
        match self {
            Self::ActionTimeout(_) => "action_timeout",
            Self::EnforceMinRaise(_) => "enforce_min_raise",
            Self::BuyInDuringGame(_) => "buy_in_during_game",
            Self::Ante(_) => "ante",
            Self::Shuffle(_) => "shuffle",
            Self::PrizeSplit(_) => "prize_split",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blind_doubling_caps_at_half_the_opening_stack() {
        let mut settings = Settings {
            opening_stack: 10_000,
            ante: 1_000,
            ..Settings::default()
        };
        assert!(settings.increase_blinds());
        assert_eq!(settings.ante, 2_000);
        assert_eq!(settings.big_blind(), 4_000);
        assert!(!settings.increase_blinds());
        assert_eq!(settings.ante, 2_000);
    }

    #[test]
    fn prize_split_must_total_one_hundred() {
        let mut settings = Settings::default();
        settings.prize_split = vec![60, 30];
        assert!(settings.validate().is_err());
        settings.prize_split = vec![60, 30, 10];
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn money_settings_lock_once_play_starts() {
        let mut settings = Settings::default();
        assert!(settings.apply(SettingsChange::Ante(50), false).is_ok());
        assert_eq!(
            settings.apply(SettingsChange::Ante(100), true),
            Err(GameError::SettingLocked("ante".to_string()))
        );
        assert!(settings
            .apply(SettingsChange::EnforceMinRaise(false), true)
            .is_ok());
        assert!(settings
            .apply(
                SettingsChange::ActionTimeout(Some(Duration::from_secs(20))),
                true
            )
            .is_ok());
        assert!(!settings.enforce_min_raise);
    }
}
