//! Core type aliases, traits, and constants for cardroom.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the cardroom workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Money amounts in integer minor units (cents). Exact arithmetic,
/// no tolerance comparisons anywhere in the ledger or pots.
pub type Chips = i64;
/// Seat index around the table.
pub type Seat = usize;
/// Round counter within one game.
pub type Round = u32;
/// Deck shuffle seed, recorded per round for the history snapshot.
pub type Seed = u64;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Fewest seated, active players required to start a round.
pub const MIN_PLAYERS: usize = 2;
/// Most players one table will seat.
pub const MAX_PLAYERS: usize = 10;
/// Community cards revealed over a full hand.
pub const BOARD_SIZE: usize = 5;
/// Hole cards dealt to each player.
pub const HOLE_SIZE: usize = 2;

// ============================================================================
// TIMING PARAMETERS
// All deadlines are wall-clock stamps checked by a periodic sweep, not
// per-request timers.
// ============================================================================
/// Grace period after a round completes during which broke players may
/// still rebuy before the next round can start.
pub const REBUY_GRACE: std::time::Duration = std::time::Duration::from_secs(30);
/// Slack added to every action deadline so a round-trip delay never
/// times a player out on the wire.
pub const ACTION_MARGIN: std::time::Duration = std::time::Duration::from_secs(2);
/// Delay before the inactivity sweep starts checking deadlines.
pub const INACTION_SWEEP_DELAY: std::time::Duration = std::time::Duration::from_secs(30);
/// Cadence of the inactivity sweep once running.
pub const INACTION_SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);
/// Delay on the private blind nudge so it lands after the table update.
pub const BLIND_NUDGE_DELAY: std::time::Duration = std::time::Duration::from_millis(250);
/// Delay on private hole-card delivery after the deal broadcast.
pub const HOLE_DEAL_DELAY: std::time::Duration = std::time::Duration::from_secs(2);

// ============================================================================
// ITERATION BOUNDS
// ============================================================================
/// Seat-cycling safety bound; any rotation that walks this many seats
/// without resolving is a structural failure, never an infinite loop.
pub const SEAT_CYCLE_LIMIT: usize = 30;
/// Most street transitions an all-in auto-completion may run in one call.
pub const AUTO_DEAL_LIMIT: usize = 6;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize terminal logging for binaries and integration tests.
pub fn log() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .expect("initialize logger");
}
