//! Async hosting for live tables.
//!
//! One [`Table`] owns a mutex around a single game; every mutation,
//! whether a player action or a timer firing, goes through that mutex.
//! [`ChannelMessenger`] fans game messages out to connected sessions
//! and [`MemoryHistory`] keeps completed rounds for replay.

pub mod channel;
pub mod history;
pub mod table;

pub use channel::ChannelMessenger;
pub use history::MemoryHistory;
pub use table::Table;
pub use table::TimerConfig;
