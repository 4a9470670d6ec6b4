use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::sync::watch;

use cardroom_core::INACTION_SWEEP_DELAY;
use cardroom_core::INACTION_SWEEP_PERIOD;
use cardroom_gameplay::Action;
use cardroom_gameplay::GameError;
use cardroom_gameplay::HoldemGame;
use cardroom_gameplay::RoundEngine;

/// Cadence of the background inactivity sweep.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// Quiet period before the sweep starts checking deadlines.
    pub sweep_delay: Duration,
    /// Interval between deadline checks once running.
    pub sweep_period: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            sweep_delay: INACTION_SWEEP_DELAY,
            sweep_period: INACTION_SWEEP_PERIOD,
        }
    }
}

/// One hosted game behind a single mutex.
///
/// Every mutation goes through the same lock: player actions, the
/// inactivity sweep, and the blind clock. The timers run as background
/// tasks that take the lock per tick, so they can never interleave with
/// a half-applied action. Dropping the table stops its timers.
pub struct Table {
    game: Arc<Mutex<HoldemGame>>,
    shutdown: watch::Sender<bool>,
}

impl Table {
    /// Host a game with the default timer cadence. Must be called from
    /// within a tokio runtime.
    pub fn host(game: HoldemGame) -> Self {
        Self::host_with(game, TimerConfig::default())
    }

    pub fn host_with(game: HoldemGame, timers: TimerConfig) -> Self {
        let blind_interval = game
            .settings
            .blind_interval
            .filter(|_| game.settings.tournament());
        let game = Arc::new(Mutex::new(game));
        let (shutdown, _) = watch::channel(false);
        spawn_sweeper(game.clone(), timers, shutdown.subscribe());
        if let Some(interval) = blind_interval {
            spawn_blind_clock(game.clone(), interval, shutdown.subscribe());
        }
        Self { game, shutdown }
    }

    /// Shared handle to the game for long-lived access.
    pub fn game(&self) -> Arc<Mutex<HoldemGame>> {
        self.game.clone()
    }

    /// Apply a player action without waiting. A contended lock means
    /// another mutation is mid-flight, the caller should retry.
    pub fn try_act(&self, action: Action) -> Result<(), GameError> {
        let mut game = self.game.try_lock().map_err(|_| GameError::Busy)?;
        game.apply(action)
    }

    /// Run `work` under the game lock.
    pub async fn with<T>(&self, work: impl FnOnce(&mut HoldemGame) -> T) -> T {
        let mut game = self.game.lock().await;
        work(&mut game)
    }

    /// JSON snapshot of the table for a newly connected client.
    pub async fn snapshot(&self) -> anyhow::Result<serde_json::Value> {
        let game = self.game.lock().await;
        Ok(serde_json::to_value(&*game)?)
    }

    /// Stop the background timers. Idempotent.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        self.close();
    }
}

fn spawn_sweeper(
    game: Arc<Mutex<HoldemGame>>,
    timers: TimerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timers.sweep_delay) => {}
            _ = shutdown.changed() => return,
        }
        let mut ticker = tokio::time::interval(timers.sweep_period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // skip the tick rather than queue behind a held lock
                    let Ok(mut game) = game.try_lock() else {
                        continue;
                    };
                    match game.sweep_inaction(Instant::now()) {
                        Ok(Some(kind)) => log::info!("swept an overdue player with {:?}", kind),
                        Ok(None) => {}
                        Err(failure) if failure.is_precondition() => {
                            log::debug!("inactivity sweep deferred: {}", failure)
                        }
                        Err(failure) => log::warn!("inactivity sweep failed: {}", failure),
                    }
                }
                _ = shutdown.changed() => return,
            }
        }
    });
}

fn spawn_blind_clock(
    game: Arc<Mutex<HoldemGame>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    // raise_blinds reports false once the cap is hit
                    if !game.lock().await.raise_blinds() {
                        return;
                    }
                }
                _ = shutdown.changed() => return,
            }
        }
    });
}
