use std::sync::Arc;
use std::sync::Mutex;

use cardroom_gameplay::HistorySink;
use cardroom_gameplay::RoundRecord;

/// Keeps completed rounds in memory, newest last.
#[derive(Clone, Default)]
pub struct MemoryHistory {
    rounds: Arc<Mutex<Vec<RoundRecord>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn rounds(&self) -> Vec<RoundRecord> {
        self.rounds
            .lock()
            .map(|rounds| rounds.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rounds.lock().map(|rounds| rounds.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistorySink for MemoryHistory {
    fn record(&self, record: RoundRecord) {
        if let Ok(mut rounds) = self.rounds.lock() {
            rounds.push(record);
        }
    }
}
