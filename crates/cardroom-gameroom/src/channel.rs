use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use cardroom_gameplay::Address;
use cardroom_gameplay::Messenger;
use cardroom_gameplay::TableMessage;

/// Fans table messages out to connected sessions as JSON text.
///
/// Senders are registered per session id; a broadcast walks all of
/// them. Delayed messages are parked on a spawned sleep so the game
/// lock is never held across a timer. Failed sends are logged and
/// dropped, a gone client is not the table's problem.
#[derive(Clone, Default)]
pub struct ChannelMessenger {
    sessions: Arc<Mutex<HashMap<String, UnboundedSender<String>>>>,
}

impl ChannelMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a session's outbound channel, replacing any earlier one.
    pub fn register(&self, session: &str, sender: UnboundedSender<String>) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(session.to_string(), sender);
        }
    }

    pub fn unregister(&self, session: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(session);
        }
    }

    fn deliver(&self, to: &Address, message: &TableMessage) {
        let json = message.to_json();
        let Ok(sessions) = self.sessions.lock() else {
            return;
        };
        match to {
            Address::All => {
                for (session, sender) in sessions.iter() {
                    if let Err(failure) = sender.send(json.clone()) {
                        log::warn!("broadcast to {} failed: {:?}", session, failure);
                    }
                }
            }
            Address::Session(session) => match sessions.get(session) {
                Some(sender) => {
                    if let Err(failure) = sender.send(json) {
                        log::warn!("send to {} failed: {:?}", session, failure);
                    }
                }
                None => log::warn!("send to {}: no such session", session),
            },
        }
    }
}

impl Messenger for ChannelMessenger {
    fn send(&self, to: Address, message: TableMessage, delay: Duration) {
        if delay.is_zero() {
            return self.deliver(&to, &message);
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let this = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    this.deliver(&to, &message);
                });
            }
            // outside a runtime there is nothing to park the delay on
            Err(_) => self.deliver(&to, &message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn broadcasts_reach_every_session() {
        let messenger = ChannelMessenger::new();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        messenger.register("a", tx_a);
        messenger.register("b", tx_b);
        messenger.broadcast(TableMessage::status("hello"));
        assert!(rx_a.try_recv().unwrap().contains("\"type\":\"status\""));
        assert!(rx_b.try_recv().unwrap().contains("hello"));
    }

    #[test]
    fn whispers_stay_private() {
        let messenger = ChannelMessenger::new();
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        messenger.register("a", tx_a);
        messenger.register("b", tx_b);
        messenger.whisper("a", TableMessage::status("secret"));
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_sends_land_after_the_delay() {
        let messenger = ChannelMessenger::new();
        let (tx, mut rx) = unbounded_channel();
        messenger.register("a", tx);
        messenger.send(
            Address::Session("a".into()),
            TableMessage::status("later"),
            Duration::from_secs(2),
        );
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().unwrap().contains("later"));
    }
}
