//! Periodic refresh of the chat board.

use std::{sync::Arc, time::Duration};

use mixtape_core::{Error, Message, NewMessage, Result, service::MessageService};
use tokio::{
  sync::{Notify, watch},
  task::JoinHandle,
  time::MissedTickBehavior,
};
use tracing::{debug, warn};

/// Default refresh interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// What subscribers of a [`MessageFeed`] see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
  /// Messages from the latest successful fetch.
  pub messages:   Vec<Message>,
  /// Error from the latest fetch, if it failed. Messages are kept.
  pub last_error: Option<Error>,
  /// Completed fetches, successful or not.
  pub refreshes:  u64,
}

/// A running refresh loop over a [`MessageService`].
///
/// The loop fetches immediately, then every `interval` and whenever
/// [`Self::refresh_now`] is called. It stops on [`Self::stop`] or when the
/// feed is dropped.
pub struct MessageFeed<M> {
  service: Arc<M>,
  wake:    Arc<Notify>,
  rx:      watch::Receiver<FeedSnapshot>,
  task:    JoinHandle<()>,
}

impl<M: MessageService + 'static> MessageFeed<M> {
  /// Spawn the refresh loop. Must be called within a tokio runtime.
  pub fn start(service: Arc<M>, interval: Duration) -> Self {
    let (tx, rx) = watch::channel(FeedSnapshot::default());
    let wake = Arc::new(Notify::new());
    let task = tokio::spawn(refresh_loop(Arc::clone(&service), interval, Arc::clone(&wake), tx));
    debug!(?interval, "message feed started");
    Self { service, wake, rx, task }
  }

  pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> { self.rx.clone() }

  pub fn snapshot(&self) -> FeedSnapshot { self.rx.borrow().clone() }

  /// Fetch as soon as possible instead of waiting for the next tick.
  pub fn refresh_now(&self) { self.wake.notify_one(); }

  /// Post `message`, then trigger a refresh so it shows up in the feed.
  pub async fn post(&self, message: NewMessage) -> Result<Message> {
    let posted = self.service.post_message(message).await?;
    self.refresh_now();
    Ok(posted)
  }

  pub fn stop(&self) {
    if !self.task.is_finished() {
      debug!("message feed stopped");
    }
    self.task.abort();
  }

  pub fn is_running(&self) -> bool { !self.task.is_finished() }
}

impl<M> Drop for MessageFeed<M> {
  fn drop(&mut self) { self.task.abort(); }
}

async fn refresh_loop<M: MessageService>(
  service: Arc<M>,
  interval: Duration,
  wake: Arc<Notify>,
  tx: watch::Sender<FeedSnapshot>,
) {
  let mut ticker = tokio::time::interval(interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

  loop {
    tokio::select! {
      _ = ticker.tick() => {}
      () = wake.notified() => {}
    }

    let fetched = service.list_messages().await;
    tx.send_modify(|snap| {
      snap.refreshes += 1;
      match fetched {
        Ok(messages) => {
          snap.messages = messages;
          snap.last_error = None;
        }
        Err(e) => {
          warn!(error = %e, "message refresh failed");
          snap.last_error = Some(e);
        }
      }
    });
  }
}
