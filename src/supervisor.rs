//! Lifecycle of the two background activities.
//!
//! `start` spawns the announcement listener and the poller and hands back
//! the single object that owns them; `stop` flips the shared shutdown
//! signal and joins both tasks, which bounds shutdown to roughly one
//! in-flight fetch timeout.

use crate::discovery::AnnouncementListener;
use crate::poller::Poller;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

pub struct Supervisor {
    shutdown: watch::Sender<bool>,
    listener: JoinHandle<()>,
    poller: JoinHandle<()>,
}

impl Supervisor {
    pub fn start(listener: AnnouncementListener, poller: Poller) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let listener = tokio::spawn(listener.run(rx.clone()));
        let poller = tokio::spawn(poller.run(rx));
        Self {
            shutdown,
            listener,
            poller,
        }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.listener.await {
            warn!("announcement listener task failed: {e}");
        }
        if let Err(e) = self.poller.await {
            warn!("poller task failed: {e}");
        }
    }
}
