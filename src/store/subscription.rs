use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::api::Document;

/// One fully materialized, order-correct result set.
pub type Snapshot = Vec<Document>;

/// Handle to a standing live query. Snapshots arrive through a bounded
/// channel, so delivery is strictly sequential: the next snapshot is not
/// produced to the consumer before the previous one was taken.
pub struct Subscription {
    receiver: mpsc::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<Snapshot>, task: JoinHandle<()>) -> Self {
        Self { receiver, task }
    }

    /// Waits for the next snapshot. Returns `None` once the subscription has
    /// been cancelled or the store side went away.
    pub async fn next_snapshot(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }

    /// Stops delivery. Idempotent and safe to call any number of times;
    /// after the first call no snapshot is delivered anymore, including
    /// snapshots that were already in flight.
    pub fn cancel(&mut self) {
        self.task.abort();
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
